#![forbid(unsafe_code)]

//! GeoJSON parsing into projected feature geometries.
//!
//! Input coordinates are WGS84 lon/lat degrees and are forward-projected to
//! Web Mercator meters on the way in. Malformed members degrade to warnings
//! wherever something sensible can still be rendered; only input that is not
//! GeoJSON at all is an error.

use pm_core::{Feature, Geometry, ProjPoint, Rgb, project_lonlat};
use serde_json::Value;
use thiserror::Error;

/// Errors for input that cannot be interpreted as GeoJSON.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a GeoJSON object at the document root, found {found}")]
    NotAnObject { found: &'static str },

    #[error("root object has no \"type\" member")]
    MissingType,

    #[error("unsupported root GeoJSON type '{0}'")]
    UnsupportedRoot(String),
}

/// Parsed features plus recoverable oddities encountered along the way.
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    pub features: Vec<Feature>,
    pub warnings: Vec<String>,
}

/// Parse a GeoJSON document (FeatureCollection, Feature, or bare geometry)
/// into projected features.
pub fn parse_geojson(input: &str) -> Result<ParseResult, ParseError> {
    let value: Value = serde_json::from_str(input)?;
    let Some(object) = value.as_object() else {
        return Err(ParseError::NotAnObject {
            found: json_type_name(&value),
        });
    };
    let Some(kind) = object.get("type").and_then(Value::as_str) else {
        return Err(ParseError::MissingType);
    };

    let mut result = ParseResult::default();
    match kind {
        "FeatureCollection" => {
            for (index, item) in object
                .get("features")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default()
                .iter()
                .enumerate()
            {
                collect_feature(item, index, &mut result);
            }
        }
        "Feature" => collect_feature(&value, 0, &mut result),
        _ if is_geometry_type(kind) => {
            collect_geometry(&value, &Style::default(), &mut result);
        }
        other => return Err(ParseError::UnsupportedRoot(other.to_string())),
    }

    Ok(result)
}

/// Per-feature style overrides lifted from simplestyle properties.
#[derive(Debug, Clone, Copy, Default)]
struct Style {
    color: Option<Rgb>,
    opacity: Option<f32>,
}

fn collect_feature(value: &Value, index: usize, result: &mut ParseResult) {
    let Some(object) = value.as_object() else {
        result
            .warnings
            .push(format!("feature {index} is not an object; skipped"));
        return;
    };

    let style = object
        .get("properties")
        .map(|props| extract_style(props, index, &mut result.warnings))
        .unwrap_or_default();

    match object.get("geometry") {
        Some(geometry) if !geometry.is_null() => {
            collect_geometry(geometry, &style, result);
        }
        _ => result
            .warnings
            .push(format!("feature {index} has no geometry; skipped")),
    }
}

/// Read simplestyle color and opacity members: `stroke`/`fill` hex colors,
/// `stroke-opacity`/`fill-opacity` in `0.0..=1.0`.
fn extract_style(properties: &Value, index: usize, warnings: &mut Vec<String>) -> Style {
    let mut style = Style::default();
    let Some(props) = properties.as_object() else {
        return style;
    };

    for key in ["stroke", "fill"] {
        if let Some(hex) = props.get(key).and_then(Value::as_str) {
            match hex.parse::<Rgb>() {
                Ok(color) => {
                    style.color = Some(color);
                    break;
                }
                Err(err) => warnings.push(format!("feature {index}: {err}")),
            }
        }
    }

    for key in ["stroke-opacity", "fill-opacity"] {
        if let Some(opacity) = props.get(key).and_then(Value::as_f64) {
            style.opacity = Some(opacity.clamp(0.0, 1.0) as f32);
            break;
        }
    }

    style
}

fn collect_geometry(value: &Value, style: &Style, result: &mut ParseResult) {
    let Some(kind) = value.get("type").and_then(Value::as_str) else {
        result
            .warnings
            .push("geometry without a \"type\" member; skipped".to_string());
        return;
    };
    let coordinates = value.get("coordinates").unwrap_or(&Value::Null);

    match kind {
        "Point" => {
            if let Some(point) = parse_position(coordinates) {
                push_feature(result, Geometry::Point(point), style);
            } else {
                result
                    .warnings
                    .push("Point with malformed coordinates; skipped".to_string());
            }
        }
        "MultiPoint" => {
            for point in parse_positions(coordinates) {
                push_feature(result, Geometry::Point(point), style);
            }
        }
        "LineString" => {
            push_linestring(result, parse_positions(coordinates), style);
        }
        "MultiLineString" => {
            for line in coordinates.as_array().map(Vec::as_slice).unwrap_or_default() {
                push_linestring(result, parse_positions(line), style);
            }
        }
        "Polygon" => {
            let rings = parse_rings(coordinates, &mut result.warnings);
            push_polygon(result, rings, style);
        }
        "MultiPolygon" => {
            for polygon in coordinates.as_array().map(Vec::as_slice).unwrap_or_default() {
                let rings = parse_rings(polygon, &mut result.warnings);
                push_polygon(result, rings, style);
            }
        }
        "GeometryCollection" => {
            for geometry in value
                .get("geometries")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default()
            {
                collect_geometry(geometry, style, result);
            }
        }
        other => result
            .warnings
            .push(format!("unsupported geometry type '{other}'; skipped")),
    }
}

fn push_feature(result: &mut ParseResult, geometry: Geometry, style: &Style) {
    result.features.push(Feature {
        geometry,
        color: style.color,
        opacity: style.opacity,
    });
}

fn push_linestring(result: &mut ParseResult, points: Vec<ProjPoint>, style: &Style) {
    if points.len() >= 2 {
        push_feature(result, Geometry::LineString(points), style);
    } else {
        result
            .warnings
            .push("LineString with fewer than 2 positions; skipped".to_string());
    }
}

fn push_polygon(result: &mut ParseResult, rings: Vec<Vec<ProjPoint>>, style: &Style) {
    if rings.is_empty() {
        result
            .warnings
            .push("Polygon with no usable rings; skipped".to_string());
    } else {
        push_feature(result, Geometry::Polygon(rings), style);
    }
}

fn parse_rings(coordinates: &Value, warnings: &mut Vec<String>) -> Vec<Vec<ProjPoint>> {
    let mut rings = Vec::new();
    for ring in coordinates.as_array().map(Vec::as_slice).unwrap_or_default() {
        let points = parse_positions(ring);
        if points.len() >= 3 {
            rings.push(points);
        } else {
            warnings.push("polygon ring with fewer than 3 positions; dropped".to_string());
        }
    }
    rings
}

fn parse_positions(value: &Value) -> Vec<ProjPoint> {
    value
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .filter_map(parse_position)
        .collect()
}

/// A GeoJSON position: `[lon, lat, ...]` in degrees, projected to meters.
fn parse_position(value: &Value) -> Option<ProjPoint> {
    let pair = value.as_array()?;
    let lon = pair.first()?.as_f64()?;
    let lat = pair.get(1)?.as_f64()?;
    Some(project_lonlat(lon, lat))
}

fn is_geometry_type(kind: &str) -> bool {
    matches!(
        kind,
        "Point"
            | "MultiPoint"
            | "LineString"
            | "MultiLineString"
            | "Polygon"
            | "MultiPolygon"
            | "GeometryCollection"
    )
}

const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
