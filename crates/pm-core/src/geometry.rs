//! Feature geometries in projected (EPSG:3857) coordinates.

use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// Mean equatorial radius of the WGS84 spheroid, in meters.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Latitude beyond which the spherical Mercator projection diverges.
pub const MAX_LATITUDE: f64 = 85.051_128_78;

/// A point in Web Mercator meters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct ProjPoint {
    pub x: f64,
    pub y: f64,
}

impl ProjPoint {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Forward spherical Web Mercator projection (EPSG:4326 → EPSG:3857).
///
/// Latitudes are clamped to the projection's valid range first so polar
/// coordinates cannot produce infinities.
#[must_use]
pub fn project_lonlat(lon: f64, lat: f64) -> ProjPoint {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let x = EARTH_RADIUS_M * lon.to_radians();
    let y = EARTH_RADIUS_M
        * (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0)
            .tan()
            .ln();
    ProjPoint::new(x, y)
}

/// A feature geometry: point sequences in projected coordinates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Geometry {
    Point(ProjPoint),
    LineString(Vec<ProjPoint>),
    /// Outer ring first, holes after. Rings need not repeat their first point.
    Polygon(Vec<Vec<ProjPoint>>),
}

impl Geometry {
    /// Iterate over every coordinate in the geometry.
    pub fn points(&self) -> Box<dyn Iterator<Item = ProjPoint> + '_> {
        match self {
            Self::Point(p) => Box::new(std::iter::once(*p)),
            Self::LineString(points) => Box::new(points.iter().copied()),
            Self::Polygon(rings) => Box::new(rings.iter().flat_map(|r| r.iter().copied())),
        }
    }

    /// Number of coordinates in the geometry.
    #[must_use]
    pub fn point_count(&self) -> usize {
        match self {
            Self::Point(_) => 1,
            Self::LineString(points) => points.len(),
            Self::Polygon(rings) => rings.iter().map(Vec::len).sum(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Point(_) => "point",
            Self::LineString(_) => "linestring",
            Self::Polygon(_) => "polygon",
        }
    }
}

/// One drawable feature: a geometry plus optional per-feature overrides of
/// the configured layer color and opacity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feature {
    pub geometry: Geometry,
    pub color: Option<Rgb>,
    pub opacity: Option<f32>,
}

impl Feature {
    #[must_use]
    pub const fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            color: None,
            opacity: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projects_the_null_island() {
        let p = project_lonlat(0.0, 0.0);
        assert!(p.x.abs() < 1e-6);
        assert!(p.y.abs() < 1e-6);
    }

    #[test]
    fn projects_the_antimeridian_to_the_mercator_bound() {
        let p = project_lonlat(180.0, 0.0);
        assert!((p.x - 20_037_508.342_789_244).abs() < 1e-3);
    }

    #[test]
    fn polar_latitudes_are_clamped_to_finite_values() {
        let p = project_lonlat(0.0, 90.0);
        assert!(p.y.is_finite());
        assert!((p.y - 20_037_508.342_789_244).abs() < 1.0);
    }

    #[test]
    fn point_iteration_covers_all_rings() {
        let polygon = Geometry::Polygon(vec![
            vec![
                ProjPoint::new(0.0, 0.0),
                ProjPoint::new(10.0, 0.0),
                ProjPoint::new(10.0, 10.0),
            ],
            vec![ProjPoint::new(2.0, 2.0), ProjPoint::new(4.0, 4.0)],
        ]);
        assert_eq!(polygon.points().count(), 5);
        assert_eq!(polygon.point_count(), 5);
    }
}
