#![forbid(unsafe_code)]

//! Rasterization of an extent, its vector features, and optional basemap
//! imagery into an RGBA pixel buffer.

mod basemap;
mod buffer;
mod draw;

pub use basemap::{BasemapImage, BasemapProvider, NoBasemap, StaticBasemap};
pub use buffer::{PixelBuffer, Rgba};
pub use draw::Mask;

use pm_core::{Feature, GeoExtent, Geometry, ProjPoint, RenderConfig};

/// Affine map from projected meters to buffer pixel coordinates.
#[derive(Debug, Clone, Copy)]
struct PixelTransform {
    extent: GeoExtent,
    width: f64,
    height: f64,
}

impl PixelTransform {
    fn new(extent: GeoExtent, width: u32, height: u32) -> Self {
        Self {
            extent,
            width: f64::from(width),
            height: f64::from(height),
        }
    }

    /// Pixel y grows downward while projected y grows northward.
    fn to_px(&self, point: ProjPoint) -> (f64, f64) {
        let x = (point.x - self.extent.min_x) / self.extent.width() * self.width;
        let y = (self.extent.max_y - point.y) / self.extent.height() * self.height;
        (x, y)
    }
}

/// Rasterize one render: background fill, then basemap imagery when
/// available, then each feature in input order with src-over compositing.
///
/// A missing basemap (not requested, or fetch already reported
/// unavailable) leaves the configured background color as the base layer.
#[must_use]
pub fn rasterize(
    features: &[Feature],
    extent: &GeoExtent,
    config: &RenderConfig,
    basemap: Option<&BasemapImage>,
) -> PixelBuffer {
    let (width, height) = config.pixel_dimensions();
    let mut buffer = PixelBuffer::filled(width, height, config.colors.background);

    if let Some(image) = basemap {
        paint_basemap(&mut buffer, extent, image);
    }

    let transform = PixelTransform::new(*extent, buffer.width(), buffer.height());
    for feature in features {
        draw_feature(&mut buffer, &transform, config, feature);
    }

    buffer
}

fn paint_basemap(buffer: &mut PixelBuffer, extent: &GeoExtent, image: &BasemapImage) {
    let width = f64::from(buffer.width());
    let height = f64::from(buffer.height());

    for y in 0..buffer.height() {
        let map_y = extent.max_y - (f64::from(y) + 0.5) / height * extent.height();
        for x in 0..buffer.width() {
            let map_x = extent.min_x + (f64::from(x) + 0.5) / width * extent.width();
            if let Some(pixel) = image.sample(map_x, map_y) {
                buffer.blend(i64::from(x), i64::from(y), pixel);
            }
        }
    }
}

fn draw_feature(
    buffer: &mut PixelBuffer,
    transform: &PixelTransform,
    config: &RenderConfig,
    feature: &Feature,
) {
    let color = feature.color.unwrap_or(config.colors.feature);
    let opacity = feature.opacity.unwrap_or(config.opacity);
    let ink = Rgba::with_opacity(color, opacity);
    if ink.a == 0 {
        return;
    }

    let mut mask = Mask::new(buffer.width(), buffer.height());
    let thickness = line_thickness(config.dpi);

    match &feature.geometry {
        Geometry::Point(point) => {
            let (x, y) = transform.to_px(*point);
            mask.fill_disc(x as i64, y as i64, point_radius(config.dpi));
        }
        Geometry::LineString(points) => {
            stroke_path(&mut mask, transform, points, thickness);
        }
        Geometry::Polygon(rings) => {
            let px_rings: Vec<Vec<(f64, f64)>> = rings
                .iter()
                .map(|ring| ring.iter().map(|&p| transform.to_px(p)).collect())
                .collect();
            mask.fill_polygon(&px_rings);
            // Outline keeps slivers visible that the scanline fill misses.
            for ring in rings {
                stroke_ring(&mut mask, transform, ring);
            }
        }
    }

    buffer.blend_mask(&mask, ink);
}

fn stroke_path(mask: &mut Mask, transform: &PixelTransform, points: &[ProjPoint], thickness: u32) {
    for pair in points.windows(2) {
        let (x0, y0) = transform.to_px(pair[0]);
        let (x1, y1) = transform.to_px(pair[1]);
        mask.draw_line(x0 as i64, y0 as i64, x1 as i64, y1 as i64, thickness);
    }
}

fn stroke_ring(mask: &mut Mask, transform: &PixelTransform, ring: &[ProjPoint]) {
    if ring.len() < 2 {
        return;
    }
    stroke_path(mask, transform, ring, 1);
    let (x0, y0) = transform.to_px(ring[ring.len() - 1]);
    let (x1, y1) = transform.to_px(ring[0]);
    mask.draw_line(x0 as i64, y0 as i64, x1 as i64, y1 as i64, 1);
}

const fn line_thickness(dpi: u16) -> u32 {
    let t = (dpi / 4) as u32;
    if t == 0 { 1 } else { t }
}

const fn point_radius(dpi: u16) -> i64 {
    let r = (dpi / 3) as i64;
    if r == 0 { 1 } else { r }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pm_core::Rgb;

    fn extent() -> GeoExtent {
        GeoExtent::clipped(0.0, 0.0, 100.0, 100.0).unwrap()
    }

    fn config() -> RenderConfig {
        RenderConfig {
            opacity: 1.0,
            border: false,
            ..RenderConfig::light(10, 5)
        }
    }

    fn full_extent_polygon(color: Rgb) -> Feature {
        Feature {
            geometry: Geometry::Polygon(vec![vec![
                ProjPoint::new(0.0, 0.0),
                ProjPoint::new(100.0, 0.0),
                ProjPoint::new(100.0, 100.0),
                ProjPoint::new(0.0, 100.0),
            ]]),
            color: Some(color),
            opacity: Some(1.0),
        }
    }

    #[test]
    fn no_features_and_no_basemap_leaves_the_background() {
        let config = config();
        let buffer = rasterize(&[], &extent(), &config, None);
        let background = Rgba::opaque(config.colors.background);
        for y in 0..buffer.height() {
            for x in 0..buffer.width() {
                assert_eq!(buffer.get(x, y), Some(background));
            }
        }
    }

    #[test]
    fn full_extent_polygon_covers_every_pixel() {
        let red = Rgb::new(255, 0, 0);
        let features = vec![full_extent_polygon(red)];
        let buffer = rasterize(&features, &extent(), &config(), None);
        for y in 0..buffer.height() {
            for x in 0..buffer.width() {
                assert_eq!(buffer.get(x, y), Some(Rgba::opaque(red)), "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn basemap_imagery_replaces_the_background() {
        let config = config();
        let slate = Rgba::opaque(Rgb::new(40, 44, 52));
        let image = BasemapImage::uniform(extent(), 8, 8, slate);
        let buffer = rasterize(&[], &extent(), &config, Some(&image));
        assert_eq!(buffer.get(0, 0), Some(slate));
        assert_eq!(
            buffer.get(buffer.width() - 1, buffer.height() - 1),
            Some(slate)
        );
    }

    #[test]
    fn features_composite_over_the_basemap() {
        let image = BasemapImage::uniform(extent(), 8, 8, Rgba::opaque(Rgb::BLACK));
        let features = vec![full_extent_polygon(Rgb::new(0, 255, 0))];
        let buffer = rasterize(&features, &extent(), &config(), Some(&image));
        assert_eq!(
            buffer.get(buffer.width() / 2, buffer.height() / 2),
            Some(Rgba::opaque(Rgb::new(0, 255, 0)))
        );
    }

    #[test]
    fn semi_transparent_features_tint_the_background() {
        let mut config = config();
        config.colors.background = Rgb::BLACK;
        let feature = Feature {
            opacity: Some(0.5),
            ..full_extent_polygon(Rgb::WHITE)
        };
        let buffer = rasterize(&[feature], &extent(), &config, None);
        let mid = buffer.get(buffer.width() / 2, buffer.height() / 2).unwrap();
        assert!((i32::from(mid.r) - 128).abs() <= 1);
    }

    #[test]
    fn rasterization_is_deterministic() {
        let features = vec![
            Feature::new(Geometry::LineString(vec![
                ProjPoint::new(10.0, 10.0),
                ProjPoint::new(90.0, 80.0),
            ])),
            Feature::new(Geometry::Point(ProjPoint::new(50.0, 50.0))),
        ];
        let config = config();
        let first = rasterize(&features, &extent(), &config, None);
        let second = rasterize(&features, &extent(), &config, None);
        assert_eq!(first, second);
    }

    #[test]
    fn line_features_mark_pixels_along_their_path() {
        let features = vec![Feature {
            geometry: Geometry::LineString(vec![
                ProjPoint::new(0.0, 50.0),
                ProjPoint::new(100.0, 50.0),
            ]),
            color: Some(Rgb::new(255, 0, 0)),
            opacity: Some(1.0),
        }];
        let config = config();
        let buffer = rasterize(&features, &extent(), &config, None);
        // The horizontal midline should be red somewhere in the middle.
        let mid = buffer.get(buffer.width() / 2, buffer.height() / 2).unwrap();
        assert_eq!(mid.rgb(), Rgb::new(255, 0, 0));
        // Corners stay background.
        assert_eq!(
            buffer.get(0, 0).unwrap().rgb(),
            config.colors.background
        );
    }
}
