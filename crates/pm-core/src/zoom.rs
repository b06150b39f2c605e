//! Basemap zoom level selection.
//!
//! Zoom levels index the standard Web Mercator resolution table:
//! 156543.03392804097 m/px at level 0 over a 256px tile, halving per level.

use crate::extent::GeoExtent;
use crate::geometry::EARTH_RADIUS_M;

/// Deepest zoom level the table covers (the deepest level the default
/// raster styles serve).
pub const MAX_ZOOM: u8 = 19;

/// Meters per pixel at the equator for level 0.
const INITIAL_RESOLUTION: f64 = 2.0 * std::f64::consts::PI * EARTH_RADIUS_M / 256.0;

/// Meters per pixel at the equator for the given zoom level.
#[must_use]
pub fn meters_per_pixel(zoom: u8) -> f64 {
    INITIAL_RESOLUTION / f64::from(1_u32 << zoom.min(MAX_ZOOM))
}

/// Pick the basemap zoom level for an extent rendered at the given pixel
/// resolution: the smallest level whose resolution is at least as fine as
/// the render needs, clamped to `0..=MAX_ZOOM`.
///
/// Pure function of its inputs; performs no I/O.
#[must_use]
pub fn select_zoom(extent: &GeoExtent, px_width: u32, px_height: u32) -> u8 {
    let px_width = f64::from(px_width.max(1));
    let px_height = f64::from(px_height.max(1));
    let required = (extent.width() / px_width).max(extent.height() / px_height);

    (0..=MAX_ZOOM)
        .find(|&zoom| meters_per_pixel(zoom) <= required)
        .unwrap_or(MAX_ZOOM)
}
