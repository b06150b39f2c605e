#![forbid(unsafe_code)]

//! Terminal output for the pixel-map pipeline: glyph quantization of the
//! raster buffer, border/title overlay, ANSI serialization, and the
//! end-to-end render entry point.

mod ansi;
mod cell;
mod compose;
mod quantize;

pub use ansi::to_ansi;
pub use cell::{CellGrid, TerminalCell};
pub use compose::{BorderGlyphs, MIN_TITLE_COLS, compose};
pub use quantize::quantize;

use pm_core::{Feature, GeoExtent, RenderConfig, RenderError, resolve_extent, select_zoom};
use pm_raster::{BasemapProvider, rasterize};
use tracing::{debug, warn};

/// Result of a full map render.
#[derive(Debug, Clone)]
pub struct MapRender {
    /// Color-escaped text, one line per cell row.
    pub text: String,
    pub grid: CellGrid,
    /// The extent actually rendered, after clipping and aspect expansion.
    pub extent: GeoExtent,
    /// Basemap zoom level selected for the extent.
    pub zoom: u8,
}

/// Run the whole pipeline: extent resolution, zoom selection, basemap
/// fetch, rasterization, quantization, and layout composition.
///
/// `override_bounds` is `[min_x, min_y, max_x, max_y]` in projected
/// meters. A provider failure is recovered by rendering over the
/// configured background color; fatal errors are the extent failures and
/// nothing else, since the renderer name was validated when the
/// configuration was built.
pub fn render_map(
    features: &[Feature],
    override_bounds: Option<[f64; 4]>,
    config: &RenderConfig,
    provider: &dyn BasemapProvider,
) -> Result<MapRender, RenderError> {
    let (px_width, px_height) = config.pixel_dimensions();
    let extent =
        resolve_extent(features, override_bounds)?.expand_to_aspect(config.aspect_ratio());
    let zoom = select_zoom(&extent, px_width, px_height);
    debug!(
        "extent [{:.1}, {:.1}, {:.1}, {:.1}] at zoom {zoom}",
        extent.min_x, extent.min_y, extent.max_x, extent.max_y
    );

    let basemap = if config.basemap.is_some() {
        match provider.fetch(zoom, &extent) {
            Ok(image) => Some(image),
            Err(err) => {
                warn!("{err}; continuing with the background color");
                None
            }
        }
    } else {
        None
    };

    let buffer = rasterize(features, &extent, config, basemap.as_ref());
    let mut grid = quantize(
        &buffer,
        usize::from(config.height.max(1)),
        usize::from(config.width.max(1)),
        config.renderer,
    );
    compose(&mut grid, config);
    let text = to_ansi(&grid);

    Ok(MapRender {
        text,
        grid,
        extent,
        zoom,
    })
}
