//! The basemap imagery seam.
//!
//! Tile retrieval is I/O with its own caching and retry concerns, so it
//! stays behind a narrow synchronous interface. The rasterizer only ever
//! sees a completed image or an unavailability signal, and recovers from
//! the latter by keeping the configured background.

use pm_core::{BasemapUnavailable, GeoExtent};

use crate::buffer::Rgba;

/// A decoded basemap image pinned to the extent it covers.
#[derive(Debug, Clone)]
pub struct BasemapImage {
    extent: GeoExtent,
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl BasemapImage {
    /// Wrap decoded pixels. The pixel vector must be row-major,
    /// `width * height` long.
    pub fn new(
        extent: GeoExtent,
        width: u32,
        height: u32,
        pixels: Vec<Rgba>,
    ) -> Result<Self, BasemapUnavailable> {
        if width == 0 || height == 0 || pixels.len() != (width as usize) * (height as usize) {
            return Err(BasemapUnavailable::new(format!(
                "image dimensions {width}x{height} do not match {} pixels",
                pixels.len()
            )));
        }
        Ok(Self {
            extent,
            width,
            height,
            pixels,
        })
    }

    /// Uniform single-color imagery, mainly useful in tests.
    #[must_use]
    pub fn uniform(extent: GeoExtent, width: u32, height: u32, pixel: Rgba) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            extent,
            width,
            height,
            pixels: vec![pixel; (width as usize) * (height as usize)],
        }
    }

    #[must_use]
    pub const fn extent(&self) -> &GeoExtent {
        &self.extent
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Re-pin the image to a different extent, e.g. when a pre-rendered
    /// file is known to depict the requested region.
    #[must_use]
    pub fn retargeted(mut self, extent: GeoExtent) -> Self {
        self.extent = extent;
        self
    }

    /// Nearest-neighbor sample at a projected coordinate. `None` outside
    /// the image's extent.
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> Option<Rgba> {
        if !self.extent.contains(x, y) {
            return None;
        }
        let fx = (x - self.extent.min_x) / self.extent.width() * f64::from(self.width);
        let fy = (self.extent.max_y - y) / self.extent.height() * f64::from(self.height);
        let px = (fx as u32).min(self.width - 1);
        let py = (fy as u32).min(self.height - 1);
        Some(self.pixels[(py * self.width + px) as usize])
    }
}

/// Narrow synchronous interface to whatever supplies basemap imagery.
///
/// Implementations own their caching, retry, and timeout policy. On
/// timeout they must return [`BasemapUnavailable`] rather than block the
/// render indefinitely.
pub trait BasemapProvider {
    fn fetch(&self, zoom: u8, extent: &GeoExtent) -> Result<BasemapImage, BasemapUnavailable>;
}

/// Provider with no imagery at all; every fetch reports unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBasemap;

impl BasemapProvider for NoBasemap {
    fn fetch(
        &self,
        _zoom: u8,
        _extent: &GeoExtent,
    ) -> Result<BasemapImage, BasemapUnavailable> {
        Err(BasemapUnavailable::new("no tile source configured"))
    }
}

/// Provider backed by a single in-memory image, re-pinned to whatever
/// extent is requested. Serves pre-fetched imagery and tests.
#[derive(Debug, Clone)]
pub struct StaticBasemap {
    image: BasemapImage,
}

impl StaticBasemap {
    #[must_use]
    pub const fn new(image: BasemapImage) -> Self {
        Self { image }
    }
}

impl BasemapProvider for StaticBasemap {
    fn fetch(&self, _zoom: u8, extent: &GeoExtent) -> Result<BasemapImage, BasemapUnavailable> {
        Ok(self.image.clone().retargeted(*extent))
    }
}
