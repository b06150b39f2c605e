//! Immutable render configuration and named style presets.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::error::RenderError;

/// Quantization strategy ("renderer"), selected by name.
///
/// A closed set: each variant is a pure mapping from a block of pixels to
/// one terminal cell. New strategies are added as variants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RendererKind {
    /// One averaged color per cell behind a full-block glyph. Most
    /// compatible, least detail.
    Block,
    /// Upper/lower half-block split: two colors per cell.
    #[default]
    Half,
    /// 2x2 quarter-block patterns split by luminance.
    Quadrant,
    /// 2x4 braille dot patterns split by luminance. Finest detail, needs a
    /// font with the braille range.
    Braille,
}

impl RendererKind {
    /// Resolve a strategy from its configured name. Unknown names fail
    /// before any rasterization work begins.
    pub fn from_name(name: &str) -> Result<Self, RenderError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "block" => Ok(Self::Block),
            "half" | "half-block" | "halfblock" => Ok(Self::Half),
            "quadrant" | "quad" => Ok(Self::Quadrant),
            "braille" => Ok(Self::Braille),
            _ => Err(RenderError::UnknownRenderer {
                name: name.to_string(),
            }),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::Half => "half",
            Self::Quadrant => "quadrant",
            Self::Braille => "braille",
        }
    }
}

/// Basemap imagery style identifier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum BasemapStyle {
    /// Light gray reference imagery.
    Positron,
    /// Near-black reference imagery.
    DarkMatter,
    /// Warm light imagery.
    Voyager,
}

/// Error type for basemap style parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseBasemapStyleError(String);

impl std::fmt::Display for ParseBasemapStyleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown basemap style: {}", self.0)
    }
}

impl std::error::Error for ParseBasemapStyleError {}

impl FromStr for BasemapStyle {
    type Err = ParseBasemapStyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positron" => Ok(Self::Positron),
            "dark-matter" | "darkmatter" => Ok(Self::DarkMatter),
            "voyager" => Ok(Self::Voyager),
            _ => Err(ParseBasemapStyleError(s.to_string())),
        }
    }
}

impl BasemapStyle {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Positron => "positron",
            Self::DarkMatter => "dark-matter",
            Self::Voyager => "voyager",
        }
    }

    /// Whether the style is dark imagery, which drives the preset pairing
    /// when no explicit style preset is chosen.
    #[must_use]
    pub const fn is_dark(self) -> bool {
        matches!(self, Self::DarkMatter)
    }
}

/// Per-layer color assignments.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LayerColors {
    pub feature: Rgb,
    pub background: Rgb,
    pub border: Rgb,
}

/// Immutable configuration for one render. Supplied once per invocation and
/// never mutated by any pipeline stage; the same process can hold several
/// configurations at once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenderConfig {
    /// Output width in terminal cells.
    pub width: u16,
    /// Output height in terminal cells.
    pub height: u16,
    /// Raster pixels per cell column. Cells are treated as twice as tall as
    /// wide, so the buffer is `width*dpi x height*2*dpi` pixels.
    pub dpi: u16,
    pub colors: LayerColors,
    /// Default feature opacity in `0.0..=1.0`; per-feature overrides win.
    pub opacity: f32,
    /// Basemap imagery style, or `None` to skip the basemap entirely.
    pub basemap: Option<BasemapStyle>,
    pub border: bool,
    pub renderer: RendererKind,
    pub title: Option<String>,
    pub subtitle: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::light(80, 24)
    }
}

impl RenderConfig {
    /// Light preset: pale background, muted border, matplotlib-blue
    /// features.
    #[must_use]
    pub fn light(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            dpi: 10,
            colors: LayerColors {
                feature: Rgb::new(0x1f, 0x77, 0xb4),
                background: Rgb::new(0xf2, 0xef, 0xe9),
                border: Rgb::new(0x6e, 0x6e, 0x6e),
            },
            opacity: 0.4,
            basemap: None,
            border: true,
            renderer: RendererKind::default(),
            title: None,
            subtitle: None,
        }
    }

    /// Dark preset: near-black background with brighter feature ink.
    #[must_use]
    pub fn dark(width: u16, height: u16) -> Self {
        Self {
            colors: LayerColors {
                feature: Rgb::new(0x58, 0xa6, 0xff),
                background: Rgb::new(0x0a, 0x0a, 0x0a),
                border: Rgb::new(0x8c, 0x8c, 0x8c),
            },
            ..Self::light(width, height)
        }
    }

    /// Raster buffer dimensions in pixels. Zero cell counts and dpi are
    /// treated as one.
    #[must_use]
    pub fn pixel_dimensions(&self) -> (u32, u32) {
        let dpi = u32::from(self.dpi.max(1));
        (
            u32::from(self.width.max(1)) * dpi,
            u32::from(self.height.max(1)) * 2 * dpi,
        )
    }

    /// Width/height ratio of the raster buffer.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        let (w, h) = self.pixel_dimensions();
        f64::from(w) / f64::from(h)
    }
}
