//! Pipeline error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fatal rendering errors. Each variant names the stage that raised it so a
/// failure can be reproduced from the same inputs.
#[derive(Debug, Clone, Serialize, Deserialize, Error, PartialEq)]
pub enum RenderError {
    /// No feature geometries and no extent override were supplied.
    #[error("extent resolution: no input features and no extent override")]
    EmptyInput,

    /// The bounding box degenerated to zero area after clipping to the
    /// valid Web Mercator range.
    #[error(
        "extent resolution: degenerate extent after clipping: \
         [{min_x}, {min_y}, {max_x}, {max_y}]"
    )]
    InvalidExtent {
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    },

    /// The requested quantization strategy name is not recognized. Raised
    /// before any rasterization work begins.
    #[error("unknown renderer '{name}' (expected one of: block, half, quadrant, braille)")]
    UnknownRenderer { name: String },
}

impl RenderError {
    /// Stable machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EmptyInput => "render/error/empty-input",
            Self::InvalidExtent { .. } => "render/error/invalid-extent",
            Self::UnknownRenderer { .. } => "render/error/unknown-renderer",
        }
    }
}

/// Recoverable basemap failure. The rasterizer substitutes the configured
/// background color and continues; this never aborts a render.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("basemap unavailable: {reason}")]
pub struct BasemapUnavailable {
    pub reason: String,
}

impl BasemapUnavailable {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_stage() {
        let err = RenderError::InvalidExtent {
            min_x: 1.0,
            min_y: 2.0,
            max_x: 1.0,
            max_y: 3.0,
        };
        assert!(err.to_string().contains("extent resolution"));
        assert!(err.to_string().contains('1'));
        assert_eq!(err.code(), "render/error/invalid-extent");
    }

    #[test]
    fn unknown_renderer_lists_valid_names() {
        let err = RenderError::UnknownRenderer {
            name: "sixel".to_string(),
        };
        assert!(err.to_string().contains("sixel"));
        assert!(err.to_string().contains("braille"));
    }
}
