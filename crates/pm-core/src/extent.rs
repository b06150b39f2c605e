//! Geographic extent resolution and Web Mercator clipping.

use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use crate::geometry::Feature;

/// Half-width of the valid spherical Web Mercator square, in meters.
pub const WEB_MERCATOR_MAX: f64 = 20_037_508.342_8;

/// Padding applied to each side of a degenerate (zero-width or zero-height)
/// feature bound so a lone point still produces a visible map.
const POINT_MARGIN_M: f64 = 50.0;

/// A rectangular bounding box in Web Mercator meters.
///
/// Invariant: `min_x < max_x`, `min_y < max_y`, and every coordinate lies
/// within `[-WEB_MERCATOR_MAX, WEB_MERCATOR_MAX]`. Constructed through
/// [`GeoExtent::clipped`] or [`resolve_extent`] and immutable afterward.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoExtent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl GeoExtent {
    /// Clip each coordinate to the valid projection range, then validate
    /// that the box still has area.
    pub fn clipped(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self, RenderError> {
        let clip = |v: f64| v.clamp(-WEB_MERCATOR_MAX, WEB_MERCATOR_MAX);
        let (min_x, min_y, max_x, max_y) = (clip(min_x), clip(min_y), clip(max_x), clip(max_y));

        // NaN coordinates fail the ordering check and land here too.
        if min_x < max_x && min_y < max_y {
            Ok(Self {
                min_x,
                min_y,
                max_x,
                max_y,
            })
        } else {
            Err(RenderError::InvalidExtent {
                min_x,
                min_y,
                max_x,
                max_y,
            })
        }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Pad the shorter axis so the extent matches the given width/height
    /// ratio, keeping the center fixed. Padding that would leave the valid
    /// projection range is clipped back, which may leave the ratio
    /// approximate near the world edge.
    #[must_use]
    pub fn expand_to_aspect(self, ratio: f64) -> Self {
        if !ratio.is_finite() || ratio <= 0.0 {
            return self;
        }

        let width = self.width();
        let height = self.height();
        let current = width / height;

        let (mut min_x, mut min_y, mut max_x, mut max_y) =
            (self.min_x, self.min_y, self.max_x, self.max_y);

        if current < ratio {
            let padding = (ratio / current * width - width) / 2.0;
            min_x -= padding;
            max_x += padding;
        } else {
            let padding = (current / ratio * height - height) / 2.0;
            min_y -= padding;
            max_y += padding;
        }

        let clip = |v: f64| v.clamp(-WEB_MERCATOR_MAX, WEB_MERCATOR_MAX);
        Self {
            min_x: clip(min_x),
            min_y: clip(min_y),
            max_x: clip(max_x),
            max_y: clip(max_y),
        }
    }
}

/// Resolve the extent for a render: the user override when given, otherwise
/// the union bounding box of all feature geometries.
///
/// Override coordinates are `[min_x, min_y, max_x, max_y]` in projected
/// meters and are clipped the same way feature bounds are.
pub fn resolve_extent(
    features: &[Feature],
    override_bounds: Option<[f64; 4]>,
) -> Result<GeoExtent, RenderError> {
    if let Some([min_x, min_y, max_x, max_y]) = override_bounds {
        return GeoExtent::clipped(min_x, min_y, max_x, max_y);
    }

    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    let mut seen = false;

    for feature in features {
        for point in feature.geometry.points() {
            min_x = min_x.min(point.x);
            min_y = min_y.min(point.y);
            max_x = max_x.max(point.x);
            max_y = max_y.max(point.y);
            seen = true;
        }
    }

    if !seen {
        return Err(RenderError::EmptyInput);
    }

    // A single point (or axis-aligned line) has no area; give it some.
    if min_x == max_x {
        min_x -= POINT_MARGIN_M;
        max_x += POINT_MARGIN_M;
    }
    if min_y == max_y {
        min_y -= POINT_MARGIN_M;
        max_y += POINT_MARGIN_M;
    }

    GeoExtent::clipped(min_x, min_y, max_x, max_y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Geometry, ProjPoint};
    use proptest::prelude::*;

    fn line_feature(points: &[(f64, f64)]) -> Feature {
        Feature::new(Geometry::LineString(
            points.iter().map(|&(x, y)| ProjPoint::new(x, y)).collect(),
        ))
    }

    #[test]
    fn union_of_features_covers_all_points() {
        let features = vec![
            line_feature(&[(0.0, 0.0), (100.0, 50.0)]),
            line_feature(&[(-20.0, 30.0), (10.0, 80.0)]),
        ];
        let extent = resolve_extent(&features, None).unwrap();
        assert_eq!(extent.min_x, -20.0);
        assert_eq!(extent.min_y, 0.0);
        assert_eq!(extent.max_x, 100.0);
        assert_eq!(extent.max_y, 80.0);
    }

    #[test]
    fn no_features_and_no_override_is_empty_input() {
        assert_eq!(resolve_extent(&[], None), Err(RenderError::EmptyInput));
    }

    #[test]
    fn features_without_points_are_empty_input() {
        let features = vec![Feature::new(Geometry::LineString(Vec::new()))];
        assert_eq!(
            resolve_extent(&features, None),
            Err(RenderError::EmptyInput)
        );
    }

    #[test]
    fn override_takes_precedence_over_features() {
        let features = vec![line_feature(&[(0.0, 0.0), (1.0, 1.0)])];
        let extent = resolve_extent(&features, Some([10.0, 20.0, 30.0, 40.0])).unwrap();
        assert_eq!(extent.min_x, 10.0);
        assert_eq!(extent.max_y, 40.0);
    }

    #[test]
    fn zero_width_override_is_invalid() {
        let err = resolve_extent(&[], Some([5.0, 0.0, 5.0, 10.0])).unwrap_err();
        assert!(matches!(err, RenderError::InvalidExtent { .. }));
    }

    #[test]
    fn clipping_that_collapses_the_box_is_invalid() {
        // Entirely outside the valid range on the x axis.
        let err = GeoExtent::clipped(3.0e7, 0.0, 4.0e7, 10.0).unwrap_err();
        assert!(matches!(err, RenderError::InvalidExtent { .. }));
    }

    #[test]
    fn single_point_gets_a_margin() {
        let features = vec![Feature::new(Geometry::Point(ProjPoint::new(100.0, 200.0)))];
        let extent = resolve_extent(&features, None).unwrap();
        assert!(extent.width() > 0.0);
        assert!(extent.height() > 0.0);
        let (cx, cy) = extent.center();
        assert!((cx - 100.0).abs() < 1e-9);
        assert!((cy - 200.0).abs() < 1e-9);
    }

    #[test]
    fn aspect_expansion_pads_the_short_axis() {
        let extent = GeoExtent::clipped(0.0, 0.0, 100.0, 100.0).unwrap();
        let wide = extent.expand_to_aspect(2.0);
        assert!((wide.width() / wide.height() - 2.0).abs() < 1e-9);
        // Height unchanged, width grew symmetrically.
        assert_eq!(wide.min_y, 0.0);
        assert_eq!(wide.max_y, 100.0);
        assert_eq!(wide.center(), extent.center());

        let tall = extent.expand_to_aspect(0.5);
        assert!((tall.width() / tall.height() - 0.5).abs() < 1e-9);
        assert_eq!(tall.min_x, 0.0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_resolved_extents_satisfy_invariants(
            points in prop::collection::vec((-3.0e7_f64..3.0e7, -3.0e7_f64..3.0e7), 1..32)
        ) {
            let features = vec![Feature::new(Geometry::LineString(
                points.iter().map(|&(x, y)| ProjPoint::new(x, y)).collect(),
            ))];
            if let Ok(extent) = resolve_extent(&features, None) {
                prop_assert!(extent.min_x < extent.max_x);
                prop_assert!(extent.min_y < extent.max_y);
                for v in [extent.min_x, extent.min_y, extent.max_x, extent.max_y] {
                    prop_assert!((-WEB_MERCATOR_MAX..=WEB_MERCATOR_MAX).contains(&v));
                }
            }
        }

        #[test]
        fn prop_aspect_expansion_never_leaves_the_valid_range(
            ratio in 0.01_f64..100.0,
            min_x in -2.0e7_f64..1.9e7,
            min_y in -2.0e7_f64..1.9e7,
        ) {
            let extent = GeoExtent::clipped(min_x, min_y, min_x + 1000.0, min_y + 1000.0).unwrap();
            let expanded = extent.expand_to_aspect(ratio);
            prop_assert!(expanded.min_x < expanded.max_x);
            prop_assert!(expanded.min_y < expanded.max_y);
            for v in [expanded.min_x, expanded.min_y, expanded.max_x, expanded.max_y] {
                prop_assert!((-WEB_MERCATOR_MAX..=WEB_MERCATOR_MAX).contains(&v));
            }
        }
    }
}
