//! Pixel-level drawing primitives.
//!
//! Each feature is drawn into a boolean coverage mask first and composited
//! over the buffer in a single pass, so overlapping strokes within one
//! feature never double-blend at partial opacity.

use crate::buffer::{PixelBuffer, Rgba};

/// Boolean coverage mask matching the pixel buffer's dimensions.
#[derive(Debug, Clone)]
pub struct Mask {
    bits: Vec<bool>,
    width: u32,
    height: u32,
}

impl Mask {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            bits: vec![false; (width * height) as usize],
            width,
            height,
        }
    }

    pub fn set(&mut self, x: i64, y: i64) {
        if x >= 0 && y >= 0 && x < i64::from(self.width) && y < i64::from(self.height) {
            self.bits[(y as u32 * self.width + x as u32) as usize] = true;
        }
    }

    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.bits[(y * self.width + x) as usize]
    }

    /// Draw a line from (x0, y0) to (x1, y1) using Bresenham's algorithm,
    /// stamping a disc at each step when `thickness > 1`.
    pub fn draw_line(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, thickness: u32) {
        let radius = i64::from(thickness.saturating_sub(1) / 2);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let mut x = x0;
        let mut y = y0;

        loop {
            if radius > 0 {
                self.fill_disc(x, y, radius);
            } else {
                self.set(x, y);
            }

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                if x == x1 {
                    break;
                }
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                if y == y1 {
                    break;
                }
                err += dx;
                y += sy;
            }
        }
    }

    /// Fill a disc centered at (cx, cy).
    pub fn fill_disc(&mut self, cx: i64, cy: i64, radius: i64) {
        if radius <= 0 {
            self.set(cx, cy);
            return;
        }

        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= radius * radius {
                    self.set(cx + dx, cy + dy);
                }
            }
        }
    }

    /// Fill a polygon given its rings in pixel coordinates, using even-odd
    /// scanline filling. Passing outer ring and holes together makes the
    /// holes come out unfilled.
    pub fn fill_polygon(&mut self, rings: &[Vec<(f64, f64)>]) {
        let mut crossings: Vec<f64> = Vec::new();

        for y in 0..self.height {
            let yc = f64::from(y) + 0.5;
            crossings.clear();

            for ring in rings {
                if ring.len() < 3 {
                    continue;
                }
                for i in 0..ring.len() {
                    let (x0, y0) = ring[i];
                    let (x1, y1) = ring[(i + 1) % ring.len()];
                    if (y0 <= yc && y1 > yc) || (y1 <= yc && y0 > yc) {
                        crossings.push(x0 + (yc - y0) / (y1 - y0) * (x1 - x0));
                    }
                }
            }

            crossings.sort_by(f64::total_cmp);
            for pair in crossings.chunks_exact(2) {
                // Pixels whose center lies inside the span.
                let start = (pair[0] - 0.5).ceil() as i64;
                let end = (pair[1] - 0.5).floor() as i64;
                for x in start..=end {
                    self.set(x, i64::from(y));
                }
            }
        }
    }
}

impl PixelBuffer {
    /// Composite `color` over every pixel the mask covers.
    pub fn blend_mask(&mut self, mask: &Mask, color: Rgba) {
        for y in 0..self.height().min(mask.height) {
            for x in 0..self.width().min(mask.width) {
                if mask.get(x, y) {
                    self.blend(i64::from(x), i64::from(y), color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pm_core::Rgb;

    #[test]
    fn horizontal_line_covers_every_column() {
        let mut mask = Mask::new(10, 3);
        mask.draw_line(0, 1, 5, 1, 1);
        for x in 0..=5 {
            assert!(mask.get(x, 1), "pixel ({x}, 1) should be set");
        }
        assert!(!mask.get(6, 1));
        assert!(!mask.get(0, 0));
    }

    #[test]
    fn diagonal_line_hits_the_diagonal() {
        let mut mask = Mask::new(10, 10);
        mask.draw_line(0, 0, 5, 5, 1);
        for i in 0..=5 {
            assert!(mask.get(i, i), "pixel ({i}, {i}) should be set");
        }
    }

    #[test]
    fn thick_line_is_wider_than_one_pixel() {
        let mut mask = Mask::new(10, 10);
        mask.draw_line(0, 5, 9, 5, 3);
        assert!(mask.get(4, 4));
        assert!(mask.get(4, 5));
        assert!(mask.get(4, 6));
    }

    #[test]
    fn out_of_bounds_coordinates_are_clipped() {
        let mut mask = Mask::new(4, 4);
        mask.draw_line(-5, -5, 8, 8, 1);
        assert!(mask.get(1, 1));
    }

    #[test]
    fn square_polygon_fills_its_interior() {
        let mut mask = Mask::new(10, 10);
        mask.fill_polygon(&[vec![(1.0, 1.0), (8.0, 1.0), (8.0, 8.0), (1.0, 8.0)]]);
        assert!(mask.get(4, 4));
        assert!(mask.get(2, 2));
        assert!(!mask.get(0, 0));
        assert!(!mask.get(9, 9));
    }

    #[test]
    fn polygon_hole_stays_empty() {
        let mut mask = Mask::new(20, 20);
        mask.fill_polygon(&[
            vec![(0.0, 0.0), (20.0, 0.0), (20.0, 20.0), (0.0, 20.0)],
            vec![(5.0, 5.0), (15.0, 5.0), (15.0, 15.0), (5.0, 15.0)],
        ]);
        assert!(mask.get(2, 2));
        assert!(!mask.get(10, 10), "hole interior should stay unset");
        assert!(mask.get(17, 17));
    }

    #[test]
    fn degenerate_rings_are_ignored() {
        let mut mask = Mask::new(5, 5);
        mask.fill_polygon(&[vec![(1.0, 1.0), (2.0, 2.0)]]);
        for y in 0..5 {
            for x in 0..5 {
                assert!(!mask.get(x, y));
            }
        }
    }

    #[test]
    fn mask_blend_touches_each_covered_pixel_once() {
        let mut buffer = PixelBuffer::filled(4, 1, Rgb::BLACK);
        let mut mask = Mask::new(4, 1);
        // Overlapping strokes still cover each pixel exactly once.
        mask.draw_line(0, 0, 2, 0, 1);
        mask.draw_line(1, 0, 3, 0, 1);
        buffer.blend_mask(&mask, Rgba::with_opacity(Rgb::WHITE, 0.5));

        let expected = buffer.get(0, 0).unwrap();
        for x in 1..4 {
            assert_eq!(buffer.get(x, 0).unwrap(), expected);
        }
    }
}
