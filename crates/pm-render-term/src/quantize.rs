//! Pixel-to-cell quantization strategies.
//!
//! Each strategy is a pure mapping from one rectangular region of the
//! pixel buffer to one terminal cell. Regions are computed by proportional
//! partitioning with floor-division boundaries: cell `i` of `n` over a
//! length-`len` axis covers `[i*len/n, (i+1)*len/n)`. Boundaries are
//! monotone, so every pixel belongs to exactly one cell with no gaps or
//! overlaps. When the grid is larger than the buffer, an empty region
//! falls back to its nearest source pixel.

use pm_core::{RendererKind, Rgb};
use pm_raster::PixelBuffer;

use crate::cell::{CellGrid, TerminalCell};

/// Quantize the buffer onto a `rows x cols` grid with the selected
/// strategy. Always returns exactly `rows x cols` cells.
#[must_use]
pub fn quantize(buffer: &PixelBuffer, rows: usize, cols: usize, kind: RendererKind) -> CellGrid {
    let rows = rows.max(1);
    let cols = cols.max(1);
    let mut grid = CellGrid::new(rows, cols, TerminalCell::filled(Rgb::BLACK));

    for row in 0..rows {
        let (y0, y1) = span(row, rows, buffer.height());
        for col in 0..cols {
            let (x0, x1) = span(col, cols, buffer.width());
            let region = Region {
                buffer,
                x0,
                x1,
                y0,
                y1,
            };
            let cell = match kind {
                RendererKind::Block => block_cell(&region),
                RendererKind::Half => half_cell(&region),
                RendererKind::Quadrant => quadrant_cell(&region),
                RendererKind::Braille => braille_cell(&region),
            };
            grid.set(row, col, cell);
        }
    }

    grid
}

/// Floor-division partition boundaries for cell `index` of `count` over a
/// `len`-pixel axis. Empty spans (grid larger than buffer) clamp to the
/// nearest single pixel.
fn span(index: usize, count: usize, len: u32) -> (u32, u32) {
    let start = (index as u64 * u64::from(len) / count as u64) as u32;
    let end = ((index as u64 + 1) * u64::from(len) / count as u64) as u32;
    if start < end {
        (start, end)
    } else {
        let clamped = start.min(len.saturating_sub(1));
        (clamped, clamped + 1)
    }
}

/// One rectangular slice of the source buffer.
struct Region<'a> {
    buffer: &'a PixelBuffer,
    x0: u32,
    x1: u32,
    y0: u32,
    y1: u32,
}

impl Region<'_> {
    fn average(&self) -> Rgb {
        let (mut r, mut g, mut b, mut count) = (0_u64, 0_u64, 0_u64, 0_u64);
        for y in self.y0..self.y1 {
            for x in self.x0..self.x1 {
                if let Some(pixel) = self.buffer.get(x, y) {
                    r += u64::from(pixel.r);
                    g += u64::from(pixel.g);
                    b += u64::from(pixel.b);
                    count += 1;
                }
            }
        }
        if count == 0 {
            Rgb::BLACK
        } else {
            Rgb::new(
                (r / count) as u8,
                (g / count) as u8,
                (b / count) as u8,
            )
        }
    }

    /// Sub-region `(ix, iy)` of an `nx x ny` split, with the same
    /// clamped floor-division rule as the top-level partition.
    fn sub(&self, ix: u32, nx: u32, iy: u32, ny: u32) -> Self {
        let (dx0, dx1) = sub_span(ix, nx, self.x1 - self.x0);
        let (dy0, dy1) = sub_span(iy, ny, self.y1 - self.y0);
        Self {
            buffer: self.buffer,
            x0: self.x0 + dx0,
            x1: self.x0 + dx1,
            y0: self.y0 + dy0,
            y1: self.y0 + dy1,
        }
    }
}

fn sub_span(index: u32, count: u32, len: u32) -> (u32, u32) {
    let start = index * len / count;
    let end = (index + 1) * len / count;
    if start < end {
        (start, end)
    } else {
        let clamped = start.min(len.saturating_sub(1));
        (clamped, clamped + 1)
    }
}

/// Average the whole region into a solid full-block cell.
fn block_cell(region: &Region<'_>) -> TerminalCell {
    TerminalCell::filled(region.average())
}

/// Split the region into upper and lower halves: `▀` with the top average
/// as foreground and the bottom average as background.
fn half_cell(region: &Region<'_>) -> TerminalCell {
    let top = region.sub(0, 1, 0, 2).average();
    let bottom = region.sub(0, 1, 1, 2).average();
    TerminalCell {
        glyph: '▀',
        fg: top,
        bg: bottom,
    }
}

/// Classify 2x2 sub-regions against the region's mean luminance and pick
/// the matching quarter-block glyph; bright quadrants become foreground.
fn quadrant_cell(region: &Region<'_>) -> TerminalCell {
    let quads = [
        region.sub(0, 2, 0, 2).average(), // top-left
        region.sub(1, 2, 0, 2).average(), // top-right
        region.sub(0, 2, 1, 2).average(), // bottom-left
        region.sub(1, 2, 1, 2).average(), // bottom-right
    ];
    let mean = quads.iter().map(|c| c.luminance()).sum::<f32>() / 4.0;
    let bright: Vec<bool> = quads.iter().map(|c| c.luminance() >= mean).collect();

    let glyph = match (bright[0], bright[1], bright[2], bright[3]) {
        (false, false, false, false) => ' ',
        (true, false, false, false) => '▘',
        (false, true, false, false) => '▝',
        (true, true, false, false) => '▀',
        (false, false, true, false) => '▖',
        (true, false, true, false) => '▌',
        (false, true, true, false) => '▞',
        (true, true, true, false) => '▛',
        (false, false, false, true) => '▗',
        (true, false, false, true) => '▚',
        (false, true, false, true) => '▐',
        (true, true, false, true) => '▜',
        (false, false, true, true) => '▄',
        (true, false, true, true) => '▙',
        (false, true, true, true) => '▟',
        (true, true, true, true) => '█',
    };

    let fg = mean_of(quads.iter().zip(&bright).filter(|(_, b)| **b).map(|(c, _)| *c));
    let bg = mean_of(quads.iter().zip(&bright).filter(|(_, b)| !**b).map(|(c, _)| *c));
    let fg = fg.unwrap_or_else(|| region.average());
    TerminalCell {
        glyph,
        fg,
        bg: bg.unwrap_or(fg),
    }
}

/// Threshold 2x4 sub-regions against the region's mean luminance into a
/// braille dot pattern.
fn braille_cell(region: &Region<'_>) -> TerminalCell {
    // Dot bit offsets in the U+2800 block, indexed by (column, row).
    const DOT_BITS: [[u32; 4]; 2] = [[0x01, 0x02, 0x04, 0x40], [0x08, 0x10, 0x20, 0x80]];

    let mut dots = [[Rgb::BLACK; 4]; 2];
    let mut total = 0.0_f32;
    for (cx, column) in dots.iter_mut().enumerate() {
        for (cy, dot) in column.iter_mut().enumerate() {
            *dot = region.sub(cx as u32, 2, cy as u32, 4).average();
            total += dot.luminance();
        }
    }
    let mean = total / 8.0;

    let mut code_point = 0x2800_u32;
    let mut set = Vec::with_capacity(8);
    let mut unset = Vec::with_capacity(8);
    for cx in 0..2 {
        for cy in 0..4 {
            if dots[cx][cy].luminance() >= mean {
                code_point |= DOT_BITS[cx][cy];
                set.push(dots[cx][cy]);
            } else {
                unset.push(dots[cx][cy]);
            }
        }
    }

    let fg = mean_of(set.into_iter()).unwrap_or_else(|| region.average());
    let bg = mean_of(unset.into_iter()).unwrap_or(fg);
    TerminalCell {
        glyph: char::from_u32(code_point).unwrap_or(' '),
        fg,
        bg,
    }
}

fn mean_of(colors: impl Iterator<Item = Rgb>) -> Option<Rgb> {
    let (mut r, mut g, mut b, mut count) = (0_u32, 0_u32, 0_u32, 0_u32);
    for color in colors {
        r += u32::from(color.r);
        g += u32::from(color.g);
        b += u32::from(color.b);
        count += 1;
    }
    (count > 0).then(|| Rgb::new((r / count) as u8, (g / count) as u8, (b / count) as u8))
}
