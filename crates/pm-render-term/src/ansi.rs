//! Serialization of a cell grid into color-escaped text.
//!
//! Colors are emitted as truecolor escapes. The grid itself keeps exact
//! RGB triples, so a writer for a palette-limited terminal can degrade
//! them before this step instead.

use crossterm::Command;
use crossterm::style::{Color, Colors, ResetColor, SetColors};
use pm_core::Rgb;

use crate::cell::CellGrid;

/// Serialize the grid, one line per cell row. Each line carries its own
/// color state and ends with a reset, so partial output never bleeds into
/// the surrounding terminal.
#[must_use]
pub fn to_ansi(grid: &CellGrid) -> String {
    let mut out = String::with_capacity(grid.rows() * grid.cols() * 24);

    for row in 0..grid.rows() {
        if row > 0 {
            out.push('\n');
        }
        let mut current: Option<(Rgb, Rgb)> = None;
        for col in 0..grid.cols() {
            let Some(cell) = grid.get(row, col) else {
                continue;
            };
            if current != Some((cell.fg, cell.bg)) {
                // Writing to a String cannot fail.
                let _ = SetColors(Colors::new(to_color(cell.fg), to_color(cell.bg)))
                    .write_ansi(&mut out);
                current = Some((cell.fg, cell.bg));
            }
            out.push(cell.glyph);
        }
        let _ = ResetColor.write_ansi(&mut out);
    }

    out
}

const fn to_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

/// Count the printable glyphs on one serialized line, skipping CSI escape
/// sequences. Test helper for width assertions.
#[cfg(test)]
pub(crate) fn visible_width(line: &str) -> usize {
    let mut width = 0;
    let mut chars = line.chars();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            // Skip to the terminating byte of the CSI sequence.
            for follow in chars.by_ref() {
                if follow.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            width += 1;
        }
    }
    width
}
