//! The terminal cell grid.

use pm_core::Rgb;

/// One character position: a glyph plus exact foreground and background
/// RGB triples. Degradation to indexed palettes is left to the writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalCell {
    pub glyph: char,
    pub fg: Rgb,
    pub bg: Rgb,
}

impl TerminalCell {
    /// A solid cell in a single color.
    #[must_use]
    pub const fn filled(color: Rgb) -> Self {
        Self {
            glyph: '█',
            fg: color,
            bg: color,
        }
    }
}

/// Row-major grid of terminal cells, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellGrid {
    cells: Vec<TerminalCell>,
    rows: usize,
    cols: usize,
}

impl CellGrid {
    /// Create a grid filled with one cell value. Zero dimensions are
    /// clamped to one.
    #[must_use]
    pub fn new(rows: usize, cols: usize, fill: TerminalCell) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        Self {
            cells: vec![fill; rows * cols],
            rows,
            cols,
        }
    }

    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<TerminalCell> {
        self.index(row, col).map(|i| self.cells[i])
    }

    pub fn set(&mut self, row: usize, col: usize, cell: TerminalCell) {
        if let Some(index) = self.index(row, col) {
            self.cells[index] = cell;
        }
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        if row < self.rows && col < self.cols {
            Some(row * self.cols + col)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_uniform() {
        let fill = TerminalCell::filled(Rgb::new(1, 2, 3));
        let grid = CellGrid::new(3, 5, fill);
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cols(), 5);
        for row in 0..3 {
            for col in 0..5 {
                assert_eq!(grid.get(row, col), Some(fill));
            }
        }
    }

    #[test]
    fn out_of_bounds_access_is_none_and_set_is_ignored() {
        let fill = TerminalCell::filled(Rgb::BLACK);
        let mut grid = CellGrid::new(2, 2, fill);
        assert_eq!(grid.get(2, 0), None);
        grid.set(0, 9, TerminalCell::filled(Rgb::WHITE));
        assert_eq!(grid.get(0, 1), Some(fill));
    }

    #[test]
    fn zero_dimensions_clamp_to_one() {
        let grid = CellGrid::new(0, 0, TerminalCell::filled(Rgb::BLACK));
        assert_eq!(grid.rows(), 1);
        assert_eq!(grid.cols(), 1);
    }
}
