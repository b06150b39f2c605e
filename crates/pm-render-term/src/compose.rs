//! Border, title, and subtitle overlay.
//!
//! The composer mutates the grid in place and never changes its
//! dimensions: decorations reuse existing cell positions.

use pm_core::{RenderConfig, Rgb};

use crate::cell::{CellGrid, TerminalCell};

/// Column count below which titles and subtitles are omitted entirely.
pub const MIN_TITLE_COLS: usize = 8;

/// Glyphs drawn over the outermost cell ring.
#[derive(Debug, Clone, Copy)]
pub struct BorderGlyphs {
    pub horizontal: char,
    pub vertical: char,
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
}

impl BorderGlyphs {
    /// Unicode box-drawing characters (light).
    pub const UNICODE: Self = Self {
        horizontal: '─',
        vertical: '│',
        top_left: '┌',
        top_right: '┐',
        bottom_left: '└',
        bottom_right: '┘',
    };

    /// ASCII fallback characters.
    pub const ASCII: Self = Self {
        horizontal: '-',
        vertical: '|',
        top_left: '+',
        top_right: '+',
        bottom_left: '+',
        bottom_right: '+',
    };
}

/// Stamp the configured border, title, and subtitle onto the grid.
///
/// Titles wider than the available columns are truncated with an ellipsis;
/// below [`MIN_TITLE_COLS`] they are dropped and the grid is returned at
/// its requested size regardless.
pub fn compose(grid: &mut CellGrid, config: &RenderConfig) {
    if config.border {
        stamp_border(grid, config.colors.border, config.colors.background);
    }

    if grid.cols() < MIN_TITLE_COLS {
        return;
    }

    if let Some(title) = config.title.as_deref() {
        stamp_text_row(grid, 0, title, config.colors.border, config.colors.background);
    }
    if let Some(subtitle) = config.subtitle.as_deref() {
        stamp_text_row(
            grid,
            1,
            subtitle,
            config.colors.border,
            config.colors.background,
        );
    }
}

fn stamp_border(grid: &mut CellGrid, fg: Rgb, bg: Rgb) {
    let rows = grid.rows();
    let cols = grid.cols();
    let glyphs = BorderGlyphs::UNICODE;
    let cell = |glyph| TerminalCell { glyph, fg, bg };

    for col in 1..cols.saturating_sub(1) {
        grid.set(0, col, cell(glyphs.horizontal));
        grid.set(rows - 1, col, cell(glyphs.horizontal));
    }
    for row in 1..rows.saturating_sub(1) {
        grid.set(row, 0, cell(glyphs.vertical));
        grid.set(row, cols - 1, cell(glyphs.vertical));
    }

    grid.set(0, 0, cell(glyphs.top_left));
    grid.set(0, cols - 1, cell(glyphs.top_right));
    grid.set(rows - 1, 0, cell(glyphs.bottom_left));
    grid.set(rows - 1, cols - 1, cell(glyphs.bottom_right));
}

/// Center a single line of text on the given row. The text is padded with
/// one blank cell on each side so it reads cleanly over a border line.
fn stamp_text_row(grid: &mut CellGrid, row: usize, text: &str, fg: Rgb, bg: Rgb) {
    let cols = grid.cols();
    let available = cols.saturating_sub(4);
    let truncated = truncate_text(text, available);
    let chars: Vec<char> = truncated.chars().collect();
    if chars.is_empty() {
        return;
    }

    let start = (cols - chars.len().min(cols)) / 2;
    let set = |grid: &mut CellGrid, col: usize, glyph: char| {
        grid.set(row, col, TerminalCell { glyph, fg, bg });
    };

    if start > 0 {
        set(grid, start - 1, ' ');
    }
    for (offset, glyph) in chars.iter().enumerate() {
        set(grid, start + offset, *glyph);
    }
    if start + chars.len() < cols {
        set(grid, start + chars.len(), ' ');
    }
}

/// Sanitize to a single printable line, truncating with an ellipsis when
/// longer than `max_chars`.
fn truncate_text(text: &str, max_chars: usize) -> String {
    let sanitized: String = text
        .chars()
        .map(|ch| match ch {
            '\r' | '\t' => ' ',
            other if other.is_control() => ' ',
            other => other,
        })
        .collect();
    let line = sanitized.lines().next().unwrap_or("").trim().to_string();

    let chars: Vec<char> = line.chars().collect();
    if chars.len() <= max_chars {
        line
    } else if max_chars <= 1 {
        "…".to_string()
    } else {
        format!("{}…", chars[..max_chars - 1].iter().collect::<String>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_grid(rows: usize, cols: usize) -> CellGrid {
        CellGrid::new(rows, cols, TerminalCell::filled(Rgb::new(200, 0, 0)))
    }

    fn config(border: bool, title: Option<&str>) -> RenderConfig {
        RenderConfig {
            border,
            title: title.map(String::from),
            ..RenderConfig::light(10, 5)
        }
    }

    fn row_string(grid: &CellGrid, row: usize) -> String {
        (0..grid.cols())
            .map(|col| grid.get(row, col).unwrap().glyph)
            .collect()
    }

    #[test]
    fn border_overwrites_the_outermost_ring_only() {
        let mut grid = base_grid(5, 10);
        compose(&mut grid, &config(true, None));

        assert_eq!(row_string(&grid, 0), "┌────────┐");
        assert_eq!(row_string(&grid, 4), "└────────┘");
        assert_eq!(grid.get(2, 0).unwrap().glyph, '│');
        assert_eq!(grid.get(2, 9).unwrap().glyph, '│');
        // Interior untouched.
        assert_eq!(grid.get(2, 5).unwrap().glyph, '█');
        assert_eq!(grid.get(2, 5).unwrap().fg, Rgb::new(200, 0, 0));
    }

    #[test]
    fn title_is_centered_in_the_top_border_row() {
        let mut grid = base_grid(5, 12);
        compose(&mut grid, &config(true, Some("Map")));
        let top = row_string(&grid, 0);
        assert_eq!(top.chars().count(), 12);
        assert!(top.contains(" Map "), "top row was {top:?}");
        assert!(top.starts_with('┌'));
        assert!(top.ends_with('┐'));
    }

    #[test]
    fn title_without_border_sits_on_the_first_row() {
        let mut grid = base_grid(5, 12);
        compose(&mut grid, &config(false, Some("Map")));
        assert!(row_string(&grid, 0).contains("Map"));
        assert_eq!(grid.get(4, 0).unwrap().glyph, '█');
    }

    #[test]
    fn long_titles_are_truncated_with_an_ellipsis() {
        let mut grid = base_grid(5, 12);
        compose(
            &mut grid,
            &config(true, Some("An Unreasonably Long Map Title")),
        );
        let top = row_string(&grid, 0);
        assert_eq!(top.chars().count(), 12);
        assert!(top.contains('…'), "top row was {top:?}");
    }

    #[test]
    fn narrow_grids_omit_the_title_but_keep_their_size() {
        let mut grid = base_grid(5, 3);
        compose(&mut grid, &config(false, Some("Map")));
        assert_eq!(grid.rows(), 5);
        assert_eq!(grid.cols(), 3);
        for row in 0..5 {
            for col in 0..3 {
                assert_eq!(grid.get(row, col).unwrap().glyph, '█');
            }
        }
    }

    #[test]
    fn subtitle_lands_on_the_row_below_the_title() {
        let mut grid = base_grid(6, 16);
        let config = RenderConfig {
            border: true,
            title: Some("Title".to_string()),
            subtitle: Some("Sub".to_string()),
            ..RenderConfig::light(16, 6)
        };
        compose(&mut grid, &config);
        assert!(row_string(&grid, 0).contains("Title"));
        assert!(row_string(&grid, 1).contains("Sub"));
    }

    #[test]
    fn control_characters_never_reach_the_grid() {
        let mut grid = base_grid(5, 16);
        compose(&mut grid, &config(false, Some("Ma\u{1b}[31mp")));
        let top = row_string(&grid, 0);
        assert!(!top.contains('\u{1b}'));
    }

    #[test]
    fn one_by_one_grid_survives_composition() {
        let mut grid = base_grid(1, 1);
        compose(&mut grid, &config(true, Some("Map")));
        assert_eq!(grid.rows(), 1);
        assert_eq!(grid.cols(), 1);
    }
}
