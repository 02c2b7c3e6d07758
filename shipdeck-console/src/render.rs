//! Plain-text rendering of a grid frame.

use std::fmt::Write;

use shipdeck_grid::CellView;
use shipdeck_grid::GridView;
use shipdeck_grid::RecordGrid;
use shipdeck_grid::column::find_column;
use shipdeck_grid::edit::CellState;
use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

/// Pixels per character cell when turning column widths into text widths.
const GLYPH_WIDTH: u32 = 8;
const SEPARATOR: &str = " │ ";

/// Renders the columns intersecting the horizontal viewport, sticky column
/// first, and one line per mounted row.
pub fn render(grid: &RecordGrid, view: &GridView) -> String {
    let viewport = grid.horizontal_scroll().viewport;
    let columns: Vec<_> = view
        .columns
        .iter()
        .filter(|c| {
            let left = c.rendered_left(view.scroll_left);
            c.sticky || (left + f64::from(c.width) > 0.0 && left < viewport)
        })
        .collect();

    let mut out = String::new();
    let counts = &view.counts;
    let _ = write!(out, "{} rows", counts.total);
    for (status, n) in &counts.by_status {
        let _ = write!(out, " · {status} {n}");
    }
    let _ = writeln!(out, " · select all: {}", view.select_all.label());

    let header: Vec<_> = columns
        .iter()
        .map(|c| {
            let title = find_column(grid.columns(), &c.id)
                .map(|def| def.header.as_str())
                .unwrap_or(c.id.as_str());
            fit(title, chars(c.width))
        })
        .collect();
    let _ = writeln!(out, "   {}", header.join(SEPARATOR));

    for row in &view.rows {
        let cells: Vec<_> = columns
            .iter()
            .map(|c| {
                let text = row
                    .cells
                    .iter()
                    .find(|cell| cell.column == c.id)
                    .map(cell_text)
                    .unwrap_or_default();
                fit(&text, chars(c.width))
            })
            .collect();
        let marker = if row.selected { "[x]" } else { "[ ]" };
        let _ = writeln!(out, "{marker}{}", cells.join(SEPARATOR));
    }

    if view.rows.is_empty() {
        let _ = writeln!(out, "   (no rows)");
    }
    out
}

fn chars(width: u32) -> usize {
    usize::try_from((width / GLYPH_WIDTH).max(3)).unwrap_or(3)
}

fn cell_text(cell: &CellView) -> String {
    let text = match (&cell.state, &cell.draft) {
        (CellState::Idle, _) | (_, None) => cell.text.clone(),
        (CellState::Editing, Some(draft)) => format!("{draft}▏"),
        (CellState::Saving, Some(draft)) => format!("{draft}…"),
    };
    match (&cell.error, cell.bulk) {
        (Some(error), _) => format!("{text} ! {error}"),
        (None, true) => format!("{text} +"),
        (None, false) => text,
    }
}

/// Pads or truncates to exactly `width` terminal cells.
pub fn fit(text: &str, width: usize) -> String {
    let text_width = text.width();
    if text_width <= width {
        return format!("{text}{}", " ".repeat(width - text_width));
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    used += 1;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_pads_short_text() {
        assert_eq!(fit("MSC", 5), "MSC  ");
    }

    #[test]
    fn test_fit_truncates_long_text() {
        assert_eq!(fit("SANTOS EXPRESS", 8), "SANTOS …");
        assert_eq!(fit("SANTOS EXPRESS", 8).width(), 8);
    }

    #[test]
    fn test_fit_counts_wide_glyphs() {
        let fitted = fit("東京港", 5);
        assert_eq!(fitted.width(), 5);
        assert!(fitted.ends_with('…') || fitted.ends_with(' '));
    }
}
