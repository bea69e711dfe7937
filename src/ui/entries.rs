use crate::app::App;
use crate::util::{strip_control_chars, truncate_to_width};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use std::ops::Range;

/// Rows above the entry window: title, blank line and padding.
pub const LIST_CHROME_ROWS: u16 = 4;

const STAR_MARKER: &str = "★ ";
const NO_STAR: &str = "  ";

/// Visible subrange of a collection of `len` entries for a list `height` rows tall.
///
/// The window starts at 0 and only slides forward once the cursor moves past
/// its last row, keeping the cursor on the bottom row from then on. A zero
/// height or empty collection gives an empty window.
///
/// ```
/// use cliflux::ui::visible_window;
///
/// assert_eq!(visible_window(10, 2, 5), 0..5);
/// assert_eq!(visible_window(10, 7, 5), 3..8);
/// assert_eq!(visible_window(3, 0, 5), 0..3);
/// ```
pub fn visible_window(len: usize, cursor: usize, height: usize) -> Range<usize> {
    if len == 0 || height == 0 {
        return 0..0;
    }
    let cursor = cursor.min(len - 1);
    let start = if cursor >= height { cursor + 1 - height } else { 0 };
    let end = (start + height).min(len);
    start..end
}

/// Render the entry list: a title row, a blank row, then the windowed rows.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let palette = app.theme.palette();
    let width = area.width as usize;

    let mut lines: Vec<Line> = Vec::with_capacity(area.height as usize);
    lines.push(Line::from(Span::styled(
        format!("Miniflux Feeds - {}", app.listing().name()),
        palette.list_header,
    )));
    lines.push(Line::from(""));

    let entries = app.entries();
    if entries.is_empty() {
        lines.push(Line::from(Span::styled("No entries", palette.list_empty)));
    }

    let window = visible_window(entries.len(), app.cursor(), app.list_height());
    for (i, entry) in entries[window.clone()].iter().enumerate() {
        let index = window.start + i;
        let is_cursor = index == app.cursor();

        let pointer = if is_cursor { "> " } else { "  " };
        let title_style = if is_cursor {
            palette.list_selected
        } else if entry.is_unread() {
            palette.list_unread
        } else {
            palette.list_read
        };
        let star = if entry.starred {
            Span::styled(STAR_MARKER, palette.list_star)
        } else {
            Span::raw(NO_STAR)
        };

        let title = strip_control_chars(&entry.title);
        let title = truncate_to_width(&title, width.saturating_sub(4)).into_owned();

        lines.push(Line::from(vec![
            Span::styled(pointer, title_style),
            star,
            Span::styled(title, title_style),
        ]));
    }

    f.render_widget(Paragraph::new(lines), area);
}
