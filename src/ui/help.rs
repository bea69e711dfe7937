//! Help overlay: scrollable keybinding table.
//!
//! Lists the registry's actual bindings, including config overrides, grouped
//! by context.

use crate::app::App;
use crate::keybindings::Context;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Row, Table},
    Frame,
};

const CONTEXT_ORDER: [Context; 4] = [Context::Global, Context::List, Context::Reader, Context::Help];

/// Render the help overlay on top of the current view.
pub fn render(f: &mut Frame, app: &App) {
    let overlay = centered_rect(80, 80, f.area());
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }
    let palette = app.theme.palette();

    f.render_widget(Clear, overlay);

    let bindings = app.keybindings.all_bindings();
    let mut rows: Vec<Row> = Vec::new();
    for ctx in CONTEXT_ORDER {
        let mut group = bindings.iter().filter(|(c, _, _)| *c == ctx).peekable();
        if group.peek().is_none() {
            continue;
        }
        if !rows.is_empty() {
            rows.push(Row::new(vec![String::new(), String::new()]));
        }
        rows.push(Row::new(vec![
            Line::from(Span::styled(format!("-- {} --", ctx.title()), palette.help_section)),
            Line::from(""),
        ]));
        for (_, key, description) in group {
            rows.push(Row::new(vec![
                Line::from(Span::styled(format!("  {}", key), palette.help_key)),
                Line::from(*description),
            ]));
        }
    }

    // -2 border, -2 header row and margin
    let visible_height = overlay.height.saturating_sub(4) as usize;
    let max_scroll = rows.len().saturating_sub(visible_height);
    let scroll = app.help_scroll_offset.min(max_scroll);
    let visible_rows: Vec<Row> = rows.into_iter().skip(scroll).take(visible_height).collect();

    let title = if max_scroll > 0 {
        format!(" Help ({}/{}) j/k scroll ", scroll + 1, max_scroll + 1)
    } else {
        " Help (? to close) ".to_string()
    };

    let table = Table::new(visible_rows, [Constraint::Length(16), Constraint::Min(20)])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(palette.help_border)
                .title(title),
        )
        .header(
            Row::new(vec!["Key", "Action"])
                .style(Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED))
                .bottom_margin(1),
        )
        .style(palette.reader_body);

    f.render_widget(table, overlay);
}

/// Centered rectangle covering the given percentage of `area`.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
