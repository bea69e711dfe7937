//! Frame rendering: dispatches to the view for the current session state.

use crate::app::{App, State, STATUS_BAR_ROWS};
use crate::keybindings::{Action, Context};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use super::{entries, help, reader, status};

/// Minimum terminal dimensions for drawing anything but a warning.
pub(super) const MIN_WIDTH: u16 = 20;
pub(super) const MIN_HEIGHT: u16 = 5;

pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();
    if area.width < 1 || area.height < 1 {
        return;
    }
    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        f.render_widget(Paragraph::new("Too small"), area);
        return;
    }

    let [body, status_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(STATUS_BAR_ROWS)]).areas(area);

    match app.state() {
        State::Loading => render_loading(f, app, body),
        State::List => entries::render(f, app, body),
        State::Reading => reader::render(f, app, body),
        State::Error => render_error(f, app, body),
    }
    status::render(f, app, status_area);

    if app.show_help {
        help::render(f, app);
    }
}

fn render_loading(f: &mut Frame, app: &App, area: Rect) {
    let line = Line::from(Span::styled("Loading...", app.theme.palette().loading));
    f.render_widget(Paragraph::new(line), area);
}

fn render_error(f: &mut Frame, app: &App, area: Rect) {
    let style = app.theme.palette().error;
    let message = app.error().unwrap_or("unknown error");
    let quit_key = app
        .keybindings
        .key_for(Context::Global, Action::Quit)
        .unwrap_or_else(|| "q".to_string());
    let text = vec![
        Line::from(Span::styled(format!("Error: {}", message), style)),
        Line::from(""),
        Line::from(Span::styled(
            format!("Press {} to quit.", quit_key),
            style.remove_modifier(Modifier::BOLD),
        )),
    ];
    f.render_widget(Paragraph::new(text).wrap(Wrap { trim: false }), area);
}
