use crate::app::{App, State};
use crate::keybindings::{Action, Context};
use ratatui::{layout::Rect, widgets::Paragraph, Frame};
use std::borrow::Cow;

const LIST_HINTS: &[(Action, &str)] = &[
    (Action::NavDown, "down"),
    (Action::Select, "open"),
    (Action::ToggleRead, "read"),
    (Action::ToggleStar, "star"),
    (Action::MarkAllRead, "all read"),
    (Action::Save, "save"),
    (Action::OpenInBrowser, "browser"),
    (Action::Refresh, "reload"),
    (Action::ToggleListing, "starred"),
    (Action::ShowHelp, "help"),
    (Action::Quit, "quit"),
];

const READER_HINTS: &[(Action, &str)] = &[
    (Action::Back, "back"),
    (Action::ScrollDown, "scroll"),
    (Action::PageDown, "page"),
    (Action::ToggleRead, "unread"),
    (Action::ToggleStar, "star"),
    (Action::FetchOriginal, "full text"),
    (Action::Save, "save"),
    (Action::OpenInBrowser, "browser"),
    (Action::Quit, "quit"),
];

const LOADING_HINTS: &[(Action, &str)] = &[(Action::ShowHelp, "help"), (Action::Quit, "quit")];

const ERROR_HINTS: &[(Action, &str)] = &[(Action::Quit, "quit")];

/// Key hints for the current state, using the keys actually bound.
fn key_hints(app: &App) -> String {
    let (context, hints) = match app.state() {
        State::Loading => (Context::Global, LOADING_HINTS),
        State::List => (Context::List, LIST_HINTS),
        State::Reading => (Context::Reader, READER_HINTS),
        State::Error => (Context::Global, ERROR_HINTS),
    };
    hints
        .iter()
        .filter_map(|(action, label)| {
            app.keybindings
                .key_for(context, *action)
                .map(|key| format!("[{}] {}", key, label))
        })
        .collect::<Vec<_>>()
        .join("  ")
}

/// Render the status bar: the transient message if any, otherwise key hints.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }
    let palette = app.theme.palette();

    let (text, style): (Cow<'_, str>, _) = if let Some((msg, _)) = &app.status_message {
        (Cow::Borrowed(msg.as_ref()), palette.status_message)
    } else {
        (Cow::Owned(key_hints(app)), palette.status_bar)
    };

    f.render_widget(Paragraph::new(text).style(style), area);
}
