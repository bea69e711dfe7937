//! Input handling for the TUI.
//!
//! Keys are resolved to actions through the keybinding registry for the
//! current context, then applied to the session. Remote work produced by an
//! action is returned to the caller for dispatch.

use crate::app::{App, Command, State};
use crate::keybindings::{Action as KbAction, Context as KbContext};
use crossterm::event::{KeyCode, KeyModifiers};

use super::Action;

/// Keybinding context for the current session state.
fn context_for(app: &App) -> KbContext {
    if app.show_help {
        return KbContext::Help;
    }
    match app.state() {
        State::List => KbContext::List,
        State::Reading => KbContext::Reader,
        State::Loading | State::Error => KbContext::Global,
    }
}

/// Handle one key press. Commands produced by the key are appended to
/// `commands`.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    commands: &mut Vec<Command>,
) -> Action {
    let context = context_for(app);
    let Some(action) = app.keybindings.action_for_key(code, modifiers, context) else {
        return Action::Continue;
    };
    tracing::debug!(?action, ?context, "Key action");
    apply_action(app, action, commands)
}

/// Apply a resolved action to the session.
pub(super) fn apply_action(app: &mut App, action: KbAction, commands: &mut Vec<Command>) -> Action {
    if action == KbAction::Quit {
        return Action::Quit;
    }
    // Error is a dead end: only quit is accepted.
    if app.state() == State::Error {
        return Action::Continue;
    }
    if app.show_help {
        match action {
            KbAction::ShowHelp => app.toggle_help(),
            KbAction::Back => app.back(),
            KbAction::ScrollDown => app.scroll_down(1),
            KbAction::ScrollUp => app.scroll_up(1),
            _ => {}
        }
        return Action::Continue;
    }

    match action {
        KbAction::Quit => return Action::Quit,
        KbAction::NavDown => app.nav_down(),
        KbAction::NavUp => app.nav_up(),
        KbAction::Select => commands.extend(app.select()),
        KbAction::Back => app.back(),
        KbAction::Refresh => commands.extend(app.refresh()),
        KbAction::RefreshFeeds => commands.extend(app.refresh_feeds()),
        KbAction::ToggleRead => commands.extend(app.toggle_read()),
        KbAction::ToggleStar => commands.extend(app.toggle_star()),
        KbAction::ToggleListing => commands.extend(app.toggle_listing()),
        KbAction::MarkAllRead => commands.extend(app.mark_all_read()),
        KbAction::Save => commands.extend(app.save()),
        KbAction::OpenInBrowser => commands.extend(app.open_in_browser()),
        KbAction::FetchOriginal => commands.extend(app.fetch_original()),
        KbAction::ScrollDown => app.scroll_down(1),
        KbAction::ScrollUp => app.scroll_up(1),
        KbAction::PageDown => app.page_down(),
        KbAction::PageUp => app.page_up(),
        KbAction::CycleTheme => app.cycle_theme(),
        KbAction::ShowHelp => app.toggle_help(),
    }
    Action::Continue
}
