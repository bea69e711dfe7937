//! Keybinding registry: maps keys to session actions, with config overrides.
//!
//! Bindings are looked up per [`Context`] first and then in
//! [`Context::Global`], so the same key can mean "move the cursor" in the
//! list and "scroll" in the reader.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

/// All user-facing actions that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    NavDown,
    NavUp,
    Select,
    Back,
    Refresh,
    RefreshFeeds,
    ToggleRead,
    ToggleStar,
    ToggleListing,
    MarkAllRead,
    Save,
    OpenInBrowser,
    FetchOriginal,
    ScrollDown,
    ScrollUp,
    PageDown,
    PageUp,
    CycleTheme,
    ShowHelp,
}

impl Action {
    /// Human-readable description for the help screen.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit",
            Self::NavDown => "Move down",
            Self::NavUp => "Move up",
            Self::Select => "Open entry",
            Self::Back => "Back to list",
            Self::Refresh => "Reload entries",
            Self::RefreshFeeds => "Ask server to refresh all feeds",
            Self::ToggleRead => "Toggle read",
            Self::ToggleStar => "Toggle star",
            Self::ToggleListing => "Switch unread/starred listing",
            Self::MarkAllRead => "Mark all as read",
            Self::Save => "Save entry to third-party service",
            Self::OpenInBrowser => "Open in browser",
            Self::FetchOriginal => "Fetch original article content",
            Self::ScrollDown => "Scroll down one line",
            Self::ScrollUp => "Scroll up one line",
            Self::PageDown => "Page down",
            Self::PageUp => "Page up",
            Self::CycleTheme => "Cycle theme",
            Self::ShowHelp => "Toggle help",
        }
    }
}

/// Parse an action name string (from config) into an Action.
fn parse_action_name(name: &str) -> Option<Action> {
    match name.to_lowercase().as_str() {
        "quit" => Some(Action::Quit),
        "nav_down" | "down" => Some(Action::NavDown),
        "nav_up" | "up" => Some(Action::NavUp),
        "select" | "enter" | "open_entry" => Some(Action::Select),
        "back" => Some(Action::Back),
        "refresh" | "reload" => Some(Action::Refresh),
        "refresh_feeds" => Some(Action::RefreshFeeds),
        "toggle_read" | "read" => Some(Action::ToggleRead),
        "toggle_star" | "star" | "bookmark" => Some(Action::ToggleStar),
        "toggle_listing" | "starred" => Some(Action::ToggleListing),
        "mark_all_read" => Some(Action::MarkAllRead),
        "save" => Some(Action::Save),
        "open_in_browser" | "open" => Some(Action::OpenInBrowser),
        "fetch_original" | "original" => Some(Action::FetchOriginal),
        "scroll_down" => Some(Action::ScrollDown),
        "scroll_up" => Some(Action::ScrollUp),
        "page_down" => Some(Action::PageDown),
        "page_up" => Some(Action::PageUp),
        "cycle_theme" | "theme" => Some(Action::CycleTheme),
        "show_help" | "help" => Some(Action::ShowHelp),
        _ => None,
    }
}

// ============================================================================
// Context Enum
// ============================================================================

/// Dispatch context; determines which bindings are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    List,
    Reader,
    Help,
}

impl Context {
    pub fn title(self) -> &'static str {
        match self {
            Self::Global => "Global",
            Self::List => "Entry list",
            Self::Reader => "Reader",
            Self::Help => "Help",
        }
    }
}

// ============================================================================
// Key Specification
// ============================================================================

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ch(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }
}

/// Parse a key string from config into a KeySpec.
///
/// Supported formats:
/// - Single char: "q", "j", "?"
/// - Named keys: "Enter", "Esc", "Tab", "Up", "Down", "PageUp", "PageDown", "Space"
/// - Modifier combos: "Ctrl+d"
/// - Function keys: "F1" through "F12"
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+").or_else(|| s.strip_prefix("ctrl+")) {
        let mut chars = rest.trim().chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) => Some(KeySpec::ctrl(c.to_ascii_lowercase())),
            _ => None,
        };
    }

    let named = match s.to_lowercase().as_str() {
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "pageup" | "pgup" => Some(KeyCode::PageUp),
        "pagedown" | "pgdn" => Some(KeyCode::PageDown),
        "home" => Some(KeyCode::Home),
        "end" => Some(KeyCode::End),
        "backspace" => Some(KeyCode::Backspace),
        "space" => Some(KeyCode::Char(' ')),
        _ => None,
    };
    if let Some(code) = named {
        return Some(KeySpec::plain(code));
    }

    if let Some(n) = s.strip_prefix(['F', 'f']).and_then(|n| n.parse::<u8>().ok()) {
        return (1..=12).contains(&n).then(|| KeySpec::plain(KeyCode::F(n)));
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(KeySpec::ch(c)),
        _ => None,
    }
}

/// Format a KeySpec as a human-readable string for the help screen.
fn format_key(key: &KeySpec) -> String {
    let modifier = if key.modifiers.contains(KeyModifiers::CONTROL) {
        "Ctrl+"
    } else {
        ""
    };

    let key_name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };

    format!("{}{}", modifier, key_name)
}

// ============================================================================
// Keybinding Registry
// ============================================================================

const DEFAULT_BINDINGS: &[(Context, KeySpec, Action)] = &[
    // Global
    (Context::Global, KeySpec::ch('q'), Action::Quit),
    (Context::Global, KeySpec::ctrl('c'), Action::Quit),
    (Context::Global, KeySpec::ch('?'), Action::ShowHelp),
    (Context::Global, KeySpec::ch('T'), Action::CycleTheme),
    // Entry list
    (Context::List, KeySpec::ch('j'), Action::NavDown),
    (Context::List, KeySpec::plain(KeyCode::Down), Action::NavDown),
    (Context::List, KeySpec::ch('k'), Action::NavUp),
    (Context::List, KeySpec::plain(KeyCode::Up), Action::NavUp),
    (Context::List, KeySpec::plain(KeyCode::Enter), Action::Select),
    (Context::List, KeySpec::ch('r'), Action::Refresh),
    (Context::List, KeySpec::ch('R'), Action::RefreshFeeds),
    (Context::List, KeySpec::ch('m'), Action::ToggleRead),
    (Context::List, KeySpec::ch('s'), Action::ToggleStar),
    (Context::List, KeySpec::ch('S'), Action::ToggleListing),
    (Context::List, KeySpec::ch('A'), Action::MarkAllRead),
    (Context::List, KeySpec::ch('e'), Action::Save),
    (Context::List, KeySpec::ch('o'), Action::OpenInBrowser),
    // Reader
    (Context::Reader, KeySpec::plain(KeyCode::Esc), Action::Back),
    (Context::Reader, KeySpec::ch('b'), Action::Back),
    (Context::Reader, KeySpec::ch('j'), Action::ScrollDown),
    (Context::Reader, KeySpec::plain(KeyCode::Down), Action::ScrollDown),
    (Context::Reader, KeySpec::ch('k'), Action::ScrollUp),
    (Context::Reader, KeySpec::plain(KeyCode::Up), Action::ScrollUp),
    (Context::Reader, KeySpec::ctrl('d'), Action::PageDown),
    (Context::Reader, KeySpec::plain(KeyCode::PageDown), Action::PageDown),
    (Context::Reader, KeySpec::ch(' '), Action::PageDown),
    (Context::Reader, KeySpec::ctrl('u'), Action::PageUp),
    (Context::Reader, KeySpec::plain(KeyCode::PageUp), Action::PageUp),
    (Context::Reader, KeySpec::ch('u'), Action::ToggleRead),
    (Context::Reader, KeySpec::ch('s'), Action::ToggleStar),
    (Context::Reader, KeySpec::ch('e'), Action::Save),
    (Context::Reader, KeySpec::ch('o'), Action::OpenInBrowser),
    (Context::Reader, KeySpec::ch('f'), Action::FetchOriginal),
    // Help overlay
    (Context::Help, KeySpec::plain(KeyCode::Esc), Action::Back),
    (Context::Help, KeySpec::ch('j'), Action::ScrollDown),
    (Context::Help, KeySpec::plain(KeyCode::Down), Action::ScrollDown),
    (Context::Help, KeySpec::ch('k'), Action::ScrollUp),
    (Context::Help, KeySpec::plain(KeyCode::Up), Action::ScrollUp),
];

/// Registry of keybindings, supporting default bindings and config overrides.
pub struct KeybindingRegistry {
    lookup: HashMap<(Context, KeySpec), Action>,
    /// Registration order, for the help screen.
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    /// Create a registry with the default bindings.
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::with_capacity(DEFAULT_BINDINGS.len()),
        };
        for &(context, key, action) in DEFAULT_BINDINGS {
            registry.bind(context, key, action);
        }
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        if let Some(previous) = self.lookup.insert((context, key), action) {
            self.bindings
                .retain(|(c, k, a)| !(*c == context && *k == key && *a == previous));
        }
        self.bindings.push((context, key, action));
    }

    /// Apply user overrides from the `[keybindings]` config table.
    ///
    /// Keys in the map are action names (e.g., "quit", "toggle_read").
    /// Values are key strings (e.g., "q", "Ctrl+d", "F5"). The new key
    /// replaces every existing key for that action, in every context the
    /// action was bound in.
    ///
    /// Returns a list of warnings for unrecognized action names or unparseable keys.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        for (action_name, key_str) in overrides {
            let Some(action) = parse_action_name(action_name) else {
                warnings.push(format!("Unknown action '{}', ignoring", action_name));
                continue;
            };
            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{}' for action '{}', ignoring",
                    key_str, action_name
                ));
                continue;
            };

            let mut contexts: Vec<Context> = Vec::new();
            for (c, _, a) in &self.bindings {
                if *a == action && !contexts.contains(c) {
                    contexts.push(*c);
                }
            }

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);

            for ctx in contexts {
                self.bind(ctx, key, action);
            }

            tracing::info!(action = %action_name, key = %key_str, "Applied keybinding override");
        }

        warnings
    }

    /// Look up the action for a key in a context.
    ///
    /// Tries the specific context first, then falls back to Global.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        let key = KeySpec::new(code, modifiers);

        self.lookup.get(&(context, key)).copied().or_else(|| {
            (context != Context::Global)
                .then(|| self.lookup.get(&(Context::Global, key)).copied())
                .flatten()
        })
    }

    /// Display form of the first key bound to `action` in `context`,
    /// falling back to Global.
    pub fn key_for(&self, context: Context, action: Action) -> Option<String> {
        let in_context = |ctx: Context| {
            self.bindings
                .iter()
                .find(|(c, _, a)| *c == ctx && *a == action)
                .map(|(_, key, _)| format_key(key))
        };
        in_context(context).or_else(|| in_context(Context::Global))
    }

    /// All bindings for the help screen: (context, key display, description).
    pub fn all_bindings(&self) -> Vec<(Context, String, &'static str)> {
        self.bindings
            .iter()
            .map(|(ctx, key, action)| (*ctx, format_key(key), action.describe()))
            .collect()
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
