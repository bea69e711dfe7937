//! Theme system for the TUI.
//!
//! `ThemeVariant` picks a Dark or Light `ColorPalette`; `Theme` layers the
//! user's configured unread/read title colors on top of it.

use crate::config::ThemeConfig;
use ratatui::style::{Color, Modifier, Style};
use std::str::FromStr;

// ============================================================================
// Theme Variant
// ============================================================================

/// Available theme variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeVariant {
    #[default]
    Dark,
    Light,
}

impl ThemeVariant {
    /// Parse a variant name from a string (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    /// Build the `ColorPalette` for this variant.
    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    /// Cycle to the next variant: Dark → Light → Dark.
    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Human-readable name for status display.
    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }
}

// ============================================================================
// Color Palette
// ============================================================================

/// Every semantic UI role mapped to a `Style`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorPalette {
    // -- Entry list --
    pub list_header: Style,
    pub list_unread: Style,
    pub list_read: Style,
    pub list_selected: Style,
    pub list_star: Style,
    pub list_empty: Style,

    // -- Reader --
    pub reader_title: Style,
    pub reader_metadata: Style,
    pub reader_body: Style,
    pub reader_link: Style,

    // -- Chrome --
    pub status_bar: Style,
    pub status_message: Style,
    pub loading: Style,
    pub error: Style,
    pub help_border: Style,
    pub help_key: Style,
    pub help_section: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        Self {
            list_header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            list_unread: Style::default().fg(Color::Reset),
            list_read: Style::default().fg(Color::Gray),
            list_selected: Style::default().bg(Color::DarkGray).fg(Color::White),
            list_star: Style::default().fg(Color::Yellow),
            list_empty: Style::default().fg(Color::DarkGray),

            reader_title: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            reader_metadata: Style::default().fg(Color::DarkGray),
            reader_body: Style::default(),
            reader_link: Style::default().fg(Color::Blue),

            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            status_message: Style::default()
                .bg(Color::DarkGray)
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            loading: Style::default().fg(Color::DarkGray),
            error: Style::default().fg(Color::Red),
            help_border: Style::default().fg(Color::Cyan),
            help_key: Style::default().fg(Color::Yellow),
            help_section: Style::default().add_modifier(Modifier::BOLD),
        }
    }

    fn light() -> Self {
        Self {
            list_header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            list_unread: Style::default().fg(Color::Black),
            list_read: Style::default().fg(Color::DarkGray),
            list_selected: Style::default().bg(Color::Blue).fg(Color::White),
            list_star: Style::default().fg(Color::Magenta),
            list_empty: Style::default().fg(Color::DarkGray),

            reader_title: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            reader_metadata: Style::default().fg(Color::DarkGray),
            reader_body: Style::default().fg(Color::Black),
            reader_link: Style::default().fg(Color::Blue),

            status_bar: Style::default().bg(Color::White).fg(Color::Black),
            status_message: Style::default()
                .bg(Color::White)
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            loading: Style::default().fg(Color::DarkGray),
            error: Style::default().fg(Color::Red),
            help_border: Style::default().fg(Color::Blue),
            help_key: Style::default().fg(Color::Magenta),
            help_section: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        }
    }
}

// ============================================================================
// Theme: palette plus configured overrides
// ============================================================================

/// Parse a configured color: a name ("gray", "light blue"), `#rrggbb`, or a
/// 0-255 palette index.
pub fn parse_color(s: &str) -> Option<Color> {
    Color::from_str(s.trim()).ok()
}

/// Active theme: the variant's palette with title colors from config.
#[derive(Debug, Clone)]
pub struct Theme {
    variant: ThemeVariant,
    palette: ColorPalette,
    unread_color: Option<Color>,
    read_color: Option<Color>,
}

impl Default for Theme {
    fn default() -> Self {
        Self::new(ThemeVariant::Dark, None, None)
    }
}

impl Theme {
    pub fn new(variant: ThemeVariant, unread_color: Option<Color>, read_color: Option<Color>) -> Self {
        let mut theme = Self {
            variant,
            palette: variant.palette(),
            unread_color,
            read_color,
        };
        theme.apply_overrides();
        theme
    }

    /// Build from the `[theme]` config table. Unrecognised values are logged
    /// and replaced by the palette's own style.
    pub fn from_config(config: &ThemeConfig) -> Self {
        let variant = ThemeVariant::from_str_name(&config.variant).unwrap_or_else(|| {
            tracing::warn!(variant = %config.variant, "Unknown theme variant, using dark");
            ThemeVariant::Dark
        });
        let color = |field: &str, value: &str| {
            let parsed = parse_color(value);
            if parsed.is_none() {
                tracing::warn!(field, value, "Unrecognised color in config, using palette default");
            }
            parsed
        };
        Self::new(
            variant,
            color("unread_color", &config.unread_color),
            color("read_color", &config.read_color),
        )
    }

    fn apply_overrides(&mut self) {
        if let Some(c) = self.unread_color {
            self.palette.list_unread = self.palette.list_unread.fg(c);
        }
        if let Some(c) = self.read_color {
            self.palette.list_read = self.palette.list_read.fg(c);
        }
    }

    pub fn variant(&self) -> ThemeVariant {
        self.variant
    }

    pub fn palette(&self) -> &ColorPalette {
        &self.palette
    }

    /// Switch to the next variant, keeping the configured title colors.
    pub fn cycle(&mut self) {
        *self = Self::new(self.variant.next(), self.unread_color, self.read_color);
    }
}

// ============================================================================
// Tests
// ============================================================================
