//! Session state machine.
//!
//! `App` owns the entry collection, the cursor and the reader viewport. Every
//! user operation mutates local state first and returns the [`Command`]s the
//! UI layer must dispatch; results come back later as [`AppEvent`]s. Nothing
//! outside this module mutates the collection.

use crate::content::render_entry;
use crate::keybindings::KeybindingRegistry;
use crate::miniflux::{Entry, Listing, ReadStatus};
use crate::theme::Theme;
use crate::ui::entries::{visible_window, LIST_CHROME_ROWS};
use crate::ui::reader::{ReaderViewport, READER_PADDING_Y};
use std::borrow::Cow;
use std::ops::Range;
use std::time::Duration;
use tokio::time::Instant;

/// Rows taken by the status bar at the bottom of the screen.
pub const STATUS_BAR_ROWS: u16 = 1;

/// How long a status message stays visible.
const STATUS_TTL: Duration = Duration::from_secs(3);

// ============================================================================
// States, commands and events
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Loading,
    List,
    Reading,
    /// Terminal until restart; only quit is accepted.
    Error,
}

/// Remote work requested by a state transition.
///
/// Carries only ids, statuses and URLs, never references into the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    FetchEntries { listing: Listing },
    ChangeStatus { entry_ids: Vec<i64>, status: ReadStatus },
    ToggleBookmark { entry_id: i64 },
    SaveEntry { entry_id: i64 },
    RefreshFeeds,
    FetchOriginalContent { entry_id: i64 },
    OpenUrl { url: String },
}

impl Command {
    /// Short name used in logs and status messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::FetchEntries { .. } => "fetch entries",
            Self::ChangeStatus { .. } => "update status",
            Self::ToggleBookmark { .. } => "toggle star",
            Self::SaveEntry { .. } => "save entry",
            Self::RefreshFeeds => "refresh feeds",
            Self::FetchOriginalContent { .. } => "fetch original content",
            Self::OpenUrl { .. } => "open in browser",
        }
    }
}

/// Outcomes delivered by background tasks.
#[derive(Debug)]
pub enum AppEvent {
    EntriesLoaded {
        listing: Listing,
        entries: Vec<Entry>,
    },
    FetchFailed {
        error: String,
    },
    /// A status change, bookmark, save or feed refresh finished.
    ActionDone {
        action: &'static str,
        result: Result<(), String>,
    },
    OriginalContentLoaded {
        entry_id: i64,
        result: Result<String, String>,
    },
    TaskPanicked {
        task: &'static str,
        error: String,
    },
}

// ============================================================================
// App
// ============================================================================

pub struct App {
    state: State,
    entries: Vec<Entry>,
    cursor: usize,
    listing: Listing,
    reader: ReaderViewport,
    error: Option<String>,
    width: u16,
    height: u16,

    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub show_help: bool,
    pub help_scroll_offset: usize,
    pub theme: Theme,
    pub keybindings: KeybindingRegistry,
    /// Set whenever something visible changed; cleared by the draw loop.
    pub needs_redraw: bool,
}

impl App {
    pub fn new(theme: Theme, keybindings: KeybindingRegistry) -> Self {
        Self {
            state: State::Loading,
            entries: Vec::new(),
            cursor: 0,
            listing: Listing::default(),
            reader: ReaderViewport::default(),
            error: None,
            width: 0,
            height: 0,
            status_message: None,
            show_help: false,
            help_scroll_offset: 0,
            theme,
            keybindings,
            needs_redraw: true,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn state(&self) -> State {
        self.state
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn listing(&self) -> Listing {
        self.listing
    }

    pub fn reader(&self) -> &ReaderViewport {
        &self.reader
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// The entry under the cursor.
    pub fn current(&self) -> Option<&Entry> {
        self.entries.get(self.cursor)
    }

    /// The entry open in the reader. Derived from the cursor, so it can never
    /// disagree with the collection.
    pub fn selected(&self) -> Option<&Entry> {
        match self.state {
            State::Reading => self.current(),
            _ => None,
        }
    }

    /// Rows available for entries in the list view.
    pub fn list_height(&self) -> usize {
        self.height
            .saturating_sub(STATUS_BAR_ROWS + LIST_CHROME_ROWS) as usize
    }

    /// Indices of the entries currently shown in the list.
    pub fn list_window(&self) -> Range<usize> {
        visible_window(self.entries.len(), self.cursor, self.list_height())
    }

    fn reader_height(height: u16) -> usize {
        height.saturating_sub(STATUS_BAR_ROWS + 2 * READER_PADDING_Y) as usize
    }

    // ------------------------------------------------------------------
    // Status messages
    // ------------------------------------------------------------------

    /// Show a transient message in the status bar.
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
        self.needs_redraw = true;
    }

    /// Clear the status message once it is older than three seconds.
    /// Returns true if a message was actually cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed() >= STATUS_TTL {
                self.status_message = None;
                return true;
            }
        }
        false
    }

    // ------------------------------------------------------------------
    // List operations
    // ------------------------------------------------------------------

    pub fn nav_down(&mut self) {
        if self.state == State::List && self.cursor + 1 < self.entries.len() {
            self.cursor += 1;
            self.needs_redraw = true;
        }
    }

    pub fn nav_up(&mut self) {
        if self.state == State::List && self.cursor > 0 {
            self.cursor -= 1;
            self.needs_redraw = true;
        }
    }

    /// Open the entry under the cursor. An unread entry is marked read
    /// locally and one mark-read request is returned.
    pub fn select(&mut self) -> Vec<Command> {
        if self.state != State::List {
            return Vec::new();
        }
        let Some(entry) = self.entries.get_mut(self.cursor) else {
            return Vec::new();
        };

        let mut commands = Vec::new();
        if entry.is_unread() {
            entry.status = ReadStatus::Read;
            commands.push(Command::ChangeStatus {
                entry_ids: vec![entry.id],
                status: ReadStatus::Read,
            });
        }
        let document = render_entry(entry, self.width);
        tracing::debug!(entry_id = entry.id, "Entering reader");

        self.reader.set_document(document);
        self.state = State::Reading;
        self.needs_redraw = true;
        commands
    }

    /// Leave the reader, discarding the rendered document. Also dismisses
    /// the help overlay when it is open.
    pub fn back(&mut self) {
        if self.show_help {
            self.show_help = false;
            self.needs_redraw = true;
            return;
        }
        if self.state == State::Reading {
            self.reader.clear();
            self.state = State::List;
            self.needs_redraw = true;
        }
    }

    /// Reload the current listing.
    pub fn refresh(&mut self) -> Option<Command> {
        if self.state != State::List {
            return None;
        }
        tracing::debug!(listing = self.listing.name(), "Refreshing entries");
        self.state = State::Loading;
        self.needs_redraw = true;
        Some(Command::FetchEntries {
            listing: self.listing,
        })
    }

    /// Switch between the unread and starred listings and load the new one.
    pub fn toggle_listing(&mut self) -> Option<Command> {
        if self.state != State::List {
            return None;
        }
        self.listing = self.listing.next();
        self.refresh()
    }

    /// Flip read status of the entry under the cursor (or open in the reader).
    pub fn toggle_read(&mut self) -> Option<Command> {
        let entry = self.active_entry_mut()?;
        let status = entry.toggle_status();
        let entry_id = entry.id;
        tracing::debug!(entry_id, status = %status, "Toggled read status");
        self.needs_redraw = true;
        Some(Command::ChangeStatus {
            entry_ids: vec![entry_id],
            status,
        })
    }

    pub fn toggle_star(&mut self) -> Option<Command> {
        let entry = self.active_entry_mut()?;
        entry.starred = !entry.starred;
        let entry_id = entry.id;
        tracing::debug!(entry_id, starred = entry.starred, "Toggled star");
        self.needs_redraw = true;
        Some(Command::ToggleBookmark { entry_id })
    }

    /// Mark every unread entry read with a single request.
    pub fn mark_all_read(&mut self) -> Option<Command> {
        if self.state != State::List {
            return None;
        }
        let mut entry_ids = Vec::new();
        for entry in self.entries.iter_mut().filter(|e| e.is_unread()) {
            entry.status = ReadStatus::Read;
            entry_ids.push(entry.id);
        }
        if entry_ids.is_empty() {
            return None;
        }
        tracing::debug!(count = entry_ids.len(), "Marking all entries read");
        self.needs_redraw = true;
        Some(Command::ChangeStatus {
            entry_ids,
            status: ReadStatus::Read,
        })
    }

    pub fn save(&mut self) -> Option<Command> {
        let entry_id = self.active_entry()?.id;
        self.set_status("Saving entry...");
        Some(Command::SaveEntry { entry_id })
    }

    pub fn open_in_browser(&self) -> Option<Command> {
        let entry = self.active_entry()?;
        if entry.url.trim().is_empty() {
            return None;
        }
        Some(Command::OpenUrl {
            url: entry.url.clone(),
        })
    }

    /// Ask the server to refresh all feeds; the local list is unchanged.
    pub fn refresh_feeds(&mut self) -> Option<Command> {
        if self.state != State::List {
            return None;
        }
        self.set_status("Refreshing feeds on server...");
        Some(Command::RefreshFeeds)
    }

    pub fn fetch_original(&mut self) -> Option<Command> {
        let entry_id = self.selected()?.id;
        self.set_status("Fetching original content...");
        Some(Command::FetchOriginalContent { entry_id })
    }

    // ------------------------------------------------------------------
    // Reader and overlay scrolling
    // ------------------------------------------------------------------

    pub fn scroll_down(&mut self, lines: usize) {
        if self.show_help {
            self.help_scroll_offset = self.help_scroll_offset.saturating_add(lines);
        } else if self.state == State::Reading {
            self.reader.scroll_down(lines);
        }
        self.needs_redraw = true;
    }

    pub fn scroll_up(&mut self, lines: usize) {
        if self.show_help {
            self.help_scroll_offset = self.help_scroll_offset.saturating_sub(lines);
        } else if self.state == State::Reading {
            self.reader.scroll_up(lines);
        }
        self.needs_redraw = true;
    }

    pub fn page_down(&mut self) {
        if self.state == State::Reading && !self.show_help {
            self.reader.page_down();
            self.needs_redraw = true;
        }
    }

    pub fn page_up(&mut self) {
        if self.state == State::Reading && !self.show_help {
            self.reader.page_up();
            self.needs_redraw = true;
        }
    }

    pub fn toggle_help(&mut self) {
        if self.state == State::Error {
            return;
        }
        self.show_help = !self.show_help;
        self.help_scroll_offset = 0;
        self.needs_redraw = true;
    }

    pub fn cycle_theme(&mut self) {
        if self.state == State::Error {
            return;
        }
        self.theme.cycle();
        let name = self.theme.variant().name();
        self.set_status(format!("Theme: {}", name));
    }

    // ------------------------------------------------------------------
    // Display size
    // ------------------------------------------------------------------

    /// Apply a new terminal size. While reading, the document is rendered
    /// again at the new width and scrolled back to the top.
    pub fn resize(&mut self, width: u16, height: u16) {
        let width_changed = width != self.width;
        self.width = width;
        self.height = height;
        self.reader.set_height(Self::reader_height(height));

        if self.state == State::Reading {
            if let Some(entry) = self.entries.get(self.cursor) {
                let document = render_entry(entry, width);
                self.reader.set_document(document);
                tracing::debug!(width, height, width_changed, "Re-rendered entry after resize");
            }
        }
        self.needs_redraw = true;
    }

    // ------------------------------------------------------------------
    // Background results
    // ------------------------------------------------------------------

    /// Reconcile a background result with the session.
    pub fn handle_event(&mut self, event: AppEvent) {
        self.needs_redraw = true;
        match event {
            AppEvent::EntriesLoaded { listing, entries } => {
                tracing::info!(count = entries.len(), listing = listing.name(), "Entries loaded");
                self.entries = entries;
                self.listing = listing;
                self.cursor = 0;
                self.reader.clear();
                self.state = State::List;
            }
            AppEvent::FetchFailed { error } => {
                tracing::error!(error = %error, "Failed to fetch entries");
                self.reader.clear();
                self.show_help = false;
                self.error = Some(error);
                self.state = State::Error;
            }
            AppEvent::ActionDone { action, result } => match result {
                Ok(()) => {
                    tracing::debug!(action, "Remote action completed");
                    self.set_status(format!("Done: {}", action));
                }
                Err(error) => {
                    tracing::warn!(action, error = %error, "Remote action failed");
                    self.set_status(format!("Failed to {}: {}", action, error));
                }
            },
            AppEvent::OriginalContentLoaded { entry_id, result } => {
                self.apply_original_content(entry_id, result)
            }
            AppEvent::TaskPanicked { task, error } => {
                tracing::error!(task, error = %error, "Background task panicked");
                self.set_status(format!("Internal error in {}", task));
            }
        }
    }

    fn apply_original_content(&mut self, entry_id: i64, result: Result<String, String>) {
        let content = match result {
            Ok(content) => content,
            Err(error) => {
                tracing::warn!(entry_id, error = %error, "Failed to fetch original content");
                self.set_status(format!("Failed to fetch original content: {}", error));
                return;
            }
        };

        let reading_it = self.selected().is_some_and(|e| e.id == entry_id);
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == entry_id) else {
            tracing::debug!(entry_id, "Original content for an entry no longer listed");
            return;
        };
        entry.content = content;

        if reading_it {
            let document = render_entry(entry, self.width);
            self.reader.set_document(document);
            self.set_status("Loaded original content");
        }
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    /// Entry targeted by per-entry actions: the cursor row in the list, the
    /// open entry in the reader.
    fn active_entry(&self) -> Option<&Entry> {
        match self.state {
            State::List | State::Reading => self.current(),
            State::Loading | State::Error => None,
        }
    }

    fn active_entry_mut(&mut self) -> Option<&mut Entry> {
        match self.state {
            State::List | State::Reading => self.entries.get_mut(self.cursor),
            State::Loading | State::Error => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
