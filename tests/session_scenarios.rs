//! Integration tests for the session state machine.
//!
//! Each test scripts a sequence of user operations and background results
//! against a fresh `App` and checks the resulting state, collection and the
//! commands handed back for dispatch.

use chrono::{TimeZone, Utc};
use cliflux::app::{App, AppEvent, Command, State};
use cliflux::content::wrap_width;
use cliflux::keybindings::KeybindingRegistry;
use cliflux::miniflux::{Entry, Feed, Listing, ReadStatus};
use cliflux::theme::Theme;
use pretty_assertions::assert_eq;

fn test_entry(id: i64) -> Entry {
    Entry {
        id,
        feed_id: 10,
        title: format!("Entry number {}", id),
        url: format!("https://blog.example.com/posts/{}", id),
        content: format!(
            "<p>Paragraph for entry {} with <a href=\"https://example.com/{}\">a link</a>.</p>",
            id, id
        ),
        feed: Feed {
            id: 10,
            title: "Example Blog".to_string(),
            ..Feed::default()
        },
        status: ReadStatus::Unread,
        starred: false,
        published_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() - chrono::Duration::hours(id),
    }
}

/// A session that has received `n` unread entries on an 80x24 terminal.
fn session_with(n: i64) -> App {
    let mut app = App::new(Theme::default(), KeybindingRegistry::new());
    app.resize(80, 24);
    app.handle_event(AppEvent::EntriesLoaded {
        listing: Listing::Unread,
        entries: (1..=n).map(test_entry).collect(),
    });
    app
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_fetch_success_moves_loading_to_list() {
    let mut app = App::new(Theme::default(), KeybindingRegistry::new());
    assert_eq!(app.state(), State::Loading);

    app.handle_event(AppEvent::EntriesLoaded {
        listing: Listing::Unread,
        entries: (1..=3).map(test_entry).collect(),
    });
    assert_eq!(app.state(), State::List);
    assert_eq!(app.cursor(), 0);
    let ids: Vec<i64> = app.entries().iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn test_fetch_error_is_a_dead_end() {
    let mut app = App::new(Theme::default(), KeybindingRegistry::new());
    app.handle_event(AppEvent::FetchFailed {
        error: "Request timed out after 10s".to_string(),
    });
    assert_eq!(app.state(), State::Error);
    assert_eq!(app.error(), Some("Request timed out after 10s"));

    assert!(app.refresh().is_none());
    assert!(app.select().is_empty());
    assert!(app.toggle_listing().is_none());
    app.nav_down();
    app.back();
    app.resize(100, 30);
    assert_eq!(app.state(), State::Error);
    assert_eq!(app.error(), Some("Request timed out after 10s"));
}

// ============================================================================
// Selecting
// ============================================================================

#[test]
fn test_select_second_of_three_unread() {
    let mut app = session_with(3);
    app.nav_down();
    assert_eq!(app.cursor(), 1);

    let commands = app.select();

    assert_eq!(app.state(), State::Reading);
    assert_eq!(app.selected().map(|e| e.status), Some(ReadStatus::Read));
    assert_eq!(app.entries()[1].status, ReadStatus::Read);
    assert_eq!(app.entries()[0].status, ReadStatus::Unread);
    assert_eq!(
        commands,
        vec![Command::ChangeStatus {
            entry_ids: vec![2],
            status: ReadStatus::Read,
        }]
    );
}

#[test]
fn test_reader_document_has_header_body_and_footnotes() {
    let mut app = session_with(1);
    app.select();

    let doc = app.reader().document().expect("document rendered").to_string();
    let lines: Vec<&str> = doc.lines().collect();
    assert_eq!(lines[0], "Entry number 1");
    assert_eq!(lines[1], "Example Blog");
    assert!(doc.contains("a link [1]"), "{}", doc);
    assert!(doc.ends_with("[1] https://example.com/1"), "{}", doc);
    assert_eq!(app.reader().offset(), 0);
}

#[test]
fn test_reopening_an_entry_starts_at_top() {
    let mut app = App::new(Theme::default(), KeybindingRegistry::new());
    app.resize(40, 8);
    let mut long = test_entry(1);
    long.content = "<p>word </p>".repeat(200);
    app.handle_event(AppEvent::EntriesLoaded {
        listing: Listing::Unread,
        entries: vec![long],
    });

    app.select();
    app.page_down();
    assert!(app.reader().offset() > 0);
    app.back();
    assert!(app.reader().document().is_none());

    assert!(app.select().is_empty(), "already read, no second request");
    assert_eq!(app.reader().offset(), 0);
}

// ============================================================================
// Toggling and bulk actions
// ============================================================================

#[test]
fn test_toggle_read_at_list_head() {
    let mut app = session_with(5);
    let command = app.toggle_read();

    assert_eq!(app.state(), State::List);
    assert_eq!(app.entries()[0].status, ReadStatus::Read);
    assert!(app.entries()[1..].iter().all(Entry::is_unread));
    assert_eq!(
        command,
        Some(Command::ChangeStatus {
            entry_ids: vec![1],
            status: ReadStatus::Read,
        })
    );
}

#[test]
fn test_rapid_toggles_last_local_change_wins() {
    let mut app = session_with(2);
    let first = app.toggle_read();
    let second = app.toggle_read();

    assert_eq!(app.entries()[0].status, ReadStatus::Unread);
    assert!(matches!(first, Some(Command::ChangeStatus { status: ReadStatus::Read, .. })));
    assert!(matches!(second, Some(Command::ChangeStatus { status: ReadStatus::Unread, .. })));

    // Completions arriving in either order leave the local status alone.
    for result in [Ok(()), Err("HTTP 502".to_string())] {
        app.handle_event(AppEvent::ActionDone {
            action: "update status",
            result,
        });
    }
    assert_eq!(app.entries()[0].status, ReadStatus::Unread);
}

#[test]
fn test_toggle_in_reader_is_visible_from_list() {
    let mut app = session_with(3);
    app.nav_down();
    app.nav_down();
    app.select();
    app.toggle_read();
    app.toggle_star();
    app.back();

    let entry = &app.entries()[2];
    assert_eq!(entry.status, ReadStatus::Unread);
    assert!(entry.starred);
    assert_eq!(app.cursor(), 2);
}

#[test]
fn test_mark_all_read_then_refresh() {
    let mut app = session_with(4);
    let command = app.mark_all_read();
    assert_eq!(
        command,
        Some(Command::ChangeStatus {
            entry_ids: vec![1, 2, 3, 4],
            status: ReadStatus::Read,
        })
    );

    app.nav_down();
    app.nav_down();
    assert_eq!(
        app.refresh(),
        Some(Command::FetchEntries {
            listing: Listing::Unread
        })
    );
    assert_eq!(app.state(), State::Loading);

    app.handle_event(AppEvent::EntriesLoaded {
        listing: Listing::Unread,
        entries: vec![test_entry(9)],
    });
    assert_eq!(app.state(), State::List);
    assert_eq!(app.cursor(), 0);
    assert_eq!(app.entries().len(), 1);
}

#[test]
fn test_save_and_open_leave_state_alone() {
    let mut app = session_with(2);
    app.select();
    let before: Vec<Entry> = app.entries().to_vec();

    assert_eq!(app.save(), Some(Command::SaveEntry { entry_id: 1 }));
    assert_eq!(
        app.open_in_browser(),
        Some(Command::OpenUrl {
            url: "https://blog.example.com/posts/1".to_string()
        })
    );
    assert_eq!(app.entries(), before.as_slice());
    assert_eq!(app.state(), State::Reading);
}

#[test]
fn test_starred_listing_round_trip() {
    let mut app = session_with(2);
    assert_eq!(
        app.toggle_listing(),
        Some(Command::FetchEntries {
            listing: Listing::Starred
        })
    );
    let mut starred = test_entry(5);
    starred.starred = true;
    starred.status = ReadStatus::Read;
    app.handle_event(AppEvent::EntriesLoaded {
        listing: Listing::Starred,
        entries: vec![starred],
    });
    assert_eq!(app.listing(), Listing::Starred);
    assert_eq!(app.state(), State::List);
    assert_eq!(
        app.toggle_listing(),
        Some(Command::FetchEntries {
            listing: Listing::Unread
        })
    );
}

// ============================================================================
// Resizing
// ============================================================================

#[test]
fn test_resize_while_reading_rerenders_at_new_width() {
    let mut app = session_with(1);
    app.select();
    assert_eq!(app.reader().document().map(|d| d.wrap_width()), Some(wrap_width(80)));

    app.resize(50, 20);
    let doc = app.reader().document().expect("still reading");
    assert_eq!(doc.wrap_width(), wrap_width(50));
    assert!(doc.lines().iter().all(|l| cliflux::util::display_width(l) <= wrap_width(50)));
    assert_eq!(app.reader().offset(), 0);
    assert_eq!(app.state(), State::Reading);
}

#[test]
fn test_tiny_terminal_uses_wrap_floor() {
    let mut app = session_with(1);
    app.resize(10, 6);
    app.select();
    assert_eq!(
        app.reader().document().map(|d| d.wrap_width()),
        Some(cliflux::content::MIN_WRAP_WIDTH)
    );
}

#[test]
fn test_list_window_follows_cursor() {
    let mut app = session_with(40);
    app.resize(80, 15);
    assert_eq!(app.list_height(), 10);
    for _ in 0..25 {
        app.nav_down();
    }
    let window = app.list_window();
    assert!(window.contains(&app.cursor()));
    assert_eq!(window, 16..26);
}

// ============================================================================
// Original content
// ============================================================================

#[test]
fn test_original_content_replaces_open_document() {
    let mut app = session_with(2);
    app.select();
    assert_eq!(
        app.fetch_original(),
        Some(Command::FetchOriginalContent { entry_id: 1 })
    );
    app.handle_event(AppEvent::OriginalContentLoaded {
        entry_id: 1,
        result: Ok("<article><p>The complete article.</p></article>".to_string()),
    });
    let doc = app.reader().document().unwrap().to_string();
    assert!(doc.contains("The complete article."));
    assert!(!doc.contains("Paragraph for entry 1"));
}

#[test]
fn test_original_content_failure_keeps_document() {
    let mut app = session_with(1);
    app.select();
    let before = app.reader().document().cloned();
    app.handle_event(AppEvent::OriginalContentLoaded {
        entry_id: 1,
        result: Err("API error (status 404): not found".to_string()),
    });
    assert_eq!(app.reader().document().cloned(), before);
    assert_eq!(app.state(), State::Reading);
}

#[test]
fn test_original_content_only_fetchable_while_reading() {
    let mut app = session_with(1);
    assert_eq!(app.fetch_original(), None);
}
