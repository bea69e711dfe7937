use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Read Status
// ============================================================================

/// Read state of an entry as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadStatus {
    /// Entries the server has removed are listed as read.
    #[serde(alias = "removed")]
    Read,
    Unread,
}

impl ReadStatus {
    /// The opposite status. Applying it twice yields the original value.
    pub fn toggle(self) -> Self {
        match self {
            Self::Read => Self::Unread,
            Self::Unread => Self::Read,
        }
    }

    /// Wire name, as used in the `status` field of update requests.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Unread => "unread",
        }
    }
}

impl std::fmt::Display for ReadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Feed and Entry
// ============================================================================

/// The feed an entry belongs to. Only the fields the client displays are kept.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Feed {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub site_url: String,
    #[serde(default)]
    pub feed_url: String,
}

/// A single feed item.
///
/// Decoded from the `entries` array of a listing response. The owner mutates
/// `status`, `starred` and `content` in place; everything else is fixed for
/// the lifetime of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub feed_id: i64,
    pub title: String,
    #[serde(default)]
    pub url: String,
    /// Raw HTML body.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub feed: Feed,
    pub status: ReadStatus,
    #[serde(default)]
    pub starred: bool,
    pub published_at: DateTime<Utc>,
}

impl Entry {
    pub fn is_unread(&self) -> bool {
        self.status == ReadStatus::Unread
    }

    /// Flip the read status and return the new value.
    pub fn toggle_status(&mut self) -> ReadStatus {
        self.status = self.status.toggle();
        self.status
    }
}

// ============================================================================
// Wire bodies
// ============================================================================

/// Body of `GET /v1/entries`.
#[derive(Debug, Deserialize)]
pub struct EntriesResponse {
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub entries: Vec<Entry>,
}

/// Body of `PUT /v1/entries`.
#[derive(Debug, Serialize)]
pub struct UpdateEntriesRequest<'a> {
    pub entry_ids: &'a [i64],
    pub status: ReadStatus,
}

/// Body of `GET /v1/entries/{id}/fetch-content`.
#[derive(Debug, Deserialize)]
pub struct OriginalContentResponse {
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SAMPLE: &str = r#"{
        "id": 42,
        "user_id": 1,
        "feed_id": 7,
        "status": "unread",
        "hash": "abc",
        "title": "Hello",
        "url": "https://example.com/hello",
        "published_at": "2024-03-01T09:30:00-05:00",
        "content": "<p>Body</p>",
        "starred": true,
        "feed": {"id": 7, "title": "Example Feed", "site_url": "https://example.com", "feed_url": "https://example.com/rss"}
    }"#;

    #[test]
    fn test_toggle_flips() {
        assert_eq!(ReadStatus::Read.toggle(), ReadStatus::Unread);
        assert_eq!(ReadStatus::Unread.toggle(), ReadStatus::Read);
    }

    proptest! {
        #[test]
        fn toggle_twice_is_identity(read in any::<bool>()) {
            let status = if read { ReadStatus::Read } else { ReadStatus::Unread };
            prop_assert_eq!(status.toggle().toggle(), status);
        }
    }

    #[test]
    fn test_decode_entry_ignores_unknown_fields() {
        let entry: Entry = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(entry.id, 42);
        assert_eq!(entry.feed.title, "Example Feed");
        assert_eq!(entry.status, ReadStatus::Unread);
        assert!(entry.starred);
        assert_eq!(entry.published_at.to_rfc3339(), "2024-03-01T14:30:00+00:00");
    }

    #[test]
    fn test_entry_toggle_status_mutates_in_place() {
        let mut entry: Entry = serde_json::from_str(SAMPLE).unwrap();
        assert!(entry.is_unread());
        assert_eq!(entry.toggle_status(), ReadStatus::Read);
        assert!(!entry.is_unread());
    }

    #[test]
    fn test_update_request_wire_format() {
        let ids = [1, 2];
        let body = UpdateEntriesRequest {
            entry_ids: &ids,
            status: ReadStatus::Read,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"entry_ids": [1, 2], "status": "read"})
        );
    }

    #[test]
    fn test_removed_status_decodes_as_read() {
        let json = SAMPLE.replace("\"unread\"", "\"removed\"");
        let entry: Entry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry.status, ReadStatus::Read);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let json = SAMPLE.replace("\"unread\"", "\"archived\"");
        assert!(serde_json::from_str::<Entry>(&json).is_err());
    }
}
