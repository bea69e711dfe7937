//! Miniflux API types and client.

mod client;
mod types;

pub use client::{Listing, MinifluxClient, MinifluxError, REQUEST_TIMEOUT};
pub use types::{
    EntriesResponse, Entry, Feed, OriginalContentResponse, ReadStatus, UpdateEntriesRequest,
};

/// Entries requested per listing fetch.
pub const PAGE_SIZE: usize = 50;
