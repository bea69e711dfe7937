use super::types::{
    EntriesResponse, Entry, OriginalContentResponse, ReadStatus, UpdateEntriesRequest,
};
use futures::StreamExt;
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

/// Per-call budget covering connect, send and body read.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const MAX_RESPONSE_SIZE: usize = 5 * 1024 * 1024; // 5MB

/// Error bodies are echoed to the user; keep them short.
const MAX_ERROR_BODY_CHARS: usize = 200;

const USER_AGENT: &str = concat!("cliflux/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum MinifluxError {
    #[error("Request timed out after {}s", REQUEST_TIMEOUT.as_secs())]
    Timeout,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Invalid UTF-8 in response")]
    InvalidUtf8,
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Which server-side listing to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Listing {
    #[default]
    Unread,
    Starred,
}

impl Listing {
    pub fn name(self) -> &'static str {
        match self {
            Self::Unread => "Unread",
            Self::Starred => "Starred",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Unread => Self::Starred,
            Self::Starred => Self::Unread,
        }
    }

    fn filter(self) -> &'static str {
        match self {
            Self::Unread => "status=unread",
            Self::Starred => "starred=true",
        }
    }
}

/// Thin client for the Miniflux v1 REST API.
///
/// Every request carries the `X-Auth-Token` header and is bounded by
/// [`REQUEST_TIMEOUT`]. Any status >= 400 is returned as
/// [`MinifluxError::Api`] with the (truncated) response body.
pub struct MinifluxClient {
    base_url: String,
    api_key: SecretString,
    http: reqwest::Client,
}

impl std::fmt::Debug for MinifluxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MinifluxClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl MinifluxClient {
    /// Build a client for `base_url` (no trailing slash).
    pub fn new(
        base_url: impl Into<String>,
        api_key: SecretString,
        allow_invalid_certs: bool,
    ) -> Result<Self, MinifluxError> {
        if allow_invalid_certs {
            tracing::warn!("TLS certificate verification disabled by configuration");
        }

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .pool_max_idle_per_host(2)
            .timeout(REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(allow_invalid_certs)
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            api_key,
            http,
        })
    }

    /// `GET /v1/entries` for the given listing, newest first.
    pub async fn fetch_entries(
        &self,
        listing: Listing,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Entry>, MinifluxError> {
        let path = format!(
            "/v1/entries?{}&order=published_at&direction=desc&limit={}&offset={}",
            listing.filter(),
            limit,
            offset
        );
        let response: EntriesResponse = self.get_json(&path).await?;
        tracing::debug!(
            listing = listing.name(),
            total = response.total,
            received = response.entries.len(),
            "Fetched entries"
        );
        Ok(response.entries)
    }

    pub async fn fetch_unread(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Entry>, MinifluxError> {
        self.fetch_entries(Listing::Unread, limit, offset).await
    }

    pub async fn fetch_starred(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Entry>, MinifluxError> {
        self.fetch_entries(Listing::Starred, limit, offset).await
    }

    /// `PUT /v1/entries` setting `status` on every id in `entry_ids`.
    pub async fn change_read_status(
        &self,
        entry_ids: &[i64],
        status: ReadStatus,
    ) -> Result<(), MinifluxError> {
        let body = serde_json::to_vec(&UpdateEntriesRequest { entry_ids, status })?;
        self.send(Method::PUT, "/v1/entries", Some(body)).await?;
        Ok(())
    }

    /// `PUT /v1/entries/{id}/bookmark` flips the server-side starred flag.
    pub async fn toggle_bookmark(&self, entry_id: i64) -> Result<(), MinifluxError> {
        let path = format!("/v1/entries/{}/bookmark", entry_id);
        self.send(Method::PUT, &path, None).await?;
        Ok(())
    }

    /// `POST /v1/entries/{id}/save` hands the entry to the configured
    /// third-party integrations.
    pub async fn save_entry(&self, entry_id: i64) -> Result<(), MinifluxError> {
        let path = format!("/v1/entries/{}/save", entry_id);
        self.send(Method::POST, &path, None).await?;
        Ok(())
    }

    /// `PUT /v1/feeds/refresh` asks the server to poll every feed.
    pub async fn refresh_all_feeds(&self) -> Result<(), MinifluxError> {
        self.send(Method::PUT, "/v1/feeds/refresh", None).await?;
        Ok(())
    }

    /// `GET /v1/entries/{id}/fetch-content` returns the scraped original page.
    pub async fn fetch_original_content(&self, entry_id: i64) -> Result<String, MinifluxError> {
        let path = format!("/v1/entries/{}/fetch-content", entry_id);
        let response: OriginalContentResponse = self.get_json(&path).await?;
        Ok(response.content)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, MinifluxError> {
        let body = self.send(Method::GET, path, None).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Issue one request and return the response body as text.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<String, MinifluxError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(method = %method, path, "Miniflux request");

        let mut request = self
            .http
            .request(method, &url)
            .header("X-Auth-Token", self.api_key.expose_secret())
            .header("Content-Type", "application/json");
        if let Some(body) = body {
            request = request.body(body);
        }

        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            let text = read_limited_text(response, MAX_RESPONSE_SIZE).await?;
            Ok::<_, MinifluxError>((status, text))
        };

        let (status, text) = tokio::time::timeout(REQUEST_TIMEOUT, exchange)
            .await
            .map_err(|_| MinifluxError::Timeout)??;

        if status.as_u16() >= 400 {
            let body: String = text.trim().chars().take(MAX_ERROR_BODY_CHARS).collect();
            return Err(MinifluxError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(text)
    }
}

async fn read_limited_text(
    response: reqwest::Response,
    limit: usize,
) -> Result<String, MinifluxError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(MinifluxError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(MinifluxError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    String::from_utf8(bytes).map_err(|_| MinifluxError::InvalidUtf8)
}
