use thiserror::Error;
use url::Url;

#[derive(Error, Debug, PartialEq)]
pub enum UrlValidationError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    #[error("URL has no host")]
    MissingHost,
}

/// Parse `url_str` and require an `http`/`https` scheme and a host.
fn parse_web_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str.trim())?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(UrlValidationError::UnsupportedScheme(other.to_string())),
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }
    Ok(url)
}

/// Check an entry URL before handing it to the system opener.
///
/// Entry URLs come from feeds; only plain web links are passed on so a feed
/// cannot make the opener launch `file:` or custom-scheme handlers.
pub fn validate_url_for_open(url_str: &str) -> Result<Url, UrlValidationError> {
    parse_web_url(url_str)
}

/// Check the configured server URL.
///
/// ```
/// use cliflux::util::validate_server_url;
///
/// assert!(validate_server_url("https://rss.example.com").is_ok());
/// assert!(validate_server_url("FIXME").is_err());
/// ```
pub fn validate_server_url(url_str: &str) -> Result<Url, UrlValidationError> {
    parse_web_url(url_str)
}
