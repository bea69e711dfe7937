//! Entry body rendering: HTML to wrapped, footnoted plain text.
//!
//! The pipeline is:
//! 1. Inline every `<a href="http(s)://...">text</a>` as `text ( url )` so
//!    link targets survive conversion.
//! 2. Convert the markup to plain text (tables keep their layout). If
//!    conversion fails the raw markup is used instead.
//! 3. Replace each `( http(s)://... )` citation with `[n]`, numbering every
//!    occurrence left to right from 1, and collect the URLs.
//! 4. Compose `title`, feed title and body, wrapped to
//!    `width - HORIZONTAL_PADDING` columns, never below `MIN_WRAP_WIDTH`.
//! 5. Append a `[n] url` footnote block, one unwrapped line per link.
use crate::miniflux::Entry;
use crate::util::strip_control_chars;
use html2text::render::text_renderer::TrivialDecorator;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;
use textwrap::Options;

/// Columns taken by the reader's left and right padding.
pub const HORIZONTAL_PADDING: usize = 4;

/// Narrowest width the document is ever wrapped to.
pub const MIN_WRAP_WIDTH: usize = 20;

/// Width handed to the HTML converter. Large enough that it never wraps;
/// wrapping happens once, at the end, at the display width.
const CONVERT_WIDTH: usize = 10_000;

static CITATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\( (https?://[^)]+) \)").expect("valid citation regex"));

static ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<a\s[^>]*?\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))[^>]*>(.*?)</a\s*>"#,
    )
    .expect("valid anchor regex")
});

/// A wrapped, display-ready entry document.
///
/// Disposable: regenerate it with [`render_entry`] whenever the entry or the
/// width changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    lines: Vec<String>,
    title_lines: usize,
    header_lines: usize,
    wrap_width: usize,
}

impl RenderedDocument {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of display lines.
    pub fn height(&self) -> usize {
        self.lines.len()
    }

    /// Lines occupied by the wrapped entry title.
    pub fn title_lines(&self) -> usize {
        self.title_lines
    }

    /// Lines occupied by the wrapped title plus feed title.
    pub fn header_lines(&self) -> usize {
        self.header_lines
    }

    pub fn wrap_width(&self) -> usize {
        self.wrap_width
    }
}

impl std::fmt::Display for RenderedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.lines.join("\n"))
    }
}

/// Column width the document is wrapped to for a given display width.
pub fn wrap_width(display_width: u16) -> usize {
    (display_width as usize)
        .saturating_sub(HORIZONTAL_PADDING)
        .max(MIN_WRAP_WIDTH)
}

/// Render `entry` for a display `width` columns wide.
///
/// Deterministic: the same entry and width always produce the same document.
pub fn render_entry(entry: &Entry, width: u16) -> RenderedDocument {
    let body = markup_to_text(&entry.content);
    let (body, links) = extract_footnotes(&body);

    let title = strip_control_chars(&entry.title);
    let feed_title = strip_control_chars(&entry.feed.title);

    let composed = format!("{}\n{}\n\n{}", title, feed_title, body.trim_end());

    let wrap_width = wrap_width(width);
    let title_lines = textwrap::wrap(&title, wrap_options(wrap_width)).len();
    let header_lines = title_lines + textwrap::wrap(&feed_title, wrap_options(wrap_width)).len();
    let mut lines: Vec<String> = textwrap::wrap(&composed, wrap_options(wrap_width))
        .into_iter()
        .map(Cow::into_owned)
        .collect();

    // Footnotes stay one line each so a URL is never split.
    if !links.is_empty() {
        lines.push(String::new());
        lines.extend(
            links
                .iter()
                .enumerate()
                .map(|(i, url)| format!("[{}] {}", i + 1, url)),
        );
    }

    RenderedDocument {
        lines,
        title_lines,
        header_lines,
        wrap_width,
    }
}

fn wrap_options(width: usize) -> Options<'static> {
    Options::new(width)
}

/// Convert HTML to plain text, falling back to the raw markup on failure.
pub fn markup_to_text(markup: &str) -> String {
    let linked = inline_link_targets(markup);
    let text = match html2text::config::with_decorator(TrivialDecorator::new())
        .string_from_read(linked.as_bytes(), CONVERT_WIDTH)
    {
        Ok(text) => text,
        Err(e) => {
            tracing::debug!(error = %e, "Markup conversion failed, rendering raw content");
            markup.to_string()
        }
    };
    strip_control_chars(&text).replace('\t', "    ")
}

/// Rewrite `<a href="http(s)://u">text</a>` as `text ( u )`.
///
/// Anchors with other schemes (mailto, relative paths, fragments) keep only
/// their text.
fn inline_link_targets(markup: &str) -> Cow<'_, str> {
    ANCHOR.replace_all(markup, |caps: &Captures| {
        let href = caps
            .get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))
            .map_or("", |m| m.as_str())
            .trim();
        let text = caps.get(4).map_or("", |m| m.as_str());
        if href.starts_with("http://") || href.starts_with("https://") {
            format!("{} ( {} )", text, href)
        } else {
            text.to_string()
        }
    })
}

/// Replace every `( http(s)://... )` citation with `[n]`.
///
/// Returns the rewritten text and the captured URLs in order of appearance.
/// Repeated URLs get their own consecutive indices.
pub fn extract_footnotes(text: &str) -> (String, Vec<String>) {
    let mut links: Vec<String> = Vec::new();
    let replaced = CITATION.replace_all(text, |caps: &Captures| {
        links.push(caps[1].to_string());
        format!("[{}]", links.len())
    });
    let replaced = replaced.into_owned();
    (replaced, links)
}
