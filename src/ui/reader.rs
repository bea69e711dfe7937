use crate::app::App;
use crate::content::RenderedDocument;
use ratatui::{
    layout::Rect,
    text::{Line, Span, Text},
    widgets::{Block, Padding, Paragraph},
    Frame,
};

/// Maximum scroll offset ratatui can express (u16).
const MAX_SCROLL: usize = u16::MAX as usize;

/// Columns of padding left and right of the document.
pub const READER_PADDING_X: u16 = 2;
/// Rows of padding above and below the document.
pub const READER_PADDING_Y: u16 = 1;

/// Scrollable window over a [`RenderedDocument`].
///
/// The offset is independent of the list cursor. Every scroll operation
/// clamps to `[0, document height - viewport height]`.
#[derive(Debug, Default)]
pub struct ReaderViewport {
    document: Option<RenderedDocument>,
    offset: usize,
    height: usize,
}

impl ReaderViewport {
    pub fn new(height: usize) -> Self {
        Self {
            document: None,
            offset: 0,
            height,
        }
    }

    /// Replace the document and scroll to the top.
    pub fn set_document(&mut self, document: RenderedDocument) {
        self.document = Some(document);
        self.offset = 0;
    }

    /// Drop the document.
    pub fn clear(&mut self) {
        self.document = None;
        self.offset = 0;
    }

    pub fn document(&self) -> Option<&RenderedDocument> {
        self.document.as_ref()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Update the number of visible rows, keeping the offset in range.
    pub fn set_height(&mut self, height: usize) {
        self.height = height;
        self.clamp();
    }

    /// Largest valid offset for the current document and height.
    pub fn max_offset(&self) -> usize {
        let lines = self.document.as_ref().map_or(0, RenderedDocument::height);
        lines.saturating_sub(self.height).min(MAX_SCROLL)
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.offset = self.offset.saturating_add(lines);
        self.clamp();
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.offset = self.offset.saturating_sub(lines);
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.height.max(1));
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.height.max(1));
    }

    fn clamp(&mut self) {
        self.offset = self.offset.min(self.max_offset());
    }
}

/// Render the reader view: the document as-is inside a padded block.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let Some(doc) = app.reader().document() else {
        return;
    };
    let palette = app.theme.palette();

    let title_end = doc.title_lines();
    let header_end = doc.header_lines();
    let lines = doc.lines().iter().enumerate().map(|(i, line)| {
        let style = if i < title_end {
            palette.reader_title
        } else if i < header_end {
            palette.reader_metadata
        } else if is_footnote_line(line) {
            palette.reader_link
        } else {
            palette.reader_body
        };
        Line::from(Span::styled(line.as_str(), style))
    });

    let block = Block::default().padding(Padding::new(
        READER_PADDING_X,
        READER_PADDING_X,
        READER_PADDING_Y,
        READER_PADDING_Y,
    ));
    let paragraph = Paragraph::new(Text::from_iter(lines))
        .block(block)
        .scroll((app.reader().offset() as u16, 0));

    f.render_widget(paragraph, area);
}

/// A line of the trailing link list, `[n] url`.
fn is_footnote_line(line: &str) -> bool {
    line.strip_prefix('[')
        .and_then(|rest| rest.split_once("] "))
        .is_some_and(|(n, url)| {
            !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()) && url.starts_with("http")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::render_entry;
    use crate::miniflux::{Entry, Feed, ReadStatus};
    use proptest::prelude::*;

    fn doc(body_lines: usize) -> RenderedDocument {
        let entry = Entry {
            id: 1,
            feed_id: 1,
            title: "Title".to_string(),
            url: String::new(),
            content: (0..body_lines)
                .map(|i| format!("<p>line {}</p>", i))
                .collect(),
            feed: Feed::default(),
            status: ReadStatus::Unread,
            starred: false,
            published_at: chrono::Utc::now(),
        };
        render_entry(&entry, 80)
    }

    #[test]
    fn test_set_document_resets_offset() {
        let mut vp = ReaderViewport::new(5);
        vp.set_document(doc(50));
        vp.scroll_down(10);
        assert_eq!(vp.offset(), 10);
        vp.set_document(doc(50));
        assert_eq!(vp.offset(), 0);
    }

    #[test]
    fn test_scroll_clamps_to_bottom() {
        let mut vp = ReaderViewport::new(5);
        vp.set_document(doc(50));
        let max = vp.max_offset();
        assert!(max > 0);
        vp.scroll_down(10_000);
        assert_eq!(vp.offset(), max);
        vp.page_down();
        assert_eq!(vp.offset(), max);
    }

    #[test]
    fn test_short_document_never_scrolls() {
        let mut vp = ReaderViewport::new(100);
        vp.set_document(doc(2));
        vp.scroll_down(3);
        assert_eq!(vp.offset(), 0);
    }

    #[test]
    fn test_page_moves_by_viewport_height() {
        let mut vp = ReaderViewport::new(7);
        vp.set_document(doc(100));
        vp.page_down();
        assert_eq!(vp.offset(), 7);
        vp.page_up();
        assert_eq!(vp.offset(), 0);
        vp.page_up();
        assert_eq!(vp.offset(), 0);
    }

    #[test]
    fn test_growing_viewport_pulls_offset_back() {
        let mut vp = ReaderViewport::new(5);
        vp.set_document(doc(30));
        vp.scroll_down(10_000);
        vp.set_height(1_000);
        assert_eq!(vp.offset(), 0);
    }

    #[test]
    fn test_clear_drops_document() {
        let mut vp = ReaderViewport::new(5);
        vp.set_document(doc(30));
        vp.clear();
        assert!(vp.document().is_none());
        assert_eq!(vp.max_offset(), 0);
    }

    #[test]
    fn test_footnote_line_detection() {
        assert!(is_footnote_line("[1] https://example.com"));
        assert!(is_footnote_line("[12] http://example.com/a"));
        assert!(!is_footnote_line("[a] https://example.com"));
        assert!(!is_footnote_line("see [1] here"));
        assert!(!is_footnote_line("[1]https://example.com"));
    }

    proptest! {
        #[test]
        fn prop_offset_stays_in_range(
            body in 0usize..60,
            height in 0usize..40,
            ops in proptest::collection::vec(0u8..4, 0..30),
        ) {
            let mut vp = ReaderViewport::new(height);
            vp.set_document(doc(body));
            for op in ops {
                match op {
                    0 => vp.scroll_down(3),
                    1 => vp.scroll_up(2),
                    2 => vp.page_down(),
                    _ => vp.page_up(),
                }
                prop_assert!(vp.offset() <= vp.max_offset());
            }
        }
    }
}
