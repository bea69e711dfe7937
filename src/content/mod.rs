mod render;

pub use render::{
    extract_footnotes, markup_to_text, render_entry, wrap_width, RenderedDocument,
    HORIZONTAL_PADDING, MIN_WRAP_WIDTH,
};
