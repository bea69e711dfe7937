//! Text and URL helpers shared by the renderer, the list view and the
//! configuration loader.
//!
//! ```
//! use cliflux::util::{display_width, truncate_to_width};
//!
//! let title = truncate_to_width("A long entry title", 10);
//! assert!(display_width(&title) <= 10);
//! ```

mod text;
mod url_validator;

pub use text::{display_width, strip_control_chars, truncate_to_width};
pub use url_validator::{validate_server_url, validate_url_for_open, UrlValidationError};
