//! Terminal user interface.
//!
//! - `loop_runner` - main event loop and terminal management
//! - `input` - key to action resolution and dispatch into the session
//! - `helpers` - background task spawning for session commands
//! - `render` - per-state view dispatch
//! - `entries` - windowed entry list
//! - `reader` - scrollable reader viewport
//! - `status` - status bar
//! - `help` - keybinding overlay

pub mod entries;
mod help;
mod helpers;
mod input;
mod loop_runner;
pub mod reader;
mod render;
mod status;

pub use entries::visible_window;
pub use loop_runner::{run, Action};
pub use reader::ReaderViewport;
