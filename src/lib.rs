//! Terminal client for reading and triaging Miniflux entries.

pub mod app;
pub mod config;
pub mod content;
pub mod keybindings;
pub mod miniflux;
pub mod theme;
pub mod ui;
pub mod util;
