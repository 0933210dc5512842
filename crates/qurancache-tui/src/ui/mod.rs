//! Terminal UI module using ratatui.
//!
//! This module provides the TUI rendering and input handling:
//!
//! - `render`: Frame layout, title/status bars and overlays
//! - `reader`: Last-read card and the chapter list with expanded verses
//! - `input`: Keyboard event handling
//! - `styles`: Color scheme and text styling

pub mod input;
pub mod reader;
pub mod render;
pub mod styles;
