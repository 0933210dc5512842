//! Utility functions for text layout in the terminal.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{fit_to_width, wrap_indented};
