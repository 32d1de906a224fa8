//! Utility functions module
//! 
//! Time formatting for renderers and shutdown signal handling.

pub mod format;
pub mod signals;

// Re-export main functions
pub use format::{format_hms, progress_percent, window_title};
pub use signals::shutdown_signal;
