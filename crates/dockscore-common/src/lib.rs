//! dockscore-common — Shared types and errors used across all dockscore crates.

pub mod error;
pub mod properties;

// Re-export commonly used types
pub use error::{DockscoreError, Result};
pub use properties::ScoreProperty;
