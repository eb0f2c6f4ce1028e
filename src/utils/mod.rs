//! Utility functions and helpers.

pub mod http;
pub mod text;

pub use text::{content_hash, join_segments, strip_trailing_metrics};
