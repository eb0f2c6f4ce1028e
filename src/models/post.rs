//! Scraped text units and the outcome of a collection run.

use serde::{Deserialize, Serialize};

/// A unit of text extracted from one rendering pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Descendant text exactly as rendered
    pub raw: String,

    /// Each descendant text node trimmed, then concatenated
    pub text: String,
}

impl Segment {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let text = raw.trim().to_string();
        Self { raw, text }
    }

    /// Build a segment from the individual text nodes of an element.
    pub fn from_nodes<'a>(nodes: impl IntoIterator<Item = &'a str>) -> Self {
        let mut raw = String::new();
        let mut text = String::new();
        for node in nodes {
            raw.push_str(node);
            text.push_str(node.trim());
        }
        Self { raw, text }
    }
}

/// Why a collection run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The post limit was reached
    LimitReached,
    /// The scroll budget ran out first
    IterationsExhausted,
    /// Consecutive scrolls produced no new post
    Stalled,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::LimitReached => "limit reached",
            StopReason::IterationsExhausted => "scroll budget exhausted",
            StopReason::Stalled => "no new posts after scrolling",
        }
    }
}

/// Deduplicated posts gathered by one collection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionOutcome {
    /// Unique post texts in flush order
    pub posts: Vec<String>,

    /// Number of snapshots fetched and parsed
    pub iterations: usize,

    pub stop_reason: StopReason,
}
