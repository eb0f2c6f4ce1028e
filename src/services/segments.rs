// src/services/segments.rs

//! Segment extraction from rendered timeline markup.

use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::models::Segment;

/// Pulls the ordered text-bearing elements out of a page snapshot.
#[derive(Debug, Clone)]
pub struct SegmentExtractor {
    selector: Selector,
}

impl SegmentExtractor {
    /// Create an extractor for the given CSS selector.
    pub fn new(selector: &str) -> Result<Self> {
        Ok(Self {
            selector: Self::parse_selector(selector)?,
        })
    }

    /// Extract segments in document order.
    ///
    /// Nested matches are all returned, outer element first.
    pub fn extract(&self, markup: &str) -> Vec<Segment> {
        let document = Html::parse_document(markup);
        document
            .select(&self.selector)
            .map(|element| Segment::from_nodes(element.text()))
            .collect()
    }

    fn parse_selector(s: &str) -> Result<Selector> {
        Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
    }
}
