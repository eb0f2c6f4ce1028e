// src/services/collector.rs

//! Timeline post collector.
//!
//! Walks the text segments of successive page snapshots, cuts them into posts
//! at each occurrence of the author handle and keeps the unique ones.

use std::collections::HashSet;
use std::time::Duration;

use crate::driver::AutomationDriver;
use crate::error::{AppError, Result};
use crate::models::{AnalysisRequest, CollectionOutcome, CollectorConfig, Segment, StopReason};
use crate::services::SegmentExtractor;
use crate::utils::{content_hash, join_segments, strip_trailing_metrics};

/// Parameters of one collection run.
#[derive(Debug, Clone)]
pub struct CollectorSettings {
    /// Handle as rendered, including the leading `@`
    pub target_handle: String,
    pub limit: usize,
    pub max_scroll_iterations: usize,
    pub pause: Duration,
    pub sentinel: String,
    pub stall_limit: Option<usize>,
}

impl CollectorSettings {
    pub fn from_config(config: &CollectorConfig, request: &AnalysisRequest) -> Self {
        Self {
            target_handle: request.at_handle(),
            limit: request.limit,
            max_scroll_iterations: config.scroll_budget(request.limit),
            pause: config.pause(),
            sentinel: config.sentinel.clone(),
            stall_limit: config.stall_limit,
        }
    }
}

/// Result of feeding one snapshot to the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    LimitReached,
}

/// Single-use collector; `run` consumes it.
pub struct TweetCollector {
    settings: CollectorSettings,
    extractor: SegmentExtractor,
    seen: HashSet<String>,
    posts: Vec<String>,
}

impl TweetCollector {
    pub fn new(settings: CollectorSettings, segment_selector: &str) -> Result<Self> {
        if settings.limit == 0 {
            return Err(AppError::validation("post limit must be at least 1"));
        }
        if settings.stall_limit == Some(0) {
            return Err(AppError::validation("stall limit must be at least 1"));
        }
        Ok(Self {
            extractor: SegmentExtractor::new(segment_selector)?,
            settings,
            seen: HashSet::new(),
            posts: Vec::new(),
        })
    }

    /// Fetch, parse, scroll and pause until the limit or the scroll budget is hit.
    pub async fn run<D>(mut self, driver: &mut D) -> Result<CollectionOutcome>
    where
        D: AutomationDriver + ?Sized,
    {
        let budget = self.settings.max_scroll_iterations;
        let mut idle_scrolls = 0;

        log::info!(
            "Collecting up to {} posts from {} ({} scrolls max)",
            self.settings.limit,
            self.settings.target_handle,
            budget
        );

        for iteration in 1..=budget {
            let markup = driver.current_markup().await?;
            let segments = self.extractor.extract(&markup);
            let before = self.posts.len();

            let flow = self.ingest(&segments);
            let accepted = self.posts.len() - before;
            log::debug!(
                "Scroll {iteration}/{budget}: {} segments, {accepted} new posts, {} total",
                segments.len(),
                self.posts.len()
            );

            if flow == Flow::LimitReached {
                return Ok(self.finish(iteration, StopReason::LimitReached));
            }

            if let Some(stall_limit) = self.settings.stall_limit {
                idle_scrolls = if accepted == 0 { idle_scrolls + 1 } else { 0 };
                if idle_scrolls >= stall_limit {
                    return Ok(self.finish(iteration, StopReason::Stalled));
                }
            }

            driver.scroll_forward().await?;
            driver.pause(self.settings.pause).await;
        }

        Ok(self.finish(budget, StopReason::IterationsExhausted))
    }

    /// Walk one snapshot's segments.
    ///
    /// The post buffer starts empty for every snapshot; a block still open
    /// when the snapshot ends is dropped.
    fn ingest(&mut self, segments: &[Segment]) -> Flow {
        let mut buffer: Vec<&str> = Vec::new();

        for segment in segments {
            let text = segment.text.as_str();

            if text == self.settings.sentinel {
                // Metadata separator inside a block; carries no text.
                continue;
            }

            if text == self.settings.target_handle {
                if !buffer.is_empty() {
                    self.flush(&buffer);
                    buffer.clear();
                    if self.limit_reached() {
                        return Flow::LimitReached;
                    }
                }
                continue;
            }

            buffer.push(text);
        }

        Flow::Continue
    }

    fn flush(&mut self, buffer: &[&str]) {
        let cleaned = strip_trailing_metrics(&join_segments(buffer));
        if self.seen.insert(content_hash(&cleaned)) {
            self.posts.push(cleaned);
        }
    }

    fn limit_reached(&self) -> bool {
        self.posts.len() >= self.settings.limit
    }

    fn finish(self, iterations: usize, stop_reason: StopReason) -> CollectionOutcome {
        log::info!(
            "Collected {} posts in {} scrolls ({})",
            self.posts.len(),
            iterations,
            stop_reason.as_str()
        );
        CollectionOutcome {
            posts: self.posts,
            iterations,
            stop_reason,
        }
    }
}
