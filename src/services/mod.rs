//! Service layer for the analyzer.
//!
//! This module contains the business logic for:
//! - Segment extraction from rendered markup (`SegmentExtractor`)
//! - Timeline post collection (`TweetCollector`)
//! - Prompt rendering (`PromptRequest`)
//! - Remote analysis (`AnalysisClient`, `OpenAiAssistantClient`)

mod analysis;
mod collector;
mod prompts;
mod segments;

pub use analysis::{AnalysisClient, OpenAiAssistantClient};
pub use collector::{CollectorSettings, TweetCollector};
pub use prompts::PromptRequest;
pub use segments::SegmentExtractor;
