// src/models/mod.rs

//! Domain models for the analyzer.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod post;
mod request;

// Re-export all public types
pub use config::{
    AnalysisConfig, AutomationConfig, CollectorConfig, Config, FormConfig, ServerConfig,
};
pub use post::{CollectionOutcome, Segment, StopReason};
pub use request::{
    AnalysisKind, AnalysisRequest, AnalysisResult, AnalysisSection, Credentials, FormInput,
};
