// src/pipeline/analyze.rs

//! End-to-end analysis run.

use chrono::Utc;

use crate::driver::DriverFactory;
use crate::error::Result;
use crate::models::{AnalysisRequest, AnalysisResult, AnalysisSection, Config};
use crate::services::{AnalysisClient, PromptRequest};

use super::collect::collect_posts;

/// Collect posts for `request` and run each requested analysis in order.
pub async fn run_analysis(
    config: &Config,
    request: &AnalysisRequest,
    drivers: &dyn DriverFactory,
    analyst: &dyn AnalysisClient,
) -> Result<AnalysisResult> {
    log::info!(
        "Starting analysis of @{} (limit {}, kinds: {})",
        request.handle,
        request.limit,
        request
            .kinds
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let mut driver = drivers.launch().await?;
    let outcome = collect_posts(config, request, driver.as_mut()).await?;
    let collected_at = Utc::now();
    log::info!("Fetched {} posts.", outcome.posts.len());

    let handle = request.at_handle();
    let mut sections = Vec::with_capacity(request.kinds.len());
    for kind in &request.kinds {
        let prompt = PromptRequest::build(
            *kind,
            &handle,
            &outcome.posts,
            &request.language,
            &request.model,
        );
        let body = analyst.analyze(&prompt).await?;
        sections.push(AnalysisSection {
            kind: *kind,
            title: kind.title(),
            body,
        });
    }

    Ok(AnalysisResult {
        handle: request.handle.clone(),
        posts: outcome.posts,
        stop_reason: outcome.stop_reason,
        sections,
        collected_at,
    })
}
