// src/pipeline/collect.rs

//! Post collection inside a scoped browser session.

use crate::driver::AutomationDriver;
use crate::error::Result;
use crate::models::{AnalysisRequest, CollectionOutcome, Config};
use crate::services::{CollectorSettings, TweetCollector};

/// Log in, open the profile and collect posts, then close the session.
///
/// The session is closed on every exit path. When both the run and the
/// close fail, the run's error is returned.
pub async fn collect_posts<D>(
    config: &Config,
    request: &AnalysisRequest,
    driver: &mut D,
) -> Result<CollectionOutcome>
where
    D: AutomationDriver + ?Sized,
{
    let outcome = collect_in_session(config, request, driver).await;
    let closed = driver.close().await;

    match (outcome, closed) {
        (Ok(outcome), Ok(())) => Ok(outcome),
        (Ok(_), Err(close_error)) => Err(close_error),
        (Err(error), Ok(())) => Err(error),
        (Err(error), Err(close_error)) => {
            log::warn!("Failed to close browser session after error: {close_error}");
            Err(error)
        }
    }
}

async fn collect_in_session<D>(
    config: &Config,
    request: &AnalysisRequest,
    driver: &mut D,
) -> Result<CollectionOutcome>
where
    D: AutomationDriver + ?Sized,
{
    let settings = CollectorSettings::from_config(&config.collector, request);
    let collector = TweetCollector::new(settings, &config.collector.segment_selector)?;

    driver.login(&request.credentials).await?;
    driver
        .open(&config.automation.profile_url(&request.handle))
        .await?;

    collector.run(driver).await
}
