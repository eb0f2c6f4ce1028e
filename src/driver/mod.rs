//! Browser automation seam.
//!
//! The collector only needs markup snapshots, a way to scroll and a way to
//! wait; login and teardown are used by the pipeline around it.

#[cfg(feature = "browser")]
mod chromium;

#[cfg(feature = "browser")]
pub use chromium::{ChromiumDriver, ChromiumDriverFactory};

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Credentials;

/// An exclusively owned browser session.
#[async_trait]
pub trait AutomationDriver: Send {
    /// Log in once, before any extraction.
    async fn login(&mut self, credentials: &Credentials) -> Result<()>;

    /// Navigate to a page.
    async fn open(&mut self, url: &str) -> Result<()>;

    /// Current rendered markup of the page.
    async fn current_markup(&mut self) -> Result<String>;

    /// Scroll the page forward by one step.
    async fn scroll_forward(&mut self) -> Result<()>;

    /// Wait for asynchronously loaded content to render.
    async fn pause(&mut self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }

    /// Release the session.
    async fn close(&mut self) -> Result<()>;
}

/// Launches a fresh session for each run.
#[async_trait]
pub trait DriverFactory: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn AutomationDriver>>;
}
