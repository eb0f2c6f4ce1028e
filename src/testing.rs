//! Scripted collaborators shared by unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::driver::{AutomationDriver, DriverFactory};
use crate::error::{AppError, Result};
use crate::models::{AnalysisKind, Credentials, FormInput};
use crate::services::{AnalysisClient, PromptRequest};

/// Render segment texts as timeline spans.
pub fn page(texts: &[&str]) -> String {
    let spans: String = texts
        .iter()
        .map(|t| format!(r#"<span class="css-1jxf684">{t}</span>"#))
        .collect();
    format!("<html><body><div>{spans}</div></body></html>")
}

/// Everything a [`ScriptedDriver`] was asked to do.
#[derive(Debug, Default)]
pub struct DriverLog {
    pub logins: Vec<String>,
    pub opened: Vec<String>,
    pub fetches: usize,
    pub scrolls: usize,
    pub pauses: Vec<Duration>,
    pub closes: usize,
}

/// Driver that replays fixed snapshots; the last one repeats once exhausted.
#[derive(Clone, Default)]
pub struct ScriptedDriver {
    pub snapshots: Vec<String>,
    pub fail_login: bool,
    pub fail_fetch_at: Option<usize>,
    pub fail_close: bool,
    pub log: Arc<Mutex<DriverLog>>,
}

impl ScriptedDriver {
    pub fn new(snapshots: Vec<String>) -> Self {
        Self {
            snapshots,
            ..Self::default()
        }
    }

    pub fn log(&self) -> std::sync::MutexGuard<'_, DriverLog> {
        self.log.lock().unwrap()
    }
}

#[async_trait]
impl AutomationDriver for ScriptedDriver {
    async fn login(&mut self, credentials: &Credentials) -> Result<()> {
        self.log().logins.push(credentials.username.clone());
        if self.fail_login {
            return Err(AppError::browser("login", "home link never appeared"));
        }
        Ok(())
    }

    async fn open(&mut self, url: &str) -> Result<()> {
        self.log().opened.push(url.to_string());
        Ok(())
    }

    async fn current_markup(&mut self) -> Result<String> {
        let mut log = self.log();
        let index = log.fetches;
        log.fetches += 1;
        if self.fail_fetch_at == Some(index) {
            return Err(AppError::browser("read page content", "target closed"));
        }
        Ok(self
            .snapshots
            .get(index)
            .or(self.snapshots.last())
            .cloned()
            .unwrap_or_default())
    }

    async fn scroll_forward(&mut self) -> Result<()> {
        self.log().scrolls += 1;
        Ok(())
    }

    async fn pause(&mut self, duration: Duration) {
        self.log().pauses.push(duration);
    }

    async fn close(&mut self) -> Result<()> {
        self.log().closes += 1;
        if self.fail_close {
            return Err(AppError::browser("close", "connection closed"));
        }
        Ok(())
    }
}

/// Hands out clones of one scripted driver and counts launches.
#[derive(Clone, Default)]
pub struct ScriptedFactory {
    pub driver: ScriptedDriver,
    pub launches: Arc<AtomicUsize>,
}

impl ScriptedFactory {
    pub fn new(driver: ScriptedDriver) -> Self {
        Self {
            driver,
            launches: Arc::default(),
        }
    }

    pub fn launch_count(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DriverFactory for ScriptedFactory {
    async fn launch(&self) -> Result<Box<dyn AutomationDriver>> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.driver.clone()))
    }
}

/// Analysis client that answers with a canned string and records prompts.
#[derive(Clone, Default)]
pub struct EchoAnalyst {
    pub requests: Arc<Mutex<Vec<PromptRequest>>>,
}

#[async_trait]
impl AnalysisClient for EchoAnalyst {
    async fn analyze(&self, request: &PromptRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(format!("{} analysis of {} posts", request.kind, request.post_count))
    }
}

/// Valid form input for `@alice`.
pub fn alice_form(kinds: Vec<AnalysisKind>) -> FormInput {
    FormInput {
        handle: "alice".into(),
        limit: "50".into(),
        username: "scraper".into(),
        password: "hunter2".into(),
        language: "English".into(),
        model: "gpt-4o".into(),
        kinds,
    }
}
