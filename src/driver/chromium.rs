// src/driver/chromium.rs

//! Chromium session driven over CDP.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::{Instant, timeout};

use super::{AutomationDriver, DriverFactory};
use crate::error::{AppError, Result};
use crate::models::{AutomationConfig, Credentials};

const USERNAME_FIELD: &str = "input[name='text']";
const PASSWORD_FIELD: &str = "input[name='password']";
const HOME_LINK: &str = "[data-testid='AppTabBar_Home_Link']";
const ELEMENT_POLL: Duration = Duration::from_millis(250);
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Browser session backed by a locally launched Chromium.
pub struct ChromiumDriver {
    config: AutomationConfig,
    browser: Option<Browser>,
    handler: Option<JoinHandle<()>>,
    page: Page,
}

impl ChromiumDriver {
    /// Launch a browser and open a blank tab.
    pub async fn launch(config: &AutomationConfig) -> Result<Self> {
        let mut builder = BrowserConfig::builder();
        if !config.headless {
            builder = builder.with_head();
        }
        for arg in &config.launch_args {
            builder = builder.arg(arg);
        }
        let browser_config = builder
            .build()
            .map_err(|e| AppError::browser("launch", e))?;

        log::debug!("Launching browser (headless: {})", config.headless);
        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| AppError::browser("launch", e))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| AppError::browser("new page", e))?;

        Ok(Self {
            config: config.clone(),
            browser: Some(browser),
            handler: Some(handler),
            page,
        })
    }

    /// Poll for an element until it appears or the element timeout passes.
    async fn wait_for(&self, selector: &str) -> Result<Element> {
        let deadline = Instant::now() + self.config.element_timeout();
        loop {
            match self.page.find_element(selector).await {
                Ok(element) => return Ok(element),
                Err(e) if Instant::now() >= deadline => {
                    return Err(AppError::browser(
                        format!("wait for {selector}"),
                        format!("not found within {:?}: {e}", self.config.element_timeout()),
                    ));
                }
                Err(_) => tokio::time::sleep(ELEMENT_POLL).await,
            }
        }
    }

    async fn fill_and_submit(&self, selector: &str, value: &str) -> Result<()> {
        let field = self.wait_for(selector).await?;
        field
            .click()
            .await
            .map_err(|e| AppError::browser(format!("focus {selector}"), e))?;
        field
            .type_str(value)
            .await
            .map_err(|e| AppError::browser(format!("type into {selector}"), e))?;
        field
            .press_key("Enter")
            .await
            .map_err(|e| AppError::browser(format!("submit {selector}"), e))?;
        Ok(())
    }
}

#[async_trait]
impl AutomationDriver for ChromiumDriver {
    async fn login(&mut self, credentials: &Credentials) -> Result<()> {
        log::info!("Logging in as {}", credentials.username);
        let login_url = self.config.login_url.clone();
        self.open(&login_url).await?;
        self.fill_and_submit(USERNAME_FIELD, &credentials.username)
            .await?;
        self.fill_and_submit(PASSWORD_FIELD, &credentials.password)
            .await?;
        self.wait_for(HOME_LINK).await?;
        log::info!("Login complete");
        Ok(())
    }

    async fn open(&mut self, url: &str) -> Result<()> {
        log::debug!("Navigating to {url}");
        self.page
            .goto(url)
            .await
            .map_err(|e| AppError::browser(format!("navigate to {url}"), e))?;
        Ok(())
    }

    async fn current_markup(&mut self) -> Result<String> {
        self.page
            .content()
            .await
            .map_err(|e| AppError::browser("read page content", e))
    }

    async fn scroll_forward(&mut self) -> Result<()> {
        let script = format!("window.scrollBy(0, {});", self.config.scroll_step_px);
        self.page
            .evaluate(script.as_str())
            .await
            .map_err(|e| AppError::browser("scroll", e))?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        let Some(mut browser) = self.browser.take() else {
            return Ok(());
        };
        log::debug!("Closing browser");
        let closed = browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| AppError::browser("close", e));

        // Wait for exit only after a clean close; anything else is killed.
        let exited = match &closed {
            Ok(()) => match timeout(SHUTDOWN_GRACE, browser.wait()).await {
                Ok(Ok(_)) => true,
                Ok(Err(e)) => {
                    log::warn!("Browser process did not exit cleanly: {e}");
                    false
                }
                Err(_) => false,
            },
            Err(_) => false,
        };
        if !exited {
            log::warn!("Killing browser process");
            if let Some(Err(e)) = browser.kill().await {
                log::warn!("Failed to kill browser process: {e}");
            }
        }

        if let Some(handler) = self.handler.take() {
            join_handler(handler, SHUTDOWN_GRACE).await;
        }
        closed
    }
}

/// Wait up to `grace` for the CDP handler task, aborting it if it is still running.
///
/// Returns whether the task finished on its own.
async fn join_handler(mut handler: JoinHandle<()>, grace: Duration) -> bool {
    match timeout(grace, &mut handler).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            log::warn!("Browser event handler ended abnormally: {e}");
            true
        }
        Err(_) => {
            log::warn!("Browser event handler still running; aborting");
            handler.abort();
            false
        }
    }
}

impl Drop for ChromiumDriver {
    fn drop(&mut self) {
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
    }
}

/// Launches a [`ChromiumDriver`] per run.
#[derive(Debug, Clone)]
pub struct ChromiumDriverFactory {
    config: AutomationConfig,
}

impl ChromiumDriverFactory {
    pub fn new(config: AutomationConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl DriverFactory for ChromiumDriverFactory {
    async fn launch(&self) -> Result<Box<dyn AutomationDriver>> {
        Ok(Box::new(ChromiumDriver::launch(&self.config).await?))
    }
}
