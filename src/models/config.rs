//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Timeline scraping behavior
    #[serde(default)]
    pub collector: CollectorConfig,

    /// Browser session settings
    #[serde(default)]
    pub automation: AutomationConfig,

    /// Remote analysis API settings
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Choices offered by the web form
    #[serde(default)]
    pub form: FormConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(&path) {
            Ok(config) => {
                log::info!("Loaded configuration from {:?}", path.as_ref());
                config
            }
            Err(e) => {
                log::warn!(
                    "Config load failed from {:?}: {}. Using defaults.",
                    path.as_ref(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.collector.segment_selector.trim().is_empty() {
            return Err(AppError::validation("collector.segment_selector is empty"));
        }
        if self.collector.sentinel.is_empty() {
            return Err(AppError::validation("collector.sentinel is empty"));
        }
        if self.collector.scroll_divisor == 0 {
            return Err(AppError::validation("collector.scroll_divisor must be > 0"));
        }
        if self.collector.stall_limit == Some(0) {
            return Err(AppError::validation("collector.stall_limit must be > 0"));
        }
        if !self.automation.profile_url_template.contains("{handle}") {
            return Err(AppError::validation(
                "automation.profile_url_template must contain {handle}",
            ));
        }
        if self.automation.element_timeout_secs == 0 {
            return Err(AppError::validation(
                "automation.element_timeout_secs must be > 0",
            ));
        }
        url::Url::parse(&self.automation.login_url)?;
        url::Url::parse(&self.analysis.api_base)?;
        if self.analysis.api_key_env.trim().is_empty() {
            return Err(AppError::validation("analysis.api_key_env is empty"));
        }
        if self.analysis.max_poll_attempts == 0 {
            return Err(AppError::validation("analysis.max_poll_attempts must be > 0"));
        }
        if self.analysis.timeout_secs == 0 {
            return Err(AppError::validation("analysis.timeout_secs must be > 0"));
        }
        if self.form.languages.is_empty() {
            return Err(AppError::validation("No response languages defined"));
        }
        if self.form.models.is_empty() {
            return Err(AppError::validation("No models defined"));
        }
        if !self.form.models.contains(&self.form.default_model) {
            return Err(AppError::validation(format!(
                "form.default_model '{}' is not in form.models",
                self.form.default_model
            )));
        }
        if self.form.min_limit == 0 || self.form.min_limit > self.form.max_limit {
            return Err(AppError::validation(
                "form.min_limit must be > 0 and <= form.max_limit",
            ));
        }
        if !(self.form.min_limit..=self.form.max_limit).contains(&self.form.default_limit) {
            return Err(AppError::validation(
                "form.default_limit must lie within [min_limit, max_limit]",
            ));
        }
        Ok(())
    }
}

/// Timeline scraping settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Selector for the text-bearing elements of a rendered timeline
    #[serde(default = "defaults::segment_selector")]
    pub segment_selector: String,

    /// Text of the metadata separator segment inside a post block
    #[serde(default = "defaults::sentinel")]
    pub sentinel: String,

    /// Wait after each scroll so lazily loaded posts can render
    #[serde(default = "defaults::pause_ms")]
    pub pause_ms: u64,

    /// Scroll budget is `limit / scroll_divisor`
    #[serde(default = "defaults::scroll_divisor")]
    pub scroll_divisor: usize,

    /// Stop after this many consecutive scrolls that yield no new post.
    /// Disabled when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stall_limit: Option<usize>,
}

impl CollectorConfig {
    /// Pause between scrolls.
    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }

    /// Number of scroll+parse cycles allowed for a post limit.
    pub fn scroll_budget(&self, limit: usize) -> usize {
        limit / self.scroll_divisor.max(1)
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            segment_selector: defaults::segment_selector(),
            sentinel: defaults::sentinel(),
            pause_ms: defaults::pause_ms(),
            scroll_divisor: defaults::scroll_divisor(),
            stall_limit: None,
        }
    }
}

/// Browser session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationConfig {
    /// Run the browser without a window
    #[serde(default = "defaults::headless")]
    pub headless: bool,

    /// Page hosting the login form
    #[serde(default = "defaults::login_url")]
    pub login_url: String,

    /// Profile page URL; `{handle}` is replaced by the bare handle
    #[serde(default = "defaults::profile_url_template")]
    pub profile_url_template: String,

    /// How long to wait for a login form element to appear
    #[serde(default = "defaults::element_timeout")]
    pub element_timeout_secs: u64,

    /// Vertical distance of one scroll-forward action
    #[serde(default = "defaults::scroll_step_px")]
    pub scroll_step_px: u32,

    /// Extra command-line arguments for the browser process
    #[serde(default = "defaults::launch_args")]
    pub launch_args: Vec<String>,
}

impl AutomationConfig {
    /// Build the profile URL for a bare handle.
    pub fn profile_url(&self, handle: &str) -> String {
        self.profile_url_template.replace("{handle}", handle)
    }

    /// Timeout for login form element waits.
    pub fn element_timeout(&self) -> Duration {
        Duration::from_secs(self.element_timeout_secs)
    }
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            headless: defaults::headless(),
            login_url: defaults::login_url(),
            profile_url_template: defaults::profile_url_template(),
            element_timeout_secs: defaults::element_timeout(),
            scroll_step_px: defaults::scroll_step_px(),
            launch_args: defaults::launch_args(),
        }
    }
}

/// Remote analysis API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Base URL of the assistants API
    #[serde(default = "defaults::api_base")]
    pub api_base: String,

    /// Environment variable holding the API key
    #[serde(default = "defaults::api_key_env")]
    pub api_key_env: String,

    /// Name given to the assistant created for each analysis
    #[serde(default = "defaults::assistant_name")]
    pub assistant_name: String,

    /// Standing instructions of the assistant
    #[serde(default = "defaults::assistant_instructions")]
    pub assistant_instructions: String,

    /// Delay between run status polls
    #[serde(default = "defaults::poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Give up polling after this many attempts and report the last status
    #[serde(default = "defaults::max_poll_attempts")]
    pub max_poll_attempts: u32,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// User-Agent header for API requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,
}

impl AnalysisConfig {
    /// Read the API key from the host environment.
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AppError::config(format!("{} is not set", self.api_key_env)))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::api_base(),
            api_key_env: defaults::api_key_env(),
            assistant_name: defaults::assistant_name(),
            assistant_instructions: defaults::assistant_instructions(),
            poll_interval_ms: defaults::poll_interval_ms(),
            max_poll_attempts: defaults::max_poll_attempts(),
            timeout_secs: defaults::timeout(),
            user_agent: defaults::user_agent(),
        }
    }
}

/// Choices and bounds offered by the web form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormConfig {
    #[serde(default = "defaults::languages")]
    pub languages: Vec<String>,

    #[serde(default = "defaults::models")]
    pub models: Vec<String>,

    #[serde(default = "defaults::default_model")]
    pub default_model: String,

    #[serde(default = "defaults::min_limit")]
    pub min_limit: usize,

    #[serde(default = "defaults::max_limit")]
    pub max_limit: usize,

    #[serde(default = "defaults::limit_step")]
    pub limit_step: usize,

    #[serde(default = "defaults::default_limit")]
    pub default_limit: usize,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            languages: defaults::languages(),
            models: defaults::models(),
            default_model: defaults::default_model(),
            min_limit: defaults::min_limit(),
            max_limit: defaults::max_limit(),
            limit_step: defaults::limit_step(),
            default_limit: defaults::default_limit(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address the form server listens on
    #[serde(default = "defaults::bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: defaults::bind(),
        }
    }
}

mod defaults {
    // Collector defaults
    pub fn segment_selector() -> String {
        "span.css-1jxf684".into()
    }
    pub fn sentinel() -> String {
        "·".into()
    }
    pub fn pause_ms() -> u64 {
        2000
    }
    pub fn scroll_divisor() -> usize {
        4
    }

    // Automation defaults
    pub fn headless() -> bool {
        true
    }
    pub fn login_url() -> String {
        "https://twitter.com/login".into()
    }
    pub fn profile_url_template() -> String {
        "https://x.com/{handle}".into()
    }
    pub fn element_timeout() -> u64 {
        10
    }
    pub fn scroll_step_px() -> u32 {
        1000
    }
    pub fn launch_args() -> Vec<String> {
        vec!["--no-sandbox".into(), "--disable-dev-shm-usage".into()]
    }

    // Analysis defaults
    pub fn api_base() -> String {
        "https://api.openai.com/v1".into()
    }
    pub fn api_key_env() -> String {
        "OPENAI_API_KEY".into()
    }
    pub fn assistant_name() -> String {
        "ProfileTopicAnalyzer".into()
    }
    pub fn assistant_instructions() -> String {
        "Analyze user's posts".into()
    }
    pub fn poll_interval_ms() -> u64 {
        1000
    }
    pub fn max_poll_attempts() -> u32 {
        120
    }
    pub fn timeout() -> u64 {
        60
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; timeline-analyzer/0.1)".into()
    }

    // Form defaults
    pub fn languages() -> Vec<String> {
        vec!["English".into(), "Turkish".into()]
    }
    pub fn models() -> Vec<String> {
        vec![
            "gpt-3.5-turbo".into(),
            "gpt-4-turbo".into(),
            "gpt-4".into(),
            "gpt-4o".into(),
            "gpt-4o-mini".into(),
        ]
    }
    pub fn default_model() -> String {
        "gpt-4-turbo".into()
    }
    pub fn min_limit() -> usize {
        10
    }
    pub fn max_limit() -> usize {
        200
    }
    pub fn limit_step() -> usize {
        10
    }
    pub fn default_limit() -> usize {
        50
    }

    // Server defaults
    pub fn bind() -> String {
        "127.0.0.1:8080".into()
    }
}
