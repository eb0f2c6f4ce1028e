//! Analysis requests assembled from form input, and their results.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{FormConfig, StopReason};

/// Kind of analysis to run over the collected posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    MainTopics,
    AggressiveLanguage,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 2] = [AnalysisKind::MainTopics, AnalysisKind::AggressiveLanguage];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::MainTopics => "main_topics",
            AnalysisKind::AggressiveLanguage => "aggressive_language",
        }
    }

    /// Section heading, e.g. `Main_topics Analysis`.
    pub fn title(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        let capitalized = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
            None => String::new(),
        };
        format!("{capitalized} Analysis")
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| AppError::validation(format!("Unknown analysis type '{s}'")))
    }
}

/// Login credentials for the automated browser session.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Raw values as submitted through the form or the command line.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormInput {
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub limit: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub kinds: Vec<AnalysisKind>,
}

/// Immutable description of one analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// Profile handle without the leading `@`
    pub handle: String,
    pub limit: usize,
    pub credentials: Credentials,
    pub language: String,
    /// Requested analyses, processed in this order
    pub kinds: Vec<AnalysisKind>,
    pub model: String,
}

impl AnalysisRequest {
    /// Validate form input against the configured choices.
    ///
    /// Empty required fields are reported together before anything else.
    pub fn from_form(input: &FormInput, form: &FormConfig) -> Result<Self> {
        let handle = input.handle.trim().trim_start_matches('@').to_string();
        let username = input.username.trim().to_string();

        let missing: Vec<String> = [
            ("profile handle", handle.is_empty()),
            ("username", username.is_empty()),
            ("password", input.password.is_empty()),
        ]
        .into_iter()
        .filter(|(_, empty)| *empty)
        .map(|(name, _)| name.to_string())
        .collect();
        if !missing.is_empty() {
            return Err(AppError::MissingFields(missing));
        }

        let limit = if input.limit.trim().is_empty() {
            form.default_limit
        } else {
            input
                .limit
                .trim()
                .parse::<usize>()
                .map_err(|_| AppError::validation(format!("Invalid post limit '{}'", input.limit)))?
        };
        if !(form.min_limit..=form.max_limit).contains(&limit) {
            return Err(AppError::validation(format!(
                "Post limit must be between {} and {}",
                form.min_limit, form.max_limit
            )));
        }

        let language = Self::pick(&input.language, &form.languages, "response language")?;
        let model = if input.model.trim().is_empty() {
            form.default_model.clone()
        } else {
            Self::pick(&input.model, &form.models, "model")?
        };

        let mut kinds = Vec::new();
        for kind in &input.kinds {
            if !kinds.contains(kind) {
                kinds.push(*kind);
            }
        }

        Ok(Self {
            handle,
            limit,
            credentials: Credentials {
                username,
                password: input.password.clone(),
            },
            language,
            kinds,
            model,
        })
    }

    /// Handle as it appears in the rendered timeline.
    pub fn at_handle(&self) -> String {
        format!("@{}", self.handle)
    }

    fn pick(value: &str, choices: &[String], what: &str) -> Result<String> {
        let value = value.trim();
        if value.is_empty() {
            return choices
                .first()
                .cloned()
                .ok_or_else(|| AppError::config(format!("No {what} choices configured")));
        }
        choices
            .iter()
            .find(|choice| choice.as_str() == value)
            .cloned()
            .ok_or_else(|| AppError::validation(format!("Unsupported {what} '{value}'")))
    }
}

/// One rendered analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSection {
    pub kind: AnalysisKind,
    pub title: String,
    pub body: String,
}

/// Everything produced by one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub handle: String,
    pub posts: Vec<String>,
    pub stop_reason: StopReason,
    pub sections: Vec<AnalysisSection>,
    /// When post collection finished
    pub collected_at: DateTime<Utc>,
}
