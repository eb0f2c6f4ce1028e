// src/services/prompts.rs

//! Prompt templates for each analysis kind.
//!
//! Supported placeholders: `{handle}`, `{posts}`, `{language}`.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::models::AnalysisKind;

const MAIN_TOPICS_PROMPT: &str = "This person, {handle}, usually tweets about the following topics:\n\
{posts}\n\n\
What are the main topics this person tweets about? Please respond in {language}.";

const MAIN_TOPICS_INSTRUCTIONS: &str =
    "Analyze the topics discussed in the tweets and respond in {language}.";

const AGGRESSIVE_LANGUAGE_PROMPT: &str = "Here is a list of tweets by {handle}:\n\
{posts}\n\n\
Please analyze if this person tends to use aggressive or offensive language in their tweets. \
Respond with your analysis in {language}.";

const AGGRESSIVE_LANGUAGE_INSTRUCTIONS: &str =
    "Check if the tweets contain any aggressive or offensive language and respond in {language}.";

/// A fully rendered request for one analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRequest {
    pub kind: AnalysisKind,
    pub model: String,
    /// Per-run instructions
    pub instructions: String,
    /// User message carrying the posts
    pub prompt: String,
    pub post_count: usize,
}

impl PromptRequest {
    /// Render the templates of `kind`.
    ///
    /// `handle` is the `@`-prefixed handle; posts are newline-joined.
    pub fn build(
        kind: AnalysisKind,
        handle: &str,
        posts: &[String],
        language: &str,
        model: &str,
    ) -> Self {
        let (prompt, instructions) = match kind {
            AnalysisKind::MainTopics => (MAIN_TOPICS_PROMPT, MAIN_TOPICS_INSTRUCTIONS),
            AnalysisKind::AggressiveLanguage => {
                (AGGRESSIVE_LANGUAGE_PROMPT, AGGRESSIVE_LANGUAGE_INSTRUCTIONS)
            }
        };
        let content = posts.join("\n");

        Self {
            kind,
            model: model.to_string(),
            instructions: render(instructions, handle, "", language),
            prompt: render(prompt, handle, &content, language),
            post_count: posts.len(),
        }
    }
}

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{(handle|posts|language)\}").expect("valid placeholder pattern")
});

// Single pass: substituted values are never scanned for placeholders.
fn render(template: &str, handle: &str, posts: &str, language: &str) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| match &caps[1] {
            "handle" => handle,
            "posts" => posts,
            _ => language,
        })
        .into_owned()
}
