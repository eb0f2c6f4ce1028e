// src/server/render.rs

//! HTML pages.

use crate::models::{AnalysisKind, AnalysisResult, FormConfig, FormInput};

const STYLE: &str = "body{font-family:sans-serif;max-width:48rem;margin:2rem auto;padding:0 1rem}\
label{display:block;margin-top:.75rem}\
.error{color:#b00020}\
.analysis{white-space:pre-wrap}";

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{title}</title>\
         <style>{STYLE}</style></head><body>{body}</body></html>"
    )
}

/// Escape text for use in element content and quoted attributes.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn options(choices: &[String], selected: &str) -> String {
    choices
        .iter()
        .map(|choice| {
            let mark = if choice == selected { " selected" } else { "" };
            let choice = escape_html(choice);
            format!("<option value=\"{choice}\"{mark}>{choice}</option>")
        })
        .collect()
}

/// The analysis form, optionally with an error and the previous input.
///
/// The password is never echoed back.
pub fn form_page(form: &FormConfig, error: Option<&str>, input: &FormInput) -> String {
    let error = error
        .map(|message| format!("<p class=\"error\">{}</p>", escape_html(message)))
        .unwrap_or_default();
    let limit = if input.limit.trim().is_empty() {
        form.default_limit.to_string()
    } else {
        input.limit.clone()
    };
    let model = if input.model.is_empty() {
        form.default_model.as_str()
    } else {
        input.model.as_str()
    };
    let kinds: String = AnalysisKind::ALL
        .iter()
        .map(|kind| {
            let checked = if input.kinds.contains(kind) { " checked" } else { "" };
            format!(
                "<label><input type=\"checkbox\" name=\"{kind}\"{checked}> {kind}</label>"
            )
        })
        .collect();

    let body = format!(
        "<h1>Profile Analyzer</h1>\
         <p>Analyze posts from a public profile using OpenAI GPT models.</p>\
         {error}\
         <form method=\"post\" action=\"/analyze\">\
         <label>Profile handle (without @) <input name=\"handle\" value=\"{handle}\"></label>\
         <label>Post limit <input type=\"number\" name=\"limit\" min=\"{min}\" max=\"{max}\" step=\"{step}\" value=\"{limit}\"></label>\
         <label>Your username <input name=\"username\" value=\"{username}\"></label>\
         <label>Your password <input type=\"password\" name=\"password\"></label>\
         <label>Response language <select name=\"language\">{languages}</select></label>\
         <fieldset><legend>Analysis type</legend>{kinds}</fieldset>\
         <label>Model <select name=\"model\">{models}</select></label>\
         <p><button type=\"submit\">Analyze</button></p>\
         </form>",
        handle = escape_html(&input.handle),
        min = form.min_limit,
        max = form.max_limit,
        step = form.limit_step,
        limit = escape_html(&limit),
        username = escape_html(&input.username),
        languages = options(&form.languages, &input.language),
        models = options(&form.models, model),
    );
    page("Profile Analyzer", &body)
}

/// Fetched post count followed by one section per analysis.
pub fn result_page(result: &AnalysisResult) -> String {
    let sections: String = result
        .sections
        .iter()
        .map(|section| {
            format!(
                "<h2>{}</h2><div class=\"analysis\">{}</div>",
                escape_html(&section.title),
                escape_html(&section.body)
            )
        })
        .collect();
    let body = format!(
        "<h1>@{handle}</h1><p>Fetched {count} posts.</p>{sections}\
         <p><small>Collected {at}</small></p><p><a href=\"/\">New analysis</a></p>",
        handle = escape_html(&result.handle),
        count = result.posts.len(),
        at = result.collected_at.format("%Y-%m-%d %H:%M:%S UTC"),
    );
    page("Profile Analyzer", &body)
}

/// Failure page; carries no partial results.
pub fn error_page(message: &str) -> String {
    let body = format!(
        "<h1>Analysis failed</h1><p class=\"error\">{}</p><p><a href=\"/\">Back</a></p>",
        escape_html(message)
    );
    page("Analysis failed", &body)
}
