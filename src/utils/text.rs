// src/utils/text.rs

//! Post text normalization and fingerprinting.

use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};

/// A number, an optional unit word, then whitespace.
/// The repeated number is matched separately because `regex` has no backreferences.
static METRIC_HEAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s*[A-Za-z]*\s+(\d+)").expect("valid metric pattern"));

/// Start of every digit run that begins on a word boundary.
static NUMBER_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d+").expect("valid number pattern"));

/// Join buffered segment texts with single spaces and strip the result.
pub fn join_segments<S: AsRef<str>>(parts: &[S]) -> String {
    parts
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Remove a `<number> <word> <same number>` run and the rest of its line.
///
/// Timeline blocks end with engagement counters rendered twice
/// (`5 likes 5`); the first such run marks where the post text ends.
pub fn strip_trailing_metrics(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut kept_from = 0;
    let mut search_from = 0;

    while let Some(candidate) = NUMBER_START.find_at(text, search_from) {
        let start = candidate.start();
        if let Some(end) = metric_run_end(&text[start..]) {
            out.push_str(&text[kept_from..start]);
            // `.` stops at a newline, so removal does too
            let line_end = text[start + end..]
                .find('\n')
                .map_or(text.len(), |offset| start + end + offset);
            kept_from = line_end;
            search_from = line_end;
        } else {
            search_from = candidate.end();
        }
        if search_from >= text.len() {
            break;
        }
    }

    out.push_str(&text[kept_from..]);
    out.trim().to_string()
}

/// Length of the metric run at the start of `tail`, if the repeated number
/// equals the first one and ends on a word boundary.
fn metric_run_end(tail: &str) -> Option<usize> {
    let caps = METRIC_HEAD.captures(tail)?;
    let (first, second) = (caps.get(1)?, caps.get(2)?);
    if first.as_str() != second.as_str() {
        return None;
    }
    let end = second.end();
    match tail[end..].chars().next() {
        Some(c) if c.is_alphanumeric() || c == '_' => None,
        _ => Some(end),
    }
}

/// Stable fingerprint of a cleaned post, used for de-duplication.
pub fn content_hash(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_repeated_metric_suffix() {
        assert_eq!(strip_trailing_metrics("hello world 5 likes 5"), "hello world");
    }

    #[test]
    fn strips_everything_after_the_metric_run() {
        assert_eq!(
            strip_trailing_metrics("great launch today 12 replies 12 3 reposts 3 Show more"),
            "great launch today"
        );
    }

    #[test]
    fn keeps_text_when_numbers_differ() {
        assert_eq!(
            strip_trailing_metrics("I ran 5 miles in 40 minutes"),
            "I ran 5 miles in 40 minutes"
        );
    }

    #[test]
    fn skips_mismatched_run_and_finds_later_match() {
        assert_eq!(
            strip_trailing_metrics("score 1 to 2 final 2 2"),
            "score 1 to"
        );
    }

    #[test]
    fn requires_boundary_after_repeated_number() {
        assert_eq!(strip_trailing_metrics("5 likes 55"), "5 likes 55");
        assert_eq!(strip_trailing_metrics("5 likes 5a"), "5 likes 5a");
    }

    #[test]
    fn requires_boundary_before_first_number() {
        assert_eq!(strip_trailing_metrics("v5 likes 5"), "v5 likes 5");
    }

    #[test]
    fn matches_without_unit_word() {
        assert_eq!(strip_trailing_metrics("posted 7 7 views"), "posted");
    }

    #[test]
    fn removal_stops_at_newline() {
        assert_eq!(
            strip_trailing_metrics("first 3 likes 3 tail\nsecond line"),
            "first \nsecond line"
        );
    }

    #[test]
    fn join_segments_uses_single_spaces() {
        assert_eq!(join_segments(&["a", "b", "c"]), "a b c");
        assert_eq!(join_segments(&["", "x", ""]), "x");
        assert_eq!(join_segments::<&str>(&[]), "");
    }

    #[test]
    fn content_hash_is_stable_sha256() {
        assert_eq!(
            content_hash("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(content_hash("x"), content_hash("x"));
        assert_ne!(content_hash("x"), content_hash("y"));
    }
}
