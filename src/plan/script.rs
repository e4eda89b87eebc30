//! Narration text preparation and word-boundary conversion.
//!
//! These helpers sit on the synthesis side of the boundary: they shape the text handed to a
//! [`NarrationSynth`](crate::NarrationSynth) and turn its word-boundary events into
//! [`TimedWord`]s.

use std::sync::LazyLock;

use regex::Regex;

use crate::plan::model::TimedWord;

/// Default character budget for the body narration.
pub const DEFAULT_BODY_LIMIT: usize = 500;

/// Word-boundary offsets and durations count 100 ns ticks.
pub const TICKS_PER_SECOND: f64 = 10_000_000.0;

static MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").expect("markdown link pattern"));
static BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"http\S+").expect("url pattern"));
static EDIT_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\n+edit:.*").expect("edit section pattern"));
static RULE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[_\-]{2,}").expect("rule pattern"));

/// Make post text speakable.
///
/// Markdown links keep their label, bare URLs are removed, each `Edit:` line that follows a line
/// break is removed, runs of two or more `_`/`-` become a space, and the result is trimmed.
pub fn clean_text(text: &str) -> String {
    let text = MARKDOWN_LINK.replace_all(text, "$1");
    let text = BARE_URL.replace_all(&text, "");
    let text = EDIT_SECTION.replace_all(&text, "");
    let text = RULE_RUN.replace_all(&text, " ");
    text.trim().to_string()
}

/// Keep at most `max_chars` characters, appending `...` when anything was cut.
pub fn truncate_body(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// One word-boundary event from a speech synthesiser.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WordBoundary {
    /// Spoken word.
    pub text: String,
    /// Start, in 100 ns ticks from the start of the audio.
    pub offset: u64,
    /// Length, in 100 ns ticks.
    pub duration: u64,
}

/// Convert boundary events to segment-relative word timings, in event order.
pub fn boundaries_to_words(events: &[WordBoundary]) -> Vec<TimedWord> {
    events
        .iter()
        .map(|e| {
            TimedWord::new(
                e.text.clone(),
                e.offset as f64 / TICKS_PER_SECOND,
                (e.offset + e.duration) as f64 / TICKS_PER_SECOND,
            )
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/plan/script.rs"]
mod tests;
