use std::panic;

pub const SENTENCE_DELIMITER: &str = ". ";
pub const DEFAULT_SENTENCE_COUNT: usize = 2;
/// Texts at or under this many UTF-16 code units are not summarized.
pub const MIN_SUMMARY_LENGTH: usize = 50;

pub const TOO_SHORT_PLACEHOLDER: &str = "Description too short to summarize.";
pub const NO_SUMMARY_PLACEHOLDER: &str = "No summary available";

/// Returns the first `sentence_count` segments of `text` split on `". "`.
///
/// Splitting is literal, so abbreviations and decimals followed by a space
/// count as boundaries. A trailing `"."` is appended whenever segments were
/// dropped, even if the last kept segment already ends in one.
pub fn summarize(text: &str, sentence_count: usize) -> String {
    let segments: Vec<&str> = text.split(SENTENCE_DELIMITER).collect();
    let mut summary = segments
        .iter()
        .take(sentence_count)
        .copied()
        .collect::<Vec<_>>()
        .join(SENTENCE_DELIMITER);

    if segments.len() > sentence_count {
        summary.push('.');
    }
    summary
}

/// Length-gated summary of an article description that never fails.
pub fn summarize_description(text: &str) -> String {
    if text.encode_utf16().count() <= MIN_SUMMARY_LENGTH {
        return TOO_SHORT_PLACEHOLDER.to_string();
    }

    summarize_isolated(text, |text| summarize(text, DEFAULT_SENTENCE_COUNT))
}

fn summarize_isolated<F>(text: &str, summarize_fn: F) -> String
where
    F: FnOnce(&str) -> String + panic::UnwindSafe,
{
    match panic::catch_unwind(move || summarize_fn(text)) {
        Ok(summary) => summary,
        Err(_) => {
            tracing::error!("Error generating summary; using placeholder");
            NO_SUMMARY_PLACEHOLDER.to_string()
        }
    }
}
