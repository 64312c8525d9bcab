use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Prepared text shorter than this is not worth a recording.
pub const MIN_SPEECH_CHARS: usize = 10;
/// Share of profane words above which a post is dropped instead of censored.
pub const MAX_PROFANITY_RATIO: f32 = 0.3;

const REMOVED_MARKERS: &[&str] = &["[removed]", "[deleted]"];

static PROFANITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(f+u+c+k+\w*|s+h+i+t+\w*|a+s+s+h+o+l+e+\w*|b+i+t+c+h+\w*|d+a+m+n+\w*|h+e+l+l+|c+r+a+p+\w*)\b",
    )
    .expect("valid profanity pattern")
});

/// Why prepared text was kept away from the speech engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterRejection {
    #[error("post was removed or deleted")]
    Removed,
    #[error("fewer than {} characters of text", MIN_SPEECH_CHARS)]
    TooShort,
    #[error("{:.0}% of words are profanity", .0 * 100.0)]
    Profanity(f32),
}

/// Safety gate between text preparation and synthesis.
///
/// Rejects removed posts, fragments and posts dominated by profanity.
/// Anything that passes comes back with profanity masked, keeping the first
/// and last letter of each word.
pub fn screen_speech(text: &str) -> Result<String, FilterRejection> {
    if REMOVED_MARKERS.iter().any(|marker| text.contains(marker)) {
        return Err(FilterRejection::Removed);
    }

    let text = text.trim();
    if text.chars().count() < MIN_SPEECH_CHARS {
        return Err(FilterRejection::TooShort);
    }

    let ratio = profanity_ratio(text);
    if ratio > MAX_PROFANITY_RATIO {
        return Err(FilterRejection::Profanity(ratio));
    }

    Ok(censor(text))
}

fn profanity_ratio(text: &str) -> f32 {
    let words = text.split_whitespace().count();
    if words == 0 {
        return 0.0;
    }
    PROFANITY.find_iter(text).count() as f32 / words as f32
}

fn censor(text: &str) -> String {
    PROFANITY
        .replace_all(text, |caps: &Captures| mask(&caps[0]))
        .into_owned()
}

fn mask(word: &str) -> String {
    let chars: Vec<char> = word.chars().collect();
    if chars.len() <= 2 {
        return "*".repeat(chars.len());
    }
    let mut masked = String::with_capacity(word.len());
    masked.push(chars[0]);
    masked.push_str(&"*".repeat(chars.len() - 2));
    masked.push(chars[chars.len() - 1]);
    masked
}
