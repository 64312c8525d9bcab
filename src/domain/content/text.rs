use html2text::from_read;
use once_cell::sync::Lazy;
use regex::Regex;

static HTML_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</?[a-zA-Z][^>]*>").expect("valid html tag pattern"));
static MARKDOWN_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid markdown link pattern"));
static URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(https?://|www\.)[^\s)]+").expect("valid url pattern"));
static USER_MENTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|\s)/?u/([\w-]+)").expect("valid user mention pattern"));
static SUBREDDIT_MENTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|\s)/?r/([\w-]+)").expect("valid subreddit mention pattern"));
static SPOILER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r">!(.+?)!<").expect("valid spoiler pattern"));
static LINE_MARKERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*(#+|>+|[-*+]\s)\s*").expect("valid line marker pattern"));
static EMPHASIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*+|~~|\^").expect("valid emphasis pattern"));
static TLDR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\btl;?\s?dr\b:?").expect("valid tldr pattern"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Abbreviations read out in full. Matched as whole upper-case words.
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("AITA", "Am I the jerk"),
    ("WIBTA", "Would I be the jerk"),
    ("NTA", "Not the jerk"),
    ("YTA", "You're the jerk"),
    ("ESH", "Everyone sucks here"),
    ("NAH", "No jerks here"),
    ("TIFU", "Today I messed up"),
    ("TIL", "Today I learned"),
    ("ELI5", "Explain like I'm five"),
    ("AMA", "Ask me anything"),
    ("DAE", "Does anyone else"),
    ("TBH", "To be honest"),
    ("IMO", "In my opinion"),
    ("IMHO", "In my humble opinion"),
    ("AFAIK", "As far as I know"),
    ("IIRC", "If I recall correctly"),
    ("IANAL", "I am not a lawyer"),
    ("OP", "the original poster"),
];

static ABBREVIATION_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    ABBREVIATIONS
        .iter()
        .map(|(short, long)| {
            let pattern = format!(r"\b{}\b", regex::escape(short));
            (Regex::new(&pattern).expect("valid abbreviation pattern"), *long)
        })
        .collect()
});

/// Turn raw post markup into plain speakable text.
///
/// HTML is flattened, markdown links keep only their label, URLs are dropped,
/// mentions and common abbreviations are spelled out and whitespace is
/// collapsed. An empty result means there is nothing worth synthesizing.
pub fn clean_text(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let plain_text = if HTML_TAG.is_match(text) {
        from_read(text.as_bytes(), usize::MAX)
    } else {
        text.to_string()
    };

    let text = MARKDOWN_LINK.replace_all(&plain_text, "$1");
    let text = URL.replace_all(&text, "");
    let text = SPOILER.replace_all(&text, "$1");
    let text = LINE_MARKERS.replace_all(&text, "");
    let text = EMPHASIS.replace_all(&text, "");
    let text = USER_MENTION.replace_all(&text, "${1}user $2");
    let text = SUBREDDIT_MENTION.replace_all(&text, "${1}subreddit $2");
    let text = TLDR.replace_all(&text, "Too long, didn't read:");

    let mut expanded = text.into_owned();
    for (pattern, long) in ABBREVIATION_PATTERNS.iter() {
        expanded = pattern.replace_all(&expanded, *long).into_owned();
    }

    WHITESPACE.replace_all(&expanded, " ").trim().to_string()
}

/// Join a cleaned title and body into the text handed to the speech engine.
pub fn compose_speech(title: &str, body: &str) -> String {
    let title = title.trim();
    let body = body.trim();

    match (title.is_empty(), body.is_empty()) {
        (true, _) => body.to_string(),
        (false, true) => title.to_string(),
        (false, false) => {
            let ends_sentence = title
                .chars()
                .last()
                .map(|c| matches!(c, '.' | '!' | '?'))
                .unwrap_or(false);
            if ends_sentence {
                format!("{} {}", title, body)
            } else {
                format!("{}. {}", title, body)
            }
        }
    }
}
