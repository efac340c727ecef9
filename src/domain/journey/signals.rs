//! Keyword signals read from raw user text.
//!
//! Matching is whole-word on a normalized copy of the text, so "know" never
//! counts as "no" and "yesterday" never counts as "yes".

const NEGATIVE: &[&str] = &[
    "no",
    "nope",
    "nah",
    "not",
    "don't",
    "dont",
    "do not",
    "never",
    "cancel",
    "stop",
    "not now",
    "not interested",
    "later",
    "wrong",
];

const AFFIRMATIVE: &[&str] = &[
    "yes",
    "yeah",
    "yep",
    "yup",
    "sure",
    "ok",
    "okay",
    "fine",
    "alright",
    "correct",
    "right",
    "confirm",
    "confirmed",
    "proceed",
    "go ahead",
    "please do",
    "absolutely",
];

/// Lowercases, turns punctuation (except apostrophes) into spaces and pads the
/// result with single spaces so phrases can be matched on word boundaries.
pub fn normalize(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '\'' { c } else { ' ' })
        .collect();
    let words: Vec<&str> = cleaned.split_whitespace().collect();
    format!(" {} ", words.join(" "))
}

fn mentions_any(text: &str, phrases: &[&str]) -> bool {
    let padded = normalize(text);
    phrases
        .iter()
        .any(|phrase| padded.contains(&format!(" {} ", phrase)))
}

/// Returns true if the text contains a negative word or phrase.
pub fn is_negative(text: &str) -> bool {
    mentions_any(text, NEGATIVE)
}

/// Returns true if the text reads as agreement and carries no negative signal.
pub fn is_affirmative(text: &str) -> bool {
    !is_negative(text) && mentions_any(text, AFFIRMATIVE)
}

/// Returns true if the text is nothing more than a yes/no answer.
pub fn is_bare_answer(text: &str) -> bool {
    let normalized = normalize(text);
    let trimmed = normalized.trim();
    !trimmed.is_empty()
        && (NEGATIVE.contains(&trimmed) || AFFIRMATIVE.contains(&trimmed))
}

/// Returns true if any of the goal keywords appears as a whole word.
pub fn mentions_goal(text: &str, keywords: &[&str]) -> bool {
    mentions_any(text, keywords)
}
