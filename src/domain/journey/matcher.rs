//! Token-overlap matching of free text against presented hospital candidates.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

use crate::domain::hospital::HospitalRecord;

/// Minimum score for a candidate to be accepted.
pub const ACCEPT_SCORE: u32 = 2;
const EXACT_BONUS: u32 = 3;
const SUBSTRING_BONUS: u32 = 2;
const MIN_TOKEN_LEN: usize = 3;

/// Words that show the text is about a hospital even when nothing matched.
const GENERIC_KEYWORDS: &[&str] = &["hospital", "clinic", "nursing home", "medical centre", "medical center"];

static NUMBERED_CHOICE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:option|number|no\.?|#)?\s*(\d{1,2})\s*[.)]?\s*$").expect("numbered choice pattern")
});

static ORDINAL_CHOICE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(first|second|third|fourth|fifth|1st|2nd|3rd|4th|5th)\b").expect("ordinal choice pattern")
});

/// Result of resolving a selection against the candidate list.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateMatch {
    Resolved(HospitalRecord),
    /// Nothing matched, but the text talks about a hospital; kept as typed.
    Unresolved(String),
    NoMatch,
}

/// Lowercases, strips punctuation and collapses whitespace.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn tokens(normalized: &str) -> BTreeSet<&str> {
    normalized
        .split(' ')
        .filter(|t| t.chars().count() >= MIN_TOKEN_LEN)
        .collect()
}

/// Scores a candidate name against the text.
pub fn score(text: &str, candidate: &str) -> u32 {
    let text = normalize(text);
    let candidate = normalize(candidate);
    if text.is_empty() || candidate.is_empty() {
        return 0;
    }

    let shared = tokens(&text).intersection(&tokens(&candidate)).count() as u32;
    let mut score = shared;
    if text == candidate {
        score += EXACT_BONUS;
    } else if text.contains(&candidate) || candidate.contains(&text) {
        score += SUBSTRING_BONUS;
    }
    score
}

/// Index and score of the best candidate. Ties keep the earlier candidate.
pub fn best_match(text: &str, candidates: &[HospitalRecord]) -> Option<(usize, u32)> {
    let mut best: Option<(usize, u32)> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        let s = score(text, &candidate.name);
        if best.map_or(true, |(_, top)| s > top) {
            best = Some((index, s));
        }
    }
    best
}

/// Reads "2", "option 2" or "the second one" as a 1-based position.
fn positional_choice(text: &str) -> Option<usize> {
    if let Some(caps) = NUMBERED_CHOICE.captures(text) {
        return caps[1].parse().ok();
    }
    let caps = ORDINAL_CHOICE.captures(text)?;
    let position = match caps[1].to_lowercase().as_str() {
        "first" | "1st" => 1,
        "second" | "2nd" => 2,
        "third" | "3rd" => 3,
        "fourth" | "4th" => 4,
        _ => 5,
    };
    Some(position)
}

fn mentions_hospital(text: &str) -> bool {
    let padded = format!(" {} ", normalize(text));
    GENERIC_KEYWORDS
        .iter()
        .any(|keyword| padded.contains(&format!(" {} ", keyword)))
}

/// Resolves the customer's selection against the candidates that were shown.
pub fn match_candidate(text: &str, candidates: &[HospitalRecord]) -> CandidateMatch {
    if let Some((index, s)) = best_match(text, candidates) {
        if s >= ACCEPT_SCORE {
            return CandidateMatch::Resolved(candidates[index].clone());
        }
    }

    if let Some(position) = positional_choice(text) {
        if let Some(candidate) = position.checked_sub(1).and_then(|i| candidates.get(i)) {
            return CandidateMatch::Resolved(candidate.clone());
        }
    }

    if mentions_hospital(text) {
        return CandidateMatch::Unresolved(text.trim().to_string());
    }

    CandidateMatch::NoMatch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::hospital::Department;

    fn hospital(name: &str) -> HospitalRecord {
        HospitalRecord {
            id: normalize(name).replace(' ', "-"),
            name: name.to_string(),
            address: "Ring Road".to_string(),
            city: "Nagpur".to_string(),
            departments: vec![Department::Orthopedics],
            rating: 4.2,
            cashless: true,
        }
    }

    fn candidates() -> Vec<HospitalRecord> {
        vec![
            hospital("City Care Hospital"),
            hospital("Seven Star Multispeciality Hospital"),
            hospital("Orange City Hospital & Research Institute"),
        ]
    }

    mod scoring {
        use super::*;

        #[test]
        fn normalizes_punctuation_and_spacing() {
            assert_eq!(normalize("  Orange-City   Hospital! "), "orange city hospital");
        }

        #[test]
        fn exact_match_gets_bonus() {
            assert_eq!(score("city care hospital", "City Care Hospital"), 3 + 3);
        }

        #[test]
        fn substring_gets_bonus() {
            assert_eq!(score("seven star", "Seven Star Multispeciality Hospital"), 2 + 2);
        }

        #[test]
        fn short_tokens_do_not_count() {
            assert_eq!(score("a of in", "A Of In Hospital"), 2);
            assert_eq!(score("xy", "Xy Clinic"), 2);
        }

        #[test]
        fn ties_keep_first_candidate() {
            let list = vec![hospital("Alpha Hospital"), hospital("Beta Hospital")];
            assert_eq!(best_match("hospital", &list), Some((0, 3)));
        }
    }

    mod selection {
        use super::*;

        #[test]
        fn resolves_partial_name() {
            let result = match_candidate("I want Seven Star Hospital", &candidates());
            assert_eq!(
                result,
                CandidateMatch::Resolved(hospital("Seven Star Multispeciality Hospital"))
            );
        }

        #[test]
        fn generic_request_stays_unresolved() {
            let result = match_candidate("I want a hospital", &candidates());
            assert_eq!(result, CandidateMatch::Unresolved("I want a hospital".to_string()));
        }

        #[test]
        fn unrelated_text_is_no_match() {
            assert_eq!(match_candidate("what?", &candidates()), CandidateMatch::NoMatch);
        }

        #[test]
        fn numbered_choice() {
            assert_eq!(
                match_candidate("2", &candidates()),
                CandidateMatch::Resolved(hospital("Seven Star Multispeciality Hospital"))
            );
            assert_eq!(
                match_candidate("option 3", &candidates()),
                CandidateMatch::Resolved(hospital("Orange City Hospital & Research Institute"))
            );
        }

        #[test]
        fn ordinal_choice() {
            assert_eq!(
                match_candidate("the first one", &candidates()),
                CandidateMatch::Resolved(hospital("City Care Hospital"))
            );
        }

        #[test]
        fn out_of_range_choice_is_ignored() {
            assert_eq!(match_candidate("9", &candidates()), CandidateMatch::NoMatch);
        }

        #[test]
        fn empty_candidates_never_resolve() {
            assert_eq!(
                match_candidate("Seven Star Hospital", &[]),
                CandidateMatch::Unresolved("Seven Star Hospital".to_string())
            );
        }
    }
}
