//! Extraction rules: pure per-field matchers run against the stage's collect list.
//!
//! `extract` never removes anything. It returns a patch that the caller merges
//! into the collected data.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use super::calendar;
use super::collected::{CollectedData, Field, FieldValue};
use super::matcher::{self, CandidateMatch};
use super::signals;
use super::stage::Stage;

/// Minimum length of a free-text medical reason.
pub const MIN_REASON_LEN: usize = 3;

static THOUSANDS_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d),(\d)").expect("thousands separator pattern"));

static AMOUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4,}").expect("amount pattern"));

/// Phrase table for the patient's relation to the customer. First match wins,
/// so more specific phrases come first.
const RELATIONS: &[(&str, &[&str])] = &[
    ("other_family", &["mother in law", "father in law", "sister in law", "brother in law", "grandmother", "grandfather", "grandma", "grandpa", "uncle", "aunt", "cousin", "nephew", "niece"]),
    ("spouse", &["wife", "husband", "spouse", "partner"]),
    ("child", &["son", "daughter", "child", "kid", "baby"]),
    ("parent", &["mother", "father", "mom", "mum", "dad", "parent", "parents"]),
    ("sibling", &["brother", "sister", "sibling"]),
    ("self", &["myself", "me", "self", "i am", "i'm", "my own"]),
];

/// City aliases recognized as a location hint, mapped to the catalog's spelling.
const CITIES: &[(&str, &str)] = &[
    ("mumbai", "Mumbai"),
    ("bombay", "Mumbai"),
    ("thane", "Thane"),
    ("pune", "Pune"),
    ("nagpur", "Nagpur"),
    ("nashik", "Nashik"),
    ("new delhi", "Delhi"),
    ("delhi", "Delhi"),
    ("bangalore", "Bengaluru"),
    ("bengaluru", "Bengaluru"),
    ("chennai", "Chennai"),
    ("hyderabad", "Hyderabad"),
    ("kolkata", "Kolkata"),
    ("ahmedabad", "Ahmedabad"),
    ("jaipur", "Jaipur"),
    ("lucknow", "Lucknow"),
    ("indore", "Indore"),
];

/// Inputs extraction needs besides the text itself.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionContext {
    /// Date relative expressions resolve against.
    pub today: NaiveDate,
}

impl ExtractionContext {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }
}

fn find_phrase<'a, T: Copy>(text: &str, table: &'a [(T, &'a [&'a str])]) -> Option<T> {
    let padded = signals::normalize(text);
    table.iter().find_map(|(value, phrases)| {
        phrases
            .iter()
            .any(|phrase| padded.contains(&format!(" {} ", phrase)))
            .then_some(*value)
    })
}

fn patient_relation(text: &str) -> Option<FieldValue> {
    let relation = find_phrase(text, RELATIONS)?;
    Some(FieldValue::text(relation))
}

fn medical_reason(text: &str) -> Option<FieldValue> {
    let trimmed = text.trim();
    if trimmed.chars().count() < MIN_REASON_LEN || signals::is_bare_answer(trimmed) {
        return None;
    }
    Some(FieldValue::text(trimmed))
}

fn location_hint(text: &str) -> Option<FieldValue> {
    let padded = signals::normalize(text);
    CITIES
        .iter()
        .find(|(alias, _)| padded.contains(&format!(" {} ", alias)))
        .map(|(_, city)| FieldValue::text(*city))
}

/// First run of four or more digits, ignoring thousands separators and dates.
pub fn amount(text: &str) -> Option<u64> {
    let joined = THOUSANDS_SEPARATOR.replace_all(text, "$1$2");
    let without_dates = calendar::strip_dates(&joined);
    AMOUNT
        .find(&without_dates)
        .and_then(|m| m.as_str().parse().ok())
}

fn extract_field(
    field: Field,
    text: &str,
    existing: &CollectedData,
    ctx: &ExtractionContext,
    patch: &mut CollectedData,
) {
    match field {
        Field::PatientRelation => {
            if let Some(value) = patient_relation(text) {
                patch.insert(field, value);
            }
        }
        Field::MedicalReason => {
            if let Some(value) = medical_reason(text) {
                patch.insert(field, value);
            }
        }
        Field::LocationHint => {
            if let Some(value) = location_hint(text) {
                patch.insert(field, value);
            }
        }
        Field::SelectedHospital => {
            match matcher::match_candidate(text, existing.hospital_options()) {
                CandidateMatch::Resolved(hospital) => {
                    patch.insert(Field::SelectedHospital, FieldValue::Hospital(hospital));
                }
                CandidateMatch::Unresolved(raw) => {
                    patch.insert(Field::HospitalQuery, FieldValue::Text(raw));
                }
                CandidateMatch::NoMatch => {}
            }
        }
        Field::EstimatedCost => {
            // First answer wins.
            if existing.contains(Field::EstimatedCost) {
                return;
            }
            if let Some(value) = amount(text) {
                patch.insert(field, FieldValue::Amount(value));
            }
        }
        Field::AdmissionDate => {
            if let Some(date) = calendar::parse_date(text, ctx.today) {
                patch.insert(field, FieldValue::Date(date));
            }
        }
        Field::AdmissionTime => {
            if let Some(time) = calendar::parse_time(text) {
                patch.insert(field, FieldValue::Time(time));
            }
        }
        // Filled by side effects, never by the customer.
        Field::Department
        | Field::HospitalOptions
        | Field::HospitalQuery
        | Field::ClaimStatus
        | Field::IntimationId
        | Field::RequestId
        | Field::ClaimError
        | Field::FollowupsScheduled => {}
    }
}

/// Runs every matcher the stage collects for and returns the partial update.
pub fn extract(
    stage: &Stage,
    text: &str,
    existing: &CollectedData,
    ctx: &ExtractionContext,
) -> CollectedData {
    let mut patch = CollectedData::new();
    for field in &stage.collect {
        extract_field(*field, text, existing, ctx, &mut patch);
    }
    patch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::hospital::{Department, HospitalRecord};
    use crate::domain::journey::stage::StageId;
    use chrono::NaiveTime;

    fn ctx() -> ExtractionContext {
        ExtractionContext::new(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap())
    }

    fn stage(fields: &[Field]) -> Stage {
        Stage::new(StageId::MedicalReason, "").collects(fields)
    }

    fn seven_star() -> HospitalRecord {
        HospitalRecord {
            id: "seven-star".to_string(),
            name: "Seven Star Multispeciality Hospital".to_string(),
            address: "Jaripatka".to_string(),
            city: "Nagpur".to_string(),
            departments: vec![Department::Orthopedics],
            rating: 4.5,
            cashless: true,
        }
    }

    mod relation {
        use super::*;

        #[test]
        fn possessive_phrases() {
            let cases = [
                ("my wife", "spouse"),
                ("It's for my husband", "spouse"),
                ("my son", "child"),
                ("my mother", "parent"),
                ("my mother-in-law", "other_family"),
                ("my sister", "sibling"),
                ("for myself", "self"),
                ("it's me", "self"),
            ];
            for (text, expected) in cases {
                let patch = extract(&stage(&[Field::PatientRelation]), text, &CollectedData::new(), &ctx());
                assert_eq!(patch.text(Field::PatientRelation), Some(expected), "input: {}", text);
            }
        }

        #[test]
        fn unrelated_text_collects_nothing() {
            let patch = extract(&stage(&[Field::PatientRelation]), "hello there", &CollectedData::new(), &ctx());
            assert!(patch.is_empty());
        }
    }

    mod reason_and_location {
        use super::*;

        #[test]
        fn reason_is_trimmed_free_text() {
            let patch = extract(&stage(&[Field::MedicalReason]), "  hand fracture ", &CollectedData::new(), &ctx());
            assert_eq!(patch.text(Field::MedicalReason), Some("hand fracture"));
        }

        #[test]
        fn bare_answers_are_not_reasons() {
            for text in ["yes", "no", "ok", "a"] {
                let patch = extract(&stage(&[Field::MedicalReason]), text, &CollectedData::new(), &ctx());
                assert!(patch.is_empty(), "input: {}", text);
            }
        }

        #[test]
        fn location_uses_catalog_spelling() {
            let patch = extract(
                &stage(&[Field::MedicalReason, Field::LocationHint]),
                "knee surgery in bangalore",
                &CollectedData::new(),
                &ctx(),
            );
            assert_eq!(patch.text(Field::LocationHint), Some("Bengaluru"));
            assert_eq!(patch.text(Field::MedicalReason), Some("knee surgery in bangalore"));
        }
    }

    mod hospital_selection {
        use super::*;

        fn existing() -> CollectedData {
            CollectedData::new().with(Field::HospitalOptions, FieldValue::Candidates(vec![seven_star()]))
        }

        #[test]
        fn resolved_selection_is_stored() {
            let patch = extract(&stage(&[Field::SelectedHospital]), "Seven Star Hospital", &existing(), &ctx());
            assert_eq!(patch.selected_hospital(), Some(&seven_star()));
        }

        #[test]
        fn unresolved_selection_never_fills_the_selected_field() {
            let patch = extract(&stage(&[Field::SelectedHospital]), "any good hospital", &existing(), &ctx());
            assert!(!patch.contains(Field::SelectedHospital));
            assert_eq!(patch.text(Field::HospitalQuery), Some("any good hospital"));
        }
    }

    mod admission_details {
        use super::*;

        fn details() -> Stage {
            stage(&[Field::EstimatedCost, Field::AdmissionDate, Field::AdmissionTime])
        }

        #[test]
        fn one_line_answer() {
            let patch = extract(&details(), "20000 tomorrow 10am", &CollectedData::new(), &ctx());
            assert_eq!(patch.get(Field::EstimatedCost), Some(&FieldValue::Amount(20000)));
            assert_eq!(
                patch.get(Field::AdmissionDate),
                Some(&FieldValue::Date(NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()))
            );
            assert_eq!(
                patch.get(Field::AdmissionTime),
                Some(&FieldValue::Time(NaiveTime::from_hms_opt(10, 0, 0).unwrap()))
            );
        }

        #[test]
        fn cost_ignores_separators_and_dates() {
            assert_eq!(amount("about Rs. 1,20,000 on 12/03/2027"), Some(120000));
            assert_eq!(amount("admit on 2027-03-12"), None);
            assert_eq!(amount("around 500"), None);
        }

        #[test]
        fn first_cost_wins() {
            let existing = CollectedData::new().with(Field::EstimatedCost, FieldValue::Amount(20000));
            let patch = extract(&details(), "actually 45000", &existing, &ctx());
            assert!(!patch.contains(Field::EstimatedCost));
        }

        #[test]
        fn later_date_overwrites() {
            let existing = CollectedData::new().with(
                Field::AdmissionDate,
                FieldValue::Date(NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()),
            );
            let patch = extract(&details(), "make it monday", &existing, &ctx());
            assert_eq!(
                patch.get(Field::AdmissionDate),
                Some(&FieldValue::Date(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()))
            );
        }
    }

    #[test]
    fn only_collected_fields_are_attempted() {
        let patch = extract(&stage(&[Field::PatientRelation]), "20000 tomorrow for my wife", &CollectedData::new(), &ctx());
        assert_eq!(patch.len(), 1);
        assert!(patch.contains(Field::PatientRelation));
    }
}
