//! Collected data: the accumulating record of everything learned in a conversation.
//!
//! Keys only ever grow or get overwritten. There is deliberately no removal API.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::hospital::HospitalRecord;

/// Field names known to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    PatientRelation,
    MedicalReason,
    LocationHint,
    Department,
    HospitalOptions,
    SelectedHospital,
    /// Raw selection text that did not resolve to a presented candidate.
    HospitalQuery,
    EstimatedCost,
    AdmissionDate,
    AdmissionTime,
    ClaimStatus,
    IntimationId,
    RequestId,
    ClaimError,
    FollowupsScheduled,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::PatientRelation => "patient_relation",
            Field::MedicalReason => "medical_reason",
            Field::LocationHint => "location_hint",
            Field::Department => "department",
            Field::HospitalOptions => "hospital_options",
            Field::SelectedHospital => "selected_hospital",
            Field::HospitalQuery => "hospital_query",
            Field::EstimatedCost => "estimated_cost",
            Field::AdmissionDate => "admission_date",
            Field::AdmissionTime => "admission_time",
            Field::ClaimStatus => "claim_status",
            Field::IntimationId => "intimation_id",
            Field::RequestId => "request_id",
            Field::ClaimError => "claim_error",
            Field::FollowupsScheduled => "followups_scheduled",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A collected value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    /// Currency amount in whole rupees.
    Amount(u64),
    Date(NaiveDate),
    Time(NaiveTime),
    Count(u32),
    Hospital(HospitalRecord),
    Candidates(Vec<HospitalRecord>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_amount(&self) -> Option<u64> {
        match self {
            FieldValue::Amount(a) => Some(*a),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<NaiveTime> {
        match self {
            FieldValue::Time(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_hospital(&self) -> Option<&HospitalRecord> {
        match self {
            FieldValue::Hospital(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_candidates(&self) -> Option<&[HospitalRecord]> {
        match self {
            FieldValue::Candidates(c) => Some(c),
            _ => None,
        }
    }

    /// Renders the value for prompts and message templates.
    pub fn render(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Amount(a) => format!("Rs. {}", a),
            FieldValue::Date(d) => d.format("%d %b %Y").to_string(),
            FieldValue::Time(t) => t.format("%I:%M %p").to_string(),
            FieldValue::Count(c) => c.to_string(),
            FieldValue::Hospital(h) => h.name.clone(),
            FieldValue::Candidates(c) => c
                .iter()
                .map(|h| h.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Progress marker of the claim side effect, stored under [`Field::ClaimStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimProgress {
    Pending,
    Submitted,
    Failed,
}

impl ClaimProgress {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimProgress::Pending => "pending",
            ClaimProgress::Submitted => "submitted",
            ClaimProgress::Failed => "failed",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ClaimProgress::Pending),
            "submitted" => Some(ClaimProgress::Submitted),
            "failed" => Some(ClaimProgress::Failed),
            _ => None,
        }
    }
}

/// Monotonic field map for one conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectedData(BTreeMap<Field, FieldValue>);

impl CollectedData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for patches and tests.
    pub fn with(mut self, field: Field, value: FieldValue) -> Self {
        self.insert(field, value);
        self
    }

    /// Sets or overwrites a field.
    pub fn insert(&mut self, field: Field, value: FieldValue) {
        self.0.insert(field, value);
    }

    /// Folds a partial update in. Existing keys not present in the patch are kept.
    pub fn merge(&mut self, patch: CollectedData) {
        for (field, value) in patch.0 {
            self.0.insert(field, value);
        }
    }

    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.0.get(&field)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    /// Returns true if every listed field is present.
    pub fn contains_all(&self, fields: &[Field]) -> bool {
        fields.iter().all(|f| self.contains(*f))
    }

    pub fn text(&self, field: Field) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_text)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &FieldValue)> + '_ {
        self.0.iter().map(|(k, v)| (*k, v))
    }

    /// The hospital the customer picked, only when resolved to a presented candidate.
    pub fn selected_hospital(&self) -> Option<&HospitalRecord> {
        self.get(Field::SelectedHospital).and_then(FieldValue::as_hospital)
    }

    /// Candidates presented by the last successful search.
    pub fn hospital_options(&self) -> &[HospitalRecord] {
        self.get(Field::HospitalOptions)
            .and_then(FieldValue::as_candidates)
            .unwrap_or(&[])
    }

    pub fn claim_progress(&self) -> Option<ClaimProgress> {
        self.text(Field::ClaimStatus).and_then(ClaimProgress::parse)
    }
}
