//! Stage vocabulary: intents, stage ids, transition outcomes and stage definitions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::collected::Field;
use crate::domain::foundation::ValidationError;

/// A named conversation goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    HospitalAdmissionClaim,
}

impl Intent {
    pub const ALL: [Intent; 1] = [Intent::HospitalAdmissionClaim];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::HospitalAdmissionClaim => "hospital_admission_claim",
        }
    }

    /// Words that show the customer still wants this goal after a branch ends.
    pub fn goal_keywords(&self) -> &'static [&'static str] {
        match self {
            Intent::HospitalAdmissionClaim => &["admission", "admit", "claim", "hospital", "cashless"],
        }
    }
}

impl Default for Intent {
    fn default() -> Self {
        Intent::HospitalAdmissionClaim
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Intent {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "hospital_admission_claim" => Ok(Intent::HospitalAdmissionClaim),
            other => Err(ValidationError::invalid_format(
                "intent",
                format!("unknown intent '{}'", other),
            )),
        }
    }
}

/// Identifier of a stage in the admission claim graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    Greeting,
    IdentifyPatient,
    MedicalReason,
    ShowHospitals,
    AwaitHospitalSelection,
    ConfirmAdmission,
    CollectAdmissionDetails,
    InitiateClaim,
    ScheduleFollowups,
    AdmissionConfirmed,
    ClaimFailed,
    ClosePolitely,
    End,
}

impl StageId {
    pub const ALL: [StageId; 13] = [
        StageId::Greeting,
        StageId::IdentifyPatient,
        StageId::MedicalReason,
        StageId::ShowHospitals,
        StageId::AwaitHospitalSelection,
        StageId::ConfirmAdmission,
        StageId::CollectAdmissionDetails,
        StageId::InitiateClaim,
        StageId::ScheduleFollowups,
        StageId::AdmissionConfirmed,
        StageId::ClaimFailed,
        StageId::ClosePolitely,
        StageId::End,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageId::Greeting => "greeting",
            StageId::IdentifyPatient => "identify_patient",
            StageId::MedicalReason => "medical_reason",
            StageId::ShowHospitals => "show_hospitals",
            StageId::AwaitHospitalSelection => "await_hospital_selection",
            StageId::ConfirmAdmission => "confirm_admission",
            StageId::CollectAdmissionDetails => "collect_admission_details",
            StageId::InitiateClaim => "initiate_claim",
            StageId::ScheduleFollowups => "schedule_followups",
            StageId::AdmissionConfirmed => "admission_confirmed",
            StageId::ClaimFailed => "claim_failed",
            StageId::ClosePolitely => "close_politely",
            StageId::End => "end",
        }
    }

    /// Parses a stored stage name, falling back to `fallback` for unknown names.
    pub fn parse_or(name: &str, fallback: StageId) -> StageId {
        name.parse().unwrap_or(fallback)
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StageId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        StageId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == wanted)
            .ok_or_else(|| ValidationError::invalid_format("stage", format!("unknown stage '{}'", s)))
    }
}

/// Label of a transition edge chosen by a stage's decision rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Yes,
    No,
    Collected,
    Partial,
    Complete,
    Shown,
    Selected,
    Success,
    Failure,
    Restart,
    End,
    Default,
    /// Goal not met; stay in the current stage.
    Stay,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Yes => "yes",
            Outcome::No => "no",
            Outcome::Collected => "collected",
            Outcome::Partial => "partial",
            Outcome::Complete => "complete",
            Outcome::Shown => "shown",
            Outcome::Selected => "selected",
            Outcome::Success => "success",
            Outcome::Failure => "failure",
            Outcome::Restart => "restart",
            Outcome::End => "end",
            Outcome::Default => "default",
            Outcome::Stay => "stay",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// External action performed when a stage is entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SideEffect {
    CandidateSearch,
    ClaimSubmission,
}

impl SideEffect {
    /// Field whose presence means the side effect already ran to resolution.
    pub fn resolution_marker(&self) -> Field {
        match self {
            SideEffect::CandidateSearch => Field::HospitalOptions,
            SideEffect::ClaimSubmission => Field::ClaimStatus,
        }
    }

    /// Claim work is detached from the turn; search completes inline.
    pub fn runs_in_background(&self) -> bool {
        matches!(self, SideEffect::ClaimSubmission)
    }
}

/// Immutable stage definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    pub id: StageId,
    pub required: Vec<Field>,
    pub collect: Vec<Field>,
    pub transitions: BTreeMap<Outcome, StageId>,
    pub side_effect: Option<SideEffect>,
    /// Re-evaluate within the same turn once the side effect has completed.
    pub auto_advance: bool,
    pub response_hint: &'static str,
}

impl Stage {
    pub(crate) fn new(id: StageId, response_hint: &'static str) -> Self {
        Self {
            id,
            required: Vec::new(),
            collect: Vec::new(),
            transitions: BTreeMap::new(),
            side_effect: None,
            auto_advance: false,
            response_hint,
        }
    }

    pub(crate) fn requires(mut self, fields: &[Field]) -> Self {
        self.required = fields.to_vec();
        self
    }

    pub(crate) fn collects(mut self, fields: &[Field]) -> Self {
        self.collect = fields.to_vec();
        self
    }

    pub(crate) fn on(mut self, outcome: Outcome, target: StageId) -> Self {
        self.transitions.insert(outcome, target);
        self
    }

    pub(crate) fn with_side_effect(mut self, effect: SideEffect) -> Self {
        self.side_effect = Some(effect);
        self
    }

    pub(crate) fn auto_advancing(mut self) -> Self {
        self.auto_advance = true;
        self
    }

    /// Resolves an outcome to a target stage.
    ///
    /// A missing edge falls back to `default`, then to the stage itself.
    pub fn resolve(&self, outcome: Outcome) -> StageId {
        self.transitions
            .get(&outcome)
            .or_else(|| self.transitions.get(&Outcome::Default))
            .copied()
            .unwrap_or(self.id)
    }

    pub fn is_terminal(&self) -> bool {
        self.transitions.values().all(|target| *target == self.id)
    }
}
