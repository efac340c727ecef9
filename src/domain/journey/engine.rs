//! Stage decision rules.
//!
//! Each stage has one pure rule that inspects the collected data and the raw
//! text and names an outcome. The graph turns the outcome into a target stage.

use super::collected::{ClaimProgress, CollectedData, Field};
use super::signals;
use super::stage::{Intent, Outcome, Stage, StageId};

/// Everything a decision rule may look at.
#[derive(Debug, Clone, Copy)]
pub struct DecisionInput<'a> {
    pub intent: Intent,
    pub stage: &'a Stage,
    pub data: &'a CollectedData,
    pub text: &'a str,
}

/// A pure decision rule.
pub type DecisionRule = fn(&DecisionInput<'_>) -> Outcome;

/// Looks up the rule for a stage.
pub fn rule_for(stage: StageId) -> DecisionRule {
    match stage {
        StageId::Greeting => greeting,
        StageId::IdentifyPatient | StageId::MedicalReason | StageId::AwaitHospitalSelection => {
            collect_required
        }
        StageId::ShowHospitals => show_hospitals,
        StageId::ConfirmAdmission => confirm_admission,
        StageId::CollectAdmissionDetails => collect_admission_details,
        StageId::InitiateClaim => initiate_claim,
        StageId::ScheduleFollowups => schedule_followups,
        StageId::AdmissionConfirmed | StageId::ClaimFailed | StageId::ClosePolitely => {
            branch_end
        }
        StageId::End => terminal,
    }
}

fn greeting(input: &DecisionInput<'_>) -> Outcome {
    if signals::is_negative(input.text) {
        Outcome::No
    } else {
        Outcome::Yes
    }
}

fn collect_required(input: &DecisionInput<'_>) -> Outcome {
    if input.data.contains_all(&input.stage.required) {
        Outcome::Collected
    } else {
        Outcome::Stay
    }
}

fn show_hospitals(input: &DecisionInput<'_>) -> Outcome {
    if input.data.selected_hospital().is_some() {
        Outcome::Selected
    } else if !input.data.hospital_options().is_empty() {
        Outcome::Shown
    } else {
        Outcome::Stay
    }
}

fn confirm_admission(input: &DecisionInput<'_>) -> Outcome {
    if input.data.selected_hospital().is_none() || signals::is_negative(input.text) {
        Outcome::No
    } else if signals::is_affirmative(input.text) {
        Outcome::Yes
    } else {
        Outcome::Stay
    }
}

fn collect_admission_details(input: &DecisionInput<'_>) -> Outcome {
    let present = input
        .stage
        .required
        .iter()
        .filter(|field| input.data.contains(**field))
        .count();
    match present {
        0 => Outcome::Stay,
        n if n == input.stage.required.len() => Outcome::Complete,
        _ => Outcome::Partial,
    }
}

fn initiate_claim(input: &DecisionInput<'_>) -> Outcome {
    if input.data.contains(Field::IntimationId) {
        Outcome::Success
    } else if input.data.contains(Field::ClaimError)
        || input.data.claim_progress() == Some(ClaimProgress::Failed)
    {
        Outcome::Failure
    } else {
        Outcome::Stay
    }
}

fn schedule_followups(input: &DecisionInput<'_>) -> Outcome {
    if input.data.contains(Field::FollowupsScheduled) {
        Outcome::Complete
    } else {
        Outcome::Stay
    }
}

fn branch_end(input: &DecisionInput<'_>) -> Outcome {
    if signals::mentions_goal(input.text, input.intent.goal_keywords()) {
        Outcome::Restart
    } else {
        Outcome::End
    }
}

fn terminal(_input: &DecisionInput<'_>) -> Outcome {
    Outcome::Stay
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::journey::collected::FieldValue;

    fn decide(stage: &Stage, data: &CollectedData, text: &str) -> Outcome {
        let input = DecisionInput {
            intent: Intent::HospitalAdmissionClaim,
            stage,
            data,
            text,
        };
        rule_for(stage.id)(&input)
    }

    #[test]
    fn greeting_declines_on_negative() {
        let stage = Stage::new(StageId::Greeting, "");
        assert_eq!(decide(&stage, &CollectedData::new(), "no thanks"), Outcome::No);
        assert_eq!(decide(&stage, &CollectedData::new(), "hi"), Outcome::Yes);
    }

    #[test]
    fn collect_stage_needs_required_fields() {
        let stage = Stage::new(StageId::IdentifyPatient, "").requires(&[Field::PatientRelation]);
        assert_eq!(decide(&stage, &CollectedData::new(), "hmm"), Outcome::Stay);

        let data = CollectedData::new().with(Field::PatientRelation, FieldValue::text("spouse"));
        assert_eq!(decide(&stage, &data, "hmm"), Outcome::Collected);
    }

    #[test]
    fn admission_details_counts_required_fields() {
        let stage = Stage::new(StageId::CollectAdmissionDetails, "")
            .requires(&[Field::EstimatedCost, Field::AdmissionDate]);
        let cost = CollectedData::new().with(Field::EstimatedCost, FieldValue::Amount(20000));

        assert_eq!(decide(&stage, &CollectedData::new(), ""), Outcome::Stay);
        assert_eq!(decide(&stage, &cost, ""), Outcome::Partial);

        let both = cost.with(
            Field::AdmissionDate,
            FieldValue::Date(chrono::NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()),
        );
        assert_eq!(decide(&stage, &both, ""), Outcome::Complete);
    }

    #[test]
    fn initiate_claim_waits_for_result() {
        let stage = Stage::new(StageId::InitiateClaim, "");
        let pending = CollectedData::new().with(Field::ClaimStatus, FieldValue::text("pending"));
        assert_eq!(decide(&stage, &pending, "any update?"), Outcome::Stay);

        let failed = pending.clone().with(Field::ClaimError, FieldValue::text("rejected"));
        assert_eq!(decide(&stage, &failed, ""), Outcome::Failure);

        let done = pending.with(Field::IntimationId, FieldValue::text("INT-1"));
        assert_eq!(decide(&stage, &done, ""), Outcome::Success);
    }

    #[test]
    fn branch_stages_restart_on_goal_keyword() {
        let stage = Stage::new(StageId::ClosePolitely, "");
        assert_eq!(decide(&stage, &CollectedData::new(), "actually I need a cashless claim"), Outcome::Restart);
        assert_eq!(decide(&stage, &CollectedData::new(), "bye"), Outcome::End);
    }

    #[test]
    fn confirm_without_selection_goes_back() {
        let stage = Stage::new(StageId::ConfirmAdmission, "");
        assert_eq!(decide(&stage, &CollectedData::new(), "yes"), Outcome::No);
    }
}
