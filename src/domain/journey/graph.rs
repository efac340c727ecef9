//! The stage graph for an intent and its pure `next_stage` function.

use serde::Serialize;
use std::collections::BTreeMap;

use super::collected::{CollectedData, Field};
use super::engine::{rule_for, DecisionInput};
use super::stage::{Intent, Outcome, SideEffect, Stage, StageId};

/// Result of one decision: where we were, which edge fired, where we land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub from: StageId,
    pub outcome: Outcome,
    pub to: StageId,
}

impl Transition {
    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

/// Static, immutable stage graph for one intent.
#[derive(Debug, Clone)]
pub struct StageGraph {
    intent: Intent,
    start: Stage,
    stages: BTreeMap<StageId, Stage>,
}

impl StageGraph {
    /// Builds the graph for an intent.
    pub fn for_intent(intent: Intent) -> Self {
        match intent {
            Intent::HospitalAdmissionClaim => Self::admission_claim(),
        }
    }

    fn from_stages(intent: Intent, start: StageId, stages: Vec<Stage>) -> Self {
        let stages: BTreeMap<StageId, Stage> = stages.into_iter().map(|s| (s.id, s)).collect();
        let start = stages
            .get(&start)
            .cloned()
            .unwrap_or_else(|| Stage::new(start, ""));
        Self { intent, start, stages }
    }

    fn admission_claim() -> Self {
        use Field as F;
        use StageId::*;

        let stages = vec![
            Stage::new(
                Greeting,
                "Greet the customer and offer help with a hospital admission and cashless claim. Ask if they want to proceed.",
            )
            .on(Outcome::Yes, IdentifyPatient)
            .on(Outcome::No, ClosePolitely),
            Stage::new(
                IdentifyPatient,
                "Ask who is being admitted: the customer or a family member.",
            )
            .requires(&[F::PatientRelation])
            .collects(&[F::PatientRelation])
            .on(Outcome::Collected, MedicalReason),
            Stage::new(
                MedicalReason,
                "Ask for the medical reason for admission and, if they like, the city they prefer.",
            )
            .requires(&[F::MedicalReason])
            .collects(&[F::MedicalReason, F::LocationHint])
            .on(Outcome::Collected, ShowHospitals),
            Stage::new(
                ShowHospitals,
                "Present the network hospitals found for this condition as a numbered list and ask which one they prefer.",
            )
            .requires(&[F::HospitalOptions])
            .collects(&[F::SelectedHospital, F::LocationHint])
            .with_side_effect(SideEffect::CandidateSearch)
            .auto_advancing()
            .on(Outcome::Selected, ConfirmAdmission)
            .on(Outcome::Shown, AwaitHospitalSelection),
            Stage::new(
                AwaitHospitalSelection,
                "Ask the customer to pick one of the listed hospitals by name or number.",
            )
            .requires(&[F::SelectedHospital])
            .collects(&[F::SelectedHospital])
            .on(Outcome::Collected, ConfirmAdmission),
            Stage::new(
                ConfirmAdmission,
                "Confirm the selected hospital and ask whether to go ahead with the admission there.",
            )
            .on(Outcome::Yes, CollectAdmissionDetails)
            .on(Outcome::No, AwaitHospitalSelection),
            Stage::new(
                CollectAdmissionDetails,
                "Ask for the estimated treatment cost, the admission date and, optionally, the time.",
            )
            .requires(&[F::EstimatedCost, F::AdmissionDate])
            .collects(&[F::EstimatedCost, F::AdmissionDate, F::AdmissionTime])
            .on(Outcome::Complete, InitiateClaim)
            .on(Outcome::Partial, CollectAdmissionDetails),
            Stage::new(
                InitiateClaim,
                "Tell the customer the cashless claim is being registered and they will get the intimation id shortly.",
            )
            .requires(&[F::IntimationId])
            .with_side_effect(SideEffect::ClaimSubmission)
            .on(Outcome::Success, ScheduleFollowups)
            .on(Outcome::Failure, ClaimFailed),
            Stage::new(
                ScheduleFollowups,
                "Share the intimation id and explain that reminders will follow before admission.",
            )
            .requires(&[F::FollowupsScheduled])
            .on(Outcome::Complete, AdmissionConfirmed),
            Stage::new(
                AdmissionConfirmed,
                "Confirm everything is set and ask if there is anything else.",
            )
            .on(Outcome::Restart, Greeting)
            .on(Outcome::End, End),
            Stage::new(
                ClaimFailed,
                "Apologise that the claim could not be registered and suggest contacting support or trying again.",
            )
            .on(Outcome::Restart, Greeting)
            .on(Outcome::End, End),
            Stage::new(
                ClosePolitely,
                "Thank the customer and let them know they can come back any time.",
            )
            .on(Outcome::Restart, Greeting)
            .on(Outcome::End, End),
            Stage::new(End, "The conversation has ended. Offer to start again if asked."),
        ];

        Self::from_stages(Intent::HospitalAdmissionClaim, Greeting, stages)
    }

    pub fn intent(&self) -> Intent {
        self.intent
    }

    pub fn start(&self) -> StageId {
        self.start.id
    }

    /// Looks up a stage; unknown ids resolve to the start stage.
    pub fn stage(&self, id: StageId) -> &Stage {
        self.stages.get(&id).unwrap_or(&self.start)
    }

    /// Current stage, with "not yet started" resolving to the start stage.
    pub fn current(&self, current: Option<StageId>) -> &Stage {
        match current {
            Some(id) => self.stage(id),
            None => &self.start,
        }
    }

    pub fn stages(&self) -> impl Iterator<Item = &Stage> {
        self.stages.values()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Decides the next stage. Pure: same inputs, same transition.
    pub fn next_stage(&self, current: Option<StageId>, data: &CollectedData, text: &str) -> Transition {
        let stage = self.current(current);
        let input = DecisionInput {
            intent: self.intent,
            stage,
            data,
            text,
        };
        let outcome = rule_for(stage.id)(&input);
        let to = stage.resolve(outcome);
        Transition {
            from: stage.id,
            outcome,
            to: self.stage(to).id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::journey::collected::FieldValue;

    fn graph() -> StageGraph {
        StageGraph::for_intent(Intent::HospitalAdmissionClaim)
    }

    mod structure {
        use super::*;

        #[test]
        fn contains_every_stage() {
            assert_eq!(graph().len(), StageId::ALL.len());
            for id in StageId::ALL {
                assert_eq!(graph().stage(id).id, id);
            }
        }

        #[test]
        fn every_edge_targets_a_known_stage() {
            let g = graph();
            for stage in g.stages() {
                for target in stage.transitions.values() {
                    assert_eq!(g.stage(*target).id, *target);
                }
            }
        }

        #[test]
        fn only_end_is_terminal() {
            let terminal: Vec<StageId> = graph().stages().filter(|s| s.is_terminal()).map(|s| s.id).collect();
            assert_eq!(terminal, vec![StageId::End]);
        }

        #[test]
        fn side_effects_are_declared_where_expected() {
            let g = graph();
            assert_eq!(g.stage(StageId::ShowHospitals).side_effect, Some(SideEffect::CandidateSearch));
            assert_eq!(g.stage(StageId::InitiateClaim).side_effect, Some(SideEffect::ClaimSubmission));
            assert!(g.stage(StageId::ShowHospitals).auto_advance);
        }
    }

    mod transitions {
        use super::*;

        #[test]
        fn not_started_resolves_to_greeting() {
            let t = graph().next_stage(None, &CollectedData::new(), "yes");
            assert_eq!(t.from, StageId::Greeting);
            assert_eq!(t.to, StageId::IdentifyPatient);
        }

        #[test]
        fn greeting_decline_goes_to_close_politely() {
            let t = graph().next_stage(Some(StageId::Greeting), &CollectedData::new(), "no");
            assert_eq!(t.to, StageId::ClosePolitely);
        }

        #[test]
        fn missing_field_self_loops() {
            let t = graph().next_stage(Some(StageId::MedicalReason), &CollectedData::new(), "ok");
            assert_eq!(t.outcome, Outcome::Stay);
            assert!(t.is_self_loop());
        }

        #[test]
        fn show_hospitals_skips_selection_when_already_resolved() {
            let data = CollectedData::new()
                .with(Field::HospitalOptions, FieldValue::Candidates(vec![]))
                .with(
                    Field::SelectedHospital,
                    FieldValue::Hospital(crate::domain::hospital::HospitalRecord {
                        id: "h".into(),
                        name: "City Care Hospital".into(),
                        address: "a".into(),
                        city: "Pune".into(),
                        departments: vec![],
                        rating: 4.0,
                        cashless: true,
                    }),
                );
            let t = graph().next_stage(Some(StageId::ShowHospitals), &data, "");
            assert_eq!(t.outcome, Outcome::Selected);
            assert_eq!(t.to, StageId::ConfirmAdmission);
        }

        #[test]
        fn declared_requirements_hold_the_stage() {
            for stage in graph().stages().filter(|s| !s.required.is_empty()) {
                let t = graph().next_stage(Some(stage.id), &CollectedData::new(), "yes");
                assert!(t.is_self_loop(), "{} left without its required fields", stage.id);
            }
        }

        #[test]
        fn confirm_without_selection_returns_to_selection() {
            let t = graph().next_stage(Some(StageId::ConfirmAdmission), &CollectedData::new(), "yes");
            assert_eq!(t.outcome, Outcome::No);
            assert_eq!(t.to, StageId::AwaitHospitalSelection);
        }

        #[test]
        fn partial_details_stay_put() {
            let data = CollectedData::new().with(Field::EstimatedCost, FieldValue::Amount(20000));
            let t = graph().next_stage(Some(StageId::CollectAdmissionDetails), &data, "20000");
            assert_eq!(t.outcome, Outcome::Partial);
            assert_eq!(t.to, StageId::CollectAdmissionDetails);
        }

        #[test]
        fn end_is_absorbing() {
            let t = graph().next_stage(Some(StageId::End), &CollectedData::new(), "hospital claim");
            assert_eq!(t.to, StageId::End);
        }

        #[test]
        fn branch_restart_goes_back_to_greeting() {
            let t = graph().next_stage(Some(StageId::ClaimFailed), &CollectedData::new(), "try the claim again");
            assert_eq!(t.outcome, Outcome::Restart);
            assert_eq!(t.to, StageId::Greeting);
        }
    }
}
