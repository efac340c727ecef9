//! Deterministic replies used when text generation is unavailable or fails,
//! plus the stage context handed to the text generator.

use super::collected::{CollectedData, Field, FieldValue};
use super::stage::{Stage, StageId};

/// Numbered list of presented hospitals, one per line.
pub fn hospital_list(data: &CollectedData) -> String {
    data.hospital_options()
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{}. {} ({})", i + 1, h.name, h.address))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Facts about the conversation the text generator should respect.
pub fn stage_context(stage: &Stage, data: &CollectedData) -> String {
    let mut lines = vec![format!("Current step: {}", stage.id)];
    for (field, value) in data.iter() {
        if field == Field::HospitalOptions {
            continue;
        }
        lines.push(format!("{}: {}", field, value.render()));
    }
    if stage.id == StageId::ShowHospitals || stage.id == StageId::AwaitHospitalSelection {
        let list = hospital_list(data);
        if !list.is_empty() {
            lines.push(format!("Hospitals to present:\n{}", list));
        }
    }
    lines.join("\n")
}

fn rendered(data: &CollectedData, field: Field) -> Option<String> {
    data.get(field).map(FieldValue::render)
}

/// Template reply for a stage.
pub fn fallback_reply(stage: StageId, data: &CollectedData) -> String {
    match stage {
        StageId::Greeting => {
            "Hello! I can help you arrange a hospital admission and register a cashless claim. Shall we begin?".to_string()
        }
        StageId::IdentifyPatient => {
            "Who is being admitted: you, or a family member such as your spouse, child or parent?".to_string()
        }
        StageId::MedicalReason => {
            "What is the medical reason for the admission? You can also mention the city you prefer.".to_string()
        }
        StageId::ShowHospitals => {
            if data.hospital_options().is_empty() {
                "I could not find a network hospital for that yet. Could you describe the condition another way or mention a city?".to_string()
            } else {
                format!(
                    "These network hospitals can treat this:\n{}\nWhich one would you like?",
                    hospital_list(data)
                )
            }
        }
        StageId::AwaitHospitalSelection => {
            let list = hospital_list(data);
            match data.text(Field::HospitalQuery) {
                Some(query) if data.selected_hospital().is_none() => format!(
                    "I could not match \"{}\" to the list. Please reply with a name or number:\n{}",
                    query, list
                ),
                _ => format!("Please choose a hospital by name or number:\n{}", list),
            }
        }
        StageId::ConfirmAdmission => match data.selected_hospital() {
            Some(h) => format!(
                "You picked {}, {}. Shall I go ahead with the admission there?",
                h.name, h.address
            ),
            None => "Which hospital would you like to go ahead with?".to_string(),
        },
        StageId::CollectAdmissionDetails => {
            match (data.contains(Field::EstimatedCost), data.contains(Field::AdmissionDate)) {
                (true, false) => "Thanks. On which date is the admission planned?".to_string(),
                (false, true) => "Thanks. What is the estimated cost of the treatment?".to_string(),
                _ => "Please share the estimated treatment cost and the admission date (and the time, if you know it).".to_string(),
            }
        }
        StageId::InitiateClaim => {
            let hospital = data
                .selected_hospital()
                .map(|h| h.name.clone())
                .unwrap_or_else(|| "the hospital".to_string());
            format!(
                "Thank you. I am registering your cashless claim at {} now. You will receive the intimation id shortly.",
                hospital
            )
        }
        StageId::ScheduleFollowups => match rendered(data, Field::IntimationId) {
            Some(id) => format!(
                "Your claim is registered. Intimation id: {}. I will send you reminders before the admission.",
                id
            ),
            None => "Your claim is being registered. I will share the intimation id as soon as it arrives.".to_string(),
        },
        StageId::AdmissionConfirmed => {
            "Everything is set for the admission. Is there anything else I can help with?".to_string()
        }
        StageId::ClaimFailed => {
            "I'm sorry, the claim could not be registered right now. Please try again later or contact support.".to_string()
        }
        StageId::ClosePolitely => {
            "No problem. Message me any time you need help with a hospital admission.".to_string()
        }
        StageId::End => "Thank you for reaching out. Take care!".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::hospital::{Department, HospitalRecord};

    fn options() -> CollectedData {
        CollectedData::new().with(
            Field::HospitalOptions,
            FieldValue::Candidates(vec![HospitalRecord {
                id: "h".into(),
                name: "City Care Hospital".into(),
                address: "FC Road, Pune".into(),
                city: "Pune".into(),
                departments: vec![Department::Orthopedics],
                rating: 4.1,
                cashless: true,
            }]),
        )
    }

    #[test]
    fn every_stage_has_a_non_empty_fallback() {
        for id in StageId::ALL {
            assert!(!fallback_reply(id, &CollectedData::new()).trim().is_empty());
        }
    }

    #[test]
    fn show_hospitals_lists_options() {
        let reply = fallback_reply(StageId::ShowHospitals, &options());
        assert!(reply.contains("1. City Care Hospital (FC Road, Pune)"));
    }

    #[test]
    fn show_hospitals_without_options_asks_again() {
        let reply = fallback_reply(StageId::ShowHospitals, &CollectedData::new());
        assert!(reply.contains("could not find"));
    }

    #[test]
    fn unresolved_query_is_echoed() {
        let data = options().with(Field::HospitalQuery, FieldValue::text("some hospital"));
        let reply = fallback_reply(StageId::AwaitHospitalSelection, &data);
        assert!(reply.contains("\"some hospital\""));
    }

    #[test]
    fn context_skips_raw_options_but_lists_them_when_choosing() {
        let stage = Stage::new(StageId::AwaitHospitalSelection, "");
        let context = stage_context(&stage, &options());
        assert!(!context.contains("hospital_options"));
        assert!(context.contains("1. City Care Hospital"));
    }
}
