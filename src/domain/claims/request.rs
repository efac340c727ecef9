//! Claim intimation payload and receipt.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;
use crate::domain::journey::{CollectedData, Field};

/// Fixed policyholder record merged into every claim payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyholderProfile {
    pub policy_number: String,
    pub policyholder_name: String,
    pub member_id: String,
    pub mobile: String,
    pub email: String,
    pub insurer: String,
}

/// Flat JSON body sent to the claims API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRequest {
    pub policy_number: String,
    pub policyholder_name: String,
    pub member_id: String,
    pub mobile: String,
    pub email: String,
    pub insurer: String,
    pub patient_relation: String,
    pub medical_reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub hospital_id: String,
    pub hospital_name: String,
    pub hospital_address: String,
    pub hospital_city: String,
    pub estimated_cost: u64,
    /// `YYYY-MM-DD`.
    pub admission_date: String,
    /// `HH:MM`, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admission_time: Option<String>,
}

impl ClaimRequest {
    /// Builds the payload from the profile and what the conversation collected.
    ///
    /// The selected hospital must be a resolved record; the raw fallback query
    /// is not enough to submit a claim.
    pub fn build(profile: &PolicyholderProfile, data: &CollectedData) -> Result<Self, ValidationError> {
        let hospital = data
            .selected_hospital()
            .ok_or_else(|| ValidationError::empty_field(Field::SelectedHospital.as_str()))?;
        let estimated_cost = data
            .get(Field::EstimatedCost)
            .and_then(|v| v.as_amount())
            .ok_or_else(|| ValidationError::empty_field(Field::EstimatedCost.as_str()))?;
        let admission_date = data
            .get(Field::AdmissionDate)
            .and_then(|v| v.as_date())
            .ok_or_else(|| ValidationError::empty_field(Field::AdmissionDate.as_str()))?;

        Ok(Self {
            policy_number: profile.policy_number.clone(),
            policyholder_name: profile.policyholder_name.clone(),
            member_id: profile.member_id.clone(),
            mobile: profile.mobile.clone(),
            email: profile.email.clone(),
            insurer: profile.insurer.clone(),
            patient_relation: data.text(Field::PatientRelation).unwrap_or("self").to_string(),
            medical_reason: data.text(Field::MedicalReason).unwrap_or_default().to_string(),
            department: data.text(Field::Department).map(str::to_string),
            hospital_id: hospital.id.clone(),
            hospital_name: hospital.name.clone(),
            hospital_address: hospital.address.clone(),
            hospital_city: hospital.city.clone(),
            estimated_cost,
            admission_date: admission_date.format("%Y-%m-%d").to_string(),
            admission_time: data
                .get(Field::AdmissionTime)
                .and_then(|v| v.as_time())
                .map(|t| t.format("%H:%M").to_string()),
        })
    }
}

/// Identifiers issued by the claims API on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimReceipt {
    pub intimation_id: String,
    pub request_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::hospital::{Department, HospitalRecord};
    use crate::domain::journey::FieldValue;
    use chrono::{NaiveDate, NaiveTime};

    fn profile() -> PolicyholderProfile {
        PolicyholderProfile {
            policy_number: "POL-1001".into(),
            policyholder_name: "Asha Rao".into(),
            member_id: "MEM-7".into(),
            mobile: "+919800000000".into(),
            email: "asha@example.com".into(),
            insurer: "Care Health".into(),
        }
    }

    fn complete_data() -> CollectedData {
        CollectedData::new()
            .with(Field::PatientRelation, FieldValue::text("spouse"))
            .with(Field::MedicalReason, FieldValue::text("hand fracture"))
            .with(
                Field::SelectedHospital,
                FieldValue::Hospital(HospitalRecord {
                    id: "seven-star".into(),
                    name: "Seven Star Multispeciality Hospital".into(),
                    address: "Jaripatka".into(),
                    city: "Nagpur".into(),
                    departments: vec![Department::Orthopedics],
                    rating: 4.5,
                    cashless: true,
                }),
            )
            .with(Field::EstimatedCost, FieldValue::Amount(20000))
            .with(Field::AdmissionDate, FieldValue::Date(NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()))
            .with(Field::AdmissionTime, FieldValue::Time(NaiveTime::from_hms_opt(10, 0, 0).unwrap()))
    }

    #[test]
    fn builds_flat_payload() {
        let request = ClaimRequest::build(&profile(), &complete_data()).unwrap();
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["policy_number"], "POL-1001");
        assert_eq!(json["hospital_name"], "Seven Star Multispeciality Hospital");
        assert_eq!(json["estimated_cost"], 20000);
        assert_eq!(json["admission_date"], "2026-10-17");
        assert_eq!(json["admission_time"], "10:00");
        assert!(json.get("department").is_none());
    }

    #[test]
    fn unresolved_hospital_is_rejected() {
        let data = CollectedData::new()
            .with(Field::HospitalQuery, FieldValue::text("some hospital"))
            .with(Field::EstimatedCost, FieldValue::Amount(20000));
        assert!(ClaimRequest::build(&profile(), &data).is_err());
    }
}
