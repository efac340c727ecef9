//! Hospital catalog vocabulary.
//!
//! Departments are the fixed categories a medical reason is classified into;
//! hospital records are the candidates presented to the customer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::foundation::ValidationError;

/// Fixed set of medical departments used to route a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Department {
    Orthopedics,
    Cardiology,
    Neurology,
    Oncology,
    Gastroenterology,
    Pulmonology,
    Nephrology,
    Urology,
    Obstetrics,
    Pediatrics,
    Ophthalmology,
    Ent,
    Dermatology,
    GeneralSurgery,
    GeneralMedicine,
}

impl Department {
    /// Every department, in the order offered to classifiers.
    pub const ALL: [Department; 15] = [
        Department::Orthopedics,
        Department::Cardiology,
        Department::Neurology,
        Department::Oncology,
        Department::Gastroenterology,
        Department::Pulmonology,
        Department::Nephrology,
        Department::Urology,
        Department::Obstetrics,
        Department::Pediatrics,
        Department::Ophthalmology,
        Department::Ent,
        Department::Dermatology,
        Department::GeneralSurgery,
        Department::GeneralMedicine,
    ];

    /// Machine name (matches the serde representation).
    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Orthopedics => "orthopedics",
            Department::Cardiology => "cardiology",
            Department::Neurology => "neurology",
            Department::Oncology => "oncology",
            Department::Gastroenterology => "gastroenterology",
            Department::Pulmonology => "pulmonology",
            Department::Nephrology => "nephrology",
            Department::Urology => "urology",
            Department::Obstetrics => "obstetrics",
            Department::Pediatrics => "pediatrics",
            Department::Ophthalmology => "ophthalmology",
            Department::Ent => "ent",
            Department::Dermatology => "dermatology",
            Department::GeneralSurgery => "general_surgery",
            Department::GeneralMedicine => "general_medicine",
        }
    }

    /// Human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Department::Orthopedics => "Orthopedics",
            Department::Cardiology => "Cardiology",
            Department::Neurology => "Neurology",
            Department::Oncology => "Oncology",
            Department::Gastroenterology => "Gastroenterology",
            Department::Pulmonology => "Pulmonology",
            Department::Nephrology => "Nephrology",
            Department::Urology => "Urology",
            Department::Obstetrics => "Obstetrics & Gynaecology",
            Department::Pediatrics => "Pediatrics",
            Department::Ophthalmology => "Ophthalmology",
            Department::Ent => "ENT",
            Department::Dermatology => "Dermatology",
            Department::GeneralSurgery => "General Surgery",
            Department::GeneralMedicine => "General Medicine",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Department {
    type Err = ValidationError;

    /// Accepts the machine name or the label, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace([' ', '-'], "_");
        Department::ALL
            .iter()
            .copied()
            .find(|d| d.as_str() == wanted || d.label().to_lowercase().replace(' ', "_") == wanted)
            .ok_or_else(|| ValidationError::invalid_format("department", format!("unknown department '{}'", s)))
    }
}

/// A hospital that can be offered to the customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HospitalRecord {
    pub id: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub departments: Vec<Department>,
    #[serde(default)]
    pub rating: f32,
    #[serde(default = "default_cashless")]
    pub cashless: bool,
}

fn default_cashless() -> bool {
    true
}

impl HospitalRecord {
    /// Returns true if the hospital treats the given department.
    pub fn treats(&self, department: Department) -> bool {
        self.departments.contains(&department)
    }

    /// Returns true if the hospital is in (or its address mentions) the given place.
    pub fn is_near(&self, place: &str) -> bool {
        let place = place.trim().to_lowercase();
        !place.is_empty()
            && (self.city.to_lowercase() == place || self.address.to_lowercase().contains(&place))
    }
}
