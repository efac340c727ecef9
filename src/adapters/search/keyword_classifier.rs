//! Keyword department classifier.
//!
//! Counts keyword hits per department; multi-word phrases weigh as many
//! hits as they have words, so "kidney stone" beats "kidney".

use async_trait::async_trait;

use crate::domain::hospital::Department;
use crate::domain::journey::signals;
use crate::ports::{DepartmentClassifier, SearchError};

const KEYWORDS: &[(Department, &[&str])] = &[
    (Department::Orthopedics, &["fracture", "fractured", "broken", "bone", "knee", "hip", "joint", "spine", "ortho", "ligament", "sprain", "arthritis", "shoulder", "back pain", "acl"]),
    (Department::Cardiology, &["heart", "cardiac", "chest pain", "bypass", "angioplasty", "palpitation", "palpitations", "blood pressure", "stent"]),
    (Department::Neurology, &["stroke", "seizure", "seizures", "migraine", "brain", "nerve", "paralysis", "epilepsy", "headache"]),
    (Department::Oncology, &["cancer", "tumour", "tumor", "chemo", "chemotherapy", "radiation", "biopsy"]),
    (Department::Gastroenterology, &["stomach", "liver", "ulcer", "digestion", "abdominal", "jaundice", "colon", "acidity"]),
    (Department::Pulmonology, &["asthma", "lung", "lungs", "breathing", "pneumonia", "tuberculosis", "cough", "copd"]),
    (Department::Nephrology, &["kidney", "dialysis", "renal"]),
    (Department::Urology, &["kidney stone", "prostate", "urinary", "bladder"]),
    (Department::Obstetrics, &["pregnancy", "pregnant", "delivery", "maternity", "caesarean", "c section", "gynaec", "gynec"]),
    (Department::Pediatrics, &["infant", "newborn", "toddler", "pediatric", "paediatric"]),
    (Department::Ophthalmology, &["eye", "eyes", "cataract", "vision", "retina", "glaucoma", "lasik"]),
    (Department::Ent, &["ear", "nose", "throat", "tonsil", "tonsils", "sinus", "hearing"]),
    (Department::Dermatology, &["skin", "rash", "eczema", "psoriasis", "acne"]),
    (Department::GeneralSurgery, &["appendix", "appendicitis", "hernia", "gallstone", "gallstones", "gall bladder", "surgery"]),
    (Department::GeneralMedicine, &["fever", "dengue", "malaria", "typhoid", "infection", "weakness", "diabetes", "viral"]),
];

/// Classifies by keyword table. Deterministic and offline.
#[derive(Debug, Clone, Default)]
pub struct KeywordDepartmentClassifier;

impl KeywordDepartmentClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Best department for the text, if any keyword matched. Ties keep table order.
    pub fn classify_text(&self, description: &str) -> Option<Department> {
        let padded = signals::normalize(description);
        let mut best: Option<(Department, usize)> = None;
        for (department, keywords) in KEYWORDS {
            let score: usize = keywords
                .iter()
                .filter(|k| padded.contains(&format!(" {} ", k)))
                .map(|k| k.split(' ').count())
                .sum();
            if score > 0 && best.map_or(true, |(_, top)| score > top) {
                best = Some((*department, score));
            }
        }
        best.map(|(department, _)| department)
    }
}

#[async_trait]
impl DepartmentClassifier for KeywordDepartmentClassifier {
    async fn classify(&self, description: &str) -> Result<Option<Department>, SearchError> {
        Ok(self.classify_text(description))
    }
}
