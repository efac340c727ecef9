//! Hospital search adapters.
//!
//! - `StaticHospitalCatalog` - Embedded YAML list of network hospitals
//! - `KeywordDepartmentClassifier` - Offline keyword classification
//! - `GeneratedDepartmentClassifier` - Text-generation classification with keyword fallback

mod generated_classifier;
mod keyword_classifier;
mod static_hospital_catalog;

pub use generated_classifier::GeneratedDepartmentClassifier;
pub use keyword_classifier::KeywordDepartmentClassifier;
pub use static_hospital_catalog::StaticHospitalCatalog;
