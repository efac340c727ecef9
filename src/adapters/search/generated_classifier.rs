//! Department classifier backed by the text generator, with keyword fallback.

use async_trait::async_trait;
use std::sync::Arc;

use super::KeywordDepartmentClassifier;
use crate::domain::hospital::Department;
use crate::ports::{ChatMessage, DepartmentClassifier, GenerationRequest, SearchError, TextGenerator};

/// Asks the text generator to pick a department; falls back to keywords
/// when the generator fails or answers with something unknown.
pub struct GeneratedDepartmentClassifier {
    generator: Arc<dyn TextGenerator>,
    fallback: KeywordDepartmentClassifier,
}

impl GeneratedDepartmentClassifier {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            fallback: KeywordDepartmentClassifier::new(),
        }
    }

    fn prompt() -> String {
        let names: Vec<&str> = Department::ALL.iter().map(|d| d.as_str()).collect();
        format!(
            "Classify the medical reason into exactly one hospital department. \
             Answer with one of: {}, or `unknown`. Answer with the name only.",
            names.join(", ")
        )
    }

    fn parse_answer(answer: &str) -> Option<Department> {
        let first_line = answer.lines().next().unwrap_or_default();
        let cleaned = first_line.trim().trim_matches(|c: char| c == '`' || c == '.' || c == '"');
        cleaned.parse().ok()
    }
}

#[async_trait]
impl DepartmentClassifier for GeneratedDepartmentClassifier {
    async fn classify(&self, description: &str) -> Result<Option<Department>, SearchError> {
        let request = GenerationRequest::new()
            .with_system_prompt(Self::prompt())
            .with_message(ChatMessage::user(description))
            .with_max_tokens(10)
            .with_temperature(0.0);

        match self.generator.generate(request).await {
            Ok(answer) => {
                if let Some(department) = Self::parse_answer(&answer) {
                    return Ok(Some(department));
                }
                tracing::debug!(answer = %answer, "unrecognized department, using keywords");
            }
            Err(err) => {
                tracing::warn!(error = %err, "department classification failed, using keywords");
            }
        }
        Ok(self.fallback.classify_text(description))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockTextGenerator;
    use crate::ports::TextGenerationError;

    #[tokio::test]
    async fn uses_generated_answer() {
        let generator = MockTextGenerator::new().with_response("`cardiology`");
        let classifier = GeneratedDepartmentClassifier::new(Arc::new(generator));

        let department = classifier.classify("hand fracture").await.unwrap();
        assert_eq!(department, Some(Department::Cardiology));
    }

    #[tokio::test]
    async fn falls_back_to_keywords_on_error() {
        let generator = MockTextGenerator::new().with_error(TextGenerationError::RateLimited);
        let classifier = GeneratedDepartmentClassifier::new(Arc::new(generator));

        let department = classifier.classify("hand fracture").await.unwrap();
        assert_eq!(department, Some(Department::Orthopedics));
    }

    #[tokio::test]
    async fn falls_back_to_keywords_on_unknown_answer() {
        let generator = MockTextGenerator::new().with_response("unknown");
        let classifier = GeneratedDepartmentClassifier::new(Arc::new(generator));

        let department = classifier.classify("knee replacement").await.unwrap();
        assert_eq!(department, Some(Department::Orthopedics));
    }

    #[test]
    fn parses_label_or_machine_name() {
        assert_eq!(GeneratedDepartmentClassifier::parse_answer("General Surgery."), Some(Department::GeneralSurgery));
        assert_eq!(GeneratedDepartmentClassifier::parse_answer("ent\nbecause ears"), Some(Department::Ent));
    }
}
