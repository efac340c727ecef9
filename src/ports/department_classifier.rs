//! Department Classifier Port - maps a free-text medical reason to a department.

use async_trait::async_trait;

use super::SearchError;
use crate::domain::hospital::Department;

/// Port for classifying a medical reason into one of the fixed departments.
#[async_trait]
pub trait DepartmentClassifier: Send + Sync {
    /// Returns `None` when the description cannot be classified.
    async fn classify(&self, description: &str) -> Result<Option<Department>, SearchError>;
}
