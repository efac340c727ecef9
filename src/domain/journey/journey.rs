//! Journey: binds a customer to their one active conversation for one intent.

use serde::{Deserialize, Serialize};

use super::stage::Intent;
use crate::domain::foundation::{ConversationId, CustomerId, StateMachine, Timestamp, ValidationError};

/// Lifecycle of a journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JourneyStatus {
    #[default]
    Active,
    Closed,
}

impl StateMachine for JourneyStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        matches!((self, target), (JourneyStatus::Active, JourneyStatus::Closed))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            JourneyStatus::Active => vec![JourneyStatus::Closed],
            JourneyStatus::Closed => vec![],
        }
    }
}

/// Customer-to-conversation binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journey {
    pub customer_id: CustomerId,
    pub conversation_id: ConversationId,
    pub intent: Intent,
    pub status: JourneyStatus,
    pub started_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Journey {
    /// Starts an active journey on a fresh conversation id.
    pub fn start(customer_id: CustomerId, intent: Intent) -> Self {
        let now = Timestamp::now();
        Self {
            customer_id,
            conversation_id: ConversationId::new(),
            intent,
            status: JourneyStatus::Active,
            started_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == JourneyStatus::Active
    }

    /// Closes the journey. Closing twice is an error.
    pub fn close(&mut self) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(JourneyStatus::Closed)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    pub fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn journey() -> Journey {
        Journey::start(CustomerId::new("cust-1").unwrap(), Intent::HospitalAdmissionClaim)
    }

    #[test]
    fn starts_active_with_fresh_conversation() {
        let a = journey();
        let b = journey();
        assert!(a.is_active());
        assert_ne!(a.conversation_id, b.conversation_id);
    }

    #[test]
    fn close_is_one_way() {
        let mut j = journey();
        j.close().unwrap();
        assert!(!j.is_active());
        assert!(j.close().is_err());
    }

    #[test]
    fn closed_is_terminal() {
        assert!(JourneyStatus::Closed.is_terminal());
        assert!(!JourneyStatus::Active.is_terminal());
    }
}
