//! Claim submission adapters.

mod http_claim_submitter;
mod mock_claim_submitter;

pub use http_claim_submitter::{HttpClaimConfig, HttpClaimSubmitter};
pub use mock_claim_submitter::MockClaimSubmitter;
