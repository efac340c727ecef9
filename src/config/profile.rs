//! Policyholder profile merged into every claim.

use serde::Deserialize;

use crate::domain::claims::PolicyholderProfile;

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileConfig {
    #[serde(default = "default_policy_number")]
    pub policy_number: String,
    #[serde(default = "default_policyholder_name")]
    pub policyholder_name: String,
    #[serde(default = "default_member_id")]
    pub member_id: String,
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub email: String,
    #[serde(default = "default_insurer")]
    pub insurer: String,
}

impl ProfileConfig {
    pub fn to_profile(&self) -> PolicyholderProfile {
        PolicyholderProfile {
            policy_number: self.policy_number.clone(),
            policyholder_name: self.policyholder_name.clone(),
            member_id: self.member_id.clone(),
            mobile: self.mobile.clone(),
            email: self.email.clone(),
            insurer: self.insurer.clone(),
        }
    }
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            policy_number: default_policy_number(),
            policyholder_name: default_policyholder_name(),
            member_id: default_member_id(),
            mobile: String::new(),
            email: String::new(),
            insurer: default_insurer(),
        }
    }
}

fn default_policy_number() -> String {
    "POL-DEMO-0001".to_string()
}

fn default_policyholder_name() -> String {
    "Demo Policyholder".to_string()
}

fn default_member_id() -> String {
    "MEM-0001".to_string()
}

fn default_insurer() -> String {
    "Demo Health Insurance".to_string()
}
