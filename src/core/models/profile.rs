//! Onboarding profile

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-user onboarding flags
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Account email, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Whether the first-run tour has been shown
    #[serde(default)]
    pub first_time_done: bool,
    /// Whether the house sorting flow has been completed
    #[serde(default)]
    pub sorting_completed: bool,
    /// When the profile was first created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// When sorting was completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sorting_completed_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Fresh profile with both flags cleared
    #[must_use]
    pub fn new(email: Option<String>) -> Self {
        Self {
            email,
            created_at: Some(Utc::now()),
            ..Self::default()
        }
    }

    /// Whether the user should land on the onboarding flow
    #[must_use]
    pub const fn needs_onboarding(&self) -> bool {
        !self.first_time_done || !self.sorting_completed
    }
}
