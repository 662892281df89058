//! Onboarding profile store
//!
//! Profiles are created on first lookup with both flags cleared, matching how
//! a signed-in user without a profile document is treated.

use crate::core::models::UserProfile;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// In-memory profile store keyed by user id
#[derive(Debug, Default)]
pub struct ProfileStore {
    profiles: Mutex<HashMap<String, UserProfile>>,
}

impl ProfileStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Profile for `uid`, creating a fresh one if none exists
    pub fn get_or_create(&self, uid: &str, email: Option<String>) -> UserProfile {
        self.update(uid, email, |_| {})
    }

    /// Existing profile for `uid`
    #[must_use]
    pub fn get(&self, uid: &str) -> Option<UserProfile> {
        self.profiles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(uid)
            .cloned()
    }

    /// Mark the first-run tour as done
    pub fn complete_first_time(&self, uid: &str) -> UserProfile {
        self.update(uid, None, |profile| profile.first_time_done = true)
    }

    /// Mark sorting as completed and stamp the completion time
    pub fn complete_sorting(&self, uid: &str) -> UserProfile {
        self.update(uid, None, |profile| {
            profile.sorting_completed = true;
            profile.sorting_completed_at = Some(Utc::now());
        })
    }

    /// Number of known profiles
    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no profile exists
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn update(
        &self,
        uid: &str,
        email: Option<String>,
        apply: impl FnOnce(&mut UserProfile),
    ) -> UserProfile {
        let mut profiles = self
            .profiles
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let profile = profiles
            .entry(uid.to_string())
            .or_insert_with(|| UserProfile::new(email));
        apply(profile);
        profile.clone()
    }
}
