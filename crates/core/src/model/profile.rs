use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::UserId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProfileUpdateError {
    #[error("first name cannot be blank")]
    BlankFirstName,

    #[error("last name cannot be blank")]
    BlankLastName,
}

/// One row per user. Roll number, email, level, XP and the creation
/// timestamp are owned by the backend and never written from here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub roll_number: Option<String>,
    pub mobile_number: Option<String>,
    pub current_level: u32,
    pub total_xp: u32,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// "First Last" for greetings and headers.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// The only profile fields a user may edit.
///
/// Construction validates; a `ProfileUpdate` in hand is always writable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    first_name: String,
    last_name: String,
    mobile_number: Option<String>,
}

impl ProfileUpdate {
    /// Builds a validated update. Whitespace is trimmed and an empty
    /// mobile number is normalized to "not provided".
    ///
    /// # Errors
    ///
    /// Returns `ProfileUpdateError` if either name is blank.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        mobile_number: Option<String>,
    ) -> Result<Self, ProfileUpdateError> {
        let first_name = first_name.into().trim().to_owned();
        let last_name = last_name.into().trim().to_owned();
        if first_name.is_empty() {
            return Err(ProfileUpdateError::BlankFirstName);
        }
        if last_name.is_empty() {
            return Err(ProfileUpdateError::BlankLastName);
        }
        let mobile_number = mobile_number
            .map(|m| m.trim().to_owned())
            .filter(|m| !m.is_empty());
        Ok(Self {
            first_name,
            last_name,
            mobile_number,
        })
    }

    /// Prefills the edit form from the stored profile.
    #[must_use]
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            mobile_number: profile.mobile_number.clone(),
        }
    }

    #[must_use]
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    #[must_use]
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    #[must_use]
    pub fn mobile_number(&self) -> Option<&str> {
        self.mobile_number.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_names() {
        assert_eq!(
            ProfileUpdate::new("  ", "Khan", None),
            Err(ProfileUpdateError::BlankFirstName)
        );
        assert_eq!(
            ProfileUpdate::new("Ayesha", "", None),
            Err(ProfileUpdateError::BlankLastName)
        );
    }

    #[test]
    fn normalizes_empty_mobile_to_none() {
        let update = ProfileUpdate::new("Ayesha", "Khan", Some("  ".into())).unwrap();
        assert_eq!(update.mobile_number(), None);
    }

    #[test]
    fn trims_names() {
        let update = ProfileUpdate::new(" Ayesha ", " Khan ", Some("+92 300 1234567".into()))
            .unwrap();
        assert_eq!(update.first_name(), "Ayesha");
        assert_eq!(update.last_name(), "Khan");
        assert_eq!(update.mobile_number(), Some("+92 300 1234567"));
    }
}
