use std::sync::Arc;

use hub_core::model::{EarnedAchievement, ProfileUpdate, UserId, UserProfile};
use storage::repository::{AchievementRepository, ProfileRepository};

use crate::error::ProfileServiceError;

/// Everything the profile screen renders.
#[derive(Debug, Clone)]
pub struct ProfileView {
    pub profile: UserProfile,
    /// Earned achievements, newest first.
    pub achievements: Vec<EarnedAchievement>,
}

impl ProfileView {
    /// Prefilled edit form for the editable fields.
    #[must_use]
    pub fn edit_form(&self) -> ProfileUpdate {
        ProfileUpdate::from_profile(&self.profile)
    }
}

/// Serves the profile screen and handles profile edits.
#[derive(Clone)]
pub struct ProfileService {
    profiles: Arc<dyn ProfileRepository>,
    achievements: Arc<dyn AchievementRepository>,
}

impl ProfileService {
    #[must_use]
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        achievements: Arc<dyn AchievementRepository>,
    ) -> Self {
        Self {
            profiles,
            achievements,
        }
    }

    /// Loads the profile and the earned achievements. Unlike the other
    /// views, a missing profile row is an error here.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::ProfileNotFound` when no profile row
    /// exists and `ProfileServiceError::Storage` on store failure.
    pub async fn load(&self, user: UserId) -> Result<ProfileView, ProfileServiceError> {
        let (profile, achievements) = tokio::try_join!(
            self.profiles.profile(user),
            self.achievements.earned(user),
        )?;
        let profile = profile.ok_or(ProfileServiceError::ProfileNotFound)?;
        Ok(ProfileView {
            profile,
            achievements,
        })
    }

    /// Validates and writes the editable profile fields.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::Update` for blank names,
    /// `ProfileServiceError::ProfileNotFound` when no row exists, and
    /// `ProfileServiceError::Storage` on store failure.
    pub async fn update(
        &self,
        user: UserId,
        first_name: &str,
        last_name: &str,
        mobile_number: Option<String>,
    ) -> Result<(), ProfileServiceError> {
        let update = ProfileUpdate::new(first_name, last_name, mobile_number)?;
        self.profiles
            .update_profile(user, &update)
            .await
            .map_err(|err| match err {
                storage::repository::StorageError::NotFound => {
                    ProfileServiceError::ProfileNotFound
                }
                other => ProfileServiceError::Storage(other),
            })?;
        tracing::info!(%user, "profile updated");
        Ok(())
    }
}
