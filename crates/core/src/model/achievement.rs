use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::AchievementId;

/// Catalog entry a user can earn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: AchievementId,
    pub title: String,
    pub description: String,
    pub badge_icon: String,
}

/// An achievement together with the moment the user earned it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarnedAchievement {
    pub achievement: Achievement,
    pub earned_at: DateTime<Utc>,
}
