use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{ModuleId, SubModuleId, UserId};

/// Persisted completion flag for one (user, sub-module) pair.
///
/// At most one row exists per pair; module- and level-level completion are
/// always derived from these rows, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRow {
    pub user_id: UserId,
    pub module_id: ModuleId,
    pub sub_module_id: SubModuleId,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ProgressRow {
    /// Builds a completed row stamped with the given completion time.
    #[must_use]
    pub fn completed(
        user_id: UserId,
        module_id: ModuleId,
        sub_module_id: SubModuleId,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            module_id,
            sub_module_id,
            is_completed: true,
            completed_at: Some(completed_at),
        }
    }
}
