use hub_core::model::{ModuleId, ProgressRow, UserId};

use super::{
    SqliteRepository,
    mapping::{map_progress_row, read_err, user_id_to_string, write_err},
};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn list_progress(
        &self,
        user: UserId,
        module: Option<ModuleId>,
    ) -> Result<Vec<ProgressRow>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT user_id, module_id, sub_module_id, is_completed, completed_at
                FROM user_progress
                WHERE user_id = ?1 AND (?2 IS NULL OR module_id = ?2)
            ",
        )
        .bind(user_id_to_string(user))
        .bind(module.map(|m| m.value()))
        .fetch_all(self.pool())
        .await
        .map_err(read_err)?;

        rows.iter().map(map_progress_row).collect()
    }

    async fn upsert_progress(&self, row: &ProgressRow) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO user_progress (
                    user_id, module_id, sub_module_id, is_completed, completed_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(user_id, sub_module_id) DO UPDATE SET
                    module_id = excluded.module_id,
                    is_completed = excluded.is_completed,
                    completed_at = excluded.completed_at
            ",
        )
        .bind(user_id_to_string(row.user_id))
        .bind(row.module_id.value())
        .bind(row.sub_module_id.value())
        .bind(row.is_completed)
        .bind(row.completed_at)
        .execute(self.pool())
        .await
        .map_err(write_err)?;
        Ok(())
    }
}
