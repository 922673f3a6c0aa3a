use chrono::{DateTime, Utc};
use hub_core::model::{Achievement, AchievementId, EarnedAchievement, UserId};
use sqlx::Row;

use super::{
    SqliteRepository,
    mapping::{map_achievement_row, read_err, ser, user_id_to_string, write_err},
};
use crate::repository::{AchievementRepository, StorageError};

#[async_trait::async_trait]
impl AchievementRepository for SqliteRepository {
    async fn earned(&self, user: UserId) -> Result<Vec<EarnedAchievement>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT a.id, a.title, a.description, a.badge_icon, ua.earned_at
                FROM user_achievements ua
                JOIN achievements a ON a.id = ua.achievement_id
                WHERE ua.user_id = ?1
                ORDER BY ua.earned_at DESC
            ",
        )
        .bind(user_id_to_string(user))
        .fetch_all(self.pool())
        .await
        .map_err(read_err)?;

        let mut earned = Vec::with_capacity(rows.len());
        for row in &rows {
            earned.push(EarnedAchievement {
                achievement: map_achievement_row(row)?,
                earned_at: row.try_get("earned_at").map_err(ser)?,
            });
        }
        Ok(earned)
    }

    async fn upsert_achievement(&self, achievement: &Achievement) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO achievements (id, title, description, badge_icon)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    description = excluded.description,
                    badge_icon = excluded.badge_icon
            ",
        )
        .bind(achievement.id.value())
        .bind(&achievement.title)
        .bind(&achievement.description)
        .bind(&achievement.badge_icon)
        .execute(self.pool())
        .await
        .map_err(write_err)?;
        Ok(())
    }

    async fn record_earned(
        &self,
        user: UserId,
        achievement: AchievementId,
        earned_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO user_achievements (user_id, achievement_id, earned_at)
                SELECT ?1, id, ?3 FROM achievements WHERE id = ?2
                ON CONFLICT(user_id, achievement_id) DO UPDATE SET
                    earned_at = excluded.earned_at
            ",
        )
        .bind(user_id_to_string(user))
        .bind(achievement.value())
        .bind(earned_at)
        .execute(self.pool())
        .await
        .map_err(write_err)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
