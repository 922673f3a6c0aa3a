use hub_core::model::{Streak, UserId};

use super::{
    SqliteRepository,
    mapping::{map_streak_row, read_err, user_id_to_string, write_err},
};
use crate::repository::{StorageError, StreakRepository};

#[async_trait::async_trait]
impl StreakRepository for SqliteRepository {
    async fn streak(&self, user: UserId) -> Result<Option<Streak>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT current_streak, highest_streak, last_activity_date
                FROM user_streaks
                WHERE user_id = ?1
            ",
        )
        .bind(user_id_to_string(user))
        .fetch_optional(self.pool())
        .await
        .map_err(read_err)?;

        row.as_ref().map(map_streak_row).transpose()
    }

    async fn create_streak(&self, user: UserId) -> Result<Streak, StorageError> {
        let streak = Streak::new();
        sqlx::query(
            r"
                INSERT INTO user_streaks (
                    user_id, current_streak, highest_streak, last_activity_date
                )
                VALUES (?1, 0, 0, NULL)
            ",
        )
        .bind(user_id_to_string(user))
        .execute(self.pool())
        .await
        .map_err(write_err)?;
        Ok(streak)
    }

    async fn update_streak(&self, user: UserId, streak: &Streak) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO user_streaks (
                    user_id, current_streak, highest_streak, last_activity_date
                )
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(user_id) DO UPDATE SET
                    current_streak = excluded.current_streak,
                    highest_streak = excluded.highest_streak,
                    last_activity_date = excluded.last_activity_date
            ",
        )
        .bind(user_id_to_string(user))
        .bind(i64::from(streak.current_streak()))
        .bind(i64::from(streak.highest_streak()))
        .bind(streak.last_activity_date())
        .execute(self.pool())
        .await
        .map_err(write_err)?;
        Ok(())
    }
}
