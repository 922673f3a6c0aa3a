use hub_core::model::{ProfileUpdate, UserId, UserProfile};

use super::{
    SqliteRepository,
    mapping::{map_profile_row, read_err, user_id_to_string, write_err},
};
use crate::repository::{ProfileRepository, StorageError};

#[async_trait::async_trait]
impl ProfileRepository for SqliteRepository {
    async fn profile(&self, user: UserId) -> Result<Option<UserProfile>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT user_id, email, first_name, last_name, roll_number,
                       mobile_number, current_level, total_xp, created_at
                FROM user_profiles
                WHERE user_id = ?1
            ",
        )
        .bind(user_id_to_string(user))
        .fetch_optional(self.pool())
        .await
        .map_err(read_err)?;

        row.as_ref().map(map_profile_row).transpose()
    }

    async fn update_profile(
        &self,
        user: UserId,
        update: &ProfileUpdate,
    ) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
                UPDATE user_profiles
                SET first_name = ?2, last_name = ?3, mobile_number = ?4
                WHERE user_id = ?1
            ",
        )
        .bind(user_id_to_string(user))
        .bind(update.first_name())
        .bind(update.last_name())
        .bind(update.mobile_number())
        .execute(self.pool())
        .await
        .map_err(write_err)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn upsert_profile(&self, profile: &UserProfile) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO user_profiles (
                    user_id, email, first_name, last_name, roll_number,
                    mobile_number, current_level, total_xp, created_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                ON CONFLICT(user_id) DO UPDATE SET
                    email = excluded.email,
                    first_name = excluded.first_name,
                    last_name = excluded.last_name,
                    roll_number = excluded.roll_number,
                    mobile_number = excluded.mobile_number,
                    current_level = excluded.current_level,
                    total_xp = excluded.total_xp
            ",
        )
        .bind(user_id_to_string(profile.user_id))
        .bind(&profile.email)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.roll_number)
        .bind(&profile.mobile_number)
        .bind(i64::from(profile.current_level))
        .bind(i64::from(profile.total_xp))
        .bind(profile.created_at)
        .execute(self.pool())
        .await
        .map_err(write_err)?;
        Ok(())
    }
}
