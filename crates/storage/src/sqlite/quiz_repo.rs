use chrono::NaiveDate;
use hub_core::model::{AttemptId, DailyQuiz, QuizAttempt, Streak, UserId};

use super::{
    SqliteRepository,
    mapping::{map_attempt_row, map_quiz_row, read_err, strings_to_json, user_id_to_string, write_err},
};
use crate::repository::{AttemptPersistence, NewAttemptRecord, QuizRepository, StorageError};

#[async_trait::async_trait]
impl QuizRepository for SqliteRepository {
    async fn active_quiz(&self, date: NaiveDate) -> Result<Option<DailyQuiz>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT id, quiz_date, question_text, options, correct_answer,
                       explanation, is_active
                FROM daily_quizzes
                WHERE quiz_date = ?1 AND is_active = 1
            ",
        )
        .bind(date)
        .fetch_optional(self.pool())
        .await
        .map_err(read_err)?;

        row.as_ref().map(map_quiz_row).transpose()
    }

    async fn attempt_on(
        &self,
        user: UserId,
        date: NaiveDate,
    ) -> Result<Option<QuizAttempt>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT id, user_id, daily_quiz_id, user_answer, is_correct, attempted_at
                FROM daily_quiz_attempts
                WHERE user_id = ?1 AND attempted_on = ?2
            ",
        )
        .bind(user_id_to_string(user))
        .bind(date)
        .fetch_optional(self.pool())
        .await
        .map_err(read_err)?;

        row.as_ref().map(map_attempt_row).transpose()
    }

    async fn recent_attempts(
        &self,
        user: UserId,
        limit: u32,
    ) -> Result<Vec<QuizAttempt>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, user_id, daily_quiz_id, user_answer, is_correct, attempted_at
                FROM daily_quiz_attempts
                WHERE user_id = ?1
                ORDER BY attempted_at DESC
                LIMIT ?2
            ",
        )
        .bind(user_id_to_string(user))
        .bind(i64::from(limit))
        .fetch_all(self.pool())
        .await
        .map_err(read_err)?;

        rows.iter().map(map_attempt_row).collect()
    }

    async fn insert_attempt(&self, record: &NewAttemptRecord) -> Result<AttemptId, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO daily_quiz_attempts (
                    user_id, daily_quiz_id, user_answer, is_correct,
                    attempted_at, attempted_on
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(user_id_to_string(record.user_id))
        .bind(record.quiz_id.value())
        .bind(&record.user_answer)
        .bind(record.is_correct)
        .bind(record.attempted_at)
        .bind(record.attempted_on())
        .execute(self.pool())
        .await
        .map_err(write_err)?;

        Ok(AttemptId::new(res.last_insert_rowid()))
    }

    async fn upsert_quiz(&self, quiz: &DailyQuiz) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO daily_quizzes (
                    id, quiz_date, question_text, options, correct_answer,
                    explanation, is_active
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT(id) DO UPDATE SET
                    quiz_date = excluded.quiz_date,
                    question_text = excluded.question_text,
                    options = excluded.options,
                    correct_answer = excluded.correct_answer,
                    explanation = excluded.explanation,
                    is_active = excluded.is_active
            ",
        )
        .bind(quiz.id.value())
        .bind(quiz.quiz_date)
        .bind(&quiz.question_text)
        .bind(strings_to_json(&quiz.options)?)
        .bind(&quiz.correct_answer)
        .bind(&quiz.explanation)
        .bind(quiz.is_active)
        .execute(self.pool())
        .await
        .map_err(write_err)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl AttemptPersistence for SqliteRepository {
    async fn record_attempt(
        &self,
        record: &NewAttemptRecord,
        streak: &Streak,
    ) -> Result<AttemptId, StorageError> {
        let mut tx = self.pool().begin().await.map_err(read_err)?;

        let res = sqlx::query(
            r"
                INSERT INTO daily_quiz_attempts (
                    user_id, daily_quiz_id, user_answer, is_correct,
                    attempted_at, attempted_on
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(user_id_to_string(record.user_id))
        .bind(record.quiz_id.value())
        .bind(&record.user_answer)
        .bind(record.is_correct)
        .bind(record.attempted_at)
        .bind(record.attempted_on())
        .execute(&mut *tx)
        .await
        .map_err(write_err)?;

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
        .bind(user_id_to_string(record.user_id))
        .bind(i64::from(streak.current_streak()))
        .bind(i64::from(streak.highest_streak()))
        .bind(streak.last_activity_date())
        .execute(&mut *tx)
        .await
        .map_err(write_err)?;

        tx.commit().await.map_err(read_err)?;

        Ok(AttemptId::new(res.last_insert_rowid()))
    }
}
