use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs a single, consolidated migration for the current schema.
///
/// Creates the full schema: curriculum tables (levels, modules,
/// sub-modules, micro-concepts), per-user state (progress, streaks,
/// profiles), the daily-quiz tables and the achievement tables, plus
/// indexes. The schema also encodes the invariants the hosted backend
/// left unenforced: one progress row per (user, sub-module), one streak
/// row per user with `highest >= current`, at most one active quiz per
/// date, and at most one attempt per user per calendar day.
#[allow(clippy::too_many_lines)]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: full schema.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS levels (
                    id INTEGER PRIMARY KEY,
                    level_number INTEGER NOT NULL CHECK (level_number >= 0),
                    title TEXT NOT NULL,
                    description TEXT NOT NULL,
                    is_active INTEGER NOT NULL DEFAULT 1
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS modules (
                    id INTEGER PRIMARY KEY,
                    level_id INTEGER NOT NULL,
                    module_number INTEGER NOT NULL CHECK (module_number >= 0),
                    title TEXT NOT NULL,
                    description TEXT NOT NULL,
                    is_active INTEGER NOT NULL DEFAULT 1,
                    FOREIGN KEY (level_id) REFERENCES levels(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS sub_modules (
                    id INTEGER PRIMARY KEY,
                    module_id INTEGER NOT NULL,
                    sub_module_number INTEGER NOT NULL CHECK (sub_module_number >= 0),
                    title TEXT NOT NULL,
                    description TEXT NOT NULL,
                    unlock_after_sub_module INTEGER,
                    FOREIGN KEY (module_id) REFERENCES modules(id) ON DELETE CASCADE,
                    FOREIGN KEY (unlock_after_sub_module) REFERENCES sub_modules(id)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS micro_concepts (
                    id INTEGER PRIMARY KEY,
                    sub_module_id INTEGER NOT NULL,
                    concept_number INTEGER NOT NULL CHECK (concept_number >= 0),
                    title TEXT NOT NULL,
                    definition_simple TEXT NOT NULL,
                    definition_formal TEXT NOT NULL,
                    why_exists TEXT NOT NULL,
                    cognitive_explanation TEXT NOT NULL,
                    examples TEXT NOT NULL,
                    FOREIGN KEY (sub_module_id) REFERENCES sub_modules(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS user_progress (
                    user_id TEXT NOT NULL,
                    module_id INTEGER NOT NULL,
                    sub_module_id INTEGER NOT NULL,
                    is_completed INTEGER NOT NULL,
                    completed_at TEXT,
                    PRIMARY KEY (user_id, sub_module_id),
                    FOREIGN KEY (module_id) REFERENCES modules(id) ON DELETE CASCADE,
                    FOREIGN KEY (sub_module_id) REFERENCES sub_modules(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS user_streaks (
                    user_id TEXT PRIMARY KEY,
                    current_streak INTEGER NOT NULL CHECK (current_streak >= 0),
                    highest_streak INTEGER NOT NULL
                        CHECK (highest_streak >= current_streak),
                    last_activity_date TEXT
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS daily_quizzes (
                    id INTEGER PRIMARY KEY,
                    quiz_date TEXT NOT NULL,
                    question_text TEXT NOT NULL,
                    options TEXT NOT NULL,
                    correct_answer TEXT NOT NULL,
                    explanation TEXT NOT NULL,
                    is_active INTEGER NOT NULL DEFAULT 1
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE UNIQUE INDEX IF NOT EXISTS idx_daily_quizzes_active_date
                    ON daily_quizzes (quiz_date) WHERE is_active = 1;
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS daily_quiz_attempts (
                    id INTEGER PRIMARY KEY,
                    user_id TEXT NOT NULL,
                    daily_quiz_id INTEGER NOT NULL,
                    user_answer TEXT NOT NULL,
                    is_correct INTEGER NOT NULL,
                    attempted_at TEXT NOT NULL,
                    attempted_on TEXT NOT NULL,
                    UNIQUE (user_id, attempted_on),
                    FOREIGN KEY (daily_quiz_id) REFERENCES daily_quizzes(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS user_profiles (
                    user_id TEXT PRIMARY KEY,
                    email TEXT NOT NULL,
                    first_name TEXT NOT NULL,
                    last_name TEXT NOT NULL,
                    roll_number TEXT,
                    mobile_number TEXT,
                    current_level INTEGER NOT NULL CHECK (current_level >= 0),
                    total_xp INTEGER NOT NULL CHECK (total_xp >= 0),
                    created_at TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS achievements (
                    id INTEGER PRIMARY KEY,
                    title TEXT NOT NULL,
                    description TEXT NOT NULL,
                    badge_icon TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS user_achievements (
                    user_id TEXT NOT NULL,
                    achievement_id INTEGER NOT NULL,
                    earned_at TEXT NOT NULL,
                    PRIMARY KEY (user_id, achievement_id),
                    FOREIGN KEY (achievement_id) REFERENCES achievements(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_sub_modules_module_number
                    ON sub_modules (module_id, sub_module_number);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_micro_concepts_sub_module
                    ON micro_concepts (sub_module_id, concept_number);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_user_progress_user_module
                    ON user_progress (user_id, module_id);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_attempts_user_attempted_at
                    ON daily_quiz_attempts (user_id, attempted_at);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!("sqlite schema migrated to version 1");
    }

    Ok(())
}
