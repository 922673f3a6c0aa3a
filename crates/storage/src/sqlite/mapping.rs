use hub_core::model::{
    Achievement, AchievementId, AttemptId, ConceptId, DailyQuiz, Level, LevelId, MicroConcept,
    Module, ModuleId, ProgressRow, QuizAttempt, QuizId, Streak, SubModule, SubModuleId, UserId,
    UserProfile,
};
use sqlx::Row;
use uuid::Uuid;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Maps read-side sqlx failures onto the storage taxonomy.
pub(crate) fn read_err(e: sqlx::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

/// Maps write-side sqlx failures; unique-constraint violations surface as
/// `Conflict` (the once-per-day attempt gate relies on this).
pub(crate) fn write_err(e: sqlx::Error) -> StorageError {
    if e.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
    {
        StorageError::Conflict
    } else {
        StorageError::Connection(e.to_string())
    }
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn user_id_to_string(user: UserId) -> String {
    user.value().to_string()
}

pub(crate) fn user_id_from_str(s: &str) -> Result<UserId, StorageError> {
    Uuid::parse_str(s)
        .map(UserId::new)
        .map_err(|_| StorageError::Serialization(format!("invalid user_id: {s}")))
}

/// Option lists and concept examples are stored as JSON arrays of strings.
pub(crate) fn strings_to_json(items: &[String]) -> Result<String, StorageError> {
    serde_json::to_string(items).map_err(ser)
}

pub(crate) fn strings_from_json(field: &'static str, raw: &str) -> Result<Vec<String>, StorageError> {
    serde_json::from_str(raw)
        .map_err(|_| StorageError::Serialization(format!("invalid {field} json")))
}

pub(crate) fn map_level_row(row: &sqlx::sqlite::SqliteRow) -> Result<Level, StorageError> {
    Ok(Level {
        id: LevelId::new(row.try_get("id").map_err(ser)?),
        level_number: u32_from_i64("level_number", row.try_get("level_number").map_err(ser)?)?,
        title: row.try_get("title").map_err(ser)?,
        description: row.try_get("description").map_err(ser)?,
        is_active: row.try_get("is_active").map_err(ser)?,
    })
}

pub(crate) fn map_module_row(row: &sqlx::sqlite::SqliteRow) -> Result<Module, StorageError> {
    Ok(Module {
        id: ModuleId::new(row.try_get("id").map_err(ser)?),
        level_id: LevelId::new(row.try_get("level_id").map_err(ser)?),
        module_number: u32_from_i64("module_number", row.try_get("module_number").map_err(ser)?)?,
        title: row.try_get("title").map_err(ser)?,
        description: row.try_get("description").map_err(ser)?,
        is_active: row.try_get("is_active").map_err(ser)?,
    })
}

pub(crate) fn map_sub_module_row(row: &sqlx::sqlite::SqliteRow) -> Result<SubModule, StorageError> {
    Ok(SubModule {
        id: SubModuleId::new(row.try_get("id").map_err(ser)?),
        module_id: ModuleId::new(row.try_get("module_id").map_err(ser)?),
        sub_module_number: u32_from_i64(
            "sub_module_number",
            row.try_get("sub_module_number").map_err(ser)?,
        )?,
        title: row.try_get("title").map_err(ser)?,
        description: row.try_get("description").map_err(ser)?,
        unlock_after: row
            .try_get::<Option<i64>, _>("unlock_after_sub_module")
            .map_err(ser)?
            .map(SubModuleId::new),
    })
}

pub(crate) fn map_concept_row(row: &sqlx::sqlite::SqliteRow) -> Result<MicroConcept, StorageError> {
    let examples_raw: String = row.try_get("examples").map_err(ser)?;
    Ok(MicroConcept {
        id: ConceptId::new(row.try_get("id").map_err(ser)?),
        sub_module_id: SubModuleId::new(row.try_get("sub_module_id").map_err(ser)?),
        concept_number: u32_from_i64(
            "concept_number",
            row.try_get("concept_number").map_err(ser)?,
        )?,
        title: row.try_get("title").map_err(ser)?,
        definition_simple: row.try_get("definition_simple").map_err(ser)?,
        definition_formal: row.try_get("definition_formal").map_err(ser)?,
        why_exists: row.try_get("why_exists").map_err(ser)?,
        cognitive_explanation: row.try_get("cognitive_explanation").map_err(ser)?,
        examples: strings_from_json("examples", &examples_raw)?,
    })
}

pub(crate) fn map_progress_row(row: &sqlx::sqlite::SqliteRow) -> Result<ProgressRow, StorageError> {
    let user_raw: String = row.try_get("user_id").map_err(ser)?;
    Ok(ProgressRow {
        user_id: user_id_from_str(&user_raw)?,
        module_id: ModuleId::new(row.try_get("module_id").map_err(ser)?),
        sub_module_id: SubModuleId::new(row.try_get("sub_module_id").map_err(ser)?),
        is_completed: row.try_get("is_completed").map_err(ser)?,
        completed_at: row.try_get("completed_at").map_err(ser)?,
    })
}

pub(crate) fn map_streak_row(row: &sqlx::sqlite::SqliteRow) -> Result<Streak, StorageError> {
    let current = u32_from_i64("current_streak", row.try_get("current_streak").map_err(ser)?)?;
    let highest = u32_from_i64("highest_streak", row.try_get("highest_streak").map_err(ser)?)?;
    Streak::from_persisted(current, highest, row.try_get("last_activity_date").map_err(ser)?)
        .map_err(ser)
}

pub(crate) fn map_quiz_row(row: &sqlx::sqlite::SqliteRow) -> Result<DailyQuiz, StorageError> {
    let options_raw: String = row.try_get("options").map_err(ser)?;
    Ok(DailyQuiz {
        id: QuizId::new(row.try_get("id").map_err(ser)?),
        quiz_date: row.try_get("quiz_date").map_err(ser)?,
        question_text: row.try_get("question_text").map_err(ser)?,
        options: strings_from_json("options", &options_raw)?,
        correct_answer: row.try_get("correct_answer").map_err(ser)?,
        explanation: row.try_get("explanation").map_err(ser)?,
        is_active: row.try_get("is_active").map_err(ser)?,
    })
}

pub(crate) fn map_attempt_row(row: &sqlx::sqlite::SqliteRow) -> Result<QuizAttempt, StorageError> {
    let user_raw: String = row.try_get("user_id").map_err(ser)?;
    Ok(QuizAttempt {
        id: AttemptId::new(row.try_get("id").map_err(ser)?),
        user_id: user_id_from_str(&user_raw)?,
        quiz_id: QuizId::new(row.try_get("daily_quiz_id").map_err(ser)?),
        user_answer: row.try_get("user_answer").map_err(ser)?,
        is_correct: row.try_get("is_correct").map_err(ser)?,
        attempted_at: row.try_get("attempted_at").map_err(ser)?,
    })
}

pub(crate) fn map_profile_row(row: &sqlx::sqlite::SqliteRow) -> Result<UserProfile, StorageError> {
    let user_raw: String = row.try_get("user_id").map_err(ser)?;
    Ok(UserProfile {
        user_id: user_id_from_str(&user_raw)?,
        email: row.try_get("email").map_err(ser)?,
        first_name: row.try_get("first_name").map_err(ser)?,
        last_name: row.try_get("last_name").map_err(ser)?,
        roll_number: row.try_get("roll_number").map_err(ser)?,
        mobile_number: row.try_get("mobile_number").map_err(ser)?,
        current_level: u32_from_i64("current_level", row.try_get("current_level").map_err(ser)?)?,
        total_xp: u32_from_i64("total_xp", row.try_get("total_xp").map_err(ser)?)?,
        created_at: row.try_get("created_at").map_err(ser)?,
    })
}

pub(crate) fn map_achievement_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<Achievement, StorageError> {
    Ok(Achievement {
        id: AchievementId::new(row.try_get("id").map_err(ser)?),
        title: row.try_get("title").map_err(ser)?,
        description: row.try_get("description").map_err(ser)?,
        badge_icon: row.try_get("badge_icon").map_err(ser)?,
    })
}
