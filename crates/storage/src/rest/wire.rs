//! Row shapes as the hosted store serves them.
//!
//! Column names follow the backend schema (`unlock_after_sub_module`,
//! `daily_quiz_id`, profile keyed by `id`), so conversion to the domain
//! types happens here and nowhere else.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hub_core::model::{
    Achievement, AchievementId, AttemptId, ConceptId, DailyQuiz, EarnedAchievement, Level, LevelId,
    MicroConcept, Module, ModuleId, ProgressRow, QuizAttempt, QuizId, Streak, SubModule,
    SubModuleId, UserId, UserProfile,
};

use crate::repository::{NewAttemptRecord, StorageError};

#[derive(Debug, Deserialize)]
pub(crate) struct LevelRow {
    pub id: i64,
    pub level_number: u32,
    pub title: String,
    pub description: String,
    pub is_active: bool,
}

impl From<LevelRow> for Level {
    fn from(row: LevelRow) -> Self {
        Level {
            id: LevelId::new(row.id),
            level_number: row.level_number,
            title: row.title,
            description: row.description,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ModuleRow {
    pub id: i64,
    pub level_id: i64,
    pub module_number: u32,
    pub title: String,
    pub description: String,
    pub is_active: bool,
}

impl From<ModuleRow> for Module {
    fn from(row: ModuleRow) -> Self {
        Module {
            id: ModuleId::new(row.id),
            level_id: LevelId::new(row.level_id),
            module_number: row.module_number,
            title: row.title,
            description: row.description,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubModuleRow {
    pub id: i64,
    pub module_id: i64,
    pub sub_module_number: u32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub unlock_after_sub_module: Option<i64>,
}

impl From<SubModuleRow> for SubModule {
    fn from(row: SubModuleRow) -> Self {
        SubModule {
            id: SubModuleId::new(row.id),
            module_id: ModuleId::new(row.module_id),
            sub_module_number: row.sub_module_number,
            title: row.title,
            description: row.description,
            unlock_after: row.unlock_after_sub_module.map(SubModuleId::new),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConceptRow {
    pub id: i64,
    pub sub_module_id: i64,
    pub concept_number: u32,
    pub title: String,
    pub definition_simple: String,
    pub definition_formal: String,
    pub why_exists: String,
    pub cognitive_explanation: String,
    #[serde(default)]
    pub examples: Vec<String>,
}

impl From<ConceptRow> for MicroConcept {
    fn from(row: ConceptRow) -> Self {
        MicroConcept {
            id: ConceptId::new(row.id),
            sub_module_id: SubModuleId::new(row.sub_module_id),
            concept_number: row.concept_number,
            title: row.title,
            definition_simple: row.definition_simple,
            definition_formal: row.definition_formal,
            why_exists: row.why_exists,
            cognitive_explanation: row.cognitive_explanation,
            examples: row.examples,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ProgressRowWire {
    pub user_id: Uuid,
    pub module_id: i64,
    pub sub_module_id: i64,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<ProgressRowWire> for ProgressRow {
    fn from(row: ProgressRowWire) -> Self {
        ProgressRow {
            user_id: UserId::new(row.user_id),
            module_id: ModuleId::new(row.module_id),
            sub_module_id: SubModuleId::new(row.sub_module_id),
            is_completed: row.is_completed,
            completed_at: row.completed_at,
        }
    }
}

impl From<&ProgressRow> for ProgressRowWire {
    fn from(row: &ProgressRow) -> Self {
        ProgressRowWire {
            user_id: row.user_id.value(),
            module_id: row.module_id.value(),
            sub_module_id: row.sub_module_id.value(),
            is_completed: row.is_completed,
            completed_at: row.completed_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct StreakRow {
    pub user_id: Uuid,
    pub current_streak: u32,
    pub highest_streak: u32,
    pub last_activity_date: Option<NaiveDate>,
}

impl StreakRow {
    pub(crate) fn into_streak(self) -> Result<Streak, StorageError> {
        Streak::from_persisted(self.current_streak, self.highest_streak, self.last_activity_date)
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }

    pub(crate) fn from_streak(user: UserId, streak: &Streak) -> Self {
        StreakRow {
            user_id: user.value(),
            current_streak: streak.current_streak(),
            highest_streak: streak.highest_streak(),
            last_activity_date: streak.last_activity_date(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuizRow {
    pub id: i64,
    pub quiz_date: NaiveDate,
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: String,
    pub is_active: bool,
}

impl From<QuizRow> for DailyQuiz {
    fn from(row: QuizRow) -> Self {
        DailyQuiz {
            id: QuizId::new(row.id),
            quiz_date: row.quiz_date,
            question_text: row.question_text,
            options: row.options,
            correct_answer: row.correct_answer,
            explanation: row.explanation,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizWire<'a> {
    pub id: i64,
    pub quiz_date: NaiveDate,
    pub question_text: &'a str,
    pub options: &'a [String],
    pub correct_answer: &'a str,
    pub explanation: &'a str,
    pub is_active: bool,
}

impl<'a> QuizWire<'a> {
    pub(crate) fn from_quiz(quiz: &'a DailyQuiz) -> Self {
        QuizWire {
            id: quiz.id.value(),
            quiz_date: quiz.quiz_date,
            question_text: &quiz.question_text,
            options: &quiz.options,
            correct_answer: &quiz.correct_answer,
            explanation: &quiz.explanation,
            is_active: quiz.is_active,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AttemptRow {
    pub id: i64,
    pub user_id: Uuid,
    pub daily_quiz_id: i64,
    pub user_answer: String,
    pub is_correct: bool,
    pub attempted_at: DateTime<Utc>,
}

impl From<AttemptRow> for QuizAttempt {
    fn from(row: AttemptRow) -> Self {
        QuizAttempt {
            id: AttemptId::new(row.id),
            user_id: UserId::new(row.user_id),
            quiz_id: QuizId::new(row.daily_quiz_id),
            user_answer: row.user_answer,
            is_correct: row.is_correct,
            attempted_at: row.attempted_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct NewAttemptWire<'a> {
    pub user_id: Uuid,
    pub daily_quiz_id: i64,
    pub user_answer: &'a str,
    pub is_correct: bool,
    pub attempted_at: DateTime<Utc>,
}

impl<'a> NewAttemptWire<'a> {
    pub(crate) fn from_record(record: &'a NewAttemptRecord) -> Self {
        NewAttemptWire {
            user_id: record.user_id.value(),
            daily_quiz_id: record.quiz_id.value(),
            user_answer: &record.user_answer,
            is_correct: record.is_correct,
            attempted_at: record.attempted_at,
        }
    }
}

/// Profiles are keyed by the auth-provider uuid in a column named `id`.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ProfileRow {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub roll_number: Option<String>,
    pub mobile_number: Option<String>,
    pub current_level: u32,
    pub total_xp: u32,
    pub created_at: DateTime<Utc>,
}

impl From<ProfileRow> for UserProfile {
    fn from(row: ProfileRow) -> Self {
        UserProfile {
            user_id: UserId::new(row.id),
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            roll_number: row.roll_number,
            mobile_number: row.mobile_number,
            current_level: row.current_level,
            total_xp: row.total_xp,
            created_at: row.created_at,
        }
    }
}

impl From<&UserProfile> for ProfileRow {
    fn from(profile: &UserProfile) -> Self {
        ProfileRow {
            id: profile.user_id.value(),
            email: profile.email.clone(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            roll_number: profile.roll_number.clone(),
            mobile_number: profile.mobile_number.clone(),
            current_level: profile.current_level,
            total_xp: profile.total_xp,
            created_at: profile.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct AchievementRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub badge_icon: String,
}

impl From<AchievementRow> for Achievement {
    fn from(row: AchievementRow) -> Self {
        Achievement {
            id: AchievementId::new(row.id),
            title: row.title,
            description: row.description,
            badge_icon: row.badge_icon,
        }
    }
}

/// Earned rows arrive with the catalog entry embedded, the way the
/// original queried `achievements(...)` through the join.
#[derive(Debug, Deserialize)]
pub(crate) struct EarnedRow {
    pub achievements: AchievementRow,
    pub earned_at: DateTime<Utc>,
}

impl From<EarnedRow> for EarnedAchievement {
    fn from(row: EarnedRow) -> Self {
        EarnedAchievement {
            achievement: row.achievements.into(),
            earned_at: row.earned_at,
        }
    }
}
