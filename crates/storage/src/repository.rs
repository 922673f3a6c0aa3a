use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use thiserror::Error;

use hub_core::model::{
    Achievement, AchievementId, AttemptId, DailyQuiz, EarnedAchievement, Level, MicroConcept,
    Module, ModuleId, ProfileUpdate, ProgressRow, QuizAttempt, Streak, SubModule, SubModuleId,
    UserId, UserProfile,
};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A quiz submission headed for the append-only attempt log.
///
/// `attempted_at` is set by the caller (from its `Clock`) so that the
/// attempt timestamp, its calendar-day gate and the streak's activity
/// date all agree.
#[derive(Debug, Clone)]
pub struct NewAttemptRecord {
    pub user_id: UserId,
    pub quiz_id: hub_core::model::QuizId,
    pub user_answer: String,
    pub is_correct: bool,
    pub attempted_at: DateTime<Utc>,
}

impl NewAttemptRecord {
    /// UTC calendar date the once-per-day uniqueness gate keys on.
    #[must_use]
    pub fn attempted_on(&self) -> NaiveDate {
        self.attempted_at.date_naive()
    }

    /// The persisted attempt this record becomes once an id is assigned.
    #[must_use]
    pub fn into_attempt(self, id: AttemptId) -> QuizAttempt {
        QuizAttempt {
            id,
            user_id: self.user_id,
            quiz_id: self.quiz_id,
            user_answer: self.user_answer,
            is_correct: self.is_correct,
            attempted_at: self.attempted_at,
        }
    }
}

/// Repository contract for curriculum structure (levels, modules,
/// sub-modules, micro-concepts). Reads serve the views; upserts exist for
/// seeding and tests.
#[async_trait]
pub trait CurriculumRepository: Send + Sync {
    /// List levels ordered by `level_number`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on store failure.
    async fn list_levels(&self, active_only: bool) -> Result<Vec<Level>, StorageError>;

    /// List modules ordered by `module_number`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on store failure.
    async fn list_modules(&self, active_only: bool) -> Result<Vec<Module>, StorageError>;

    /// Fetch one module by id; `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on store failure.
    async fn module(&self, id: ModuleId) -> Result<Option<Module>, StorageError>;

    /// List sub-modules ordered by `sub_module_number`, optionally scoped
    /// to one module.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on store failure.
    async fn list_sub_modules(
        &self,
        module: Option<ModuleId>,
    ) -> Result<Vec<SubModule>, StorageError>;

    /// List micro-concepts for a sub-module ordered by `concept_number`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on store failure.
    async fn list_concepts(
        &self,
        sub_module: SubModuleId,
    ) -> Result<Vec<MicroConcept>, StorageError>;

    /// Persist or update a level.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the level cannot be stored.
    async fn upsert_level(&self, level: &Level) -> Result<(), StorageError>;

    /// Persist or update a module.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the module cannot be stored.
    async fn upsert_module(&self, module: &Module) -> Result<(), StorageError>;

    /// Persist or update a sub-module.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the sub-module cannot be stored.
    async fn upsert_sub_module(&self, sub_module: &SubModule) -> Result<(), StorageError>;

    /// Persist or update a micro-concept.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the concept cannot be stored.
    async fn upsert_concept(&self, concept: &MicroConcept) -> Result<(), StorageError>;
}

/// Repository contract for per-user sub-module completion rows.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// List the user's progress rows, optionally scoped to one module.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on store failure.
    async fn list_progress(
        &self,
        user: UserId,
        module: Option<ModuleId>,
    ) -> Result<Vec<ProgressRow>, StorageError>;

    /// Insert or replace the row for `(row.user_id, row.sub_module_id)`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be stored.
    async fn upsert_progress(&self, row: &ProgressRow) -> Result<(), StorageError>;
}

/// Repository contract for the one-row-per-user streak counters.
#[async_trait]
pub trait StreakRepository: Send + Sync {
    /// Fetch the user's streak row; `None` before first use.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on store failure.
    async fn streak(&self, user: UserId) -> Result<Option<Streak>, StorageError>;

    /// Create the zero-initialized streak row for a user seen for the
    /// first time.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if a row already exists.
    async fn create_streak(&self, user: UserId) -> Result<Streak, StorageError>;

    /// Overwrite the user's streak counters.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be stored.
    async fn update_streak(&self, user: UserId, streak: &Streak) -> Result<(), StorageError>;
}

/// Repository contract for daily quizzes and the attempt log.
#[async_trait]
pub trait QuizRepository: Send + Sync {
    /// The active quiz for a calendar date, if one is scheduled. The store
    /// guarantees at most one active quiz per date.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on store failure.
    async fn active_quiz(&self, date: NaiveDate) -> Result<Option<DailyQuiz>, StorageError>;

    /// The user's attempt on the given calendar date, if any. This is the
    /// once-per-day gate: it is scoped by date, not "latest overall".
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on store failure.
    async fn attempt_on(
        &self,
        user: UserId,
        date: NaiveDate,
    ) -> Result<Option<QuizAttempt>, StorageError>;

    /// The user's most recent attempts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on store failure.
    async fn recent_attempts(
        &self,
        user: UserId,
        limit: u32,
    ) -> Result<Vec<QuizAttempt>, StorageError>;

    /// Append one attempt to the log.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` when the user already has an
    /// attempt on that calendar date.
    async fn insert_attempt(&self, record: &NewAttemptRecord) -> Result<AttemptId, StorageError>;

    /// Persist or update a quiz (seeding and tests).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the quiz cannot be stored.
    async fn upsert_quiz(&self, quiz: &DailyQuiz) -> Result<(), StorageError>;
}

/// One logical write for "record the attempt and the streak it produced".
///
/// Backends that support transactions apply both atomically; the hosted
/// REST backend issues them sequentially and documents the resulting
/// crash window (attempt recorded, streak stale).
#[async_trait]
pub trait AttemptPersistence: Send + Sync {
    /// Persist the attempt and the updated streak together.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` when the user already has an
    /// attempt on that calendar date.
    async fn record_attempt(
        &self,
        record: &NewAttemptRecord,
        streak: &Streak,
    ) -> Result<AttemptId, StorageError>;
}

/// Repository contract for user profiles.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Fetch the user's profile; `None` when the row does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on store failure.
    async fn profile(&self, user: UserId) -> Result<Option<UserProfile>, StorageError>;

    /// Write the editable fields; immutable columns are untouched.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the profile row is missing.
    async fn update_profile(
        &self,
        user: UserId,
        update: &ProfileUpdate,
    ) -> Result<(), StorageError>;

    /// Persist or update a whole profile row (seeding and tests).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the profile cannot be stored.
    async fn upsert_profile(&self, profile: &UserProfile) -> Result<(), StorageError>;
}

/// Repository contract for the achievement catalog and earn events.
#[async_trait]
pub trait AchievementRepository: Send + Sync {
    /// Achievements the user has earned, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on store failure.
    async fn earned(&self, user: UserId) -> Result<Vec<EarnedAchievement>, StorageError>;

    /// Persist or update a catalog entry (seeding and tests).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the achievement cannot be stored.
    async fn upsert_achievement(&self, achievement: &Achievement) -> Result<(), StorageError>;

    /// Record that a user earned an achievement at a given moment.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the catalog entry is missing.
    async fn record_earned(
        &self,
        user: UserId,
        achievement: AchievementId,
        earned_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;
}

/// Aggregates the repositories behind trait objects for easy backend
/// swapping.
#[derive(Clone)]
pub struct Storage {
    pub curriculum: Arc<dyn CurriculumRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub streaks: Arc<dyn StreakRepository>,
    pub quizzes: Arc<dyn QuizRepository>,
    pub attempts: Arc<dyn AttemptPersistence>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub achievements: Arc<dyn AchievementRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = crate::memory::InMemoryRepository::new();
        Self {
            curriculum: Arc::new(repo.clone()),
            progress: Arc::new(repo.clone()),
            streaks: Arc::new(repo.clone()),
            quizzes: Arc::new(repo.clone()),
            attempts: Arc::new(repo.clone()),
            profiles: Arc::new(repo.clone()),
            achievements: Arc::new(repo),
        }
    }
}
