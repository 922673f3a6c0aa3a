//! Hosted-store backend speaking the PostgREST grammar over HTTP.
//!
//! Every read is a `GET` with `col=eq.value` filters, `order=` and
//! `limit=`; writes are `POST`/`PATCH` with `Prefer:` headers. The store
//! offers no client-side transactions, so the attempt-plus-streak write
//! is issued sequentially here; a crash between the two leaves the
//! attempt recorded and the streak stale, exactly as the hosted original
//! behaved.

use std::env;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use hub_core::model::{
    Achievement, AchievementId, AttemptId, DailyQuiz, EarnedAchievement, Level, MicroConcept,
    Module, ModuleId, ProfileUpdate, ProgressRow, QuizAttempt, Streak, SubModule, SubModuleId,
    UserId, UserProfile,
};

use crate::repository::{
    AchievementRepository, AttemptPersistence, CurriculumRepository, NewAttemptRecord,
    ProfileRepository, ProgressRepository, QuizRepository, Storage, StorageError, StreakRepository,
};

mod wire;

use wire::{
    AchievementRow, AttemptRow, ConceptRow, EarnedRow, LevelRow, ModuleRow, NewAttemptWire,
    ProfileRow, ProgressRowWire, QuizRow, StreakRow, SubModuleRow,
};

/// Connection settings for the hosted row store.
#[derive(Debug, Clone)]
pub struct RestConfig {
    pub base_url: String,
    pub api_key: String,
}

impl RestConfig {
    /// Reads `HUB_STORE_URL` and `HUB_STORE_KEY`; `None` when the store
    /// is not configured.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("HUB_STORE_URL").ok()?;
        let api_key = env::var("HUB_STORE_KEY").ok()?;
        if base_url.trim().is_empty() || api_key.trim().is_empty() {
            return None;
        }
        Some(Self { base_url, api_key })
    }
}

#[derive(Clone)]
pub struct RestRepository {
    client: Client,
    config: RestConfig,
}

fn http_err(e: reqwest::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn status_err(status: StatusCode) -> StorageError {
    if status == StatusCode::CONFLICT {
        StorageError::Conflict
    } else {
        StorageError::Connection(format!("store returned status {status}"))
    }
}

/// `[start, end)` timestamp filter values covering one UTC calendar day.
fn day_bounds(date: NaiveDate) -> (String, String) {
    let next = date.checked_add_days(Days::new(1)).unwrap_or(date);
    (format!("{date}T00:00:00Z"), format!("{next}T00:00:00Z"))
}

impl RestRepository {
    #[must_use]
    pub fn new(config: RestConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!(
            "{}/rest/v1/{table}",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
    }

    async fn fetch_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, StorageError> {
        let response = self
            .request(self.client.get(self.table_url(table)))
            .query(&[("select", "*")])
            .query(query)
            .send()
            .await
            .map_err(http_err)?;
        if !response.status().is_success() {
            return Err(status_err(response.status()));
        }
        response.json().await.map_err(http_err)
    }

    async fn fetch_one<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>, StorageError> {
        let mut query = query.to_vec();
        query.push(("limit", "1".to_owned()));
        let mut rows: Vec<T> = self.fetch_rows(table, &query).await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    /// `POST` with merge-duplicates semantics: insert or overwrite on the
    /// listed conflict columns.
    async fn upsert<B: Serialize>(
        &self,
        table: &str,
        on_conflict: &str,
        body: &B,
    ) -> Result<(), StorageError> {
        let response = self
            .request(self.client.post(self.table_url(table)))
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", "resolution=merge-duplicates")
            .json(body)
            .send()
            .await
            .map_err(http_err)?;
        if !response.status().is_success() {
            return Err(status_err(response.status()));
        }
        Ok(())
    }

    /// Plain insert returning the stored representation.
    async fn insert_returning<B: Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        body: &B,
    ) -> Result<T, StorageError> {
        let response = self
            .request(self.client.post(self.table_url(table)))
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await
            .map_err(http_err)?;
        if !response.status().is_success() {
            return Err(status_err(response.status()));
        }
        let mut rows: Vec<T> = response.json().await.map_err(http_err)?;
        if rows.is_empty() {
            return Err(StorageError::Serialization(
                "store returned no representation".into(),
            ));
        }
        Ok(rows.swap_remove(0))
    }
}

#[async_trait]
impl CurriculumRepository for RestRepository {
    async fn list_levels(&self, active_only: bool) -> Result<Vec<Level>, StorageError> {
        let mut query = vec![("order", "level_number.asc".to_owned())];
        if active_only {
            query.push(("is_active", "eq.true".to_owned()));
        }
        let rows: Vec<LevelRow> = self.fetch_rows("levels", &query).await?;
        Ok(rows.into_iter().map(Level::from).collect())
    }

    async fn list_modules(&self, active_only: bool) -> Result<Vec<Module>, StorageError> {
        let mut query = vec![("order", "module_number.asc".to_owned())];
        if active_only {
            query.push(("is_active", "eq.true".to_owned()));
        }
        let rows: Vec<ModuleRow> = self.fetch_rows("modules", &query).await?;
        Ok(rows.into_iter().map(Module::from).collect())
    }

    async fn module(&self, id: ModuleId) -> Result<Option<Module>, StorageError> {
        let row: Option<ModuleRow> = self
            .fetch_one("modules", &[("id", format!("eq.{id}"))])
            .await?;
        Ok(row.map(Module::from))
    }

    async fn list_sub_modules(
        &self,
        module: Option<ModuleId>,
    ) -> Result<Vec<SubModule>, StorageError> {
        let mut query = vec![("order", "sub_module_number.asc".to_owned())];
        if let Some(module) = module {
            query.push(("module_id", format!("eq.{module}")));
        }
        let rows: Vec<SubModuleRow> = self.fetch_rows("sub_modules", &query).await?;
        Ok(rows.into_iter().map(SubModule::from).collect())
    }

    async fn list_concepts(
        &self,
        sub_module: SubModuleId,
    ) -> Result<Vec<MicroConcept>, StorageError> {
        let rows: Vec<ConceptRow> = self
            .fetch_rows(
                "micro_concepts",
                &[
                    ("sub_module_id", format!("eq.{sub_module}")),
                    ("order", "concept_number.asc".to_owned()),
                ],
            )
            .await?;
        Ok(rows.into_iter().map(MicroConcept::from).collect())
    }

    async fn upsert_level(&self, level: &Level) -> Result<(), StorageError> {
        self.upsert(
            "levels",
            "id",
            &serde_json::json!({
                "id": level.id.value(),
                "level_number": level.level_number,
                "title": level.title,
                "description": level.description,
                "is_active": level.is_active,
            }),
        )
        .await
    }

    async fn upsert_module(&self, module: &Module) -> Result<(), StorageError> {
        self.upsert(
            "modules",
            "id",
            &serde_json::json!({
                "id": module.id.value(),
                "level_id": module.level_id.value(),
                "module_number": module.module_number,
                "title": module.title,
                "description": module.description,
                "is_active": module.is_active,
            }),
        )
        .await
    }

    async fn upsert_sub_module(&self, sub_module: &SubModule) -> Result<(), StorageError> {
        self.upsert(
            "sub_modules",
            "id",
            &serde_json::json!({
                "id": sub_module.id.value(),
                "module_id": sub_module.module_id.value(),
                "sub_module_number": sub_module.sub_module_number,
                "title": sub_module.title,
                "description": sub_module.description,
                "unlock_after_sub_module": sub_module.unlock_after.map(|s| s.value()),
            }),
        )
        .await
    }

    async fn upsert_concept(&self, concept: &MicroConcept) -> Result<(), StorageError> {
        self.upsert(
            "micro_concepts",
            "id",
            &serde_json::json!({
                "id": concept.id.value(),
                "sub_module_id": concept.sub_module_id.value(),
                "concept_number": concept.concept_number,
                "title": concept.title,
                "definition_simple": concept.definition_simple,
                "definition_formal": concept.definition_formal,
                "why_exists": concept.why_exists,
                "cognitive_explanation": concept.cognitive_explanation,
                "examples": concept.examples,
            }),
        )
        .await
    }
}

#[async_trait]
impl ProgressRepository for RestRepository {
    async fn list_progress(
        &self,
        user: UserId,
        module: Option<ModuleId>,
    ) -> Result<Vec<ProgressRow>, StorageError> {
        let mut query = vec![("user_id", format!("eq.{user}"))];
        if let Some(module) = module {
            query.push(("module_id", format!("eq.{module}")));
        }
        let rows: Vec<ProgressRowWire> = self.fetch_rows("user_progress", &query).await?;
        Ok(rows.into_iter().map(ProgressRow::from).collect())
    }

    async fn upsert_progress(&self, row: &ProgressRow) -> Result<(), StorageError> {
        self.upsert(
            "user_progress",
            "user_id,sub_module_id",
            &ProgressRowWire::from(row),
        )
        .await
    }
}

#[async_trait]
impl StreakRepository for RestRepository {
    async fn streak(&self, user: UserId) -> Result<Option<Streak>, StorageError> {
        let row: Option<StreakRow> = self
            .fetch_one("user_streaks", &[("user_id", format!("eq.{user}"))])
            .await?;
        row.map(StreakRow::into_streak).transpose()
    }

    async fn create_streak(&self, user: UserId) -> Result<Streak, StorageError> {
        let streak = Streak::new();
        let row: StreakRow = self
            .insert_returning("user_streaks", &StreakRow::from_streak(user, &streak))
            .await?;
        row.into_streak()
    }

    async fn update_streak(&self, user: UserId, streak: &Streak) -> Result<(), StorageError> {
        let response = self
            .request(self.client.patch(self.table_url("user_streaks")))
            .query(&[("user_id", format!("eq.{user}"))])
            .json(&StreakRow::from_streak(user, streak))
            .send()
            .await
            .map_err(http_err)?;
        if !response.status().is_success() {
            return Err(status_err(response.status()));
        }
        Ok(())
    }
}

#[async_trait]
impl QuizRepository for RestRepository {
    async fn active_quiz(&self, date: NaiveDate) -> Result<Option<DailyQuiz>, StorageError> {
        let row: Option<QuizRow> = self
            .fetch_one(
                "daily_quizzes",
                &[
                    ("quiz_date", format!("eq.{date}")),
                    ("is_active", "eq.true".to_owned()),
                ],
            )
            .await?;
        Ok(row.map(DailyQuiz::from))
    }

    async fn attempt_on(
        &self,
        user: UserId,
        date: NaiveDate,
    ) -> Result<Option<QuizAttempt>, StorageError> {
        let (start, end) = day_bounds(date);
        let row: Option<AttemptRow> = self
            .fetch_one(
                "daily_quiz_attempts",
                &[
                    ("user_id", format!("eq.{user}")),
                    ("attempted_at", format!("gte.{start}")),
                    ("attempted_at", format!("lt.{end}")),
                ],
            )
            .await?;
        Ok(row.map(QuizAttempt::from))
    }

    async fn recent_attempts(
        &self,
        user: UserId,
        limit: u32,
    ) -> Result<Vec<QuizAttempt>, StorageError> {
        let rows: Vec<AttemptRow> = self
            .fetch_rows(
                "daily_quiz_attempts",
                &[
                    ("user_id", format!("eq.{user}")),
                    ("order", "attempted_at.desc".to_owned()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().map(QuizAttempt::from).collect())
    }

    async fn insert_attempt(&self, record: &NewAttemptRecord) -> Result<AttemptId, StorageError> {
        // The hosted gate is race-prone: absence is checked by the caller
        // before this insert, so two rapid submissions can both land.
        let row: AttemptRow = self
            .insert_returning("daily_quiz_attempts", &NewAttemptWire::from_record(record))
            .await?;
        Ok(AttemptId::new(row.id))
    }

    async fn upsert_quiz(&self, quiz: &DailyQuiz) -> Result<(), StorageError> {
        self.upsert("daily_quizzes", "id", &wire::QuizWire::from_quiz(quiz))
            .await
    }
}

#[async_trait]
impl AttemptPersistence for RestRepository {
    async fn record_attempt(
        &self,
        record: &NewAttemptRecord,
        streak: &Streak,
    ) -> Result<AttemptId, StorageError> {
        // Two sequential requests; no transaction is available here.
        let id = self.insert_attempt(record).await?;
        self.update_streak(record.user_id, streak).await?;
        Ok(id)
    }
}

#[async_trait]
impl ProfileRepository for RestRepository {
    async fn profile(&self, user: UserId) -> Result<Option<UserProfile>, StorageError> {
        let row: Option<ProfileRow> = self
            .fetch_one("user_profiles", &[("id", format!("eq.{user}"))])
            .await?;
        Ok(row.map(UserProfile::from))
    }

    async fn update_profile(
        &self,
        user: UserId,
        update: &ProfileUpdate,
    ) -> Result<(), StorageError> {
        let response = self
            .request(self.client.patch(self.table_url("user_profiles")))
            .query(&[("id", format!("eq.{user}"))])
            .header("Prefer", "return=representation")
            .json(&serde_json::json!({
                "first_name": update.first_name(),
                "last_name": update.last_name(),
                "mobile_number": update.mobile_number(),
            }))
            .send()
            .await
            .map_err(http_err)?;
        if !response.status().is_success() {
            return Err(status_err(response.status()));
        }
        let rows: Vec<ProfileRow> = response.json().await.map_err(http_err)?;
        if rows.is_empty() {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn upsert_profile(&self, profile: &UserProfile) -> Result<(), StorageError> {
        self.upsert("user_profiles", "id", &ProfileRow::from(profile))
            .await
    }
}

#[async_trait]
impl AchievementRepository for RestRepository {
    async fn earned(&self, user: UserId) -> Result<Vec<EarnedAchievement>, StorageError> {
        let response = self
            .request(self.client.get(self.table_url("user_achievements")))
            .query(&[
                (
                    "select",
                    "achievements(id,title,description,badge_icon),earned_at".to_owned(),
                ),
                ("user_id", format!("eq.{user}")),
                ("order", "earned_at.desc".to_owned()),
            ])
            .send()
            .await
            .map_err(http_err)?;
        if !response.status().is_success() {
            return Err(status_err(response.status()));
        }
        let rows: Vec<EarnedRow> = response.json().await.map_err(http_err)?;
        Ok(rows.into_iter().map(EarnedAchievement::from).collect())
    }

    async fn upsert_achievement(&self, achievement: &Achievement) -> Result<(), StorageError> {
        self.upsert(
            "achievements",
            "id",
            &AchievementRow {
                id: achievement.id.value(),
                title: achievement.title.clone(),
                description: achievement.description.clone(),
                badge_icon: achievement.badge_icon.clone(),
            },
        )
        .await
    }

    async fn record_earned(
        &self,
        user: UserId,
        achievement: AchievementId,
        earned_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        self.upsert(
            "user_achievements",
            "user_id,achievement_id",
            &serde_json::json!({
                "user_id": user.value(),
                "achievement_id": achievement.value(),
                "earned_at": earned_at,
            }),
        )
        .await
    }
}

impl Storage {
    /// Build a `Storage` backed by the hosted REST store.
    #[must_use]
    pub fn rest(config: RestConfig) -> Self {
        let repo = Arc::new(RestRepository::new(config));
        Self {
            curriculum: repo.clone(),
            progress: repo.clone(),
            streaks: repo.clone(),
            quizzes: repo.clone(),
            attempts: repo.clone(),
            profiles: repo.clone(),
            achievements: repo,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_url_trims_trailing_slash() {
        let repo = RestRepository::new(RestConfig {
            base_url: "https://store.example.com/".into(),
            api_key: "key".into(),
        });
        assert_eq!(
            repo.table_url("daily_quizzes"),
            "https://store.example.com/rest/v1/daily_quizzes"
        );
    }

    #[test]
    fn day_bounds_cover_one_utc_day() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let (start, end) = day_bounds(date);
        assert_eq!(start, "2024-03-05T00:00:00Z");
        assert_eq!(end, "2024-03-06T00:00:00Z");
    }
}
