//! In-memory repository implementation for testing and prototyping.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use hub_core::model::{
    Achievement, AchievementId, AttemptId, ConceptId, DailyQuiz, EarnedAchievement, Level, LevelId,
    MicroConcept, Module, ModuleId, ProfileUpdate, ProgressRow, QuizAttempt, QuizId, Streak,
    SubModule, SubModuleId, UserId, UserProfile,
};

use crate::repository::{
    AchievementRepository, AttemptPersistence, CurriculumRepository, NewAttemptRecord,
    ProfileRepository, ProgressRepository, QuizRepository, StorageError, StreakRepository,
};

#[derive(Default)]
struct AttemptLog {
    next_id: i64,
    attempts: Vec<QuizAttempt>,
}

/// Simple in-memory repository implementation backed by mutex-guarded
/// maps. Implements every repository contract on one shared value.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    levels: Arc<Mutex<HashMap<LevelId, Level>>>,
    modules: Arc<Mutex<HashMap<ModuleId, Module>>>,
    sub_modules: Arc<Mutex<HashMap<SubModuleId, SubModule>>>,
    concepts: Arc<Mutex<HashMap<ConceptId, MicroConcept>>>,
    progress: Arc<Mutex<HashMap<(UserId, SubModuleId), ProgressRow>>>,
    streaks: Arc<Mutex<HashMap<UserId, Streak>>>,
    quizzes: Arc<Mutex<HashMap<QuizId, DailyQuiz>>>,
    attempts: Arc<Mutex<AttemptLog>>,
    profiles: Arc<Mutex<HashMap<UserId, UserProfile>>>,
    achievements: Arc<Mutex<HashMap<AchievementId, Achievement>>>,
    earned: Arc<Mutex<Vec<(UserId, AchievementId, DateTime<Utc>)>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<'a, T>(mutex: &'a Mutex<T>) -> Result<std::sync::MutexGuard<'a, T>, StorageError> {
    mutex
        .lock()
        .map_err(|e| StorageError::Connection(e.to_string()))
}

#[async_trait]
impl CurriculumRepository for InMemoryRepository {
    async fn list_levels(&self, active_only: bool) -> Result<Vec<Level>, StorageError> {
        let guard = lock(&self.levels)?;
        let mut levels: Vec<Level> = guard
            .values()
            .filter(|l| !active_only || l.is_active)
            .cloned()
            .collect();
        levels.sort_by_key(|l| l.level_number);
        Ok(levels)
    }

    async fn list_modules(&self, active_only: bool) -> Result<Vec<Module>, StorageError> {
        let guard = lock(&self.modules)?;
        let mut modules: Vec<Module> = guard
            .values()
            .filter(|m| !active_only || m.is_active)
            .cloned()
            .collect();
        modules.sort_by_key(|m| m.module_number);
        Ok(modules)
    }

    async fn module(&self, id: ModuleId) -> Result<Option<Module>, StorageError> {
        let guard = lock(&self.modules)?;
        Ok(guard.get(&id).cloned())
    }

    async fn list_sub_modules(
        &self,
        module: Option<ModuleId>,
    ) -> Result<Vec<SubModule>, StorageError> {
        let guard = lock(&self.sub_modules)?;
        let mut sub_modules: Vec<SubModule> = guard
            .values()
            .filter(|sm| module.is_none_or(|m| sm.module_id == m))
            .cloned()
            .collect();
        sub_modules.sort_by_key(|sm| sm.sub_module_number);
        Ok(sub_modules)
    }

    async fn list_concepts(
        &self,
        sub_module: SubModuleId,
    ) -> Result<Vec<MicroConcept>, StorageError> {
        let guard = lock(&self.concepts)?;
        let mut concepts: Vec<MicroConcept> = guard
            .values()
            .filter(|c| c.sub_module_id == sub_module)
            .cloned()
            .collect();
        concepts.sort_by_key(|c| c.concept_number);
        Ok(concepts)
    }

    async fn upsert_level(&self, level: &Level) -> Result<(), StorageError> {
        lock(&self.levels)?.insert(level.id, level.clone());
        Ok(())
    }

    async fn upsert_module(&self, module: &Module) -> Result<(), StorageError> {
        lock(&self.modules)?.insert(module.id, module.clone());
        Ok(())
    }

    async fn upsert_sub_module(&self, sub_module: &SubModule) -> Result<(), StorageError> {
        lock(&self.sub_modules)?.insert(sub_module.id, sub_module.clone());
        Ok(())
    }

    async fn upsert_concept(&self, concept: &MicroConcept) -> Result<(), StorageError> {
        lock(&self.concepts)?.insert(concept.id, concept.clone());
        Ok(())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn list_progress(
        &self,
        user: UserId,
        module: Option<ModuleId>,
    ) -> Result<Vec<ProgressRow>, StorageError> {
        let guard = lock(&self.progress)?;
        Ok(guard
            .values()
            .filter(|row| row.user_id == user && module.is_none_or(|m| row.module_id == m))
            .cloned()
            .collect())
    }

    async fn upsert_progress(&self, row: &ProgressRow) -> Result<(), StorageError> {
        lock(&self.progress)?.insert((row.user_id, row.sub_module_id), row.clone());
        Ok(())
    }
}

#[async_trait]
impl StreakRepository for InMemoryRepository {
    async fn streak(&self, user: UserId) -> Result<Option<Streak>, StorageError> {
        let guard = lock(&self.streaks)?;
        Ok(guard.get(&user).cloned())
    }

    async fn create_streak(&self, user: UserId) -> Result<Streak, StorageError> {
        let mut guard = lock(&self.streaks)?;
        if guard.contains_key(&user) {
            return Err(StorageError::Conflict);
        }
        let streak = Streak::new();
        guard.insert(user, streak.clone());
        Ok(streak)
    }

    async fn update_streak(&self, user: UserId, streak: &Streak) -> Result<(), StorageError> {
        lock(&self.streaks)?.insert(user, streak.clone());
        Ok(())
    }
}

fn has_attempt_on(log: &AttemptLog, user: UserId, date: NaiveDate) -> bool {
    log.attempts
        .iter()
        .any(|a| a.user_id == user && a.attempted_on() == date)
}

fn push_attempt(log: &mut AttemptLog, record: &NewAttemptRecord) -> Result<AttemptId, StorageError> {
    if has_attempt_on(log, record.user_id, record.attempted_on()) {
        return Err(StorageError::Conflict);
    }
    log.next_id += 1;
    let id = AttemptId::new(log.next_id);
    log.attempts.push(record.clone().into_attempt(id));
    Ok(id)
}

#[async_trait]
impl QuizRepository for InMemoryRepository {
    async fn active_quiz(&self, date: NaiveDate) -> Result<Option<DailyQuiz>, StorageError> {
        let guard = lock(&self.quizzes)?;
        Ok(guard
            .values()
            .find(|q| q.is_active && q.quiz_date == date)
            .cloned())
    }

    async fn attempt_on(
        &self,
        user: UserId,
        date: NaiveDate,
    ) -> Result<Option<QuizAttempt>, StorageError> {
        let guard = lock(&self.attempts)?;
        Ok(guard
            .attempts
            .iter()
            .find(|a| a.user_id == user && a.attempted_on() == date)
            .cloned())
    }

    async fn recent_attempts(
        &self,
        user: UserId,
        limit: u32,
    ) -> Result<Vec<QuizAttempt>, StorageError> {
        let guard = lock(&self.attempts)?;
        let mut attempts: Vec<QuizAttempt> = guard
            .attempts
            .iter()
            .filter(|a| a.user_id == user)
            .cloned()
            .collect();
        attempts.sort_by(|a, b| b.attempted_at.cmp(&a.attempted_at));
        attempts.truncate(limit as usize);
        Ok(attempts)
    }

    async fn insert_attempt(&self, record: &NewAttemptRecord) -> Result<AttemptId, StorageError> {
        let mut guard = lock(&self.attempts)?;
        push_attempt(&mut guard, record)
    }

    async fn upsert_quiz(&self, quiz: &DailyQuiz) -> Result<(), StorageError> {
        lock(&self.quizzes)?.insert(quiz.id, quiz.clone());
        Ok(())
    }
}

#[async_trait]
impl AttemptPersistence for InMemoryRepository {
    async fn record_attempt(
        &self,
        record: &NewAttemptRecord,
        streak: &Streak,
    ) -> Result<AttemptId, StorageError> {
        // Both locks are held across the write so a failed insert leaves
        // the streak untouched.
        let mut attempts = lock(&self.attempts)?;
        let mut streaks = lock(&self.streaks)?;
        let id = push_attempt(&mut attempts, record)?;
        streaks.insert(record.user_id, streak.clone());
        Ok(id)
    }
}

#[async_trait]
impl ProfileRepository for InMemoryRepository {
    async fn profile(&self, user: UserId) -> Result<Option<UserProfile>, StorageError> {
        let guard = lock(&self.profiles)?;
        Ok(guard.get(&user).cloned())
    }

    async fn update_profile(
        &self,
        user: UserId,
        update: &ProfileUpdate,
    ) -> Result<(), StorageError> {
        let mut guard = lock(&self.profiles)?;
        let profile = guard.get_mut(&user).ok_or(StorageError::NotFound)?;
        profile.first_name = update.first_name().to_owned();
        profile.last_name = update.last_name().to_owned();
        profile.mobile_number = update.mobile_number().map(str::to_owned);
        Ok(())
    }

    async fn upsert_profile(&self, profile: &UserProfile) -> Result<(), StorageError> {
        lock(&self.profiles)?.insert(profile.user_id, profile.clone());
        Ok(())
    }
}

#[async_trait]
impl AchievementRepository for InMemoryRepository {
    async fn earned(&self, user: UserId) -> Result<Vec<EarnedAchievement>, StorageError> {
        let catalog = lock(&self.achievements)?;
        let earned = lock(&self.earned)?;
        let mut items: Vec<EarnedAchievement> = earned
            .iter()
            .filter(|(u, _, _)| *u == user)
            .filter_map(|(_, id, at)| {
                catalog.get(id).map(|achievement| EarnedAchievement {
                    achievement: achievement.clone(),
                    earned_at: *at,
                })
            })
            .collect();
        items.sort_by(|a, b| b.earned_at.cmp(&a.earned_at));
        Ok(items)
    }

    async fn upsert_achievement(&self, achievement: &Achievement) -> Result<(), StorageError> {
        lock(&self.achievements)?.insert(achievement.id, achievement.clone());
        Ok(())
    }

    async fn record_earned(
        &self,
        user: UserId,
        achievement: AchievementId,
        earned_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        if !lock(&self.achievements)?.contains_key(&achievement) {
            return Err(StorageError::NotFound);
        }
        lock(&self.earned)?.push((user, achievement, earned_at));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use hub_core::time::fixed_now;

    fn record(user: UserId, at: DateTime<Utc>) -> NewAttemptRecord {
        NewAttemptRecord {
            user_id: user,
            quiz_id: QuizId::new(1),
            user_answer: "Past simple".into(),
            is_correct: true,
            attempted_at: at,
        }
    }

    #[tokio::test]
    async fn second_attempt_same_day_conflicts() {
        let repo = InMemoryRepository::new();
        let user = UserId::random();
        let now = fixed_now();

        repo.insert_attempt(&record(user, now)).await.unwrap();
        let err = repo
            .insert_attempt(&record(user, now + Duration::minutes(30)))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict));

        // The fixed timestamp sits late in the UTC day; two hours later is
        // past midnight, and the new calendar day is open again.
        repo.insert_attempt(&record(user, now + Duration::hours(2)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn record_attempt_persists_both_rows() {
        let repo = InMemoryRepository::new();
        let user = UserId::random();
        let now = fixed_now();

        let mut streak = Streak::new();
        streak.apply(true, now.date_naive());
        repo.record_attempt(&record(user, now), &streak)
            .await
            .unwrap();

        let stored = repo.streak(user).await.unwrap().unwrap();
        assert_eq!(stored.current_streak(), 1);
        let attempt = repo.attempt_on(user, now.date_naive()).await.unwrap();
        assert!(attempt.unwrap().is_correct);
    }

    #[tokio::test]
    async fn record_attempt_conflict_leaves_streak_untouched() {
        let repo = InMemoryRepository::new();
        let user = UserId::random();
        let now = fixed_now();

        let mut streak = Streak::new();
        streak.apply(true, now.date_naive());
        repo.record_attempt(&record(user, now), &streak)
            .await
            .unwrap();

        let mut doubled = streak.clone();
        doubled.apply(true, now.date_naive());
        let err = repo
            .record_attempt(&record(user, now), &doubled)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict));

        let stored = repo.streak(user).await.unwrap().unwrap();
        assert_eq!(stored.current_streak(), 1);
    }

    #[tokio::test]
    async fn sub_modules_filter_by_module_and_sort() {
        let repo = InMemoryRepository::new();
        for (id, module, number) in [(1, 1, 2), (2, 1, 1), (3, 2, 1)] {
            repo.upsert_sub_module(&SubModule {
                id: SubModuleId::new(id),
                module_id: ModuleId::new(module),
                sub_module_number: number,
                title: format!("S{id}"),
                description: String::new(),
                unlock_after: None,
            })
            .await
            .unwrap();
        }

        let scoped = repo
            .list_sub_modules(Some(ModuleId::new(1)))
            .await
            .unwrap();
        assert_eq!(
            scoped.iter().map(|s| s.id.value()).collect::<Vec<_>>(),
            vec![2, 1]
        );
        assert_eq!(repo.list_sub_modules(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn earned_achievements_sort_newest_first() {
        let repo = InMemoryRepository::new();
        let user = UserId::random();
        let now = fixed_now();

        for id in 1..=2 {
            repo.upsert_achievement(&Achievement {
                id: AchievementId::new(id),
                title: format!("A{id}"),
                description: String::new(),
                badge_icon: "star".into(),
            })
            .await
            .unwrap();
        }
        repo.record_earned(user, AchievementId::new(1), now)
            .await
            .unwrap();
        repo.record_earned(user, AchievementId::new(2), now + Duration::days(1))
            .await
            .unwrap();

        let earned = repo.earned(user).await.unwrap();
        assert_eq!(earned[0].achievement.id, AchievementId::new(2));
        assert_eq!(earned.len(), 2);
    }
}
