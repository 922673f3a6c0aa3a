use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::daily_quiz_service::DailyQuizService;
use crate::error::AppServicesError;
use crate::home_service::HomeService;
use crate::module_viewer_service::ModuleViewerService;
use crate::profile_service::ProfileService;
use crate::progress_service::ProgressService;
use crate::streak_service::StreakService;

/// Assembles the six dashboard services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    home: Arc<HomeService>,
    progress: Arc<ProgressService>,
    streaks: Arc<StreakService>,
    daily_quiz: Arc<DailyQuizService>,
    module_viewer: Arc<ModuleViewerService>,
    profile: Arc<ProfileService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if connection or migrations fail.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::with_storage(&storage, clock))
    }

    /// Build services over the in-memory backend, for tests and demos.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::with_storage(&Storage::in_memory(), clock)
    }

    #[must_use]
    pub fn with_storage(storage: &Storage, clock: Clock) -> Self {
        let home = Arc::new(HomeService::new(
            Arc::clone(&storage.curriculum),
            Arc::clone(&storage.progress),
            Arc::clone(&storage.profiles),
        ));
        let progress = Arc::new(ProgressService::new(
            Arc::clone(&storage.curriculum),
            Arc::clone(&storage.progress),
        ));
        let streaks = Arc::new(StreakService::new(
            clock,
            Arc::clone(&storage.streaks),
            Arc::clone(&storage.quizzes),
        ));
        let daily_quiz = Arc::new(DailyQuizService::new(
            clock,
            Arc::clone(&storage.streaks),
            Arc::clone(&storage.quizzes),
            Arc::clone(&storage.attempts),
        ));
        let module_viewer = Arc::new(ModuleViewerService::new(
            clock,
            Arc::clone(&storage.curriculum),
            Arc::clone(&storage.progress),
        ));
        let profile = Arc::new(ProfileService::new(
            Arc::clone(&storage.profiles),
            Arc::clone(&storage.achievements),
        ));

        Self {
            home,
            progress,
            streaks,
            daily_quiz,
            module_viewer,
            profile,
        }
    }

    #[must_use]
    pub fn home(&self) -> Arc<HomeService> {
        Arc::clone(&self.home)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn streaks(&self) -> Arc<StreakService> {
        Arc::clone(&self.streaks)
    }

    #[must_use]
    pub fn daily_quiz(&self) -> Arc<DailyQuizService> {
        Arc::clone(&self.daily_quiz)
    }

    #[must_use]
    pub fn module_viewer(&self) -> Arc<ModuleViewerService> {
        Arc::clone(&self.module_viewer)
    }

    #[must_use]
    pub fn profile(&self) -> Arc<ProfileService> {
        Arc::clone(&self.profile)
    }
}
