use std::sync::Arc;

use hub_core::model::{Module, UserId, UserProfile};
use hub_core::progress::{ModuleProgress, ProgressAggregate};
use storage::repository::{CurriculumRepository, ProfileRepository, ProgressRepository};

use crate::error::HomeServiceError;

/// One module tile on the home dashboard. `progress` is `None` for a
/// module that has no sub-modules yet; the view renders that as 0/0.
#[derive(Debug, Clone)]
pub struct ModuleCard {
    pub module: Module,
    pub progress: Option<ModuleProgress>,
}

/// Everything the home dashboard renders.
#[derive(Debug, Clone)]
pub struct HomeView {
    pub profile: Option<UserProfile>,
    pub modules: Vec<ModuleCard>,
    pub overall_percentage: u8,
}

impl HomeView {
    /// First name for the greeting, with a fallback when no profile row
    /// exists yet.
    #[must_use]
    pub fn greeting_name(&self) -> &str {
        self.profile
            .as_ref()
            .map_or("Learner", |p| p.first_name.as_str())
    }

    /// Case-insensitive search over module title and description. An empty
    /// query matches everything.
    #[must_use]
    pub fn filter(&self, query: &str) -> Vec<&ModuleCard> {
        let needle = query.to_lowercase();
        self.modules
            .iter()
            .filter(|card| {
                card.module.title.to_lowercase().contains(&needle)
                    || card.module.description.to_lowercase().contains(&needle)
            })
            .collect()
    }
}

/// Derives the home dashboard: module cards with per-module completion.
#[derive(Clone)]
pub struct HomeService {
    curriculum: Arc<dyn CurriculumRepository>,
    progress: Arc<dyn ProgressRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl HomeService {
    #[must_use]
    pub fn new(
        curriculum: Arc<dyn CurriculumRepository>,
        progress: Arc<dyn ProgressRepository>,
        profiles: Arc<dyn ProfileRepository>,
    ) -> Self {
        Self {
            curriculum,
            progress,
            profiles,
        }
    }

    /// Loads the home dashboard for one user.
    ///
    /// # Errors
    ///
    /// Returns `HomeServiceError::Storage` if any read in the batch fails.
    pub async fn load(&self, user: UserId) -> Result<HomeView, HomeServiceError> {
        let (profile, modules, sub_modules, progress) = tokio::try_join!(
            self.profiles.profile(user),
            self.curriculum.list_modules(true),
            self.curriculum.list_sub_modules(None),
            self.progress.list_progress(user, None),
        )?;

        let aggregate = ProgressAggregate::build(
            sub_modules.iter().map(|s| s.module_id),
            progress
                .iter()
                .filter(|row| row.is_completed)
                .map(|row| row.module_id),
        );

        let overall_percentage = aggregate.overall_percentage();
        let modules = modules
            .into_iter()
            .map(|module| ModuleCard {
                progress: aggregate.module(module.id),
                module,
            })
            .collect();

        Ok(HomeView {
            profile,
            modules,
            overall_percentage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use hub_core::model::{LevelId, ModuleId, ProgressRow, SubModuleId};
    use hub_core::time::fixed_now;
    use storage::memory::InMemoryRepository;
    use storage::repository::{CurriculumRepository, ProgressRepository};

    fn module(id: i64, title: &str, description: &str) -> Module {
        Module {
            id: ModuleId::new(id),
            level_id: LevelId::new(1),
            module_number: u32::try_from(id).unwrap(),
            title: title.into(),
            description: description.into(),
            is_active: true,
        }
    }

    fn sub_module(id: i64, module: i64) -> hub_core::model::SubModule {
        hub_core::model::SubModule {
            id: SubModuleId::new(id),
            module_id: ModuleId::new(module),
            sub_module_number: u32::try_from(id).unwrap(),
            title: format!("Sub {id}"),
            description: String::new(),
            unlock_after: None,
        }
    }

    fn service(repo: &InMemoryRepository) -> HomeService {
        HomeService::new(
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        )
    }

    #[tokio::test]
    async fn load_derives_per_module_cards_and_overall() {
        let repo = InMemoryRepository::new();
        repo.upsert_module(&module(1, "Grammar", "Sentence structure"))
            .await
            .unwrap();
        repo.upsert_sub_module(&sub_module(1, 1)).await.unwrap();
        repo.upsert_sub_module(&sub_module(2, 1)).await.unwrap();

        let user = UserId::random();
        repo.upsert_progress(&ProgressRow::completed(
            user,
            ModuleId::new(1),
            SubModuleId::new(1),
            fixed_now(),
        ))
        .await
        .unwrap();

        let view = service(&repo).load(user).await.unwrap();
        assert_eq!(view.overall_percentage, 50);
        assert_eq!(view.greeting_name(), "Learner");
        let card = &view.modules[0];
        let progress = card.progress.unwrap();
        assert_eq!((progress.completed, progress.total), (1, 2));
    }

    #[tokio::test]
    async fn filter_matches_title_and_description_case_insensitively() {
        let repo = InMemoryRepository::new();
        repo.upsert_module(&module(1, "Grammar", "Sentence structure"))
            .await
            .unwrap();
        repo.upsert_module(&module(2, "Vocabulary", "Word lists"))
            .await
            .unwrap();

        let view = service(&repo).load(UserId::random()).await.unwrap();
        assert_eq!(view.filter("GRAM").len(), 1);
        assert_eq!(view.filter("word").len(), 1);
        assert_eq!(view.filter("").len(), 2);
        assert!(view.filter("calculus").is_empty());
    }
}
