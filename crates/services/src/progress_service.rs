use std::sync::Arc;

use hub_core::model::{Level, Module, UserId};
use hub_core::progress::ProgressAggregate;
use storage::repository::{CurriculumRepository, ProgressRepository};

use crate::error::ProgressServiceError;

/// One module row inside a level section.
#[derive(Debug, Clone)]
pub struct ModuleProgressRow {
    pub module: Module,
    pub completed: u32,
    pub total: u32,
    pub percentage: u8,
}

/// One level section: its percentage is the unweighted mean of the member
/// modules' percentages.
#[derive(Debug, Clone)]
pub struct LevelProgressView {
    pub level: Level,
    pub percentage: u8,
    pub modules: Vec<ModuleProgressRow>,
}

/// Everything the progress dashboard renders.
#[derive(Debug, Clone)]
pub struct ProgressOverview {
    pub overall_percentage: u8,
    pub modules_completed: u32,
    pub modules_total: u32,
    pub levels: Vec<LevelProgressView>,
}

impl ProgressOverview {
    #[must_use]
    pub fn modules_remaining(&self) -> u32 {
        self.modules_total.saturating_sub(self.modules_completed)
    }
}

/// Rolls completion rows up into the level/module progress dashboard.
#[derive(Clone)]
pub struct ProgressService {
    curriculum: Arc<dyn CurriculumRepository>,
    progress: Arc<dyn ProgressRepository>,
}

impl ProgressService {
    #[must_use]
    pub fn new(
        curriculum: Arc<dyn CurriculumRepository>,
        progress: Arc<dyn ProgressRepository>,
    ) -> Self {
        Self {
            curriculum,
            progress,
        }
    }

    /// Loads the progress dashboard for one user.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if any read in the batch
    /// fails.
    pub async fn load(&self, user: UserId) -> Result<ProgressOverview, ProgressServiceError> {
        let (levels, modules, sub_modules, progress) = tokio::try_join!(
            self.curriculum.list_levels(true),
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
        let modules_completed = aggregate.modules_completed();
        let modules_total = modules.len() as u32;

        let levels = levels
            .into_iter()
            .map(|level| {
                let members: Vec<&Module> =
                    modules.iter().filter(|m| m.level_id == level.id).collect();
                let member_ids: Vec<_> = members.iter().map(|m| m.id).collect();
                let rows = members
                    .into_iter()
                    .map(|module| {
                        let progress = aggregate.module(module.id);
                        ModuleProgressRow {
                            module: module.clone(),
                            completed: progress.map_or(0, |p| p.completed),
                            total: progress.map_or(0, |p| p.total),
                            percentage: progress.map_or(0, |p| p.percentage),
                        }
                    })
                    .collect();
                LevelProgressView {
                    percentage: aggregate.level_percentage(&member_ids),
                    level,
                    modules: rows,
                }
            })
            .collect();

        Ok(ProgressOverview {
            overall_percentage,
            modules_completed,
            modules_total,
            levels,
        })
    }
}
