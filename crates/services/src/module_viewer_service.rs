use std::collections::HashSet;
use std::sync::Arc;

use hub_core::Clock;
use hub_core::model::{MicroConcept, Module, ModuleId, ProgressRow, SubModule, SubModuleId, UserId};
use hub_core::unlock;
use storage::repository::{CurriculumRepository, ProgressRepository};

use crate::error::ModuleViewerError;

/// One sub-module row in the viewer, with the user's access flags.
#[derive(Debug, Clone)]
pub struct SubModuleEntry {
    pub sub_module: SubModule,
    pub unlocked: bool,
    pub completed: bool,
}

/// Everything the module viewer renders for one module.
#[derive(Debug, Clone)]
pub struct ModuleView {
    pub module: Module,
    pub sub_modules: Vec<SubModuleEntry>,
}

/// Serves one module's sub-module chain with unlock state, the concept
/// content inside a sub-module, and completion marking.
#[derive(Clone)]
pub struct ModuleViewerService {
    clock: Clock,
    curriculum: Arc<dyn CurriculumRepository>,
    progress: Arc<dyn ProgressRepository>,
}

impl ModuleViewerService {
    #[must_use]
    pub fn new(
        clock: Clock,
        curriculum: Arc<dyn CurriculumRepository>,
        progress: Arc<dyn ProgressRepository>,
    ) -> Self {
        Self {
            clock,
            curriculum,
            progress,
        }
    }

    /// Loads one module with per-sub-module unlock and completion flags.
    ///
    /// # Errors
    ///
    /// Returns `ModuleViewerError::ModuleNotFound` for an unknown module id
    /// and `ModuleViewerError::Storage` on store failure.
    pub async fn load(
        &self,
        user: UserId,
        module_id: ModuleId,
    ) -> Result<ModuleView, ModuleViewerError> {
        let (module, sub_modules, progress) = tokio::try_join!(
            self.curriculum.module(module_id),
            self.curriculum.list_sub_modules(Some(module_id)),
            self.progress.list_progress(user, Some(module_id)),
        )?;
        let module = module.ok_or(ModuleViewerError::ModuleNotFound(module_id))?;

        let completed: HashSet<SubModuleId> = progress
            .iter()
            .filter(|row| row.is_completed)
            .map(|row| row.sub_module_id)
            .collect();

        let access = unlock::resolve(&sub_modules, &completed);
        let sub_modules = sub_modules
            .into_iter()
            .zip(access)
            .map(|(sub_module, access)| SubModuleEntry {
                sub_module,
                unlocked: access.unlocked,
                completed: access.completed,
            })
            .collect();

        Ok(ModuleView {
            module,
            sub_modules,
        })
    }

    /// The micro-concepts inside a sub-module, ordered by concept number.
    ///
    /// # Errors
    ///
    /// Returns `ModuleViewerError::Storage` on store failure.
    pub async fn concepts(
        &self,
        sub_module: SubModuleId,
    ) -> Result<Vec<MicroConcept>, ModuleViewerError> {
        Ok(self.curriculum.list_concepts(sub_module).await?)
    }

    /// Marks a sub-module completed now. The viewer disables locked
    /// entries; completion itself is not re-gated here, and marking twice
    /// refreshes the completion timestamp.
    ///
    /// # Errors
    ///
    /// Returns `ModuleViewerError::Storage` if the row cannot be stored.
    pub async fn mark_complete(
        &self,
        user: UserId,
        module_id: ModuleId,
        sub_module_id: SubModuleId,
    ) -> Result<(), ModuleViewerError> {
        let row = ProgressRow::completed(user, module_id, sub_module_id, self.clock.now());
        self.progress.upsert_progress(&row).await?;
        tracing::info!(
            %user,
            sub_module = sub_module_id.value(),
            "sub-module marked complete"
        );
        Ok(())
    }
}
