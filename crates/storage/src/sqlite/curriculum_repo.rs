use hub_core::model::{Level, MicroConcept, Module, ModuleId, SubModule, SubModuleId};

use super::{
    SqliteRepository,
    mapping::{
        map_concept_row, map_level_row, map_module_row, map_sub_module_row, read_err,
        strings_to_json, write_err,
    },
};
use crate::repository::{CurriculumRepository, StorageError};

#[async_trait::async_trait]
impl CurriculumRepository for SqliteRepository {
    async fn list_levels(&self, active_only: bool) -> Result<Vec<Level>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, level_number, title, description, is_active
                FROM levels
                WHERE is_active = 1 OR ?1 = 0
                ORDER BY level_number ASC
            ",
        )
        .bind(i64::from(active_only))
        .fetch_all(self.pool())
        .await
        .map_err(read_err)?;

        rows.iter().map(map_level_row).collect()
    }

    async fn list_modules(&self, active_only: bool) -> Result<Vec<Module>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, level_id, module_number, title, description, is_active
                FROM modules
                WHERE is_active = 1 OR ?1 = 0
                ORDER BY module_number ASC
            ",
        )
        .bind(i64::from(active_only))
        .fetch_all(self.pool())
        .await
        .map_err(read_err)?;

        rows.iter().map(map_module_row).collect()
    }

    async fn module(&self, id: ModuleId) -> Result<Option<Module>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT id, level_id, module_number, title, description, is_active
                FROM modules
                WHERE id = ?1
            ",
        )
        .bind(id.value())
        .fetch_optional(self.pool())
        .await
        .map_err(read_err)?;

        row.as_ref().map(map_module_row).transpose()
    }

    async fn list_sub_modules(
        &self,
        module: Option<ModuleId>,
    ) -> Result<Vec<SubModule>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, module_id, sub_module_number, title, description,
                       unlock_after_sub_module
                FROM sub_modules
                WHERE ?1 IS NULL OR module_id = ?1
                ORDER BY sub_module_number ASC
            ",
        )
        .bind(module.map(|m| m.value()))
        .fetch_all(self.pool())
        .await
        .map_err(read_err)?;

        rows.iter().map(map_sub_module_row).collect()
    }

    async fn list_concepts(
        &self,
        sub_module: SubModuleId,
    ) -> Result<Vec<MicroConcept>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, sub_module_id, concept_number, title, definition_simple,
                       definition_formal, why_exists, cognitive_explanation, examples
                FROM micro_concepts
                WHERE sub_module_id = ?1
                ORDER BY concept_number ASC
            ",
        )
        .bind(sub_module.value())
        .fetch_all(self.pool())
        .await
        .map_err(read_err)?;

        rows.iter().map(map_concept_row).collect()
    }

    async fn upsert_level(&self, level: &Level) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO levels (id, level_number, title, description, is_active)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(id) DO UPDATE SET
                    level_number = excluded.level_number,
                    title = excluded.title,
                    description = excluded.description,
                    is_active = excluded.is_active
            ",
        )
        .bind(level.id.value())
        .bind(i64::from(level.level_number))
        .bind(&level.title)
        .bind(&level.description)
        .bind(level.is_active)
        .execute(self.pool())
        .await
        .map_err(write_err)?;
        Ok(())
    }

    async fn upsert_module(&self, module: &Module) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO modules (id, level_id, module_number, title, description, is_active)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(id) DO UPDATE SET
                    level_id = excluded.level_id,
                    module_number = excluded.module_number,
                    title = excluded.title,
                    description = excluded.description,
                    is_active = excluded.is_active
            ",
        )
        .bind(module.id.value())
        .bind(module.level_id.value())
        .bind(i64::from(module.module_number))
        .bind(&module.title)
        .bind(&module.description)
        .bind(module.is_active)
        .execute(self.pool())
        .await
        .map_err(write_err)?;
        Ok(())
    }

    async fn upsert_sub_module(&self, sub_module: &SubModule) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO sub_modules (
                    id, module_id, sub_module_number, title, description,
                    unlock_after_sub_module
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(id) DO UPDATE SET
                    module_id = excluded.module_id,
                    sub_module_number = excluded.sub_module_number,
                    title = excluded.title,
                    description = excluded.description,
                    unlock_after_sub_module = excluded.unlock_after_sub_module
            ",
        )
        .bind(sub_module.id.value())
        .bind(sub_module.module_id.value())
        .bind(i64::from(sub_module.sub_module_number))
        .bind(&sub_module.title)
        .bind(&sub_module.description)
        .bind(sub_module.unlock_after.map(|s| s.value()))
        .execute(self.pool())
        .await
        .map_err(write_err)?;
        Ok(())
    }

    async fn upsert_concept(&self, concept: &MicroConcept) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO micro_concepts (
                    id, sub_module_id, concept_number, title, definition_simple,
                    definition_formal, why_exists, cognitive_explanation, examples
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                ON CONFLICT(id) DO UPDATE SET
                    sub_module_id = excluded.sub_module_id,
                    concept_number = excluded.concept_number,
                    title = excluded.title,
                    definition_simple = excluded.definition_simple,
                    definition_formal = excluded.definition_formal,
                    why_exists = excluded.why_exists,
                    cognitive_explanation = excluded.cognitive_explanation,
                    examples = excluded.examples
            ",
        )
        .bind(concept.id.value())
        .bind(concept.sub_module_id.value())
        .bind(i64::from(concept.concept_number))
        .bind(&concept.title)
        .bind(&concept.definition_simple)
        .bind(&concept.definition_formal)
        .bind(&concept.why_exists)
        .bind(&concept.cognitive_explanation)
        .bind(strings_to_json(&concept.examples)?)
        .execute(self.pool())
        .await
        .map_err(write_err)?;
        Ok(())
    }
}
