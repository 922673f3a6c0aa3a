use serde::{Deserialize, Serialize};

use crate::model::ids::{ConceptId, LevelId, ModuleId, SubModuleId};

/// Ordered curriculum tier containing modules.
///
/// Only active levels are surfaced to learners; inactive rows stay in the
/// store for authoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub id: LevelId,
    pub level_number: u32,
    pub title: String,
    pub description: String,
    pub is_active: bool,
}

/// A module inside a level, ordered by `module_number` for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: ModuleId,
    pub level_id: LevelId,
    pub module_number: u32,
    pub title: String,
    pub description: String,
    pub is_active: bool,
}

/// A sub-module inside a module, ordered by `sub_module_number`.
///
/// `unlock_after` is the single designated prerequisite: the sub-module is
/// accessible only once that prerequisite is completed. The source data is
/// expected to encode a simple chain; cycles are not checked at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubModule {
    pub id: SubModuleId,
    pub module_id: ModuleId,
    pub sub_module_number: u32,
    pub title: String,
    pub description: String,
    pub unlock_after: Option<SubModuleId>,
}

/// Smallest unit of explanatory content, ordered by `concept_number`
/// within its sub-module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MicroConcept {
    pub id: ConceptId,
    pub sub_module_id: SubModuleId,
    pub concept_number: u32,
    pub title: String,
    pub definition_simple: String,
    pub definition_formal: String,
    pub why_exists: String,
    pub cognitive_explanation: String,
    pub examples: Vec<String>,
}
