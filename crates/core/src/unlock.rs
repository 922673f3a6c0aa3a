//! Single-hop unlock gate for sub-modules.
//!
//! A sub-module with no declared prerequisite is always accessible. One
//! with a prerequisite is accessible exactly when that prerequisite is
//! completed for the current user; a missing progress row reads as "not
//! completed", never as an error. The gate is deliberately single-hop:
//! each sub-module consults only its immediate prerequisite's completion
//! flag, trusting the data author to order the chain.

use std::collections::HashSet;

use crate::model::{SubModule, SubModuleId};

/// Per-sub-module accessibility, derived for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubModuleAccess {
    pub sub_module_id: SubModuleId,
    pub unlocked: bool,
    pub completed: bool,
}

/// Whether one sub-module is accessible given the user's completed set.
#[must_use]
pub fn is_unlocked(sub_module: &SubModule, completed: &HashSet<SubModuleId>) -> bool {
    match sub_module.unlock_after {
        None => true,
        Some(prereq) => completed.contains(&prereq),
    }
}

/// Maps an ordered sub-module list into per-entry access records.
#[must_use]
pub fn resolve(sub_modules: &[SubModule], completed: &HashSet<SubModuleId>) -> Vec<SubModuleAccess> {
    sub_modules
        .iter()
        .map(|sub_module| SubModuleAccess {
            sub_module_id: sub_module.id,
            unlocked: is_unlocked(sub_module, completed),
            completed: completed.contains(&sub_module.id),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModuleId;

    fn sub_module(id: i64, unlock_after: Option<i64>) -> SubModule {
        SubModule {
            id: SubModuleId::new(id),
            module_id: ModuleId::new(1),
            sub_module_number: id as u32,
            title: format!("Sub-module {id}"),
            description: String::new(),
            unlock_after: unlock_after.map(SubModuleId::new),
        }
    }

    #[test]
    fn no_prerequisite_is_always_unlocked() {
        let first = sub_module(1, None);
        assert!(is_unlocked(&first, &HashSet::new()));
    }

    #[test]
    fn prerequisite_locks_user_with_no_progress() {
        let gated = sub_module(2, Some(1));
        assert!(!is_unlocked(&gated, &HashSet::new()));
    }

    #[test]
    fn completing_prerequisite_unlocks() {
        let gated = sub_module(2, Some(1));
        let completed = HashSet::from([SubModuleId::new(1)]);
        assert!(is_unlocked(&gated, &completed));
    }

    #[test]
    fn gate_is_single_hop() {
        // 3 requires 2; whether 2 itself was reachable is not re-checked.
        let third = sub_module(3, Some(2));
        let completed = HashSet::from([SubModuleId::new(2)]);
        assert!(is_unlocked(&third, &completed));
    }

    #[test]
    fn resolve_reports_unlock_and_completion() {
        let chain = vec![sub_module(1, None), sub_module(2, Some(1)), sub_module(3, Some(2))];
        let completed = HashSet::from([SubModuleId::new(1)]);

        let access = resolve(&chain, &completed);
        assert_eq!(access.len(), 3);
        assert!(access[0].unlocked && access[0].completed);
        assert!(access[1].unlocked && !access[1].completed);
        assert!(!access[2].unlocked && !access[2].completed);
    }
}
