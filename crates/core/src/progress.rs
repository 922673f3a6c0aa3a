//! Rolls flat per-sub-module completion rows up into per-module, per-level
//! and overall completion percentages.
//!
//! Built from two flat inputs: one module id per existing sub-module, and
//! one module id per completed progress row. Everything else is derived.

use std::collections::HashMap;

use crate::model::ModuleId;

/// Completion triple for one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleProgress {
    pub completed: u32,
    pub total: u32,
    pub percentage: u8,
}

/// Derived completion state across all modules that have at least one
/// sub-module. Modules with zero sub-modules never appear, so the
/// per-module division is total-safe by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressAggregate {
    modules: HashMap<ModuleId, ModuleProgress>,
}

impl ProgressAggregate {
    /// Builds the aggregate from sub-module memberships (one `ModuleId`
    /// per existing sub-module) and completions (one `ModuleId` per
    /// completed progress row).
    #[must_use]
    pub fn build<M, C>(memberships: M, completions: C) -> Self
    where
        M: IntoIterator<Item = ModuleId>,
        C: IntoIterator<Item = ModuleId>,
    {
        let mut totals: HashMap<ModuleId, u32> = HashMap::new();
        for module_id in memberships {
            *totals.entry(module_id).or_insert(0) += 1;
        }

        let mut completed_counts: HashMap<ModuleId, u32> = HashMap::new();
        for module_id in completions {
            *completed_counts.entry(module_id).or_insert(0) += 1;
        }

        let modules = totals
            .into_iter()
            .map(|(module_id, total)| {
                let completed = completed_counts.get(&module_id).copied().unwrap_or(0);
                (
                    module_id,
                    ModuleProgress {
                        completed,
                        total,
                        percentage: percent(completed, total),
                    },
                )
            })
            .collect();

        Self { modules }
    }

    /// Progress for one module, or `None` if the module has no sub-modules.
    #[must_use]
    pub fn module(&self, id: ModuleId) -> Option<ModuleProgress> {
        self.modules.get(&id).copied()
    }

    /// `round(100 * completed sub-modules / all sub-modules)`, or 0 when
    /// there are no sub-modules at all.
    #[must_use]
    pub fn overall_percentage(&self) -> u8 {
        let total: u32 = self.modules.values().map(|m| m.total).sum();
        if total == 0 {
            return 0;
        }
        let completed: u32 = self.modules.values().map(|m| m.completed).sum();
        percent(completed, total)
    }

    /// Count of modules sitting at exactly 100%.
    #[must_use]
    pub fn modules_completed(&self) -> u32 {
        self.modules
            .values()
            .filter(|m| m.percentage == 100)
            .count() as u32
    }

    /// Unweighted mean of the member modules' percentages, rounded to the
    /// nearest integer; 0 for an empty member list. A member with no
    /// sub-modules has no percentage and contributes 0 to the mean.
    #[must_use]
    pub fn level_percentage(&self, member_modules: &[ModuleId]) -> u8 {
        if member_modules.is_empty() {
            return 0;
        }
        let sum: u32 = member_modules
            .iter()
            .map(|id| self.module(*id).map_or(0, |m| u32::from(m.percentage)))
            .sum();
        round_half_up(f64::from(sum) / member_modules.len() as f64)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ModuleId, ModuleProgress)> + '_ {
        self.modules.iter().map(|(id, progress)| (*id, *progress))
    }
}

/// `round(100 * completed / total)` with round-half-up. `total` must be
/// non-zero; the aggregate guarantees that by construction.
fn percent(completed: u32, total: u32) -> u8 {
    round_half_up(100.0 * f64::from(completed) / f64::from(total))
}

fn round_half_up(value: f64) -> u8 {
    value.round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(id: i64) -> ModuleId {
        ModuleId::new(id)
    }

    fn aggregate(modules: &[(i64, u32, u32)]) -> ProgressAggregate {
        let memberships = modules
            .iter()
            .flat_map(|(id, _, total)| std::iter::repeat_n(module(*id), *total as usize));
        let completions = modules
            .iter()
            .flat_map(|(id, completed, _)| std::iter::repeat_n(module(*id), *completed as usize));
        ProgressAggregate::build(memberships, completions)
    }

    #[test]
    fn rounds_thirds_half_up() {
        let agg = aggregate(&[(1, 1, 3), (2, 2, 3)]);
        assert_eq!(agg.module(module(1)).unwrap().percentage, 33);
        assert_eq!(agg.module(module(2)).unwrap().percentage, 67);
    }

    #[test]
    fn boundary_percentages() {
        let agg = aggregate(&[(1, 0, 5), (2, 5, 5)]);
        assert_eq!(agg.module(module(1)).unwrap().percentage, 0);
        assert_eq!(agg.module(module(2)).unwrap().percentage, 100);
    }

    #[test]
    fn module_without_sub_modules_is_omitted() {
        let agg = aggregate(&[(1, 2, 4)]);
        assert!(agg.module(module(99)).is_none());
    }

    #[test]
    fn overall_progress_spans_modules() {
        let agg = aggregate(&[(1, 2, 4), (2, 3, 3)]);
        // 5 of 7 sub-modules -> 71%
        assert_eq!(agg.overall_percentage(), 71);
    }

    #[test]
    fn overall_progress_zero_without_sub_modules() {
        let agg = ProgressAggregate::build([], []);
        assert!(agg.is_empty());
        assert_eq!(agg.overall_percentage(), 0);
    }

    #[test]
    fn counts_only_fully_completed_modules() {
        let agg = aggregate(&[(1, 3, 3), (2, 2, 3), (3, 4, 4)]);
        assert_eq!(agg.modules_completed(), 2);
    }

    #[test]
    fn level_percentage_is_mean_of_members() {
        let agg = aggregate(&[(1, 1, 3), (2, 2, 3)]);
        // mean(33, 67) = 50
        assert_eq!(agg.level_percentage(&[module(1), module(2)]), 50);
    }

    #[test]
    fn level_percentage_zero_for_empty_level() {
        let agg = aggregate(&[(1, 1, 3)]);
        assert_eq!(agg.level_percentage(&[]), 0);
    }

    #[test]
    fn absent_member_contributes_zero_to_level_mean() {
        let agg = aggregate(&[(1, 3, 3)]);
        // module 2 has no sub-modules: mean(100, 0) = 50
        assert_eq!(agg.level_percentage(&[module(1), module(2)]), 50);
    }

    #[test]
    fn completions_for_unknown_module_are_ignored() {
        let agg = ProgressAggregate::build(
            vec![module(1), module(1)],
            vec![module(1), module(7)],
        );
        assert_eq!(agg.module(module(1)).unwrap().percentage, 50);
        assert!(agg.module(module(7)).is_none());
        assert_eq!(agg.overall_percentage(), 50);
    }
}
