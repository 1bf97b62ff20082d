//! Talent build validation
//!
//! A build is checked in two passes over the allocation. The first pass
//! resolves every talent, checks its rank and level requirement and sums
//! the points spent per tree; after it the total is checked against the
//! level's point budget. The second pass checks tier gates against the
//! per-tree totals and then each talent's prerequisites. The first
//! failure is returned.

use crate::catalog::{ClassTrees, Talent, TalentCatalog};
use crate::error::{GuildError, Result};
use crate::talent::Allocation;
use ahash::AHashMap;

/// Level at which the first talent point is granted
pub const FIRST_TALENT_LEVEL: u32 = 10;

/// Points a tree needs per tier before the next tier opens
pub const POINTS_PER_TIER: u32 = 5;

/// Talent points available at a character level: one per level from 10 on
#[inline]
pub fn available_talent_points(level: u32) -> u32 {
    level.saturating_sub(FIRST_TALENT_LEVEL - 1)
}

/// Points a tree must hold before a talent of `tier` can be taken
#[inline]
pub fn tier_gate(tier: u8) -> u32 {
    u32::from(tier.saturating_sub(1)) * POINTS_PER_TIER
}

/// A chosen talent in a validated build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChosenTalent {
    pub name: String,
    pub tree: String,
    pub tier: u8,
    pub ranks: u32,
}

/// Outcome of a successful validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub class_name: String,
    pub level: u32,
    pub points_available: u32,
    pub points_spent: u32,
    /// Every tree of the class in declaration order, including empty ones
    pub tree_points: Vec<(String, u32)>,
    pub talents: Vec<ChosenTalent>,
}

impl BuildSummary {
    pub fn points_remaining(&self) -> u32 {
        self.points_available.saturating_sub(self.points_spent)
    }

    /// Points per tree joined with slashes, e.g. "31/20/0"
    pub fn distribution(&self) -> String {
        self.tree_points
            .iter()
            .map(|(_, points)| points.to_string())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Validate a talent allocation for a class at a character level
pub fn validate_build(
    catalog: &TalentCatalog,
    class_name: &str,
    level: u32,
    allocation: &Allocation,
) -> Result<BuildSummary> {
    let class = catalog.lookup(class_name)?;

    // Rank sanity comes first, in the caller's order
    for (talent, ranks) in allocation.iter() {
        if ranks <= 0 {
            return Err(GuildError::InvalidRankValue {
                talent: talent.to_string(),
                value: ranks.to_string(),
            });
        }
    }

    // Pass 1: resolve, rank and level checks, accumulate spend
    let mut resolved: Vec<(&Talent, u64)> = Vec::with_capacity(allocation.len());
    let mut points_per_tree: AHashMap<&str, u64> = AHashMap::with_capacity(class.trees().len());
    let mut total_points_spent: u64 = 0;

    for (talent_name, ranks) in allocation.iter() {
        let ranks = ranks as u64;
        let talent = resolve_talent(class, talent_name)?;

        if ranks > u64::from(talent.max_rank) {
            return Err(GuildError::RankExceedsMax {
                talent: talent.name.clone(),
                max_rank: talent.max_rank,
                requested: ranks,
            });
        }
        if level < talent.min_level {
            return Err(GuildError::LevelTooLow {
                talent: talent.name.clone(),
                required: talent.min_level,
                level,
            });
        }

        *points_per_tree.entry(talent.tree.as_str()).or_insert(0) += ranks;
        total_points_spent += ranks;
        resolved.push((talent, ranks));
    }

    let available = available_talent_points(level);
    if total_points_spent > u64::from(available) {
        return Err(GuildError::PointBudgetExceeded {
            level,
            available,
            spent: total_points_spent,
        });
    }

    // Pass 2: tier gates and prerequisites.
    // The gate compares against everything spent in the tree, the talent's own tier included.
    for &(talent, _) in &resolved {
        let required = tier_gate(talent.tier);
        let spent = points_per_tree.get(talent.tree.as_str()).copied().unwrap_or(0);
        if spent < u64::from(required) {
            return Err(GuildError::TierGateNotMet {
                talent: talent.name.clone(),
                tree: talent.tree.clone(),
                tier: talent.tier,
                required,
                spent,
            });
        }

        for prereq in &talent.prerequisites {
            match allocation.get(&prereq.talent) {
                None => {
                    return Err(GuildError::MissingPrerequisite {
                        talent: talent.name.clone(),
                        prerequisite: prereq.talent.clone(),
                        ranks: prereq.ranks,
                    })
                }
                Some(actual) if (actual as u64) < u64::from(prereq.ranks) => {
                    return Err(GuildError::PrerequisiteRankTooLow {
                        talent: talent.name.clone(),
                        prerequisite: prereq.talent.clone(),
                        required: prereq.ranks,
                        actual: actual as u64,
                    })
                }
                Some(_) => {}
            }
        }
    }

    // Bounded by the budget check above
    let points_spent = total_points_spent as u32;
    let tree_points = class
        .trees()
        .iter()
        .map(|tree| {
            let points = points_per_tree.get(tree.name.as_str()).copied().unwrap_or(0);
            (tree.name.clone(), points as u32)
        })
        .collect();
    let talents = resolved
        .into_iter()
        .map(|(talent, ranks)| ChosenTalent {
            name: talent.name.clone(),
            tree: talent.tree.clone(),
            tier: talent.tier,
            ranks: ranks as u32,
        })
        .collect();

    Ok(BuildSummary {
        class_name: class.class.clone(),
        level,
        points_available: available,
        points_spent,
        tree_points,
        talents,
    })
}

#[inline]
fn resolve_talent<'a>(class: &'a ClassTrees, name: &str) -> Result<&'a Talent> {
    class
        .find_talent(name)
        .ok_or_else(|| GuildError::UnknownTalent {
            talent: name.to_string(),
            class: class.class.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures;

    fn alloc(entries: &[(&str, i64)]) -> Allocation {
        entries.iter().map(|&(name, ranks)| (name, ranks)).collect()
    }

    #[test]
    fn test_available_points() {
        assert_eq!(available_talent_points(0), 0);
        assert_eq!(available_talent_points(9), 0);
        assert_eq!(available_talent_points(10), 1);
        assert_eq!(available_talent_points(60), 51);
    }

    #[test]
    fn test_tier_gate() {
        assert_eq!(tier_gate(1), 0);
        assert_eq!(tier_gate(2), 5);
        assert_eq!(tier_gate(7), 30);
    }

    #[test]
    fn test_valid_build_summary() {
        let catalog = fixtures::catalog();
        let allocation = alloc(&[("Improved Heroic Strike", 3), ("Deflection", 2), ("Cruelty", 5)]);

        let summary = validate_build(&catalog, "Warrior", 20, &allocation).unwrap();
        assert_eq!(summary.points_available, 11);
        assert_eq!(summary.points_spent, 10);
        assert_eq!(summary.points_remaining(), 1);
        assert_eq!(summary.distribution(), "5/5/0");
        assert_eq!(summary.talents.len(), 3);
        assert_eq!(summary.talents[2].tree, "Fury");
    }

    #[test]
    fn test_unknown_class() {
        let catalog = fixtures::catalog();
        let err = validate_build(&catalog, "Bard", 60, &Allocation::new()).unwrap_err();
        assert_eq!(err.kind(), "UnknownClassForTalents");
    }

    #[test]
    fn test_unknown_talent() {
        let catalog = fixtures::catalog();
        let err = validate_build(&catalog, "Warrior", 60, &alloc(&[("Furor", 1)])).unwrap_err();
        assert_eq!(
            err,
            GuildError::UnknownTalent {
                talent: "Furor".to_string(),
                class: "Warrior".to_string()
            }
        );
    }

    #[test]
    fn test_non_positive_rank_reported_before_unknown_talent() {
        let catalog = fixtures::catalog();
        let err = validate_build(&catalog, "Warrior", 60, &alloc(&[("Furor", 1), ("Cruelty", 0)]))
            .unwrap_err();
        assert_eq!(err.kind(), "InvalidRankValue");
    }

    #[test]
    fn test_rank_exceeds_max() {
        let catalog = fixtures::catalog();
        let err = validate_build(&catalog, "Warrior", 20, &alloc(&[("Improved Heroic Strike", 4)]))
            .unwrap_err();
        assert_eq!(
            err,
            GuildError::RankExceedsMax {
                talent: "Improved Heroic Strike".to_string(),
                max_rank: 3,
                requested: 4
            }
        );
    }

    #[test]
    fn test_huge_rank_exceeds_max() {
        let catalog = fixtures::catalog();
        let allocation = crate::talent::parse_allocation(r#"{"Cruelty": 18446744073709551615}"#)
            .unwrap();
        let err = validate_build(&catalog, "Warrior", 60, &allocation).unwrap_err();
        assert_eq!(err.kind(), "RankExceedsMax");
    }

    #[test]
    fn test_level_too_low() {
        let catalog = fixtures::catalog();
        let allocation = alloc(&[("Deflection", 5), ("Improved Overpower", 1)]);
        let err = validate_build(&catalog, "Warrior", 19, &allocation).unwrap_err();
        assert_eq!(
            err,
            GuildError::LevelTooLow {
                talent: "Improved Overpower".to_string(),
                required: 20,
                level: 19
            }
        );
    }

    #[test]
    fn test_point_budget_exceeded() {
        let catalog = fixtures::catalog();
        let allocation = alloc(&[("Deflection", 5), ("Cruelty", 5), ("Anticipation", 2)]);
        let err = validate_build(&catalog, "Warrior", 20, &allocation).unwrap_err();
        assert_eq!(
            err,
            GuildError::PointBudgetExceeded {
                level: 20,
                available: 11,
                spent: 12
            }
        );
    }

    #[test]
    fn test_tier_gate_not_met() {
        let catalog = fixtures::catalog();
        let allocation = alloc(&[("Deflection", 2), ("Improved Charge", 2)]);
        let err = validate_build(&catalog, "Warrior", 30, &allocation).unwrap_err();
        assert_eq!(
            err,
            GuildError::TierGateNotMet {
                talent: "Improved Charge".to_string(),
                tree: "Arms".to_string(),
                tier: 2,
                required: 5,
                spent: 4
            }
        );
    }

    #[test]
    fn test_tier_gate_counts_points_in_other_trees_separately() {
        let catalog = fixtures::catalog();
        // Fury points do not open Arms tier 2
        let allocation = alloc(&[("Cruelty", 5), ("Deflection", 3), ("Improved Charge", 1)]);
        let err = validate_build(&catalog, "Warrior", 30, &allocation).unwrap_err();
        assert_eq!(err.kind(), "TierGateNotMet");
    }

    #[test]
    fn test_tier_gate_includes_own_tier() {
        let catalog = fixtures::catalog();
        // Five points in a tier 2 talent alone satisfy its own gate
        let allocation = alloc(&[("Tactical Mastery", 5)]);
        assert!(validate_build(&catalog, "Warrior", 20, &allocation).is_ok());

        // Four tier 1 points plus one tier 2 point reach the gate as well
        let allocation = alloc(&[("Deflection", 4), ("Improved Charge", 1)]);
        assert!(validate_build(&catalog, "Warrior", 20, &allocation).is_ok());
    }

    #[test]
    fn test_prerequisite_chain() {
        let catalog = fixtures::catalog();

        let missing = alloc(&[("Tactical Mastery", 5), ("Deflection", 5), ("Deep Wounds", 3)]);
        let err = validate_build(&catalog, "Warrior", 30, &missing).unwrap_err();
        assert_eq!(
            err,
            GuildError::MissingPrerequisite {
                talent: "Deep Wounds".to_string(),
                prerequisite: "Improved Rend".to_string(),
                ranks: 3
            }
        );

        let too_low = alloc(&[
            ("Tactical Mastery", 5),
            ("Deflection", 4),
            ("Improved Rend", 1),
            ("Deep Wounds", 3),
        ]);
        let err = validate_build(&catalog, "Warrior", 30, &too_low).unwrap_err();
        assert_eq!(
            err,
            GuildError::PrerequisiteRankTooLow {
                talent: "Deep Wounds".to_string(),
                prerequisite: "Improved Rend".to_string(),
                required: 3,
                actual: 1
            }
        );

        let ok = alloc(&[
            ("Tactical Mastery", 5),
            ("Deflection", 2),
            ("Improved Rend", 3),
            ("Deep Wounds", 3),
        ]);
        assert!(validate_build(&catalog, "Warrior", 30, &ok).is_ok());
    }

    #[test]
    fn test_deep_arms_build() {
        let catalog = fixtures::catalog();
        let allocation = alloc(&[
            ("Improved Heroic Strike", 3),
            ("Deflection", 5),
            ("Improved Rend", 3),
            ("Tactical Mastery", 5),
            ("Improved Overpower", 2),
            ("Anger Management", 1),
            ("Deep Wounds", 3),
            ("Two-Handed Weapon Specialization", 5),
            ("Impale", 2),
            ("Sweeping Strikes", 1),
            ("Mortal Strike", 1),
            ("Cruelty", 5),
        ]);

        let summary = validate_build(&catalog, "Warrior", 60, &allocation).unwrap();
        assert_eq!(summary.points_spent, 36);
        assert_eq!(summary.distribution(), "31/5/0");
    }

    #[test]
    fn test_mortal_strike_needs_thirty_arms_points() {
        let catalog = fixtures::catalog();
        let allocation = alloc(&[
            ("Improved Heroic Strike", 3),
            ("Deflection", 5),
            ("Improved Rend", 3),
            ("Tactical Mastery", 5),
            ("Deep Wounds", 3),
            ("Two-Handed Weapon Specialization", 5),
            ("Impale", 2),
            ("Sweeping Strikes", 1),
            ("Mortal Strike", 1),
        ]);
        let err = validate_build(&catalog, "Warrior", 60, &allocation).unwrap_err();
        assert_eq!(
            err,
            GuildError::TierGateNotMet {
                talent: "Mortal Strike".to_string(),
                tree: "Arms".to_string(),
                tier: 7,
                required: 30,
                spent: 28
            }
        );
    }
}
