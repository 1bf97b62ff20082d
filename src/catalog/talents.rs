//! Talent catalog: class -> tree -> talent

use crate::config::{PrerequisiteConfig, TalentConfig, MAX_TIER};
use crate::error::{GuildError, Result};
use ahash::{AHashMap, AHashSet};
use smallvec::SmallVec;

/// One purchasable node of a talent tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Talent {
    pub name: String,
    pub tree: String,
    pub tier: u8,
    pub max_rank: u32,
    pub min_level: u32,
    pub prerequisites: SmallVec<[PrerequisiteConfig; 2]>,
}

/// Named tree of talents, in declaration order
#[derive(Debug, Clone, Default)]
pub struct TalentTree {
    pub name: String,
    talents: Vec<Talent>,
    index: AHashMap<String, usize>,
}

impl TalentTree {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn get(&self, talent: &str) -> Option<&Talent> {
        self.index.get(talent).map(|&i| &self.talents[i])
    }

    pub fn talents(&self) -> &[Talent] {
        &self.talents
    }

    fn upsert(&mut self, talent: Talent) {
        match self.index.get(&talent.name) {
            Some(&i) => self.talents[i] = talent,
            None => {
                self.index.insert(talent.name.clone(), self.talents.len());
                self.talents.push(talent);
            }
        }
    }
}

/// All talent trees of one class
#[derive(Debug, Clone, Default)]
pub struct ClassTrees {
    pub class: String,
    trees: Vec<TalentTree>,
}

impl ClassTrees {
    pub fn trees(&self) -> &[TalentTree] {
        &self.trees
    }

    pub fn tree_names(&self) -> Vec<&str> {
        self.trees.iter().map(|t| t.name.as_str()).collect()
    }

    /// Find a talent by name across every tree; the first tree in declaration order wins
    #[inline]
    pub fn find_talent(&self, name: &str) -> Option<&Talent> {
        self.trees.iter().find_map(|tree| tree.get(name))
    }

    pub fn tree_of(&self, name: &str) -> Option<&str> {
        self.find_talent(name).map(|t| t.tree.as_str())
    }

    pub fn talent_count(&self) -> usize {
        self.trees.iter().map(|t| t.talents.len()).sum()
    }

    fn tree_mut(&mut self, tree: &str) -> &mut TalentTree {
        let pos = match self.trees.iter().position(|t| t.name == tree) {
            Some(pos) => pos,
            None => {
                self.trees.push(TalentTree::new(tree));
                self.trees.len() - 1
            }
        };
        &mut self.trees[pos]
    }
}

/// Read-only talent data for every class
#[derive(Debug, Clone, Default)]
pub struct TalentCatalog {
    classes: AHashMap<String, ClassTrees>,
    order: Vec<String>,
}

impl TalentCatalog {
    /// Get the trees registered for a class
    pub fn lookup(&self, class: &str) -> Result<&ClassTrees> {
        self.classes
            .get(class)
            .ok_or_else(|| GuildError::UnknownClassForTalents {
                class: class.to_string(),
            })
    }

    /// Class names in load order
    pub fn classes(&self) -> &[String] {
        &self.order
    }

    pub fn talent_count(&self) -> usize {
        self.classes.values().map(|c| c.talent_count()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Register a (possibly empty) tree so it keeps its position
    pub fn ensure_tree(&mut self, class: &str, tree: &str) {
        self.class_mut(class).tree_mut(tree);
    }

    /// Add a talent; a repeated name within the same tree replaces the earlier entry
    pub fn insert(&mut self, class: &str, tree: &str, name: &str, config: TalentConfig) -> Result<()> {
        if config.tier == 0 || config.tier > MAX_TIER {
            return Err(GuildError::InvalidCatalog(format!(
                "talent '{}' ({} / {}) has tier {}, expected 1..={}",
                name, class, tree, config.tier, MAX_TIER
            )));
        }
        if config.max_rank == 0 {
            return Err(GuildError::InvalidCatalog(format!(
                "talent '{}' ({} / {}) has a max rank of 0",
                name, class, tree
            )));
        }

        let min_level = config.resolved_min_level();
        let talent = Talent {
            name: name.to_string(),
            tree: tree.to_string(),
            tier: config.tier,
            max_rank: config.max_rank,
            min_level,
            prerequisites: config.prerequisites,
        };
        self.class_mut(class).tree_mut(tree).upsert(talent);
        Ok(())
    }

    /// Talents whose name appears in more than one tree of a class, as
    /// `(class, talent, tree lookups resolve to, shadowed tree)`
    pub fn name_collisions(&self) -> Vec<(&str, &str, &str, &str)> {
        let mut collisions = Vec::new();
        for class in self.order.iter().filter_map(|c| self.classes.get(c)) {
            let mut first_seen: AHashMap<&str, &str> = AHashMap::new();
            for tree in &class.trees {
                for talent in &tree.talents {
                    let first = *first_seen
                        .entry(talent.name.as_str())
                        .or_insert(tree.name.as_str());
                    if first != tree.name {
                        collisions.push((
                            class.class.as_str(),
                            talent.name.as_str(),
                            first,
                            tree.name.as_str(),
                        ));
                    }
                }
            }
        }
        collisions
    }

    /// Log catalog problems the validator tolerates but the data owner should fix
    pub fn audit(&self) {
        for (class, talent, first, shadowed) in self.name_collisions() {
            tracing::warn!(
                class,
                talent,
                "talent name appears in both {} and {}; lookups resolve to the first",
                first,
                shadowed
            );
        }

        for class in self.order.iter().filter_map(|c| self.classes.get(c)) {
            let known: AHashSet<&str> = class
                .trees
                .iter()
                .flat_map(|t| t.talents.iter().map(|talent| talent.name.as_str()))
                .collect();
            for talent in class.trees.iter().flat_map(|t| t.talents.iter()) {
                for prereq in &talent.prerequisites {
                    if !known.contains(prereq.talent.as_str()) {
                        tracing::warn!(
                            class = %class.class,
                            talent = %talent.name,
                            "prerequisite '{}' is not in the catalog",
                            prereq.talent
                        );
                    }
                }
            }
        }
    }

    fn class_mut(&mut self, class: &str) -> &mut ClassTrees {
        if !self.classes.contains_key(class) {
            self.order.push(class.to_string());
        }
        self.classes
            .entry(class.to_string())
            .or_insert_with(|| ClassTrees {
                class: class.to_string(),
                trees: Vec::new(),
            })
    }
}
