//! Talent configuration structures

use serde::Deserialize;
use smallvec::SmallVec;

/// Highest tier a talent tree has
pub const MAX_TIER: u8 = 7;

/// Talent configuration as delivered by the catalog sync
#[derive(Debug, Clone, Deserialize)]
pub struct TalentConfig {
    pub tier: u8,
    pub max_rank: u32,
    /// Falls back to the level at which the talent's tier opens
    #[serde(default)]
    pub min_level: Option<u32>,
    #[serde(default)]
    pub prerequisites: SmallVec<[PrerequisiteConfig; 2]>,
}

impl TalentConfig {
    pub fn new(tier: u8, max_rank: u32, min_level: u32) -> Self {
        Self {
            tier,
            max_rank,
            min_level: Some(min_level),
            prerequisites: SmallVec::new(),
        }
    }

    pub fn with_prerequisite(mut self, talent: &str, ranks: u32) -> Self {
        self.prerequisites.push(PrerequisiteConfig {
            talent: talent.to_string(),
            ranks,
        });
        self
    }

    /// Minimum character level, defaulting to 10 for tier 1 and five more per tier
    pub fn resolved_min_level(&self) -> u32 {
        self.min_level
            .unwrap_or_else(|| 10 + 5 * u32::from(self.tier.saturating_sub(1)))
    }
}

/// Prerequisite talent and the ranks it needs
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PrerequisiteConfig {
    pub talent: String,
    pub ranks: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_defaults() {
        let config: TalentConfig =
            serde_json::from_str(r#"{"tier": 3, "max_rank": 2}"#).unwrap();
        assert_eq!(config.tier, 3);
        assert_eq!(config.max_rank, 2);
        assert!(config.prerequisites.is_empty());
        assert_eq!(config.resolved_min_level(), 20);
    }

    #[test]
    fn test_deserialize_prerequisites() {
        let config: TalentConfig = serde_json::from_str(
            r#"{"tier": 3, "max_rank": 3, "min_level": 20,
                "prerequisites": [{"talent": "Improved Rend", "ranks": 3}]}"#,
        )
        .unwrap();
        assert_eq!(config.resolved_min_level(), 20);
        assert_eq!(
            config.prerequisites.as_slice(),
            &[PrerequisiteConfig {
                talent: "Improved Rend".to_string(),
                ranks: 3
            }]
        );
    }
}
