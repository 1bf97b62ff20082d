//! Talent allocation input and its parse stage

use crate::error::{GuildError, Result};
use ahash::AHashMap;
use serde_json::Value;

/// Ordered talent name -> ranks map, as supplied by the caller
///
/// Ranks are kept signed so that zero or negative input reaches the
/// validator and is reported as `InvalidRankValue` rather than lost.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allocation {
    entries: Vec<(String, i64)>,
    index: AHashMap<String, usize>,
}

impl Allocation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ranks for a talent; a repeated name keeps its first position
    pub fn insert(&mut self, talent: impl Into<String>, ranks: i64) {
        let talent = talent.into();
        match self.index.get(&talent) {
            Some(&i) => self.entries[i].1 = ranks,
            None => {
                self.index.insert(talent.clone(), self.entries.len());
                self.entries.push((talent, ranks));
            }
        }
    }

    pub fn get(&self, talent: &str) -> Option<i64> {
        self.index.get(talent).map(|&i| self.entries[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.entries.iter().map(|(name, ranks)| (name.as_str(), *ranks))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, i64)> for Allocation {
    fn from_iter<I: IntoIterator<Item = (S, i64)>>(iter: I) -> Self {
        let mut allocation = Allocation::new();
        for (talent, ranks) in iter {
            allocation.insert(talent, ranks);
        }
        allocation
    }
}

/// Parse the free-text JSON a chat command receives, e.g.
/// `{"Deflection": 5, "Tactical Mastery": 3}`
pub fn parse_allocation(text: &str) -> Result<Allocation> {
    let value: Value = serde_json::from_str(text.trim())
        .map_err(|e| GuildError::MalformedAllocation(e.to_string()))?;

    let object = match value {
        Value::Object(object) => object,
        other => {
            return Err(GuildError::MalformedAllocation(format!(
                "expected an object, got {}",
                json_type_name(&other)
            )))
        }
    };

    let mut allocation = Allocation::new();
    for (talent, ranks) in object {
        // Integers past i64::MAX saturate so they still read as an oversized rank
        let ranks = ranks
            .as_i64()
            .or_else(|| ranks.as_u64().map(|_| i64::MAX))
            .ok_or_else(|| GuildError::InvalidRankValue {
                talent: talent.clone(),
                value: ranks.to_string(),
            })?;
        allocation.insert(talent, ranks);
    }

    Ok(allocation)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
