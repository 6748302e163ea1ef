//! Type hierarchy configuration and its resolution into ordered tiers.
//!
//! A hierarchy maps issue type names to integer levels; lower levels are
//! more strategic. The resolver only relies on the ordering of levels, so
//! a hierarchy may have two tiers or six, starting at any value.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

const MAX_SUGGESTION_DISTANCE: usize = 3;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("hierarchy has no levels")]
    NoLevels,

    #[error("empty type name at level {level}")]
    EmptyTypeName { level: i32 },

    #[error("type '{type_name}' has negative level {level}")]
    NegativeLevel { type_name: String, level: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyConfig {
    pub types: BTreeMap<String, i32>,
    /// Type name to membership label namespace, e.g. `release -> milestone`.
    #[serde(default)]
    pub label_associations: BTreeMap<String, String>,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        let types = [("milestone", 1), ("epic", 2), ("story", 3), ("task", 4)]
            .into_iter()
            .map(|(name, level)| (name.to_string(), level))
            .collect();
        let label_associations = ["milestone", "epic", "story"]
            .into_iter()
            .map(|name| (name.to_string(), name.to_string()))
            .collect();
        Self {
            types,
            label_associations,
        }
    }
}

/// Type names compare trimmed and lowercased, the same way node types are
/// read from the `type` field and `type:` labels.
pub fn normalize_type_name(name: &str) -> String {
    name.trim().to_lowercase()
}

// Names that collide after normalization keep the most strategic level.
fn normalize_types(types: &BTreeMap<String, i32>) -> BTreeMap<String, i32> {
    let mut normalized: BTreeMap<String, i32> = BTreeMap::new();
    for (name, level) in types {
        normalized
            .entry(normalize_type_name(name))
            .and_modify(|current| *current = (*current).min(*level))
            .or_insert(*level);
    }
    normalized
}

impl HierarchyConfig {
    pub fn new(types: BTreeMap<String, i32>) -> Self {
        Self {
            types: normalize_types(&types),
            label_associations: BTreeMap::new(),
        }
    }

    pub fn empty() -> Self {
        Self::new(BTreeMap::new())
    }

    /// Derives levels from list position: the first entry is level 1.
    /// A name repeated later in the list keeps its first position.
    pub fn from_strategic_types<S: AsRef<str>>(strategic_types: &[S]) -> Self {
        let mut types = BTreeMap::new();
        for (idx, name) in strategic_types.iter().enumerate() {
            let name = name.as_ref().trim().to_lowercase();
            types.entry(name).or_insert(idx as i32 + 1);
        }
        Self::new(types)
    }

    pub fn with_label_associations(mut self, associations: BTreeMap<String, String>) -> Self {
        self.label_associations = associations
            .into_iter()
            .map(|(name, namespace)| (normalize_type_name(&name), namespace))
            .collect();
        self
    }

    pub fn resolve(&self) -> Result<ResolvedHierarchy, ConfigError> {
        if self.types.is_empty() {
            return Err(ConfigError::NoLevels);
        }
        // Fields are public, so names are normalized again here.
        let types = normalize_types(&self.types);
        let label_associations: BTreeMap<String, &String> = self
            .label_associations
            .iter()
            .map(|(name, namespace)| (normalize_type_name(name), namespace))
            .collect();
        let mut by_level: BTreeMap<i32, BTreeSet<String>> = BTreeMap::new();
        for (name, level) in &types {
            if name.trim().is_empty() {
                return Err(ConfigError::EmptyTypeName { level: *level });
            }
            if *level < 0 {
                return Err(ConfigError::NegativeLevel {
                    type_name: name.clone(),
                    level: *level,
                });
            }
            by_level.entry(*level).or_default().insert(name.clone());
        }

        let tiers = by_level
            .into_iter()
            .map(|(level, types)| {
                let label_namespace = types
                    .iter()
                    .filter_map(|name| label_associations.get(name).copied())
                    .min()
                    .cloned();
                TierInfo {
                    level,
                    types,
                    label_namespace,
                }
            })
            .collect::<Vec<_>>();

        Ok(ResolvedHierarchy {
            levels: tiers.iter().map(|tier| tier.level).collect(),
            tiers,
            types,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierInfo {
    pub level: i32,
    pub types: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_namespace: Option<String>,
}

/// The three window bands: the most strategic level, the next one, and
/// everything below (including the implicit level of unknown types).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierBand {
    Primary,
    Secondary,
    Tactical,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedHierarchy {
    levels: Vec<i32>,
    tiers: Vec<TierInfo>,
    types: BTreeMap<String, i32>,
}

impl ResolvedHierarchy {
    /// Degenerate single-tier hierarchy: every node is tactical.
    pub fn flat() -> Self {
        Self {
            levels: Vec::new(),
            tiers: Vec::new(),
            types: BTreeMap::new(),
        }
    }

    pub fn is_flat(&self) -> bool {
        self.levels.is_empty()
    }

    /// Distinct configured levels, ascending.
    pub fn levels(&self) -> &[i32] {
        &self.levels
    }

    pub fn tiers(&self) -> &[TierInfo] {
        &self.tiers
    }

    pub fn tier(&self, level: i32) -> Option<&TierInfo> {
        self.tiers.iter().find(|tier| tier.level == level)
    }

    pub fn contains_type(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// Level assigned to nodes whose type is missing or unconfigured.
    pub fn implicit_level(&self) -> i32 {
        self.levels
            .last()
            .map(|level| level.saturating_add(1))
            .unwrap_or(1)
    }

    pub fn level_of(&self, type_name: Option<&str>) -> i32 {
        type_name
            .and_then(|name| self.types.get(name).copied())
            .unwrap_or_else(|| self.implicit_level())
    }

    pub fn band(&self, level: i32) -> TierBand {
        match self.levels.as_slice() {
            [] => TierBand::Tactical,
            [primary, ..] if level == *primary => TierBand::Primary,
            [_, secondary, ..] if level == *secondary => TierBand::Secondary,
            _ => TierBand::Tactical,
        }
    }

    /// Closest configured type name for an unknown one, if any is within
    /// edit distance 3. Ties go to the alphabetically first name.
    pub fn suggest_type(&self, unknown: &str) -> Option<String> {
        let mut best: Option<(&str, usize)> = None;
        for name in self.types.keys() {
            let distance = levenshtein_distance(unknown, name);
            if distance > MAX_SUGGESTION_DISTANCE {
                continue;
            }
            if best.is_none_or(|(_, best_distance)| distance < best_distance) {
                best = Some((name.as_str(), distance));
            }
        }
        best.map(|(name, _)| name.to_string())
    }
}

fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            current[j + 1] = (prev[j + 1] + 1).min(current[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut current);
    }
    prev[b.len()]
}
