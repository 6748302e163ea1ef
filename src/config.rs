use crate::hierarchy::HierarchyConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Per-tier budgets. `0` means the tier never expands automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowConfig {
    pub visible_primary_tier_count: usize,
    pub secondary_tier_budget: usize,
    pub tactical_budget: usize,
    /// Splits the hidden primary run into fixed-stride buckets so each
    /// chunk can be expanded on its own. Unset or `0` keeps one bucket.
    /// Adjacent collapsed chunks are not merged into one maximal run, so a
    /// chunk keeps its start key whatever else is expanded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_bucket_size: Option<usize>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            visible_primary_tier_count: 3,
            secondary_tier_budget: 5,
            tactical_budget: 8,
            primary_bucket_size: None,
        }
    }
}

impl WindowConfig {
    pub fn new(visible_primary: usize, secondary_budget: usize, tactical_budget: usize) -> Self {
        Self {
            visible_primary_tier_count: visible_primary,
            secondary_tier_budget: secondary_budget,
            tactical_budget,
            primary_bucket_size: None,
        }
    }

    pub fn bucket_size(&self) -> Option<usize> {
        self.primary_bucket_size.filter(|size| *size > 0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub hierarchy: HierarchyConfig,
    pub window: WindowConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct HierarchyConfigFile {
    types: Option<BTreeMap<String, i32>>,
    #[serde(alias = "strategic_types")]
    strategic_types: Option<Vec<String>>,
    #[serde(alias = "label_associations")]
    label_associations: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct WindowConfigFile {
    #[serde(alias = "visible_primary_tier_count")]
    visible_primary_tier_count: Option<usize>,
    #[serde(alias = "secondary_tier_budget")]
    secondary_tier_budget: Option<usize>,
    #[serde(alias = "tactical_budget")]
    tactical_budget: Option<usize>,
    #[serde(alias = "primary_bucket_size")]
    primary_bucket_size: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    #[serde(alias = "type_hierarchy")]
    type_hierarchy: Option<HierarchyConfigFile>,
    window: Option<WindowConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parses a JSON5 config document and overlays it on the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = json5::from_str(contents)?;

    if let Some(file) = parsed.type_hierarchy {
        config.hierarchy = hierarchy_from_file(file);
    }

    if let Some(window) = parsed.window {
        if let Some(v) = window.visible_primary_tier_count {
            config.window.visible_primary_tier_count = v;
        }
        if let Some(v) = window.secondary_tier_budget {
            config.window.secondary_tier_budget = v;
        }
        if let Some(v) = window.tactical_budget {
            config.window.tactical_budget = v;
        }
        if let Some(v) = window.primary_bucket_size {
            config.window.primary_bucket_size = Some(v);
        }
    }

    Ok(config)
}

fn hierarchy_from_file(file: HierarchyConfigFile) -> HierarchyConfig {
    let (hierarchy, derived_from_list) = match (file.types, file.strategic_types.as_deref()) {
        (Some(types), _) => (HierarchyConfig::new(types), false),
        (None, Some(list)) => (HierarchyConfig::from_strategic_types(list), true),
        (None, None) => (HierarchyConfig::empty(), false),
    };
    let associations = match file.label_associations {
        Some(associations) => associations,
        // Strategic types identify themselves with their own namespace.
        None if derived_from_list => hierarchy
            .types
            .keys()
            .map(|name| (name.clone(), name.clone()))
            .collect(),
        None => BTreeMap::new(),
    };
    hierarchy.with_label_associations(associations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_yields_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.hierarchy.types.len(), 4);
    }

    #[test]
    fn overlays_window_fields_individually() {
        let config = parse_config(
            r#"{
                // only override what is given
                window: { tacticalBudget: 2, primaryBucketSize: 4 },
            }"#,
        )
        .unwrap();
        assert_eq!(config.window.tactical_budget, 2);
        assert_eq!(config.window.bucket_size(), Some(4));
        assert_eq!(
            config.window.visible_primary_tier_count,
            WindowConfig::default().visible_primary_tier_count
        );
        assert_eq!(config.hierarchy, HierarchyConfig::default());
    }

    #[test]
    fn derives_types_from_backend_strategic_list() {
        let config = parse_config(
            r#"{"type_hierarchy": {"strategic_types": ["release", "feature"]}}"#,
        )
        .unwrap();
        assert_eq!(config.hierarchy.types.get("release"), Some(&1));
        assert_eq!(config.hierarchy.types.get("feature"), Some(&2));
        assert_eq!(
            config.hierarchy.label_associations.get("feature").map(String::as_str),
            Some("feature")
        );
    }

    #[test]
    fn explicit_types_take_precedence_over_list() {
        let config = parse_config(
            r#"{
                typeHierarchy: {
                    types: { goal: 1, task: 5 },
                    strategicTypes: ["ignored"],
                    labelAssociations: { goal: "goal" },
                },
            }"#,
        )
        .unwrap();
        assert_eq!(config.hierarchy.types.len(), 2);
        assert_eq!(config.hierarchy.types.get("task"), Some(&5));
        assert!(!config.hierarchy.types.contains_key("ignored"));
    }

    #[test]
    fn mixed_case_type_keys_are_normalized() {
        let config = parse_config(
            r#"{
                typeHierarchy: {
                    types: { Milestone: 1, " Epic ": 2 },
                    labelAssociations: { Epic: "epic" },
                },
            }"#,
        )
        .unwrap();
        assert_eq!(config.hierarchy.types.get("milestone"), Some(&1));
        assert_eq!(config.hierarchy.types.get("epic"), Some(&2));
        assert_eq!(
            config.hierarchy.label_associations.get("epic").map(String::as_str),
            Some("epic")
        );
    }

    #[test]
    fn empty_hierarchy_section_is_kept_empty() {
        let config = parse_config(r#"{ typeHierarchy: {} }"#).unwrap();
        assert!(config.hierarchy.types.is_empty());
    }

    #[test]
    fn zero_bucket_size_means_single_bucket() {
        let mut window = WindowConfig::default();
        window.primary_bucket_size = Some(0);
        assert_eq!(window.bucket_size(), None);
    }
}
