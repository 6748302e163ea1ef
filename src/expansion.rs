use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// User-controlled overrides on top of the default window. Anything not
/// listed here stays collapsed. The engine only ever reads this; callers
/// toggle it and rebuild.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExpansionState {
    pub expanded_primary_buckets: BTreeSet<usize>,
    pub expanded_secondary_groups: BTreeSet<String>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips the bucket keyed by its start index.
    pub fn toggle_bucket(&mut self, start_index: usize) {
        if !self.expanded_primary_buckets.remove(&start_index) {
            self.expanded_primary_buckets.insert(start_index);
        }
    }

    /// Flips the group keyed by its secondary node id.
    pub fn toggle_group(&mut self, node_id: &str) {
        if !self.expanded_secondary_groups.remove(node_id) {
            self.expanded_secondary_groups.insert(node_id.to_string());
        }
    }

    pub fn is_bucket_expanded(&self, start_index: usize) -> bool {
        self.expanded_primary_buckets.contains(&start_index)
    }

    pub fn is_group_expanded(&self, node_id: &str) -> bool {
        self.expanded_secondary_groups.contains(node_id)
    }
}
