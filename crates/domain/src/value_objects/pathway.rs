//! Pathway - the user's in-progress combination of tags, plot blocks and
//! free-form selections that rules are evaluated against.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::FandomId;

/// Snapshot of a pathway for one validation pass.
///
/// Tags and plot blocks are sets, so duplicates in the incoming JSON arrays
/// collapse and counts are exact cardinalities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pathway {
    pub fandom_id: FandomId,
    #[serde(default)]
    pub tags: HashSet<String>,
    #[serde(default)]
    pub plot_blocks: HashSet<String>,
    /// Free-form user choices keyed by selection name.
    #[serde(default)]
    pub selections: HashMap<String, Value>,
}

impl Pathway {
    pub fn new(fandom_id: FandomId) -> Self {
        Self {
            fandom_id,
            tags: HashSet::new(),
            plot_blocks: HashSet::new(),
            selections: HashMap::new(),
        }
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_plot_blocks(
        mut self,
        plot_blocks: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.plot_blocks = plot_blocks.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_selection(mut self, key: impl Into<String>, value: Value) -> Self {
        self.selections.insert(key.into(), value);
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn has_plot_block(&self, plot_block: &str) -> bool {
        self.plot_blocks.contains(plot_block)
    }

    pub fn selection(&self, key: &str) -> Option<&Value> {
        self.selections.get(key)
    }

    /// Number of tags plus plot blocks; the figure callers cap before
    /// validating.
    pub fn item_count(&self) -> usize {
        self.tags.len() + self.plot_blocks.len()
    }
}
