//! Expander configuration

use serde::{Deserialize, Serialize};

/// Expander behaviour switches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpanderConfig {
    /// Resolve all array elements with one batch per resolver (default: false)
    #[serde(default = "default_batch_array_items")]
    pub batch_array_items: bool,

    /// Log a warning when an expression is rejected (default: true)
    #[serde(default = "default_warn_on_invalid_filter")]
    pub warn_on_invalid_filter: bool,
}

fn default_batch_array_items() -> bool {
    false
}

fn default_warn_on_invalid_filter() -> bool {
    true
}

impl Default for ExpanderConfig {
    fn default() -> Self {
        Self {
            batch_array_items: default_batch_array_items(),
            warn_on_invalid_filter: default_warn_on_invalid_filter(),
        }
    }
}

impl ExpanderConfig {
    /// Config with cross-element batching switched on
    pub fn batched() -> Self {
        Self {
            batch_array_items: true,
            ..Default::default()
        }
    }
}
