//! Tracks which stage assignments the user has set explicitly.
//!
//! A depth change rewrites every derived stage value but must leave the
//! user's own choices alone. The tracker only records keys; it never
//! touches the settings map.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::catalog::is_stage_key;

/// Set of stage-like keys the user has overridden.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverrideTracker {
    keys: BTreeSet<String>,
}

impl OverrideTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `key` as user-set.
    ///
    /// Returns `true` if the key was newly recorded. Keys that are not
    /// stage-like are ignored.
    pub fn mark_overridden(&mut self, key: &str) -> bool {
        if !is_stage_key(key) || self.keys.contains(key) {
            return false;
        }
        self.keys.insert(key.to_string())
    }

    /// Forget an override. Returns `true` if it was present.
    pub fn clear_override(&mut self, key: &str) -> bool {
        self.keys.remove(key)
    }

    pub fn is_overridden(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
