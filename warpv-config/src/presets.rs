//! Pipeline-depth presets.
//!
//! Choosing a pipeline depth in the general settings fills in every stage
//! assignment, the load-return alignment, any hazard bubbles the depth
//! needs, and the branch predictor. Only depths 1, 2, 4 and 6 have a
//! preset; any other depth derives nothing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::config::ConfigError;
use crate::value::Value;

/// Depths that may carry a preset.
pub const SUPPORTED_DEPTHS: [u32; 4] = [1, 2, 4, 6];

/// Settings key the preset's branch predictor is written to.
pub const BRANCH_PRED_KEY: &str = "branch_pred";

/// Branch prediction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchPredictor {
    Fallthrough,
    TwoBit,
    Ideal,
}

impl BranchPredictor {
    pub fn as_str(self) -> &'static str {
        match self {
            BranchPredictor::Fallthrough => "fallthrough",
            BranchPredictor::TwoBit => "two_bit",
            BranchPredictor::Ideal => "ideal",
        }
    }
}

impl fmt::Display for BranchPredictor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default values derived from one pipeline depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthPreset {
    pub depth: u32,
    /// Stage key → pipeline slot.
    pub stages: BTreeMap<String, i64>,
    pub branch_pred: BranchPredictor,
    /// Depth-specific auxiliary values (`ld_return_align`, hazard bubbles).
    #[serde(default)]
    pub extra: BTreeMap<String, i64>,
}

impl DepthPreset {
    /// Every key/value this preset derives: stages, extras and the predictor.
    pub fn values(&self) -> BTreeMap<String, Value> {
        let mut values: BTreeMap<String, Value> = self
            .stages
            .iter()
            .chain(self.extra.iter())
            .map(|(k, v)| (k.clone(), Value::Int(*v)))
            .collect();
        values.insert(BRANCH_PRED_KEY.to_string(), Value::from(self.branch_pred.as_str()));
        values
    }

    /// Whether this preset derives a value for `key`.
    pub fn sets(&self, key: &str) -> bool {
        key == BRANCH_PRED_KEY || self.stages.contains_key(key) || self.extra.contains_key(key)
    }

    /// The value this preset derives for `key`, if any.
    pub fn value_of(&self, key: &str) -> Option<Value> {
        if key == BRANCH_PRED_KEY {
            return Some(Value::from(self.branch_pred.as_str()));
        }
        self.stages
            .get(key)
            .or_else(|| self.extra.get(key))
            .map(|v| Value::Int(*v))
    }
}

/// Lookup from depth to preset.
#[derive(Debug, Clone, Default)]
pub struct PresetTable {
    presets: BTreeMap<u32, DepthPreset>,
}

impl PresetTable {
    /// Build a table, rejecting unsupported or repeated depths.
    pub fn new(presets: Vec<DepthPreset>) -> Result<Self, ConfigError> {
        let mut table = BTreeMap::new();
        for preset in presets {
            if !SUPPORTED_DEPTHS.contains(&preset.depth) {
                return Err(ConfigError::UnsupportedPresetDepth(preset.depth));
            }
            let depth = preset.depth;
            if table.insert(depth, preset).is_some() {
                return Err(ConfigError::DuplicatePreset(depth));
            }
        }
        Ok(Self { presets: table })
    }

    /// The WARP-V presets for depths 1, 2, 4 and 6.
    pub fn builtin() -> Self {
        let presets = builtin_presets()
            .into_iter()
            .map(|p| (p.depth, p))
            .collect();
        Self { presets }
    }

    pub fn preset_for(&self, depth: u32) -> Option<&DepthPreset> {
        self.presets.get(&depth)
    }

    pub fn is_supported(&self, depth: u32) -> bool {
        self.presets.contains_key(&depth)
    }

    /// Whether any preset derives `key`.
    pub fn mentions(&self, key: &str) -> bool {
        self.presets.values().any(|p| p.sets(key))
    }

    pub fn depths(&self) -> impl Iterator<Item = u32> + '_ {
        self.presets.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DepthPreset> {
        self.presets.values()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

fn preset(
    depth: u32,
    slots: [i64; 9],
    branch_pred: BranchPredictor,
    extra: &[(&str, i64)],
) -> DepthPreset {
    DepthPreset {
        depth,
        stages: crate::catalog::STAGE_KEYS
            .iter()
            .zip(slots)
            .map(|(k, slot)| (k.to_string(), slot))
            .collect(),
        branch_pred,
        extra: extra.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
    }
}

// Slot order follows `catalog::STAGE_KEYS`:
// next_pc, fetch, decode, branch_pred, register_rd, execute, result, register_wr, mem_wr
fn builtin_presets() -> Vec<DepthPreset> {
    use BranchPredictor::*;
    vec![
        preset(1, [0, 0, 0, 0, 0, 0, 0, 0, 0], Fallthrough, &[("ld_return_align", 1)]),
        preset(2, [0, 0, 0, 0, 0, 1, 1, 1, 1], TwoBit, &[("ld_return_align", 2)]),
        preset(
            4,
            [0, 0, 1, 1, 1, 2, 2, 3, 3],
            TwoBit,
            &[("extra_replay_bubble", 1), ("ld_return_align", 4)],
        ),
        preset(
            6,
            [1, 1, 3, 4, 4, 5, 5, 6, 7],
            TwoBit,
            &[("extra_replay_bubble", 1), ("ld_return_align", 7)],
        ),
    ]
}
