//! Settings reconciler.
//!
//! Two operations produce new pipeline settings from old ones:
//!
//! - [`apply_depth_defaults`] writes a depth preset over every key the
//!   user has not overridden.
//! - [`update_field`] applies one direct edit and keeps the override set
//!   in step with it.
//!
//! Both take their inputs by reference and return fresh values; nothing
//! is mutated in place.
//!
//! Clearing an override does not re-derive the field. The preset value
//! comes back on the next depth change, not before.

use std::collections::BTreeMap;
use tracing::debug;

use crate::catalog::{is_stage_key, Catalog};
use crate::overrides::OverrideTracker;
use crate::presets::PresetTable;
use crate::settings::{PipelineSettings, SettingsError};
use crate::value::Value;

/// Values the preset for `depth` derives. Empty for unsupported depths.
pub fn depth_defaults(presets: &PresetTable, depth: u32) -> BTreeMap<String, Value> {
    presets
        .preset_for(depth)
        .map(|p| p.values())
        .unwrap_or_default()
}

/// Apply the preset for `depth` to every non-overridden key it derives.
///
/// Unsupported depths return `settings` unchanged. Reapplying with the
/// same overrides and depth yields the same result.
pub fn apply_depth_defaults(
    presets: &PresetTable,
    settings: &PipelineSettings,
    overrides: &OverrideTracker,
    depth: u32,
) -> PipelineSettings {
    let defaults = depth_defaults(presets, depth);
    let mut next = settings.clone();
    if defaults.is_empty() {
        return next;
    }

    let mut applied = 0usize;
    for (key, value) in defaults {
        if overrides.is_overridden(&key) {
            debug!(%key, depth, "keeping user override");
            continue;
        }
        next.insert(key, value);
        applied += 1;
    }
    debug!(depth, applied, skipped = overrides.len(), "applied depth defaults");
    next
}

/// Apply one direct edit.
///
/// `value` of `None`, or a blank value (`false`, empty text), clears the
/// field: the key is removed and, if stage-like, its override forgotten.
/// Anything else is stored and, for stage-like keys, recorded as an
/// override.
///
/// First-time entry into an integer field with a non-zero default stores
/// `value + default`: the form treats that first entry as an offset from
/// the default shown as its placeholder.
pub fn update_field(
    catalog: &Catalog,
    settings: &PipelineSettings,
    overrides: &OverrideTracker,
    key: &str,
    value: Option<Value>,
) -> Result<(PipelineSettings, OverrideTracker), SettingsError> {
    let param = catalog
        .lookup(key)
        .ok_or_else(|| SettingsError::UnknownParameter(key.to_string()))?;

    let mut next = settings.clone();
    let mut next_overrides = overrides.clone();

    let value = match value {
        Some(v) if !v.is_blank() => v,
        _ => {
            next.remove(key);
            if is_stage_key(key) {
                next_overrides.clear_override(key);
            }
            debug!(%key, "cleared field");
            return Ok((next, next_overrides));
        }
    };

    if !value.matches_kind(param.kind) {
        return Err(SettingsError::KindMismatch {
            key: key.to_string(),
            expected: param.kind,
            found: value.type_name(),
        });
    }

    next_overrides.mark_overridden(key);

    let value = match (&value, param.entry_offset()) {
        (Value::Int(n), Some(offset)) if !settings.contains(key) => {
            debug!(%key, entered = n, offset, "offsetting first entry by default");
            let sum = n.checked_add(offset).ok_or_else(|| SettingsError::InvalidValue {
                key: key.to_string(),
                raw: n.to_string(),
                reason: format!("out of range once offset by the default of {offset}"),
            })?;
            Value::Int(sum)
        }
        _ => value,
    };
    debug!(%key, %value, "updated field");
    next.insert(key, value);
    Ok((next, next_overrides))
}
