//! Session settings state and the exported document.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use crate::catalog::ParamKind;
use crate::overrides::OverrideTracker;
use crate::value::Value;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Unknown parameter '{0}'")]
    UnknownParameter(String),
    #[error("Parameter '{key}' holds {expected} values, got {found}")]
    KindMismatch {
        key: String,
        expected: ParamKind,
        found: &'static str,
    },
    #[error("Invalid value '{raw}' for '{key}': {reason}")]
    InvalidValue {
        key: String,
        raw: String,
        reason: String,
    },
    #[error("Malformed event '{0}', expected key=value")]
    MalformedEvent(String),
    #[error("Failed to read document: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse document JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// General settings
// ---------------------------------------------------------------------------

/// Instruction set the core is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Isa {
    #[serde(rename = "RISCV")]
    Riscv,
    #[serde(rename = "MIPSI")]
    MipsI,
    #[serde(rename = "POWER")]
    Power,
    #[serde(rename = "DUMMY")]
    Dummy,
}

impl Isa {
    pub fn as_str(self) -> &'static str {
        match self {
            Isa::Riscv => "RISCV",
            Isa::MipsI => "MIPSI",
            Isa::Power => "POWER",
            Isa::Dummy => "DUMMY",
        }
    }
}

impl fmt::Display for Isa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Isa {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "RISCV" | "RISC-V" => Ok(Isa::Riscv),
            "MIPSI" | "MIPS" => Ok(Isa::MipsI),
            "POWER" => Ok(Isa::Power),
            "DUMMY" => Ok(Isa::Dummy),
            _ => Err(format!("unknown ISA '{s}', expected RISCV, MIPSI, POWER or DUMMY")),
        }
    }
}

/// Top-level selections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isa: Option<Isa>,
}

// ---------------------------------------------------------------------------
// Pipeline settings
// ---------------------------------------------------------------------------

/// Parameter key → current value, user-set or derived.
///
/// Cleared fields are removed, never stored as a placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PipelineSettings(BTreeMap<String, Value>);

impl PipelineSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Integer value of `key`, if present and an integer.
    pub fn int(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(Value::as_int)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for PipelineSettings {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// Full session state.
///
/// Never mutated in place by the session: each edit produces a new
/// document that replaces the old one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsDocument {
    pub general: GeneralSettings,
    pub pipeline: PipelineSettings,
    pub overridden: OverrideTracker,
    /// Depth whose preset was last applied to `pipeline`.
    pub applied_depth: Option<u32>,
}

impl SettingsDocument {
    pub fn to_document(&self) -> Document {
        Document {
            general: self.general.clone(),
            pipeline: self.pipeline.clone(),
        }
    }
}

impl From<Document> for SettingsDocument {
    /// Adopt an exported document. Override history is not part of the
    /// export, so none is recorded; its depth counts as already applied.
    fn from(doc: Document) -> Self {
        Self {
            applied_depth: doc.general.depth,
            general: doc.general,
            pipeline: doc.pipeline,
            overridden: OverrideTracker::default(),
        }
    }
}

/// The `{general, pipeline}` mapping handed to the macro translator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub general: GeneralSettings,
    pub pipeline: PipelineSettings,
}

impl Document {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_json_is_flat() {
        let doc = Document {
            general: GeneralSettings { depth: Some(4), isa: Some(Isa::Riscv) },
            pipeline: [("execute_stage", Value::Int(2)), ("branch_pred", Value::from("two_bit"))]
                .into_iter()
                .collect(),
        };
        let json: serde_json::Value = serde_json::from_str(&doc.to_json_pretty().unwrap()).unwrap();
        assert_eq!(json["general"]["depth"], 4);
        assert_eq!(json["general"]["isa"], "RISCV");
        assert_eq!(json["pipeline"]["execute_stage"], 2);
        assert_eq!(json["pipeline"]["branch_pred"], "two_bit");
    }

    #[test]
    fn absent_general_fields_are_omitted() {
        let json = serde_json::to_string(&GeneralSettings::default()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn isa_from_str() {
        assert_eq!("riscv".parse::<Isa>().unwrap(), Isa::Riscv);
        assert_eq!("MIPS".parse::<Isa>().unwrap(), Isa::MipsI);
        assert!("x86".parse::<Isa>().is_err());
    }

    #[test]
    fn adopted_document_counts_depth_as_applied() {
        let doc = Document {
            general: GeneralSettings { depth: Some(6), isa: None },
            pipeline: PipelineSettings::new(),
        };
        let state = SettingsDocument::from(doc);
        assert_eq!(state.applied_depth, Some(6));
        assert!(state.overridden.is_empty());
    }
}
