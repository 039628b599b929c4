//! YAML-based catalog and preset configuration.
//!
//! The built-in WARP-V parameters and depth presets can be replaced by a
//! YAML file, either passed explicitly or found at
//! `~/.config/warpv-config/catalog.yaml`.
//!
//! ```yaml
//! parameters:
//!   - key: execute_stage
//!     kind: integer
//!     label: Execute stage
//!     bounds: [0, 15]
//!     rule: bounds
//!   - key: branch_pred
//!     kind: choice
//!     label: Branch predictor
//!     choices: [fallthrough, two_bit, ideal]
//!     rule: choices
//! presets:
//!   - depth: 4
//!     stages: { execute_stage: 2 }
//!     branch_pred: two_bit
//!     extra: { ld_return_align: 4 }
//! ```
//!
//! # Programmatic Usage
//!
//! ```rust
//! use warpv_config::config::CatalogConfig;
//!
//! let (catalog, presets) = CatalogConfig::default_config().build().unwrap();
//! assert!(catalog.lookup("execute_stage").is_some());
//! assert!(presets.preset_for(4).is_some());
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::catalog::{Catalog, ParamKind, ParameterDef};
use crate::presets::{DepthPreset, PresetTable};

/// File name looked up inside [`config_dir`].
pub const USER_CATALOG_FILE: &str = "catalog.yaml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),
    #[error("Parameter '{0}' is defined more than once")]
    DuplicateKey(String),
    #[error("Default for '{key}' is not a valid {kind} value")]
    DefaultKindMismatch { key: String, kind: ParamKind },
    #[error("No preset may be defined for depth {0} (supported: 1, 2, 4, 6)")]
    UnsupportedPresetDepth(u32),
    #[error("Depth {0} has more than one preset")]
    DuplicatePreset(u32),
    #[error("Preset for depth {depth} sets unknown parameter '{key}'")]
    UnknownPresetKey { depth: u32, key: String },
}

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub parameters: Vec<ParameterDef>,
    #[serde(default)]
    pub presets: Vec<DepthPreset>,
}

impl CatalogConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Write configuration as YAML, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }

    /// The built-in WARP-V catalog and presets.
    pub fn default_config() -> Self {
        Self {
            parameters: Catalog::builtin().definitions().to_vec(),
            presets: PresetTable::builtin().iter().cloned().collect(),
        }
    }

    /// Check invariants and build the runtime tables.
    pub fn build(self) -> Result<(Catalog, PresetTable), ConfigError> {
        let catalog = Catalog::new(self.parameters)?;
        for preset in &self.presets {
            if let Some(key) = preset.values().into_keys().find(|k| !catalog.contains(k)) {
                return Err(ConfigError::UnknownPresetKey {
                    depth: preset.depth,
                    key,
                });
            }
        }
        let presets = PresetTable::new(self.presets)?;
        Ok((catalog, presets))
    }
}

/// Return the configurator's config directory: `~/.config/warpv-config/`.
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config").join("warpv-config"))
}

/// Load the user's catalog from `~/.config/warpv-config/catalog.yaml`.
///
/// A missing or empty file is not an error; it means "use the built-ins".
pub fn load_user_config() -> Result<Option<CatalogConfig>, ConfigError> {
    let Some(dir) = config_dir() else {
        return Ok(None);
    };
    load_optional(&dir.join(USER_CATALOG_FILE))
}

fn load_optional(path: &Path) -> Result<Option<CatalogConfig>, ConfigError> {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    if source.trim().is_empty() {
        return Ok(None);
    }
    let config: CatalogConfig = serde_yaml::from_str(&source)?;
    info!(
        path = %path.display(),
        parameters = config.parameters.len(),
        presets = config.presets.len(),
        "loaded user catalog"
    );
    Ok(Some(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::BranchPredictor;
    use std::collections::BTreeMap;

    #[test]
    fn config_dir_uses_home() {
        match std::env::var_os("HOME") {
            Some(home) => assert_eq!(
                config_dir(),
                Some(PathBuf::from(home).join(".config").join("warpv-config"))
            ),
            None => assert!(config_dir().is_none()),
        }
    }

    #[test]
    fn default_config_builds() {
        let (catalog, presets) = CatalogConfig::default_config().build().unwrap();
        assert_eq!(catalog.len(), Catalog::builtin().len());
        assert_eq!(presets.len(), 4);
    }

    #[test]
    fn preset_keys_must_exist() {
        let mut config = CatalogConfig::default_config();
        config.parameters.retain(|p| p.key != "extra_replay_bubble");
        let err = config.build().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownPresetKey { depth: 4, ref key } if key == "extra_replay_bubble"
        ));
    }

    #[test]
    fn yaml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("catalog.yaml");
        CatalogConfig::default_config().save(&path).unwrap();
        let (catalog, presets) = CatalogConfig::load(&path).unwrap().build().unwrap();
        assert_eq!(catalog.definitions(), Catalog::builtin().definitions());
        assert_eq!(presets.preset_for(6), PresetTable::builtin().preset_for(6));
    }

    #[test]
    fn parses_hand_written_yaml() {
        let yaml = r#"
parameters:
  - key: execute_stage
    kind: integer
    label: Execute stage
    bounds: [0, 3]
    rule: bounds
  - key: branch_pred
    kind: choice
    label: Branch predictor
    choices: [fallthrough, two_bit]
    rule: choices
presets:
  - depth: 2
    stages: { execute_stage: 1 }
    branch_pred: two_bit
"#;
        let config: CatalogConfig = serde_yaml::from_str(yaml).unwrap();
        let (catalog, presets) = config.build().unwrap();
        assert_eq!(catalog.lookup("execute_stage").unwrap().bounds, Some((0, 3)));
        let preset = presets.preset_for(2).unwrap();
        assert_eq!(preset.branch_pred, BranchPredictor::TwoBit);
        assert_eq!(preset.stages, BTreeMap::from([("execute_stage".to_string(), 1)]));
        assert!(preset.extra.is_empty());
    }

    #[test]
    fn missing_or_empty_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("catalog.yaml");
        assert!(load_optional(&missing).unwrap().is_none());

        std::fs::write(&missing, "  \n").unwrap();
        assert!(load_optional(&missing).unwrap().is_none());
    }

    #[test]
    fn malformed_yaml_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.yaml");
        std::fs::write(&path, "parameters: [oops").unwrap();
        assert!(matches!(load_optional(&path), Err(ConfigError::YamlError(_))));
    }
}
