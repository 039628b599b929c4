//! warpv-config: settings derivation and validation for the WARP-V
//! RISC-V core configurator.
//!
//! A user picks a handful of high-level options (pipeline depth, ISA,
//! core count) and edits individual fields. This crate turns those choices
//! into the full, consistent set of per-stage settings that the macro
//! translator consumes, and checks it before export.
//!
//! # Modules
//!
//! - [`catalog`]: parameter definitions, validity rules, form sections
//! - [`presets`]: default stage assignments for depths 1, 2, 4 and 6
//! - [`overrides`]: which stage fields the user set explicitly
//! - [`reconcile`]: depth-default application and single-field edits
//! - [`validate`]: blocking and soft checks, document production
//! - [`session`]: copy-on-write session state and event handling
//! - [`config`]: YAML catalog/preset loading
//! - [`report`]: terminal and JSON reporting
//!
//! # Example
//!
//! ```rust
//! use warpv_config::prelude::*;
//!
//! let mut session = Session::builtin();
//! session.select_depth(Some(4)).unwrap();
//! session.update_field("execute_stage", Some(Value::Int(9))).unwrap();
//! session.select_depth(Some(6)).unwrap();
//!
//! let doc = session.snapshot();
//! assert_eq!(doc.pipeline.int("execute_stage"), Some(9));
//! assert_eq!(doc.pipeline.int("decode_stage"), Some(3));
//!
//! let validated = session.validate().unwrap();
//! println!("{}", validated.document.to_json_pretty().unwrap());
//! ```

pub mod catalog;
pub mod config;
pub mod overrides;
pub mod presets;
pub mod reconcile;
pub mod report;
pub mod session;
pub mod settings;
pub mod validate;
pub mod value;

pub use catalog::{Catalog, ParamKind, ParameterDef, Rule, Section};
pub use config::{CatalogConfig, ConfigError};
pub use overrides::OverrideTracker;
pub use presets::{BranchPredictor, DepthPreset, PresetTable};
pub use report::ValidationReport;
pub use session::{Event, Session};
pub use settings::{Document, GeneralSettings, Isa, PipelineSettings, SettingsDocument, SettingsError};
pub use validate::{FieldError, Validated, Validation};
pub use value::Value;

/// Prelude module - import everything commonly needed
///
/// ```rust
/// use warpv_config::prelude::*;
/// ```
pub mod prelude {
    pub use crate::catalog::{is_stage_key, Catalog, ParamKind, ParameterDef, Section};
    pub use crate::overrides::OverrideTracker;
    pub use crate::presets::{PresetTable, SUPPORTED_DEPTHS};
    pub use crate::reconcile::{apply_depth_defaults, update_field};
    pub use crate::session::{Event, Session};
    pub use crate::settings::{Document, GeneralSettings, Isa, PipelineSettings, SettingsDocument};
    pub use crate::validate::{validate, FieldError, Validated};
    pub use crate::value::Value;
}
