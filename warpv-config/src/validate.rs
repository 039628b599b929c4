//! Validation of the settings before they are handed to the translator.
//!
//! Two tiers:
//!
//! - **Blocking**: a missing pipeline depth. No document is produced and
//!   nothing else is checked.
//! - **Soft**: values failing their parameter rule, unsupported depths,
//!   keys outside the catalog. These are reported next to the document,
//!   which is still produced with the offending values intact.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::catalog::Catalog;
use crate::presets::PresetTable;
use crate::settings::{Document, GeneralSettings, PipelineSettings};
use crate::value::Value;

/// Name of the one required general field.
pub const DEPTH_FIELD: &str = "depth";

/// A problem with one field.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldError {
    #[error("required field '{field}' is not set")]
    MissingRequiredField { field: String },
    #[error("'{key}' = {value}: {reason}")]
    InvalidParameterValue {
        key: String,
        value: Value,
        reason: String,
    },
    #[error("pipeline depth {depth} has no preset; stage defaults were not derived")]
    UnsupportedDepth { depth: u32 },
    #[error("'{key}' is not a known parameter")]
    UnknownParameter { key: String },
}

impl FieldError {
    /// Identifier of the field the presentation layer should flag.
    pub fn field(&self) -> &str {
        match self {
            FieldError::MissingRequiredField { field } => field,
            FieldError::InvalidParameterValue { key, .. } => key,
            FieldError::UnsupportedDepth { .. } => DEPTH_FIELD,
            FieldError::UnknownParameter { key } => key,
        }
    }

    /// Short machine-readable code (e.g. "missing-field").
    pub fn code(&self) -> &'static str {
        match self {
            FieldError::MissingRequiredField { .. } => "missing-field",
            FieldError::InvalidParameterValue { .. } => "invalid-value",
            FieldError::UnsupportedDepth { .. } => "unsupported-depth",
            FieldError::UnknownParameter { .. } => "unknown-parameter",
        }
    }

    /// Whether this error prevents document production.
    pub fn is_blocking(&self) -> bool {
        matches!(self, FieldError::MissingRequiredField { .. })
    }
}

/// A produced document together with its soft issues.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated {
    pub document: Document,
    pub issues: Vec<FieldError>,
}

impl Validated {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Outcome of [`validate`].
pub type Validation = Result<Validated, Vec<FieldError>>;

/// Validate the current settings and, unless blocked, build the document.
///
/// Missing depth (unset or zero) yields exactly one `MissingRequiredField`
/// error. Otherwise
/// the document is `{general, pipeline}` verbatim, and soft issues come in
/// this order: unsupported depth first, then per-key problems in key order.
pub fn validate(
    catalog: &Catalog,
    presets: &PresetTable,
    general: &GeneralSettings,
    pipeline: &PipelineSettings,
) -> Validation {
    let Some(depth) = general.depth.filter(|&d| d != 0) else {
        debug!("validation blocked: depth not set");
        return Err(vec![FieldError::MissingRequiredField {
            field: DEPTH_FIELD.to_string(),
        }]);
    };

    let mut issues = Vec::new();

    if !presets.is_supported(depth) {
        issues.push(FieldError::UnsupportedDepth { depth });
    }

    for (key, value) in pipeline.iter() {
        match catalog.lookup(key) {
            Some(param) => {
                if let Err(reason) = param.check(value) {
                    issues.push(FieldError::InvalidParameterValue {
                        key: key.to_string(),
                        value: value.clone(),
                        reason,
                    });
                }
            }
            None if presets.mentions(key) => {}
            None => issues.push(FieldError::UnknownParameter {
                key: key.to_string(),
            }),
        }
    }

    debug!(depth, issues = issues.len(), "validation produced document");
    Ok(Validated {
        document: Document {
            general: general.clone(),
            pipeline: pipeline.clone(),
        },
        issues,
    })
}
