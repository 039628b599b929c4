//! Parameter catalog: every key the configurator knows how to set.
//!
//! The catalog is static data loaded once at startup. It is consulted by
//! the reconciler (which keys are stage-like, which integer fields carry a
//! default) and by the validator (per-key validity rules).
//!
//! # Stage-like keys
//!
//! A key ending in `_stage` names a pipeline slot. Only these keys take
//! part in override tracking; see [`crate::overrides`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::config::ConfigError;
use crate::settings::PipelineSettings;
use crate::value::Value;

/// Suffix shared by every stage-assignment key.
pub const STAGE_SUFFIX: &str = "_stage";

/// Prefix shared by the hazard bubble keys.
pub const HAZARD_PREFIX: &str = "extra_";

/// Whether `key` follows the stage naming convention.
pub fn is_stage_key(key: &str) -> bool {
    key.ends_with(STAGE_SUFFIX)
}

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// Value type of a parameter. Fixed once the parameter is defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    Integer,
    Boolean,
    Choice,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamKind::Integer => "integer",
            ParamKind::Boolean => "boolean",
            ParamKind::Choice => "choice",
        };
        f.write_str(name)
    }
}

/// Validity predicate attached to a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// Integer value must lie within the parameter's `bounds`, inclusive.
    Bounds,
    /// Text value must be one of the parameter's `choices`.
    Choices,
}

/// One configurable key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDef {
    pub key: String,
    pub kind: ParamKind,
    pub label: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Inclusive `(min, max)` for integer parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<(i64, i64)>,
    /// Permitted values for choice parameters, in display order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<Rule>,
}

impl ParameterDef {
    fn integer(key: &str, label: &str, description: &str, bounds: (i64, i64)) -> Self {
        Self {
            key: key.to_string(),
            kind: ParamKind::Integer,
            label: label.to_string(),
            description: description.to_string(),
            bounds: Some(bounds),
            choices: Vec::new(),
            default: None,
            rule: Some(Rule::Bounds),
        }
    }

    fn choice(key: &str, label: &str, description: &str, choices: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            kind: ParamKind::Choice,
            label: label.to_string(),
            description: description.to_string(),
            bounds: None,
            choices: choices.iter().map(|c| c.to_string()).collect(),
            default: None,
            rule: Some(Rule::Choices),
        }
    }

    fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn is_stage_like(&self) -> bool {
        is_stage_key(&self.key)
    }

    /// Integer default that a first-time entry is offset by, if any.
    ///
    /// Only integer parameters with a non-zero default qualify.
    pub fn entry_offset(&self) -> Option<i64> {
        match (self.kind, &self.default) {
            (ParamKind::Integer, Some(Value::Int(d))) if *d != 0 => Some(*d),
            _ => None,
        }
    }

    /// Check a present value against this parameter.
    ///
    /// A value of the wrong shape is always rejected; otherwise the
    /// configured rule decides. Parameters without a rule accept anything
    /// of the right shape.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        if !value.matches_kind(self.kind) {
            return Err(format!("expected {}, found {}", self.kind, value.type_name()));
        }
        match (self.rule, value) {
            (Some(Rule::Bounds), Value::Int(n)) => match self.bounds {
                Some((min, max)) if *n < min || *n > max => {
                    Err(format!("{} must be between {min} and {max}", self.label))
                }
                _ => Ok(()),
            },
            (Some(Rule::Choices), Value::Text(s)) => {
                if self.choices.iter().any(|c| c == s) {
                    Ok(())
                } else {
                    Err(format!(
                        "{} must be one of: {}",
                        self.label,
                        self.choices.join(", ")
                    ))
                }
            }
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Groups of parameters shown together in the configurator form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    MultiCore,
    Pipeline,
    Components,
    Hazards,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::MultiCore,
        Section::Pipeline,
        Section::Components,
        Section::Hazards,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Section::MultiCore => "multi-core",
            Section::Pipeline => "pipeline",
            Section::Components => "components",
            Section::Hazards => "hazards",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|section| section.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "unknown section '{s}', expected one of: multi-core, pipeline, components, hazards"
                )
            })
    }
}

/// Keys that only appear in the multi-core section once more than one core is configured.
const MULTI_CORE_NETWORK_KEYS: [&str; 3] = ["vcs", "prios", "max_packet_size"];

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Ordered, read-only registry of parameter definitions.
#[derive(Debug, Clone)]
pub struct Catalog {
    params: Vec<ParameterDef>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate keys and defaults of the wrong shape.
    pub fn new(params: Vec<ParameterDef>) -> Result<Self, ConfigError> {
        let mut index = HashMap::with_capacity(params.len());
        for (i, param) in params.iter().enumerate() {
            if index.insert(param.key.clone(), i).is_some() {
                return Err(ConfigError::DuplicateKey(param.key.clone()));
            }
            if let Some(default) = &param.default {
                if !default.matches_kind(param.kind) {
                    return Err(ConfigError::DefaultKindMismatch {
                        key: param.key.clone(),
                        kind: param.kind,
                    });
                }
            }
        }
        Ok(Self { params, index })
    }

    /// The WARP-V parameter set.
    pub fn builtin() -> Self {
        let params = builtin_parameters();
        let index = params
            .iter()
            .enumerate()
            .map(|(i, p)| (p.key.clone(), i))
            .collect();
        Self { params, index }
    }

    pub fn lookup(&self, key: &str) -> Option<&ParameterDef> {
        self.index.get(key).map(|&i| &self.params[i])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Parameters matching `pred`, in catalog order.
    pub fn subset<P>(&self, mut pred: P) -> Vec<&ParameterDef>
    where
        P: FnMut(&ParameterDef) -> bool,
    {
        self.params.iter().filter(|&p| pred(p)).collect()
    }

    /// Parameters shown in `section` given the current pipeline settings.
    pub fn section(&self, section: Section, pipeline: &PipelineSettings) -> Vec<&ParameterDef> {
        match section {
            Section::MultiCore => {
                let multi = pipeline.int("cores").is_some_and(|cores| cores > 1);
                self.subset(|p| {
                    p.key == "cores" || (multi && MULTI_CORE_NETWORK_KEYS.contains(&p.key.as_str()))
                })
            }
            Section::Pipeline => {
                let mut params: Vec<&ParameterDef> = self.lookup("ld_return_align").into_iter().collect();
                params.extend(self.subset(ParameterDef::is_stage_like));
                params
            }
            Section::Components => self.subset(|p| p.key == "branch_pred"),
            Section::Hazards => self.subset(|p| p.key.starts_with(HAZARD_PREFIX)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParameterDef> {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Definitions in catalog order, for serialization.
    pub fn definitions(&self) -> &[ParameterDef] {
        &self.params
    }
}

/// Stage keys in pipeline order.
pub const STAGE_KEYS: [&str; 9] = [
    "next_pc_stage",
    "fetch_stage",
    "decode_stage",
    "branch_pred_stage",
    "register_rd_stage",
    "execute_stage",
    "result_stage",
    "register_wr_stage",
    "mem_wr_stage",
];

fn builtin_parameters() -> Vec<ParameterDef> {
    let mut params = vec![
        ParameterDef::integer("cores", "Cores", "Number of cores on the ring network", (1, 16))
            .with_default(Value::Int(1)),
        ParameterDef::integer("vcs", "Virtual channels", "Virtual channels per network link", (1, 8))
            .with_default(Value::Int(2)),
        ParameterDef::integer("prios", "Priority levels", "Packet priority levels", (1, 8))
            .with_default(Value::Int(2)),
        ParameterDef::integer(
            "max_packet_size",
            "Max packet size",
            "Maximum packet size in flits",
            (1, 16),
        )
        .with_default(Value::Int(3)),
        ParameterDef::integer(
            "ld_return_align",
            "Load return alignment",
            "Alignment of load return pseudo-instructions with the pipeline",
            (0, 15),
        ),
    ];

    let stage_labels = [
        ("Next PC stage", "Stage computing the next program counter"),
        ("Fetch stage", "Stage reading instruction memory"),
        ("Decode stage", "Stage decoding the instruction"),
        ("Branch predict stage", "Stage producing the branch prediction"),
        ("Register read stage", "Stage reading the register file"),
        ("Execute stage", "Stage computing ALU results"),
        ("Result stage", "Stage selecting the instruction result"),
        ("Register write stage", "Stage writing the register file"),
        ("Memory write stage", "Stage issuing data memory writes"),
    ];
    for (key, (label, description)) in STAGE_KEYS.iter().zip(stage_labels) {
        params.push(ParameterDef::integer(key, label, description, (0, 15)));
    }

    params.push(ParameterDef::choice(
        "branch_pred",
        "Branch predictor",
        "Branch prediction strategy",
        &["fallthrough", "two_bit", "ideal"],
    ));

    let hazards = [
        ("extra_replay_bubble", "Replay bubble", "Extra bubble cycle for instruction replay"),
        ("extra_pred_taken_bubble", "Predicted-taken bubble", "Extra bubble after a predicted-taken branch"),
        ("extra_jump_bubble", "Jump bubble", "Extra bubble after a jump"),
        ("extra_branch_bubble", "Branch bubble", "Extra bubble after a branch redirect"),
        ("extra_indirect_jump_bubble", "Indirect jump bubble", "Extra bubble after an indirect jump"),
        ("extra_non_pipelined_bubble", "Non-pipelined bubble", "Extra bubble after a non-pipelined instruction"),
        ("extra_trap_bubble", "Trap bubble", "Extra bubble after a trap"),
    ];
    for (key, label, description) in hazards {
        params.push(ParameterDef::integer(key, label, description, (0, 1)));
    }

    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_keys_unique() {
        let catalog = Catalog::builtin();
        assert!(Catalog::new(catalog.definitions().to_vec()).is_ok());
        assert_eq!(catalog.len(), 22);
    }

    #[test]
    fn duplicate_key_rejected() {
        let mut params = builtin_parameters();
        params.push(params[0].clone());
        let err = Catalog::new(params).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateKey(ref k) if k == "cores"));
    }

    #[test]
    fn default_must_match_kind() {
        let params = vec![ParameterDef::integer("cores", "Cores", "", (1, 4)).with_default(Value::from("two"))];
        assert!(matches!(
            Catalog::new(params),
            Err(ConfigError::DefaultKindMismatch { .. })
        ));
    }

    #[test]
    fn stage_suffix_check() {
        assert!(is_stage_key("execute_stage"));
        assert!(is_stage_key("branch_pred_stage"));
        assert!(!is_stage_key("branch_pred"));
        assert!(!is_stage_key("stage_count"));
    }

    #[test]
    fn bounds_rule() {
        let catalog = Catalog::builtin();
        let cores = catalog.lookup("cores").unwrap();
        assert!(cores.check(&Value::Int(4)).is_ok());
        assert!(cores.check(&Value::Int(0)).is_err());
        assert!(cores.check(&Value::Bool(true)).is_err());
    }

    #[test]
    fn choices_rule() {
        let catalog = Catalog::builtin();
        let bp = catalog.lookup("branch_pred").unwrap();
        assert!(bp.check(&Value::from("two_bit")).is_ok());
        let err = bp.check(&Value::from("perceptron")).unwrap_err();
        assert!(err.contains("fallthrough, two_bit, ideal"));
    }

    #[test]
    fn entry_offset_only_for_nonzero_integer_defaults() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.lookup("cores").unwrap().entry_offset(), Some(1));
        assert_eq!(catalog.lookup("execute_stage").unwrap().entry_offset(), None);
        assert_eq!(catalog.lookup("branch_pred").unwrap().entry_offset(), None);
    }

    #[test]
    fn multi_core_section_grows_with_cores() {
        let catalog = Catalog::builtin();
        let mut pipeline = PipelineSettings::default();
        let keys = |ps: Vec<&ParameterDef>| ps.iter().map(|p| p.key.clone()).collect::<Vec<_>>();

        assert_eq!(keys(catalog.section(Section::MultiCore, &pipeline)), ["cores"]);

        pipeline.insert("cores", Value::Int(4));
        assert_eq!(
            keys(catalog.section(Section::MultiCore, &pipeline)),
            ["cores", "vcs", "prios", "max_packet_size"]
        );
    }

    #[test]
    fn pipeline_section_lists_alignment_then_stages() {
        let catalog = Catalog::builtin();
        let params = catalog.section(Section::Pipeline, &PipelineSettings::default());
        assert_eq!(params[0].key, "ld_return_align");
        let stages: Vec<&str> = params[1..].iter().map(|p| p.key.as_str()).collect();
        assert_eq!(stages, STAGE_KEYS);
    }

    #[test]
    fn hazards_and_components_sections() {
        let catalog = Catalog::builtin();
        let empty = PipelineSettings::default();
        assert_eq!(catalog.section(Section::Components, &empty).len(), 1);
        let hazards = catalog.section(Section::Hazards, &empty);
        assert_eq!(hazards.len(), 7);
        assert!(hazards.iter().all(|p| p.key.starts_with("extra_")));
    }

    #[test]
    fn section_from_str() {
        assert_eq!("Pipeline".parse::<Section>().unwrap(), Section::Pipeline);
        assert_eq!("multi-core".parse::<Section>().unwrap(), Section::MultiCore);
        assert!("io".parse::<Section>().is_err());
    }
}
