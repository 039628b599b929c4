//! Document and catalog files on disk.

use std::sync::Arc;

use warpv_config::prelude::*;
use warpv_config::{CatalogConfig, ConfigError, ValidationReport};

#[test]
fn exported_document_reloads_and_validates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("warpv.json");

    let mut session = Session::builtin();
    session.apply_str("isa=RISCV").unwrap();
    session.apply_str("depth=4").unwrap();
    session.apply_str("execute_stage=9").unwrap();
    let exported = session.validate().unwrap().document;
    exported.save_json(&path).unwrap();

    let reloaded = Document::load_json(&path).unwrap();
    assert_eq!(reloaded, exported);

    let resumed = Session::with_document(
        Arc::new(Catalog::builtin()),
        Arc::new(PresetTable::builtin()),
        SettingsDocument::from(reloaded),
    );
    let validated = resumed.validate().unwrap();
    assert_eq!(validated.document, exported);
}

#[test]
fn handwritten_document_without_depth_is_blocked() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.json");
    std::fs::write(
        &path,
        r#"{"general": {"isa": "MIPSI"}, "pipeline": {"execute_stage": 1}}"#,
    )
    .unwrap();

    let doc = Document::load_json(&path).unwrap();
    assert_eq!(doc.general.isa, Some(Isa::MipsI));
    let session = Session::with_document(
        Arc::new(Catalog::builtin()),
        Arc::new(PresetTable::builtin()),
        SettingsDocument::from(doc),
    );
    let outcome = session.validate();
    let report = ValidationReport::new(&outcome, &session.snapshot(), session.presets());
    assert!(report.blocked);
    assert_eq!(report.issues[0].code, "missing-field");
}

#[test]
fn handwritten_document_reports_unknown_keys() {
    let doc: Document = serde_json::from_str(
        r#"{"general": {"depth": 2}, "pipeline": {"cache_stage": 1, "branch_pred": "two_bit"}}"#,
    )
    .unwrap();
    let validated = validate(
        &Catalog::builtin(),
        &PresetTable::builtin(),
        &doc.general,
        &doc.pipeline,
    )
    .unwrap();
    assert_eq!(
        validated.issues,
        vec![FieldError::UnknownParameter { key: "cache_stage".into() }]
    );
}

#[test]
fn custom_catalog_drives_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.yaml");
    std::fs::write(
        &path,
        r#"
parameters:
  - key: fetch_stage
    kind: integer
    label: Fetch stage
    bounds: [0, 2]
    rule: bounds
  - key: execute_stage
    kind: integer
    label: Execute stage
    bounds: [0, 2]
    rule: bounds
  - key: branch_pred
    kind: choice
    label: Branch predictor
    choices: [fallthrough, two_bit]
    rule: choices
  - key: trace
    kind: boolean
    label: Trace
presets:
  - depth: 2
    stages: { fetch_stage: 0, execute_stage: 1 }
    branch_pred: fallthrough
"#,
    )
    .unwrap();

    let (catalog, presets) = CatalogConfig::load(&path).unwrap().build().unwrap();
    let mut session = Session::new(Arc::new(catalog), Arc::new(presets));
    session.apply_str("trace=true").unwrap();
    session.apply_str("depth=2").unwrap();

    let doc = session.snapshot();
    assert_eq!(doc.pipeline.int("execute_stage"), Some(1));
    assert_eq!(doc.pipeline.get("trace"), Some(&Value::Bool(true)));

    // unchecking a boolean clears it
    session.apply_str("trace=false").unwrap();
    assert!(!session.snapshot().pipeline.contains("trace"));

    // depth 4 has no preset in this catalog
    session.apply_str("depth=4").unwrap();
    let validated = session.validate().unwrap();
    assert_eq!(validated.issues, vec![FieldError::UnsupportedDepth { depth: 4 }]);
}

#[test]
fn catalog_with_preset_for_odd_depth_rejected() {
    let mut config = CatalogConfig::default_config();
    config.presets[0].depth = 3;
    assert!(matches!(
        config.build(),
        Err(ConfigError::UnsupportedPresetDepth(3))
    ));
}
