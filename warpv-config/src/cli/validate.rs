//! CLI `validate` subcommand: check an exported settings document.

use anyhow::Context;
use std::path::Path;
use std::sync::Arc;

use warpv_config::{Document, SettingsDocument, Session, ValidationReport};

/// Run the validate subcommand. Returns whether the document passes the
/// blocking checks.
pub fn run(catalog: Option<&Path>, document: &Path, report_path: Option<&Path>) -> anyhow::Result<bool> {
    let (catalog, presets) = super::load_tables(catalog)?;
    let doc = Document::load_json(document)
        .with_context(|| format!("reading {}", document.display()))?;

    let session = Session::with_document(
        Arc::new(catalog),
        Arc::new(presets),
        SettingsDocument::from(doc),
    );
    let outcome = session.validate();
    let report = ValidationReport::new(&outcome, &session.snapshot(), session.presets());

    report.print_table();
    report.print_summary();
    if let Some(path) = report_path {
        report
            .save_json(path)
            .with_context(|| format!("writing report {}", path.display()))?;
    }
    Ok(!report.blocked)
}
