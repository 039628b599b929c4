//! CLI `derive` and `export` subcommands: replay edits through a session.

use anyhow::Context;
use colored::Colorize;
use std::path::Path;

use warpv_config::{Session, ValidationReport};

fn replay(catalog: Option<&Path>, events: &[String]) -> anyhow::Result<Session> {
    let mut session = super::new_session(catalog)?;
    for raw in events {
        session
            .apply_str(raw)
            .with_context(|| format!("applying '{raw}'"))?;
    }
    Ok(session)
}

/// Run `derive`. Returns whether a document could be produced.
pub fn run(catalog: Option<&Path>, events: &[String], json: bool) -> anyhow::Result<bool> {
    let session = replay(catalog, events)?;
    let outcome = session.validate();

    if json {
        match &outcome {
            Ok(validated) => println!("{}", validated.document.to_json_pretty()?),
            Err(errors) => {
                for e in errors {
                    eprintln!("{}[{}]: {}", "error".red(), e.code(), e);
                }
            }
        }
    } else {
        let report = ValidationReport::new(&outcome, &session.snapshot(), session.presets());
        report.print_table();
        report.print_summary();
    }
    Ok(outcome.is_ok())
}

/// Run `export`. Writes nothing when validation is blocked.
pub fn export(catalog: Option<&Path>, events: &[String], output: &Path) -> anyhow::Result<bool> {
    let session = replay(catalog, events)?;
    match session.validate() {
        Ok(validated) => {
            for issue in &validated.issues {
                eprintln!("{}[{}]: {}", "warning".yellow(), issue.code(), issue);
            }
            validated
                .document
                .save_json(output)
                .with_context(|| format!("writing {}", output.display()))?;
            eprintln!("{} wrote {}", "✓".green(), output.display());
            Ok(true)
        }
        Err(errors) => {
            for e in &errors {
                eprintln!("{}[{}]: {}", "error".red(), e.code(), e);
            }
            eprintln!("{} nothing written", "✗".red());
            Ok(false)
        }
    }
}
