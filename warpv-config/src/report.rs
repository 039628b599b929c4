//! Validation report generation and display.
//!
//! A [`ValidationReport`] pairs the outcome of validation with the
//! settings it was run on, tagging each value with where it came from:
//!
//! - `override`: a stage the user set explicitly
//! - `preset`: derived from the applied depth preset
//! - `user`: anything else the user entered
//!
//! # Example
//!
//! ```rust
//! use warpv_config::report::ValidationReport;
//! use warpv_config::session::Session;
//!
//! let mut session = Session::builtin();
//! session.select_depth(Some(4)).unwrap();
//! let report = ValidationReport::new(&session.validate(), &session.snapshot(), session.presets());
//! assert!(!report.blocked);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::presets::PresetTable;
use crate::settings::SettingsDocument;
use crate::validate::Validation;
use crate::value::Value;

/// Where a setting's value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Override,
    Preset,
    User,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Origin::Override => "override",
            Origin::Preset => "preset",
            Origin::User => "user",
        };
        f.write_str(name)
    }
}

/// One pipeline setting in the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingRow {
    pub key: String,
    pub value: Value,
    pub origin: Origin,
    pub valid: bool,
}

/// One reported problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueEntry {
    pub field: String,
    pub code: String,
    pub message: String,
    pub blocking: bool,
}

/// Summary counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_settings: usize,
    pub overridden: usize,
    pub derived: usize,
    pub issues: usize,
}

/// Full validation report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Timestamp of the run (seconds since the Unix epoch).
    pub timestamp: String,
    pub depth: Option<u32>,
    /// Whether document production was blocked.
    pub blocked: bool,
    pub settings: Vec<SettingRow>,
    pub issues: Vec<IssueEntry>,
    pub summary: ReportSummary,
}

impl ValidationReport {
    pub fn new(outcome: &Validation, doc: &SettingsDocument, presets: &PresetTable) -> Self {
        let errors = match outcome {
            Ok(validated) => validated.issues.as_slice(),
            Err(errors) => errors.as_slice(),
        };
        let applied = doc.applied_depth.and_then(|d| presets.preset_for(d));

        let settings: Vec<SettingRow> = doc
            .pipeline
            .iter()
            .map(|(key, value)| {
                let origin = if doc.overridden.is_overridden(key) {
                    Origin::Override
                } else if applied.and_then(|p| p.value_of(key)).as_ref() == Some(value) {
                    Origin::Preset
                } else {
                    Origin::User
                };
                SettingRow {
                    key: key.to_string(),
                    value: value.clone(),
                    origin,
                    valid: !errors.iter().any(|e| e.field() == key),
                }
            })
            .collect();

        let issues: Vec<IssueEntry> = errors
            .iter()
            .map(|e| IssueEntry {
                field: e.field().to_string(),
                code: e.code().to_string(),
                message: e.to_string(),
                blocking: e.is_blocking(),
            })
            .collect();

        let summary = ReportSummary {
            total_settings: settings.len(),
            overridden: settings.iter().filter(|s| s.origin == Origin::Override).count(),
            derived: settings.iter().filter(|s| s.origin == Origin::Preset).count(),
            issues: issues.len(),
        };

        Self {
            timestamp: unix_timestamp(),
            depth: doc.general.depth,
            blocked: outcome.is_err(),
            settings,
            issues,
            summary,
        }
    }

    /// Save report to JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), std::io::Error> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }

    /// Print human-readable summary to the terminal.
    pub fn print_summary(&self) {
        use colored::Colorize;

        println!("\n{}", "═".repeat(60).bold());
        println!("{}", " WARP-V CONFIGURATION ".bold().on_blue());
        println!("{}", "═".repeat(60).bold());

        match self.depth {
            Some(depth) => println!("Depth:      {depth}"),
            None => println!("Depth:      {}", "not set".red()),
        }
        println!(
            "Settings:   {} ({} derived, {} overridden)",
            self.summary.total_settings, self.summary.derived, self.summary.overridden
        );
        println!();

        for issue in &self.issues {
            let tag = if issue.blocking {
                "error".red().bold()
            } else {
                "warning".yellow().bold()
            };
            println!("  {}[{}]: {}", tag, issue.code, issue.message);
        }
        if !self.issues.is_empty() {
            println!();
        }

        println!("{}", "─".repeat(60));
        let status = if self.blocked {
            "BLOCKED: no document produced".red().bold()
        } else if self.issues.is_empty() {
            "DOCUMENT READY".green().bold()
        } else {
            format!("DOCUMENT READY with {} issue(s)", self.issues.len())
                .yellow()
                .bold()
        };
        println!("{status}");
        println!("{}\n", "═".repeat(60).bold());
    }

    /// Print the settings table.
    pub fn print_table(&self) {
        use tabled::{Table, Tabled};

        #[derive(Tabled)]
        struct Row {
            key: String,
            value: String,
            origin: String,
            status: String,
        }

        let rows: Vec<Row> = self
            .settings
            .iter()
            .map(|s| Row {
                key: s.key.clone(),
                value: s.value.to_string(),
                origin: s.origin.to_string(),
                status: if s.valid { "ok".to_string() } else { "INVALID".to_string() },
            })
            .collect();

        if !rows.is_empty() {
            println!("{}", Table::new(rows));
        }
    }
}

/// Seconds since the Unix epoch.
fn unix_timestamp() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}", duration.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;

    #[test]
    fn origins_follow_overrides_and_preset() {
        let mut session = Session::builtin();
        session.select_depth(Some(4)).unwrap();
        session.update_field("execute_stage", Some(Value::Int(9))).unwrap();
        session.update_field("ld_return_align", Some(Value::Int(6))).unwrap();

        let report = ValidationReport::new(&session.validate(), &session.snapshot(), session.presets());
        let origin = |key: &str| report.settings.iter().find(|s| s.key == key).unwrap().origin;

        assert_eq!(origin("execute_stage"), Origin::Override);
        assert_eq!(origin("decode_stage"), Origin::Preset);
        assert_eq!(origin("ld_return_align"), Origin::User);
        assert_eq!(report.summary.overridden, 1);
        assert!(!report.blocked);
    }

    #[test]
    fn blocked_report() {
        let session = Session::builtin();
        let report = ValidationReport::new(&session.validate(), &session.snapshot(), session.presets());
        assert!(report.blocked);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].field, "depth");
        assert!(report.issues[0].blocking);
    }

    #[test]
    fn invalid_rows_flagged() {
        let mut session = Session::builtin();
        session.select_depth(Some(6)).unwrap();
        session.update_field("mem_wr_stage", Some(Value::Int(99))).unwrap();
        let report = ValidationReport::new(&session.validate(), &session.snapshot(), session.presets());
        let row = report.settings.iter().find(|s| s.key == "mem_wr_stage").unwrap();
        assert!(!row.valid);
        assert_eq!(report.summary.issues, 1);
    }

    #[test]
    fn saves_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("report.json");
        let mut session = Session::builtin();
        session.select_depth(Some(1)).unwrap();
        let report = ValidationReport::new(&session.validate(), &session.snapshot(), session.presets());
        report.save_json(&path).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["depth"], 1);
        assert_eq!(json["blocked"], false);
    }
}
