//! CLI `presets`, `params` and `init` subcommands.

use anyhow::Context;
use colored::Colorize;
use std::path::Path;
use tabled::{builder::Builder, Table, Tabled};

use warpv_config::catalog::STAGE_KEYS;
use warpv_config::config::{config_dir, CatalogConfig, USER_CATALOG_FILE};
use warpv_config::presets::BRANCH_PRED_KEY;
use warpv_config::{PipelineSettings, Section, Value};

/// Print one column per depth, one row per derived key.
pub fn presets(catalog: Option<&Path>) -> anyhow::Result<()> {
    let (_, presets) = super::load_tables(catalog)?;

    let mut keys: Vec<String> = STAGE_KEYS.iter().map(|k| k.to_string()).collect();
    for preset in presets.iter() {
        for key in preset.values().into_keys() {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
    }
    // keep the predictor last
    keys.retain(|k| k != BRANCH_PRED_KEY);
    keys.push(BRANCH_PRED_KEY.to_string());

    let mut builder = Builder::default();
    let mut header = vec!["key".to_string()];
    header.extend(presets.depths().map(|d| format!("depth {d}")));
    builder.push_record(header);

    for key in &keys {
        let mut row = vec![key.clone()];
        row.extend(presets.iter().map(|p| {
            p.value_of(key)
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string())
        }));
        builder.push_record(row);
    }
    println!("{}", builder.build());
    Ok(())
}

/// List parameters, optionally restricted to one form section.
pub fn params(catalog: Option<&Path>, section: Option<Section>) -> anyhow::Result<()> {
    let (catalog, _) = super::load_tables(catalog)?;

    #[derive(Tabled)]
    struct Row {
        key: String,
        kind: String,
        label: String,
        range: String,
        default: String,
    }

    // Sections are listed as they appear with multiple cores configured.
    let mut multi_core = PipelineSettings::new();
    multi_core.insert("cores", Value::Int(2));

    let params = match section {
        Some(section) => catalog.section(section, &multi_core),
        None => catalog.iter().collect(),
    };

    let rows: Vec<Row> = params
        .into_iter()
        .map(|p| Row {
            key: p.key.clone(),
            kind: p.kind.to_string(),
            label: p.label.clone(),
            range: match (p.bounds, p.choices.is_empty()) {
                (Some((min, max)), _) => format!("{min}..={max}"),
                (None, false) => p.choices.join(" | "),
                (None, true) => "-".to_string(),
            },
            default: p
                .default
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    if rows.is_empty() {
        eprintln!("{} no parameters", "⚠".yellow());
    } else {
        println!("{}", Table::new(rows));
    }
    Ok(())
}

/// Write the default catalog so it can be edited.
pub fn init(path: Option<&Path>) -> anyhow::Result<()> {
    let target = match path {
        Some(p) => p.to_path_buf(),
        None => config_dir()
            .context("cannot determine home directory; pass a path")?
            .join(USER_CATALOG_FILE),
    };
    if target.exists() {
        anyhow::bail!("{} already exists", target.display());
    }
    CatalogConfig::default_config()
        .save(&target)
        .with_context(|| format!("writing {}", target.display()))?;
    eprintln!("{} wrote {}", "✓".green(), target.display());
    Ok(())
}
