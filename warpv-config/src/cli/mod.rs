pub mod catalog;
pub mod derive;
pub mod validate;

use anyhow::Context;
use std::path::Path;
use std::sync::Arc;

use warpv_config::config::{load_user_config, CatalogConfig};
use warpv_config::{Catalog, PresetTable, Session};

/// Resolve the catalog: explicit path, then the user config, then built-ins.
pub fn load_tables(path: Option<&Path>) -> anyhow::Result<(Catalog, PresetTable)> {
    let config = match path {
        Some(p) => Some(
            CatalogConfig::load(p).with_context(|| format!("loading catalog {}", p.display()))?,
        ),
        None => load_user_config().context("loading user catalog")?,
    };
    match config {
        Some(config) => Ok(config.build()?),
        None => Ok((Catalog::builtin(), PresetTable::builtin())),
    }
}

/// Fresh session over the resolved catalog.
pub fn new_session(path: Option<&Path>) -> anyhow::Result<Session> {
    let (catalog, presets) = load_tables(path)?;
    Ok(Session::new(Arc::new(catalog), Arc::new(presets)))
}
