//! Session-scoped settings state.
//!
//! A [`Session`] holds the current [`SettingsDocument`] behind an `Arc`.
//! Every event builds a complete new document and swaps it in, so a
//! snapshot taken with [`Session::snapshot`] never changes underneath its
//! holder.
//!
//! After each event the session re-derives stage defaults if the selected
//! depth differs from the depth last applied. Re-selecting the same depth,
//! or clearing an override, does not re-derive anything.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::presets::PresetTable;
use crate::reconcile::{apply_depth_defaults, update_field};
use crate::settings::{Isa, SettingsDocument, SettingsError};
use crate::validate::{validate, Validation, DEPTH_FIELD};
use crate::value::Value;

/// Key of the ISA selection in the textual event form.
pub const ISA_FIELD: &str = "isa";

/// A user-originated change.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Select (or, with `None`, clear) the pipeline depth.
    SelectDepth(Option<u32>),
    SelectIsa(Option<Isa>),
    /// Edit one pipeline field; `None` clears it.
    SetField { key: String, value: Option<Value> },
}

impl Event {
    /// Parse `key=value` form: `depth=4`, `isa=RISCV`, `execute_stage=3`,
    /// `execute_stage=` (clear), `branch_pred=None` (clear).
    pub fn parse(catalog: &Catalog, raw: &str) -> Result<Self, SettingsError> {
        let (key, value) = raw
            .split_once('=')
            .ok_or_else(|| SettingsError::MalformedEvent(raw.to_string()))?;
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() {
            return Err(SettingsError::MalformedEvent(raw.to_string()));
        }

        match key {
            DEPTH_FIELD if value.is_empty() => Ok(Event::SelectDepth(None)),
            DEPTH_FIELD => value
                .parse::<u32>()
                .map(|d| Event::SelectDepth(Some(d)))
                .map_err(|_| SettingsError::InvalidValue {
                    key: key.to_string(),
                    raw: value.to_string(),
                    reason: "expected a pipeline depth".to_string(),
                }),
            ISA_FIELD if value.is_empty() => Ok(Event::SelectIsa(None)),
            ISA_FIELD => value
                .parse::<Isa>()
                .map(|isa| Event::SelectIsa(Some(isa)))
                .map_err(|reason| SettingsError::InvalidValue {
                    key: key.to_string(),
                    raw: value.to_string(),
                    reason,
                }),
            _ => {
                let param = catalog
                    .lookup(key)
                    .ok_or_else(|| SettingsError::UnknownParameter(key.to_string()))?;
                Ok(Event::SetField {
                    key: key.to_string(),
                    value: Value::parse(key, param.kind, value)?,
                })
            }
        }
    }
}

/// One configurator session.
#[derive(Debug, Clone)]
pub struct Session {
    catalog: Arc<Catalog>,
    presets: Arc<PresetTable>,
    current: Arc<SettingsDocument>,
}

impl Session {
    /// Start an empty session.
    pub fn new(catalog: Arc<Catalog>, presets: Arc<PresetTable>) -> Self {
        Self {
            catalog,
            presets,
            current: Arc::new(SettingsDocument::default()),
        }
    }

    /// Session over the built-in catalog and presets.
    pub fn builtin() -> Self {
        Self::new(Arc::new(Catalog::builtin()), Arc::new(PresetTable::builtin()))
    }

    /// Resume from an existing document.
    pub fn with_document(
        catalog: Arc<Catalog>,
        presets: Arc<PresetTable>,
        document: SettingsDocument,
    ) -> Self {
        Self {
            catalog,
            presets,
            current: Arc::new(document),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn presets(&self) -> &PresetTable {
        &self.presets
    }

    /// The current document. Later events do not affect the returned snapshot.
    pub fn snapshot(&self) -> Arc<SettingsDocument> {
        Arc::clone(&self.current)
    }

    /// Apply one event and return the resulting snapshot.
    ///
    /// On error the current document is left as it was.
    pub fn apply(&mut self, event: Event) -> Result<Arc<SettingsDocument>, SettingsError> {
        let mut next = (*self.current).clone();
        match event {
            Event::SelectDepth(depth) => {
                debug!(?depth, "depth selected");
                next.general.depth = depth;
            }
            Event::SelectIsa(isa) => next.general.isa = isa,
            Event::SetField { key, value } => {
                let (pipeline, overridden) =
                    update_field(&self.catalog, &next.pipeline, &next.overridden, &key, value)?;
                next.pipeline = pipeline;
                next.overridden = overridden;
            }
        }
        self.current = Arc::new(self.sync_depth(next));
        Ok(self.snapshot())
    }

    pub fn select_depth(&mut self, depth: Option<u32>) -> Result<Arc<SettingsDocument>, SettingsError> {
        self.apply(Event::SelectDepth(depth))
    }

    pub fn select_isa(&mut self, isa: Option<Isa>) -> Result<Arc<SettingsDocument>, SettingsError> {
        self.apply(Event::SelectIsa(isa))
    }

    pub fn update_field(
        &mut self,
        key: &str,
        value: Option<Value>,
    ) -> Result<Arc<SettingsDocument>, SettingsError> {
        self.apply(Event::SetField {
            key: key.to_string(),
            value,
        })
    }

    /// Parse and apply a textual `key=value` event.
    pub fn apply_str(&mut self, raw: &str) -> Result<Arc<SettingsDocument>, SettingsError> {
        let event = Event::parse(&self.catalog, raw)?;
        self.apply(event)
    }

    /// Validate the current snapshot.
    pub fn validate(&self) -> Validation {
        validate(
            &self.catalog,
            &self.presets,
            &self.current.general,
            &self.current.pipeline,
        )
    }

    fn sync_depth(&self, mut doc: SettingsDocument) -> SettingsDocument {
        let Some(depth) = doc.general.depth.filter(|&d| d != 0) else {
            return doc;
        };
        if doc.applied_depth == Some(depth) {
            return doc;
        }
        if !self.presets.is_supported(depth) {
            warn!(depth, "no preset for pipeline depth; stage defaults left as they are");
            return doc;
        }
        doc.pipeline = apply_depth_defaults(&self.presets, &doc.pipeline, &doc.overridden, depth);
        doc.applied_depth = Some(depth);
        doc
    }
}
