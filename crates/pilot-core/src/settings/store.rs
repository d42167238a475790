//! Settings store: read-modify-write cycles over the settings file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;

use super::backup::backup_file;
use super::migration::{RawSettings, migrate};
use super::schema::SettingsDocument;
use crate::error::Result;
use crate::json_file::{read_json, write_json};
use crate::provider::require_template;

/// Every mutating call loads the file, applies one document operation,
/// writes the result and returns it. Nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and normalize the settings file.
    ///
    /// A missing file yields an empty document. If normalization changed the
    /// document (e.g. a flat `env` was adopted into the history) the result
    /// is written back before returning.
    pub fn load(&self) -> Result<SettingsDocument> {
        let Some(raw) = read_json::<RawSettings>(&self.path)? else {
            tracing::debug!(path = %self.path.display(), "Settings file absent, using defaults");
            return Ok(SettingsDocument::new());
        };

        let migration = migrate(raw, Utc::now());
        if migration.outcome.changed() {
            tracing::info!(
                path = %self.path.display(),
                outcome = ?migration.outcome,
                "Normalized settings file"
            );
            self.save(&migration.document)?;
        }
        Ok(migration.document)
    }

    pub fn save(&self, document: &SettingsDocument) -> Result<()> {
        write_json(&self.path, document)
    }

    /// Merge `fields` into `env` and record them as the active configuration
    /// for `provider_key`.
    pub fn apply_provider_config(
        &self,
        provider_key: &str,
        fields: BTreeMap<String, String>,
    ) -> Result<SettingsDocument> {
        let template = require_template(provider_key)?;
        self.update(|doc| {
            let id = doc.apply_provider_config(template, fields, Utc::now());
            tracing::info!(provider = provider_key, id = %id, "Applied provider configuration");
            Ok(())
        })
    }

    /// Apply a template's defaults with `api_key` filled into every
    /// credential field. Blank defaults are skipped, so existing `env`
    /// keys are only ever added to or overwritten.
    pub fn apply_provider_template(
        &self,
        provider_key: &str,
        api_key: &str,
    ) -> Result<SettingsDocument> {
        let template = require_template(provider_key)?;
        self.apply_provider_config(provider_key, template.resolve_non_blank(api_key))
    }

    pub fn switch_active(&self, id: &str) -> Result<SettingsDocument> {
        self.update(|doc| {
            doc.switch_active(id)?;
            tracing::info!(id, "Switched active configuration");
            Ok(())
        })
    }

    pub fn delete_config(&self, id: &str) -> Result<SettingsDocument> {
        self.update(|doc| {
            let removed = doc.delete_config(id)?;
            tracing::info!(id, was_active = removed.is_active, "Deleted configuration");
            Ok(())
        })
    }

    pub fn clear_env(&self) -> Result<SettingsDocument> {
        self.update(|doc| {
            doc.clear_env();
            tracing::info!("Cleared env");
            Ok(())
        })
    }

    /// Copy the settings file to a timestamped sibling.
    pub fn backup(&self) -> Result<Option<PathBuf>> {
        backup_file(&self.path, Utc::now())
    }

    fn update<F>(&self, apply: F) -> Result<SettingsDocument>
    where
        F: FnOnce(&mut SettingsDocument) -> Result<()>,
    {
        let mut document = self.load()?;
        apply(&mut document)?;
        self.save(&document)?;
        Ok(document)
    }
}
