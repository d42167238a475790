//! Load-time normalization of the settings file.
//!
//! Older files only carry a flat `env` map. The first load of such a file
//! records that `env` as an active history entry so later switches can
//! restore it.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::schema::{ConfigEntry, SettingsDocument, stringify_values};
use crate::provider::{BASE_URL_FIELD, identify_provider};

/// Settings file as found on disk, before any normalization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSettings {
    #[serde(default, deserialize_with = "deserialize_env")]
    pub env: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub config_history: Option<Vec<ConfigEntry>>,
    #[serde(default)]
    pub always_thinking_enabled: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn deserialize_env<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<BTreeMap<String, String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?;
    Ok(raw.map(stringify_values))
}

/// Which layout a raw settings file uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsShape {
    /// No live `env` values; nothing to adopt.
    Empty,
    /// Live `env` values with no active history entry recording them.
    FlatEnv,
    /// Some history entry is already active.
    Tracked,
}

impl RawSettings {
    pub fn shape(&self) -> SettingsShape {
        let has_env = self.env.as_ref().is_some_and(|env| !env.is_empty());
        let has_active = self
            .config_history
            .as_ref()
            .is_some_and(|history| history.iter().any(|c| c.is_active));

        match (has_env, has_active) {
            (_, true) => SettingsShape::Tracked,
            (true, false) => SettingsShape::FlatEnv,
            (false, false) => SettingsShape::Empty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    Unchanged,
    /// `env` was recorded as a new active history entry with this id.
    AdoptedEnv { id: String },
    /// Several entries were marked active; only `kept` still is.
    SingleActive { kept: String },
}

impl MigrationOutcome {
    pub fn changed(&self) -> bool {
        !matches!(self, MigrationOutcome::Unchanged)
    }
}

#[derive(Debug, Clone)]
pub struct Migration {
    pub document: SettingsDocument,
    pub outcome: MigrationOutcome,
}

/// Normalize a raw file into a [`SettingsDocument`].
pub fn migrate(raw: RawSettings, now: DateTime<Utc>) -> Migration {
    let shape = raw.shape();
    let mut document = SettingsDocument {
        env: raw.env.unwrap_or_default(),
        config_history: raw.config_history.unwrap_or_default(),
        always_thinking_enabled: raw.always_thinking_enabled,
        extra: raw.extra,
    };

    let outcome = match shape {
        SettingsShape::Empty => MigrationOutcome::Unchanged,
        SettingsShape::Tracked => keep_first_active(&mut document),
        SettingsShape::FlatEnv => {
            let base_url = document
                .env
                .get(BASE_URL_FIELD)
                .map(String::as_str)
                .unwrap_or_default();
            let provider = identify_provider(base_url);
            let id = document.next_config_id(now);
            let entry = ConfigEntry::new(id.clone(), provider, document.env.clone(), now);
            document.config_history.push(entry);
            MigrationOutcome::AdoptedEnv { id }
        }
    };

    Migration { document, outcome }
}

fn keep_first_active(document: &mut SettingsDocument) -> MigrationOutcome {
    let mut kept: Option<String> = None;
    let mut changed = false;
    for entry in document.config_history.iter_mut().filter(|c| c.is_active) {
        if kept.is_none() {
            kept = Some(entry.id.clone());
        } else {
            entry.is_active = false;
            changed = true;
        }
    }
    match kept {
        Some(kept) if changed => MigrationOutcome::SingleActive { kept },
        _ => MigrationOutcome::Unchanged,
    }
}
