//! Settings document and the record rules that keep `env` and
//! `configHistory` consistent.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{PilotError, Result};
use crate::provider::{ProviderIdentity, ProviderTemplate};

/// One previously-applied provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigEntry {
    /// Time-derived token, unique within the document.
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub provider_key: String,
    #[serde(default, deserialize_with = "deserialize_string_map")]
    pub fields: BTreeMap<String, String>,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_active: bool,
}

impl ConfigEntry {
    pub fn new(
        id: String,
        provider: ProviderIdentity,
        fields: BTreeMap<String, String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: provider.name.to_string(),
            provider_key: provider.key.to_string(),
            fields,
            icon: provider.icon.to_string(),
            created_at,
            is_active: true,
        }
    }

    /// Fields that would be mirrored into `env` when this entry is active.
    pub fn effective_fields(&self) -> BTreeMap<String, String> {
        self.fields
            .iter()
            .filter(|(_, v)| !is_blank(v))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// Normalized contents of the settings file.
///
/// Keys this tool does not manage (legacy `profiles`, editor preferences,
/// ...) are kept in `extra` and written back untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsDocument {
    #[serde(default, deserialize_with = "deserialize_string_map")]
    pub env: BTreeMap<String, String>,
    #[serde(default)]
    pub config_history: Vec<ConfigEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub always_thinking_enabled: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SettingsDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_entry(&self) -> Option<&ConfigEntry> {
        self.config_history.iter().find(|c| c.is_active)
    }

    pub fn find_entry(&self, id: &str) -> Option<&ConfigEntry> {
        self.config_history.iter().find(|c| c.id == id)
    }

    /// Allocate a history id from `now`, bumping past ids already in use.
    pub fn next_config_id(&self, now: DateTime<Utc>) -> String {
        let mut candidate = now.timestamp_millis();
        while self.find_entry(&candidate.to_string()).is_some() {
            candidate += 1;
        }
        candidate.to_string()
    }

    /// Merge `fields` into `env` and record them as the active history entry.
    ///
    /// Non-blank values are written, blank values remove the key. An entry
    /// with the same provider and identical fields is replaced in place.
    /// Returns the id of the recorded entry.
    pub fn apply_provider_config(
        &mut self,
        template: &ProviderTemplate,
        fields: BTreeMap<String, String>,
        now: DateTime<Utc>,
    ) -> String {
        for (key, value) in &fields {
            if is_blank(value) {
                self.env.remove(key);
            } else {
                self.env.insert(key.clone(), value.clone());
            }
        }

        let id = self.next_config_id(now);
        let entry = ConfigEntry::new(id.clone(), template.identity(), fields, now);

        let existing = self
            .config_history
            .iter()
            .position(|c| c.provider_key == entry.provider_key && c.fields == entry.fields);
        let active_index = match existing {
            Some(index) => {
                self.config_history[index] = entry;
                index
            }
            None => {
                self.config_history.push(entry);
                self.config_history.len() - 1
            }
        };
        self.mark_active(Some(active_index));

        id
    }

    /// Make `id` the active entry and replace `env` with its fields.
    pub fn switch_active(&mut self, id: &str) -> Result<()> {
        let index = self.position(id)?;
        self.env = self.config_history[index].effective_fields();
        self.mark_active(Some(index));
        Ok(())
    }

    /// Remove an entry. Deleting the active entry also clears `env`.
    pub fn delete_config(&mut self, id: &str) -> Result<ConfigEntry> {
        let index = self.position(id)?;
        if self.config_history[index].is_active {
            self.env.clear();
        }
        Ok(self.config_history.remove(index))
    }

    /// Empty `env`. The history is kept, but nothing stays marked active
    /// since no entry is mirrored any more.
    pub fn clear_env(&mut self) {
        self.env.clear();
        self.mark_active(None);
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.config_history
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| PilotError::config_not_found(id))
    }

    fn mark_active(&mut self, active: Option<usize>) {
        for (index, entry) in self.config_history.iter_mut().enumerate() {
            entry.is_active = Some(index) == active;
        }
    }
}

/// Read a variable map whose values may be hand-written as numbers or
/// booleans. Those are kept as their JSON text; `null` entries are dropped.
fn deserialize_string_map<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?;
    Ok(raw.map(stringify_values).unwrap_or_default())
}

pub(crate) fn stringify_values(raw: BTreeMap<String, Value>) -> BTreeMap<String, String> {
    raw.into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(text) => Some((key, text)),
            Value::Null => None,
            other => {
                tracing::warn!(key = key.as_str(), value = %other, "Storing non-string value as text");
                Some((key, other.to_string()))
            }
        })
        .collect()
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
