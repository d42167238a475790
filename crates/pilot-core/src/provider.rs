//! Built-in provider templates.
//!
//! Each template is the set of `ANTHROPIC_*` environment variables the
//! assistant CLI reads to route requests to a vendor. Values equal to
//! [`API_KEY_PLACEHOLDER`] must be supplied by the user before use.

use std::collections::BTreeMap;

use crate::error::{PilotError, Result};

/// Stands in for a secret the caller has to provide.
pub const API_KEY_PLACEHOLDER: &str = "{{API_KEY}}";

/// Key of the generic provider used when a migrated `env` matches no vendor.
pub const CUSTOM_PROVIDER_KEY: &str = "custom";

pub const BASE_URL_FIELD: &str = "ANTHROPIC_BASE_URL";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderTemplate {
    pub key: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    /// Field defaults in display order.
    pub fields: &'static [(&'static str, &'static str)],
}

impl ProviderTemplate {
    /// Template defaults as a field map, placeholders left in place.
    pub fn default_fields(&self) -> BTreeMap<String, String> {
        self.fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Template defaults with every placeholder replaced by `api_key`.
    pub fn resolve(&self, api_key: &str) -> BTreeMap<String, String> {
        self.fields
            .iter()
            .map(|(k, v)| {
                let value = if *v == API_KEY_PLACEHOLDER { api_key } else { v };
                (k.to_string(), value.to_string())
            })
            .collect()
    }

    /// Like [`resolve`](Self::resolve), without the defaults that are blank.
    /// Applying these only adds or overwrites `env` keys.
    pub fn resolve_non_blank(&self, api_key: &str) -> BTreeMap<String, String> {
        let mut fields = self.resolve(api_key);
        fields.retain(|_, value| !value.trim().is_empty());
        fields
    }

    pub fn identity(&self) -> ProviderIdentity {
        ProviderIdentity {
            key: self.key,
            name: self.name,
            icon: self.icon,
        }
    }
}

/// Name and icon recorded on a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderIdentity {
    pub key: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
}

pub const CUSTOM_PROVIDER: ProviderIdentity = ProviderIdentity {
    key: CUSTOM_PROVIDER_KEY,
    name: "Custom",
    icon: "🔧",
};

const TEMPLATES: &[ProviderTemplate] = &[
    ProviderTemplate {
        key: "claude",
        name: "Claude",
        icon: "🤖",
        fields: &[
            ("ANTHROPIC_BASE_URL", "https://api.anthropic.com"),
            ("ANTHROPIC_MODEL", "claude-3-5-sonnet-20241022"),
            ("ANTHROPIC_DEFAULT_HAIKU_MODEL", "claude-3-5-haiku-20241022"),
            ("ANTHROPIC_DEFAULT_OPUS_MODEL", "claude-3-opus-20240229"),
            ("ANTHROPIC_DEFAULT_SONNET_MODEL", "claude-3-5-sonnet-20241022"),
            ("ANTHROPIC_SMALL_FAST_MODEL", "claude-3-haiku-20240307"),
            ("ANTHROPIC_API_KEY", API_KEY_PLACEHOLDER),
            ("ANTHROPIC_AUTH_TOKEN", API_KEY_PLACEHOLDER),
        ],
    },
    ProviderTemplate {
        key: "glm",
        name: "GLM",
        icon: "🧠",
        fields: &[
            ("ANTHROPIC_BASE_URL", "https://open.bigmodel.cn/"),
            ("ANTHROPIC_MODEL", "GLM-4.6"),
            ("ANTHROPIC_DEFAULT_HAIKU_MODEL", "GLM-4.5-Air"),
            ("ANTHROPIC_DEFAULT_OPUS_MODEL", "GLM-4.6"),
            ("ANTHROPIC_DEFAULT_SONNET_MODEL", "GLM-4.6"),
            ("ANTHROPIC_SMALL_FAST_MODEL", ""),
            ("ANTHROPIC_API_KEY", API_KEY_PLACEHOLDER),
            ("ANTHROPIC_AUTH_TOKEN", API_KEY_PLACEHOLDER),
        ],
    },
    ProviderTemplate {
        key: "kimi",
        name: "Kimi",
        icon: "🌙",
        fields: &[
            ("ANTHROPIC_BASE_URL", "https://api.moonshot.cn/v1"),
            ("ANTHROPIC_MODEL", "moonshot-v1-32k"),
            ("ANTHROPIC_DEFAULT_HAIKU_MODEL", "moonshot-v1-8k"),
            ("ANTHROPIC_DEFAULT_OPUS_MODEL", "moonshot-v1-128k"),
            ("ANTHROPIC_DEFAULT_SONNET_MODEL", "moonshot-v1-32k"),
            ("ANTHROPIC_SMALL_FAST_MODEL", "moonshot-v1-8k"),
            ("ANTHROPIC_API_KEY", API_KEY_PLACEHOLDER),
            ("ANTHROPIC_AUTH_TOKEN", API_KEY_PLACEHOLDER),
        ],
    },
    ProviderTemplate {
        key: "openai",
        name: "OpenAI",
        icon: "🔷",
        fields: &[
            ("ANTHROPIC_BASE_URL", "https://api.openai.com/v1"),
            ("ANTHROPIC_MODEL", "gpt-4-turbo"),
            ("ANTHROPIC_DEFAULT_HAIKU_MODEL", "gpt-3.5-turbo"),
            ("ANTHROPIC_DEFAULT_OPUS_MODEL", "gpt-4-turbo"),
            ("ANTHROPIC_DEFAULT_SONNET_MODEL", "gpt-4"),
            ("ANTHROPIC_SMALL_FAST_MODEL", "gpt-3.5-turbo"),
            ("ANTHROPIC_API_KEY", API_KEY_PLACEHOLDER),
            ("ANTHROPIC_AUTH_TOKEN", API_KEY_PLACEHOLDER),
        ],
    },
    ProviderTemplate {
        key: "deepseek",
        name: "DeepSeek",
        icon: "🔬",
        fields: &[
            ("ANTHROPIC_BASE_URL", "https://api.deepseek.com/v1"),
            ("ANTHROPIC_MODEL", "deepseek-chat"),
            ("ANTHROPIC_DEFAULT_HAIKU_MODEL", "deepseek-chat"),
            ("ANTHROPIC_DEFAULT_OPUS_MODEL", "deepseek-chat"),
            ("ANTHROPIC_DEFAULT_SONNET_MODEL", "deepseek-chat"),
            ("ANTHROPIC_SMALL_FAST_MODEL", ""),
            ("ANTHROPIC_API_KEY", API_KEY_PLACEHOLDER),
            ("ANTHROPIC_AUTH_TOKEN", API_KEY_PLACEHOLDER),
        ],
    },
];

/// Base-URL fragments checked in order during migration. First hit wins.
const BASE_URL_HINTS: &[(&str, &str)] = &[
    ("open.bigmodel.cn", "glm"),
    ("api.moonshot.cn", "kimi"),
    ("openai.com", "openai"),
    ("api.deepseek.com", "deepseek"),
    ("api.anthropic.com", "claude"),
];

/// All templates in display order.
pub fn templates() -> &'static [ProviderTemplate] {
    TEMPLATES
}

pub fn find_template(key: &str) -> Option<&'static ProviderTemplate> {
    TEMPLATES.iter().find(|t| t.key == key)
}

pub fn require_template(key: &str) -> Result<&'static ProviderTemplate> {
    find_template(key).ok_or_else(|| PilotError::UnknownProvider(key.to_string()))
}

/// Guess the vendor behind a base URL by substring match.
pub fn identify_provider(base_url: &str) -> ProviderIdentity {
    BASE_URL_HINTS
        .iter()
        .find(|(fragment, _)| base_url.contains(fragment))
        .and_then(|(_, key)| find_template(key))
        .map(ProviderTemplate::identity)
        .unwrap_or(CUSTOM_PROVIDER)
}

/// Whether a field holds a credential and should be masked or hidden.
pub fn is_secret_field(name: &str) -> bool {
    name.contains("API_KEY") || name.contains("AUTH_TOKEN")
}
