//! Formatting helpers shared by the frontends.

use crate::provider::API_KEY_PLACEHOLDER;

const VISIBLE_PREFIX: usize = 8;

/// Hide most of a credential for display.
///
/// Unfilled placeholders render as `[required]`; values longer than eight
/// characters keep their first eight and end in `****`.
pub fn mask_secret(value: &str) -> String {
    if value.contains(API_KEY_PLACEHOLDER) {
        return "[required]".to_string();
    }
    if value.chars().count() > VISIBLE_PREFIX && !value.contains("{{") {
        let prefix: String = value.chars().take(VISIBLE_PREFIX).collect();
        return format!("{prefix}****");
    }
    value.to_string()
}
