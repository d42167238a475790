//! Interactive flow for `provider apply`.
//!
//! Walks through a template's fields when `-i` is passed.
//! Uses dialoguer for terminal UI prompts.

use std::collections::BTreeMap;
use std::io::{self, Write};

use anyhow::Result;
use console::style;
use dialoguer::{Confirm, Input, Password, Select, theme::ColorfulTheme};

use pilot_core::display::mask_secret;
use pilot_core::provider::{
    API_KEY_PLACEHOLDER, ProviderTemplate, is_secret_field, require_template, templates,
};

/// Pre-filled values from CLI args that skip prompts.
#[derive(Debug, Clone, Default)]
pub struct PrefilledOptions {
    /// Provider key - if Some, skip provider selection
    pub provider: Option<String>,
    /// Fills every credential field without prompting
    pub api_key: Option<String>,
    /// Explicit field values - matching prompts are skipped
    pub fields: BTreeMap<String, String>,
    /// Accept template defaults and skip confirmation
    pub yes: bool,
}

/// Result of the wizard.
#[derive(Debug, Clone)]
pub struct WizardResult {
    pub provider: String,
    pub fields: BTreeMap<String, String>,
    /// Whether user confirmed the apply
    pub confirmed: bool,
}

/// Interactive flow for collecting provider fields.
pub struct ProviderWizard<W: Write = io::Stdout> {
    prefilled: PrefilledOptions,
    /// Output writer (for testing)
    writer: W,
    theme: ColorfulTheme,
}

impl ProviderWizard<io::Stdout> {
    pub fn new(prefilled: PrefilledOptions) -> Self {
        Self {
            prefilled,
            writer: io::stdout(),
            theme: ColorfulTheme::default(),
        }
    }
}

impl<W: Write> ProviderWizard<W> {
    /// Create a wizard with a custom writer (for testing).
    #[cfg(test)]
    pub fn with_writer(prefilled: PrefilledOptions, writer: W) -> Self {
        Self {
            prefilled,
            writer,
            theme: ColorfulTheme::default(),
        }
    }

    /// Run the flow:
    /// 1. Select provider if not provided
    /// 2. Fill each template field (credentials hidden)
    /// 3. Show summary and confirm
    pub fn collect(&mut self) -> Result<WizardResult> {
        self.print_header()?;

        let template = self.prompt_provider()?;
        let fields = self.prompt_fields(template)?;
        let confirmed = self.show_summary_and_confirm(template, &fields)?;

        Ok(WizardResult {
            provider: template.key.to_string(),
            fields,
            confirmed,
        })
    }

    fn print_header(&mut self) -> Result<()> {
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "{}",
            style("  Pilot Provider Setup").bold().cyan()
        )?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn prompt_provider(&self) -> Result<&'static ProviderTemplate> {
        if let Some(key) = &self.prefilled.provider {
            return Ok(require_template(key)?);
        }

        let items: Vec<_> = templates()
            .iter()
            .map(|t| format!("{} {}", t.icon, t.name))
            .collect();
        let selection = Select::with_theme(&self.theme)
            .with_prompt("Which provider?")
            .items(&items)
            .default(0)
            .interact()?;

        Ok(&templates()[selection])
    }

    fn prompt_fields(&self, template: &ProviderTemplate) -> Result<BTreeMap<String, String>> {
        let mut fields = BTreeMap::new();

        for (key, default) in template.fields {
            let value = if let Some(value) = self.prefilled.fields.get(*key) {
                value.clone()
            } else if *default == API_KEY_PLACEHOLDER {
                match &self.prefilled.api_key {
                    Some(api_key) => api_key.clone(),
                    None => self.prompt_secret(key)?,
                }
            } else if self.prefilled.yes {
                default.to_string()
            } else if is_secret_field(key) {
                self.prompt_secret(key)?
            } else {
                Input::<String>::with_theme(&self.theme)
                    .with_prompt(display_key(key))
                    .default(default.to_string())
                    .allow_empty(true)
                    .interact_text()?
            };
            fields.insert(key.to_string(), value);
        }

        // Extra --field values outside the template are kept as given.
        for (key, value) in &self.prefilled.fields {
            fields.entry(key.clone()).or_insert_with(|| value.clone());
        }

        Ok(fields)
    }

    fn prompt_secret(&self, key: &str) -> Result<String> {
        let value = Password::with_theme(&self.theme)
            .with_prompt(display_key(key))
            .interact()?;
        Ok(value)
    }

    fn show_summary_and_confirm(
        &mut self,
        template: &ProviderTemplate,
        fields: &BTreeMap<String, String>,
    ) -> Result<bool> {
        writeln!(self.writer)?;
        writeln!(self.writer, "{}", style("  Summary").bold())?;
        writeln!(self.writer, "  ───────────────────────────")?;
        writeln!(
            self.writer,
            "  Provider: {}",
            style(format!("{} {}", template.icon, template.name)).green()
        )?;

        for (key, value) in fields {
            let shown = if value.trim().is_empty() {
                style("(removed from env)".to_string()).dim()
            } else if is_secret_field(key) {
                style(mask_secret(value)).green()
            } else {
                style(value.clone()).green()
            };
            writeln!(self.writer, "  {:<32} {}", key, shown)?;
        }

        writeln!(self.writer)?;

        if self.prefilled.yes {
            return Ok(true);
        }

        let confirmed = Confirm::with_theme(&self.theme)
            .with_prompt("Apply this configuration?")
            .default(true)
            .interact()?;

        Ok(confirmed)
    }
}

/// `ANTHROPIC_DEFAULT_HAIKU_MODEL` -> `DEFAULT HAIKU MODEL`
fn display_key(key: &str) -> String {
    key.trim_start_matches("ANTHROPIC_").replace('_', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefilled_options_default() {
        let prefilled = PrefilledOptions::default();

        assert!(prefilled.provider.is_none());
        assert!(prefilled.api_key.is_none());
        assert!(prefilled.fields.is_empty());
        assert!(!prefilled.yes);
    }

    #[test]
    fn test_prefilled_skips_prompts() {
        let prefilled = PrefilledOptions {
            provider: Some("kimi".to_string()),
            api_key: Some("sk-moon-123456".to_string()),
            yes: true,
            ..Default::default()
        };

        let mut output = Vec::new();
        let mut wizard = ProviderWizard::with_writer(prefilled, &mut output);

        let result = wizard.collect().unwrap();

        assert!(result.confirmed);
        assert_eq!(result.provider, "kimi");
        assert_eq!(result.fields["ANTHROPIC_API_KEY"], "sk-moon-123456");
        assert_eq!(result.fields["ANTHROPIC_AUTH_TOKEN"], "sk-moon-123456");
        assert_eq!(result.fields["ANTHROPIC_MODEL"], "moonshot-v1-32k");
    }

    #[test]
    fn test_field_overrides_win_over_defaults() {
        let mut fields = BTreeMap::new();
        fields.insert("ANTHROPIC_MODEL".to_string(), "moonshot-v1-128k".to_string());
        fields.insert("EXTRA_FLAG".to_string(), "1".to_string());
        let prefilled = PrefilledOptions {
            provider: Some("kimi".to_string()),
            api_key: Some("k".to_string()),
            fields,
            yes: true,
        };

        let mut output = Vec::new();
        let mut wizard = ProviderWizard::with_writer(prefilled, &mut output);

        let result = wizard.collect().unwrap();

        assert_eq!(result.fields["ANTHROPIC_MODEL"], "moonshot-v1-128k");
        assert_eq!(result.fields["EXTRA_FLAG"], "1");
    }

    #[test]
    fn test_unknown_provider_fails() {
        let prefilled = PrefilledOptions {
            provider: Some("nope".to_string()),
            yes: true,
            ..Default::default()
        };

        let mut output = Vec::new();
        let mut wizard = ProviderWizard::with_writer(prefilled, &mut output);

        assert!(wizard.collect().is_err());
    }

    #[test]
    fn test_summary_masks_credentials() {
        let prefilled = PrefilledOptions {
            provider: Some("glm".to_string()),
            api_key: Some("super-secret-token".to_string()),
            yes: true,
            ..Default::default()
        };

        let mut output = Vec::new();
        let mut wizard = ProviderWizard::with_writer(prefilled, &mut output);
        wizard.collect().unwrap();

        let output_str = String::from_utf8(output).unwrap();
        assert!(output_str.contains("Summary"));
        assert!(output_str.contains("GLM"));
        assert!(output_str.contains("super-se****"));
        assert!(!output_str.contains("super-secret-token"));
        // GLM ships an empty small/fast model, which removes the key.
        assert!(output_str.contains("(removed from env)"));
    }

    #[test]
    fn test_display_key_strips_prefix() {
        assert_eq!(display_key("ANTHROPIC_DEFAULT_HAIKU_MODEL"), "DEFAULT HAIKU MODEL");
        assert_eq!(display_key("CUSTOM_VAR"), "CUSTOM VAR");
    }
}
