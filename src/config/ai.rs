//! Model provider configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::feedback::ExtractionPolicy;

/// Default extraction policy, used when no override is configured. The
/// policy is data: swap it per deployment via `extraction_policy` (inline
/// text) or `extraction_policy_path` (a file).
const DEFAULT_EXTRACTION_POLICY: &str = "\
You are the intake assistant for a municipal civic feedback desk. Talk with \
the resident naturally and, while you do, fill in the four feedback fields: \
title (a short headline), category (request, question or praise), \
description (what happened, in the resident's words) and place (where it \
concerns, as searchable place text).

Guidelines:
- Only record what the resident actually said; never invent field values.
- Ask for one missing field at a time, in plain language.
- Leave a field null when this turn added nothing new for it.
- When every field is filled, thank the resident and tell them their \
feedback has been registered.";

/// Model provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Anthropic API key
    pub anthropic_api_key: Option<String>,

    /// OpenAI API key
    pub openai_api_key: Option<String>,

    /// Which provider to use
    #[serde(default = "default_provider")]
    pub provider: ModelProvider,

    /// Model name override (provider default when unset)
    pub model: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries on failure
    #[serde(default = "default_retries")]
    pub max_retries: u32,

    /// Inline extraction policy text (takes precedence over the path)
    pub extraction_policy: Option<String>,

    /// Path to a file holding the extraction policy text
    pub extraction_policy_path: Option<String>,
}

/// Model provider type
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    #[default]
    Anthropic,
    OpenAi,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if Anthropic is configured
    pub fn has_anthropic(&self) -> bool {
        self.anthropic_api_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    /// Check if OpenAI is configured
    pub fn has_openai(&self) -> bool {
        self.openai_api_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    /// Resolve the extraction policy: inline text wins, then the policy
    /// file, then the packaged default.
    pub fn extraction_policy(&self) -> Result<ExtractionPolicy, ValidationError> {
        if let Some(text) = &self.extraction_policy {
            return Ok(ExtractionPolicy::new(text.clone()));
        }
        if let Some(path) = &self.extraction_policy_path {
            let text = std::fs::read_to_string(path)
                .map_err(|e| ValidationError::PolicyFileUnreadable(format!("{}: {}", path, e)))?;
            return Ok(ExtractionPolicy::new(text));
        }
        Ok(ExtractionPolicy::new(DEFAULT_EXTRACTION_POLICY))
    }

    /// Validate model provider configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_anthropic() && !self.has_openai() {
            return Err(ValidationError::NoModelProviderConfigured);
        }

        match self.provider {
            ModelProvider::Anthropic if !self.has_anthropic() => {
                return Err(ValidationError::MissingRequired("ANTHROPIC_API_KEY"));
            }
            ModelProvider::OpenAi if !self.has_openai() => {
                return Err(ValidationError::MissingRequired("OPENAI_API_KEY"));
            }
            _ => {}
        }

        // Fail startup on an unreadable policy file rather than at first use.
        self.extraction_policy()?;

        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            anthropic_api_key: None,
            openai_api_key: None,
            provider: default_provider(),
            model: None,
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            extraction_policy: None,
            extraction_policy_path: None,
        }
    }
}

fn default_provider() -> ModelProvider {
    ModelProvider::Anthropic
}

fn default_timeout() -> u64 {
    60
}

fn default_retries() -> u32 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ai_config_defaults() {
        let config = AiConfig::default();
        assert_eq!(config.provider, ModelProvider::Anthropic);
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn timeout_as_duration() {
        let config = AiConfig {
            timeout_secs: 30,
            ..Default::default()
        };
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn validation_requires_some_provider() {
        assert!(AiConfig::default().validate().is_err());
    }

    #[test]
    fn validation_requires_key_for_selected_provider() {
        let config = AiConfig {
            provider: ModelProvider::Anthropic,
            openai_api_key: Some("sk-xxx".to_string()),
            anthropic_api_key: None,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validation_passes_with_matching_key() {
        let config = AiConfig {
            provider: ModelProvider::OpenAi,
            openai_api_key: Some("sk-xxx".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn inline_policy_wins_over_default() {
        let config = AiConfig {
            extraction_policy: Some("Custom policy.".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.extraction_policy().unwrap(),
            ExtractionPolicy::new("Custom policy.")
        );
    }

    #[test]
    fn missing_policy_file_fails_validation() {
        let config = AiConfig {
            anthropic_api_key: Some("sk-ant-xxx".to_string()),
            extraction_policy_path: Some("/does/not/exist.md".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::PolicyFileUnreadable(_))
        ));
    }

    #[test]
    fn default_policy_names_the_form_fields() {
        let policy = AiConfig::default().extraction_policy().unwrap();
        for field in ["title", "category", "description", "place"] {
            assert!(policy.as_str().contains(field));
        }
    }
}
