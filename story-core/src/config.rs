//! Deployment configuration read from environment variables
//!
//! The same lookup drives native use (`std::env`) and the Worker (`Env`
//! vars and secrets), so both see identical defaults.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::providers::{
    ANTHROPIC_API_BASE, DEFAULT_ANTHROPIC_MODEL, DEFAULT_HUGGINGFACE_MODELS, HUGGINGFACE_API_BASE,
    POLLINATIONS_API_BASE,
};

/// Which provider chain a deployment uses.
///
/// Strategies are alternatives, not stages: exactly one is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strategy {
    /// Pollinations free text, then templates
    #[default]
    FreeText,
    /// Each configured Hugging Face model in order, then templates
    HuggingFace,
    /// Anthropic Claude only; failure is an error
    Anthropic,
    /// Templates only, no outbound calls
    Template,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FreeText => "free-text",
            Self::HuggingFace => "hugging-face",
            Self::Anthropic => "anthropic",
            Self::Template => "template",
        }
    }

    /// Whether the template fallback may answer when every provider fails
    pub fn allows_fallback(&self) -> bool {
        !matches!(self, Self::Anthropic)
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "free-text" | "pollinations" => Ok(Self::FreeText),
            "hugging-face" | "huggingface" => Ok(Self::HuggingFace),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "template" | "templates" => Ok(Self::Template),
            other => Err(Error::Config(format!("Unknown story strategy: {other}"))),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone)]
pub struct Config {
    pub strategy: Strategy,
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    pub anthropic_base_url: String,
    pub huggingface_token: Option<String>,
    pub huggingface_models: Vec<String>,
    pub huggingface_base_url: String,
    pub pollinations_base_url: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            anthropic_api_key: None,
            anthropic_model: DEFAULT_ANTHROPIC_MODEL.to_string(),
            anthropic_base_url: ANTHROPIC_API_BASE.to_string(),
            huggingface_token: None,
            huggingface_models: DEFAULT_HUGGINGFACE_MODELS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            huggingface_base_url: HUGGINGFACE_API_BASE.to_string(),
            pollinations_base_url: POLLINATIONS_API_BASE.to_string(),
            log_level: "info".to_string(),
        }
    }
}

// keys stay out of logs
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("strategy", &self.strategy)
            .field("anthropic_api_key", &self.anthropic_api_key.as_ref().map(|_| "<redacted>"))
            .field("anthropic_model", &self.anthropic_model)
            .field("anthropic_base_url", &self.anthropic_base_url)
            .field("huggingface_token", &self.huggingface_token.as_ref().map(|_| "<redacted>"))
            .field("huggingface_models", &self.huggingface_models)
            .field("huggingface_base_url", &self.huggingface_base_url)
            .field("pollinations_base_url", &self.pollinations_base_url)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Build a config from a key lookup; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let strategy = match get("STORY_STRATEGY") {
            Some(name) => name.parse()?,
            None => defaults.strategy,
        };

        let huggingface_models = get("HUGGINGFACE_MODELS")
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|models| !models.is_empty())
            .unwrap_or(defaults.huggingface_models);

        Ok(Self {
            strategy,
            anthropic_api_key: get("ANTHROPIC_API_KEY"),
            anthropic_model: get("ANTHROPIC_MODEL").unwrap_or(defaults.anthropic_model),
            anthropic_base_url: get("ANTHROPIC_BASE_URL").unwrap_or(defaults.anthropic_base_url),
            huggingface_token: get("HUGGINGFACE_API_TOKEN"),
            huggingface_models,
            huggingface_base_url: get("HUGGINGFACE_BASE_URL")
                .unwrap_or(defaults.huggingface_base_url),
            pollinations_base_url: get("POLLINATIONS_BASE_URL")
                .unwrap_or(defaults.pollinations_base_url),
            log_level: get("LOG_LEVEL").unwrap_or(defaults.log_level),
        })
    }

    /// Build a config from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }
}
