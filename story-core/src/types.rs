//! Core types shared by the generator, providers and handler

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Every story has exactly this many pages
pub const PAGE_COUNT: usize = 6;

/// Provenance tag for stories built from the fallback templates
pub const TEMPLATE_SYSTEM: &str = "Enhanced Template System";

/// Incoming story parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoryRequest {
    pub character: String,
    pub setting: String,
    pub themes: String,
    pub element: String,
}

/// Wire form of the request body; every field may be absent or null
#[derive(Debug, Default, Deserialize)]
struct RawStoryRequest {
    #[serde(default)]
    character: Option<String>,
    #[serde(default)]
    setting: Option<String>,
    #[serde(default)]
    themes: Option<String>,
    #[serde(default)]
    element: Option<String>,
}

impl StoryRequest {
    pub fn new(
        character: impl Into<String>,
        setting: impl Into<String>,
        themes: impl Into<String>,
        element: impl Into<String>,
    ) -> Self {
        Self {
            character: character.into(),
            setting: setting.into(),
            themes: themes.into(),
            element: element.into(),
        }
    }

    /// Parse and validate a JSON request body.
    ///
    /// A body that is not a JSON object is `InvalidBody`; an object with any
    /// field absent, null or empty is `Validation`.
    pub fn from_json(body: &[u8]) -> Result<Self> {
        let raw: RawStoryRequest =
            serde_json::from_slice(body).map_err(|e| Error::InvalidBody(e.to_string()))?;

        let mut missing = Vec::new();
        let mut take = |name: &'static str, value: Option<String>| match value {
            Some(v) if !v.is_empty() => v,
            _ => {
                missing.push(name);
                String::new()
            }
        };

        let request = Self {
            character: take("character", raw.character),
            setting: take("setting", raw.setting),
            themes: take("themes", raw.themes),
            element: take("element", raw.element),
        };

        if !missing.is_empty() {
            return Err(Error::Validation(format!(
                "missing fields: {}",
                missing.join(", ")
            )));
        }

        Ok(request)
    }
}

/// Title plus pages, before provenance and timestamp are attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Story {
    pub title: String,
    pub pages: Vec<String>,
}

impl Story {
    pub fn new(title: impl Into<String>, pages: Vec<String>) -> Self {
        Self {
            title: title.into(),
            pages,
        }
    }
}

/// JSON document returned to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryResponse {
    pub title: String,
    pub pages: Vec<String>,
    pub character: String,
    pub setting: String,
    pub generated_by: String,
    pub timestamp: String,
}

impl StoryResponse {
    /// Stamp a story with its inputs, provenance and the current time
    pub fn new(story: Story, request: &StoryRequest, generated_by: impl Into<String>) -> Self {
        Self {
            title: story.title,
            pages: story.pages,
            character: request.character.clone(),
            setting: request.setting.clone(),
            generated_by: generated_by.into(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// How a single provider attempt ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Accepted,
    RequestFailed(String),
    ParseFailed(String),
}

/// Record of one provider call, kept only for the duration of a request
#[derive(Debug, Clone)]
pub struct ProviderAttempt {
    pub provider: String,
    pub prompt: String,
    pub raw_response: Option<String>,
    pub outcome: AttemptOutcome,
}

impl ProviderAttempt {
    pub fn is_accepted(&self) -> bool {
        self.outcome == AttemptOutcome::Accepted
    }
}

/// Result of a generation run: the response plus the attempts behind it
#[derive(Debug, Clone)]
pub struct Generation {
    pub response: StoryResponse,
    pub attempts: Vec<ProviderAttempt>,
}
