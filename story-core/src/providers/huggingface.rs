//! Hugging Face hosted inference provider

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::parsing::parse_labeled_pages;
use crate::prompts::labeled_page_prompt;
use crate::types::{PAGE_COUNT, Story, StoryRequest};

use super::StoryProvider;
use super::provider::success_body;

pub const HUGGINGFACE_API_BASE: &str = "https://api-inference.huggingface.co";

/// Models tried in order when none are configured
pub const DEFAULT_HUGGINGFACE_MODELS: &[&str] = &[
    "mistralai/Mistral-7B-Instruct-v0.2",
    "HuggingFaceH4/zephyr-7b-beta",
    "google/flan-t5-large",
];

/// One hosted model on the inference API.
///
/// A strategy that tries several models builds one provider per model id.
pub struct HuggingFaceProvider {
    client: Client,
    base_url: String,
    api_token: Option<String>,
    model: String,
    name: String,
}

impl HuggingFaceProvider {
    pub fn new(model: impl Into<String>, api_token: Option<String>) -> Self {
        let model = model.into();
        Self {
            client: Client::new(),
            base_url: HUGGINGFACE_API_BASE.to_string(),
            api_token,
            name: format!("Hugging Face ({model})"),
            model,
        }
    }

    /// Point the provider at a different host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
    options: InferenceOptions,
}

#[derive(Debug, Serialize)]
struct InferenceParameters {
    max_new_tokens: u32,
    temperature: f32,
    return_full_text: bool,
}

#[derive(Debug, Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Batch(Vec<GeneratedText>),
    Single(GeneratedText),
    Failed { error: String },
}

impl InferenceResponse {
    fn into_text(self) -> Result<String> {
        let text = match self {
            Self::Batch(items) => items.into_iter().next().map(|item| item.generated_text),
            Self::Single(item) => Some(item.generated_text),
            Self::Failed { error } => {
                return Err(Error::Provider(format!("Hugging Face error: {error}")));
            }
        };

        text.filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::Provider("Hugging Face returned no text".to_string()))
    }
}

#[async_trait(?Send)]
impl StoryProvider for HuggingFaceProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn build_prompt(&self, request: &StoryRequest) -> String {
        labeled_page_prompt(request)
    }

    async fn fetch(&self, prompt: &str) -> Result<String> {
        let body = InferenceRequest {
            inputs: prompt,
            parameters: InferenceParameters {
                max_new_tokens: 800,
                temperature: 0.8,
                return_full_text: false,
            },
            options: InferenceOptions {
                wait_for_model: true,
            },
        };

        debug!("Sending story request to Hugging Face model {}", self.model);

        let mut builder = self
            .client
            .post(format!(
                "{}/models/{}",
                self.base_url.trim_end_matches('/'),
                self.model
            ))
            .header("Content-Type", "application/json")
            .json(&body);

        if let Some(token) = &self.api_token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }

        let response = builder.send().await?;
        let text = success_body(response, &self.name).await?;

        let parsed: InferenceResponse = serde_json::from_str(&text)?;
        parsed.into_text()
    }

    fn parse(&self, raw: &str, request: &StoryRequest) -> Result<Story> {
        let pages = parse_labeled_pages(raw);
        if pages.len() < PAGE_COUNT {
            return Err(Error::Parse(format!(
                "labeled output yielded {} of {} pages",
                pages.len(),
                PAGE_COUNT
            )));
        }

        Ok(Story::new(
            format!("The Adventures of {}", request.character),
            pages,
        ))
    }
}
