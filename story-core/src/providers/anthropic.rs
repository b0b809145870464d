//! Anthropic Claude provider

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::parsing::parse_json_story;
use crate::prompts::json_prompt;
use crate::types::{Story, StoryRequest};

use super::StoryProvider;
use super::provider::success_body;

pub const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Claude via the Messages API, asked to answer with a JSON story
pub struct AnthropicProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: ANTHROPIC_API_BASE.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_ANTHROPIC_MODEL.to_string(),
        }
    }

    /// Set the model to use
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the provider at a different host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Serialize)]
struct MessageRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: Option<String>,
}

impl MessageResponse {
    fn first_text(self) -> Result<String> {
        self.content
            .into_iter()
            .find(|block| block.content_type == "text")
            .and_then(|block| block.text)
            .ok_or_else(|| Error::Provider("No text content returned".to_string()))
    }
}

#[async_trait(?Send)]
impl StoryProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "Anthropic Claude"
    }

    fn build_prompt(&self, request: &StoryRequest) -> String {
        json_prompt(request)
    }

    async fn fetch(&self, prompt: &str) -> Result<String> {
        let message_request = MessageRequest {
            model: &self.model,
            max_tokens: 1500,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        debug!("Sending story request to Anthropic Claude ({})", self.model);

        let response = self
            .client
            .post(format!("{}/messages", self.base_url.trim_end_matches('/')))
            .header("x-api-key", self.api_key.as_str())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&message_request)
            .send()
            .await?;

        let text = success_body(response, self.name()).await?;
        let message: MessageResponse = serde_json::from_str(&text)?;
        message.first_text()
    }

    fn parse(&self, raw: &str, request: &StoryRequest) -> Result<Story> {
        parse_json_story(raw, request)
    }
}
