//! Pollinations free text endpoint (no key required)

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::debug;

use crate::error::{Error, Result};
use crate::parsing::parse_free_text;
use crate::prompts::free_text_prompt;
use crate::types::{PAGE_COUNT, Story, StoryRequest};

use super::StoryProvider;
use super::provider::success_body;

pub const POLLINATIONS_API_BASE: &str = "https://text.pollinations.ai";

/// Bodies this short are error pages or refusals, not stories
const MIN_RESPONSE_CHARS: usize = 100;

/// Free-form text provider: the prompt goes in the URL path, prose comes back
pub struct PollinationsProvider {
    client: Client,
    base_url: String,
}

impl PollinationsProvider {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: POLLINATIONS_API_BASE.to_string(),
        }
    }

    /// Point the provider at a different host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn prompt_url(&self, prompt: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("Invalid Pollinations URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| Error::Config("Pollinations URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push("prompt")
            .push(prompt);
        Ok(url)
    }
}

impl Default for PollinationsProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl StoryProvider for PollinationsProvider {
    fn name(&self) -> &str {
        "Pollinations Text"
    }

    fn build_prompt(&self, request: &StoryRequest) -> String {
        free_text_prompt(request)
    }

    async fn fetch(&self, prompt: &str) -> Result<String> {
        let url = self.prompt_url(prompt)?;

        debug!("Sending story request to Pollinations");

        let response = self.client.get(url).send().await?;
        let text = success_body(response, self.name()).await?;

        if text.chars().count() <= MIN_RESPONSE_CHARS {
            return Err(Error::Provider(format!(
                "Pollinations response too short ({} chars)",
                text.chars().count()
            )));
        }

        Ok(text)
    }

    fn parse(&self, raw: &str, request: &StoryRequest) -> Result<Story> {
        let pages = parse_free_text(raw)?;
        if pages.len() < PAGE_COUNT {
            return Err(Error::Parse(format!(
                "free text yielded {} of {} pages",
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
