//! Story provider trait

use async_trait::async_trait;
use tracing::error;

use crate::error::{Error, Result};
use crate::types::{Story, StoryRequest};

/// An external text-generation service that can produce a story.
///
/// The generator drives each provider in two steps so that every attempt can
/// be recorded: `fetch` performs the HTTP call and returns the raw text,
/// `parse` turns that text into a six-page story. Futures are `?Send` because
/// the Worker runtime is single-threaded wasm.
#[async_trait(?Send)]
pub trait StoryProvider {
    /// Name reported in `generatedBy` when this provider wins
    fn name(&self) -> &str;

    /// Prompt sent to the service for this request
    fn build_prompt(&self, request: &StoryRequest) -> String;

    /// Call the service and return its raw text output
    async fn fetch(&self, prompt: &str) -> Result<String>;

    /// Turn raw output into a six-page story
    fn parse(&self, raw: &str, request: &StoryRequest) -> Result<Story>;
}

/// Read the body of a response, turning non-2xx statuses into provider errors
pub(crate) async fn success_body(response: reqwest::Response, provider: &str) -> Result<String> {
    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        error!("{} API error: {} - {}", provider, status, error_text);
        return Err(Error::Provider(format!(
            "{} API error: {} - {}",
            provider, status, error_text
        )));
    }

    Ok(response.text().await?)
}
