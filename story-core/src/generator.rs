//! Sequential provider chain with template fallback

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, error, info, warn};

use crate::config::{Config, Strategy};
use crate::error::{Error, Result};
use crate::providers::{AnthropicProvider, HuggingFaceProvider, PollinationsProvider, StoryProvider};
use crate::templates::fallback_story;
use crate::types::{
    AttemptOutcome, Generation, PAGE_COUNT, ProviderAttempt, StoryRequest, StoryResponse,
    TEMPLATE_SYSTEM,
};

/// Characters of raw provider output included in logs
const PREVIEW_CHARS: usize = 200;

/// Tries providers one at a time and returns the first usable story.
///
/// Providers are never retried and never run concurrently. When the chain is
/// exhausted the fallback templates answer, unless the generator was built
/// without a fallback.
pub struct StoryGenerator {
    providers: Vec<Box<dyn StoryProvider>>,
    fallback: bool,
    seed: Option<u64>,
}

impl StoryGenerator {
    pub fn new(providers: Vec<Box<dyn StoryProvider>>, fallback: bool) -> Self {
        Self {
            providers,
            fallback,
            seed: None,
        }
    }

    /// A generator that never calls out and always uses the templates
    pub fn template_only() -> Self {
        Self::new(Vec::new(), true)
    }

    /// Fix the template choice so fallback stories are reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Build the provider chain for the configured strategy.
    ///
    /// Fails before any network call when the strategy needs a key that is
    /// not set.
    pub fn from_config(config: &Config) -> Result<Self> {
        let providers: Vec<Box<dyn StoryProvider>> = match config.strategy {
            Strategy::FreeText => vec![Box::new(
                PollinationsProvider::new().with_base_url(&config.pollinations_base_url),
            )],
            Strategy::HuggingFace => config
                .huggingface_models
                .iter()
                .map(|model| {
                    Box::new(
                        HuggingFaceProvider::new(model, config.huggingface_token.clone())
                            .with_base_url(&config.huggingface_base_url),
                    ) as Box<dyn StoryProvider>
                })
                .collect(),
            Strategy::Anthropic => {
                let api_key = config.anthropic_api_key.clone().ok_or_else(|| {
                    Error::ProviderNotConfigured("ANTHROPIC_API_KEY not set".to_string())
                })?;
                vec![Box::new(
                    AnthropicProvider::new(api_key)
                        .with_model(&config.anthropic_model)
                        .with_base_url(&config.anthropic_base_url),
                )]
            }
            Strategy::Template => Vec::new(),
        };

        Ok(Self::new(providers, config.strategy.allows_fallback()))
    }

    /// Provider names in the order they are tried
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback
    }

    /// Run the chain for one request
    pub async fn generate(&self, request: &StoryRequest) -> Result<Generation> {
        let mut attempts = Vec::with_capacity(self.providers.len());

        for provider in &self.providers {
            let name = provider.name();
            info!("Trying {}...", name);

            let prompt = provider.build_prompt(request);
            let raw = match provider.fetch(&prompt).await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!("{} failed: {}", name, e);
                    attempts.push(ProviderAttempt {
                        provider: name.to_string(),
                        prompt,
                        raw_response: None,
                        outcome: AttemptOutcome::RequestFailed(e.to_string()),
                    });
                    continue;
                }
            };

            debug!("{} response: {}...", name, preview(&raw));

            let outcome = match provider.parse(&raw, request) {
                Ok(story) if story.pages.len() == PAGE_COUNT => {
                    info!("Story generated by {}", name);
                    attempts.push(ProviderAttempt {
                        provider: name.to_string(),
                        prompt,
                        raw_response: Some(raw),
                        outcome: AttemptOutcome::Accepted,
                    });
                    return Ok(Generation {
                        response: StoryResponse::new(story, request, name),
                        attempts,
                    });
                }
                Ok(story) => format!("got {} pages, expected {}", story.pages.len(), PAGE_COUNT),
                Err(e) => e.to_string(),
            };

            warn!("{} output unusable: {}", name, outcome);
            attempts.push(ProviderAttempt {
                provider: name.to_string(),
                prompt,
                raw_response: Some(raw),
                outcome: AttemptOutcome::ParseFailed(outcome),
            });
        }

        if !self.fallback {
            error!(
                "All {} providers failed and fallback is disabled",
                self.providers.len()
            );
            return Err(Error::Exhausted);
        }

        if !self.providers.is_empty() {
            info!("All providers failed, using fallback story generation");
        }

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let story = fallback_story(request, &mut rng);

        Ok(Generation {
            response: StoryResponse::new(story, request, TEMPLATE_SYSTEM),
            attempts,
        })
    }
}

fn preview(raw: &str) -> String {
    raw.chars().take(PREVIEW_CHARS).collect()
}
