//! Provider abstraction layer for external text-generation services
//!
//! Supports the Pollinations free text endpoint, Hugging Face hosted inference
//! and Anthropic Claude.
mod anthropic;
mod huggingface;
mod pollinations;
mod provider;

pub use anthropic::{ANTHROPIC_API_BASE, AnthropicProvider, DEFAULT_ANTHROPIC_MODEL};
pub use huggingface::{DEFAULT_HUGGINGFACE_MODELS, HUGGINGFACE_API_BASE, HuggingFaceProvider};
pub use pollinations::{POLLINATIONS_API_BASE, PollinationsProvider};
pub use provider::StoryProvider;
