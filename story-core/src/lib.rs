//! Story Core - bedtime story generation behind a single HTTP endpoint
//!
//! Builds a prompt from four story parameters, asks external text-generation
//! providers in a fixed order, parses the first usable answer into six pages
//! and falls back to hand-written templates when every provider fails.

pub mod config;
pub mod error;
pub mod generator;
pub mod handler;
pub mod parsing;
pub mod prompts;
pub mod providers;
pub mod templates;
pub mod types;

pub use error::{Error, Result};
pub use types::*;

pub use config::{Config, Strategy};
pub use generator::StoryGenerator;
pub use handler::{ApiResponse, CORS_HEADERS, RequestMethod, StoryHandler};
pub use providers::StoryProvider;
