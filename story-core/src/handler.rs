//! HTTP semantics of the story endpoint, independent of any server framework
//!
//! The Worker crate translates its request into a method plus body bytes, and
//! translates the returned `ApiResponse` back. Everything observable about the
//! endpoint (status codes, CORS, error bodies) is decided here.

use serde::Serialize;
use serde_json::json;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::generator::StoryGenerator;
use crate::types::{Generation, StoryRequest};

/// Headers attached to every response
pub const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "POST, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type"),
];

/// Request method as far as the endpoint cares
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestMethod {
    Options,
    Post,
    Other(String),
}

impl From<&str> for RequestMethod {
    fn from(method: &str) -> Self {
        if method.eq_ignore_ascii_case("OPTIONS") {
            Self::Options
        } else if method.eq_ignore_ascii_case("POST") {
            Self::Post
        } else {
            Self::Other(method.to_uppercase())
        }
    }
}

/// Framework-neutral response: status, headers and an optional JSON body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl ApiResponse {
    fn with_cors(status: u16, body: Option<String>) -> Self {
        let mut headers: Vec<(String, String)> = CORS_HEADERS
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        if body.is_some() {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }

        Self {
            status,
            headers,
            body,
        }
    }

    /// Empty-bodied response, used for CORS preflight
    pub fn empty(status: u16) -> Self {
        Self::with_cors(status, None)
    }

    /// JSON response; falls back to a plain 500 if serialization fails
    pub fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self::with_cors(status, Some(body)),
            Err(e) => {
                error!("Failed to serialize response: {}", e);
                Self::message(500, "Internal server error")
            }
        }
    }

    /// `{"error": message}` with the given status
    pub fn message(status: u16, message: &str) -> Self {
        Self::with_cors(status, Some(json!({ "error": message }).to_string()))
    }

    /// Error response with the status and public message for `err`
    pub fn from_error(err: &Error) -> Self {
        Self::message(err.status_code(), err.public_message())
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

enum GeneratorSource {
    Config(Config),
    Prebuilt(StoryGenerator),
    // only surfaced to requests that get past validation
    Misconfigured(String),
}

/// The story endpoint
pub struct StoryHandler {
    source: GeneratorSource,
}

impl StoryHandler {
    /// Handler that builds its provider chain from `config` per request
    pub fn new(config: Config) -> Self {
        Self {
            source: GeneratorSource::Config(config),
        }
    }

    /// Handler built from a key lookup
    ///
    /// A bad configuration does not fail construction. Preflight, method and
    /// validation answers stay intact, and only a valid `POST` sees the 500.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        match Config::from_lookup(lookup) {
            Ok(config) => Self::new(config),
            Err(e) => {
                error!("{}", e);
                let reason = match e {
                    Error::Config(reason) => reason,
                    other => other.to_string(),
                };
                Self {
                    source: GeneratorSource::Misconfigured(reason),
                }
            }
        }
    }

    /// Handler around an already-built generator
    pub fn with_generator(generator: StoryGenerator) -> Self {
        Self {
            source: GeneratorSource::Prebuilt(generator),
        }
    }

    /// Handle one request and always produce a response
    pub async fn handle(&self, method: impl Into<RequestMethod>, body: &[u8]) -> ApiResponse {
        let method = method.into();
        let span = info_span!("generate_story", request_id = %Uuid::new_v4(), method = ?method);
        self.dispatch(method, body).instrument(span).await
    }

    async fn dispatch(&self, method: RequestMethod, body: &[u8]) -> ApiResponse {
        match method {
            RequestMethod::Options => ApiResponse::empty(200),
            RequestMethod::Other(other) => {
                warn!("Rejecting {} request", other);
                ApiResponse::message(405, "Method not allowed")
            }
            RequestMethod::Post => match self.generate(body).await {
                Ok(generation) => {
                    info!(
                        "Returning story from {} after {} provider attempts",
                        generation.response.generated_by,
                        generation.attempts.len()
                    );
                    ApiResponse::json(200, &generation.response)
                }
                Err(e) => {
                    match &e {
                        Error::Validation(_) | Error::InvalidBody(_) => {
                            warn!("Rejecting request: {}", e)
                        }
                        _ => error!("Error generating story: {}", e),
                    }
                    ApiResponse::from_error(&e)
                }
            },
        }
    }

    async fn generate(&self, body: &[u8]) -> Result<Generation> {
        // validation first: a bad request never builds a chain or calls out
        let request = StoryRequest::from_json(body)?;

        match &self.source {
            GeneratorSource::Prebuilt(generator) => generator.generate(&request).await,
            GeneratorSource::Config(config) => {
                let generator = StoryGenerator::from_config(config)?;
                generator.generate(&request).await
            }
            GeneratorSource::Misconfigured(reason) => Err(Error::Config(reason.clone())),
        }
    }
}
