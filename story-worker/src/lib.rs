//! Cloudflare Worker for bedtime story generation
//!
//! Serves `POST /api/generate-story` (and CORS preflight) by handing the
//! request to the story core. Strategy and endpoints come from Worker vars;
//! ANTHROPIC_API_KEY and HUGGINGFACE_API_TOKEN are stored as Cloudflare secrets.

use std::io;
use std::sync::Once;

use story::{ApiResponse, RequestMethod, StoryHandler};
use tracing::Level;
use worker::{event, Env, Headers, Method, Request, Response, Result};

static LOGGING: Once = Once::new();

// ============ Logging ============

/// Buffers one formatted event and emits it to the Workers console on drop
#[derive(Default)]
struct ConsoleWriter {
    buf: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if !self.buf.is_empty() {
            let line = String::from_utf8_lossy(&self.buf);
            worker::console_log!("{}", line.trim_end());
        }
    }
}

/// Installed on the first fetch; `LOG_LEVEL` is only reachable through its `Env`
fn init_logging(level: &str) {
    LOGGING.call_once(|| {
        let level = level.parse::<Level>().unwrap_or(Level::INFO);
        // a second subscriber can only come from another init path; keep the first
        let _ = tracing_subscriber::fmt()
            .with_writer(ConsoleWriter::default)
            .with_max_level(level)
            .with_target(false)
            .without_time()
            .try_init();
    });
}

// ============ Request Translation ============

/// Read a secret first, then a plain var
fn lookup(env: &Env, key: &str) -> Option<String> {
    env.secret(key)
        .map(|s| s.to_string())
        .or_else(|_| env.var(key).map(|v| v.to_string()))
        .ok()
}

fn request_method(method: Method) -> RequestMethod {
    match method {
        Method::Options => RequestMethod::Options,
        Method::Post => RequestMethod::Post,
        other => RequestMethod::Other(format!("{:?}", other).to_uppercase()),
    }
}

fn into_response(reply: ApiResponse) -> Result<Response> {
    let headers = Headers::new();
    for (name, value) in &reply.headers {
        headers.set(name, value)?;
    }

    let response = match reply.body {
        Some(body) => Response::ok(body)?,
        None => Response::empty()?,
    };

    Ok(response.with_status(reply.status).with_headers(headers))
}

// ============ Main Handler ============

#[event(fetch)]
pub async fn main(mut req: Request, env: Env, _ctx: worker::Context) -> Result<Response> {
    init_logging(lookup(&env, "LOG_LEVEL").as_deref().unwrap_or("info"));

    let method = request_method(req.method());
    let body = if method == RequestMethod::Post {
        match req.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Failed to read request body: {}", e);
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    tracing::debug!("Handling {:?}", method);

    let handler = StoryHandler::from_lookup(|key| lookup(&env, key));
    into_response(handler.handle(method, &body).await)
}
