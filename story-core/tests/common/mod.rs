//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use story::{Error, Result, Story, StoryProvider, StoryRequest};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Nothing listens on the discard port, so connections are refused at once
pub const UNREACHABLE: &str = "http://127.0.0.1:9";

pub fn luna() -> StoryRequest {
    StoryRequest::new("Luna the Fox", "Whispering Forest", "kindness", "Crystal Feather")
}

pub fn luna_body() -> Vec<u8> {
    br#"{"character":"Luna the Fox","setting":"Whispering Forest","themes":"kindness","element":"Crystal Feather"}"#.to_vec()
}

/// What a scripted provider does when called
#[derive(Clone)]
pub enum Script {
    /// Return this many well-formed pages
    Pages(usize),
    /// Return raw text the parser rejects
    Garbage,
    /// Fail the HTTP call
    Unreachable,
}

/// Provider that follows a script and counts its calls
pub struct ScriptedProvider {
    name: String,
    script: Script,
    calls: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    pub fn new(name: &str, script: Script) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                name: name.to_string(),
                script,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }

    pub fn boxed(name: &str, script: Script) -> (Box<dyn StoryProvider>, Arc<AtomicUsize>) {
        let (provider, calls) = Self::new(name, script);
        (Box::new(provider), calls)
    }
}

#[async_trait(?Send)]
impl StoryProvider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn build_prompt(&self, request: &StoryRequest) -> String {
        format!("story about {}", request.character)
    }

    async fn fetch(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script {
            Script::Pages(count) => Ok((1..=count)
                .map(|n| format!("{} page {n}", self.name))
                .collect::<Vec<_>>()
                .join("\n")),
            Script::Garbage => Ok("???".to_string()),
            Script::Unreachable => Err(Error::Provider("connection refused".to_string())),
        }
    }

    fn parse(&self, raw: &str, request: &StoryRequest) -> Result<Story> {
        if raw == "???" {
            return Err(Error::Parse("garbage".to_string()));
        }
        Ok(Story::new(
            format!("{} story", request.character),
            raw.lines().map(str::to_string).collect(),
        ))
    }
}

pub fn calls(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}

// ============ Canned HTTP Server ============

/// Answer exactly one HTTP request on a local port with `status` and `body`.
///
/// Returns the base URL to point a provider at and a handle that resolves to
/// the raw request the server received.
pub async fn serve_once(status: u16, body: impl Into<String>) -> (String, JoinHandle<String>) {
    let body = body.into();
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind local listener");
    let addr = listener.local_addr().expect("local address");

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept connection");
        let request = read_request(&mut socket).await;

        let reason = if (200..300).contains(&status) { "OK" } else { "Error" };
        let reply = format!(
            "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(reply.as_bytes()).await.expect("write response");
        let _ = socket.shutdown().await;
        request
    });

    (format!("http://{addr}"), handle)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.expect("read request");
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Six blank-line separated paragraphs, each long enough to count as a page
pub fn free_text_story() -> String {
    (1..=6)
        .map(|n| format!("Paragraph {n} tells how Luna the Fox wandered deeper into the forest."))
        .collect::<Vec<_>>()
        .join("\n\n")
}
