//! [`InferenceClient`] – Ollama-style text generation over HTTP.
//!
//! The model server exposes two endpoints:
//!
//! | Method | Path | Body | Reply |
//! |---|---|---|---|
//! | `POST` | `/api/generate` | `{"model", "stream": false, "prompt"}` | `{"response": "<text>", …}` |
//! | `GET` | `/api/tags` | – | `{"models": [{"name": …}, …]}` |
//!
//! The agent loop only depends on the [`Inference`] trait, so tests and
//! alternative back-ends can stand in for the HTTP client.
//!
//! # Example
//!
//! ```rust,no_run
//! use craftpilot_runtime::inference::{Inference, InferenceClient};
//!
//! # async fn demo() -> Result<(), craftpilot_runtime::inference::InferenceError> {
//! let client = InferenceClient::new("http://localhost:5555", "minecraft-ai");
//! let reply = client.infer("Act as an expert Minecraft player…").await?;
//! println!("{reply}");
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use craftpilot_types::CraftError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Default base URL of the local model server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5555";
/// Default fine-tuned model name.
pub const DEFAULT_MODEL: &str = "minecraft-ai";

// ─────────────────────────────────────────────────────────────────────────────
// Error type
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can arise from an inference request.
#[derive(Error, Debug)]
pub enum InferenceError {
    /// Connection, timeout or body-read failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("inference endpoint returned HTTP {0}")]
    Status(u16),
    /// The body was not the expected JSON shape.
    #[error("unexpected response format: {0}")]
    BadResponse(String),
}

impl From<InferenceError> for CraftError {
    fn from(e: InferenceError) -> Self {
        CraftError::Inference(e.to_string())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Trait seam
// ─────────────────────────────────────────────────────────────────────────────

/// Something that turns a prompt into a free-text reply.
#[async_trait]
pub trait Inference: Send + Sync {
    async fn infer(&self, prompt: &str) -> Result<String, InferenceError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire shapes
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    stream: bool,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

/// One entry of `GET /api/tags`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelTag {
    pub name: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// InferenceClient
// ─────────────────────────────────────────────────────────────────────────────

/// Async client for a local generation endpoint.  Construct once and share.
pub struct InferenceClient {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl InferenceClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Same as [`InferenceClient::new`] but every request fails with
    /// [`InferenceError::Transport`] after `timeout`.
    pub fn with_timeout(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, InferenceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            ..Self::new(base_url, model)
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one non-streaming generation request and return the reply text.
    ///
    /// # Errors
    ///
    /// [`InferenceError::Transport`] if the request cannot be completed,
    /// [`InferenceError::Status`] on a non-2xx answer, and
    /// [`InferenceError::BadResponse`] if the body lacks a `response` string.
    pub async fn generate(&self, prompt: &str) -> Result<String, InferenceError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model: &self.model,
            stream: false,
            prompt,
        };
        debug!(url = %url, model = %self.model, prompt_len = prompt.len(), "POST generate");

        let resp = self.client.post(&url).json(&body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(InferenceError::Status(status.as_u16()));
        }
        let text = resp.text().await?;
        let parsed: GenerateResponse =
            serde_json::from_str(&text).map_err(|e| InferenceError::BadResponse(e.to_string()))?;
        parsed
            .response
            .ok_or_else(|| InferenceError::BadResponse("missing `response` field".into()))
    }

    /// Names of the models the server has available.
    pub async fn list_models(&self) -> Result<Vec<ModelTag>, InferenceError> {
        let url = format!("{}/api/tags", self.base_url);
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(InferenceError::Status(status.as_u16()));
        }
        let text = resp.text().await?;
        let tags: TagsResponse =
            serde_json::from_str(&text).map_err(|e| InferenceError::BadResponse(e.to_string()))?;
        Ok(tags.models)
    }
}

#[async_trait]
impl Inference for InferenceClient {
    async fn infer(&self, prompt: &str) -> Result<String, InferenceError> {
        self.generate(prompt).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Read one HTTP/1.1 request (headers plus `content-length` body).
    async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(head_end) = text.find("\r\n\r\n") {
                let content_length = text[..head_end]
                    .lines()
                    .find_map(|l| {
                        let (k, v) = l.split_once(':')?;
                        k.trim()
                            .eq_ignore_ascii_case("content-length")
                            .then(|| v.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= head_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Serve exactly one canned response and hand back the raw request.
    pub(crate) async fn serve_once(status_line: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_request(&mut stream).await;
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
            request
        });
        (format!("http://{addr}"), handle)
    }

    /// A server that accepts connections and never answers.
    pub(crate) async fn silent_url() -> (String, JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let mut open = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                open.push(stream);
            }
        });
        (format!("http://{addr}"), handle)
    }

    /// A base URL nothing is listening on.
    pub(crate) async fn closed_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn generate_posts_prompt_and_returns_response_field() {
        let (url, server) =
            serve_once("200 OK", r#"{"model":"minecraft-ai","response":"hello","done":true}"#).await;
        let client = InferenceClient::new(url, "minecraft-ai");

        let reply = client.generate("the prompt").await.unwrap();
        assert_eq!(reply, "hello");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/generate "));
        let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
        let json: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(json["model"], "minecraft-ai");
        assert_eq!(json["stream"], false);
        assert_eq!(json["prompt"], "the prompt");
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let (url, _server) = serve_once("500 Internal Server Error", "{}").await;
        let client = InferenceClient::new(url, "minecraft-ai");
        match client.generate("p").await {
            Err(InferenceError::Status(500)) => {}
            other => panic!("expected Status(500), got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_response_field_is_bad_response() {
        let (url, _server) = serve_once("200 OK", r#"{"done":true}"#).await;
        let client = InferenceClient::new(url, "minecraft-ai");
        assert!(matches!(
            client.generate("p").await,
            Err(InferenceError::BadResponse(_))
        ));
    }

    #[tokio::test]
    async fn non_json_body_is_bad_response() {
        let (url, _server) = serve_once("200 OK", "not json").await;
        let client = InferenceClient::new(url, "minecraft-ai");
        assert!(matches!(
            client.generate("p").await,
            Err(InferenceError::BadResponse(_))
        ));
    }

    #[tokio::test]
    async fn refused_connection_is_transport_error() {
        let client = InferenceClient::new(closed_url().await, "minecraft-ai");
        assert!(matches!(
            client.infer("p").await,
            Err(InferenceError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn silent_server_times_out_as_transport_error() {
        let (url, server) = silent_url().await;
        let client =
            InferenceClient::with_timeout(url, "minecraft-ai", Duration::from_millis(200)).unwrap();
        let started = std::time::Instant::now();
        match client.generate("p").await {
            Err(InferenceError::Transport(e)) => assert!(e.is_timeout(), "{e}"),
            other => panic!("expected a timeout, got {other:?}"),
        }
        assert!(started.elapsed() < Duration::from_secs(5));
        server.abort();
    }

    #[tokio::test]
    async fn list_models_reads_tags() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"models":[{"name":"minecraft-ai:latest","size":1},{"name":"llama3"}]}"#,
        )
        .await;
        let client = InferenceClient::new(format!("{url}/"), "minecraft-ai");
        let models = client.list_models().await.unwrap();
        let names: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["minecraft-ai:latest", "llama3"]);
        assert!(server.await.unwrap().starts_with("GET /api/tags "));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = InferenceClient::new("http://localhost:5555/", DEFAULT_MODEL);
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
        assert_eq!(client.model(), "minecraft-ai");
    }
}
