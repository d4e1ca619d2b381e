/// LLM Client: the single point of entry for all completion API calls in TalentScout.
///
/// ARCHITECTURAL RULE: No other module may call the completion endpoint directly.
/// The interview session only sees the `CompletionService` trait.
///
/// The endpoint speaks the OpenAI-compatible chat-completions protocol (OpenRouter by default).
/// There are no retries here: one call per invocation, bounded by the configured timeout.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

pub mod parsing;
pub mod prompts;

use parsing::{parse_feedback, parse_question};
use prompts::{FEEDBACK_SYSTEM, QUESTION_SYSTEM};

pub const DEFAULT_ENDPOINT_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "moonshotai/kimi-k2:free";
const MAX_TOKENS: u32 = 512;
const APP_TITLE: &str = "TalentScout Hiring Assistant";

/// Why a completion could not be turned into usable text.
/// Both kinds are recovered by the caller; neither reaches the candidate.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CompletionError {
    /// Transport failure, timeout, or non-2xx status.
    #[error("completion endpoint unavailable: {0}")]
    Unavailable(String),

    /// The endpoint answered but the content is unusable.
    #[error("malformed completion output: {0}")]
    MalformedOutput(String),
}

/// What the interview session needs from a language model.
///
/// Carried in `AppState` as `Arc<dyn CompletionService>` so tests can script outcomes.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Returns exactly one interview question, or an error if the output cannot be trusted.
    async fn generate_question(&self, prompt: &str) -> Result<String, CompletionError>;

    /// Returns free-form feedback on a candidate's answer.
    async fn generate_feedback(&self, prompt: &str) -> Result<String, CompletionError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// HTTP client for the configured chat-completions endpoint.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    endpoint_url: String,
    api_key: String,
    model: String,
}

impl LlmClient {
    pub fn new(
        endpoint_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint_url: endpoint_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Self::new(
            config.completion_endpoint_url.clone(),
            config.completion_api_key.clone(),
            config.completion_model.clone(),
            config.completion_timeout,
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Makes one raw call to the endpoint and returns the first choice's text.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<String, CompletionError> {
        let request_body = ChatRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let response = self
            .client
            .post(&self.endpoint_url)
            .bearer_auth(&self.api_key)
            .header("X-Title", APP_TITLE)
            .json(&request_body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            warn!("Completion API returned {}: {}", status, message);
            return Err(CompletionError::Unavailable(format!(
                "status {}: {}",
                status.as_u16(),
                message
            )));
        }

        let body = response.text().await.map_err(transport_error)?;

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| CompletionError::MalformedOutput(format!("undecodable body: {e}")))?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "Completion call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| CompletionError::MalformedOutput("response has no content".to_string()))
    }
}

fn transport_error(e: reqwest::Error) -> CompletionError {
    if e.is_timeout() {
        CompletionError::Unavailable("request timed out".to_string())
    } else {
        CompletionError::Unavailable(e.to_string())
    }
}

#[async_trait]
impl CompletionService for LlmClient {
    async fn generate_question(&self, prompt: &str) -> Result<String, CompletionError> {
        let raw = self.call(prompt, QUESTION_SYSTEM).await?;
        parse_question(&raw)
    }

    async fn generate_feedback(&self, prompt: &str) -> Result<String, CompletionError> {
        let raw = self.call(prompt, FEEDBACK_SYSTEM).await?;
        parse_feedback(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    /// Serves `router` on an ephemeral local port and returns the completion URL.
    async fn spawn_endpoint(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/v1/chat/completions")
    }

    fn client_for(url: &str, timeout: Duration) -> LlmClient {
        LlmClient::new(url, "sk-test", DEFAULT_MODEL, timeout).unwrap()
    }

    fn completion_body(content: &str) -> Value {
        json!({
            "choices": [{"message": {"role": "assistant", "content": content}}],
            "usage": {"prompt_tokens": 42, "completion_tokens": 17}
        })
    }

    #[tokio::test]
    async fn test_generate_question_success() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                Json(completion_body(
                    "1. How does Python manage memory for short-lived objects?",
                ))
            }),
        );
        let url = spawn_endpoint(router).await;
        let client = client_for(&url, Duration::from_secs(5));

        let question = client.generate_question("prompt").await.unwrap();
        assert_eq!(
            question,
            "How does Python manage memory for short-lived objects?"
        );
    }

    #[tokio::test]
    async fn test_request_carries_bearer_and_prompt() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|headers: axum::http::HeaderMap, Json(body): Json<Value>| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                let user_content = body["messages"][1]["content"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string();
                if auth == "Bearer sk-test" && user_content == "the prompt" {
                    (StatusCode::OK, Json(completion_body("What is ownership in Rust?")))
                } else {
                    (StatusCode::BAD_REQUEST, Json(json!({"error": {"message": "bad"}})))
                }
            }),
        );
        let url = spawn_endpoint(router).await;
        let client = client_for(&url, Duration::from_secs(5));

        assert!(client.generate_question("the prompt").await.is_ok());
    }

    #[tokio::test]
    async fn test_server_error_is_unavailable() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({"error": {"message": "upstream overloaded"}})),
                )
            }),
        );
        let url = spawn_endpoint(router).await;
        let client = client_for(&url, Duration::from_secs(5));

        let err = client.generate_question("prompt").await.unwrap_err();
        match err {
            CompletionError::Unavailable(msg) => {
                assert!(msg.contains("503"));
                assert!(msg.contains("upstream overloaded"));
            }
            other => panic!("expected Unavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unauthorized_is_unavailable() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::UNAUTHORIZED, "no key") }),
        );
        let url = spawn_endpoint(router).await;
        let client = client_for(&url, Duration::from_secs(5));

        assert!(matches!(
            client.generate_question("prompt").await,
            Err(CompletionError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_timeout_is_unavailable() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Json(completion_body("What is a closure?"))
            }),
        );
        let url = spawn_endpoint(router).await;
        let client = client_for(&url, Duration::from_millis(200));

        assert_eq!(
            client.generate_question("prompt").await,
            Err(CompletionError::Unavailable("request timed out".to_string()))
        );
    }

    #[tokio::test]
    async fn test_connection_refused_is_unavailable() {
        // Bind then drop to get a port nobody is listening on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(
            &format!("http://{addr}/v1/chat/completions"),
            Duration::from_secs(2),
        );
        assert!(matches!(
            client.generate_question("prompt").await,
            Err(CompletionError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_content_is_malformed() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(completion_body("   ")) }),
        );
        let url = spawn_endpoint(router).await;
        let client = client_for(&url, Duration::from_secs(5));

        assert!(matches!(
            client.generate_question("prompt").await,
            Err(CompletionError::MalformedOutput(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_choices_is_malformed() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({"choices": []})) }),
        );
        let url = spawn_endpoint(router).await;
        let client = client_for(&url, Duration::from_secs(5));

        assert_eq!(
            client.call("prompt", QUESTION_SYSTEM).await,
            Err(CompletionError::MalformedOutput(
                "response has no content".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { "<html>gateway</html>" }),
        );
        let url = spawn_endpoint(router).await;
        let client = client_for(&url, Duration::from_secs(5));

        assert!(matches!(
            client.generate_question("prompt").await,
            Err(CompletionError::MalformedOutput(_))
        ));
    }

    #[tokio::test]
    async fn test_multi_question_output_is_malformed() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                Json(completion_body(
                    "1. What is a list?\n2. What is a tuple?\n3. What is a dict?",
                ))
            }),
        );
        let url = spawn_endpoint(router).await;
        let client = client_for(&url, Duration::from_secs(5));

        assert!(matches!(
            client.generate_question("prompt").await,
            Err(CompletionError::MalformedOutput(_))
        ));
    }

    #[tokio::test]
    async fn test_generate_feedback_returns_trimmed_text() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(completion_body("\n  Solid answer. Study iterators.  \n")) }),
        );
        let url = spawn_endpoint(router).await;
        let client = client_for(&url, Duration::from_secs(5));

        assert_eq!(
            client.generate_feedback("prompt").await.unwrap(),
            "Solid answer. Study iterators."
        );
    }
}
