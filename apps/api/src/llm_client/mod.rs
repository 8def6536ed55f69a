/// LLM Client: the single point of entry for all generative-text calls in the QBR service.
///
/// No other module may call the Gemini API directly; handlers go through the
/// `ContentGenerator` trait carried in `AppState`.
///
/// One call per request, no retries, no streaming. Failures are logged and replaced by the
/// `EMPTY_JSON` sentinel in [`retrieve_content`] so downstream parsing always has input.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::Config;

pub mod prompts;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Text substituted for the model output when the call fails.
pub const EMPTY_JSON: &str = "{}";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    pub prompt_token_count: Option<u32>,
    pub candidates_token_count: Option<u32>,
}

impl GenerateContentResponse {
    /// Extracts the text of the first text part of the first candidate.
    pub fn text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.iter().find_map(|p| p.text.as_deref()))
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// A backend able to turn a prompt into raw model text.
///
/// Carried in `AppState` as `Arc<dyn ContentGenerator>`.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Gemini `generateContent` client. Built once at startup from [`Config`].
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            api_key: config.google_api_key.clone(),
            model: config.gemini_model.clone(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{GEMINI_API_BASE}/{}:generateContent", self.model)
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let request_body = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![RequestPart {
                    text: prompts::QBR_SYSTEM,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateContentResponse = response.json().await?;

        if let Some(usage) = &body.usage_metadata {
            debug!(
                "Gemini call succeeded: prompt_tokens={:?}, output_tokens={:?}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        body.text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

/// Sends the prompt and returns the raw model text, or [`EMPTY_JSON`] on any failure.
pub async fn retrieve_content(generator: &dyn ContentGenerator, prompt: &str) -> String {
    info!("Generating QBR content ({} prompt chars)", prompt.len());
    debug!("Full prompt: {prompt}");

    match generator.generate(prompt).await {
        Ok(text) => {
            info!("Model returned {} chars", text.len());
            debug!("Raw model output: {text}");
            text
        }
        Err(e) => {
            error!("Error generating content with Gemini: {e}");
            EMPTY_JSON.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingGenerator;

    #[async_trait]
    impl ContentGenerator for FailingGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            Err(LlmError::Api {
                status: 503,
                message: "overloaded".into(),
            })
        }
    }

    struct EchoGenerator;

    #[async_trait]
    impl ContentGenerator for EchoGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            Ok(format!("echo: {prompt}"))
        }
    }

    #[tokio::test]
    async fn test_failure_becomes_empty_json_sentinel() {
        let text = retrieve_content(&FailingGenerator, "prompt").await;
        assert_eq!(text, EMPTY_JSON);
    }

    #[tokio::test]
    async fn test_success_passes_text_through() {
        let text = retrieve_content(&EchoGenerator, "hello").await;
        assert_eq!(text, "echo: hello");
    }

    #[test]
    fn test_response_text_reads_first_candidate_part() {
        let body: GenerateContentResponse = serde_json::from_str(
            r#"{
                "candidates": [
                    {"content": {"parts": [{"text": "```json {\"slide1\": {}} ```"}], "role": "model"}},
                    {"content": {"parts": [{"text": "second"}]}}
                ],
                "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 5}
            }"#,
        )
        .unwrap();
        assert_eq!(body.text(), Some("```json {\"slide1\": {}} ```"));
    }

    #[test]
    fn test_response_without_candidates_has_no_text() {
        let body: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        assert!(body.text().is_none());
    }

    #[test]
    fn test_request_serializes_in_gemini_shape() {
        let request = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![RequestPart { text: "sys" }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![RequestPart { text: "hi" }],
            }],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "sys");
        assert!(value["systemInstruction"].get("role").is_none());
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hi");
    }

    #[test]
    fn test_endpoint_uses_configured_model() {
        let config = Config {
            google_api_key: "k".into(),
            gemini_model: "gemini-1.5-flash".into(),
            port: 8000,
            rust_log: "info".into(),
        };
        let client = GeminiClient::new(&config);
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }
}
