//! Resume analysis: validates the extracted text, renders the review prompt and
//! performs a single chat-completion call.
//!
//! The client never substitutes canned feedback on failure. Callers that want
//! offline guidance can fall back to [`FALLBACK_ANALYSIS`] themselves.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use crate::llm_client::response::extract_message_content;
use crate::llm_client::{ChatMessage, ChatRequest, ChatTransport, LlmError, OpenRouterTransport};

pub mod handlers;
pub mod prompts;

use prompts::{analysis_user_prompt, job_context, ANALYSIS_SYSTEM};

pub const API_KEY_VAR: &str = "OPENROUTER_API_KEY";
pub const TIMEOUT_VAR: &str = "ANALYSIS_TIMEOUT_SECS";

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "google/gemini-2.0-flash-exp:free";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Generic guidance shown when the remote analysis is unavailable.
pub const FALLBACK_ANALYSIS: &str = "
# Resume Analysis

## Strengths
- Your resume appears to have a professional structure
- The document format was processed successfully

## Areas for Improvement
- Consider adding more quantifiable achievements
- Tailor your skills section to match the job requirements
- Ensure your resume is optimized for ATS systems

## Recommendations
1. Use specific metrics to highlight your accomplishments
2. Match your keywords to those in the job description
3. Maintain consistent formatting throughout your document

(Note: This is a basic analysis. For a more detailed analysis, please try again later.)
";

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("{0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Remote analysis failed: {0}")]
    Remote(#[from] LlmError),
}

/// Everything the analysis client needs; only the API key has no default.
#[derive(Clone)]
pub struct AnalyzerConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout: Duration,
}

impl fmt::Debug for AnalyzerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyzerConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl AnalyzerConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            request_timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn from_env() -> Result<Self, AnalysisError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AnalysisError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(missing_api_key)?;

        let mut config = Self::new(api_key);
        if let Some(secs) = lookup(TIMEOUT_VAR).filter(|v| !v.trim().is_empty()) {
            config.request_timeout = parse_timeout(&secs)?;
        }
        Ok(config)
    }
}

/// Whole seconds, at least one.
fn parse_timeout(raw: &str) -> Result<Duration, AnalysisError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(AnalysisError::Configuration(format!(
            "{TIMEOUT_VAR} must be a positive whole number of seconds, got '{raw}'"
        ))),
    }
}

fn missing_api_key() -> AnalysisError {
    AnalysisError::Configuration(format!(
        "{API_KEY_VAR} environment variable is not set. \
         Please add it to your .env file or environment variables."
    ))
}

/// Produces AI feedback for resume text. Cheap to clone; holds no mutable state.
#[derive(Clone)]
pub struct AnalysisClient {
    config: Arc<AnalyzerConfig>,
    transport: Arc<dyn ChatTransport>,
}

impl AnalysisClient {
    /// Builds a client backed by the OpenRouter HTTP transport.
    pub fn new(config: AnalyzerConfig) -> Result<Self, AnalysisError> {
        ensure_api_key(&config)?;
        let transport = OpenRouterTransport::new(
            &config.base_url,
            config.api_key.clone(),
            config.request_timeout,
        )
        .map_err(|e| AnalysisError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(
        config: AnalyzerConfig,
        transport: Arc<dyn ChatTransport>,
    ) -> Result<Self, AnalysisError> {
        ensure_api_key(&config)?;
        Ok(Self {
            config: Arc::new(config),
            transport,
        })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Renders the two-message request for `resume_text`.
    pub fn build_request(&self, resume_text: &str, job_role: Option<&str>) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage::system(ANALYSIS_SYSTEM),
                ChatMessage::user(analysis_user_prompt(resume_text, job_context(job_role))),
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }

    /// Returns the model's feedback verbatim, or the first failure encountered.
    pub async fn analyze(
        &self,
        resume_text: &str,
        job_role: Option<&str>,
    ) -> Result<String, AnalysisError> {
        if resume_text.trim().is_empty() {
            return Err(AnalysisError::Validation("Resume text is empty".to_string()));
        }

        let request = self.build_request(resume_text, job_role);
        info!(
            "Requesting resume analysis (model: {}, job context: {})",
            request.model,
            job_context(job_role)
        );

        let body = self.transport.complete(&request).await?;
        let feedback = extract_message_content(&body)?;

        debug!("Analysis returned {} chars", feedback.len());
        Ok(feedback)
    }
}

fn ensure_api_key(config: &AnalyzerConfig) -> Result<(), AnalysisError> {
    if config.api_key.trim().is_empty() {
        return Err(missing_api_key());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::{spawn_stub, MockReply, MockTransport};
    use axum::http::StatusCode;
    use crate::llm_client::Role;
    use serde_json::json;

    fn client_with(transport: Arc<MockTransport>) -> AnalysisClient {
        AnalysisClient::with_transport(AnalyzerConfig::new("test-key"), transport).unwrap()
    }

    #[tokio::test]
    async fn test_returns_first_choice_content_exactly() {
        let transport = Arc::new(MockTransport::with_content("X"));
        let client = client_with(transport.clone());

        let result = client.analyze("Sample resume text", Some("Data Scientist")).await;
        assert_eq!(result.unwrap(), "X");
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_text_fails_without_network_call() {
        let transport = Arc::new(MockTransport::with_content("unused"));
        let client = client_with(transport.clone());

        for text in ["", "   \n\t  "] {
            let err = client.analyze(text, Some("Engineer")).await.unwrap_err();
            assert!(matches!(err, AnalysisError::Validation(_)));
            assert_eq!(err.to_string(), "Resume text is empty");
        }
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_request_parameters_match_contract() {
        let transport = Arc::new(MockTransport::with_content("AI Analysis Result"));
        let client = client_with(transport.clone());

        client
            .analyze("Valid resume text", Some("Software Engineer"))
            .await
            .unwrap();

        let request = transport.last_request().unwrap();
        assert_eq!(request.model, "google/gemini-2.0-flash-exp:free");
        assert!((request.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(request.max_tokens, 1000);
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
        assert!(request.messages[0]
            .content
            .to_lowercase()
            .contains("expert resume reviewer"));
        assert_eq!(request.messages[1].role, Role::User);
        assert!(request.messages[1].content.contains("Software Engineer"));
        assert!(request.messages[1].content.contains("Valid resume text"));
    }

    #[tokio::test]
    async fn test_missing_role_uses_generic_phrase() {
        let transport = Arc::new(MockTransport::with_content("ok"));
        let client = client_with(transport.clone());

        client.analyze("Resume", None).await.unwrap();
        let prompt = &transport.last_request().unwrap().messages[1].content;
        assert!(prompt.contains("general job applications"));
    }

    #[tokio::test]
    async fn test_given_role_replaces_generic_phrase() {
        let transport = Arc::new(MockTransport::with_content("ok"));
        let client = client_with(transport.clone());

        client.analyze("Resume", Some("Data Scientist")).await.unwrap();
        let prompt = &transport.last_request().unwrap().messages[1].content;
        assert!(prompt.contains("Data Scientist"));
        assert!(!prompt.contains("general job applications"));
    }

    #[tokio::test]
    async fn test_api_error_propagates() {
        let transport = Arc::new(MockTransport::replying(MockReply::ApiError {
            status: 500,
            message: "API Error".to_string(),
        }));
        let client = client_with(transport.clone());

        let err = client.analyze("Valid resume text", None).await.unwrap_err();
        match err {
            AnalysisError::Remote(LlmError::Api { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "API Error");
            }
            other => panic!("expected remote API error, got {other:?}"),
        }
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_malformed_response_is_remote_error() {
        let transport = Arc::new(MockTransport::replying(MockReply::Body(
            json!({ "object": "chat.completion" }),
        )));
        let client = client_with(transport);

        let err = client.analyze("Valid resume text", None).await.unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Remote(LlmError::UnexpectedShape(_))
        ));
    }

    #[test]
    fn test_missing_api_key_is_configuration_error() {
        let err = AnalyzerConfig::from_lookup(|_| None).unwrap_err();
        assert!(matches!(err, AnalysisError::Configuration(_)));
        assert!(err.to_string().contains("OPENROUTER_API_KEY"));
    }

    #[test]
    fn test_blank_api_key_is_rejected_before_any_call() {
        let transport = Arc::new(MockTransport::with_content("unused"));
        let result = AnalysisClient::with_transport(AnalyzerConfig::new("  "), transport.clone());

        assert!(matches!(result, Err(AnalysisError::Configuration(_))));
        assert_eq!(transport.call_count(), 0);
    }

    #[test]
    fn test_lookup_keeps_fixed_endpoint_and_model() {
        let config = AnalyzerConfig::from_lookup(|key| match key {
            "OPENROUTER_API_KEY" => Some("sk-or-test".to_string()),
            "ANALYSIS_TIMEOUT_SECS" => Some("30".to_string()),
            "OPENROUTER_BASE_URL" => Some("http://localhost:1234/v1".to_string()),
            "ANALYSIS_MODEL" => Some("other/model".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.api_key, "sk-or-test");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_timeout_is_configuration_error() {
        let err = AnalyzerConfig::from_lookup(|key| match key {
            "OPENROUTER_API_KEY" => Some("sk-or-test".to_string()),
            "ANALYSIS_TIMEOUT_SECS" => Some("soon".to_string()),
            _ => None,
        })
        .unwrap_err();
        assert!(err.to_string().contains("ANALYSIS_TIMEOUT_SECS"));
    }

    #[test]
    fn test_empty_timeout_uses_default() {
        let config = AnalyzerConfig::from_lookup(|key| match key {
            "OPENROUTER_API_KEY" => Some("sk-or-test".to_string()),
            "ANALYSIS_TIMEOUT_SECS" => Some("".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.request_timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_zero_timeout_is_configuration_error() {
        let err = AnalyzerConfig::from_lookup(|key| match key {
            "OPENROUTER_API_KEY" => Some("sk-or-test".to_string()),
            "ANALYSIS_TIMEOUT_SECS" => Some("0".to_string()),
            _ => None,
        })
        .unwrap_err();
        assert!(matches!(err, AnalysisError::Configuration(_)));
    }

    #[test]
    fn test_debug_output_redacts_api_key() {
        let debug = format!("{:?}", AnalyzerConfig::new("sk-or-secret"));
        assert!(!debug.contains("sk-or-secret"));
    }

    #[tokio::test]
    async fn test_http_request_carries_contract_parameters() {
        let (base_url, seen) = spawn_stub(
            StatusCode::OK,
            r###"{"choices":[{"message":{"role":"assistant","content":"## Feedback"}}]}"###.to_string(),
        )
        .await;
        let mut config = AnalyzerConfig::new("sk-or-test");
        config.base_url = base_url;
        let client = AnalysisClient::new(config).unwrap();

        let feedback = client
            .analyze("Valid resume text", Some("Data Scientist"))
            .await
            .unwrap();
        assert_eq!(feedback, "## Feedback");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (auth, body) = &seen[0];
        assert_eq!(auth.as_deref(), Some("Bearer sk-or-test"));
        assert_eq!(body["model"], DEFAULT_MODEL);
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert_eq!(body["max_tokens"], 1000);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[0]["content"], ANALYSIS_SYSTEM);
        assert_eq!(messages[1]["role"], "user");
        assert!(messages[1]["content"]
            .as_str()
            .unwrap()
            .contains("Specific improvements for Data Scientist"));
    }

    #[test]
    fn test_real_client_builds_with_key() {
        let client = AnalysisClient::new(AnalyzerConfig::new("sk-or-test")).unwrap();
        assert_eq!(client.config().base_url, "https://openrouter.ai/api/v1");
    }
}
