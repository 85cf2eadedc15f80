//! Client for the LLM proxy
//!
//! The proxy exposes two endpoints: `/api/analyzeRepo` turns a payload into a
//! Markdown summary and `/api/askRevo` answers follow-up questions using the
//! summary and samples as context.

use crate::config::HandoffConfig;
use crate::error::{RevoError, RevoResult};
use crate::types::{AnalysisPayload, FileSample};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, instrument};
use url::Url;

const ANALYZE_PATH: &str = "api/analyzeRepo";
const ASK_PATH: &str = "api/askRevo";

/// Generation time as reported by the proxy, either `"1.23"` or `1.23`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Latency {
    Text(String),
    Seconds(f64),
}

impl fmt::Display for Latency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "{}", text),
            Self::Seconds(secs) => write!(f, "{:.2}", secs),
        }
    }
}

/// Response of `/api/analyzeRepo`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HandoffSummary {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub latency: Option<Latency>,
    #[serde(default)]
    pub tokens: Option<u64>,
    #[serde(default)]
    pub model: Option<String>,
}

impl HandoffSummary {
    /// Summary text followed by the generation footer
    pub fn render(&self) -> String {
        let summary = self
            .summary
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("⚠️ No summary returned from AI.");
        let latency = self
            .latency
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "?".to_string());
        let tokens = self
            .tokens
            .filter(|t| *t > 0)
            .map(|t| t.to_string())
            .unwrap_or_else(|| "?".to_string());
        let model = self.model.as_deref().unwrap_or("unknown");

        format!(
            "{}\n\n---\n⚡ Generated in {}s · {} tokens · Model: {}",
            summary, latency, tokens, model
        )
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeBody<'a> {
    repo_summary: &'a str,
    selected_files: &'a [FileSample],
}

#[derive(Serialize)]
struct AskBody<'a> {
    summary: &'a str,
    samples: &'a [FileSample],
    question: &'a str,
}

#[derive(Deserialize)]
struct AskResponse {
    #[serde(default)]
    answer: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// HTTP client for the proxy
#[derive(Debug, Clone)]
pub struct HandoffClient {
    http: Client,
    api_base: Url,
}

impl HandoffClient {
    pub fn new(config: &HandoffConfig) -> RevoResult<Self> {
        config.validate()?;
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| RevoError::config(format!("Failed to create HTTP client: {}", e)))?;

        let mut api_base = Url::parse(&config.api_base)?;
        if !api_base.path().ends_with('/') {
            let path = format!("{}/", api_base.path());
            api_base.set_path(&path);
        }
        Ok(Self { http, api_base })
    }

    /// Request a Markdown summary of a sampled repository
    #[instrument(skip(self, payload, preview), fields(repo = %payload.repo), level = "debug")]
    pub async fn analyze(
        &self,
        payload: &AnalysisPayload,
        preview: &str,
    ) -> RevoResult<HandoffSummary> {
        let fallback = format!("Repository: {}", payload.repo);
        let repo_summary = if preview.trim().is_empty() {
            fallback.as_str()
        } else {
            preview
        };
        let body = AnalyzeBody {
            repo_summary,
            selected_files: &payload.samples,
        };
        self.post(ANALYZE_PATH, &body).await
    }

    /// Ask one follow-up question
    #[instrument(skip(self, summary, samples), level = "debug")]
    pub async fn ask(
        &self,
        summary: &str,
        samples: &[FileSample],
        question: &str,
    ) -> RevoResult<String> {
        let body = AskBody {
            summary,
            samples,
            question,
        };
        let response: AskResponse = self.post(ASK_PATH, &body).await?;
        Ok(response
            .answer
            .unwrap_or_else(|| "No answer generated.".to_string()))
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> RevoResult<T> {
        let url = self.api_base.join(path)?;
        debug!(%url, "POST");
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| RevoError::handoff(format!("request failed: {}", e)))?;

        let response = Self::check(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| RevoError::handoff(format!("invalid response: {}", e)))
    }

    async fn check(response: Response) -> RevoResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let reason = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.error)
            .unwrap_or(text);
        Err(RevoError::handoff(format!("endpoint returned {}: {}", status.as_u16(), reason)))
    }
}

/// Summary plus the running Q/A transcript of one repository
#[derive(Debug, Clone)]
pub struct Conversation {
    payload: AnalysisPayload,
    transcript: String,
}

impl Conversation {
    /// Hand the payload off and start a transcript with the rendered summary
    pub async fn start(
        client: &HandoffClient,
        payload: AnalysisPayload,
        preview: &str,
    ) -> RevoResult<Self> {
        let summary = client.analyze(&payload, preview).await?;
        Ok(Self {
            payload,
            transcript: summary.render(),
        })
    }

    /// Ask a question with the transcript so far as context and append the exchange
    pub async fn ask(&mut self, client: &HandoffClient, question: &str) -> RevoResult<String> {
        let answer = client
            .ask(&self.transcript, &self.payload.samples, question)
            .await?;
        self.transcript
            .push_str(&format!("\n\n**Q:** {}\n**A:** {}", question, answer));
        Ok(answer)
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn payload(&self) -> &AnalysisPayload {
        &self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RepoMetadata;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> HandoffClient {
        let config = HandoffConfig {
            api_base: server.uri(),
            ..Default::default()
        };
        HandoffClient::new(&config).expect("client")
    }

    fn payload() -> AnalysisPayload {
        AnalysisPayload {
            repo: "acme/widget".to_string(),
            metadata: RepoMetadata::default(),
            files_analyzed: 1,
            samples: vec![FileSample {
                path: "README.md".to_string(),
                snippet: "# Widget".to_string(),
            }],
        }
    }

    #[test]
    fn test_render_footer() {
        let summary = HandoffSummary {
            summary: Some("## Overview".to_string()),
            latency: Some(Latency::Text("1.42".to_string())),
            tokens: Some(512),
            model: Some("llama-3.1-8b-instant".to_string()),
        };
        assert_eq!(
            summary.render(),
            "## Overview\n\n---\n⚡ Generated in 1.42s · 512 tokens · Model: llama-3.1-8b-instant"
        );
    }

    #[test]
    fn test_render_missing_fields() {
        let summary: HandoffSummary = serde_json::from_str(r#"{"latency": 0.5}"#).unwrap();
        assert!(summary.render().starts_with("⚠️ No summary returned from AI."));
        assert!(summary.render().ends_with("Generated in 0.50s · ? tokens · Model: unknown"));
    }

    #[tokio::test]
    async fn test_analyze_posts_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/analyzeRepo"))
            .and(body_partial_json(json!({
                "repoSummary": "📦 Repository: acme/widget",
                "selectedFiles": [{"path": "README.md", "snippet": "# Widget"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "summary": "A widget.",
                "latency": "0.91",
                "tokens": 120,
                "model": "llama-3.1-8b-instant"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let summary = client_for(&server)
            .analyze(&payload(), "📦 Repository: acme/widget")
            .await
            .unwrap();
        assert_eq!(summary.summary.as_deref(), Some("A widget."));
        assert_eq!(summary.latency, Some(Latency::Text("0.91".to_string())));
    }

    #[tokio::test]
    async fn test_analyze_without_preview_uses_repo_name() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/analyzeRepo"))
            .and(body_partial_json(json!({"repoSummary": "Repository: acme/widget"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"summary": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).analyze(&payload(), "").await.unwrap();
    }

    #[tokio::test]
    async fn test_error_field_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": "AI service failure: rate limited"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).analyze(&payload(), "p").await.unwrap_err();
        assert!(matches!(err, RevoError::Handoff(_)));
        assert!(err.to_string().contains("AI service failure: rate limited"));
    }

    #[tokio::test]
    async fn test_conversation_transcript() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/analyzeRepo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "summary": "A widget.",
                "latency": 1.5,
                "tokens": 10,
                "model": "m"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/askRevo"))
            .and(body_partial_json(json!({"question": "What is it?"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answer": "A widget."})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut conversation = Conversation::start(&client, payload(), "preview").await.unwrap();
        let answer = conversation.ask(&client, "What is it?").await.unwrap();

        assert_eq!(answer, "A widget.");
        assert!(conversation.transcript().starts_with("A widget.\n\n---\n⚡ Generated in 1.50s"));
        assert!(
            conversation
                .transcript()
                .ends_with("\n\n**Q:** What is it?\n**A:** A widget.")
        );
    }
}
