//! AI summarization service seam
//!
//! The server never interprets AI output beyond checking it is a JSON object:
//! payloads are relayed verbatim. [`Summary`] and [`Answer`] are typed views
//! used by the client and the CLI.

use crate::pipeline::error::UpstreamError;
use async_trait::async_trait;
use reqwest::multipart::Form;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

/// Pause before the single retry
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Kind of summary requested from the AI service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryType {
    /// Key concepts and findings for university students
    #[default]
    Academic,
    /// Only the most important points
    Brief,
    /// All major points with supporting detail
    Detailed,
    /// Scannable list of key points
    BulletPoints,
}

impl SummaryType {
    /// Accepted wire values
    pub const NAMES: &'static str = "academic, brief, detailed, bullet_points";

    /// Wire value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Academic => "academic",
            Self::Brief => "brief",
            Self::Detailed => "detailed",
            Self::BulletPoints => "bullet_points",
        }
    }
}

impl FromStr for SummaryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "academic" => Ok(Self::Academic),
            "brief" => Ok(Self::Brief),
            "detailed" => Ok(Self::Detailed),
            "bullet_points" | "bullet-points" | "bullets" => Ok(Self::BulletPoints),
            _ => Err(format!("Unknown summary type: {s}")),
        }
    }
}

impl fmt::Display for SummaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answer style for document questions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStyle {
    /// Short and direct
    #[default]
    Concise,
    /// Thorough with supporting detail
    Detailed,
    /// Step-by-step explanation
    Explanatory,
}

impl AnswerStyle {
    /// Accepted wire values
    pub const NAMES: &'static str = "concise, detailed, explanatory";

    /// Wire value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Concise => "concise",
            Self::Detailed => "detailed",
            Self::Explanatory => "explanatory",
        }
    }
}

impl FromStr for AnswerStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "concise" => Ok(Self::Concise),
            "detailed" => Ok(Self::Detailed),
            "explanatory" => Ok(Self::Explanatory),
            _ => Err(format!("Unknown answer style: {s}")),
        }
    }
}

impl fmt::Display for AnswerStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summarization request sent to the AI service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarizeRequest {
    /// Delivery URL of the stored PDF
    pub pdf_url: String,
    /// Kind of summary
    pub summary_type: SummaryType,
    /// Original file name, for the AI service's logs
    pub filename: Option<String>,
}

/// Question about a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionRequest {
    /// Plain-text context, when the caller supplies it directly
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Stored PDF to answer from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
    /// The question
    pub question: String,
    /// Requested answer style
    pub answer_style: AnswerStyle,
}

/// Typed view of a summary payload
///
/// Accepts both the snake-case field names and the camel-case ones some AI
/// service versions emit (`content`, `type`, `compressionRatio`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Summary text
    #[serde(alias = "content")]
    pub summary: String,
    /// Summary type as reported by the service
    #[serde(default, alias = "type", skip_serializing_if = "Option::is_none")]
    pub summary_type: Option<String>,
    /// Summary length relative to the source
    #[serde(default, alias = "compressionRatio", skip_serializing_if = "Option::is_none")]
    pub compression_ratio: Option<f64>,
    /// Model that produced the summary
    #[serde(default, alias = "modelUsed", skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    /// Source length
    #[serde(default, alias = "originalLength", skip_serializing_if = "Option::is_none")]
    pub original_length: Option<u64>,
    /// Summary length
    #[serde(default, alias = "wordCount", skip_serializing_if = "Option::is_none")]
    pub summary_length: Option<u64>,
    /// Any other fields, kept as sent
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Typed view of an answer payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// Answer text
    #[serde(alias = "response")]
    pub answer: String,
    /// Any other fields, kept as sent
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The external AI service
#[async_trait]
pub trait AiService: Send + Sync {
    /// Summarize a stored PDF; returns the service's JSON object unchanged
    ///
    /// # Errors
    /// Returns an [`UpstreamError`] on transport failure, a non-success status,
    /// or a body that is not a JSON object.
    async fn summarize(&self, request: &SummarizeRequest) -> Result<Value, UpstreamError>;

    /// Answer a question; returns the service's JSON object unchanged
    ///
    /// # Errors
    /// Same as [`summarize`](Self::summarize).
    async fn answer(&self, request: &QuestionRequest) -> Result<Value, UpstreamError>;

    /// Base URL, reported by the health route
    fn endpoint(&self) -> &str;
}

/// HTTP client for the AI service
#[derive(Debug, Clone)]
pub struct HttpAiClient {
    http: reqwest::Client,
    endpoint: String,
    retry: bool,
}

impl HttpAiClient {
    /// Client for `endpoint` with a per-request `timeout`
    ///
    /// # Errors
    /// Returns [`UpstreamError::NotConfigured`] for an empty endpoint or when
    /// the HTTP client cannot be built.
    pub fn new(endpoint: &str, timeout: Duration, retry: bool) -> Result<Self, UpstreamError> {
        let endpoint = endpoint.trim().trim_end_matches('/');
        if endpoint.is_empty() {
            return Err(UpstreamError::NotConfigured(
                "ai.endpoint must be set".to_string(),
            ));
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::NotConfigured(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
            retry,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.endpoint)
    }

    async fn with_retry<F, Fut>(&self, what: &str, mut call: F) -> Result<Value, UpstreamError>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<Value, UpstreamError>> + Send,
    {
        match call().await {
            Err(err) if self.retry && err.is_retryable() => {
                crate::warn!("AI {what} failed ({err}), retrying once");
                tokio::time::sleep(RETRY_DELAY).await;
                call().await
            }
            other => other,
        }
    }
}

#[async_trait]
impl AiService for HttpAiClient {
    async fn summarize(&self, request: &SummarizeRequest) -> Result<Value, UpstreamError> {
        let url = self.url("/api/summarize-pdf-url");
        crate::debug!(
            "Summarizing {} as {} via {url}",
            request.pdf_url,
            request.summary_type
        );

        self.with_retry("summarize", || {
            let mut form = Form::new()
                .text("pdf_url", request.pdf_url.clone())
                .text("summary_type", request.summary_type.as_str());
            if let Some(filename) = &request.filename {
                form = form.text("filename", filename.clone());
            }
            let pending = self.http.post(&url).multipart(form).send();
            async move {
                let response = pending.await.map_err(|e| UpstreamError::from_reqwest(&e))?;
                decode_object(response).await
            }
        })
        .await
    }

    async fn answer(&self, request: &QuestionRequest) -> Result<Value, UpstreamError> {
        let url = self.url("/api/question-answer");
        crate::debug!("Asking ({}) via {url}", request.answer_style);

        self.with_retry("question", || {
            let pending = self.http.post(&url).json(request).send();
            async move {
                let response = pending.await.map_err(|e| UpstreamError::from_reqwest(&e))?;
                decode_object(response).await
            }
        })
        .await
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Decode a success body, or turn an error status into [`UpstreamError::Status`]
///
/// The detail is taken from `detail`, `message` or `error` in a JSON error
/// body, falling back to the raw text.
pub(crate) async fn decode_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, UpstreamError> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(UpstreamError::Status {
            status: status.as_u16(),
            detail: error_detail(&text).unwrap_or_else(|| {
                if text.trim().is_empty() {
                    status.to_string()
                } else {
                    text
                }
            }),
        });
    }
    response
        .json::<T>()
        .await
        .map_err(|e| UpstreamError::Decode(e.to_string()))
}

async fn decode_object(response: reqwest::Response) -> Result<Value, UpstreamError> {
    let value: Value = decode_response(response).await?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(UpstreamError::Decode(
            "expected a JSON object from the AI service".to_string(),
        ))
    }
}

/// Pull a human-readable message out of a JSON error body
#[must_use]
pub fn error_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["detail", "message", "error"].iter().find_map(|key| {
        value.get(*key).and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            Value::Object(inner) => inner
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
            other => Some(other.to_string()),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summary_type_parse() {
        assert_eq!("academic".parse(), Ok(SummaryType::Academic));
        assert_eq!("Bullet_Points".parse(), Ok(SummaryType::BulletPoints));
        assert!("poem".parse::<SummaryType>().is_err());
        assert_eq!(SummaryType::default().as_str(), "academic");
        assert_eq!(
            serde_json::to_value(SummaryType::BulletPoints).unwrap(),
            json!("bullet_points")
        );
    }

    #[test]
    fn test_answer_style_parse() {
        assert_eq!("EXPLANATORY".parse(), Ok(AnswerStyle::Explanatory));
        assert!("verbose".parse::<AnswerStyle>().is_err());
        assert_eq!(AnswerStyle::default(), AnswerStyle::Concise);
    }

    #[test]
    fn test_summary_view_accepts_both_shapes() {
        let snake: Summary = serde_json::from_value(json!({
            "summary": "Short",
            "summary_type": "brief",
            "compression_ratio": 12.5,
            "model_used": "gemini",
            "original_length": 800,
            "summary_length": 100,
            "key_points": ["a"]
        }))
        .unwrap();
        assert_eq!(snake.summary, "Short");
        assert_eq!(snake.model_used.as_deref(), Some("gemini"));
        assert!(snake.extra.contains_key("key_points"));

        let camel: Summary = serde_json::from_value(json!({
            "content": "Long",
            "type": "Academic",
            "wordCount": 40,
            "compressionRatio": 5.0
        }))
        .unwrap();
        assert_eq!(camel.summary, "Long");
        assert_eq!(camel.summary_length, Some(40));
        assert_eq!(camel.compression_ratio, Some(5.0));
    }

    #[test]
    fn test_error_detail() {
        assert_eq!(
            error_detail(r#"{"detail":"No readable text found in PDF"}"#).as_deref(),
            Some("No readable text found in PDF")
        );
        assert_eq!(
            error_detail(r#"{"error":{"message":"Invalid Signature"}}"#).as_deref(),
            Some("Invalid Signature")
        );
        assert_eq!(error_detail("<html>"), None);
    }

    #[test]
    fn test_question_request_skips_absent_fields() {
        let body = serde_json::to_value(QuestionRequest {
            context: None,
            pdf_url: Some("https://x/doc".to_string()),
            question: "Why?".to_string(),
            answer_style: AnswerStyle::Detailed,
        })
        .unwrap();
        assert_eq!(
            body,
            json!({"pdf_url": "https://x/doc", "question": "Why?", "answer_style": "detailed"})
        );
    }

    #[test]
    fn test_empty_endpoint_is_not_configured() {
        assert!(matches!(
            HttpAiClient::new("  ", Duration::from_secs(1), true),
            Err(UpstreamError::NotConfigured(_))
        ));
    }
}
