//! Async client for the pipeline server
//!
//! Upload and summarize are independent tasks: each runs on its own tokio
//! task, publishes its state on a watch channel and can be cancelled without
//! touching the other. Upload progress is reported through a callback as the
//! request body is streamed, and never goes backwards.

use crate::pipeline::ai::{Answer, AnswerStyle, Summary, SummaryType};
use crate::pipeline::upload::{validate_pdf, PDF_MIME};
use futures_util::stream;
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Size of each streamed upload chunk
const CHUNK_SIZE: usize = 64 * 1024;

/// Client-side failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Rejected before contacting the server
    #[error("{0}")]
    Validation(String),

    /// Local file could not be read
    #[error("cannot read {path}: {message}")]
    Io {
        /// File path
        path: String,
        /// I/O error text
        message: String,
    },

    /// Connection-level failure
    #[error("request failed: {0}")]
    Transport(String),

    /// The server answered with a structured error
    #[error("{error}: {message} ({code}, HTTP {status})")]
    Server {
        /// HTTP status
        status: u16,
        /// Short error title
        error: String,
        /// Machine-readable code
        code: String,
        /// Detail
        message: String,
    },

    /// The response could not be decoded
    #[error("invalid response: {0}")]
    Decode(String),
}

/// Lifecycle of a spawned task
#[derive(Debug, Clone, PartialEq)]
pub enum TaskState<T> {
    /// Still running
    Pending,
    /// Finished successfully
    Success(T),
    /// Finished with an error
    Failed(ClientError),
    /// Cancelled before finishing
    Cancelled,
}

impl<T> TaskState<T> {
    /// Whether the task has stopped
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Handle to a spawned upload or summarize task
#[derive(Debug)]
pub struct TaskHandle<T> {
    state: Arc<watch::Sender<TaskState<T>>>,
    receiver: watch::Receiver<TaskState<T>>,
    join: JoinHandle<()>,
}

impl<T: Clone + Send + Sync + 'static> TaskHandle<T> {
    fn spawn<F>(future: F) -> Self
    where
        F: std::future::Future<Output = Result<T, ClientError>> + Send + 'static,
    {
        let (sender, receiver) = watch::channel(TaskState::Pending);
        let state = Arc::new(sender);
        let task_state = Arc::clone(&state);
        let join = tokio::spawn(async move {
            let outcome = match future.await {
                Ok(value) => TaskState::Success(value),
                Err(err) => TaskState::Failed(err),
            };
            task_state.send_if_modified(|current| {
                if current.is_finished() {
                    false
                } else {
                    *current = outcome;
                    true
                }
            });
        });
        Self {
            state,
            receiver,
            join,
        }
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> TaskState<T> {
        self.receiver.borrow().clone()
    }

    /// Stop the task; a finished task keeps its outcome
    pub fn cancel(&self) {
        self.join.abort();
        self.state.send_if_modified(|current| {
            if current.is_finished() {
                false
            } else {
                *current = TaskState::Cancelled;
                true
            }
        });
    }

    /// Wait until the task stops and return its final state
    pub async fn wait(mut self) -> TaskState<T> {
        if !self.join.is_finished() {
            let _ = (&mut self.join).await;
        }
        let state = self.receiver.borrow().clone();
        if state.is_finished() {
            state
        } else {
            TaskState::Failed(ClientError::Transport(
                "task ended without a result".to_string(),
            ))
        }
    }
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedPdf {
    /// Original file name
    pub filename: String,
    /// Delivery URL from the storage provider
    pub storage_url: String,
    /// Path of the inline proxy on the pipeline server
    pub proxy_url: String,
    /// Stable storage identifier
    pub public_id: String,
    /// Size in bytes
    pub file_size: u64,
    /// Upload time (RFC 3339)
    pub uploaded_at: String,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
}

/// Progress callback: percentage in `0..=100`
pub type ProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

/// Client for one pipeline server
#[derive(Debug, Clone)]
pub struct PipelineClient {
    http: reqwest::Client,
    base_url: String,
    max_upload_bytes: u64,
    summarize_timeout: Duration,
}

impl PipelineClient {
    /// Client for the server at `base_url`
    #[must_use]
    pub fn new(base_url: &str, max_upload_bytes: u64, summarize_timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            max_upload_bytes,
            summarize_timeout,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Upload PDF bytes, reporting progress
    ///
    /// The file is checked locally first (MIME type and size), so invalid
    /// files never reach the server.
    ///
    /// # Errors
    /// [`ClientError::Validation`] for a non-PDF or oversized file, otherwise
    /// a transport, server or decode error.
    pub async fn upload(
        &self,
        filename: &str,
        data: Vec<u8>,
        progress: ProgressFn,
    ) -> Result<UploadedPdf, ClientError> {
        let total = data.len() as u64;
        validate_pdf(Some(PDF_MIME), total, self.max_upload_bytes)
            .map_err(|e| ClientError::Validation(e.message()))?;

        progress(0);
        let chunks: Vec<Vec<u8>> = data.chunks(CHUNK_SIZE).map(<[u8]>::to_vec).collect();
        let reporter = Arc::clone(&progress);
        let mut sent: u64 = 0;
        let mut last: u8 = 0;
        let body = Body::wrap_stream(stream::iter(chunks.into_iter().map(move |chunk| {
            sent += chunk.len() as u64;
            // 100 is reserved for the server's acknowledgement
            let pct = u8::try_from((sent * 99) / total.max(1)).unwrap_or(99);
            if pct > last {
                last = pct;
                reporter(pct);
            }
            Ok::<_, std::io::Error>(chunk)
        })));

        let part = Part::stream_with_length(body, total)
            .file_name(filename.to_string())
            .mime_str(PDF_MIME)
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        let form = Form::new().part("pdf", part);

        let response = self
            .http
            .post(self.url("/api/pdf/upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        let uploaded = decode_envelope(response).await?;
        progress(100);
        Ok(uploaded)
    }

    /// Read a PDF from disk and upload it
    ///
    /// # Errors
    /// [`ClientError::Validation`] when the path does not end in `.pdf`,
    /// [`ClientError::Io`] when it cannot be read, otherwise as [`upload`](Self::upload).
    pub async fn upload_file(
        &self,
        path: &Path,
        progress: ProgressFn,
    ) -> Result<UploadedPdf, ClientError> {
        let is_pdf = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if !is_pdf {
            return Err(ClientError::Validation(format!(
                "Only PDF files are allowed: {}",
                path.display()
            )));
        }
        let filename = path
            .file_name()
            .map_or_else(|| "document.pdf".to_string(), |n| n.to_string_lossy().into_owned());
        let data = tokio::fs::read(path).await.map_err(|e| ClientError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        self.upload(&filename, data, progress).await
    }

    /// Request a summary of a stored PDF
    ///
    /// # Errors
    /// Returns a transport, server or decode error.
    pub async fn summarize(
        &self,
        pdf_url: &str,
        summary_type: SummaryType,
        filename: Option<&str>,
    ) -> Result<Summary, ClientError> {
        let response = self
            .http
            .post(self.url("/api/pdf/summarize-pdf-url"))
            .timeout(self.summarize_timeout)
            .json(&json!({
                "pdf_url": pdf_url,
                "summary_type": summary_type,
                "filename": filename,
            }))
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        decode_envelope(response).await
    }

    /// Ask a question about an uploaded document or a plain-text context
    ///
    /// # Errors
    /// Returns a transport, server or decode error.
    pub async fn ask(
        &self,
        document_id: Option<&str>,
        context: Option<&str>,
        question: &str,
        answer_style: AnswerStyle,
    ) -> Result<Answer, ClientError> {
        let response = self
            .http
            .post(self.url("/api/ask-question"))
            .timeout(self.summarize_timeout)
            .json(&json!({
                "documentId": document_id,
                "context": context,
                "question": question,
                "answerStyle": answer_style,
            }))
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        decode_envelope(response).await
    }

    /// Run [`upload`](Self::upload) on its own task
    #[must_use]
    pub fn spawn_upload(
        &self,
        filename: String,
        data: Vec<u8>,
        progress: ProgressFn,
    ) -> TaskHandle<UploadedPdf> {
        let client = self.clone();
        TaskHandle::spawn(async move { client.upload(&filename, data, progress).await })
    }

    /// Run [`summarize`](Self::summarize) on its own task
    #[must_use]
    pub fn spawn_summarize(
        &self,
        pdf_url: String,
        summary_type: SummaryType,
        filename: Option<String>,
    ) -> TaskHandle<Summary> {
        let client = self.clone();
        TaskHandle::spawn(async move {
            client
                .summarize(&pdf_url, summary_type, filename.as_deref())
                .await
        })
    }
}

async fn decode_envelope<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| ClientError::Transport(e.to_string()))?;

    if !status.is_success() {
        return Err(match serde_json::from_str::<ServerError>(&text) {
            Ok(body) => ClientError::Server {
                status: status.as_u16(),
                error: body.error,
                code: body.code,
                message: body.message,
            },
            Err(_) => ClientError::Server {
                status: status.as_u16(),
                error: status.to_string(),
                code: "unknown".to_string(),
                message: text,
            },
        });
    }

    let envelope: Envelope<T> =
        serde_json::from_str(&text).map_err(|e| ClientError::Decode(e.to_string()))?;
    match envelope.data {
        Some(data) if envelope.success => Ok(data),
        _ => Err(ClientError::Decode(
            "response has no data payload".to_string(),
        )),
    }
}

/// Error body sent by the server
#[derive(Debug, Deserialize)]
struct ServerError {
    #[serde(default)]
    error: String,
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}
