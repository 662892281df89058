//! HTTP route handlers
//!
//! Validation happens before any collaborator is called. Collaborator
//! failures are logged with their full detail and answered with the
//! structured error body.

use crate::core::models::DocumentRecord;
use crate::pipeline::ai::{AnswerStyle, QuestionRequest, SummarizeRequest, SummaryType};
use crate::pipeline::documents::LIST_LIMIT;
use crate::pipeline::error::PipelineError;
use crate::pipeline::state::AppState;
use crate::pipeline::upload::{check_content_type, new_public_id, validate_pdf, PDF_MIME};
use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection, Multipart, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

type ApiResult = Result<Json<Value>, PipelineError>;

/// `GET /`
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Wiz-Scholar Server is running!",
        "version": crate::get_version(),
    }))
}

/// `GET /api/health`
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "OK",
        "message": "Server is healthy",
        "aiEndpoint": state.ai.endpoint(),
        "documents": state.documents.len(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// `POST /api/pdf/upload` with a multipart `pdf` field
pub async fn upload_pdf(State(state): State<AppState>, mut multipart: Multipart) -> ApiResult {
    let max_bytes = state.max_upload_bytes;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e, max_bytes))?
    {
        if field.name() != Some("pdf") {
            continue;
        }
        let filename = field.file_name().unwrap_or("document.pdf").to_string();
        let content_type = field.content_type().map(str::to_string);
        check_content_type(content_type.as_deref())?;

        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(&e, max_bytes))?;
        validate_pdf(content_type.as_deref(), data.len() as u64, max_bytes)?;
        upload = Some((filename, data));
        break;
    }
    let (filename, data) = upload.ok_or(PipelineError::MissingFile)?;
    let size = data.len() as u64;

    crate::info!("Uploading PDF '{filename}' ({size} bytes)");
    let public_id = new_public_id(state.storage.folder(), &filename);
    let stored = state
        .storage
        .upload_pdf(&public_id, &filename, data)
        .await
        .map_err(|e| {
            crate::error!("PDF upload of '{filename}' failed: {e}");
            PipelineError::Storage(e)
        })?;

    let record = DocumentRecord::new(&stored.public_id, &filename, &stored.url, size);
    state.documents.insert(record.clone());
    crate::info!("Stored '{filename}' as {}", stored.public_id);

    Ok(Json(json!({
        "success": true,
        "message": "PDF uploaded successfully",
        "data": {
            "filename": record.filename,
            "storageUrl": record.storage_url,
            "proxyUrl": format!("/api/pdf-proxy/{}", record.public_id),
            "publicId": record.public_id,
            "fileSize": record.file_size,
            "uploadedAt": record.uploaded_at,
        }
    })))
}

fn multipart_error(err: &MultipartError, max_bytes: u64) -> PipelineError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        PipelineError::FileTooLarge { max_bytes }
    } else {
        PipelineError::MalformedPayload(err.body_text())
    }
}

/// Body of `POST /api/pdf/summarize-pdf-url`
#[derive(Debug, Deserialize)]
pub struct SummarizeBody {
    /// Delivery URL of the stored PDF
    #[serde(default, alias = "pdfUrl")]
    pub pdf_url: Option<String>,
    /// One of `academic`, `brief`, `detailed`, `bullet_points`
    #[serde(default, alias = "summaryType")]
    pub summary_type: Option<String>,
    /// Original file name
    #[serde(default)]
    pub filename: Option<String>,
}

/// `POST /api/pdf/summarize-pdf-url`
pub async fn summarize_pdf_url(
    State(state): State<AppState>,
    body: Result<Json<SummarizeBody>, JsonRejection>,
) -> ApiResult {
    let Json(body) = body.map_err(|e| PipelineError::MalformedPayload(e.body_text()))?;

    let pdf_url = body
        .pdf_url
        .filter(|url| !url.trim().is_empty())
        .ok_or(PipelineError::MissingField { field: "pdf_url" })?;
    let summary_type = match body.summary_type.as_deref().map(str::trim) {
        None | Some("") => SummaryType::default(),
        Some(raw) => raw.parse().map_err(|_| PipelineError::InvalidField {
            field: "summary_type",
            value: raw.to_string(),
            expected: SummaryType::NAMES,
        })?,
    };

    let request = SummarizeRequest {
        pdf_url,
        summary_type,
        filename: body.filename.filter(|f| !f.is_empty()),
    };
    crate::info!("Summarizing {} ({summary_type})", request.pdf_url);

    let summary = state.ai.summarize(&request).await.map_err(|e| {
        crate::error!("Summarization of {} failed: {e}", request.pdf_url);
        PipelineError::Ai(e)
    })?;
    state.documents.record_summary(&request.pdf_url);

    Ok(Json(json!({
        "success": true,
        "message": "PDF summarized successfully",
        "data": summary,
    })))
}

/// Body of `POST /api/ask-question`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionBody {
    /// Public id of an uploaded document
    #[serde(default)]
    pub document_id: Option<String>,
    /// Plain-text context, used when no document id is given
    #[serde(default)]
    pub context: Option<String>,
    /// The question
    #[serde(default)]
    pub question: Option<String>,
    /// One of `concise`, `detailed`, `explanatory`
    #[serde(default, alias = "answer_style")]
    pub answer_style: Option<String>,
}

/// `POST /api/ask-question`
pub async fn ask_question(
    State(state): State<AppState>,
    body: Result<Json<QuestionBody>, JsonRejection>,
) -> ApiResult {
    let Json(body) = body.map_err(|e| PipelineError::MalformedPayload(e.body_text()))?;

    let question = body
        .question
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .ok_or(PipelineError::MissingField { field: "question" })?;
    let answer_style = match body.answer_style.as_deref().map(str::trim) {
        None | Some("") => AnswerStyle::default(),
        Some(raw) => raw.parse().map_err(|_| PipelineError::InvalidField {
            field: "answerStyle",
            value: raw.to_string(),
            expected: AnswerStyle::NAMES,
        })?,
    };

    let document_id = body.document_id.filter(|id| !id.trim().is_empty());
    let request = if let Some(id) = &document_id {
        let record = state
            .documents
            .get(id)
            .ok_or_else(|| PipelineError::DocumentNotFound(id.clone()))?;
        QuestionRequest {
            context: None,
            pdf_url: Some(record.storage_url),
            question,
            answer_style,
        }
    } else {
        let context = body
            .context
            .filter(|c| !c.trim().is_empty())
            .ok_or(PipelineError::MissingField { field: "context" })?;
        QuestionRequest {
            context: Some(context),
            pdf_url: None,
            question,
            answer_style,
        }
    };

    let answer = state.ai.answer(&request).await.map_err(|e| {
        crate::error!("Question processing failed: {e}");
        PipelineError::Ai(e)
    })?;
    if let Some(id) = &document_id {
        state.documents.record_question(id);
    }

    Ok(Json(json!({ "success": true, "data": answer })))
}

/// `GET /api/pdf-proxy/*public_id`
pub async fn pdf_proxy(
    State(state): State<AppState>,
    Path(public_id): Path<String>,
) -> Result<Response, PipelineError> {
    let public_id = public_id.trim_start_matches('/').to_string();
    if public_id.is_empty() {
        return Err(PipelineError::MissingField { field: "publicId" });
    }

    crate::debug!("Proxying PDF {public_id}");
    let data = state.storage.fetch(&public_id).await.map_err(|e| {
        crate::error!("PDF proxy for {public_id} failed: {e}");
        PipelineError::Proxy(e)
    })?;

    let headers = [
        (header::CONTENT_TYPE, HeaderValue::from_static(PDF_MIME)),
        (header::CONTENT_DISPOSITION, HeaderValue::from_static("inline")),
        (
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ),
        (
            header::CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=3600"),
        ),
        (header::ACCEPT_RANGES, HeaderValue::from_static("bytes")),
        (
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ),
    ];
    Ok((headers, data).into_response())
}

/// `GET /api/documents`
pub async fn list_documents(State(state): State<AppState>) -> Json<Value> {
    let documents = state.documents.list(LIST_LIMIT);
    Json(json!({
        "success": true,
        "count": documents.len(),
        "data": documents,
    }))
}

/// `GET /api/profile/:uid`
pub async fn get_profile(State(state): State<AppState>, Path(uid): Path<String>) -> Json<Value> {
    let profile = state.profiles.get_or_create(&uid, None);
    Json(json!({ "success": true, "data": profile }))
}

/// `POST /api/profile/:uid/first-time`
pub async fn complete_first_time(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Json<Value> {
    let profile = state.profiles.complete_first_time(&uid);
    crate::info!("User {uid} finished the first-run tour");
    Json(json!({ "success": true, "data": profile }))
}

/// `POST /api/profile/:uid/sorting`
pub async fn complete_sorting(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Json<Value> {
    let profile = state.profiles.complete_sorting(&uid);
    crate::info!("User {uid} completed sorting");
    Json(json!({ "success": true, "data": profile }))
}

/// Fallback for unknown routes
pub async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "error": "Not found",
            "code": "not_found",
            "message": "No such route",
        })),
    )
        .into_response()
}
