//! PDF validation and the storage provider seam
//!
//! [`StorageProvider`] is what the routes talk to; [`CloudinaryStorage`] is
//! the production implementation using Cloudinary's signed raw upload API.

use crate::core::config::StorageConfig;
use crate::pipeline::error::{PipelineError, UpstreamError};
use async_trait::async_trait;
use axum::body::Bytes;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::fmt::Write;
use std::time::Duration;

/// MIME type accepted for uploads
pub const PDF_MIME: &str = "application/pdf";

/// A file held by the storage provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Stable identifier usable with [`StorageProvider::fetch`]
    pub public_id: String,
    /// Delivery URL
    pub url: String,
    /// Size in bytes as stored
    pub bytes: u64,
}

/// Where uploaded PDFs live
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Store a PDF under `public_id`
    ///
    /// # Errors
    /// Returns an [`UpstreamError`] when the provider rejects or fails the upload.
    async fn upload_pdf(
        &self,
        public_id: &str,
        filename: &str,
        data: Bytes,
    ) -> Result<StoredFile, UpstreamError>;

    /// Download a stored PDF
    ///
    /// # Errors
    /// Returns an [`UpstreamError`] when the file cannot be retrieved.
    async fn fetch(&self, public_id: &str) -> Result<Bytes, UpstreamError>;

    /// Folder prefix used for new public ids
    fn folder(&self) -> &str;
}

/// Reject anything that is not a PDF within the size limit
///
/// # Errors
/// [`PipelineError::InvalidFileType`] unless the MIME type is `application/pdf`
/// (parameters and case ignored); [`PipelineError::FileTooLarge`] above `max_bytes`;
/// [`PipelineError::MissingFile`] for an empty file.
pub fn validate_pdf(
    content_type: Option<&str>,
    size: u64,
    max_bytes: u64,
) -> Result<(), PipelineError> {
    check_content_type(content_type)?;
    if size == 0 {
        return Err(PipelineError::MissingFile);
    }
    if size > max_bytes {
        return Err(PipelineError::FileTooLarge { max_bytes });
    }
    Ok(())
}

/// MIME check on its own, usable before the body is read
///
/// # Errors
/// [`PipelineError::InvalidFileType`] unless the MIME type is `application/pdf`.
pub fn check_content_type(content_type: Option<&str>) -> Result<(), PipelineError> {
    let essence = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase());
    match essence.as_deref() {
        Some(PDF_MIME) => Ok(()),
        _ => Err(PipelineError::InvalidFileType {
            content_type: content_type.unwrap_or("none").to_string(),
        }),
    }
}

/// Public id for a new upload: `{folder}/pdf_{millis}_{stem}`
///
/// The stem is the file name without its extension; characters other than
/// ASCII letters, digits, `-` and `_` become `_`.
#[must_use]
pub fn make_public_id(folder: &str, filename: &str, millis: i64) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let stem = match base.rfind('.') {
        Some(dot) if dot > 0 => &base[..dot],
        _ => base,
    };
    let stem: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = if stem.is_empty() { "document" } else { stem.as_str() };

    let folder = folder.trim_matches('/');
    if folder.is_empty() {
        format!("pdf_{millis}_{stem}")
    } else {
        format!("{folder}/pdf_{millis}_{stem}")
    }
}

/// Public id stamped with the current time
#[must_use]
pub fn new_public_id(folder: &str, filename: &str) -> String {
    make_public_id(folder, filename, Utc::now().timestamp_millis())
}

/// Cloudinary signature: SHA-256 over the sorted parameters followed by the secret
#[must_use]
pub fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let digest = Sha256::digest(format!("{joined}{api_secret}").as_bytes());
    digest.iter().fold(String::with_capacity(64), |mut hex, byte| {
        let _ = write!(hex, "{byte:02x}");
        hex
    })
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: String,
    #[serde(default)]
    bytes: u64,
}

/// Cloudinary raw-resource storage
#[derive(Debug, Clone)]
pub struct CloudinaryStorage {
    http: reqwest::Client,
    config: StorageConfig,
}

impl CloudinaryStorage {
    /// Build from the `[storage]` config section
    ///
    /// # Errors
    /// Returns [`UpstreamError::NotConfigured`] when credentials are missing or
    /// the HTTP client cannot be built.
    pub fn new(config: &StorageConfig, timeout: Duration) -> Result<Self, UpstreamError> {
        if config.cloud_name.is_empty() || config.api_key.is_empty() || config.api_secret.is_empty()
        {
            return Err(UpstreamError::NotConfigured(
                "storage.cloud_name, storage.api_key and storage.api_secret must be set".to_string(),
            ));
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::NotConfigured(e.to_string()))?;
        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    fn upload_url(&self) -> String {
        format!(
            "{}/v1_1/{}/raw/upload",
            self.config.api_base.trim_end_matches('/'),
            self.config.cloud_name
        )
    }

    /// Delivery URL for a public id
    #[must_use]
    pub fn delivery_url(&self, public_id: &str) -> String {
        format!(
            "{}/{}/raw/upload/{}",
            self.config.delivery_base.trim_end_matches('/'),
            self.config.cloud_name,
            public_id
        )
    }
}

#[async_trait]
impl StorageProvider for CloudinaryStorage {
    async fn upload_pdf(
        &self,
        public_id: &str,
        filename: &str,
        data: Bytes,
    ) -> Result<StoredFile, UpstreamError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[("public_id", public_id), ("timestamp", &timestamp)],
            &self.config.api_secret,
        );

        let file = Part::bytes(data.to_vec())
            .file_name(filename.to_string())
            .mime_str(PDF_MIME)
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;
        let form = Form::new()
            .part("file", file)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("public_id", public_id.to_string())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = self
            .http
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(&e))?;

        let uploaded: UploadResponse = crate::pipeline::ai::decode_response(response).await?;
        Ok(StoredFile {
            public_id: uploaded.public_id,
            url: uploaded.secure_url,
            bytes: if uploaded.bytes == 0 {
                data.len() as u64
            } else {
                uploaded.bytes
            },
        })
    }

    async fn fetch(&self, public_id: &str) -> Result<Bytes, UpstreamError> {
        let response = self
            .http
            .get(self.delivery_url(public_id))
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(&e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                detail: format!("storage provider returned {status} for '{public_id}'"),
            });
        }
        response
            .bytes()
            .await
            .map_err(|e| UpstreamError::from_reqwest(&e))
    }

    fn folder(&self) -> &str {
        &self.config.folder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_pdf() {
        let max = 10 * 1024 * 1024;
        assert!(validate_pdf(Some("application/pdf"), 1024, max).is_ok());
        assert!(validate_pdf(Some("Application/PDF; charset=binary"), 1024, max).is_ok());
        assert!(matches!(
            validate_pdf(Some("image/png"), 1024, max),
            Err(PipelineError::InvalidFileType { .. })
        ));
        assert!(matches!(
            validate_pdf(None, 1024, max),
            Err(PipelineError::InvalidFileType { .. })
        ));
        assert!(matches!(
            validate_pdf(Some("application/pdf"), max + 1, max),
            Err(PipelineError::FileTooLarge { .. })
        ));
        assert!(validate_pdf(Some("application/pdf"), max, max).is_ok());
        assert!(matches!(
            validate_pdf(Some("application/pdf"), 0, max),
            Err(PipelineError::MissingFile)
        ));
    }

    #[test]
    fn test_public_id_format() {
        assert_eq!(
            make_public_id("wiz-scholar/pdfs", "Lecture Notes.pdf", 1_700_000_000_000),
            "wiz-scholar/pdfs/pdf_1700000000000_Lecture_Notes"
        );
        assert_eq!(make_public_id("", "a.b.pdf", 5), "pdf_5_a_b");
        assert_eq!(make_public_id("/f/", "../../etc.pdf", 1), "f/pdf_1_etc");
        assert_eq!(make_public_id("f", ".pdf", 1), "f/pdf_1__pdf");
    }

    #[test]
    fn test_signature_is_sorted_sha256() {
        let a = sign_params(&[("timestamp", "1"), ("public_id", "x")], "secret");
        let b = sign_params(&[("public_id", "x"), ("timestamp", "1")], "secret");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);

        // sha256("public_id=x&timestamp=1secret")
        let expected = Sha256::digest(b"public_id=x&timestamp=1secret");
        let hex: String = expected.iter().map(|b| format!("{b:02x}")).collect();
        assert_eq!(a, hex);
    }

    #[test]
    fn test_missing_credentials() {
        let config = StorageConfig::default();
        assert!(matches!(
            CloudinaryStorage::new(&config, Duration::from_secs(5)),
            Err(UpstreamError::NotConfigured(_))
        ));
    }
}
