//! Uploaded document metadata

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata for a PDF held by the storage provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    /// Stable storage identifier; also used as the document id
    pub public_id: String,
    /// Original file name as uploaded
    pub filename: String,
    /// Delivery URL returned by the storage provider
    pub storage_url: String,
    /// Size in bytes
    pub file_size: u64,
    /// Upload time
    pub uploaded_at: DateTime<Utc>,
    /// Number of summaries produced for this document
    #[serde(default)]
    pub summary_count: u32,
    /// Number of questions asked about this document
    #[serde(default)]
    pub question_count: u32,
    /// Time of the most recent summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_summarized: Option<DateTime<Utc>>,
}

impl DocumentRecord {
    /// Record for a freshly uploaded document
    #[must_use]
    pub fn new(
        public_id: impl Into<String>,
        filename: impl Into<String>,
        storage_url: impl Into<String>,
        file_size: u64,
    ) -> Self {
        Self {
            public_id: public_id.into(),
            filename: filename.into(),
            storage_url: storage_url.into(),
            file_size,
            uploaded_at: Utc::now(),
            summary_count: 0,
            question_count: 0,
            last_summarized: None,
        }
    }
}
