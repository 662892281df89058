//! Registry of uploaded documents
//!
//! Keeps the metadata the routes need after an upload: where the PDF lives and
//! how often it has been summarized or asked about. Text is never stored.

use crate::core::models::DocumentRecord;
use chrono::Utc;
use std::sync::{Mutex, PoisonError};

/// Largest number of records returned by [`DocumentRegistry::list`]
pub const LIST_LIMIT: usize = 50;

/// Largest number of records kept; the oldest are dropped first
pub const RETAIN_LIMIT: usize = 500;

/// In-memory document registry, newest upload first
#[derive(Debug, Default)]
pub struct DocumentRegistry {
    records: Mutex<Vec<DocumentRecord>>,
}

impl DocumentRegistry {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record, replacing any record with the same public id
    pub fn insert(&self, record: DocumentRecord) {
        let mut records = self.lock();
        records.retain(|r| r.public_id != record.public_id);
        let at = records.partition_point(|r| r.uploaded_at >= record.uploaded_at);
        records.insert(at, record);
        records.truncate(RETAIN_LIMIT);
    }

    /// Record by public id
    #[must_use]
    pub fn get(&self, public_id: &str) -> Option<DocumentRecord> {
        self.lock()
            .iter()
            .find(|r| r.public_id == public_id)
            .cloned()
    }

    /// Newest first, at most `limit` records
    #[must_use]
    pub fn list(&self, limit: usize) -> Vec<DocumentRecord> {
        self.lock().iter().take(limit).cloned().collect()
    }

    /// Count a summary for the document stored at `storage_url`
    pub fn record_summary(&self, storage_url: &str) -> Option<DocumentRecord> {
        let mut records = self.lock();
        let record = records.iter_mut().find(|r| r.storage_url == storage_url)?;
        record.summary_count += 1;
        record.last_summarized = Some(Utc::now());
        Some(record.clone())
    }

    /// Count a question for the document with `public_id`
    pub fn record_question(&self, public_id: &str) -> Option<DocumentRecord> {
        let mut records = self.lock();
        let record = records.iter_mut().find(|r| r.public_id == public_id)?;
        record.question_count += 1;
        Some(record.clone())
    }

    /// Number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no document has been uploaded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<DocumentRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
