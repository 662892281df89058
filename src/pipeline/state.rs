//! Shared server state

use crate::core::profiles::ProfileStore;
use crate::pipeline::ai::AiService;
use crate::pipeline::documents::DocumentRegistry;
use crate::pipeline::upload::StorageProvider;
use std::sync::Arc;

/// Default upload limit (10 MB)
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// State handed to every route
#[derive(Clone)]
pub struct AppState {
    /// Where PDFs are stored
    pub storage: Arc<dyn StorageProvider>,
    /// Summarization and Q&A service
    pub ai: Arc<dyn AiService>,
    /// Uploaded document metadata
    pub documents: Arc<DocumentRegistry>,
    /// Onboarding flags
    pub profiles: Arc<ProfileStore>,
    /// Largest accepted upload in bytes
    pub max_upload_bytes: u64,
}

impl AppState {
    /// State with empty registries and the default upload limit
    #[must_use]
    pub fn new(storage: Arc<dyn StorageProvider>, ai: Arc<dyn AiService>) -> Self {
        Self {
            storage,
            ai,
            documents: Arc::new(DocumentRegistry::new()),
            profiles: Arc::new(ProfileStore::new()),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Override the upload limit
    #[must_use]
    pub fn with_max_upload_bytes(mut self, max_upload_bytes: u64) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}
