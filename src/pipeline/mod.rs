//! Upload/summarize pipeline
//!
//! An axum server that stores PDFs with a storage provider, relays
//! summarization and questions to an external AI service, re-serves stored
//! PDFs and keeps onboarding flags. [`client`] is the matching async client.

pub mod ai;
pub mod client;
pub mod documents;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;
pub mod upload;

pub use ai::{AiService, AnswerStyle, HttpAiClient, Summary, SummaryType};
pub use client::{PipelineClient, TaskHandle, TaskState};
pub use documents::DocumentRegistry;
pub use error::{PipelineError, UpstreamError};
pub use server::{router, serve};
pub use state::AppState;
pub use upload::{CloudinaryStorage, StorageProvider, StoredFile};
