//! Router assembly and the serve loop

use crate::core::config::Config;
use crate::pipeline::ai::HttpAiClient;
use crate::pipeline::routes;
use crate::pipeline::state::AppState;
use crate::pipeline::upload::CloudinaryStorage;
use axum::{
    extract::DefaultBodyLimit,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Room left above the upload limit for multipart framing
const MULTIPART_SLACK_BYTES: u64 = 64 * 1024;

/// Build the application router
pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    let body_limit =
        usize::try_from(state.max_upload_bytes.saturating_add(MULTIPART_SLACK_BYTES))
            .unwrap_or(usize::MAX);

    Router::new()
        .route("/", get(routes::root))
        .route("/api/health", get(routes::health))
        .route("/api/pdf/upload", post(routes::upload_pdf))
        .route("/api/pdf/summarize-pdf-url", post(routes::summarize_pdf_url))
        .route("/api/ask-question", post(routes::ask_question))
        .route("/api/pdf-proxy/*public_id", get(routes::pdf_proxy))
        .route("/api/documents", get(routes::list_documents))
        .route("/api/profile/:uid", get(routes::get_profile))
        .route(
            "/api/profile/:uid/first-time",
            post(routes::complete_first_time),
        )
        .route("/api/profile/:uid/sorting", post(routes::complete_sorting))
        .fallback(routes::not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// CORS for the listed origins, or any origin when the list is empty
#[must_use]
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                crate::warn!("Ignoring invalid CORS origin '{origin}'");
                None
            }
        })
        .collect();

    if parsed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(parsed))
    }
}

/// Production state from the config: Cloudinary storage and the HTTP AI client
///
/// # Errors
/// Returns an error when storage credentials or the AI endpoint are missing.
pub fn state_from_config(config: &Config) -> Result<AppState, Box<dyn Error>> {
    let timeout = Duration::from_secs(config.ai.timeout_secs.max(1));
    let storage = CloudinaryStorage::new(&config.storage, timeout)?;
    let ai = HttpAiClient::new(&config.ai.endpoint, timeout, config.ai.retry)?;

    Ok(AppState::new(Arc::new(storage), Arc::new(ai))
        .with_max_upload_bytes(config.max_upload_bytes()))
}

/// Serve on an already bound listener until Ctrl+C or SIGTERM
///
/// # Errors
/// Returns an error if the server fails while running.
pub async fn serve_on(
    listener: TcpListener,
    state: AppState,
    cors_origins: &[String],
) -> Result<(), Box<dyn Error>> {
    let app = router(state, cors_origins);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    crate::info!("Server shut down");
    Ok(())
}

/// Bind `server.host:server.port` and serve
///
/// # Errors
/// Returns an error if the state cannot be built, the address cannot be bound,
/// or the server fails.
pub async fn serve(config: &Config) -> Result<(), Box<dyn Error>> {
    let state = state_from_config(config)?;
    let address = format!("{}:{}", config.server.host, config.server.port);

    crate::info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    crate::info!(
        "Server running on {address} (AI service: {})",
        config.ai.endpoint
    );

    serve_on(listener, state, &config.server.cors_origins).await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_err() {
            crate::error!("Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        crate::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                crate::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                crate::error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
