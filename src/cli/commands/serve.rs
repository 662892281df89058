//! Serve command handler

use wiz_scholar::config::Config;
use wiz_scholar::{error, pipeline};

/// Run the pipeline server until Ctrl+C
pub fn run(config: &Config) {
    let runtime = tokio::runtime::Runtime::new()
        .unwrap_or_else(|e| super::fail(format!("Failed to start async runtime: {e}")));

    println!(
        "✓ Starting pipeline server on {}:{}",
        config.server.host, config.server.port
    );
    if let Err(e) = runtime.block_on(pipeline::serve(config)) {
        error!("Server failed: {e}");
        super::fail(format!("Server failed: {e}"));
    }
}
