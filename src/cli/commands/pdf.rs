//! PDF command handlers
//!
//! Thin wrappers over [`PipelineClient`] against a running pipeline server.

use crate::args::PdfSubcommand;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use wiz_scholar::config::Config;
use wiz_scholar::pipeline::ai::Answer;
use wiz_scholar::pipeline::client::{ClientError, ProgressFn, UploadedPdf};
use wiz_scholar::pipeline::{PipelineClient, Summary, SummaryType};
use wiz_scholar::{debug, info};

/// Dispatch pdf subcommands
pub fn run(subcommand: PdfSubcommand, server: Option<&str>, config: &Config) {
    let base_url = server.map_or_else(|| default_server_url(config), str::to_string);
    debug!("Using pipeline server at {base_url}");
    let client = PipelineClient::new(
        &base_url,
        config.max_upload_bytes(),
        Duration::from_secs(config.ai.timeout_secs.max(1) * 2),
    );

    let runtime = tokio::runtime::Runtime::new()
        .unwrap_or_else(|e| super::fail(format!("Failed to start async runtime: {e}")));

    match subcommand {
        PdfSubcommand::Upload {
            file,
            summarize,
            summary_type,
        } => {
            let uploaded = runtime
                .block_on(upload(&client, &file))
                .unwrap_or_else(|e| super::fail(e));
            print_upload(&uploaded);
            if summarize {
                let summary = runtime
                    .block_on(client.summarize(
                        &uploaded.storage_url,
                        summary_type.into(),
                        Some(&uploaded.filename),
                    ))
                    .unwrap_or_else(|e| super::fail(e));
                print_summary(&summary);
            }
        }
        PdfSubcommand::Summarize {
            pdf_url,
            summary_type,
            filename,
        } => {
            let summary_type: SummaryType = summary_type.into();
            info!("Summarizing {pdf_url} ({summary_type})");
            let summary = runtime
                .block_on(client.summarize(&pdf_url, summary_type, filename.as_deref()))
                .unwrap_or_else(|e| super::fail(e));
            print_summary(&summary);
        }
        PdfSubcommand::Ask {
            question,
            document_id,
            context,
            style,
        } => {
            let answer = runtime
                .block_on(client.ask(
                    document_id.as_deref(),
                    context.as_deref(),
                    &question,
                    style.into(),
                ))
                .unwrap_or_else(|e| super::fail(e));
            print_answer(&answer);
        }
    }
}

/// `http://host:port` for the configured server; wildcard binds map to loopback
fn default_server_url(config: &Config) -> String {
    let host = match config.server.host.as_str() {
        "" | "0.0.0.0" | "::" => "127.0.0.1",
        host => host,
    };
    format!("http://{host}:{}", config.server.port)
}

async fn upload(
    client: &PipelineClient,
    file: &Path,
) -> Result<UploadedPdf, ClientError> {
    let progress: ProgressFn = Arc::new(|pct| {
        eprint!("\rUploading... {pct:>3}%");
        std::io::stderr().flush().ok();
        if pct == 100 {
            eprintln!();
        }
    });
    info!("Uploading {}", file.display());
    client.upload_file(file, progress).await
}

fn print_upload(uploaded: &UploadedPdf) {
    println!("✓ Uploaded {}", uploaded.filename);
    println!("  Document id: {}", uploaded.public_id);
    println!("  Storage URL: {}", uploaded.storage_url);
    println!("  Size:        {} bytes", uploaded.file_size);
}

fn print_summary(summary: &Summary) {
    if let Some(kind) = &summary.summary_type {
        println!("=== Summary ({kind}) ===");
    } else {
        println!("=== Summary ===");
    }
    println!("{}", summary.summary);
    if let Some(words) = summary.summary_length {
        println!("\n({words} words)");
    }
}

fn print_answer(answer: &Answer) {
    println!("{}", answer.answer);
}
