//! Report command handler
//!
//! Renders the recorded semesters as a Markdown or HTML transcript.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use wiz_scholar::config::Config;
use wiz_scholar::core::report::{
    formats::ReportFormat, HtmlReporter, MarkdownReporter, ReportContext, ReportGenerator,
};
use wiz_scholar::core::storage::FileStorage;
use wiz_scholar::{error, info};

/// Run the report command.
///
/// # Arguments
/// * `output_file` - Optional output path
/// * `format_str` - Report format (markdown, html)
/// * `title` - Transcript title
/// * `config` - Configuration containing the data and reports directories
pub fn run(output_file: Option<&Path>, format_str: &str, title: &str, config: &Config) {
    match generate_report(output_file, format_str, title, config) {
        Ok(path) => println!("✓ Report generated: {}", path.display()),
        Err(err) => {
            error!("Report generation failed: {err}");
            super::fail(err);
        }
    }
}

fn generate_report(
    output_file: Option<&Path>,
    format_str: &str,
    title: &str,
    config: &Config,
) -> Result<PathBuf, String> {
    let format = ReportFormat::from_str(format_str)?;

    let storage = FileStorage::in_dir(&config.data_dir());
    let store = super::semester::load_store(&storage);
    let ctx = ReportContext::new(title, &store);
    info!(
        "Rendering {format} transcript of {} semesters",
        ctx.semester_count()
    );

    let path = output_file.map_or_else(
        || default_report_path(&config.reports_dir(), format),
        Path::to_path_buf,
    );

    let result = match format {
        ReportFormat::Markdown => MarkdownReporter::new().generate(&ctx, &path),
        ReportFormat::Html => HtmlReporter::new().generate(&ctx, &path),
    };
    result.map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
    Ok(path)
}

/// `transcript.<ext>` inside the reports directory
fn default_report_path(reports_dir: &Path, format: ReportFormat) -> PathBuf {
    reports_dir.join(format!("transcript.{}", format.extension()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_report_path() {
        assert_eq!(
            default_report_path(Path::new("/reports"), ReportFormat::Markdown),
            PathBuf::from("/reports/transcript.md")
        );
        assert_eq!(
            default_report_path(Path::new("/reports"), ReportFormat::Html),
            PathBuf::from("/reports/transcript.html")
        );
    }
}
