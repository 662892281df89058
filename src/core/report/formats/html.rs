//! HTML transcript
//!
//! A single self-contained page with embedded CSS.

use crate::core::report::{ReportContext, ReportGenerator, SemesterLine};
use askama::Template;
use std::error::Error;

#[derive(Template)]
#[template(path = "transcript.html")]
struct TranscriptHtml<'a> {
    title: &'a str,
    cgpa: &'a str,
    standing: &'a str,
    standing_class: &'a str,
    total_credits: &'a str,
    semesters: &'a [SemesterLine],
    generated_at: String,
}

/// HTML report generator
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlReporter;

impl HtmlReporter {
    /// Create a new HTML reporter
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ReportGenerator for HtmlReporter {
    fn render(&self, ctx: &ReportContext) -> Result<String, Box<dyn Error>> {
        let page = TranscriptHtml {
            title: &ctx.title,
            cgpa: &ctx.cgpa,
            standing: &ctx.standing,
            standing_class: &ctx.standing_class,
            total_credits: &ctx.total_credits,
            semesters: &ctx.semesters,
            generated_at: ctx.generated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        };
        Ok(page.render()?)
    }
}
