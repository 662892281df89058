//! Markdown transcript

use crate::core::report::{ReportContext, ReportGenerator, SemesterLine};
use askama::Template;
use std::error::Error;

#[derive(Template)]
#[template(path = "transcript.md", escape = "none")]
struct TranscriptMarkdown<'a> {
    title: &'a str,
    cgpa: &'a str,
    standing: &'a str,
    total_credits: &'a str,
    semesters: &'a [SemesterLine],
    generated_at: String,
}

/// Markdown report generator
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownReporter;

impl MarkdownReporter {
    /// Create a new Markdown reporter
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ReportGenerator for MarkdownReporter {
    fn render(&self, ctx: &ReportContext) -> Result<String, Box<dyn Error>> {
        let doc = TranscriptMarkdown {
            title: &ctx.title,
            cgpa: &ctx.cgpa,
            standing: &ctx.standing,
            total_credits: &ctx.total_credits,
            semesters: &ctx.semesters,
            generated_at: ctx.generated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        };
        Ok(doc.render()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::Subject;
    use crate::core::store::SemesterStore;

    #[test]
    fn test_markdown_tables() {
        let mut store = SemesterStore::new();
        store
            .add_semester(vec![Subject::new("Maths", 4.0, "A")])
            .unwrap();
        store
            .add_semester(vec![Subject::new("Physics", 3.0, "O")])
            .unwrap();

        let md = MarkdownReporter::new()
            .render(&ReportContext::new("My Transcript", &store))
            .unwrap();

        assert!(md.starts_with("# My Transcript"));
        assert!(md.contains("## Semester 2"));
        assert!(md.contains("| Maths | 4 | A | 8 |"));
        assert!(md.contains("**CGPA:** 8.8571"));
    }

    #[test]
    fn test_markdown_empty_store() {
        let md = MarkdownReporter::new()
            .render(&ReportContext::new("Empty", &SemesterStore::new()))
            .unwrap();
        assert!(md.contains("No semesters recorded yet."));
    }
}
