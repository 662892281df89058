//! Transcript report generation
//!
//! Renders the semester store as a standalone HTML page or a Markdown
//! document. Both formats share [`ReportContext`], which pre-formats every
//! number so the templates only lay things out.

pub mod formats;

use crate::core::aggregator::{round_to, Standing, CGPA_DECIMALS};
use crate::core::store::SemesterStore;
use chrono::{DateTime, Utc};
use std::error::Error;
use std::fs;
use std::path::Path;

pub use formats::{HtmlReporter, MarkdownReporter, ReportFormat};

/// One subject line of the transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectLine {
    /// Subject name, or "Untitled" when left blank
    pub name: String,
    /// Credits as entered, `-` when missing
    pub credits: String,
    /// Grade as entered, `-` when missing
    pub grade: String,
    /// Grade points for the grade
    pub points: String,
}

/// One semester block of the transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemesterLine {
    /// 1-based ordinal
    pub ordinal: usize,
    /// Cached SGPA, three decimals
    pub sgpa: String,
    /// Credit total
    pub credits: String,
    /// Standing label for the SGPA
    pub standing: String,
    /// CSS class for the standing band
    pub standing_class: String,
    /// Subject rows
    pub subjects: Vec<SubjectLine>,
}

/// Everything a transcript template needs
#[derive(Debug, Clone)]
pub struct ReportContext {
    /// Report title
    pub title: String,
    /// CGPA, four decimals
    pub cgpa: String,
    /// Standing label for the CGPA
    pub standing: String,
    /// CSS class for the CGPA standing band
    pub standing_class: String,
    /// Credits across all semesters
    pub total_credits: String,
    /// Semester blocks in order
    pub semesters: Vec<SemesterLine>,
    /// Generation time
    pub generated_at: DateTime<Utc>,
}

impl ReportContext {
    /// Build the context from a store
    #[must_use]
    pub fn new(title: impl Into<String>, store: &SemesterStore) -> Self {
        let cgpa = round_to(store.cgpa(), CGPA_DECIMALS);
        let standing = Standing::from_gpa(cgpa);

        let semesters = store
            .semesters()
            .iter()
            .map(|semester| {
                let band = Standing::from_gpa(semester.sgpa);
                SemesterLine {
                    ordinal: semester.semester,
                    sgpa: format!("{:.3}", semester.sgpa),
                    credits: format_number(semester.credits),
                    standing: band.label().to_string(),
                    standing_class: band.css_class().to_string(),
                    subjects: semester
                        .subjects
                        .iter()
                        .map(|subject| SubjectLine {
                            name: if subject.name.trim().is_empty() {
                                "Untitled".to_string()
                            } else {
                                subject.name.clone()
                            },
                            credits: subject
                                .credits
                                .map_or_else(|| "-".to_string(), format_number),
                            grade: subject
                                .grade
                                .clone()
                                .filter(|g| !g.is_empty())
                                .unwrap_or_else(|| "-".to_string()),
                            points: format_number(subject.grade_points()),
                        })
                        .collect(),
                }
            })
            .collect();

        Self {
            title: title.into(),
            cgpa: format!("{cgpa:.4}"),
            standing: standing.label().to_string(),
            standing_class: standing.css_class().to_string(),
            total_credits: format_number(store.total_credits()),
            semesters,
            generated_at: Utc::now(),
        }
    }

    /// Number of semesters on the transcript
    #[must_use]
    pub fn semester_count(&self) -> usize {
        self.semesters.len()
    }
}

/// Whole numbers without a fractional part, others with up to two decimals.
fn format_number(value: f64) -> String {
    if (value - value.round()).abs() < f64::EPSILON {
        format!("{value:.0}")
    } else {
        let text = format!("{value:.2}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Trait for report generators
pub trait ReportGenerator {
    /// Generate a report to a file
    ///
    /// # Errors
    /// Returns an error if rendering or writing the file fails
    fn generate(&self, ctx: &ReportContext, output_path: &Path) -> Result<(), Box<dyn Error>> {
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(output_path, self.render(ctx)?)?;
        Ok(())
    }

    /// Generate report content as a string
    ///
    /// # Errors
    /// Returns an error if template rendering fails
    fn render(&self, ctx: &ReportContext) -> Result<String, Box<dyn Error>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::Subject;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(4.0), "4");
        assert_eq!(format_number(3.5), "3.5");
        assert_eq!(format_number(2.25), "2.25");
        assert_eq!(format_number(2.999), "3");
    }

    #[test]
    fn test_context_from_store() {
        let mut store = SemesterStore::new();
        store
            .add_semester(vec![
                Subject::new("Maths", 4.0, "A"),
                Subject::new("", 3.0, "B+"),
            ])
            .unwrap();

        let ctx = ReportContext::new("Transcript", &store);
        assert_eq!(ctx.semester_count(), 1);
        assert_eq!(ctx.cgpa, "7.5710");
        assert_eq!(ctx.standing, "Average");
        assert_eq!(ctx.semesters[0].sgpa, "7.571");
        assert_eq!(ctx.semesters[0].subjects[1].name, "Untitled");
        assert_eq!(ctx.semesters[0].subjects[1].points, "7");
    }
}
