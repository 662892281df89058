//! Semester model

use crate::core::aggregator::{compute_sgpa, round_to, total_credits, SGPA_DECIMALS};
use crate::core::models::Subject;
use serde::{Deserialize, Deserializer, Serialize};

/// A completed semester with its cached SGPA and credit total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Semester {
    /// 1-based ordinal; kept contiguous by the store
    pub semester: usize,

    /// Subject rows in insertion order
    #[serde(default)]
    pub subjects: Vec<Subject>,

    /// SGPA rounded to three decimals when the semester was completed or last edited
    #[serde(deserialize_with = "number_or_numeric_string")]
    pub sgpa: f64,

    /// Sum of the subject credits
    #[serde(deserialize_with = "number_or_numeric_string")]
    pub credits: f64,
}

impl Semester {
    /// Build a semester from its subject rows, deriving the cached fields
    ///
    /// # Arguments
    /// * `ordinal` - 1-based position in the store
    /// * `subjects` - Subject rows as entered
    #[must_use]
    pub fn new(ordinal: usize, subjects: Vec<Subject>) -> Self {
        let mut semester = Self {
            semester: ordinal,
            subjects: Vec::new(),
            sgpa: 0.0,
            credits: 0.0,
        };
        semester.replace_subjects(subjects);
        semester
    }

    /// Replace all subject rows and recompute the cached fields; the ordinal is kept
    pub fn replace_subjects(&mut self, subjects: Vec<Subject>) {
        self.sgpa = round_to(compute_sgpa(&subjects), SGPA_DECIMALS);
        self.credits = total_credits(&subjects);
        self.subjects = subjects;
    }

    /// Contribution of this semester to the CGPA numerator
    #[must_use]
    pub fn grade_points(&self) -> f64 {
        self.sgpa * self.credits
    }
}

/// Older snapshots stored `sgpa` as `toFixed(3)` text.
fn number_or_numeric_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| D::Error::custom("number out of range")),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| D::Error::custom(format!("expected a number, found '{s}'"))),
        other => Err(D::Error::custom(format!("expected a number, found {other}"))),
    }
}
