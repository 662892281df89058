//! Subject model

use crate::core::models::grade::grade_points;
use serde::{Deserialize, Deserializer, Serialize};

/// One subject row of a semester
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Subject {
    /// Free-text label (e.g., "Data Structures"); not required to be unique
    #[serde(default)]
    pub name: String,

    /// Credit weight; `None` until entered
    #[serde(default, deserialize_with = "lenient_number")]
    pub credits: Option<f64>,

    /// Grade as entered (letter or numeric); `None` until entered
    #[serde(default, deserialize_with = "lenient_text")]
    pub grade: Option<String>,
}

impl Subject {
    /// Create a fully entered subject
    #[must_use]
    pub fn new(name: impl Into<String>, credits: f64, grade: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            credits: Some(credits),
            grade: Some(grade.into()),
        }
    }

    /// Whether this row takes part in the SGPA (both credits and a grade are set)
    #[must_use]
    pub fn is_graded(&self) -> bool {
        self.credits.is_some() && self.grade.as_deref().is_some_and(|g| !g.is_empty())
    }

    /// Credits counted towards the semester total (0 when not entered)
    #[must_use]
    pub fn credit_value(&self) -> f64 {
        self.credits.unwrap_or(0.0)
    }

    /// Grade points for this row's grade (0 when not entered or unreadable)
    #[must_use]
    pub fn grade_points(&self) -> f64 {
        self.grade.as_deref().map_or(0.0, grade_points)
    }

    /// Weighted points (credits × grade points) for a graded row, 0 otherwise
    #[must_use]
    pub fn weighted_points(&self) -> f64 {
        if self.is_graded() {
            self.credit_value() * self.grade_points()
        } else {
            0.0
        }
    }
}

/// Accept numbers, numeric strings, empty strings and null.
///
/// Older calculator snapshots store credits as the raw form text ("4", "").
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let value = match raw {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    // Credits are never negative
    Ok(value.filter(|v| v.is_finite() && *v >= 0.0))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_creation() {
        let subject = Subject::new("Discrete Structures", 4.0, "A");

        assert_eq!(subject.name, "Discrete Structures");
        assert!(subject.is_graded());
        assert!((subject.weighted_points() - 32.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_incomplete_rows_are_not_graded() {
        let no_grade = Subject {
            name: "Lab".to_string(),
            credits: Some(2.0),
            grade: None,
        };
        assert!(!no_grade.is_graded());
        assert!((no_grade.credit_value() - 2.0).abs() < f64::EPSILON);
        assert!(no_grade.weighted_points().abs() < f64::EPSILON);

        let empty_grade = Subject {
            grade: Some(String::new()),
            ..no_grade
        };
        assert!(!empty_grade.is_graded());
    }

    #[test]
    fn test_legacy_string_fields() {
        let subject: Subject =
            serde_json::from_str(r#"{"name":"Physics","credits":"3","grade":"B+"}"#).unwrap();
        assert_eq!(subject.credits, Some(3.0));
        assert_eq!(subject.grade.as_deref(), Some("B+"));

        let blank: Subject = serde_json::from_str(r#"{"name":"","credits":"","grade":""}"#).unwrap();
        assert_eq!(blank.credits, None);
        assert_eq!(blank.grade, None);
    }

    #[test]
    fn test_invalid_stored_credits_are_dropped() {
        for raw in [
            r#"{"name":"X","credits":-4,"grade":"F"}"#,
            r#"{"name":"X","credits":"-4","grade":"F"}"#,
            r#"{"name":"X","credits":"inf","grade":"F"}"#,
            r#"{"name":"X","credits":"NaN","grade":"F"}"#,
        ] {
            let subject: Subject = serde_json::from_str(raw).unwrap();
            assert_eq!(subject.credits, None, "{raw}");
            assert!(!subject.is_graded());
        }
    }

    #[test]
    fn test_missing_fields_default() {
        let subject: Subject = serde_json::from_str("{}").unwrap();
        assert_eq!(subject, Subject::default());
    }
}
