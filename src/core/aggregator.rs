//! Grade-point aggregation
//!
//! Pure functions over subjects and semesters: SGPA, CGPA, the target-CGPA
//! solver and the standing bands shown next to each average. Every function
//! here is deterministic and side-effect free; the semester store calls into
//! this module whenever its contents change.

use crate::core::models::{Semester, Subject};
use serde::Serialize;
use std::fmt;

/// Highest grade point on the scale
pub const MAX_GRADE_POINT: f64 = 10.0;

/// Decimals kept in a semester's cached SGPA
pub const SGPA_DECIMALS: u32 = 3;

/// Decimals shown for the CGPA
pub const CGPA_DECIMALS: u32 = 4;

/// Round half away from zero to `decimals` places.
#[must_use]
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(i32::try_from(decimals).unwrap_or(i32::MAX));
    (value * factor).round() / factor
}

/// Sum of entered credits over all rows, graded or not.
#[must_use]
pub fn total_credits(subjects: &[Subject]) -> f64 {
    subjects.iter().map(Subject::credit_value).sum()
}

/// Credit-weighted mean of grade points over the graded rows.
///
/// Rows missing either credits or a grade are skipped. Returns 0 when no row
/// is graded or the graded credits sum to 0.
#[must_use]
pub fn compute_sgpa(subjects: &[Subject]) -> f64 {
    let (credits, points) = subjects
        .iter()
        .filter(|s| s.is_graded())
        .fold((0.0, 0.0), |(credits, points), s| {
            (credits + s.credit_value(), points + s.weighted_points())
        });

    if credits > 0.0 {
        points / credits
    } else {
        0.0
    }
}

/// Credit-weighted mean of the cached semester SGPAs.
///
/// Uses each semester's stored (already rounded) `sgpa`, so results match
/// what the calculator has always displayed. Returns 0 for no semesters.
#[must_use]
pub fn compute_cgpa(semesters: &[Semester]) -> f64 {
    let credits: f64 = semesters.iter().map(|s| s.credits).sum();
    if credits > 0.0 {
        semesters.iter().map(Semester::grade_points).sum::<f64>() / credits
    } else {
        0.0
    }
}

/// Outcome of the target-CGPA solver
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetProjection {
    /// SGPA needed in each future semester, clamped to `[0, 10]`
    pub required_sgpa: f64,
    /// Whether the unclamped requirement lies within `[0, 10]`
    pub achievable: bool,
    /// Credits already completed
    pub current_credits: f64,
    /// Credits assumed for the future semesters
    pub projected_future_credits: f64,
}

/// Solve for the SGPA that future semesters must average to reach `target_cgpa`.
///
/// Future semesters are assumed to carry the current average credits per
/// semester. Returns `None` when the target is outside `[0, 10]`, when
/// `future_semesters` is 0, or when there are no semesters to extrapolate from.
#[must_use]
pub fn required_future_sgpa(
    semesters: &[Semester],
    target_cgpa: f64,
    future_semesters: u32,
) -> Option<TargetProjection> {
    if !(0.0..=MAX_GRADE_POINT).contains(&target_cgpa) || future_semesters == 0 {
        return None;
    }
    if semesters.is_empty() {
        return None;
    }

    let current_credits: f64 = semesters.iter().map(|s| s.credits).sum();
    let current_points: f64 = semesters.iter().map(Semester::grade_points).sum();

    #[allow(clippy::cast_precision_loss)]
    let avg_credits = current_credits / semesters.len() as f64;
    let projected_future_credits = f64::from(future_semesters) * avg_credits;
    if projected_future_credits <= 0.0 {
        return None;
    }

    let required = (target_cgpa * (current_credits + projected_future_credits) - current_points)
        / projected_future_credits;

    Some(TargetProjection {
        required_sgpa: required.clamp(0.0, MAX_GRADE_POINT),
        achievable: (0.0..=MAX_GRADE_POINT).contains(&required),
        current_credits,
        projected_future_credits,
    })
}

/// Performance band for an SGPA or CGPA
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Standing {
    /// 9.0 and above
    Outstanding,
    /// 8.0 to below 9.0
    Good,
    /// 7.0 to below 8.0
    Average,
    /// 6.0 to below 7.0
    BelowAverage,
    /// 5.0 to below 6.0
    Pass,
    /// Below 5.0
    Fail,
}

impl Standing {
    /// Band for a grade-point average
    #[must_use]
    pub fn from_gpa(gpa: f64) -> Self {
        match gpa {
            g if g >= 9.0 => Self::Outstanding,
            g if g >= 8.0 => Self::Good,
            g if g >= 7.0 => Self::Average,
            g if g >= 6.0 => Self::BelowAverage,
            g if g >= 5.0 => Self::Pass,
            _ => Self::Fail,
        }
    }

    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Outstanding => "Outstanding",
            Self::Good => "Good",
            Self::Average => "Average",
            Self::BelowAverage => "Below Average",
            Self::Pass => "Pass",
            Self::Fail => "Fail/Backlog",
        }
    }

    /// Short identifier suitable for CSS classes
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Outstanding => "excellent",
            Self::Good => "good",
            Self::Average => "average",
            Self::BelowAverage | Self::Pass | Self::Fail => "below-average",
        }
    }
}

impl fmt::Display for Standing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn semester(ordinal: usize, sgpa: f64, credits: f64) -> Semester {
        Semester {
            semester: ordinal,
            subjects: Vec::new(),
            sgpa,
            credits,
        }
    }

    #[test]
    fn test_sgpa_worked_example() {
        let subjects = vec![Subject::new("", 4.0, "A"), Subject::new("", 3.0, "B+")];
        assert!((compute_sgpa(&subjects) - 53.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_sgpa_zero_credits() {
        assert!(compute_sgpa(&[]).abs() < f64::EPSILON);
        let zero = vec![Subject::new("", 0.0, "O"), Subject::new("", 0.0, "A")];
        assert!(compute_sgpa(&zero).abs() < f64::EPSILON);
    }

    #[test]
    fn test_sgpa_skips_incomplete_rows() {
        let subjects = vec![
            Subject::new("", 4.0, "O"),
            Subject {
                name: "No grade".to_string(),
                credits: Some(4.0),
                grade: None,
            },
        ];
        assert!((compute_sgpa(&subjects) - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_sgpa_order_independent() {
        let forward = vec![
            Subject::new("", 4.0, "A"),
            Subject::new("", 3.0, "C"),
            Subject::new("", 2.0, "O"),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();
        assert!((compute_sgpa(&forward) - compute_sgpa(&reversed)).abs() < 1e-12);
    }

    #[test]
    fn test_cgpa_worked_example() {
        let semesters = vec![semester(1, 8.0, 20.0), semester(2, 9.0, 18.0)];
        let cgpa = compute_cgpa(&semesters);
        assert!((cgpa - 322.0 / 38.0).abs() < 1e-12);
        assert!((round_to(cgpa, 3) - 8.474).abs() < 1e-12);
    }

    #[test]
    fn test_cgpa_empty_is_zero() {
        assert!(compute_cgpa(&[]).abs() < f64::EPSILON);
    }

    #[test]
    fn test_target_unreachable_is_clamped() {
        let semesters = vec![semester(1, 7.0, 20.0)];
        let projection = required_future_sgpa(&semesters, 9.0, 1).unwrap();

        assert!((projection.required_sgpa - 10.0).abs() < f64::EPSILON);
        assert!(!projection.achievable);
        assert!((projection.current_credits - 20.0).abs() < f64::EPSILON);
        assert!((projection.projected_future_credits - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_target_reachable() {
        let semesters = vec![semester(1, 7.0, 20.0), semester(2, 8.0, 20.0)];
        let projection = required_future_sgpa(&semesters, 8.0, 2).unwrap();

        // (8 * 80 - 300) / 40 = 8.5
        assert!((projection.required_sgpa - 8.5).abs() < 1e-12);
        assert!(projection.achievable);
    }

    #[test]
    fn test_target_below_zero_requirement() {
        let semesters = vec![semester(1, 10.0, 20.0)];
        let projection = required_future_sgpa(&semesters, 2.0, 1).unwrap();

        assert!(projection.required_sgpa.abs() < f64::EPSILON);
        assert!(!projection.achievable);
    }

    #[test]
    fn test_target_rejects_bad_input() {
        let semesters = vec![semester(1, 7.0, 20.0)];
        assert!(required_future_sgpa(&semesters, 10.5, 1).is_none());
        assert!(required_future_sgpa(&semesters, -0.1, 1).is_none());
        assert!(required_future_sgpa(&semesters, 8.0, 0).is_none());
        assert!(required_future_sgpa(&[], 8.0, 2).is_none());
    }

    #[test]
    fn test_standing_bands() {
        assert_eq!(Standing::from_gpa(9.0), Standing::Outstanding);
        assert_eq!(Standing::from_gpa(8.999), Standing::Good);
        assert_eq!(Standing::from_gpa(7.2), Standing::Average);
        assert_eq!(Standing::from_gpa(6.0), Standing::BelowAverage);
        assert_eq!(Standing::from_gpa(5.5), Standing::Pass);
        assert_eq!(Standing::from_gpa(4.99), Standing::Fail);
        assert_eq!(Standing::Fail.label(), "Fail/Backlog");
    }

    #[test]
    fn test_round_to() {
        assert!((round_to(7.571_428, 3) - 7.571).abs() < 1e-12);
        assert!((round_to(8.473_684, 4) - 8.4737).abs() < 1e-12);
    }
}
