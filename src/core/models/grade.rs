//! Grade model
//!
//! Letter grades on the ten-point scale, plus the lenient conversion used by
//! the calculator where anything that is not a letter is read as a literal
//! grade-point value and anything unreadable becomes zero.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical letter grades, highest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LetterGrade {
    /// Outstanding (10)
    #[serde(rename = "O")]
    O,
    /// A+ (9)
    #[serde(rename = "A+")]
    APlus,
    /// A (8)
    #[serde(rename = "A")]
    A,
    /// B+ (7)
    #[serde(rename = "B+")]
    BPlus,
    /// B (6)
    #[serde(rename = "B")]
    B,
    /// C (5)
    #[serde(rename = "C")]
    C,
    /// D (4)
    #[serde(rename = "D")]
    D,
    /// Fail (0)
    #[serde(rename = "F")]
    F,
}

impl LetterGrade {
    /// Every letter grade in descending order of grade points
    pub const ALL: [Self; 8] = [
        Self::O,
        Self::APlus,
        Self::A,
        Self::BPlus,
        Self::B,
        Self::C,
        Self::D,
        Self::F,
    ];

    /// Grade points awarded for this letter
    #[must_use]
    pub const fn points(self) -> f64 {
        match self {
            Self::O => 10.0,
            Self::APlus => 9.0,
            Self::A => 8.0,
            Self::BPlus => 7.0,
            Self::B => 6.0,
            Self::C => 5.0,
            Self::D => 4.0,
            Self::F => 0.0,
        }
    }

    /// Symbol as entered by users (e.g., "B+")
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::O => "O",
            Self::APlus => "A+",
            Self::A => "A",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        }
    }
}

impl FromStr for LetterGrade {
    type Err = GradeParseError;

    /// Exact, case-sensitive match against the canonical symbols.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|grade| grade.symbol() == s)
            .ok_or_else(|| GradeParseError(s.to_string()))
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Raised by the strict grade parser for input that is neither a letter nor a number
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized grade '{0}'")]
pub struct GradeParseError(pub String);

/// A grade as interpreted by the calculator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradeValue {
    /// One of the eight canonical letters
    Letter(LetterGrade),
    /// A literal grade-point value typed in place of a letter
    Points(f64),
}

impl GradeValue {
    /// Parse without degrading: unknown input is an error.
    ///
    /// # Errors
    /// Returns [`GradeParseError`] when `input` is neither a canonical letter nor
    /// a finite number.
    pub fn parse_strict(input: &str) -> Result<Self, GradeParseError> {
        if let Ok(letter) = input.parse::<LetterGrade>() {
            return Ok(Self::Letter(letter));
        }
        input
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Self::Points)
            .ok_or_else(|| GradeParseError(input.to_string()))
    }

    /// Grade points for this value
    #[must_use]
    pub const fn points(self) -> f64 {
        match self {
            Self::Letter(letter) => letter.points(),
            Self::Points(points) => points,
        }
    }
}

/// Convert a user-entered grade to grade points.
///
/// Canonical letters map to the ten-point scale; other input is read as a
/// number; anything else yields 0. Never fails.
#[must_use]
pub fn grade_points(grade: &str) -> f64 {
    GradeValue::parse_strict(grade).map_or(0.0, GradeValue::points)
}
