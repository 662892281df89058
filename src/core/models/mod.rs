//! Data models for `WizScholar`

pub mod document;
pub mod grade;
pub mod profile;
pub mod semester;
pub mod subject;

pub use document::DocumentRecord;
pub use grade::{grade_points, GradeParseError, GradeValue, LetterGrade};
pub use profile::UserProfile;
pub use semester::Semester;
pub use subject::Subject;
