//! Semester store
//!
//! Ordered collection of completed semesters with the CGPA kept in step.
//! Ordinals stay contiguous (1..=N) across every insert and delete, and the
//! CGPA is recomputed from scratch after each change.
//!
//! Persistence goes through [`LocalStorage`] under [`STORE_KEY`]. The value is
//! a JSON array of semesters; the older `{"semesterResults": [...]}` envelope
//! is still accepted when loading.

use crate::core::aggregator::{compute_cgpa, required_future_sgpa, total_credits, TargetProjection};
use crate::core::models::{Semester, Subject};
use crate::core::storage::{LocalStorage, StorageError};
use serde::Deserialize;
use thiserror::Error;

/// Key the store is persisted under
pub const STORE_KEY: &str = "cgpaCalculatorData";

/// Validation and lookup failures for semester operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GradeError {
    /// The subject rows carry no credits at all
    #[error("Please add subjects with credits and grades")]
    NoCredits,

    /// No semester has the given ordinal
    #[error("Semester {index} does not exist (have {count})")]
    SemesterNotFound {
        /// Requested 1-based ordinal
        index: usize,
        /// Number of semesters in the store
        count: usize,
    },

    /// A credit value is negative, not finite, or above the configured cap
    #[error("Credits for '{subject}' must be between 0 and {max}, got {value}")]
    InvalidCredits {
        /// Subject name as entered
        subject: String,
        /// Offending value
        value: String,
        /// Configured cap
        max: String,
    },

    /// A subject row index is out of range
    #[error("Subject row {row} does not exist")]
    RowNotFound {
        /// 0-based row index
        row: usize,
    },

    /// Target CGPA outside `[0, 10]`, no future semesters, or nothing recorded yet
    #[error("Cannot project a target CGPA: {0}")]
    InvalidTarget(String),

    /// The editor was asked for a transition its current state does not allow
    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        /// Requested action
        action: &'static str,
        /// Current editor state
        state: String,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Snapshot {
    Current(Vec<Semester>),
    Legacy {
        #[serde(rename = "semesterResults")]
        semester_results: Vec<Semester>,
    },
}

/// Completed semesters plus their cumulative GPA
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SemesterStore {
    semesters: Vec<Semester>,
    cgpa: f64,
}

impl SemesterStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store over existing semesters; ordinals are normalised to 1..=N
    #[must_use]
    pub fn from_semesters(semesters: Vec<Semester>) -> Self {
        let mut store = Self {
            semesters,
            cgpa: 0.0,
        };
        store.renumber();
        store.recompute();
        store
    }

    /// Load the persisted store, or an empty one when nothing is saved
    ///
    /// # Errors
    /// Returns an error if storage cannot be read or the saved value is not a
    /// semester list.
    pub fn load_or_empty(storage: &impl LocalStorage) -> Result<Self, StorageError> {
        let Some(raw) = storage.get_item(STORE_KEY)? else {
            return Ok(Self::new());
        };
        let semesters = match serde_json::from_str::<Snapshot>(&raw)? {
            Snapshot::Current(semesters) => semesters,
            Snapshot::Legacy { semester_results } => semester_results,
        };
        Ok(Self::from_semesters(semesters))
    }

    /// Persist the store; an empty store removes the key instead of writing `[]`
    ///
    /// # Errors
    /// Returns an error if storage cannot be written.
    pub fn save(&self, storage: &impl LocalStorage) -> Result<(), StorageError> {
        if self.semesters.is_empty() {
            return Self::clear(storage);
        }
        let json = serde_json::to_string(&self.semesters)?;
        storage.set_item(STORE_KEY, &json)
    }

    /// Remove the persisted snapshot
    ///
    /// # Errors
    /// Returns an error if storage cannot be written.
    pub fn clear(storage: &impl LocalStorage) -> Result<(), StorageError> {
        storage.remove_item(STORE_KEY)
    }

    /// Semesters in ordinal order
    #[must_use]
    pub fn semesters(&self) -> &[Semester] {
        &self.semesters
    }

    /// Semester with the given 1-based ordinal
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Semester> {
        index.checked_sub(1).and_then(|i| self.semesters.get(i))
    }

    /// Number of semesters
    #[must_use]
    pub fn len(&self) -> usize {
        self.semesters.len()
    }

    /// Whether no semester is recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.semesters.is_empty()
    }

    /// Current cumulative GPA (unrounded)
    #[must_use]
    pub const fn cgpa(&self) -> f64 {
        self.cgpa
    }

    /// Total credits over all semesters
    #[must_use]
    pub fn total_credits(&self) -> f64 {
        self.semesters.iter().map(|s| s.credits).sum()
    }

    /// Append a completed semester built from `subjects`
    ///
    /// # Errors
    /// Returns [`GradeError::InvalidCredits`] for a negative or non-finite
    /// credit value and [`GradeError::NoCredits`] when the rows carry no
    /// credits; the store is left unchanged.
    pub fn add_semester(&mut self, subjects: Vec<Subject>) -> Result<&Semester, GradeError> {
        ensure_credits(&subjects)?;
        let ordinal = self.semesters.len() + 1;
        self.semesters.push(Semester::new(ordinal, subjects));
        self.recompute();
        Ok(&self.semesters[ordinal - 1])
    }

    /// Replace the subjects of semester `index` (1-based), keeping its ordinal
    ///
    /// # Errors
    /// Returns [`GradeError::SemesterNotFound`] for an unknown ordinal,
    /// [`GradeError::InvalidCredits`] for a negative or non-finite credit value,
    /// or [`GradeError::NoCredits`] when the rows carry no credits.
    pub fn edit_semester(
        &mut self,
        index: usize,
        subjects: Vec<Subject>,
    ) -> Result<&Semester, GradeError> {
        let slot = self.slot(index)?;
        ensure_credits(&subjects)?;
        self.semesters[slot].replace_subjects(subjects);
        self.recompute();
        Ok(&self.semesters[slot])
    }

    /// Remove semester `index` (1-based) and renumber the ones after it
    ///
    /// # Errors
    /// Returns [`GradeError::SemesterNotFound`] for an unknown ordinal.
    pub fn remove_semester(&mut self, index: usize) -> Result<Semester, GradeError> {
        let slot = self.slot(index)?;
        let removed = self.semesters.remove(slot);
        self.renumber();
        self.recompute();
        Ok(removed)
    }

    /// SGPA needed per future semester to reach `target_cgpa`
    ///
    /// # Errors
    /// Returns [`GradeError::InvalidTarget`] when the target is outside
    /// `[0, 10]`, `future_semesters` is 0, or the store is empty.
    pub fn required_future_sgpa(
        &self,
        target_cgpa: f64,
        future_semesters: u32,
    ) -> Result<TargetProjection, GradeError> {
        if self.is_empty() {
            return Err(GradeError::InvalidTarget(
                "no semesters recorded yet".to_string(),
            ));
        }
        required_future_sgpa(&self.semesters, target_cgpa, future_semesters).ok_or_else(|| {
            GradeError::InvalidTarget(format!(
                "target must be within 0-10 and future semesters at least 1 (got {target_cgpa}, {future_semesters})"
            ))
        })
    }

    fn slot(&self, index: usize) -> Result<usize, GradeError> {
        if index == 0 || index > self.semesters.len() {
            return Err(GradeError::SemesterNotFound {
                index,
                count: self.semesters.len(),
            });
        }
        Ok(index - 1)
    }

    fn renumber(&mut self) {
        for (i, semester) in self.semesters.iter_mut().enumerate() {
            semester.semester = i + 1;
        }
    }

    fn recompute(&mut self) {
        self.cgpa = compute_cgpa(&self.semesters);
    }
}

fn ensure_credits(subjects: &[Subject]) -> Result<(), GradeError> {
    if let Some((subject, c)) = subjects
        .iter()
        .find_map(|s| s.credits.filter(|c| !c.is_finite() || *c < 0.0).map(|c| (s, c)))
    {
        return Err(GradeError::InvalidCredits {
            subject: subject.name.clone(),
            value: c.to_string(),
            max: f64::INFINITY.to_string(),
        });
    }
    if total_credits(subjects) > 0.0 {
        Ok(())
    } else {
        Err(GradeError::NoCredits)
    }
}
