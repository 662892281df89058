//! In-progress semester editor
//!
//! Holds the subject rows being typed in and decides what "complete",
//! "save" and "cancel" do. Two states:
//!
//! - `Entering`: building a fresh semester; `complete` appends it to the store.
//! - `Editing(n)`: rows were loaded from semester `n`; `save` writes them back,
//!   `cancel` discards them.
//!
//! Every successful transition returns to `Entering` with a single empty row.

use crate::core::aggregator::{compute_sgpa, total_credits};
use crate::core::models::{Semester, Subject};
use crate::core::store::{GradeError, SemesterStore};
use std::fmt;

/// Default per-subject credit cap
pub const DEFAULT_MAX_CREDITS: f64 = 8.0;

/// Editor state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    /// Building a new semester
    Entering,
    /// Editing the semester with this 1-based ordinal
    Editing(usize),
}

impl fmt::Display for EditorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entering => write!(f, "entering a new semester"),
            Self::Editing(index) => write!(f, "editing semester {index}"),
        }
    }
}

/// Subject rows under construction plus the editor state
#[derive(Debug, Clone, PartialEq)]
pub struct SemesterEditor {
    mode: EditorMode,
    rows: Vec<Subject>,
    max_credits: f64,
}

impl Default for SemesterEditor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CREDITS)
    }
}

impl SemesterEditor {
    /// Fresh editor with one empty row and the given credit cap
    #[must_use]
    pub fn new(max_credits: f64) -> Self {
        Self {
            mode: EditorMode::Entering,
            rows: vec![Subject::default()],
            max_credits,
        }
    }

    /// Current state
    #[must_use]
    pub const fn mode(&self) -> EditorMode {
        self.mode
    }

    /// Rows as currently entered
    #[must_use]
    pub fn rows(&self) -> &[Subject] {
        &self.rows
    }

    /// Per-subject credit cap
    #[must_use]
    pub const fn max_credits(&self) -> f64 {
        self.max_credits
    }

    /// Live SGPA of the rows being entered
    #[must_use]
    pub fn current_sgpa(&self) -> f64 {
        compute_sgpa(&self.rows)
    }

    /// Live credit total of the rows being entered
    #[must_use]
    pub fn current_credits(&self) -> f64 {
        total_credits(&self.rows)
    }

    /// Append an empty row
    pub fn add_row(&mut self) {
        self.rows.push(Subject::default());
    }

    /// Remove a row; the last remaining row is never removed
    ///
    /// # Errors
    /// Returns [`GradeError::RowNotFound`] for an out-of-range row.
    pub fn remove_row(&mut self, row: usize) -> Result<(), GradeError> {
        if row >= self.rows.len() {
            return Err(GradeError::RowNotFound { row });
        }
        if self.rows.len() > 1 {
            self.rows.remove(row);
        }
        Ok(())
    }

    /// Overwrite a row after checking its credits against the cap
    ///
    /// # Errors
    /// Returns [`GradeError::RowNotFound`] for an out-of-range row or
    /// [`GradeError::InvalidCredits`] for negative, non-finite or over-cap credits.
    pub fn set_row(&mut self, row: usize, subject: Subject) -> Result<(), GradeError> {
        self.check_credits(&subject)?;
        let slot = self
            .rows
            .get_mut(row)
            .ok_or(GradeError::RowNotFound { row })?;
        *slot = subject;
        Ok(())
    }

    /// Replace every row at once (validated like [`set_row`](Self::set_row))
    ///
    /// # Errors
    /// Returns [`GradeError::InvalidCredits`] if any row fails validation; the
    /// current rows are kept in that case.
    pub fn set_rows(&mut self, rows: Vec<Subject>) -> Result<(), GradeError> {
        for subject in &rows {
            self.check_credits(subject)?;
        }
        self.rows = if rows.is_empty() {
            vec![Subject::default()]
        } else {
            rows
        };
        Ok(())
    }

    /// Load semester `index` for editing
    ///
    /// # Errors
    /// Returns [`GradeError::SemesterNotFound`] for an unknown ordinal.
    pub fn begin_edit(&mut self, store: &SemesterStore, index: usize) -> Result<(), GradeError> {
        let semester = store.get(index).ok_or(GradeError::SemesterNotFound {
            index,
            count: store.len(),
        })?;
        self.rows = if semester.subjects.is_empty() {
            vec![Subject::default()]
        } else {
            semester.subjects.clone()
        };
        self.mode = EditorMode::Editing(index);
        Ok(())
    }

    /// Append the rows as a new semester (only while entering)
    ///
    /// # Errors
    /// Returns [`GradeError::InvalidTransition`] while editing, or
    /// [`GradeError::NoCredits`] when the rows carry no credits (rows are kept).
    pub fn complete(&mut self, store: &mut SemesterStore) -> Result<Semester, GradeError> {
        if let EditorMode::Editing(_) = self.mode {
            return Err(self.invalid("complete a new semester"));
        }
        let semester = store.add_semester(self.rows.clone())?.clone();
        self.reset();
        Ok(semester)
    }

    /// Write the rows back to the semester being edited
    ///
    /// # Errors
    /// Returns [`GradeError::InvalidTransition`] when not editing, or the
    /// store's validation error (rows and state are kept).
    pub fn save(&mut self, store: &mut SemesterStore) -> Result<Semester, GradeError> {
        let EditorMode::Editing(index) = self.mode else {
            return Err(self.invalid("save changes"));
        };
        let semester = store.edit_semester(index, self.rows.clone())?.clone();
        self.reset();
        Ok(semester)
    }

    /// Discard the edit in progress
    ///
    /// # Errors
    /// Returns [`GradeError::InvalidTransition`] when not editing.
    pub fn cancel(&mut self) -> Result<(), GradeError> {
        if self.mode == EditorMode::Entering {
            return Err(self.invalid("cancel an edit"));
        }
        self.reset();
        Ok(())
    }

    fn reset(&mut self) {
        self.mode = EditorMode::Entering;
        self.rows = vec![Subject::default()];
    }

    fn invalid(&self, action: &'static str) -> GradeError {
        GradeError::InvalidTransition {
            action,
            state: self.mode.to_string(),
        }
    }

    fn check_credits(&self, subject: &Subject) -> Result<(), GradeError> {
        match subject.credits {
            Some(c) if !c.is_finite() || c < 0.0 || c > self.max_credits => {
                Err(GradeError::InvalidCredits {
                    subject: subject.name.clone(),
                    value: c.to_string(),
                    max: self.max_credits.to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}
