//! Semester command handlers
//!
//! Semesters live in `local_storage.json` under the configured data
//! directory. Rows are given as `NAME:CREDITS:GRADE`; the name may itself
//! contain colons.

use crate::args::SemesterSubcommand;
use wiz_scholar::config::Config;
use wiz_scholar::core::aggregator::{round_to, Standing, CGPA_DECIMALS};
use wiz_scholar::core::editor::SemesterEditor;
use wiz_scholar::core::models::{GradeValue, Semester, Subject};
use wiz_scholar::core::storage::FileStorage;
use wiz_scholar::core::store::SemesterStore;
use wiz_scholar::{debug, info, verbose, warn};

/// Dispatch semester subcommands
pub fn run(subcommand: SemesterSubcommand, config: &Config) {
    let storage = FileStorage::in_dir(&config.data_dir());
    let mut store = load_store(&storage);

    match subcommand {
        SemesterSubcommand::Add { subjects } => {
            let rows = parse_rows(&subjects);
            let mut editor = SemesterEditor::new(config.calculator.max_credits);
            let semester = editor
                .set_rows(rows)
                .and_then(|()| editor.complete(&mut store))
                .unwrap_or_else(|e| super::fail(e));
            save_store(&store, &storage);
            info!("Added semester {}", semester.semester);
            println!("✓ Semester {} added", semester.semester);
            print_semester_line(&semester);
            print_cgpa_line(&store);
        }
        SemesterSubcommand::Edit { index, subjects } => {
            let rows = parse_rows(&subjects);
            let mut editor = SemesterEditor::new(config.calculator.max_credits);
            let semester = editor
                .begin_edit(&store, index)
                .and_then(|()| editor.set_rows(rows))
                .and_then(|()| editor.save(&mut store))
                .unwrap_or_else(|e| super::fail(e));
            save_store(&store, &storage);
            info!("Edited semester {index}");
            println!("✓ Semester {index} updated");
            print_semester_line(&semester);
            print_cgpa_line(&store);
        }
        SemesterSubcommand::Remove { index } => {
            store
                .remove_semester(index)
                .unwrap_or_else(|e| super::fail(e));
            save_store(&store, &storage);
            info!("Removed semester {index}");
            println!("✓ Semester {index} removed");
            print_cgpa_line(&store);
        }
        SemesterSubcommand::List => {
            if store.is_empty() {
                println!("No semesters recorded yet.");
                return;
            }
            for semester in store.semesters() {
                print_semester_line(semester);
            }
            print_cgpa_line(&store);
        }
        SemesterSubcommand::Show { index } => {
            let semester = store.get(index).unwrap_or_else(|| {
                super::fail(format!(
                    "Semester {index} does not exist (have {})",
                    store.len()
                ))
            });
            print_semester_line(semester);
            for subject in &semester.subjects {
                println!("  {}", format_subject(subject));
            }
        }
        SemesterSubcommand::Clear { yes } => {
            if store.is_empty() {
                println!("✓ No semesters to clear");
                return;
            }
            if !yes && !super::confirm("Delete every recorded semester?") {
                println!("✗ Clear cancelled");
                return;
            }
            SemesterStore::clear(&storage).unwrap_or_else(|e| super::fail(e));
            info!("Cleared {} semesters", store.len());
            println!("✓ All semesters cleared");
        }
    }
}

/// Handle the `cgpa` command
pub fn print_cgpa(config: &Config) {
    let storage = FileStorage::in_dir(&config.data_dir());
    let store = load_store(&storage);
    if store.is_empty() {
        println!("No semesters recorded yet.");
        return;
    }
    print_cgpa_line(&store);
}

/// Load the store, exiting on unreadable storage
pub fn load_store(storage: &FileStorage) -> SemesterStore {
    debug!("Loading semesters from {}", storage.path().display());
    SemesterStore::load_or_empty(storage).unwrap_or_else(|e| {
        super::fail(format!(
            "Failed to load semesters from {}: {e}",
            storage.path().display()
        ))
    })
}

fn save_store(store: &SemesterStore, storage: &FileStorage) {
    if let Err(e) = store.save(storage) {
        super::fail(format!(
            "Failed to save semesters to {}: {e}",
            storage.path().display()
        ));
    }
    verbose!("Saved {} semesters to {}", store.len(), storage.path().display());
}

fn parse_rows(rows: &[String]) -> Vec<Subject> {
    rows.iter()
        .map(|row| parse_subject(row).unwrap_or_else(|e| super::fail(e)))
        .inspect(warn_on_degraded_grade)
        .collect()
}

/// Parse one `NAME:CREDITS:GRADE` row
///
/// Splits from the right so names may contain colons. An empty CREDITS or
/// GRADE leaves that field unset.
///
/// # Errors
/// Returns a message when the row has fewer than three fields or CREDITS is
/// not a number.
pub fn parse_subject(row: &str) -> Result<Subject, String> {
    let mut parts = row.rsplitn(3, ':');
    let (Some(grade), Some(credits), Some(name)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(format!(
            "Invalid subject '{row}': expected NAME:CREDITS:GRADE"
        ));
    };

    let credits = match credits.trim() {
        "" => None,
        raw => Some(
            raw.parse::<f64>()
                .map_err(|_| format!("Invalid credits '{raw}' for subject '{}'", name.trim()))?,
        ),
    };
    let grade = Some(grade.trim().to_string()).filter(|g| !g.is_empty());

    Ok(Subject {
        name: name.trim().to_string(),
        credits,
        grade,
    })
}

fn warn_on_degraded_grade(subject: &Subject) {
    if let Some(grade) = subject.grade.as_deref() {
        if GradeValue::parse_strict(grade).is_err() {
            warn!(
                "Unrecognized grade '{grade}' for '{}' counts as 0 grade points",
                subject.name
            );
        }
    }
}

fn print_semester_line(semester: &Semester) {
    println!(
        "Semester {}: SGPA {:.3} over {} credits ({})",
        semester.semester,
        semester.sgpa,
        semester.credits,
        Standing::from_gpa(semester.sgpa).label()
    );
}

fn print_cgpa_line(store: &SemesterStore) {
    let cgpa = round_to(store.cgpa(), CGPA_DECIMALS);
    println!(
        "CGPA: {cgpa:.4} over {} credits in {} semesters ({})",
        store.total_credits(),
        store.len(),
        Standing::from_gpa(cgpa).label()
    );
}

fn format_subject(subject: &Subject) -> String {
    let name = if subject.name.is_empty() {
        "Untitled"
    } else {
        subject.name.as_str()
    };
    let credits = subject
        .credits
        .map_or_else(|| "-".to_string(), |c| c.to_string());
    let grade = subject.grade.as_deref().unwrap_or("-");
    format!("{name}: {credits} credits, grade {grade}")
}
