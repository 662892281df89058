//! Integration tests for the grade calculator: aggregation, persistence and editing

use tempfile::TempDir;
use wiz_scholar::core::aggregator::{
    compute_cgpa, compute_sgpa, required_future_sgpa, round_to, Standing, CGPA_DECIMALS,
};
use wiz_scholar::core::editor::{EditorMode, SemesterEditor};
use wiz_scholar::core::models::{grade_points, Semester, Subject};
use wiz_scholar::core::storage::{FileStorage, LocalStorage, MemoryStorage};
use wiz_scholar::core::store::{GradeError, SemesterStore, STORE_KEY};

const EPS: f64 = 1e-9;

fn graded(rows: &[(&str, f64, &str)]) -> Vec<Subject> {
    rows.iter()
        .map(|(name, credits, grade)| Subject::new(*name, *credits, *grade))
        .collect()
}

#[test]
fn test_sgpa_worked_example() {
    // (4*10 + 3*8 + 3*7) / 10 = 8.5
    let subjects = graded(&[("Maths", 4.0, "O"), ("Physics", 3.0, "A"), ("Lab", 3.0, "B+")]);
    assert!((compute_sgpa(&subjects) - 8.5).abs() < EPS);
}

#[test]
fn test_sgpa_skips_ungraded_rows() {
    let mut subjects = graded(&[("Maths", 4.0, "A")]);
    subjects.push(Subject {
        name: "Pending".to_string(),
        credits: Some(3.0),
        grade: None,
    });
    assert!((compute_sgpa(&subjects) - 8.0).abs() < EPS);

    // Ungraded credits still count towards the semester total
    let semester = Semester::new(1, subjects);
    assert!((semester.credits - 7.0).abs() < EPS);
}

#[test]
fn test_sgpa_is_bounded_by_grade_range() {
    let subjects = graded(&[("A", 2.0, "O"), ("B", 5.0, "F"), ("C", 1.5, "C")]);
    let sgpa = compute_sgpa(&subjects);
    assert!((0.0..=10.0).contains(&sgpa));
    assert!(compute_sgpa(&[]).abs() < EPS);
}

#[test]
fn test_numeric_and_unknown_grades() {
    assert!((grade_points("7.5") - 7.5).abs() < EPS);
    assert!(grade_points("a+").abs() < EPS, "letters are case-sensitive");
    assert!(grade_points("Excellent").abs() < EPS);

    let subjects = graded(&[("Maths", 4.0, "9.5"), ("Essay", 4.0, "??")]);
    assert!((compute_sgpa(&subjects) - 4.75).abs() < EPS);
}

#[test]
fn test_cgpa_uses_cached_sgpa() {
    // 1/3 SGPA rounds to 0.333 when cached
    let first = Semester::new(1, graded(&[("X", 3.0, "1"), ("Y", 6.0, "0")]));
    assert!((first.sgpa - 0.333).abs() < EPS);

    let second = Semester::new(2, graded(&[("Z", 1.0, "O")]));
    let cgpa = compute_cgpa(&[first, second]);
    assert!((cgpa - (0.333 * 9.0 + 10.0) / 10.0).abs() < EPS);
    assert!((round_to(cgpa, CGPA_DECIMALS) - 1.2997).abs() < EPS);
}

#[test]
fn test_cgpa_is_order_independent() {
    let a = Semester::new(1, graded(&[("A", 4.0, "A")]));
    let b = Semester::new(2, graded(&[("B", 2.0, "B+")]));
    let c = Semester::new(3, graded(&[("C", 3.0, "O")]));
    let forward = compute_cgpa(&[a.clone(), b.clone(), c.clone()]);
    let backward = compute_cgpa(&[c, b, a]);
    assert!((forward - backward).abs() < EPS);
}

#[test]
fn test_target_solver() {
    let semesters = vec![Semester::new(1, graded(&[("A", 20.0, "A")]))];

    // (9 * 40 - 160) / 20 = 10
    let projection = required_future_sgpa(&semesters, 9.0, 1).expect("valid target");
    assert!((projection.required_sgpa - 10.0).abs() < EPS);
    assert!(projection.achievable);
    assert!((projection.projected_future_credits - 20.0).abs() < EPS);

    let out_of_reach = required_future_sgpa(&semesters, 9.5, 1).expect("valid target");
    assert!((out_of_reach.required_sgpa - 10.0).abs() < EPS);
    assert!(!out_of_reach.achievable);

    let already_there = required_future_sgpa(&semesters, 1.0, 3).expect("valid target");
    assert!(already_there.required_sgpa.abs() < EPS);
    assert!(!already_there.achievable);

    assert!(required_future_sgpa(&semesters, 10.5, 1).is_none());
    assert!(required_future_sgpa(&semesters, 8.0, 0).is_none());
    assert!(required_future_sgpa(&[], 8.0, 1).is_none());
}

#[test]
fn test_standing_bands() {
    assert_eq!(Standing::from_gpa(9.0), Standing::Outstanding);
    assert_eq!(Standing::from_gpa(8.999), Standing::Good);
    assert_eq!(Standing::from_gpa(7.0), Standing::Average);
    assert_eq!(Standing::from_gpa(6.5), Standing::BelowAverage);
    assert_eq!(Standing::from_gpa(5.0), Standing::Pass);
    assert_eq!(Standing::from_gpa(4.99), Standing::Fail);
    assert_eq!(Standing::Fail.label(), "Fail/Backlog");
}

#[test]
fn test_store_round_trips_through_file_storage() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let storage = FileStorage::in_dir(dir.path());

    let mut store = SemesterStore::new();
    store
        .add_semester(graded(&[("Maths", 4.0, "A"), ("Physics", 3.0, "O")]))
        .unwrap();
    store.add_semester(graded(&[("Chem", 3.0, "B")])).unwrap();
    store.save(&storage).expect("save");

    assert!(storage.path().exists());
    let reloaded = SemesterStore::load_or_empty(&FileStorage::in_dir(dir.path())).expect("load");
    assert_eq!(reloaded, store);
    assert!((reloaded.cgpa() - store.cgpa()).abs() < EPS);
}

#[test]
fn test_load_missing_key_is_empty() {
    let storage = MemoryStorage::new();
    let store = SemesterStore::load_or_empty(&storage).expect("load");
    assert!(store.is_empty());
    assert!(store.cgpa().abs() < EPS);
}

#[test]
fn test_load_legacy_snapshot() {
    let storage = MemoryStorage::new();
    storage
        .set_item(
            STORE_KEY,
            r#"{"semesterResults":[{"semester":4,"subjects":[{"name":"Maths","credits":"4","grade":"A"}],"sgpa":"8.000","credits":4}]}"#,
        )
        .unwrap();

    let store = SemesterStore::load_or_empty(&storage).expect("legacy load");
    assert_eq!(store.len(), 1);
    let semester = store.get(1).expect("renumbered to 1");
    assert_eq!(semester.semester, 1);
    assert!((semester.sgpa - 8.0).abs() < EPS);
    assert_eq!(semester.subjects[0].credits, Some(4.0));
    assert!((store.cgpa() - 8.0).abs() < EPS);
}

#[test]
fn test_load_rejects_corrupt_snapshot() {
    let storage = MemoryStorage::new();
    storage.set_item(STORE_KEY, "{not json").unwrap();
    assert!(SemesterStore::load_or_empty(&storage).is_err());
}

#[test]
fn test_saving_empty_store_removes_key() {
    let storage = MemoryStorage::new();
    let mut store = SemesterStore::new();
    store.add_semester(graded(&[("Maths", 4.0, "A")])).unwrap();
    store.save(&storage).unwrap();
    assert!(storage.get_item(STORE_KEY).unwrap().is_some());

    store.remove_semester(1).unwrap();
    store.save(&storage).unwrap();
    assert!(storage.get_item(STORE_KEY).unwrap().is_none());
}

#[test]
fn test_remove_renumbers_and_recomputes() {
    let mut store = SemesterStore::new();
    store.add_semester(graded(&[("A", 4.0, "O")])).unwrap();
    store.add_semester(graded(&[("B", 4.0, "F")])).unwrap();
    store.add_semester(graded(&[("C", 4.0, "A")])).unwrap();

    let removed = store.remove_semester(2).unwrap();
    assert_eq!(removed.semester, 2);
    let ordinals: Vec<usize> = store.semesters().iter().map(|s| s.semester).collect();
    assert_eq!(ordinals, vec![1, 2]);
    assert!((store.cgpa() - 9.0).abs() < EPS);

    assert_eq!(
        store.remove_semester(5).unwrap_err(),
        GradeError::SemesterNotFound { index: 5, count: 2 }
    );
}

#[test]
fn test_target_on_empty_store_is_an_error() {
    let store = SemesterStore::new();
    assert!(matches!(
        store.required_future_sgpa(8.0, 2),
        Err(GradeError::InvalidTarget(_))
    ));
}

#[test]
fn test_editor_complete_then_edit_flow() {
    let mut store = SemesterStore::new();
    let mut editor = SemesterEditor::default();

    editor.set_row(0, Subject::new("Maths", 4.0, "A")).unwrap();
    editor.add_row();
    editor.set_row(1, Subject::new("Physics", 3.0, "O")).unwrap();
    assert!((editor.current_credits() - 7.0).abs() < EPS);

    let first = editor.complete(&mut store).unwrap();
    assert_eq!(first.semester, 1);
    assert_eq!(editor.mode(), EditorMode::Entering);
    assert_eq!(editor.rows().len(), 1);

    editor.begin_edit(&store, 1).unwrap();
    assert_eq!(editor.mode(), EditorMode::Editing(1));
    assert_eq!(editor.rows().len(), 2);
    assert!(matches!(
        editor.complete(&mut store),
        Err(GradeError::InvalidTransition { .. })
    ));

    editor.set_row(1, Subject::new("Physics", 3.0, "F")).unwrap();
    let saved = editor.save(&mut store).unwrap();
    assert_eq!(saved.semester, 1);
    assert_eq!(store.len(), 1);
    assert!((store.cgpa() - round_to(32.0 / 7.0, 3)).abs() < EPS);
    assert_eq!(editor.mode(), EditorMode::Entering);
}

#[test]
fn test_editor_rejects_credits_over_cap() {
    let mut editor = SemesterEditor::new(6.0);
    let err = editor
        .set_row(0, Subject::new("Project", 12.0, "A"))
        .unwrap_err();
    assert!(matches!(err, GradeError::InvalidCredits { .. }));
    assert!(editor
        .set_row(0, Subject::new("Project", -1.0, "A"))
        .is_err());
    assert!(editor.set_row(0, Subject::new("Project", 6.0, "A")).is_ok());
}
