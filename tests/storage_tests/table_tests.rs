//! Tests for Table
//!
//! These tests verify:
//! - Creation with a header-only body
//! - Header validation on open
//! - append / find / exists / rewrite semantics
//! - Rewrite leaves the header intact and no temporary file behind

use std::fs;
use std::path::PathBuf;

use gradebook::storage::{Grade, Rewrite, Student, Table};
use gradebook::GradebookError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_path(name: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(name);
    (temp_dir, path)
}

fn grade_table_with(rows: &[(&str, &str, f64)]) -> (TempDir, Table<Grade>) {
    let (temp, path) = setup_temp_path("calificaciones.csv");
    let table = Table::<Grade>::open(&path).unwrap();
    for (id, subject, score) in rows {
        table.append(&Grade::new(*id, *subject, *score)).unwrap();
    }
    (temp, table)
}

// =============================================================================
// Open Tests
// =============================================================================

#[test]
fn test_open_creates_header_only_file() {
    let (_temp, path) = setup_temp_path("estudiantes.csv");

    let table = Table::<Student>::open(&path).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "ID_Estudiante,Nombre\n");
    assert!(table.load().unwrap().is_empty());
}

#[test]
fn test_open_grade_table_header() {
    let (_temp, path) = setup_temp_path("calificaciones.csv");

    Table::<Grade>::open(&path).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "ID_Estudiante,Materia,Calificación\n"
    );
}

#[test]
fn test_open_empty_file_writes_header() {
    let (_temp, path) = setup_temp_path("estudiantes.csv");
    fs::write(&path, "").unwrap();

    Table::<Student>::open(&path).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "ID_Estudiante,Nombre\n");
}

#[test]
fn test_open_existing_rows_are_kept() {
    let (_temp, path) = setup_temp_path("estudiantes.csv");
    fs::write(&path, "ID_Estudiante,Nombre\nS1,Ana\nS2,Luis\n").unwrap();

    let table = Table::<Student>::open(&path).unwrap();

    assert_eq!(
        table.load().unwrap(),
        vec![Student::new("S1", "Ana"), Student::new("S2", "Luis")]
    );
}

#[test]
fn test_open_rejects_wrong_header() {
    let (_temp, path) = setup_temp_path("estudiantes.csv");
    fs::write(&path, "id,name\nS1,Ana\n").unwrap();

    let result = Table::<Student>::open(&path);

    assert!(matches!(result, Err(GradebookError::Storage(_))));
}

#[test]
fn test_open_rejects_corrupt_score() {
    let (_temp, path) = setup_temp_path("calificaciones.csv");
    fs::write(
        &path,
        "ID_Estudiante,Materia,Calificación\nS1,MAT101,quince\n",
    )
    .unwrap();

    match Table::<Grade>::open(&path) {
        Err(GradebookError::Storage(msg)) => assert!(msg.contains("row 2")),
        other => panic!("Expected storage error, got {:?}", other.map(|_| ())),
    }
}

// =============================================================================
// Append / Find / Exists Tests
// =============================================================================

#[test]
fn test_append_then_load_preserves_order() {
    let (_temp, table) = grade_table_with(&[
        ("S1", "MAT101", 15.5),
        ("S2", "FIS101", 12.0),
        ("S1", "QUI101", 20.0),
    ]);

    let rows = table.load().unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], Grade::new("S1", "MAT101", 15.5));
    assert_eq!(rows[2], Grade::new("S1", "QUI101", 20.0));
}

#[test]
fn test_scores_are_stored_with_decimal() {
    let (_temp, table) = grade_table_with(&[("S1", "MAT101", 15.0), ("S1", "FIS101", 15.5)]);

    let content = fs::read_to_string(table.path()).unwrap();

    assert!(content.contains("S1,MAT101,15.0\n"));
    assert!(content.contains("S1,FIS101,15.5\n"));
}

#[test]
fn test_append_after_missing_final_newline() {
    let (_temp, path) = setup_temp_path("estudiantes.csv");
    fs::write(&path, "ID_Estudiante,Nombre\nS1,Ana").unwrap();
    let table = Table::<Student>::open(&path).unwrap();

    table.append(&Student::new("S2", "Luis")).unwrap();

    assert_eq!(table.load().unwrap().len(), 2);
}

#[test]
fn test_names_with_commas_round_trip() {
    let (_temp, path) = setup_temp_path("estudiantes.csv");
    let table = Table::<Student>::open(&path).unwrap();

    table.append(&Student::new("S1", "Pérez, Ana")).unwrap();

    assert_eq!(table.load().unwrap()[0].name, "Pérez, Ana");
}

#[test]
fn test_find_returns_empty_when_nothing_matches() {
    let (_temp, table) = grade_table_with(&[("S1", "MAT101", 15.5)]);

    let rows = table.find(|g| g.student_id == "S9").unwrap();

    assert!(rows.is_empty());
}

#[test]
fn test_find_filters_rows() {
    let (_temp, table) = grade_table_with(&[
        ("S1", "MAT101", 15.5),
        ("S2", "MAT101", 11.0),
        ("S1", "FIS101", 9.0),
    ]);

    let rows = table.find(|g| g.student_id == "S1").unwrap();

    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|g| g.student_id == "S1"));
}

#[test]
fn test_exists_by_primary_key() {
    let (_temp, path) = setup_temp_path("estudiantes.csv");
    let table = Table::<Student>::open(&path).unwrap();
    table.append(&Student::new("S1", "Ana")).unwrap();

    assert!(table.exists("S1").unwrap());
    assert!(!table.exists("S2").unwrap());
}

// =============================================================================
// Rewrite Tests
// =============================================================================

#[test]
fn test_rewrite_update_in_place() {
    let (_temp, table) = grade_table_with(&[("S1", "MAT101", 15.5), ("S2", "MAT101", 11.0)]);

    let bump = |g: &mut Grade| g.score = 18.0;
    let matched = table
        .rewrite(|g| g.student_id == "S2", Rewrite::Update(&bump))
        .unwrap();

    assert_eq!(matched, 1);
    let rows = table.load().unwrap();
    assert_eq!(rows[0], Grade::new("S1", "MAT101", 15.5));
    assert_eq!(rows[1], Grade::new("S2", "MAT101", 18.0));
}

#[test]
fn test_rewrite_delete() {
    let (_temp, table) = grade_table_with(&[
        ("S1", "MAT101", 15.5),
        ("S2", "MAT101", 11.0),
        ("S1", "FIS101", 9.0),
    ]);

    let matched = table
        .rewrite(|g| g.student_id == "S1", Rewrite::Delete)
        .unwrap();

    assert_eq!(matched, 2);
    assert_eq!(table.load().unwrap(), vec![Grade::new("S2", "MAT101", 11.0)]);
}

#[test]
fn test_rewrite_no_match_leaves_file_untouched() {
    let (_temp, table) = grade_table_with(&[("S1", "MAT101", 15.5)]);
    let before = fs::read(table.path()).unwrap();

    let matched = table
        .rewrite(|g| g.student_id == "S9", Rewrite::Delete)
        .unwrap();

    assert_eq!(matched, 0);
    assert_eq!(fs::read(table.path()).unwrap(), before);
}

#[test]
fn test_rewrite_keeps_header_and_cleans_temp_file() {
    let (temp, table) = grade_table_with(&[("S1", "MAT101", 15.5)]);

    table
        .rewrite(|g| g.student_id == "S1", Rewrite::Delete)
        .unwrap();

    assert_eq!(
        fs::read_to_string(table.path()).unwrap(),
        "ID_Estudiante,Materia,Calificación\n"
    );
    let leftovers: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[cfg(target_os = "linux")]
#[test]
fn test_failed_write_removes_temp_file() {
    let (temp, _) = setup_temp_path("unused");
    // The temp file is created fine; renaming a file onto "name/" fails
    let path = temp.path().join("calificaciones.csv/");

    let result = Table::<Grade>::open(&path);

    assert!(matches!(result, Err(GradebookError::Io(_))));
    let entries: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    assert!(entries.is_empty(), "left behind: {:?}", entries);
}
