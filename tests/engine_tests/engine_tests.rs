//! Tests for Engine
//!
//! These tests verify:
//! - Every opcode's business rules
//! - Score validation bounds
//! - Directory failures surfacing as errors without writes
//! - Concurrent dispatch against one engine

#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;
use std::thread;

use common::{DownDirectory, MemoryDirectory};
use gradebook::config::Config;
use gradebook::engine::{parse_score, Engine};
use gradebook::protocol::{Response, Status};
use gradebook::storage::Grade;
use gradebook::GradebookError;
use serde_json::json;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_engine() -> (TempDir, Engine, MemoryDirectory) {
    let temp_dir = TempDir::new().unwrap();
    let directory = MemoryDirectory::with(&[("MAT101", "Matematicas"), ("FIS101", "Fisica")]);
    let config = Config::builder().data_dir(temp_dir.path()).build();
    let engine = Engine::with_directory(config, directory.clone()).unwrap();
    (temp_dir, engine, directory)
}

fn setup_with_student() -> (TempDir, Engine, MemoryDirectory) {
    let (temp, engine, directory) = setup_temp_engine();
    assert!(engine.handle_request("AGREGAR_ESTUDIANTE|S1|Ana").is_ok());
    (temp, engine, directory)
}

fn message(response: &Response) -> String {
    response.message().unwrap_or_default().to_string()
}

// =============================================================================
// Score Validation Tests
// =============================================================================

#[test]
fn test_parse_score_bounds() {
    assert_eq!(parse_score("0").unwrap(), 0.0);
    assert_eq!(parse_score("20").unwrap(), 20.0);
    assert_eq!(parse_score(" 15.5 ").unwrap(), 15.5);

    for raw in ["-0.01", "20.01", "inf", "-inf", "100"] {
        match parse_score(raw) {
            Err(GradebookError::Validation(msg)) => assert!(msg.contains("out of range"), "{}", msg),
            other => panic!("Expected out of range for {}, got {:?}", raw, other),
        }
    }

    for raw in ["abc", "", "NaN", "1,5"] {
        match parse_score(raw) {
            Err(GradebookError::Validation(msg)) => assert!(msg.contains("not numeric"), "{}", msg),
            other => panic!("Expected not numeric for {:?}, got {:?}", raw, other),
        }
    }
}

#[test]
fn test_add_grade_boundary_scores() {
    let (_temp, engine, _dir) = setup_with_student();

    assert!(engine.handle_request("AGREGAR|S1|MAT101|0").is_ok());
    assert!(engine.handle_request("AGREGAR|S1|FIS101|20").is_ok());

    let low = engine.handle_request("ACTUALIZAR|S1|MAT101|-0.01");
    let high = engine.handle_request("ACTUALIZAR|S1|MAT101|20.01");
    assert_eq!(low.status(), Status::Error);
    assert_eq!(high.status(), Status::Error);
    assert!(message(&high).contains("out of range"));
}

#[test]
fn test_add_grade_rejects_out_of_range_without_write() {
    let (_temp, engine, directory) = setup_with_student();

    let response = engine.handle_request("AGREGAR|S1|MAT101|20.01");

    assert_eq!(response.status(), Status::Error);
    assert!(message(&response).contains("out of range"));
    assert!(engine.list_grades().unwrap().is_empty());
    // Bad scores are rejected before asking the directory
    assert_eq!(directory.lookup_count(), 0);
}

#[test]
fn test_add_grade_rejects_non_numeric() {
    let (_temp, engine, _dir) = setup_with_student();

    let response = engine.handle_request("AGREGAR|S1|MAT101|quince");

    assert_eq!(response.status(), Status::Error);
    assert!(message(&response).contains("not numeric"));
}

// =============================================================================
// Register Student Tests
// =============================================================================

#[test]
fn test_register_twice() {
    let (_temp, engine, _dir) = setup_temp_engine();

    let first = engine.handle_request("AGREGAR_ESTUDIANTE|S1|Ana");
    let second = engine.handle_request("AGREGAR_ESTUDIANTE|S1|Ana");

    assert_eq!(first.status(), Status::Ok);
    assert_eq!(second.status(), Status::Error);
    assert!(message(&second).contains("already registered"));
    assert_eq!(engine.storage().list_students().unwrap().len(), 1);
}

// =============================================================================
// Add Grade Tests
// =============================================================================

#[test]
fn test_add_grade_unregistered_student() {
    let (_temp, engine, directory) = setup_temp_engine();

    let valid_subject = engine.handle_request("AGREGAR|S9|MAT101|15");
    let invalid_subject = engine.handle_request("AGREGAR|S9|XYZ999|15");

    assert_eq!(valid_subject.status(), Status::Error);
    assert_eq!(invalid_subject.status(), Status::Error);
    assert!(message(&valid_subject).contains("not registered"));
    assert_eq!(directory.lookup_count(), 0);
}

#[test]
fn test_add_grade_unknown_subject_persists_nothing() {
    let (_temp, engine, _dir) = setup_with_student();

    let response = engine.handle_request("AGREGAR|S1|XYZ999|15");

    assert_eq!(response.status(), Status::Error);
    assert_eq!(message(&response), "unknown subject XYZ999: NRC no encontrado");

    let listed = engine.handle_request("LISTAR");
    assert_eq!(listed, Response::ok_data(json!([])));
}

#[test]
fn test_add_grade_directory_down() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder().data_dir(temp_dir.path()).build();
    let engine = Engine::with_directory(config, DownDirectory).unwrap();
    engine.register_student("S1", "Ana").unwrap();

    let response = engine.handle_request("AGREGAR|S1|MAT101|15");

    assert_eq!(response.status(), Status::Error);
    assert!(message(&response).contains("subject directory unavailable"));
    assert!(message(&response).contains("timeout"));
    assert!(engine.list_grades().unwrap().is_empty());
}

#[test]
fn test_add_grade_normalizes_subject() {
    let (_temp, engine, _dir) = setup_with_student();

    let response = engine.handle_request("AGREGAR|S1| mat101 |15.5");

    assert!(response.is_ok());
    assert_eq!(
        engine.list_grades().unwrap(),
        vec![Grade::new("S1", "MAT101", 15.5)]
    );
}

#[test]
fn test_add_grade_twice_same_subject() {
    let (_temp, engine, _dir) = setup_with_student();

    assert!(engine.handle_request("AGREGAR|S1|MAT101|15").is_ok());
    let second = engine.handle_request("AGREGAR|S1|MAT101|18");

    assert_eq!(second.status(), Status::Error);
    assert!(message(&second).contains("ACTUALIZAR"));
    assert_eq!(engine.list_grades().unwrap()[0].score, 15.0);
}

// =============================================================================
// Find Tests
// =============================================================================

#[test]
fn test_round_trip_find() {
    let (_temp, engine, _dir) = setup_with_student();
    assert!(engine.handle_request("AGREGAR|S1|MAT101|15.5").is_ok());

    let response = engine.handle_request("BUSCAR|S1");

    assert_eq!(
        response,
        Response::ok_data(json!([
            {"ID_Estudiante": "S1", "Materia": "MAT101", "Calificación": 15.5}
        ]))
    );
}

#[test]
fn test_find_unregistered_student() {
    let (_temp, engine, _dir) = setup_temp_engine();

    let response = engine.handle_request("BUSCAR|S9");

    assert_eq!(response.status(), Status::Error);
}

#[test]
fn test_find_student_without_grades() {
    let (_temp, engine, _dir) = setup_with_student();

    let response = engine.handle_request("BUSCAR|S1");

    assert_eq!(response.status(), Status::NotFound);
}

// =============================================================================
// Update Tests
// =============================================================================

#[test]
fn test_update_by_subject() {
    let (_temp, engine, _dir) = setup_with_student();
    engine.handle_request("AGREGAR|S1|MAT101|10");
    engine.handle_request("AGREGAR|S1|FIS101|11");

    let response = engine.handle_request("ACTUALIZAR|S1|mat101|18.5");

    assert!(response.is_ok());
    assert_eq!(
        engine.list_grades().unwrap(),
        vec![
            Grade::new("S1", "MAT101", 18.5),
            Grade::new("S1", "FIS101", 11.0),
        ]
    );
}

#[test]
fn test_update_all_of_student() {
    let (_temp, engine, _dir) = setup_with_student();
    engine.handle_request("AGREGAR|S1|MAT101|10");
    engine.handle_request("AGREGAR|S1|FIS101|11");

    let response = engine.handle_request("ACTUALIZAR|S1|14");

    assert!(response.is_ok());
    assert!(engine.list_grades().unwrap().iter().all(|g| g.score == 14.0));
}

#[test]
fn test_update_missing_key_leaves_table_unchanged() {
    let (_temp, engine, _dir) = setup_with_student();
    engine.handle_request("AGREGAR|S1|MAT101|10");
    let before = std::fs::read(engine.storage().grades_path()).unwrap();

    let response = engine.handle_request("ACTUALIZAR|S1|FIS101|12");

    assert_eq!(response.status(), Status::NotFound);
    assert_eq!(std::fs::read(engine.storage().grades_path()).unwrap(), before);
}

#[test]
fn test_update_unregistered_student() {
    let (_temp, engine, _dir) = setup_temp_engine();

    let response = engine.handle_request("ACTUALIZAR|S9|MAT101|12");

    assert_eq!(response.status(), Status::Error);
}

// =============================================================================
// List / Delete Tests
// =============================================================================

#[test]
fn test_list_empty_is_ok() {
    let (_temp, engine, _dir) = setup_temp_engine();

    assert_eq!(engine.handle_request("LISTAR"), Response::ok_data(json!([])));
}

#[test]
fn test_delete_all_grades_of_student() {
    let (_temp, engine, _dir) = setup_with_student();
    engine.handle_request("AGREGAR_ESTUDIANTE|S2|Luis");
    engine.handle_request("AGREGAR|S1|MAT101|10");
    engine.handle_request("AGREGAR|S1|FIS101|11");
    engine.handle_request("AGREGAR|S2|MAT101|12");

    let response = engine.handle_request("ELIMINAR|S1");

    assert!(response.is_ok());
    assert_eq!(
        engine.list_grades().unwrap(),
        vec![Grade::new("S2", "MAT101", 12.0)]
    );
    assert_eq!(engine.handle_request("BUSCAR|S1").status(), Status::NotFound);
}

#[test]
fn test_delete_without_grades() {
    let (_temp, engine, _dir) = setup_with_student();

    assert_eq!(engine.handle_request("ELIMINAR|S1").status(), Status::NotFound);
    assert_eq!(engine.handle_request("ELIMINAR|S9").status(), Status::NotFound);
}

// =============================================================================
// Invalid Command Tests
// =============================================================================

#[test]
fn test_invalid_command_touches_nothing() {
    let (_temp, engine, directory) = setup_temp_engine();
    let before = std::fs::read(engine.storage().students_path()).unwrap();

    for line in ["HOLA", "AGREGAR_ESTUDIANTE|S1", "AGREGAR|S1|MAT101", "LISTAR|1"] {
        assert_eq!(engine.handle_request(line), Response::error("invalid command"));
    }

    assert_eq!(std::fs::read(engine.storage().students_path()).unwrap(), before);
    assert_eq!(directory.lookup_count(), 0);
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_grades_for_distinct_subjects() {
    let temp_dir = TempDir::new().unwrap();
    let subjects: Vec<(String, String)> = (0..12)
        .map(|i| (format!("SUB{}", i), format!("Subject {}", i)))
        .collect();
    let subject_refs: Vec<(&str, &str)> = subjects
        .iter()
        .map(|(c, n)| (c.as_str(), n.as_str()))
        .collect();
    let config = Config::builder().data_dir(temp_dir.path()).build();
    let engine = Arc::new(
        Engine::with_directory(config, MemoryDirectory::with(&subject_refs)).unwrap(),
    );
    engine.register_student("S1", "Ana").unwrap();

    let handles: Vec<_> = (0..12)
        .map(|i| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || engine.handle_request(&format!("AGREGAR|S1|SUB{}|{}", i, i)))
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap().is_ok());
    }

    let grades = engine.list_grades().unwrap();
    assert_eq!(grades.len(), 12);
    for i in 0..12 {
        assert_eq!(
            grades
                .iter()
                .filter(|g| g.subject == format!("SUB{}", i))
                .count(),
            1
        );
    }
}
