//! Storage Manager
//!
//! Owns the student and grade tables and the exclusive region around them.
//!
//! ## Responsibilities
//! - Create both tables with their headers on first startup
//! - Serialize every read-modify-write sequence under one lock
//! - Enforce row-level invariants that need a consistent view
//!   (unique student ids, one grade per student and subject)

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, MutexGuard};

use crate::error::Result;

use super::{Grade, Rewrite, Student, Table};

/// Both tables, reachable only through the manager's lock
struct Tables {
    students: Table<Student>,
    grades: Table<Grade>,
}

/// Outcome of `StorageManager::insert_grade`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeInsert {
    Inserted,
    /// No student with that id
    UnknownStudent,
    /// A grade for the same student and subject already exists
    Duplicate,
}

/// Manages the storage layer
///
/// ## Concurrency:
/// - `tables`: one `Mutex` for both files. Every public method holds it for
///   its whole span, so concurrent callers observe the tables as if the
///   operations ran one after another.
/// - The lock is released on every exit path, including errors, by the
///   guard's drop.
pub struct StorageManager {
    /// Directory holding both table files
    data_dir: PathBuf,

    tables: Mutex<Tables>,
}

impl StorageManager {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const STUDENTS_FILENAME: &'static str = "estudiantes.csv";
    const GRADES_FILENAME: &'static str = "calificaciones.csv";

    /// Open or create storage in the given directory
    ///
    /// On startup:
    /// 1. Create directory if it doesn't exist
    /// 2. Create each table with a header-only body if absent
    /// 3. Validate existing tables (header and rows)
    pub fn open(path: &Path) -> Result<Self> {
        fs::create_dir_all(path)?;

        let students = Table::open(path.join(Self::STUDENTS_FILENAME))?;
        let grades = Table::open(path.join(Self::GRADES_FILENAME))?;

        Ok(Self {
            data_dir: path.to_path_buf(),
            tables: Mutex::new(Tables { students, grades }),
        })
    }

    /// Enter the exclusive region
    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock()
    }

    // =========================================================================
    // Students
    // =========================================================================

    /// Register a student
    ///
    /// Returns `false` (and writes nothing) if the id is already taken.
    pub fn insert_student(&self, student: &Student) -> Result<bool> {
        let tables = self.lock();

        if tables.students.exists(&student.id)? {
            return Ok(false);
        }
        tables.students.append(student)?;
        Ok(true)
    }

    pub fn student_exists(&self, id: &str) -> Result<bool> {
        self.lock().students.exists(id)
    }

    pub fn list_students(&self) -> Result<Vec<Student>> {
        self.lock().students.load()
    }

    // =========================================================================
    // Grades
    // =========================================================================

    /// Append a grade if its student exists and the (student, subject) pair is new
    pub fn insert_grade(&self, grade: &Grade) -> Result<GradeInsert> {
        let tables = self.lock();

        if !tables.students.exists(&grade.student_id)? {
            return Ok(GradeInsert::UnknownStudent);
        }

        let duplicate = tables
            .grades
            .find(|g| g.student_id == grade.student_id && g.subject == grade.subject)?;
        if !duplicate.is_empty() {
            return Ok(GradeInsert::Duplicate);
        }

        tables.grades.append(grade)?;
        Ok(GradeInsert::Inserted)
    }

    /// Grades matching `predicate`
    pub fn find_grades<P>(&self, predicate: P) -> Result<Vec<Grade>>
    where
        P: Fn(&Grade) -> bool,
    {
        self.lock().grades.find(predicate)
    }

    /// Every grade, in file order
    pub fn list_grades(&self) -> Result<Vec<Grade>> {
        self.lock().grades.load()
    }

    /// Set the score of every grade matching `predicate`; returns the match count
    pub fn update_grades<P>(&self, predicate: P, score: f64) -> Result<usize>
    where
        P: Fn(&Grade) -> bool,
    {
        let set_score = |grade: &mut Grade| grade.score = score;
        self.lock()
            .grades
            .rewrite(predicate, Rewrite::Update(&set_score))
    }

    /// Remove every grade matching `predicate`; returns the removed count
    pub fn delete_grades<P>(&self, predicate: P) -> Result<usize>
    where
        P: Fn(&Grade) -> bool,
    {
        self.lock().grades.rewrite(predicate, Rewrite::Delete)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn students_path(&self) -> PathBuf {
        self.data_dir.join(Self::STUDENTS_FILENAME)
    }

    pub fn grades_path(&self) -> PathBuf {
        self.data_dir.join(Self::GRADES_FILENAME)
    }
}
