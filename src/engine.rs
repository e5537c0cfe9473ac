//! Engine Module
//!
//! The command dispatcher that coordinates storage and the subject directory.
//!
//! ## Responsibilities
//! - Map each parsed command to storage / directory calls
//! - Enforce business rules (score range, registration, duplicates)
//! - Turn every outcome, including failures, into a `Response`

use crate::config::Config;
use crate::directory::{normalize_code, DirectoryClient, Lookup, SubjectDirectory};
use crate::error::{GradebookError, Result};
use crate::protocol::{parse_command, Command, Response};
use crate::storage::{format_score, Grade, GradeInsert, StorageManager, Student};

/// Lowest accepted score
pub const MIN_SCORE: f64 = 0.0;

/// Highest accepted score
pub const MAX_SCORE: f64 = 20.0;

/// The dispatcher
///
/// ## Concurrency Model
///
/// - Storage access is serialized by `StorageManager`'s exclusive region.
/// - Directory lookups run *outside* that region. An add-grade dispatch
///   checks the student, validates the score, asks the directory, and only
///   then enters the region to write. Between the lookup and the write the
///   directory may change its mind; that window is accepted.
pub struct Engine {
    storage: StorageManager,

    directory: Box<dyn SubjectDirectory>,
}

impl Engine {
    /// Open the tables under `config.data_dir` and talk to the directory at
    /// `config.directory_addr`
    pub fn open(config: Config) -> Result<Self> {
        let directory = DirectoryClient::new(&config.directory_addr, config.directory_timeout());
        Self::with_directory(config, directory)
    }

    /// Open with a caller-supplied directory
    pub fn with_directory(config: Config, directory: impl SubjectDirectory + 'static) -> Result<Self> {
        let storage = StorageManager::open(&config.data_dir)?;

        Ok(Self {
            storage,
            directory: Box::new(directory),
        })
    }

    /// Parse and execute one raw request line
    pub fn handle_request(&self, line: &str) -> Response {
        match parse_command(line) {
            Ok(command) => self.execute(command),
            Err(e) => {
                tracing::debug!("Rejected request {:?}: {}", line, e);
                Self::error_response(e)
            }
        }
    }

    /// Execute a command
    ///
    /// Routes commands to appropriate handlers. Never fails: errors become
    /// `not_found` or `error` responses.
    pub fn execute(&self, command: Command) -> Response {
        let opcode = command.command_type().opcode();

        let result = match command {
            Command::RegisterStudent { id, name } => {
                self.register_student(&id, &name).map(Response::ok)
            }
            Command::AddGrade {
                student_id,
                subject,
                score,
            } => self.add_grade(&student_id, &subject, &score).map(Response::ok),
            Command::FindGrades { student_id } => self
                .find_grades(&student_id)
                .and_then(|grades| Self::data_response(&grades)),
            Command::UpdateGrade {
                student_id,
                subject,
                score,
            } => self
                .update_grade(&student_id, subject.as_deref(), &score)
                .map(Response::ok),
            Command::ListGrades => self
                .list_grades()
                .and_then(|grades| Self::data_response(&grades)),
            Command::DeleteGrades { student_id } => {
                self.delete_grades(&student_id).map(Response::ok)
            }
        };

        match result {
            Ok(response) => response,
            Err(e) => {
                match &e {
                    GradebookError::Io(_) | GradebookError::Storage(_) => {
                        tracing::warn!("{} failed: {}", opcode, e)
                    }
                    _ => tracing::debug!("{} rejected: {}", opcode, e),
                }
                Self::error_response(e)
            }
        }
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Register a student; a taken id is a conflict
    pub fn register_student(&self, id: &str, name: &str) -> Result<String> {
        let student = Student::new(id, name);
        if !self.storage.insert_student(&student)? {
            return Err(GradebookError::Conflict(format!(
                "student {} already registered",
                id
            )));
        }

        tracing::info!("Registered student {}", id);
        Ok(format!("student {} registered", name))
    }

    /// Record a grade for a registered student in a subject the directory knows
    pub fn add_grade(&self, student_id: &str, subject: &str, score: &str) -> Result<String> {
        if !self.storage.student_exists(student_id)? {
            return Err(Self::unregistered(student_id));
        }
        let score = parse_score(score)?;

        // Network round trip, outside the exclusive region
        let subject = normalize_code(subject);
        if let Lookup::Unknown(reason) = self.directory.lookup(&subject)? {
            return Err(GradebookError::Validation(if reason.is_empty() {
                format!("unknown subject {}", subject)
            } else {
                format!("unknown subject {}: {}", subject, reason)
            }));
        }

        let grade = Grade::new(student_id, subject.as_str(), score);
        match self.storage.insert_grade(&grade)? {
            GradeInsert::Inserted => {
                tracing::info!("Recorded {} {} = {}", student_id, subject, score);
                Ok(format!("grade recorded for {}", student_id))
            }
            GradeInsert::UnknownStudent => Err(Self::unregistered(student_id)),
            GradeInsert::Duplicate => Err(GradebookError::Conflict(format!(
                "grade already recorded for {} in {}; use ACTUALIZAR",
                student_id, subject
            ))),
        }
    }

    /// A registered student's grades; none recorded is `NotFound`
    pub fn find_grades(&self, student_id: &str) -> Result<Vec<Grade>> {
        if !self.storage.student_exists(student_id)? {
            return Err(Self::unregistered(student_id));
        }

        let grades = self.storage.find_grades(|g| g.student_id == student_id)?;
        if grades.is_empty() {
            return Err(GradebookError::NotFound(format!(
                "no grades recorded for {}",
                student_id
            )));
        }
        Ok(grades)
    }

    /// Set a new score on the student's grade in `subject`, or on all of the
    /// student's grades when no subject is given
    pub fn update_grade(&self, student_id: &str, subject: Option<&str>, score: &str) -> Result<String> {
        if !self.storage.student_exists(student_id)? {
            return Err(Self::unregistered(student_id));
        }
        let score = parse_score(score)?;

        let subject = subject.map(normalize_code);
        let updated = self.storage.update_grades(
            |g| {
                g.student_id == student_id
                    && subject.as_deref().map_or(true, |s| g.subject == s)
            },
            score,
        )?;

        if updated == 0 {
            return Err(GradebookError::NotFound(match subject {
                Some(subject) => format!("no grade for {} in {}", student_id, subject),
                None => format!("no grades recorded for {}", student_id),
            }));
        }

        tracing::info!("Updated {} grade(s) of {} to {}", updated, student_id, score);
        Ok(format!("grade updated to {}", format_score(score)))
    }

    /// Every grade, unfiltered; an empty table is still a success
    pub fn list_grades(&self) -> Result<Vec<Grade>> {
        self.storage.list_grades()
    }

    /// Remove all of a student's grades; the student stays registered
    pub fn delete_grades(&self, student_id: &str) -> Result<String> {
        let removed = self.storage.delete_grades(|g| g.student_id == student_id)?;
        if removed == 0 {
            return Err(GradebookError::NotFound(format!(
                "student {} has no grades",
                student_id
            )));
        }

        tracing::info!("Deleted {} grade(s) of {}", removed, student_id);
        Ok(format!("{} grade(s) deleted for {}", removed, student_id))
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    pub fn storage(&self) -> &StorageManager {
        &self.storage
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn unregistered(student_id: &str) -> GradebookError {
        GradebookError::Validation(format!("student {} is not registered", student_id))
    }

    fn data_response(grades: &[Grade]) -> Result<Response> {
        serde_json::to_value(grades)
            .map(Response::ok_data)
            .map_err(|e| GradebookError::Protocol(format!("cannot encode grades: {}", e)))
    }

    fn error_response(error: GradebookError) -> Response {
        if error.is_not_found() {
            Response::not_found(error.to_string())
        } else {
            Response::error(error.to_string())
        }
    }
}

/// Parse a score and check it lies in [MIN_SCORE, MAX_SCORE]
pub fn parse_score(raw: &str) -> Result<f64> {
    let score: f64 = raw
        .trim()
        .parse()
        .map_err(|_| GradebookError::Validation(format!("score {:?} is not numeric", raw)))?;

    if score.is_nan() {
        return Err(GradebookError::Validation(format!(
            "score {:?} is not numeric",
            raw
        )));
    }
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(GradebookError::Validation(format!(
            "score {} out of range [0, 20]",
            raw.trim()
        )));
    }

    Ok(score)
}
