//! Table records
//!
//! The two row types persisted by the storage layer, and the trait that
//! maps them to and from CSV fields.

use serde::{Deserialize, Serialize};

use crate::error::{GradebookError, Result};

/// A row type stored in a `Table`
pub trait Record: Sized {
    /// Fixed header line of the table; never altered by a write
    const HEADER: &'static [&'static str];

    /// Primary key used by `Table::exists`
    fn key(&self) -> &str;

    /// Fields in header order
    fn to_fields(&self) -> Vec<String>;

    /// Parse a row read back from disk
    fn from_fields(fields: &[String]) -> Result<Self>;
}

/// A registered student
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    #[serde(rename = "ID_Estudiante")]
    pub id: String,

    #[serde(rename = "Nombre")]
    pub name: String,
}

impl Student {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl Record for Student {
    const HEADER: &'static [&'static str] = &["ID_Estudiante", "Nombre"];

    fn key(&self) -> &str {
        &self.id
    }

    fn to_fields(&self) -> Vec<String> {
        vec![self.id.clone(), self.name.clone()]
    }

    fn from_fields(fields: &[String]) -> Result<Self> {
        match fields {
            [id, name] => Ok(Self::new(id.as_str(), name.as_str())),
            _ => Err(GradebookError::Storage(format!(
                "student row has {} fields, expected 2",
                fields.len()
            ))),
        }
    }
}

/// A recorded grade: one student, one subject, one score in [0, 20]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    #[serde(rename = "ID_Estudiante")]
    pub student_id: String,

    /// Normalized (trimmed, upper-case) subject code
    #[serde(rename = "Materia")]
    pub subject: String,

    #[serde(rename = "Calificación")]
    pub score: f64,
}

impl Grade {
    pub fn new(student_id: impl Into<String>, subject: impl Into<String>, score: f64) -> Self {
        Self {
            student_id: student_id.into(),
            subject: subject.into(),
            score,
        }
    }
}

impl Record for Grade {
    const HEADER: &'static [&'static str] = &["ID_Estudiante", "Materia", "Calificación"];

    fn key(&self) -> &str {
        &self.student_id
    }

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.student_id.clone(),
            self.subject.clone(),
            format_score(self.score),
        ]
    }

    fn from_fields(fields: &[String]) -> Result<Self> {
        match fields {
            [student_id, subject, score] => {
                let score = score.trim().parse::<f64>().map_err(|_| {
                    GradebookError::Storage(format!("grade row has non-numeric score {score:?}"))
                })?;
                Ok(Self::new(student_id.as_str(), subject.as_str(), score))
            }
            _ => Err(GradebookError::Storage(format!(
                "grade row has {} fields, expected 3",
                fields.len()
            ))),
        }
    }
}

/// Render a score the way the tables have always stored it:
/// integral values keep one decimal ("15.0"), others are shortest form ("15.5")
pub fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{:.1}", score)
    } else {
        score.to_string()
    }
}
