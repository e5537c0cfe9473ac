//! Command definitions
//!
//! Represents commands from clients.

/// Command types, one per opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    RegisterStudent,
    AddGrade,
    FindGrades,
    UpdateGrade,
    ListGrades,
    DeleteGrades,
}

impl CommandType {
    /// Wire opcode
    pub fn opcode(self) -> &'static str {
        match self {
            CommandType::RegisterStudent => "AGREGAR_ESTUDIANTE",
            CommandType::AddGrade => "AGREGAR",
            CommandType::FindGrades => "BUSCAR",
            CommandType::UpdateGrade => "ACTUALIZAR",
            CommandType::ListGrades => "LISTAR",
            CommandType::DeleteGrades => "ELIMINAR",
        }
    }

    pub fn from_opcode(opcode: &str) -> Option<Self> {
        match opcode {
            "AGREGAR_ESTUDIANTE" => Some(CommandType::RegisterStudent),
            "AGREGAR" => Some(CommandType::AddGrade),
            "BUSCAR" => Some(CommandType::FindGrades),
            "ACTUALIZAR" => Some(CommandType::UpdateGrade),
            "LISTAR" => Some(CommandType::ListGrades),
            "ELIMINAR" => Some(CommandType::DeleteGrades),
            _ => None,
        }
    }
}

/// A parsed command
///
/// Scores stay as the raw text the client sent; numeric validation belongs
/// to the dispatcher, not the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Register a student
    RegisterStudent { id: String, name: String },

    /// Record a grade
    AddGrade {
        student_id: String,
        subject: String,
        score: String,
    },

    /// List a student's grades
    FindGrades { student_id: String },

    /// Update one grade (`subject` given) or all of a student's grades
    UpdateGrade {
        student_id: String,
        subject: Option<String>,
        score: String,
    },

    /// List every grade
    ListGrades,

    /// Delete all of a student's grades
    DeleteGrades { student_id: String },
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::RegisterStudent { .. } => CommandType::RegisterStudent,
            Command::AddGrade { .. } => CommandType::AddGrade,
            Command::FindGrades { .. } => CommandType::FindGrades,
            Command::UpdateGrade { .. } => CommandType::UpdateGrade,
            Command::ListGrades => CommandType::ListGrades,
            Command::DeleteGrades { .. } => CommandType::DeleteGrades,
        }
    }
}
