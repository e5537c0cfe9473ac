//! Storage Module
//!
//! Persistent storage as flat CSV tables.
//!
//! ## Responsibilities
//! - Persist students and grades in two header-plus-rows files
//! - Append, find, rewrite, and existence checks over a whole table
//! - Serialize all access through one exclusive region
//!
//! ## File Format
//! ```text
//! estudiantes.csv            calificaciones.csv
//! ┌──────────────────────┐   ┌─────────────────────────────────────┐
//! │ ID_Estudiante,Nombre │   │ ID_Estudiante,Materia,Calificación  │
//! ├──────────────────────┤   ├─────────────────────────────────────┤
//! │ S1,Ana               │   │ S1,MAT101,15.5                      │
//! │ ...                  │   │ ...                                 │
//! └──────────────────────┘   └─────────────────────────────────────┘
//! ```
//!
//! Each operation reads the whole file and updates rewrite the whole file.
//! That is the scalability ceiling of this layer and fine for small tables.

mod csv;
mod record;
mod table;
mod manager;

pub use csv::{encode_row, parse_records};
pub use record::{format_score, Grade, Record, Student};
pub use table::{Rewrite, Table};
pub use manager::{GradeInsert, StorageManager};
