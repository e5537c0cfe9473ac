//! CSV codec
//!
//! Minimal RFC 4180 style encoding for table rows. Fields that contain a
//! comma, a double quote, or a line break are quoted; quotes are doubled.

use crate::error::{GradebookError, Result};

/// Encode one row, including the trailing newline
pub fn encode_row<S: AsRef<str>>(fields: &[S]) -> String {
    let mut line = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            line.push(',');
        }
        let field = field.as_ref();
        if field.contains([',', '"', '\n', '\r']) {
            line.push('"');
            line.push_str(&field.replace('"', "\"\""));
            line.push('"');
        } else {
            line.push_str(field);
        }
    }
    line.push('\n');
    line
}

/// Parse a whole file into records
///
/// Blank lines are skipped, `\r\n` line endings are accepted, and a leading
/// byte order mark is ignored.
pub fn parse_records(content: &str) -> Result<Vec<Vec<String>>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => {
                in_quotes = true;
                quoted = true;
            }
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                finish_record(&mut records, &mut record, &mut field, quoted);
                quoted = false;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(GradebookError::Storage(
            "unterminated quoted field".to_string(),
        ));
    }
    finish_record(&mut records, &mut record, &mut field, quoted);

    Ok(records)
}

fn finish_record(
    records: &mut Vec<Vec<String>>,
    record: &mut Vec<String>,
    field: &mut String,
    quoted: bool,
) {
    // Blank line
    if record.is_empty() && field.is_empty() && !quoted {
        return;
    }
    record.push(std::mem::take(field));
    records.push(std::mem::take(record));
}
