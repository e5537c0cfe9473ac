//! Table
//!
//! A header-plus-rows CSV file holding records of one type.
//!
//! Every operation reads or writes the *entire* file; there is no index.
//! A `Table` does no locking of its own: callers go through
//! `StorageManager`, which holds the exclusive region for the whole
//! read-modify-write span.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use crate::error::{GradebookError, Result};

use super::csv::{encode_row, parse_records};
use super::Record;

/// What `Table::rewrite` does to the rows it matches
pub enum Rewrite<'a, R> {
    /// Modify each matching row in place
    Update(&'a dyn Fn(&mut R)),

    /// Drop each matching row
    Delete,
}

/// A flat file table of `R` records
#[derive(Debug)]
pub struct Table<R> {
    path: PathBuf,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> Table<R> {
    /// Open a table, creating it with a header-only body if absent
    ///
    /// An existing file must start with exactly `R::HEADER`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let table = Self {
            path: path.into(),
            _record: PhantomData,
        };

        let is_empty = match fs::metadata(&table.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(e.into()),
        };

        if is_empty {
            table.write_all(&[])?;
            tracing::info!("Created table {}", table.path.display());
        } else {
            // Validates the header and every row
            table.load()?;
        }

        Ok(table)
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every row
    pub fn load(&self) -> Result<Vec<R>> {
        let content = fs::read_to_string(&self.path)?;
        let mut records = parse_records(&content)?.into_iter();

        let header = records.next().ok_or_else(|| {
            GradebookError::Storage(format!("{}: missing header", self.path.display()))
        })?;
        if !header.iter().map(|h| h.trim()).eq(R::HEADER.iter().copied()) {
            return Err(GradebookError::Storage(format!(
                "{}: unexpected header {:?}, expected {:?}",
                self.path.display(),
                header,
                R::HEADER
            )));
        }

        records
            .enumerate()
            .map(|(i, fields)| {
                R::from_fields(&fields).map_err(|e| {
                    let reason = match e {
                        GradebookError::Storage(reason) => reason,
                        other => other.to_string(),
                    };
                    // Row 1 is the header
                    GradebookError::Storage(format!("{} row {}: {}", self.path.display(), i + 2, reason))
                })
            })
            .collect()
    }

    /// Append one row at the end of the file
    pub fn append(&self, row: &R) -> Result<()> {
        let mut file = OpenOptions::new().read(true).append(true).open(&self.path)?;

        // A hand-edited file may lack the final newline
        let len = file.metadata()?.len();
        if len > 0 {
            let mut last = [0u8; 1];
            file.seek(SeekFrom::Start(len - 1))?;
            file.read_exact(&mut last)?;
            if last[0] != b'\n' {
                file.write_all(b"\n")?;
            }
        }

        file.write_all(encode_row(&row.to_fields()).as_bytes())?;
        file.flush()?;
        Ok(())
    }

    /// Rows matching `predicate`; empty when nothing matches
    pub fn find<P>(&self, predicate: P) -> Result<Vec<R>>
    where
        P: Fn(&R) -> bool,
    {
        Ok(self.load()?.into_iter().filter(|row| predicate(row)).collect())
    }

    /// Whether any row has primary key `key`
    pub fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.load()?.iter().any(|row| row.key() == key))
    }

    /// Apply `action` to every row matching `predicate` and write the table back
    ///
    /// Returns the number of matched rows. The file is left untouched when
    /// nothing matches.
    pub fn rewrite<P>(&self, predicate: P, action: Rewrite<'_, R>) -> Result<usize>
    where
        P: Fn(&R) -> bool,
    {
        let rows = self.load()?;
        let mut matched = 0;
        let mut kept = Vec::with_capacity(rows.len());

        for mut row in rows {
            if !predicate(&row) {
                kept.push(row);
                continue;
            }
            matched += 1;
            match action {
                Rewrite::Update(update) => {
                    update(&mut row);
                    kept.push(row);
                }
                Rewrite::Delete => {}
            }
        }

        if matched > 0 {
            self.write_all(&kept)?;
        }
        Ok(matched)
    }

    /// Replace the whole file with header + `rows`
    ///
    /// Written to a sibling temporary file and renamed over the original, so
    /// the previous contents survive a crash mid-write. On failure the
    /// temporary file is removed and the table is unchanged.
    fn write_all(&self, rows: &[R]) -> Result<()> {
        let tmp_path = self.tmp_path();

        let written = Self::write_rows(&tmp_path, rows).and_then(|()| fs::rename(&tmp_path, &self.path));
        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&tmp_path) {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Could not remove {}: {}", tmp_path.display(), cleanup);
                }
            }
            return Err(e.into());
        }
        Ok(())
    }

    fn write_rows(path: &Path, rows: &[R]) -> std::io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(encode_row(R::HEADER).as_bytes())?;
        for row in rows {
            file.write_all(encode_row(&row.to_fields()).as_bytes())?;
        }
        file.sync_all()
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
