//! Durable, append-only ledger writes.
//!
//! Every row is written, flushed, and (by default) `sync_data`'d before the
//! call returns, so a kill between jobs loses at most the job in flight.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::codec::writer_builder;
use super::schema::{LedgerRow, LEDGER_HEADER};
use crate::error::{Error, Result};

/// How the ledger was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerOpen {
    /// File was missing or empty; a header row was written.
    Fresh,
    /// Existing content kept. `repaired_tail` is set when the last row was
    /// not newline-terminated and a newline was appended before new rows.
    Appended { repaired_tail: bool },
}

/// True when `path` exists and has at least one byte.
pub fn ledger_has_content(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false)
}

pub struct LedgerWriter {
    writer: csv::Writer<File>,
    path: PathBuf,
    sync_rows: bool,
    rows_written: usize,
}

impl LedgerWriter {
    /// Open for append if the ledger has content, otherwise create it and
    /// write the header.
    pub fn open(path: &Path, sync_rows: bool) -> Result<(Self, LedgerOpen)> {
        let open_err = |source| Error::Open {
            path: path.display().to_string(),
            source,
        };

        let (file, mode) = if ledger_has_content(path) {
            let mut file = OpenOptions::new()
                .read(true)
                .append(true)
                .open(path)
                .map_err(open_err)?;
            let repaired_tail = terminate_torn_row(&mut file).map_err(Error::Write)?;
            if repaired_tail {
                warn!(ledger = %path.display(), "last ledger row was not terminated; appended newline");
            }
            (file, LedgerOpen::Appended { repaired_tail })
        } else {
            let file = File::create(path).map_err(open_err)?;
            (file, LedgerOpen::Fresh)
        };

        let mut ledger = Self {
            writer: writer_builder().from_writer(file),
            path: path.to_path_buf(),
            sync_rows,
            rows_written: 0,
        };
        if mode == LedgerOpen::Fresh {
            ledger.write_fields(&LEDGER_HEADER)?;
            debug!(ledger = %ledger.path.display(), "wrote ledger header");
        }
        Ok((ledger, mode))
    }

    /// Data rows written through this handle (excludes the header).
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Append one data row and make it durable.
    pub fn append(&mut self, row: &LedgerRow) -> Result<()> {
        self.write_fields(row.fields())?;
        self.rows_written += 1;
        Ok(())
    }

    fn write_fields<S: AsRef<str>>(&mut self, fields: &[S]) -> Result<()> {
        if fields.len() != LEDGER_HEADER.len() {
            return Err(Error::RowWidth {
                got: fields.len(),
                expected: LEDGER_HEADER.len(),
            });
        }
        self.writer
            .write_record(fields.iter().map(|f| f.as_ref().as_bytes()))?;
        self.writer.flush().map_err(Error::Write)?;
        if self.sync_rows {
            self.writer.get_ref().sync_data().map_err(Error::Write)?;
        }
        Ok(())
    }
}

/// Append `\n` if the file's last byte is not one. Existing bytes are left
/// untouched; the torn row stays behind as a (short) record.
fn terminate_torn_row(file: &mut File) -> std::io::Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    if last[0] == b'\n' {
        return Ok(false);
    }
    file.write_all(b"\n")?;
    file.flush()?;
    Ok(true)
}
