//! Row codec for the ledger: comma separated, RFC 4180 quoting.
//!
//! A field is quoted only when it contains a comma, a double quote, CR or LF;
//! inner quotes are doubled. Fields are never trimmed here.

use std::io::Read;

use crate::error::{Error, Result};

pub(crate) fn writer_builder() -> csv::WriterBuilder {
    let mut b = csv::WriterBuilder::new();
    b.has_headers(false)
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'));
    b
}

fn reader_builder() -> csv::ReaderBuilder {
    let mut b = csv::ReaderBuilder::new();
    b.has_headers(false).flexible(true);
    b
}

/// Encode one row as a single line, without the trailing newline.
pub fn encode_row<S: AsRef<str>>(fields: &[S]) -> Result<String> {
    let mut bytes = Vec::new();
    {
        let mut wtr = writer_builder().from_writer(&mut bytes);
        wtr.write_record(fields.iter().map(|f| f.as_ref().as_bytes()))?;
        wtr.flush().map_err(Error::Write)?;
    }
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Decode a line produced by `encode_row`. Empty lines are rejected.
pub fn decode_row(line: &str) -> Result<Vec<String>> {
    if line.is_empty() {
        return Err(Error::EmptyRow);
    }
    let mut rdr = reader_builder().from_reader(line.as_bytes());
    let mut record = csv::ByteRecord::new();
    if !rdr.read_byte_record(&mut record)? {
        return Err(Error::EmptyRow);
    }
    Ok(record_fields(&record))
}

fn record_fields(record: &csv::ByteRecord) -> Vec<String> {
    record
        .iter()
        .map(|f| String::from_utf8_lossy(f).into_owned())
        .collect()
}

/// Streaming record reader over a whole ledger.
///
/// Quoted fields may span physical lines. Blank lines are skipped. Invalid
/// UTF-8 is replaced rather than rejected so a damaged ledger can still be
/// scanned. Records may be ragged (fewer or more fields than the header).
pub struct LedgerReader<R: Read> {
    inner: csv::Reader<R>,
    record: csv::ByteRecord,
    done: bool,
}

impl<R: Read> LedgerReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            inner: reader_builder().from_reader(reader),
            record: csv::ByteRecord::new(),
            done: false,
        }
    }
}

impl<R: Read> Iterator for LedgerReader<R> {
    type Item = Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.inner.read_byte_record(&mut self.record) {
            Ok(true) => Some(Ok(record_fields(&self.record))),
            Ok(false) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e.into()))
            }
        }
    }
}
