//! Rebuild the set of already-recorded jobs from a ledger on disk.
//!
//! This runs at the start of every run and is never cached: the ledger file is
//! the only record of what has been done, and it may have been edited between
//! runs. Nothing here fails; a damaged ledger yields a smaller set, which at
//! worst causes a job to be solved again.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use lpbatch_core::id::JobId;
use tracing::{debug, warn};

use super::codec::decode_row;
use super::schema::DEDUP_KEY;

#[derive(Debug, Clone, Default)]
pub struct CompletionSet {
    ids: HashSet<String>,
    key_column: usize,
    header_detected: bool,
}

impl CompletionSet {
    pub fn contains(&self, id: &JobId) -> bool {
        self.ids.contains(id.as_str())
    }

    /// Returns false if the id was already present.
    pub fn insert(&mut self, id: &JobId) -> bool {
        self.ids.insert(id.as_str().to_string())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Column index the ids were read from.
    pub fn key_column(&self) -> usize {
        self.key_column
    }

    /// Whether the first record was recognised as a header.
    pub fn header_detected(&self) -> bool {
        self.header_detected
    }
}

/// Load from `path`. A missing or unreadable ledger is an empty set.
pub fn load_completion_set(path: &Path) -> CompletionSet {
    match File::open(path) {
        Ok(f) => completion_set_from_reader(f),
        Err(e) => {
            debug!(ledger = %path.display(), error = %e, "no existing ledger; starting empty");
            CompletionSet::default()
        }
    }
}

/// Scan ledger lines from any reader.
///
/// Each physical line is decoded on its own, so an unclosed quote left by a
/// torn row cannot swallow the rows written after it. A job id never
/// contains a newline (manifests are line based), so no key is lost.
///
/// The first non-blank line is a header if one of its trimmed fields equals
/// `dataset`; that field's index becomes the key column. Otherwise column 0
/// is the key and the first line is counted as data.
pub fn completion_set_from_reader<R: Read>(reader: R) -> CompletionSet {
    let mut set = CompletionSet::default();
    let mut first = true;

    for chunk in BufReader::new(reader).split(b'\n') {
        let bytes = match chunk {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "stopped reading ledger early; later rows will be re-run");
                break;
            }
        };
        let text = String::from_utf8_lossy(&bytes);
        let line = text.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let fields = match decode_row(line) {
            Ok(fields) => fields,
            Err(e) => {
                debug!(error = %e, "skipping undecodable ledger line");
                continue;
            }
        };

        if first {
            first = false;
            if let Some(idx) = fields.iter().position(|f| f.trim() == DEDUP_KEY) {
                set.key_column = idx;
                set.header_detected = true;
                continue;
            }
            set.key_column = 0;
        }

        if let Some(value) = fields.get(set.key_column) {
            let value = value.trim();
            if !value.is_empty() {
                set.ids.insert(value.to_string());
            }
        }
    }

    debug!(
        jobs = set.ids.len(),
        key_column = set.key_column,
        header = set.header_detected,
        "loaded completion set"
    );
    set
}
