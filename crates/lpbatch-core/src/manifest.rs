//! Job-list manifest reader.
//!
//! Grammar:
//! - `#` starts a comment that runs to end of line (`\#` is a literal `#`).
//! - Blank and whitespace-only lines are ignored.
//! - The first remaining line is the dataset root, resolved against the
//!   manifest's own directory when relative.
//! - Every later line is a job path, resolved against the root when relative.
//!
//! Lines are read as bytes and decoded lossily, so a path that is not valid
//! UTF-8 still becomes a job (whose input will then fail to load) instead of
//! ending the batch. The reader is a lazy, single-pass iterator; reopen the
//! file to restart.

use std::io::BufRead;

use crate::error::{Error, Result};
use crate::id::JobId;
use crate::paths;

/// One resolved job plus the manifest line it came from (for diagnostics).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobEntry {
    pub id: JobId,
    pub line_number: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ManifestState {
    /// No usable line seen yet; relative roots resolve against this dir.
    AwaitingRoot { manifest_dir: String },
    ReadingJobs { root: String },
    /// Input finished or failed; nothing more will be yielded.
    Exhausted,
}

pub struct ManifestReader<R> {
    reader: R,
    buf: Vec<u8>,
    line_number: usize,
    state: ManifestState,
    root: Option<String>,
}

impl<R: BufRead> ManifestReader<R> {
    /// `manifest_dir` is the directory containing the manifest file.
    pub fn new(reader: R, manifest_dir: impl Into<String>) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line_number: 0,
            state: ManifestState::AwaitingRoot {
                manifest_dir: manifest_dir.into(),
            },
            root: None,
        }
    }

    /// The resolved dataset root, once captured.
    pub fn root(&self) -> Option<&str> {
        self.root.as_deref()
    }
}

impl<R: BufRead> Iterator for ManifestReader<R> {
    type Item = Result<JobEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.state == ManifestState::Exhausted {
                return None;
            }

            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(n) if n > 0 => {}
                Err(source) => {
                    self.state = ManifestState::Exhausted;
                    return Some(Err(Error::Io {
                        line: self.line_number + 1,
                        source,
                    }));
                }
                Ok(_) => {
                    let missing_root =
                        matches!(self.state, ManifestState::AwaitingRoot { .. });
                    self.state = ManifestState::Exhausted;
                    return missing_root.then_some(Err(Error::MissingRoot));
                }
            };
            self.line_number += 1;

            let cleaned = clean_line(&String::from_utf8_lossy(&self.buf));
            if cleaned.is_empty() {
                continue;
            }

            match &self.state {
                ManifestState::AwaitingRoot { manifest_dir } => {
                    let root = paths::resolve(manifest_dir, &cleaned);
                    self.root = Some(root.clone());
                    self.state = ManifestState::ReadingJobs { root };
                }
                ManifestState::ReadingJobs { root } => {
                    return Some(Ok(JobEntry {
                        id: JobId::new(paths::resolve(root, &cleaned)),
                        line_number: self.line_number,
                    }));
                }
                ManifestState::Exhausted => return None,
            }
        }
    }
}

/// Drop everything from the first unescaped `#`, then trim.
pub fn clean_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'#') => {
                out.push('#');
                chars.next();
            }
            '#' => break,
            other => out.push(other),
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn ids(text: &str, dir: &str) -> Vec<String> {
        ManifestReader::new(Cursor::new(text.to_string()), dir)
            .map(|e| e.unwrap().id.into_inner())
            .collect()
    }

    #[test]
    fn comments_blanks_and_trailing_comments() {
        let got = ids(
            "/root\n# comment\n\nfile1.mps\nfile2.mps  # trailing\n",
            "/manifests",
        );
        assert_eq!(got, vec!["/root/file1.mps", "/root/file2.mps"]);
    }

    #[test]
    fn relative_root_resolves_against_manifest_dir() {
        let got = ids("data\nsub/a.mps\n/abs/b.mps\n", "/runs");
        assert_eq!(got, vec!["/runs/data/sub/a.mps", "/abs/b.mps"]);
    }

    #[test]
    fn escaped_hash_is_literal() {
        assert_eq!(clean_line(r"  dir/a\#1.mps # note "), "dir/a#1.mps");
        assert_eq!(clean_line("# only a comment"), "");
    }

    #[test]
    fn crlf_lines_are_trimmed() {
        let got = ids("/root\r\na.mps\r\n", ".");
        assert_eq!(got, vec!["/root/a.mps"]);
    }

    #[test]
    fn invalid_utf8_line_is_still_a_job() {
        let text: &[u8] = b"/lp\na.mps\ncaf\xe9.mps\nc.mps\n";
        let got: Vec<JobEntry> = ManifestReader::new(text, ".")
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(got.len(), 3);
        assert_eq!(got[1].id.as_str(), "/lp/caf\u{FFFD}.mps");
        assert_eq!(got[1].line_number, 3);
        assert_eq!(got[2].id.as_str(), "/lp/c.mps");
    }

    #[test]
    fn last_line_without_newline_is_read() {
        assert_eq!(ids("/root\na.mps", "."), vec!["/root/a.mps"]);
    }

    #[test]
    fn missing_root_is_reported_once() {
        let mut reader = ManifestReader::new(Cursor::new("# nothing\n\n   \n"), ".");
        assert!(matches!(reader.next(), Some(Err(Error::MissingRoot))));
        assert!(reader.next().is_none());
        assert!(reader.root().is_none());
    }

    #[test]
    fn root_only_manifest_yields_nothing() {
        let mut reader = ManifestReader::new(Cursor::new("/root\n"), ".");
        assert!(reader.next().is_none());
        assert_eq!(reader.root(), Some("/root"));
    }

    #[test]
    fn line_numbers_are_physical() {
        let entries: Vec<JobEntry> =
            ManifestReader::new(Cursor::new("/r\n\n# x\na.mps\n"), ".")
                .collect::<Result<_>>()
                .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].line_number, 4);
    }
}
