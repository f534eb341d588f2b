#![forbid(unsafe_code)]
//! lpbatch-io: the CSV result ledger.
//!
//! - `ledger::codec`: row encode/decode and a streaming record reader.
//! - `ledger::completion`: rebuild the set of finished jobs from a ledger.
//! - `ledger::writer`: append rows with a flush (and optional fsync) per row.
//! - `format`: numeric rendering for ledger cells.

pub mod error;
pub mod format;
pub mod ledger;

pub use ledger::{load_completion_set, CompletionSet, LedgerRow, LedgerWriter, LEDGER_HEADER};
