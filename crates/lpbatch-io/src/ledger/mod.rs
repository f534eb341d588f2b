//! The append-only CSV result ledger.
//!
//! One row per attempted job, 13 fixed columns. A header row is written only
//! when the ledger starts out empty; existing bytes are never rewritten.

pub mod codec;
pub mod completion;
pub mod schema;
pub mod writer;

pub use codec::{decode_row, encode_row, LedgerReader};
pub use completion::{completion_set_from_reader, load_completion_set, CompletionSet};
pub use schema::{Column, LedgerRow, DEDUP_KEY, LEDGER_HEADER, READ_ERROR, SOLVER_ERROR};
pub use writer::{ledger_has_content, LedgerOpen, LedgerWriter};
