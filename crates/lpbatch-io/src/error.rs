use thiserror::Error;

/// Result type local to lpbatch-io.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("empty line is not a ledger row")]
    EmptyRow,

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to open ledger {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("ledger write failed: {0}")]
    Write(#[source] std::io::Error),

    #[error("row has {got} fields, ledger header has {expected}")]
    RowWidth { got: usize, expected: usize },
}
