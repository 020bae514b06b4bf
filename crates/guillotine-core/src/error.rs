// Errors raised while decoding league data. The computations themselves
// are total and never fail.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("malformed season bundle: {0}")]
    Bundle(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("score grid header must start with `manager,draft_position` and list weeks as wk1..wkN, got {header:?}")]
    GridHeader { header: Vec<String> },

    #[error("invalid value {value:?} for {manager} in column {column}")]
    GridValue {
        manager: String,
        column: String,
        value: String,
    },
}

pub type Result<T> = std::result::Result<T, CoreError>;
