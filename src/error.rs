use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop a masking run.
#[derive(Debug, Error)]
pub enum MaskError {
    /// The requested column is not part of the dataset.
    #[error("column '{column}' not found in the input file (available: {})", .available.join(", "))]
    UnknownColumn {
        column: String,
        available: Vec<String>,
    },

    /// The requested column holds non-numeric cells.
    #[error("column '{column}' is not numeric (row {row} holds {value:?})")]
    NonNumericColumn {
        column: String,
        row: usize,
        value: String,
    },

    #[error("min_noise must be less than max_noise and both finite (got min_noise={min}, max_noise={max})")]
    InvalidRange { min: f64, max: f64 },

    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("input file is empty: {}", .0.display())]
    EmptyInput(PathBuf),

    /// I/O and parse failures, carrying their context chain.
    #[error("{0:#}")]
    Unexpected(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, MaskError>;

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn unknown_column_lists_available_columns() {
        let err = MaskError::UnknownColumn {
            column: "missing".into(),
            available: vec!["id".into(), "salary".into()],
        };
        assert_eq!(
            err.to_string(),
            "column 'missing' not found in the input file (available: id, salary)"
        );
    }

    #[test]
    fn unexpected_keeps_context_chain() {
        let inner: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::other("disk on fire"));
        let err: MaskError = inner.context("writing output").unwrap_err().into();
        assert_eq!(err.to_string(), "writing output: disk on fire");
    }
}
