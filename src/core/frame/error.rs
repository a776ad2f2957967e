use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("column not found: {0}")]
    ColumnNotFound(String),

    #[error("column '{name}' has {actual} values, index has {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("frame has no columns")]
    NoColumns,

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("no valid data found in file")]
    Empty,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
