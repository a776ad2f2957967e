use frame::FrameError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlotError {
    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("row {row} outside a figure with {rows} row(s)")]
    RowOutOfRange { row: usize, rows: usize },

    #[error("{what}: expected {expected} values, got {actual}")]
    LengthMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("empty input: {0}")]
    EmptyInput(String),

    #[error("rendering failed: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlotError>;
