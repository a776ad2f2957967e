//! Tabular series data for the chart builders.
//!
//! A [`Frame`] is an index plus named `f64` columns of the same length,
//! the minimum a chart needs to select an x axis and one or more y series.

mod error;
mod frame;
mod market;
mod read;

pub mod write;

pub use error::FrameError;
pub use frame::*;
pub use market::*;
pub use read::*;
pub use write::write_file;
