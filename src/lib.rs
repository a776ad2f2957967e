//! Interactive financial charts with technical indicators and ML diagnostics.
//!
//! ```no_run
//! use financeplotter::{IndicatorSpec, create_candlestick, read_ohlc_file};
//!
//! let data = read_ohlc_file("prices.txt")?;
//! let mut chart = create_candlestick(data, Some("Prices"), true, &[IndicatorSpec::sma(20)])?;
//! chart.add_range_slider().add_tooltips();
//! chart.write_html("prices.html")?;
//! # Ok::<(), financeplotter::PlotError>(())
//! ```

pub mod config;
pub mod job;

pub use charts::*;
pub use frame::{Column, Frame, FrameError, Index, read_csv, read_ohlc_file, read_price_file};
pub use indicators;
pub use ml::*;

/// Initialise `env_logger`; `RUST_LOG` overrides the default `info` level.
pub fn init_logger() {
    let env = env_logger::Env::default().default_filter_or("info");
    let _ = env_logger::Builder::from_env(env).try_init();
}
