//! Technical indicators over price series.
//!
//! Every function returns a vector of the input length, with `NaN` in the
//! warm-up positions where the window is not yet full.

pub mod trend {
    pub mod ma;
    pub mod macd;
}

pub mod oscillator {
    pub mod rsi;
}

pub mod volatility {
    pub mod bollinger_bands;
}

pub use oscillator::rsi::rsi;
pub use trend::ma::{exponential_moving_average, moving_average, rolling_std};
pub use trend::macd::{MacdOutput, macd};
pub use volatility::bollinger_bands::{BollingerBandsOutput, bollinger_bands};
