use crate::trend::ma::{moving_average, rolling_std};

/// Bollinger Bands Output
#[derive(Debug, Clone)]
pub struct BollingerBandsOutput {
    /// Upper Band = Middle Band + (Multiplier * SD)
    pub upper_band: Vec<f64>,
    /// Middle Band = SMA
    pub middle_band: Vec<f64>,
    /// Lower Band = Middle Band - (Multiplier * SD)
    pub lower_band: Vec<f64>,
}

/// Computes Bollinger Bands.
///
/// # Arguments
///
/// * `data` - A slice of f64 values (typically closing prices).
/// * `period` - The window size for the moving average and standard deviation (typically 20).
/// * `multiplier` - The number of standard deviations for the bands (typically 2.0).
///
/// The deviation is the sample standard deviation of the window.
pub fn bollinger_bands(data: &[f64], period: usize, multiplier: f64) -> BollingerBandsOutput {
    let middle_band = moving_average(data, period);
    let std_dev = rolling_std(data, period);

    let upper_band = middle_band
        .iter()
        .zip(&std_dev)
        .map(|(m, s)| m + multiplier * s)
        .collect();
    let lower_band = middle_band
        .iter()
        .zip(&std_dev)
        .map(|(m, s)| m - multiplier * s)
        .collect();

    BollingerBandsOutput {
        upper_band,
        middle_band,
        lower_band,
    }
}
