use crate::trend::ma::exponential_moving_average;

/// MACD (Moving Average Convergence Divergence) Output
#[derive(Debug, Clone)]
pub struct MacdOutput {
    /// MACD Line = Fast EMA - Slow EMA
    pub macd_line: Vec<f64>,
    /// Signal Line = EMA of MACD Line
    pub signal_line: Vec<f64>,
    /// Histogram = MACD Line - Signal Line
    pub histogram: Vec<f64>,
}

/// Computes the MACD indicator.
///
/// # Arguments
///
/// * `data` - A slice of f64 values (typically closing prices).
/// * `fast_period` - The span of the fast EMA (typically 12).
/// * `slow_period` - The span of the slow EMA (typically 26).
/// * `signal_period` - The span of the signal line EMA (typically 9).
///
/// # Returns
///
/// A `MacdOutput` struct containing the MACD line, signal line, and histogram.
/// The EMAs are seeded with the first value, so there are no warm-up NaNs.
pub fn macd(
    data: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> MacdOutput {
    let fast_ema = exponential_moving_average(data, fast_period);
    let slow_ema = exponential_moving_average(data, slow_period);

    let macd_line: Vec<f64> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| f - s)
        .collect();

    let signal_line = exponential_moving_average(&macd_line, signal_period);

    let histogram = macd_line
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| m - s)
        .collect();

    MacdOutput {
        macd_line,
        signal_line,
        histogram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macd_basic() {
        let data: Vec<f64> = (1..=30).map(|i| i as f64).collect();

        // Use small periods for testing
        let output = macd(&data, 3, 5, 3);

        assert_eq!(output.macd_line.len(), 30);
        assert_eq!(output.signal_line.len(), 30);
        assert_eq!(output.histogram.len(), 30);

        // Both EMAs start at the first value
        assert!(output.macd_line[0].abs() < 1e-12);
        assert!(output.signal_line[0].abs() < 1e-12);

        // Rising prices: fast EMA tracks closer, so MACD is positive
        assert!(output.macd_line[29] > 0.0);
        for i in 0..30 {
            let expected = output.macd_line[i] - output.signal_line[i];
            assert!((output.histogram[i] - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_macd_values() {
        let data = vec![1.0, 2.0, 3.0];
        // fast span 1 -> alpha 1, slow span 3 -> alpha 0.5
        let output = macd(&data, 1, 3, 3);
        // slow: 1, 1.5, 2.25 ; fast: 1, 2, 3
        assert!((output.macd_line[1] - 0.5).abs() < 1e-12);
        assert!((output.macd_line[2] - 0.75).abs() < 1e-12);
        // signal: 0, 0.25, 0.5
        assert!((output.signal_line[2] - 0.5).abs() < 1e-12);
        assert!((output.histogram[2] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_macd_empty() {
        let output = macd(&[], 12, 26, 9);
        assert!(output.macd_line.is_empty());
        assert!(output.histogram.is_empty());
    }
}
