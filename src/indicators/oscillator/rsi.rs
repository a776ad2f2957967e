use crate::trend::ma::moving_average;

/// Compute RSI (Relative Strength Index) on the 0-100 scale.
///
/// - Price changes `delta[i] = x[i] - x[i - 1]`; the first bar has no prior
///   price and counts as zero gain and zero loss.
/// - Average gain and average loss are trailing simple means over `period`.
/// - RS = Average Gain / Average Loss
/// - RSI = 100 - (100 / (1 + RS))
///
/// The first value lands at index `period - 1`. A window with gains and no
/// losses gives 100; a window without any movement gives NaN.
///
/// # Arguments
/// * `prices` - Price data
/// * `period` - RSI lookback period (typically 14)
pub fn rsi(prices: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return vec![f64::NAN; prices.len()];
    }

    let mut gains = Vec::with_capacity(prices.len());
    let mut losses = Vec::with_capacity(prices.len());

    for i in 0..prices.len() {
        let change = if i == 0 { 0.0 } else { prices[i] - prices[i - 1] };
        if change.is_nan() {
            // No comparison holds for NaN, so it counts as neither gain nor loss
            gains.push(0.0);
            losses.push(0.0);
        } else {
            gains.push(change.max(0.0));
            losses.push((-change).max(0.0));
        }
    }

    let avg_gain = moving_average(&gains, period);
    let avg_loss = moving_average(&losses, period);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(&gain, &loss)| {
            if gain.is_nan() || loss.is_nan() {
                f64::NAN
            } else if loss == 0.0 {
                if gain > 0.0 { 100.0 } else { f64::NAN }
            } else {
                let rs = gain / loss;
                100.0 - (100.0 / (1.0 + rs))
            }
        })
        .collect()
}
