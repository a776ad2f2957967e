/// Calculates the Simple Moving Average (SMA) for a given data slice and window.
///
/// # Arguments
///
/// * `data` - A slice of f64 values.
/// * `lags` - The window size for the moving average.
///
/// # Returns
///
/// A Vec<f64> of the input length. The first `lags - 1` values are NaN, as is
/// any value whose window contains a NaN.
pub fn moving_average(data: &[f64], lags: usize) -> Vec<f64> {
    if lags == 0 || lags > data.len() {
        return vec![f64::NAN; data.len()];
    }

    let mut sma = Vec::with_capacity(data.len());

    // Pad with NaN for the initial period where we don't have enough data
    for _ in 0..lags - 1 {
        sma.push(f64::NAN);
    }

    let finite_or_zero = |x: f64| if x.is_nan() { 0.0 } else { x };
    let mut sum: f64 = data.iter().take(lags).map(|&x| finite_or_zero(x)).sum();
    let mut n_missing = data.iter().take(lags).filter(|x| x.is_nan()).count();
    sma.push(if n_missing > 0 { f64::NAN } else { sum / lags as f64 });

    for i in lags..data.len() {
        let leaving = data[i - lags];
        let entering = data[i];
        if leaving.is_nan() {
            n_missing -= 1;
        }
        if entering.is_nan() {
            n_missing += 1;
        }
        sum = sum - finite_or_zero(leaving) + finite_or_zero(entering);
        sma.push(if n_missing > 0 { f64::NAN } else { sum / lags as f64 });
    }

    sma
}

/// Calculates the Exponential Moving Average (EMA) with span-based smoothing.
///
/// Uses `alpha = 2 / (span + 1)` and the plain recursion
/// `ema[i] = alpha * x[i] + (1 - alpha) * ema[i - 1]`, seeded with the first
/// finite value. There is no warm-up: the seed position already carries a value.
///
/// A NaN input carries the previous EMA forward, but the old weight keeps
/// decaying across the gap: after `k` steps without data the next value is
/// `((1 - alpha)^k * prev + alpha * x) / ((1 - alpha)^k + alpha)`.
pub fn exponential_moving_average(data: &[f64], span: usize) -> Vec<f64> {
    if span == 0 {
        return vec![f64::NAN; data.len()];
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut ema = Vec::with_capacity(data.len());
    let mut prev = f64::NAN;
    let mut old_weight = 1.0;

    for &x in data {
        if prev.is_nan() {
            prev = x;
        } else {
            old_weight *= 1.0 - alpha;
            if !x.is_nan() {
                prev = (old_weight * prev + alpha * x) / (old_weight + alpha);
                old_weight = 1.0;
            }
        }
        ema.push(prev);
    }

    ema
}

/// Rolling sample standard deviation (n - 1 denominator) over a trailing window.
///
/// NaN for the first `lags - 1` positions, for windows containing NaN and
/// for every position when `lags < 2`.
pub fn rolling_std(data: &[f64], lags: usize) -> Vec<f64> {
    if lags < 2 || lags > data.len() {
        return vec![f64::NAN; data.len()];
    }

    let mut out = vec![f64::NAN; data.len()];
    for i in lags - 1..data.len() {
        let window = &data[i + 1 - lags..=i];
        if window.iter().any(|x| x.is_nan()) {
            continue;
        }
        let mean = window.iter().sum::<f64>() / lags as f64;
        let ss: f64 = window.iter().map(|&x| (x - mean).powi(2)).sum();
        out[i] = (ss / (lags - 1) as f64).sqrt();
    }

    out
}
