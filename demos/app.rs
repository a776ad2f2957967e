//! Demo: a synthetic stock with indicators, and a small classification
//! problem drawn with the ML diagnostic plots.
//!
//! Usage: app [OUTPUT_DIR] [--show]

use std::env;
use std::f64::consts::PI;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use financeplotter::indicators::exponential_moving_average;
use financeplotter::{
    Chart, Frame, Index, add_macd, add_rsi, add_sma, create_candlestick, plot_confusion_matrix,
    plot_decision_boundary, plot_predictions, plot_roc_curve,
};

const SEED: u64 = 42;
const TRADING_DAYS: usize = 250;
const SAMPLES: usize = 100;

fn normal(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

fn trading_days(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(n);
    let mut day = start;
    while days.len() < n {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            days.push(day);
        }
        day += Duration::days(1);
    }
    days
}

/// Geometric random walk with daily OHLCV bars.
fn synthetic_ohlcv(rng: &mut StdRng, n: usize) -> Result<Frame> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2)
        .ok_or_else(|| anyhow::anyhow!("bad start date"))?;

    let mut open = Vec::with_capacity(n);
    let mut high = Vec::with_capacity(n);
    let mut low = Vec::with_capacity(n);
    let mut close = Vec::with_capacity(n);
    let mut volume = Vec::with_capacity(n);

    let mut prev = 150.0;
    for _ in 0..n {
        let o = prev * (1.0 + 0.003 * normal(rng));
        let c = o * (0.0004 + 0.015 * normal(rng)).exp();
        let h = o.max(c) * (1.0 + 0.006 * normal(rng).abs());
        let l = o.min(c) * (1.0 - 0.006 * normal(rng).abs());
        open.push(o);
        high.push(h);
        low.push(l);
        close.push(c);
        volume.push((5.0e7 * (1.0 + 0.3 * normal(rng).abs())).round());
        prev = c;
    }

    Ok(Frame::from_columns(
        Index::Dates(trading_days(start, n)),
        vec![
            ("Open", open),
            ("High", high),
            ("Low", low),
            ("Close", close),
            ("Volume", volume),
        ],
    )?)
}

/// Classifies by the closer of two class centroids.
struct NearestCentroid {
    centroids: [[f64; 2]; 2],
}

impl NearestCentroid {
    fn fit(x: &[[f64; 2]], y: &[i64]) -> Self {
        let mut sums = [[0.0; 2]; 2];
        let mut counts = [0.0; 2];
        for (p, &label) in x.iter().zip(y) {
            let k = usize::from(label == 1);
            sums[k][0] += p[0];
            sums[k][1] += p[1];
            counts[k] += 1.0;
        }
        let centroid = |k: usize| [sums[k][0] / counts[k], sums[k][1] / counts[k]];
        NearestCentroid {
            centroids: [centroid(0), centroid(1)],
        }
    }

    fn distance(&self, k: usize, p: &[f64; 2]) -> f64 {
        let c = self.centroids[k];
        ((p[0] - c[0]).powi(2) + (p[1] - c[1]).powi(2)).sqrt()
    }

    /// Probability-like score of class 1.
    fn score(&self, p: &[f64; 2]) -> f64 {
        1.0 / (1.0 + (self.distance(1, p) - self.distance(0, p)).exp())
    }
}

impl financeplotter::Classifier for NearestCentroid {
    fn predict(&self, points: &[[f64; 2]]) -> Vec<i64> {
        points.iter().map(|p| i64::from(self.score(p) > 0.5)).collect()
    }
}

fn save(chart: &Chart, dir: &Path, name: &str, show: bool) -> Result<()> {
    chart.write_html(dir.join(name))?;
    if show {
        chart.show()?;
    }
    Ok(())
}

fn main() -> Result<()> {
    financeplotter::init_logger();

    let args: Vec<String> = env::args().skip(1).collect();
    let show = args.iter().any(|a| a == "--show");
    let out_dir = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("demo_output"));

    let mut rng = StdRng::seed_from_u64(SEED);

    // Stock chart
    let data = synthetic_ohlcv(&mut rng, TRADING_DAYS)?;
    let chart = create_candlestick(data.clone(), Some("Synthetic Stock Price"), true, &[])?;
    let chart = add_sma(chart, 20, "Close")?;
    let chart = add_rsi(chart, 14, "Close")?;
    let mut chart = add_macd(chart, 12, 26, 9, "Close")?;
    chart.add_range_slider().add_zoom_pan().add_tooltips();
    save(&chart, &out_dir, "stock_analysis.html", show)?;

    // A 10-day EMA as a naive one-step forecast of the close
    let close = data.column("Close")?.to_vec();
    let mut forecast = vec![f64::NAN];
    forecast.extend(exponential_moving_average(&close, 10).into_iter().take(close.len() - 1));
    let predictions = data.with_column("Forecast", forecast)?;
    let chart = plot_predictions(predictions, "Close", "Forecast", Some("EMA Forecast"))?;
    save(&chart, &out_dir, "forecast.html", show)?;

    // Classification
    let x: Vec<[f64; 2]> = (0..SAMPLES).map(|_| [normal(&mut rng), normal(&mut rng)]).collect();
    let y: Vec<i64> = x.iter().map(|p| i64::from(p[0] + p[1] > 0.0)).collect();
    let model = NearestCentroid::fit(&x, &y);

    let y_pred = financeplotter::Classifier::predict(&model, &x);
    let y_score: Vec<f64> = x.iter().map(|p| model.score(p)).collect();

    let cm = plot_confusion_matrix(&y, &y_pred, Some("Sample Classification Results"), None)?;
    save(&cm, &out_dir, "confusion_matrix.html", show)?;

    let roc = plot_roc_curve(&y, &y_score, Some("Sample ROC Curve"))?;
    save(&roc, &out_dir, "roc_curve.html", show)?;

    let boundary = plot_decision_boundary(&x, &y, &model, None, 100)?;
    save(&boundary, &out_dir, "decision_boundary.html", show)?;

    info!("Demo charts written to {}", out_dir.display());
    Ok(())
}
