//! Technical indicator overlays.
//!
//! Moving averages and bands are drawn over the price in row 1; oscillators
//! (RSI, MACD) go to row 2, which is created when the chart has a single row.

use indicators::{bollinger_bands, exponential_moving_average, macd, moving_average, rsi};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::chart::Chart;
use crate::error::{PlotError, Result};
use crate::figure::{AxisValues, Bar, Dash, Figure, Fill, Line, Scatter};

pub const DEFAULT_COLUMN: &str = "Close";
pub const DEFAULT_MA_PERIOD: usize = 20;
pub const DEFAULT_RSI_PERIOD: usize = 14;
pub const DEFAULT_MACD_FAST: usize = 12;
pub const DEFAULT_MACD_SLOW: usize = 26;
pub const DEFAULT_MACD_SIGNAL: usize = 9;
pub const DEFAULT_BOLLINGER_STD: f64 = 2.0;

pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;

/// Row oscillators are drawn in.
const OSCILLATOR_ROW: usize = 2;

fn check_period(what: &str, period: usize) -> Result<()> {
    if period == 0 {
        return Err(PlotError::InvalidParameter(format!("{} period must be positive", what)));
    }
    Ok(())
}

/// Runs `draw` on the chart's figure with the index as x values and the
/// requested column; charts without a figure pass through untouched.
fn overlay<F>(mut chart: Chart, column: &str, draw: F) -> Result<Chart>
where
    F: FnOnce(&mut Figure, AxisValues, &[f64]) -> Result<()>,
{
    if let Some(fig) = chart.fig.as_mut() {
        let values = chart.data.column(column)?;
        let x = AxisValues::from_index(chart.data.index());
        draw(fig, x, values)?;
    }
    Ok(chart)
}

/// Simple moving average of `column` over `period` rows.
pub fn add_sma(chart: Chart, period: usize, column: &str) -> Result<Chart> {
    check_period("SMA", period)?;
    overlay(chart, column, |fig, x, values| {
        let sma = moving_average(values, period);
        fig.add_trace(Scatter::new(format!("SMA {}", period), x, sma).line(Line::width(1.0)));
        debug!("added SMA {} on {}", period, column);
        Ok(())
    })
}

/// Exponential moving average of `column` with span `period`.
pub fn add_ema(chart: Chart, period: usize, column: &str) -> Result<Chart> {
    check_period("EMA", period)?;
    overlay(chart, column, |fig, x, values| {
        let ema = exponential_moving_average(values, period);
        fig.add_trace(Scatter::new(format!("EMA {}", period), x, ema).line(Line::width(1.0)));
        debug!("added EMA {} on {}", period, column);
        Ok(())
    })
}

/// RSI in the oscillator row with overbought/oversold guides at 70 and 30.
pub fn add_rsi(chart: Chart, period: usize, column: &str) -> Result<Chart> {
    check_period("RSI", period)?;
    overlay(chart, column, |fig, x, values| {
        let rsi = rsi(values, period);
        fig.ensure_rows(OSCILLATOR_ROW);
        fig.add_trace_at(Scatter::new("RSI", x, rsi).line(Line::width(1.0)), OSCILLATOR_ROW)?;
        fig.add_hline(RSI_OVERBOUGHT, Dash::Dash, "red", OSCILLATOR_ROW)?;
        fig.add_hline(RSI_OVERSOLD, Dash::Dash, "green", OSCILLATOR_ROW)?;
        debug!("added RSI {} on {}", period, column);
        Ok(())
    })
}

/// MACD line, signal line and histogram in the oscillator row.
pub fn add_macd(
    chart: Chart,
    fast: usize,
    slow: usize,
    signal: usize,
    column: &str,
) -> Result<Chart> {
    check_period("MACD fast", fast)?;
    check_period("MACD slow", slow)?;
    check_period("MACD signal", signal)?;
    if fast >= slow {
        return Err(PlotError::InvalidParameter(format!(
            "MACD fast period {} must be shorter than slow period {}",
            fast, slow
        )));
    }

    overlay(chart, column, |fig, x, values| {
        let out = macd(values, fast, slow, signal);
        fig.ensure_rows(OSCILLATOR_ROW);
        fig.add_trace_at(
            Scatter::new("MACD", x.clone(), out.macd_line).line(Line::width(1.0)),
            OSCILLATOR_ROW,
        )?;
        fig.add_trace_at(
            Scatter::new("Signal", x.clone(), out.signal_line).line(Line::width(1.0)),
            OSCILLATOR_ROW,
        )?;
        fig.add_trace_at(Bar::new("Histogram", x, out.histogram), OSCILLATOR_ROW)?;
        debug!("added MACD {}/{}/{} on {}", fast, slow, signal, column);
        Ok(())
    })
}

/// Dashed upper and lower bands, the area between them filled.
pub fn add_bollinger_bands(
    chart: Chart,
    period: usize,
    std_dev: f64,
    column: &str,
) -> Result<Chart> {
    check_period("Bollinger", period)?;
    if !std_dev.is_finite() || std_dev < 0.0 {
        return Err(PlotError::InvalidParameter(format!(
            "Bollinger band width {} must be a non-negative number",
            std_dev
        )));
    }

    overlay(chart, column, |fig, x, values| {
        let bands = bollinger_bands(values, period, std_dev);
        fig.add_trace(
            Scatter::new("Upper Band", x.clone(), bands.upper_band).line(Line::width(1.0).dashed()),
        );
        fig.add_trace(
            Scatter::new("Lower Band", x, bands.lower_band)
                .line(Line::width(1.0).dashed())
                .fill(Fill::ToNextY),
        );
        debug!("added Bollinger bands {} x{} on {}", period, std_dev, column);
        Ok(())
    })
}

fn default_column() -> String {
    DEFAULT_COLUMN.to_string()
}

fn default_ma_period() -> usize {
    DEFAULT_MA_PERIOD
}

fn default_rsi_period() -> usize {
    DEFAULT_RSI_PERIOD
}

fn default_fast() -> usize {
    DEFAULT_MACD_FAST
}

fn default_slow() -> usize {
    DEFAULT_MACD_SLOW
}

fn default_signal() -> usize {
    DEFAULT_MACD_SIGNAL
}

fn default_std_dev() -> f64 {
    DEFAULT_BOLLINGER_STD
}

/// An indicator overlay with its parameters, as named in job files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum IndicatorSpec {
    Sma {
        #[serde(default = "default_ma_period")]
        period: usize,
        #[serde(default = "default_column")]
        column: String,
    },
    Ema {
        #[serde(default = "default_ma_period")]
        period: usize,
        #[serde(default = "default_column")]
        column: String,
    },
    Rsi {
        #[serde(default = "default_rsi_period")]
        period: usize,
        #[serde(default = "default_column")]
        column: String,
    },
    Macd {
        #[serde(default = "default_fast")]
        fast: usize,
        #[serde(default = "default_slow")]
        slow: usize,
        #[serde(default = "default_signal")]
        signal: usize,
        #[serde(default = "default_column")]
        column: String,
    },
    Bollinger {
        #[serde(default = "default_ma_period")]
        period: usize,
        #[serde(default = "default_std_dev")]
        std_dev: f64,
        #[serde(default = "default_column")]
        column: String,
    },
}

impl IndicatorSpec {
    pub fn sma(period: usize) -> Self {
        IndicatorSpec::Sma {
            period,
            column: default_column(),
        }
    }

    pub fn ema(period: usize) -> Self {
        IndicatorSpec::Ema {
            period,
            column: default_column(),
        }
    }

    pub fn rsi() -> Self {
        IndicatorSpec::Rsi {
            period: DEFAULT_RSI_PERIOD,
            column: default_column(),
        }
    }

    pub fn macd() -> Self {
        IndicatorSpec::Macd {
            fast: DEFAULT_MACD_FAST,
            slow: DEFAULT_MACD_SLOW,
            signal: DEFAULT_MACD_SIGNAL,
            column: default_column(),
        }
    }

    pub fn bollinger() -> Self {
        IndicatorSpec::Bollinger {
            period: DEFAULT_MA_PERIOD,
            std_dev: DEFAULT_BOLLINGER_STD,
            column: default_column(),
        }
    }

    /// Whether the overlay draws in the oscillator row.
    pub fn needs_oscillator_row(&self) -> bool {
        matches!(self, IndicatorSpec::Rsi { .. } | IndicatorSpec::Macd { .. })
    }

    pub fn apply(&self, chart: Chart) -> Result<Chart> {
        match self {
            IndicatorSpec::Sma { period, column } => add_sma(chart, *period, column),
            IndicatorSpec::Ema { period, column } => add_ema(chart, *period, column),
            IndicatorSpec::Rsi { period, column } => add_rsi(chart, *period, column),
            IndicatorSpec::Macd {
                fast,
                slow,
                signal,
                column,
            } => add_macd(chart, *fast, *slow, *signal, column),
            IndicatorSpec::Bollinger {
                period,
                std_dev,
                column,
            } => add_bollinger_bands(chart, *period, *std_dev, column),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::Trace;
    use frame::{Frame, FrameError, Index};

    fn price_chart(n: usize) -> Chart {
        let close: Vec<f64> = (0..n).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let data =
            Frame::from_columns(Index::Positional(n), vec![("Close", close.clone())]).unwrap();
        let mut fig = Figure::new();
        fig.add_trace(Scatter::new("Close", AxisValues::from_index(data.index()), close));
        Chart::with_figure(data, None, fig)
    }

    fn trace_names(chart: &Chart) -> Vec<&str> {
        chart.fig.as_ref().unwrap().traces.iter().filter_map(Trace::name).collect()
    }

    #[test]
    fn test_add_sma_and_ema() {
        let chart = add_sma(price_chart(30), 5, "Close").unwrap();
        let chart = add_ema(chart, 10, "Close").unwrap();
        assert_eq!(trace_names(&chart), vec!["Close", "SMA 5", "EMA 10"]);

        let fig = chart.fig.as_ref().unwrap();
        let Trace::Scatter(sma) = &fig.traces[1] else {
            panic!("expected a scatter");
        };
        assert_eq!(sma.common.row, 1);
        assert_eq!(sma.line.as_ref().unwrap().width, Some(1.0));
        assert!(sma.y[3].is_nan());
        assert!(!sma.y[4].is_nan());
    }

    #[test]
    fn test_add_rsi_creates_oscillator_row() {
        let chart = add_rsi(price_chart(30), DEFAULT_RSI_PERIOD, "Close").unwrap();
        let fig = chart.fig.as_ref().unwrap();

        assert_eq!(fig.rows(), 2);
        assert_eq!(fig.traces.last().unwrap().row(), 2);
        assert_eq!(fig.layout.shapes.len(), 2);
        assert_eq!(fig.layout.shapes[0].y, 70.0);
        assert_eq!(fig.layout.shapes[0].color, "red");
        assert_eq!(fig.layout.shapes[1].y, 30.0);
        assert_eq!(fig.layout.shapes[1].color, "green");
        assert!(fig.layout.shapes.iter().all(|s| s.row == 2 && s.dash == Dash::Dash));
    }

    #[test]
    fn test_add_macd_traces() {
        let chart = add_macd(price_chart(40), 12, 26, 9, "Close").unwrap();
        assert_eq!(trace_names(&chart), vec!["Close", "MACD", "Signal", "Histogram"]);
        let fig = chart.fig.as_ref().unwrap();
        assert!(matches!(fig.traces[3], Trace::Bar(_)));
        assert!(fig.traces[1..].iter().all(|t| t.row() == 2));
    }

    #[test]
    fn test_add_macd_rejects_inverted_periods() {
        let err = add_macd(price_chart(40), 26, 12, 9, "Close").unwrap_err();
        assert!(matches!(err, PlotError::InvalidParameter(_)));
    }

    #[test]
    fn test_add_bollinger_bands_fill() {
        let chart = add_bollinger_bands(price_chart(30), 20, 2.0, "Close").unwrap();
        let fig = chart.fig.as_ref().unwrap();
        let Trace::Scatter(lower) = &fig.traces[2] else {
            panic!("expected a scatter");
        };
        assert_eq!(lower.common.name.as_deref(), Some("Lower Band"));
        assert_eq!(lower.fill, Some(Fill::ToNextY));
        assert_eq!(lower.line.as_ref().unwrap().dash, Some(Dash::Dash));
        assert_eq!(fig.rows(), 1);
    }

    #[test]
    fn test_overlay_errors() {
        let err = add_sma(price_chart(10), 5, "Open").unwrap_err();
        assert!(matches!(err, PlotError::Frame(FrameError::ColumnNotFound(_))));

        let err = add_ema(price_chart(10), 0, "Close").unwrap_err();
        assert!(matches!(err, PlotError::InvalidParameter(_)));
    }

    #[test]
    fn test_chart_without_figure_passes_through() {
        let data = Frame::new(Index::Positional(0));
        let chart = add_rsi(Chart::new(data, Some("empty")), 14, "Close").unwrap();
        assert!(chart.fig.is_none());
        assert_eq!(chart.title.as_deref(), Some("empty"));
    }

    #[test]
    fn test_indicator_spec_defaults_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            indicators: Vec<IndicatorSpec>,
        }

        let parsed: Wrapper = toml::from_str(
            r#"
            [[indicators]]
            kind = "sma"
            period = 50

            [[indicators]]
            kind = "macd"
            fast = 5

            [[indicators]]
            kind = "bollinger"
            "#,
        )
        .unwrap();

        assert_eq!(parsed.indicators[0], IndicatorSpec::sma(50));
        assert_eq!(
            parsed.indicators[1],
            IndicatorSpec::Macd {
                fast: 5,
                slow: 26,
                signal: 9,
                column: "Close".into()
            }
        );
        assert_eq!(parsed.indicators[2], IndicatorSpec::bollinger());
        assert!(parsed.indicators[1].needs_oscillator_row());
    }

    #[test]
    fn test_indicator_spec_apply() {
        let chart = IndicatorSpec::rsi().apply(price_chart(30)).unwrap();
        assert_eq!(trace_names(&chart), vec!["Close", "RSI"]);
    }
}
