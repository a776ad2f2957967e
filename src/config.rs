//! Chart job files.
//!
//! A job names a data file, the chart to build from it, the indicator
//! overlays, the interactive features and where to write the result.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use charts::IndicatorSpec;
use serde::{Deserialize, Serialize};

/// How the data file is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    /// `YYYYMMDD Open High Low Close [Volume]` lines.
    Ohlc,
    /// `YYYYMMDD Price` lines.
    Price,
    /// Header row, index in the first column.
    #[default]
    Csv,
}

impl DataFormat {
    /// `.csv` files are CSV, anything else is taken as OHLC lines.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => DataFormat::Csv,
            _ => DataFormat::Ohlc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Candlestick,
    Line,
    Bar,
    Area,
    Scatter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    pub file: PathBuf,

    #[serde(default)]
    pub format: DataFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default)]
    pub kind: ChartKind,

    pub title: Option<String>,

    /// Volume row under a candlestick chart
    #[serde(default = "default_volume")]
    pub volume: bool,

    /// Column for the x axis (default: the index)
    pub x: Option<String>,

    /// Column for the y axis (default: the first column)
    pub y: Option<String>,

    /// Column colouring scatter markers
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractiveConfig {
    #[serde(default)]
    pub range_slider: bool,

    #[serde(default)]
    pub zoom_pan: bool,

    #[serde(default)]
    pub tooltips: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub html: Option<PathBuf>,
    pub svg: Option<PathBuf>,
    pub png: Option<PathBuf>,

    /// Static image width in pixels
    #[serde(default = "default_width")]
    pub width: u32,

    /// Static image height in pixels
    #[serde(default = "default_height")]
    pub height: u32,
}

/// A complete chart job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartJob {
    pub data: DataConfig,

    #[serde(default)]
    pub chart: ChartConfig,

    #[serde(default)]
    pub indicators: Vec<IndicatorSpec>,

    #[serde(default)]
    pub interactive: InteractiveConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

fn default_volume() -> bool { true }
fn default_width() -> u32 { 1200 }
fn default_height() -> u32 { 800 }

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            kind: ChartKind::default(),
            title: None,
            volume: default_volume(),
            x: None,
            y: None,
            color: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            html: None,
            svg: None,
            png: None,
            width: default_width(),
            height: default_height(),
        }
    }
}

impl ChartJob {
    /// A candlestick job with the usual overlays, written to `chart.html`.
    pub fn sample() -> Self {
        Self {
            data: DataConfig {
                file: PathBuf::from("data/prices.txt"),
                format: DataFormat::Ohlc,
            },
            chart: ChartConfig {
                title: Some("Price History".to_string()),
                ..Default::default()
            },
            indicators: vec![
                IndicatorSpec::sma(20),
                IndicatorSpec::ema(50),
                IndicatorSpec::bollinger(),
                IndicatorSpec::rsi(),
            ],
            interactive: InteractiveConfig {
                range_slider: true,
                zoom_pan: true,
                tooltips: true,
            },
            output: OutputConfig {
                html: Some(PathBuf::from("chart.html")),
                ..Default::default()
            },
        }
    }

    /// Reject jobs that cannot produce a chart.
    pub fn validate(&self) -> Result<()> {
        let out = &self.output;
        if out.html.is_none() && out.svg.is_none() && out.png.is_none() {
            bail!("no output configured: set at least one of output.html, output.svg, output.png");
        }
        if (out.svg.is_some() || out.png.is_some()) && (out.width == 0 || out.height == 0) {
            bail!("image size must be positive, got {}x{}", out.width, out.height);
        }

        let chart = &self.chart;
        if chart.color.is_some() && chart.kind != ChartKind::Scatter {
            bail!("chart.color only applies to scatter charts");
        }
        if chart.kind == ChartKind::Candlestick && (chart.x.is_some() || chart.y.is_some()) {
            bail!(
                "candlestick charts take their axes from the OHLC columns; remove chart.x / chart.y"
            );
        }

        let oscillators = self
            .indicators
            .iter()
            .filter(|spec| spec.needs_oscillator_row())
            .count();
        if oscillators > 1 {
            log::warn!("{} oscillators share the second row", oscillators);
        }
        Ok(())
    }

    /// Load a job from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read job file {}", path.display()))?;
        let job: ChartJob = toml::from_str(&content)
            .with_context(|| format!("failed to parse job file {}", path.display()))?;
        Ok(job)
    }

    /// Save the job to a TOML file.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        frame::write_file(path.as_ref(), content)
            .with_context(|| format!("failed to write job file {}", path.as_ref().display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_job_defaults() {
        let job: ChartJob = toml::from_str(
            r#"
            [data]
            file = "prices.csv"

            [output]
            html = "out.html"
            "#,
        )
        .unwrap();

        assert_eq!(job.data.format, DataFormat::Csv);
        assert_eq!(job.chart.kind, ChartKind::Candlestick);
        assert!(job.chart.volume);
        assert!(job.indicators.is_empty());
        assert_eq!(job.interactive, InteractiveConfig::default());
        assert_eq!((job.output.width, job.output.height), (1200, 800));
        assert!(job.validate().is_ok());
    }

    #[test]
    fn test_job_validation() {
        let mut job = ChartJob::sample();
        assert!(job.validate().is_ok());

        job.output.html = None;
        assert!(job.validate().is_err());

        job.output.svg = Some(PathBuf::from("out.svg"));
        job.output.width = 0;
        assert!(job.validate().is_err());

        job.output.width = 640;
        job.chart.color = Some("Volume".into());
        assert!(job.validate().is_err());

        job.chart.kind = ChartKind::Scatter;
        assert!(job.validate().is_ok());
    }

    #[test]
    fn test_job_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.toml");

        let job = ChartJob::sample();
        job.to_file(&path).unwrap();
        let loaded = ChartJob::from_file(&path).unwrap();
        assert_eq!(loaded, job);
    }

    #[test]
    fn test_data_format_from_path() {
        assert_eq!(DataFormat::from_path(Path::new("a/b.CSV")), DataFormat::Csv);
        assert_eq!(DataFormat::from_path(Path::new("prices.txt")), DataFormat::Ohlc);
    }
}
