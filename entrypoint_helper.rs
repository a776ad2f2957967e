use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Interactive financial charts with technical indicators
#[derive(Parser, Debug)]
#[command(name = "financeplotter")]
#[command(
    about = "Build candlestick, line, bar, area and scatter charts with indicator overlays",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render the chart described by a TOML job file
    Render {
        /// Path to the job file
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Candlestick chart of an OHLC file with indicator overlays
    Candlestick {
        /// Path to market data (YYYYMMDD Open High Low Close [Volume], or .csv)
        #[arg(short, long)]
        data_file: PathBuf,

        /// Chart title
        #[arg(short, long)]
        title: Option<String>,

        /// Add a simple moving average with this period (repeatable)
        #[arg(long)]
        sma: Vec<usize>,

        /// Add an exponential moving average with this span (repeatable)
        #[arg(long)]
        ema: Vec<usize>,

        /// Add RSI(14) below the price
        #[arg(long)]
        rsi: bool,

        /// Add MACD(12, 26, 9) below the price
        #[arg(long)]
        macd: bool,

        /// Add Bollinger bands (20, 2.0)
        #[arg(long)]
        bollinger: bool,

        /// Leave out the volume row
        #[arg(long)]
        no_volume: bool,

        /// Show a range slider under the x axis
        #[arg(long)]
        range_slider: bool,

        /// Enable zoom and pan controls
        #[arg(long)]
        zoom_pan: bool,

        /// Enable hover tooltips
        #[arg(long)]
        tooltips: bool,

        /// Write an interactive HTML page
        #[arg(long)]
        html: Option<PathBuf>,

        /// Write a static SVG image
        #[arg(long)]
        svg: Option<PathBuf>,

        /// Write a static PNG image
        #[arg(long)]
        png: Option<PathBuf>,

        /// Static image width in pixels
        #[arg(long, default_value_t = 1200)]
        width: u32,

        /// Static image height in pixels
        #[arg(long, default_value_t = 800)]
        height: u32,
    },

    /// Write a sample job file to start from
    DemoJob {
        /// Where to write the job file
        #[arg(short, long, default_value = "job.toml")]
        output: PathBuf,
    },
}
