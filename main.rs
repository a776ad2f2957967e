use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use financeplotter::IndicatorSpec;
use financeplotter::config::{
    ChartConfig, ChartJob, DataConfig, DataFormat, InteractiveConfig, OutputConfig,
};
use financeplotter::job::run_job;

#[path = "entrypoint_helper.rs"]
mod entrypoint_helper;

use entrypoint_helper::{Cli, Commands};

fn main() -> Result<()> {
    financeplotter::init_logger();
    let cli = Cli::parse();

    match cli.command {
        Commands::Render { config } => {
            let job = ChartJob::from_file(&config)?;
            info!("Rendering job {}", config.display());
            report(run_job(&job)?);
        }

        Commands::Candlestick {
            data_file,
            title,
            sma,
            ema,
            rsi,
            macd,
            bollinger,
            no_volume,
            range_slider,
            zoom_pan,
            tooltips,
            html,
            svg,
            png,
            width,
            height,
        } => {
            let mut indicators: Vec<IndicatorSpec> =
                sma.into_iter().map(IndicatorSpec::sma).collect();
            indicators.extend(ema.into_iter().map(IndicatorSpec::ema));
            if bollinger {
                indicators.push(IndicatorSpec::bollinger());
            }
            if rsi {
                indicators.push(IndicatorSpec::rsi());
            }
            if macd {
                indicators.push(IndicatorSpec::macd());
            }

            let format = DataFormat::from_path(&data_file);
            let job = ChartJob {
                data: DataConfig { file: data_file, format },
                chart: ChartConfig {
                    title,
                    volume: !no_volume,
                    ..Default::default()
                },
                indicators,
                interactive: InteractiveConfig {
                    range_slider,
                    zoom_pan,
                    tooltips,
                },
                output: OutputConfig {
                    html,
                    svg,
                    png,
                    width,
                    height,
                },
            };
            report(run_job(&job)?);
        }

        Commands::DemoJob { output } => {
            ChartJob::sample()
                .to_file(&output)
                .with_context(|| format!("could not create {}", output.display()))?;
            println!("Wrote sample job to {}", output.display());
        }
    }

    Ok(())
}

fn report(written: Vec<std::path::PathBuf>) {
    for path in written {
        println!("Wrote {}", path.display());
    }
}
