use std::path::PathBuf;

use anyhow::{Context, Result};
use charts::{Chart, create_area, create_bar, create_candlestick, create_line, create_scatter};
use frame::{Frame, read_csv, read_ohlc_file, read_price_file};
use log::info;

use crate::config::{ChartJob, ChartKind, DataConfig, DataFormat};

pub fn load_frame(data: &DataConfig) -> Result<Frame> {
    let frame = match data.format {
        DataFormat::Ohlc => read_ohlc_file(&data.file),
        DataFormat::Price => read_price_file(&data.file),
        DataFormat::Csv => read_csv(&data.file),
    }
    .with_context(|| format!("failed to load {}", data.file.display()))?;

    info!(
        "Loaded {} rows ({}) from {}",
        frame.len(),
        frame.column_names().join(", "),
        data.file.display()
    );
    Ok(frame)
}

/// Build the chart a job describes from already loaded data.
pub fn build_chart(job: &ChartJob, data: Frame) -> Result<Chart> {
    let c = &job.chart;
    let title = c.title.as_deref();
    let (x, y) = (c.x.as_deref(), c.y.as_deref());

    let mut chart = match c.kind {
        ChartKind::Candlestick => create_candlestick(data, title, c.volume, &job.indicators)?,
        ChartKind::Line => create_line(data, title, x, y)?,
        ChartKind::Bar => create_bar(data, title, x, y)?,
        ChartKind::Area => create_area(data, title, x, y)?,
        ChartKind::Scatter => create_scatter(data, title, x, y, c.color.as_deref())?,
    };
    if c.kind != ChartKind::Candlestick {
        for spec in &job.indicators {
            chart = spec.apply(chart)?;
        }
    }

    let interactive = &job.interactive;
    if interactive.range_slider {
        chart.add_range_slider();
    }
    if interactive.zoom_pan {
        chart.add_zoom_pan();
    }
    if interactive.tooltips {
        chart.add_tooltips();
    }
    Ok(chart)
}

/// Validate, load, build and write every configured output. Returns the files written.
pub fn run_job(job: &ChartJob) -> Result<Vec<PathBuf>> {
    job.validate()?;
    let data = load_frame(&job.data)?;
    let chart = build_chart(job, data)?;

    let out = &job.output;
    let size = (out.width, out.height);
    let mut written = Vec::new();

    if let Some(path) = &out.html {
        chart
            .write_html(path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path.clone());
    }
    if let Some(path) = &out.svg {
        chart
            .write_svg(path, size)
            .with_context(|| format!("failed to render {}", path.display()))?;
        written.push(path.clone());
    }
    if let Some(path) = &out.png {
        chart
            .write_png(path, size)
            .with_context(|| format!("failed to render {}", path.display()))?;
        written.push(path.clone());
    }
    Ok(written)
}
