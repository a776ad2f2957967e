//! End-to-end tests: files in, charts and HTML pages out.

use std::io::Write;
use std::path::PathBuf;

use financeplotter::config::{ChartJob, ChartKind, DataConfig, DataFormat, OutputConfig};
use financeplotter::job::{build_chart, run_job};
use financeplotter::{
    Chart, IndicatorSpec, Trace, create_candlestick, plot_confusion_matrix, plot_decision_boundary,
    plot_roc_curve, read_csv, read_ohlc_file,
};
use tempfile::{NamedTempFile, tempdir};

fn ohlc_file(days: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for i in 0..days {
        let close = 100.0 + (i as f64 * 0.3).sin() * 4.0 + i as f64 * 0.1;
        let open = close - 0.5;
        writeln!(
            file,
            "202401{:02} {:.2} {:.2} {:.2} {:.2} {}",
            i + 1,
            open,
            close + 1.0,
            open - 1.0,
            close,
            1000 + i * 10
        )
        .unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn test_candlestick_from_market_file() {
    let file = ohlc_file(28);
    let data = read_ohlc_file(file.path()).unwrap();
    assert_eq!(data.len(), 28);
    assert!(data.has_column("Volume"));

    let indicators = [IndicatorSpec::sma(5), IndicatorSpec::bollinger(), IndicatorSpec::macd()];
    let mut chart = create_candlestick(data, Some("Test Stock"), true, &indicators).unwrap();
    chart.add_range_slider().add_zoom_pan().add_tooltips();

    let fig = chart.fig.as_ref().unwrap();
    let names: Vec<_> = fig.traces.iter().filter_map(Trace::name).collect();
    assert_eq!(
        names,
        vec!["OHLC", "Volume", "SMA 5", "Upper Band", "Lower Band", "MACD", "Signal", "Histogram"]
    );
    assert_eq!(fig.rows(), 2);

    let doc = fig.to_json().unwrap();
    assert_eq!(doc["data"][0]["type"], "candlestick");
    assert_eq!(doc["data"][0]["x"][0], "2024-01-01");
    assert_eq!(doc["layout"]["dragmode"], "zoom");
    assert_eq!(doc["layout"]["xaxis"]["rangeslider"]["visible"], true);
    assert_eq!(doc["data"][5]["hovertemplate"], "%{x}<br>%{y:.2f}<extra></extra>");

    let dir = tempdir().unwrap();
    let path = dir.path().join("stock.html");
    chart.write_html(&path).unwrap();
    let html = std::fs::read_to_string(&path).unwrap();
    assert!(html.contains("Plotly.newPlot"));
    assert!(html.contains("\"name\":\"Histogram\""));
}

#[test]
fn test_job_renders_line_chart_from_csv() {
    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("prices.csv");
    std::fs::write(
        &csv_path,
        "Date,Close,Volume\n2024-01-02,10,100\n2024-01-03,11,\n\
         2024-01-04,12.5,300\n2024-01-05,12,250\n",
    )
    .unwrap();

    let data = read_csv(&csv_path).unwrap();
    assert!(data.column("Volume").unwrap()[1].is_nan());

    let html_path = dir.path().join("out").join("line.html");
    let job = ChartJob {
        data: DataConfig {
            file: csv_path.clone(),
            format: DataFormat::Csv,
        },
        chart: financeplotter::config::ChartConfig {
            kind: ChartKind::Line,
            title: Some("Closes".into()),
            y: Some("Close".into()),
            ..Default::default()
        },
        indicators: vec![IndicatorSpec::sma(2), IndicatorSpec::rsi()],
        interactive: Default::default(),
        output: OutputConfig {
            html: Some(html_path.clone()),
            ..Default::default()
        },
    };

    let written = run_job(&job).unwrap();
    assert_eq!(written, vec![html_path.clone()]);
    assert!(std::fs::read_to_string(&html_path).unwrap().contains("<title>Closes</title>"));

    let chart = build_chart(&job, data).unwrap();
    let fig = chart.fig.as_ref().unwrap();
    assert_eq!(fig.rows(), 2);
    assert_eq!(fig.traces[0].name(), Some("Close"));
    assert_eq!(fig.traces[2].row(), 2);
}

#[test]
fn test_job_without_outputs_fails() {
    let job = ChartJob {
        data: DataConfig {
            file: PathBuf::from("missing.txt"),
            format: DataFormat::Ohlc,
        },
        chart: Default::default(),
        indicators: Vec::new(),
        interactive: Default::default(),
        output: Default::default(),
    };
    assert!(run_job(&job).is_err());
}

#[test]
fn test_roc_chart_html() {
    let chart = plot_roc_curve(&[0, 1, 0, 1, 1], &[0.2, 0.9, 0.4, 0.6, 0.3], Some("ROC")).unwrap();
    let html = chart.to_html().unwrap().unwrap();
    assert!(html.contains("Random"));
    assert!(html.contains("False Positive Rate"));
}

fn write_static(chart: &Chart, name: &str) {
    let dir = tempdir().unwrap();
    let svg = dir.path().join(format!("{name}.svg"));
    let png = dir.path().join(format!("{name}.png"));
    chart.write_svg(&svg, (800, 600)).unwrap();
    chart.write_png(&png, (800, 600)).unwrap();

    assert!(std::fs::read_to_string(&svg).unwrap().contains("<svg"));
    assert!(std::fs::metadata(&png).unwrap().len() > 0);
}

#[test]
fn test_ml_charts_render_static_images() {
    let y_true = [0, 1, 1, 0, 1, 0];
    let y_pred = [0, 1, 0, 0, 1, 1];
    let cm = plot_confusion_matrix(&y_true, &y_pred, None, Some(&["down", "up"])).unwrap();
    write_static(&cm, "confusion");

    let x = [[0.0, 0.0], [1.0, 0.5], [3.0, 3.5], [4.0, 3.0]];
    let y = [0, 0, 1, 1];
    let model = |p: &[f64; 2]| if p[0] + p[1] > 3.5 { 1_i64 } else { 0 };
    let boundary = plot_decision_boundary(&x, &y, &model, None, 20).unwrap();
    write_static(&boundary, "boundary");
}
