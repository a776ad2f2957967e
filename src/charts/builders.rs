use frame::Frame;
use log::{debug, warn};

use crate::chart::Chart;
use crate::error::Result;
use crate::figure::{
    AxisValues, Bar, Candlestick, Fill, Figure, Marker, Mode, Scatter, TraceCommon, make_subplots,
};
use crate::overlays::IndicatorSpec;

/// Gap between the price and volume rows of a candlestick chart.
pub const PRICE_ROW_SPACING: f64 = 0.03;

/// Candlestick chart of the `Open`/`High`/`Low`/`Close` columns.
///
/// With `volume` the figure gets a second row (30% of the height) holding the
/// `Volume` column as bars, when the frame has one. The indicator overlays are
/// applied in order afterwards.
pub fn create_candlestick(
    data: Frame,
    title: Option<&str>,
    volume: bool,
    indicators: &[IndicatorSpec],
) -> Result<Chart> {
    let heights = if volume { vec![0.7, 0.3] } else { vec![1.0] };
    let rows = heights.len();
    let mut fig = make_subplots(rows, &heights, PRICE_ROW_SPACING, true)?;

    let x = AxisValues::from_index(data.index());
    fig.add_trace_at(
        Candlestick {
            common: TraceCommon {
                name: Some("OHLC".to_string()),
                ..Default::default()
            },
            x: x.clone(),
            open: data.column("Open")?.to_vec(),
            high: data.column("High")?.to_vec(),
            low: data.column("Low")?.to_vec(),
            close: data.column("Close")?.to_vec(),
        },
        1,
    )?;

    if volume {
        match data.column("Volume") {
            Ok(v) => fig.add_trace_at(Bar::new("Volume", x, v.to_vec()), 2)?,
            Err(_) => warn!("no Volume column, leaving the volume row empty"),
        }
    }

    fig.layout.set_title(title);
    fig.layout.set_y_title(1, Some("Price"));
    if volume {
        fig.layout.set_y_title(2, Some("Volume"));
    }
    fig.layout.rangeslider.insert(1, false);

    debug!("candlestick chart with {} rows over {} bars", rows, data.len());
    let mut chart = Chart::with_figure(data, title, fig);
    for spec in indicators {
        chart = spec.apply(chart)?;
    }
    Ok(chart)
}

/// The x values (named column or the index), y values (named column or the
/// first column) and the trace name.
fn xy_series(
    data: &Frame,
    x: Option<&str>,
    y: Option<&str>,
) -> Result<(AxisValues, Vec<f64>, String)> {
    let xs = match x {
        Some(name) => AxisValues::Numbers(data.column(name)?.to_vec()),
        None => AxisValues::from_index(data.index()),
    };
    let (name, ys) = match y {
        Some(name) => (name.to_string(), data.column(name)?.to_vec()),
        None => {
            let first = data.first_column()?;
            (first.name.clone(), first.values.clone())
        }
    };
    Ok((xs, ys, name))
}

fn single_trace_chart(
    data: Frame,
    title: Option<&str>,
    x: Option<&str>,
    y: Option<&str>,
    fig: Figure,
) -> Chart {
    let mut fig = fig;
    fig.layout.set_title(title);
    fig.layout.set_x_title(1, x);
    fig.layout.set_y_title(1, y);
    Chart::with_figure(data, title, fig)
}

pub fn create_line(
    data: Frame,
    title: Option<&str>,
    x: Option<&str>,
    y: Option<&str>,
) -> Result<Chart> {
    let (xs, ys, name) = xy_series(&data, x, y)?;
    let mut fig = Figure::new();
    fig.add_trace(Scatter::new(name, xs, ys).mode(Mode::Lines));
    Ok(single_trace_chart(data, title, x, y, fig))
}

pub fn create_bar(
    data: Frame,
    title: Option<&str>,
    x: Option<&str>,
    y: Option<&str>,
) -> Result<Chart> {
    let (xs, ys, name) = xy_series(&data, x, y)?;
    let mut fig = Figure::new();
    fig.add_trace(Bar::new(name, xs, ys));
    Ok(single_trace_chart(data, title, x, y, fig))
}

/// Line chart filled down to zero.
pub fn create_area(
    data: Frame,
    title: Option<&str>,
    x: Option<&str>,
    y: Option<&str>,
) -> Result<Chart> {
    let (xs, ys, name) = xy_series(&data, x, y)?;
    let mut fig = Figure::new();
    fig.add_trace(Scatter::new(name, xs, ys).fill(Fill::ToZeroY));
    Ok(single_trace_chart(data, title, x, y, fig))
}

/// Marker plot; with `color` the markers are coloured by that column on a
/// Viridis scale and a colour bar is shown.
pub fn create_scatter(
    data: Frame,
    title: Option<&str>,
    x: Option<&str>,
    y: Option<&str>,
    color: Option<&str>,
) -> Result<Chart> {
    let (xs, ys, name) = xy_series(&data, x, y)?;
    let marker = Marker {
        size: None,
        color: color.map(|c| data.column(c).map(<[f64]>::to_vec)).transpose()?,
        colorscale: Some("Viridis".to_string()),
        showscale: Some(color.is_some()),
    };

    let mut fig = Figure::new();
    fig.add_trace(Scatter::new(name, xs, ys).mode(Mode::Markers).marker(marker));
    Ok(single_trace_chart(data, title, x, y, fig))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlotError;
    use crate::figure::Trace;
    use frame::{FrameError, Index};

    fn ohlcv(n: usize, with_volume: bool) -> Frame {
        let close: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
        let mut columns = vec![
            ("Open", close.iter().map(|c| c - 0.5).collect::<Vec<_>>()),
            ("High", close.iter().map(|c| c + 1.0).collect()),
            ("Low", close.iter().map(|c| c - 1.0).collect()),
            ("Close", close.clone()),
        ];
        if with_volume {
            columns.push(("Volume", vec![1000.0; n]));
        }
        Frame::from_columns(Index::Positional(n), columns).unwrap()
    }

    #[test]
    fn test_candlestick_with_volume() {
        let chart = create_candlestick(ohlcv(30, true), Some("Stock"), true, &[]).unwrap();
        let fig = chart.fig.as_ref().unwrap();

        assert_eq!(fig.rows(), 2);
        assert_eq!(fig.grid.row_heights, vec![0.7, 0.3]);
        assert_eq!(fig.traces.len(), 2);
        assert!(matches!(fig.traces[0], Trace::Candlestick(_)));
        assert_eq!(fig.traces[0].name(), Some("OHLC"));
        assert_eq!(fig.traces[1].name(), Some("Volume"));
        assert_eq!(fig.traces[1].row(), 2);
        assert_eq!(fig.layout.y_titles.get(&1).map(String::as_str), Some("Price"));
        assert_eq!(fig.layout.y_titles.get(&2).map(String::as_str), Some("Volume"));
        assert_eq!(fig.layout.rangeslider.get(&1), Some(&false));
        assert_eq!(chart.title.as_deref(), Some("Stock"));
    }

    #[test]
    fn test_candlestick_without_volume_column() {
        let chart = create_candlestick(ohlcv(10, false), None, true, &[]).unwrap();
        let fig = chart.fig.as_ref().unwrap();
        assert_eq!(fig.rows(), 2);
        assert_eq!(fig.traces.len(), 1);

        let chart = create_candlestick(ohlcv(10, true), None, false, &[]).unwrap();
        let fig = chart.fig.as_ref().unwrap();
        assert_eq!(fig.rows(), 1);
        assert_eq!(fig.traces.len(), 1);
        assert!(fig.layout.y_titles.get(&2).is_none());
    }

    #[test]
    fn test_candlestick_applies_indicators() {
        let specs = [IndicatorSpec::sma(5), IndicatorSpec::rsi()];
        let chart = create_candlestick(ohlcv(30, false), None, false, &specs).unwrap();
        let fig = chart.fig.as_ref().unwrap();
        let names: Vec<_> = fig.traces.iter().filter_map(Trace::name).collect();
        assert_eq!(names, vec!["OHLC", "SMA 5", "RSI"]);
        assert_eq!(fig.rows(), 2);
    }

    #[test]
    fn test_candlestick_missing_ohlc() {
        let data =
            Frame::from_columns(Index::Positional(2), vec![("Close", vec![1.0, 2.0])]).unwrap();
        let err = create_candlestick(data, None, true, &[]).unwrap_err();
        assert!(matches!(err, PlotError::Frame(FrameError::ColumnNotFound(c)) if c == "Open"));
    }

    #[test]
    fn test_line_defaults_to_index_and_first_column() {
        let data = Frame::from_columns(
            Index::Labels(vec!["a".into(), "b".into()]),
            vec![("Price", vec![1.0, 2.0]), ("Other", vec![3.0, 4.0])],
        )
        .unwrap();
        let chart = create_line(data, Some("Line"), None, None).unwrap();
        let fig = chart.fig.as_ref().unwrap();
        let Trace::Scatter(s) = &fig.traces[0] else {
            panic!("expected a scatter");
        };
        assert_eq!(s.common.name.as_deref(), Some("Price"));
        assert_eq!(s.mode, Some(Mode::Lines));
        assert_eq!(s.x, AxisValues::Text(vec!["a".into(), "b".into()]));
        assert!(fig.layout.x_titles.is_empty());
    }

    #[test]
    fn test_area_and_bar_with_named_columns() {
        let data = Frame::from_columns(
            Index::Positional(3),
            vec![("t", vec![1.0, 2.0, 3.0]), ("v", vec![5.0, 6.0, 7.0])],
        )
        .unwrap();

        let chart = create_area(data.clone(), None, Some("t"), Some("v")).unwrap();
        let fig = chart.fig.as_ref().unwrap();
        let Trace::Scatter(s) = &fig.traces[0] else {
            panic!("expected a scatter");
        };
        assert_eq!(s.fill, Some(Fill::ToZeroY));
        assert_eq!(s.x, AxisValues::Numbers(vec![1.0, 2.0, 3.0]));
        assert_eq!(fig.layout.x_titles.get(&1).map(String::as_str), Some("t"));
        assert_eq!(fig.layout.y_titles.get(&1).map(String::as_str), Some("v"));

        let chart = create_bar(data, None, None, Some("v")).unwrap();
        assert!(matches!(chart.fig.as_ref().unwrap().traces[0], Trace::Bar(_)));
    }

    #[test]
    fn test_scatter_colour_column() {
        let data = Frame::from_columns(
            Index::Positional(2),
            vec![("x", vec![1.0, 2.0]), ("y", vec![3.0, 4.0]), ("c", vec![0.0, 1.0])],
        )
        .unwrap();

        let chart = create_scatter(data.clone(), None, Some("x"), Some("y"), Some("c")).unwrap();
        let Trace::Scatter(s) = &chart.fig.as_ref().unwrap().traces[0] else {
            panic!("expected a scatter");
        };
        let marker = s.marker.as_ref().unwrap();
        assert_eq!(s.mode, Some(Mode::Markers));
        assert_eq!(marker.color, Some(vec![0.0, 1.0]));
        assert_eq!(marker.colorscale.as_deref(), Some("Viridis"));
        assert_eq!(marker.showscale, Some(true));

        let err = create_scatter(data, None, Some("x"), Some("y"), Some("missing")).unwrap_err();
        assert!(matches!(err, PlotError::Frame(FrameError::ColumnNotFound(_))));
    }

    #[test]
    fn test_builders_reject_frames_without_columns() {
        let err = create_line(Frame::new(Index::Positional(0)), None, None, None).unwrap_err();
        assert!(matches!(err, PlotError::Frame(FrameError::NoColumns)));
    }
}
