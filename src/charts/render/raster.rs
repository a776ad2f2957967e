//! Static rendering of a [`Figure`] through `plotters`.
//!
//! Each subplot row becomes its own cartesian panel, stacked with the grid's
//! row heights and spacing. Category axes (dates, labels) are drawn on their
//! positions `0..n` and labelled through a formatter.

use std::path::Path;

use plotters::coord::Shift;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::color::{
    Colorscale, DECREASING, INCREASING, normalize, parse_color, trace_color, value_range,
};
use crate::error::{PlotError, Result};
use crate::figure::{Bar, Candlestick, Dash, Figure, Fill, Grid, HLine, Mode, Scatter, Trace};

type Panel<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

fn render_err<E: std::fmt::Display>(e: E) -> PlotError {
    PlotError::Render(e.to_string())
}

fn check_size((width, height): (u32, u32)) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(PlotError::InvalidParameter(format!(
            "image size {}x{} has no area",
            width, height
        )));
    }
    Ok(())
}

/// Render `fig` to an SVG file.
pub fn render_svg<P: AsRef<Path>>(fig: &Figure, path: P, size: (u32, u32)) -> Result<()> {
    check_size(size)?;
    let root = SVGBackend::new(path.as_ref(), size).into_drawing_area();
    draw_figure(fig, &root)?;
    root.present().map_err(render_err)
}

/// Render `fig` to a bitmap; the format follows the file extension.
pub fn render_png<P: AsRef<Path>>(fig: &Figure, path: P, size: (u32, u32)) -> Result<()> {
    check_size(size)?;
    let root = BitMapBackend::new(path.as_ref(), size).into_drawing_area();
    draw_figure(fig, &root)?;
    root.present().map_err(render_err)
}

fn draw_figure<DB: DrawingBackend>(fig: &Figure, root: &DrawingArea<DB, Shift>) -> Result<()> {
    root.fill(&WHITE).map_err(render_err)?;

    let area = match &fig.layout.title {
        Some(title) => root.titled(title, ("sans-serif", 24)).map_err(render_err)?,
        None => root.margin(0, 0, 0, 0),
    };

    for (i, panel) in split_rows(&area, &fig.grid).iter().enumerate() {
        draw_panel(fig, i + 1, panel)?;
    }
    Ok(())
}

fn split_rows<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    grid: &Grid,
) -> Vec<DrawingArea<DB, Shift>> {
    let height = area.dim_in_pixel().1 as f64;
    let domains = grid.domains();
    let gap = (grid.vertical_spacing * height).round() as i32;

    let mut panels = Vec::with_capacity(domains.len());
    let mut rest = area.margin(0, 0, 0, 0);
    for (lo, hi) in domains.iter().take(domains.len().saturating_sub(1)) {
        let h = ((hi - lo) * height).round().max(1.0) as i32;
        let (top, bottom) = rest.split_vertically(h);
        let (_, below_gap) = bottom.split_vertically(gap);
        panels.push(top);
        rest = below_gap;
    }
    panels.push(rest);
    panels
}

/// Edges of cells centred on `centers`.
pub(crate) fn cell_edges(centers: &[f64]) -> Vec<f64> {
    match centers.len() {
        0 => Vec::new(),
        1 => vec![centers[0] - 0.5, centers[0] + 0.5],
        n => {
            let mut edges = Vec::with_capacity(n + 1);
            edges.push(centers[0] - (centers[1] - centers[0]) / 2.0);
            for w in centers.windows(2) {
                edges.push((w[0] + w[1]) / 2.0);
            }
            edges.push(centers[n - 1] + (centers[n - 1] - centers[n - 2]) / 2.0);
            edges
        }
    }
}

/// Half the width of a bar or candle body: 40% of the tightest x spacing.
pub(crate) fn bar_half_width(xs: &[f64]) -> f64 {
    let mut sorted: Vec<f64> = xs.iter().copied().filter(|x| x.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    sorted
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|d| *d > 0.0)
        .fold(None, |acc: Option<f64>, d| Some(acc.map_or(d, |a| a.min(d))))
        .unwrap_or(1.0)
        * 0.4
}

fn padded(range: Option<(f64, f64)>, frac: f64) -> (f64, f64) {
    match range {
        None => (0.0, 1.0),
        Some((lo, hi)) if hi > lo => {
            let pad = (hi - lo) * frac;
            (lo - pad, hi + pad)
        }
        Some((lo, _)) => (lo - 1.0, lo + 1.0),
    }
}

/// Data extent of everything drawn in one panel.
pub(crate) fn panel_bounds(traces: &[&Trace], hlines: &[&HLine]) -> ((f64, f64), (f64, f64)) {
    let mut xs = Vec::new();
    let mut ys = Vec::new();

    fn push_bodies(xs: &mut Vec<f64>, positions: Vec<f64>) {
        let half = bar_half_width(&positions);
        if let Some((lo, hi)) = value_range(&positions) {
            xs.push(lo - half);
            xs.push(hi + half);
        }
    }

    for trace in traces {
        match trace {
            Trace::Scatter(s) => {
                xs.extend(s.x.positions());
                ys.extend(s.y.iter().copied());
                if s.fill == Some(Fill::ToZeroY) {
                    ys.push(0.0);
                }
            }
            Trace::Bar(b) => {
                push_bodies(&mut xs, b.x.positions());
                ys.extend(b.y.iter().copied());
                ys.push(0.0);
            }
            Trace::Candlestick(c) => {
                push_bodies(&mut xs, c.x.positions());
                ys.extend(c.low.iter().copied());
                ys.extend(c.high.iter().copied());
            }
            Trace::Heatmap(h) => {
                xs.extend(cell_edges(&h.x.positions()));
                ys.extend(cell_edges(&h.y.positions()));
            }
            Trace::Contour(c) => {
                xs.extend(cell_edges(&c.x));
                ys.extend(cell_edges(&c.y));
            }
        }
    }
    ys.extend(hlines.iter().map(|h| h.y));

    (padded(value_range(&xs), 0.0), padded(value_range(&ys), 0.05))
}

fn category_label(labels: Option<&[String]>, v: f64) -> String {
    let Some(labels) = labels else {
        return format!("{}", v);
    };
    let idx = v.round();
    if (v - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

fn x_categories(traces: &[&Trace]) -> Option<Vec<String>> {
    traces
        .iter()
        .find_map(|t| match t {
            Trace::Scatter(s) => s.x.labels(),
            Trace::Bar(b) => b.x.labels(),
            Trace::Candlestick(c) => c.x.labels(),
            Trace::Heatmap(h) => h.x.labels(),
            Trace::Contour(_) => None,
        })
        .map(|l| l.to_vec())
}

fn y_categories(traces: &[&Trace]) -> Option<Vec<String>> {
    traces
        .iter()
        .find_map(|t| match t {
            Trace::Heatmap(h) => h.y.labels(),
            _ => None,
        })
        .map(|l| l.to_vec())
}

/// Runs of consecutive finite points.
fn segments(xs: &[f64], ys: &[f64]) -> Vec<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for (&x, &y) in xs.iter().zip(ys) {
        if x.is_finite() && y.is_finite() {
            current.push((x, y));
        } else if !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn finite_points(xs: &[f64], ys: &[f64]) -> Vec<(f64, f64)> {
    xs.iter()
        .zip(ys)
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(&x, &y)| (x, y))
        .collect()
}

fn draw_panel<DB: DrawingBackend>(
    fig: &Figure,
    row: usize,
    area: &DrawingArea<DB, Shift>,
) -> Result<()> {
    let indexed: Vec<(usize, &Trace)> = fig
        .traces
        .iter()
        .enumerate()
        .filter(|(_, t)| t.row() == row)
        .collect();
    let traces: Vec<&Trace> = indexed.iter().map(|(_, t)| *t).collect();
    let hlines: Vec<&HLine> = fig.layout.shapes.iter().filter(|s| s.row == row).collect();
    if traces.is_empty() && hlines.is_empty() {
        return Ok(());
    }

    let (x_range, y_range) = panel_bounds(&traces, &hlines);
    let x_labels = x_categories(&traces);
    let y_labels = y_categories(&traces);
    let x_fmt = |v: &f64| category_label(x_labels.as_deref(), *v);
    let y_fmt = |v: &f64| category_label(y_labels.as_deref(), *v);

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .x_label_area_size(if row == fig.rows() { 40 } else { 20 })
        .y_label_area_size(60)
        .build_cartesian_2d(x_range.0..x_range.1, y_range.0..y_range.1)
        .map_err(render_err)?;

    let mut mesh = chart.configure_mesh();
    mesh.disable_mesh();
    if x_labels.is_some() {
        mesh.x_label_formatter(&x_fmt);
    }
    if y_labels.is_some() {
        mesh.y_label_formatter(&y_fmt);
    }
    if let Some(title) = fig.layout.x_titles.get(&row) {
        mesh.x_desc(title.as_str());
    }
    if let Some(title) = fig.layout.y_titles.get(&row) {
        mesh.y_desc(title.as_str());
    }
    mesh.draw().map_err(render_err)?;

    let panel_width = area.dim_in_pixel().0;
    let mut previous_line: Option<Vec<(f64, f64)>> = None;
    let mut has_legend = false;

    for (idx, trace) in indexed {
        let color = trace_color(idx).mix(1.0);
        match trace {
            Trace::Scatter(s) => {
                has_legend |= draw_scatter(&mut chart, s, color, previous_line.as_deref())?;
                previous_line = Some(finite_points(&s.x.positions(), &s.y));
            }
            Trace::Bar(b) => has_legend |= draw_bar(&mut chart, b, color)?,
            Trace::Candlestick(c) => has_legend |= draw_candlestick(&mut chart, c, panel_width)?,
            Trace::Heatmap(h) => {
                let (xs, ys) = (h.x.positions(), h.y.positions());
                draw_cells(&mut chart, &xs, &ys, &h.z, &h.colorscale)?;
                if h.texttemplate.is_some() {
                    draw_cell_values(&mut chart, &xs, &ys, &h.z)?;
                }
            }
            Trace::Contour(c) => draw_cells(&mut chart, &c.x, &c.y, &c.z, &c.colorscale)?,
        }
    }

    for hline in hlines {
        draw_hline(&mut chart, hline, x_range)?;
    }

    if has_legend {
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(render_err)?;
    }
    Ok(())
}

/// Draws one scatter trace; returns whether it added a legend entry.
fn draw_scatter<DB: DrawingBackend>(
    chart: &mut Panel<'_, DB>,
    s: &Scatter,
    fallback: RGBAColor,
    previous_line: Option<&[(f64, f64)]>,
) -> Result<bool> {
    let line = s.line.clone().unwrap_or_default();
    let color = line.color.as_deref().and_then(parse_color).unwrap_or(fallback);
    let width = line.width.unwrap_or(2.0).round().max(1.0) as u32;
    let xs = s.x.positions();

    match s.fill {
        Some(Fill::ToZeroY) => {
            let points = finite_points(&xs, &s.y);
            chart
                .draw_series(AreaSeries::new(points, 0.0, color.mix(0.3).filled()))
                .map_err(render_err)?;
        }
        Some(Fill::ToNextY) => {
            if let Some(prev) = previous_line {
                let mut polygon = prev.to_vec();
                polygon.extend(finite_points(&xs, &s.y).into_iter().rev());
                if polygon.len() >= 3 {
                    let shape = Polygon::new(polygon, color.mix(0.2).filled());
                    chart
                        .draw_series(std::iter::once(shape))
                        .map_err(render_err)?;
                }
            }
        }
        None => {}
    }

    let mut labeled = false;
    let name = s.common.name.clone();
    let mode = s.mode.unwrap_or(Mode::Lines);

    if matches!(mode, Mode::Lines | Mode::LinesMarkers) {
        let dashed = line.dash.is_some_and(|d| d != Dash::Solid);
        let style = color.stroke_width(width);
        for segment in segments(&xs, &s.y) {
            let anno = if dashed {
                chart
                    .draw_series(DashedLineSeries::new(segment, 6, 4, style))
                    .map_err(render_err)?
            } else {
                chart
                    .draw_series(LineSeries::new(segment, style))
                    .map_err(render_err)?
            };
            if let (false, Some(name)) = (labeled, &name) {
                anno.label(name.clone()).legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(width))
                });
                labeled = true;
            }
        }
    }

    if matches!(mode, Mode::Markers | Mode::LinesMarkers) {
        let marker = s.marker.clone().unwrap_or_default();
        let radius = (marker.size.unwrap_or(6.0) / 2.0).round().max(1.0) as u32;
        let scale = Colorscale::from_name(marker.colorscale.as_deref().unwrap_or("Viridis"));
        let range = marker
            .color
            .as_ref()
            .and_then(|c| value_range(c))
            .unwrap_or((0.0, 1.0));

        let circles: Vec<Circle<(f64, f64), u32>> = xs
            .iter()
            .zip(&s.y)
            .enumerate()
            .filter(|(_, (x, y))| x.is_finite() && y.is_finite())
            .map(|(i, (&x, &y))| {
                let fill = match marker.color.as_ref().and_then(|c| c.get(i)) {
                    Some(v) => scale.sample(normalize(*v, range)).mix(1.0),
                    None => color,
                };
                Circle::new((x, y), radius, fill.filled())
            })
            .collect();

        let anno = chart.draw_series(circles).map_err(render_err)?;
        if let (false, Some(name)) = (labeled, &name) {
            anno.label(name.clone())
                .legend(move |(x, y)| Circle::new((x + 10, y), 4, color.filled()));
            labeled = true;
        }
    }

    Ok(labeled)
}

fn draw_bar<DB: DrawingBackend>(
    chart: &mut Panel<'_, DB>,
    b: &Bar,
    color: RGBAColor,
) -> Result<bool> {
    let xs = b.x.positions();
    let half = bar_half_width(&xs);
    let bars: Vec<Rectangle<(f64, f64)>> = finite_points(&xs, &b.y)
        .into_iter()
        .map(|(x, y)| Rectangle::new([(x - half, 0.0), (x + half, y)], color.filled()))
        .collect();

    let anno = chart.draw_series(bars).map_err(render_err)?;
    if let Some(name) = &b.common.name {
        anno.label(name.clone())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 16, y + 5)], color.filled()));
        return Ok(true);
    }
    Ok(false)
}

fn draw_candlestick<DB: DrawingBackend>(
    chart: &mut Panel<'_, DB>,
    c: &Candlestick,
    panel_width: u32,
) -> Result<bool> {
    let xs = c.x.positions();
    let n = xs
        .len()
        .min(c.open.len())
        .min(c.high.len())
        .min(c.low.len())
        .min(c.close.len());
    let body = (panel_width as f64 / n.max(1) as f64 * 0.6).clamp(1.0, 20.0) as u32;

    let sticks: Vec<CandleStick<f64, f64>> = (0..n)
        .filter(|&i| {
            [xs[i], c.open[i], c.high[i], c.low[i], c.close[i]]
                .iter()
                .all(|v| v.is_finite())
        })
        .map(|i| {
            CandleStick::new(
                xs[i],
                c.open[i],
                c.high[i],
                c.low[i],
                c.close[i],
                INCREASING.filled(),
                DECREASING.filled(),
                body,
            )
        })
        .collect();

    let anno = chart.draw_series(sticks).map_err(render_err)?;
    if let Some(name) = &c.common.name {
        anno.label(name.clone()).legend(|(x, y)| {
            Rectangle::new([(x + 4, y - 6), (x + 12, y + 6)], INCREASING.filled())
        });
        return Ok(true);
    }
    Ok(false)
}

fn draw_cells<DB: DrawingBackend>(
    chart: &mut Panel<'_, DB>,
    xs: &[f64],
    ys: &[f64],
    z: &[Vec<f64>],
    colorscale: &str,
) -> Result<()> {
    let scale = Colorscale::from_name(colorscale);
    let range = value_range(z.iter().flatten()).unwrap_or((0.0, 1.0));
    let x_edges = cell_edges(xs);
    let y_edges = cell_edges(ys);

    let mut cells = Vec::new();
    for (i, row) in z.iter().enumerate().take(ys.len()) {
        for (j, v) in row.iter().enumerate().take(xs.len()) {
            if !v.is_finite() {
                continue;
            }
            cells.push(Rectangle::new(
                [(x_edges[j], y_edges[i]), (x_edges[j + 1], y_edges[i + 1])],
                scale.sample(normalize(*v, range)).filled(),
            ));
        }
    }

    chart.draw_series(cells).map_err(render_err)?;
    Ok(())
}

/// Print each finite value at its cell centre.
fn draw_cell_values<DB: DrawingBackend>(
    chart: &mut Panel<'_, DB>,
    xs: &[f64],
    ys: &[f64],
    z: &[Vec<f64>],
) -> Result<()> {
    let style = ("sans-serif", 14)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));

    let mut labels = Vec::new();
    for (row, y) in z.iter().zip(ys) {
        for (v, x) in row.iter().zip(xs) {
            if v.is_finite() {
                labels.push(Text::new(format!("{}", v), (*x, *y), style.clone()));
            }
        }
    }

    chart.draw_series(labels).map_err(render_err)?;
    Ok(())
}

fn draw_hline<DB: DrawingBackend>(
    chart: &mut Panel<'_, DB>,
    hline: &HLine,
    (x0, x1): (f64, f64),
) -> Result<()> {
    let color = parse_color(&hline.color).unwrap_or(BLACK.mix(1.0));
    let style = color.stroke_width(1);
    let points = vec![(x0, hline.y), (x1, hline.y)];

    if hline.dash == Dash::Solid {
        chart.draw_series(LineSeries::new(points, style)).map_err(render_err)?;
    } else {
        chart
            .draw_series(DashedLineSeries::new(points, 6, 4, style))
            .map_err(render_err)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::{AxisValues, Scatter};

    #[test]
    fn test_cell_edges() {
        assert_eq!(cell_edges(&[0.0, 1.0, 2.0]), vec![-0.5, 0.5, 1.5, 2.5]);
        assert_eq!(cell_edges(&[3.0]), vec![2.5, 3.5]);
        assert!(cell_edges(&[]).is_empty());
    }

    #[test]
    fn test_bar_half_width() {
        assert!((bar_half_width(&[0.0, 1.0, 2.0]) - 0.4).abs() < 1e-12);
        assert!((bar_half_width(&[0.0, 0.5, 2.0]) - 0.2).abs() < 1e-12);
        assert!((bar_half_width(&[5.0]) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_segments_split_on_nan() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let ys = [f64::NAN, 1.0, 2.0, f64::NAN, 4.0];
        let segs = segments(&xs, &ys);
        assert_eq!(segs, vec![vec![(1.0, 1.0), (2.0, 2.0)], vec![(4.0, 4.0)]]);
    }

    #[test]
    fn test_category_label() {
        let labels = vec!["a".to_string(), "b".to_string()];
        assert_eq!(category_label(Some(&labels), 1.0), "b");
        assert_eq!(category_label(Some(&labels), 0.5), "");
        assert_eq!(category_label(Some(&labels), 7.0), "");
        assert_eq!(category_label(None, 2.5), "2.5");
    }

    #[test]
    fn test_panel_bounds_include_hlines_and_zero_fill() {
        let line = Trace::Scatter(
            Scatter::new("a", AxisValues::Numbers(vec![0.0, 10.0]), vec![40.0, 60.0])
                .fill(Fill::ToZeroY),
        );
        let hline = HLine {
            y: 70.0,
            dash: Dash::Dash,
            color: "red".into(),
            row: 1,
        };
        let ((x0, x1), (y0, y1)) = panel_bounds(&[&line], &[&hline]);
        assert_eq!((x0, x1), (0.0, 10.0));
        assert!(y0 < 0.0 && y1 > 70.0);
    }
}
