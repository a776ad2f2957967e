//! Figure model: traces placed on a grid of stacked subplots, plus layout.
//!
//! The model serializes to a plotly figure document (`{"data": [...], "layout": {...}}`)
//! and is also what the static renderer draws from.

use std::collections::BTreeMap;

use frame::Index;
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::error::{PlotError, Result};

/// Values along an axis: numbers, or categories/dates as text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AxisValues {
    Numbers(Vec<f64>),
    Text(Vec<String>),
}

impl AxisValues {
    /// Row labels of a frame index; a positional index becomes `0..n`.
    pub fn from_index(index: &Index) -> Self {
        match index.labels() {
            Some(labels) => AxisValues::Text(labels),
            None => AxisValues::Numbers((0..index.len()).map(|i| i as f64).collect()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            AxisValues::Numbers(v) => v.len(),
            AxisValues::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Plot coordinate of each value: the number itself, or the category position.
    pub fn positions(&self) -> Vec<f64> {
        match self {
            AxisValues::Numbers(v) => v.clone(),
            AxisValues::Text(v) => (0..v.len()).map(|i| i as f64).collect(),
        }
    }

    pub fn labels(&self) -> Option<&[String]> {
        match self {
            AxisValues::Numbers(_) => None,
            AxisValues::Text(v) => Some(v),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mode {
    #[serde(rename = "lines")]
    Lines,
    #[serde(rename = "markers")]
    Markers,
    #[serde(rename = "lines+markers")]
    LinesMarkers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dash {
    Solid,
    Dash,
    Dot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Fill {
    ToZeroY,
    ToNextY,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Line {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<Dash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Line {
    pub fn width(width: f64) -> Self {
        Line {
            width: Some(width),
            ..Default::default()
        }
    }

    pub fn dashed(mut self) -> Self {
        self.dash = Some(Dash::Dash);
        self
    }

    pub fn color<S: Into<String>>(mut self, color: S) -> Self {
        self.color = Some(color.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Marker {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    /// One value per point, mapped through `colorscale`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colorscale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showscale: Option<bool>,
}

/// Fields every trace carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TraceCommon {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hovertemplate: Option<String>,
    /// 1-based subplot row; written out as axis references.
    #[serde(skip)]
    pub row: usize,
}

impl TraceCommon {
    fn named<S: Into<String>>(name: S) -> Self {
        TraceCommon {
            name: Some(name.into()),
            hovertemplate: None,
            row: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candlestick {
    #[serde(flatten)]
    pub common: TraceCommon,
    pub x: AxisValues,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scatter {
    #[serde(flatten)]
    pub common: TraceCommon,
    pub x: AxisValues,
    pub y: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<Fill>,
}

impl Scatter {
    pub fn new<S: Into<String>>(name: S, x: AxisValues, y: Vec<f64>) -> Self {
        Scatter {
            common: TraceCommon::named(name),
            x,
            y,
            mode: None,
            line: None,
            marker: None,
            fill: None,
        }
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn line(mut self, line: Line) -> Self {
        self.line = Some(line);
        self
    }

    pub fn marker(mut self, marker: Marker) -> Self {
        self.marker = Some(marker);
        self
    }

    pub fn fill(mut self, fill: Fill) -> Self {
        self.fill = Some(fill);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    #[serde(flatten)]
    pub common: TraceCommon,
    pub x: AxisValues,
    pub y: Vec<f64>,
}

impl Bar {
    pub fn new<S: Into<String>>(name: S, x: AxisValues, y: Vec<f64>) -> Self {
        Bar {
            common: TraceCommon::named(name),
            x,
            y,
        }
    }
}

/// Colour-mapped grid with categorical axes. `z[i][j]` sits at `(x[j], y[i])`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    #[serde(flatten)]
    pub common: TraceCommon,
    pub z: Vec<Vec<f64>>,
    pub x: AxisValues,
    pub y: AxisValues,
    pub colorscale: String,
    pub showscale: bool,
    /// Per-cell text, e.g. `%{z}` to print the values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub texttemplate: Option<String>,
}

/// Contour over a numeric grid. `z[i][j]` sits at `(x[j], y[i])`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contour {
    #[serde(flatten)]
    pub common: TraceCommon,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<Vec<f64>>,
    pub colorscale: String,
    pub showscale: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Candlestick(Candlestick),
    Scatter(Scatter),
    Bar(Bar),
    Heatmap(Heatmap),
    Contour(Contour),
}

impl Trace {
    pub fn common(&self) -> &TraceCommon {
        match self {
            Trace::Candlestick(t) => &t.common,
            Trace::Scatter(t) => &t.common,
            Trace::Bar(t) => &t.common,
            Trace::Heatmap(t) => &t.common,
            Trace::Contour(t) => &t.common,
        }
    }

    pub fn common_mut(&mut self) -> &mut TraceCommon {
        match self {
            Trace::Candlestick(t) => &mut t.common,
            Trace::Scatter(t) => &mut t.common,
            Trace::Bar(t) => &mut t.common,
            Trace::Heatmap(t) => &mut t.common,
            Trace::Contour(t) => &mut t.common,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.common().name.as_deref()
    }

    pub fn row(&self) -> usize {
        self.common().row
    }
}

impl From<Candlestick> for Trace {
    fn from(t: Candlestick) -> Self {
        Trace::Candlestick(t)
    }
}

impl From<Scatter> for Trace {
    fn from(t: Scatter) -> Self {
        Trace::Scatter(t)
    }
}

impl From<Bar> for Trace {
    fn from(t: Bar) -> Self {
        Trace::Bar(t)
    }
}

impl From<Heatmap> for Trace {
    fn from(t: Heatmap) -> Self {
        Trace::Heatmap(t)
    }
}

impl From<Contour> for Trace {
    fn from(t: Contour) -> Self {
        Trace::Contour(t)
    }
}

/// Vertical stack of subplots sharing the figure width.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub rows: usize,
    /// Relative heights, top row first.
    pub row_heights: Vec<f64>,
    /// Gap between rows as a fraction of the figure height.
    pub vertical_spacing: f64,
    pub shared_xaxes: bool,
}

impl Grid {
    pub fn single() -> Self {
        Grid {
            rows: 1,
            row_heights: vec![1.0],
            vertical_spacing: 0.0,
            shared_xaxes: false,
        }
    }

    /// Vertical `(bottom, top)` domain of each row in paper coordinates, top row first.
    pub fn domains(&self) -> Vec<(f64, f64)> {
        let total: f64 = self.row_heights.iter().sum();
        let available = 1.0 - self.vertical_spacing * (self.rows.saturating_sub(1)) as f64;

        let mut top = 1.0;
        let mut domains = Vec::with_capacity(self.rows);
        for (i, h) in self.row_heights.iter().enumerate() {
            let height = h / total * available;
            let bottom = if i + 1 == self.rows { 0.0 } else { top - height };
            domains.push((bottom.max(0.0), top));
            top = bottom - self.vertical_spacing;
        }
        domains
    }
}

/// Horizontal reference line spanning a subplot.
#[derive(Debug, Clone, PartialEq)]
pub struct HLine {
    pub y: f64,
    pub dash: Dash,
    pub color: String,
    pub row: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    pub title: Option<String>,
    /// Axis titles keyed by 1-based row.
    pub x_titles: BTreeMap<usize, String>,
    pub y_titles: BTreeMap<usize, String>,
    /// Range slider visibility keyed by row; rows not listed use the plotly default.
    pub rangeslider: BTreeMap<usize, bool>,
    pub dragmode: Option<String>,
    pub modebar_add: Vec<String>,
    pub showlegend: Option<bool>,
    pub shapes: Vec<HLine>,
}

impl Layout {
    pub fn set_title(&mut self, title: Option<&str>) {
        self.title = title.map(str::to_string);
    }

    pub fn set_x_title(&mut self, row: usize, title: Option<&str>) {
        match title {
            Some(t) => self.x_titles.insert(row, t.to_string()),
            None => self.x_titles.remove(&row),
        };
    }

    pub fn set_y_title(&mut self, row: usize, title: Option<&str>) {
        match title {
            Some(t) => self.y_titles.insert(row, t.to_string()),
            None => self.y_titles.remove(&row),
        };
    }
}

/// Traces on a subplot grid plus layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub grid: Grid,
    pub traces: Vec<Trace>,
    pub layout: Layout,
}

impl Default for Figure {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a figure with `rows` stacked subplots.
///
/// `row_heights` are relative (top row first) and must have one entry per row.
pub fn make_subplots(
    rows: usize,
    row_heights: &[f64],
    vertical_spacing: f64,
    shared_xaxes: bool,
) -> Result<Figure> {
    if rows == 0 {
        return Err(PlotError::InvalidParameter("a figure needs at least one row".into()));
    }
    if row_heights.len() != rows {
        return Err(PlotError::LengthMismatch {
            what: "row_heights".into(),
            expected: rows,
            actual: row_heights.len(),
        });
    }
    if row_heights.iter().any(|h| !h.is_finite() || *h <= 0.0) {
        return Err(PlotError::InvalidParameter("row heights must be positive".into()));
    }
    if !(0.0..1.0).contains(&vertical_spacing)
        || vertical_spacing * (rows - 1) as f64 >= 1.0
    {
        return Err(PlotError::InvalidParameter(format!(
            "vertical spacing {} leaves no room for {} rows",
            vertical_spacing, rows
        )));
    }

    Ok(Figure {
        grid: Grid {
            rows,
            row_heights: row_heights.to_vec(),
            vertical_spacing,
            shared_xaxes,
        },
        traces: Vec::new(),
        layout: Layout::default(),
    })
}

fn axis_suffix(row: usize) -> String {
    if row == 1 { String::new() } else { row.to_string() }
}

/// Trace-side axis reference, e.g. `x`, `y2`.
fn axis_ref(axis: &str, row: usize) -> String {
    format!("{}{}", axis, axis_suffix(row))
}

impl Figure {
    /// A single-cell figure.
    pub fn new() -> Self {
        Figure {
            grid: Grid::single(),
            traces: Vec::new(),
            layout: Layout::default(),
        }
    }

    pub fn rows(&self) -> usize {
        self.grid.rows
    }

    /// Add a trace to the first row.
    pub fn add_trace<T: Into<Trace>>(&mut self, trace: T) {
        let mut trace = trace.into();
        trace.common_mut().row = 1;
        self.traces.push(trace);
    }

    /// Add a trace to subplot `row` (1-based).
    pub fn add_trace_at<T: Into<Trace>>(&mut self, trace: T, row: usize) -> Result<()> {
        self.check_row(row)?;
        let mut trace = trace.into();
        trace.common_mut().row = row;
        self.traces.push(trace);
        Ok(())
    }

    /// Add a horizontal reference line to subplot `row`.
    pub fn add_hline<S: Into<String>>(
        &mut self,
        y: f64,
        dash: Dash,
        color: S,
        row: usize,
    ) -> Result<()> {
        self.check_row(row)?;
        self.layout.shapes.push(HLine {
            y,
            dash,
            color: color.into(),
            row,
        });
        Ok(())
    }

    /// Grow the grid so that row `rows` exists.
    ///
    /// A single-cell figure becomes a price/indicator split: the existing cell
    /// keeps 70% of the height and the new rows share the rest.
    pub fn ensure_rows(&mut self, rows: usize) {
        if rows <= self.grid.rows {
            return;
        }

        let added = rows - self.grid.rows;
        if self.grid.rows == 1 {
            let mut heights = vec![0.7];
            heights.extend(std::iter::repeat_n(0.3 / added as f64, added));
            self.grid.row_heights = heights;
        } else {
            let mean = self.grid.row_heights.iter().sum::<f64>() / self.grid.rows as f64;
            self.grid.row_heights.extend(std::iter::repeat_n(mean, added));
        }

        if self.grid.vertical_spacing == 0.0 {
            self.grid.vertical_spacing = 0.03;
        }
        self.grid.shared_xaxes = true;
        self.grid.rows = rows;
        log::debug!("figure grown to {} rows", rows);
    }

    /// Set the hover template of every trace currently in the figure.
    pub fn update_hovertemplate(&mut self, template: &str) {
        for trace in &mut self.traces {
            trace.common_mut().hovertemplate = Some(template.to_string());
        }
    }

    fn check_row(&self, row: usize) -> Result<()> {
        if row == 0 || row > self.grid.rows {
            return Err(PlotError::RowOutOfRange {
                row,
                rows: self.grid.rows,
            });
        }
        Ok(())
    }

    /// The plotly figure document.
    pub fn to_json(&self) -> Result<Value> {
        let mut data = Vec::with_capacity(self.traces.len());
        for trace in &self.traces {
            let mut value = serde_json::to_value(trace)?;
            if let Value::Object(map) = &mut value {
                map.insert("xaxis".into(), Value::String(axis_ref("x", trace.row())));
                map.insert("yaxis".into(), Value::String(axis_ref("y", trace.row())));
            }
            data.push(value);
        }

        Ok(json!({ "data": data, "layout": self.layout_json() }))
    }

    fn layout_json(&self) -> Value {
        let layout = &self.layout;
        let mut map = Map::new();

        if let Some(title) = &layout.title {
            map.insert("title".into(), json!({ "text": title }));
        }
        if let Some(show) = layout.showlegend {
            map.insert("showlegend".into(), Value::Bool(show));
        }
        if let Some(mode) = &layout.dragmode {
            map.insert("dragmode".into(), Value::String(mode.clone()));
        }
        if !layout.modebar_add.is_empty() {
            map.insert("modebar".into(), json!({ "add": layout.modebar_add }));
        }

        let rows = self.grid.rows;
        let bottom_ref = axis_ref("x", rows);
        for (i, (lo, hi)) in self.grid.domains().into_iter().enumerate() {
            let row = i + 1;
            let suffix = axis_suffix(row);

            let mut xaxis = Map::new();
            xaxis.insert("anchor".into(), Value::String(axis_ref("y", row)));
            if let Some(title) = layout.x_titles.get(&row) {
                xaxis.insert("title".into(), json!({ "text": title }));
            }
            if let Some(visible) = layout.rangeslider.get(&row) {
                xaxis.insert("rangeslider".into(), json!({ "visible": visible }));
            }
            if self.grid.shared_xaxes && row < rows {
                xaxis.insert("matches".into(), Value::String(bottom_ref.clone()));
                xaxis.insert("showticklabels".into(), Value::Bool(false));
            }

            let mut yaxis = Map::new();
            yaxis.insert("anchor".into(), Value::String(axis_ref("x", row)));
            yaxis.insert("domain".into(), json!([lo, hi]));
            if let Some(title) = layout.y_titles.get(&row) {
                yaxis.insert("title".into(), json!({ "text": title }));
            }

            map.insert(format!("xaxis{}", suffix), Value::Object(xaxis));
            map.insert(format!("yaxis{}", suffix), Value::Object(yaxis));
        }

        if !layout.shapes.is_empty() {
            let shapes: Vec<Value> = layout
                .shapes
                .iter()
                .map(|s| {
                    json!({
                        "type": "line",
                        "xref": format!("{} domain", axis_ref("x", s.row)),
                        "x0": 0,
                        "x1": 1,
                        "yref": axis_ref("y", s.row),
                        "y0": s.y,
                        "y1": s.y,
                        "line": { "dash": s.dash, "color": s.color },
                    })
                })
                .collect();
            map.insert("shapes".into(), Value::Array(shapes));
        }

        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xs(n: usize) -> AxisValues {
        AxisValues::Numbers((0..n).map(|i| i as f64).collect())
    }

    #[test]
    fn test_domains_follow_row_heights() {
        let fig = make_subplots(2, &[0.7, 0.3], 0.03, true).unwrap();
        let d = fig.grid.domains();
        assert!((d[0].1 - 1.0).abs() < 1e-12);
        assert!((d[0].0 - (1.0 - 0.7 * 0.97)).abs() < 1e-12);
        assert!((d[1].1 - (d[0].0 - 0.03)).abs() < 1e-12);
        assert_eq!(d[1].0, 0.0);
    }

    #[test]
    fn test_make_subplots_validation() {
        assert!(make_subplots(0, &[], 0.0, false).is_err());
        assert!(make_subplots(2, &[1.0], 0.0, false).is_err());
        assert!(make_subplots(2, &[1.0, -1.0], 0.0, false).is_err());
        assert!(make_subplots(3, &[1.0, 1.0, 1.0], 0.6, false).is_err());
    }

    #[test]
    fn test_add_trace_at_checks_row() {
        let mut fig = Figure::new();
        let err = fig
            .add_trace_at(Scatter::new("a", xs(2), vec![1.0, 2.0]), 2)
            .unwrap_err();
        assert!(matches!(err, PlotError::RowOutOfRange { row: 2, rows: 1 }));
        assert!(fig.add_hline(1.0, Dash::Dash, "red", 0).is_err());
    }

    #[test]
    fn test_ensure_rows_splits_single_cell() {
        let mut fig = Figure::new();
        fig.ensure_rows(2);
        assert_eq!(fig.rows(), 2);
        assert_eq!(fig.grid.row_heights, vec![0.7, 0.3]);
        assert!(fig.grid.shared_xaxes);
        assert!((fig.grid.vertical_spacing - 0.03).abs() < 1e-12);

        fig.ensure_rows(1);
        assert_eq!(fig.rows(), 2);
    }

    #[test]
    fn test_trace_json_carries_type_and_axes() {
        let mut fig = make_subplots(2, &[0.5, 0.5], 0.1, true).unwrap();
        fig.add_trace(
            Scatter::new("SMA 3", xs(3), vec![f64::NAN, 1.0, 2.0])
                .mode(Mode::Lines)
                .line(Line::width(1.0).dashed()),
        );
        fig.add_trace_at(Bar::new("Volume", xs(3), vec![1.0, 2.0, 3.0]), 2)
            .unwrap();

        let doc = fig.to_json().unwrap();
        let data = doc["data"].as_array().unwrap();
        assert_eq!(data[0]["type"], "scatter");
        assert_eq!(data[0]["name"], "SMA 3");
        assert_eq!(data[0]["mode"], "lines");
        assert_eq!(data[0]["line"]["dash"], "dash");
        assert!(data[0]["y"][0].is_null());
        assert_eq!(data[0]["xaxis"], "x");
        assert_eq!(data[1]["type"], "bar");
        assert_eq!(data[1]["yaxis"], "y2");
        assert!(data[1].get("hovertemplate").is_none());
    }

    #[test]
    fn test_layout_json_shared_axes_and_shapes() {
        let mut fig = make_subplots(2, &[0.7, 0.3], 0.03, true).unwrap();
        fig.layout.set_title(Some("Prices"));
        fig.layout.set_y_title(2, Some("RSI"));
        fig.layout.rangeslider.insert(1, false);
        fig.add_hline(70.0, Dash::Dash, "red", 2).unwrap();

        let layout = fig.to_json().unwrap()["layout"].clone();
        assert_eq!(layout["title"]["text"], "Prices");
        assert_eq!(layout["xaxis"]["matches"], "x2");
        assert_eq!(layout["xaxis"]["showticklabels"], false);
        assert_eq!(layout["xaxis"]["rangeslider"]["visible"], false);
        assert!(layout["xaxis2"].get("matches").is_none());
        assert_eq!(layout["yaxis2"]["title"]["text"], "RSI");
        assert_eq!(layout["shapes"][0]["yref"], "y2");
        assert_eq!(layout["shapes"][0]["xref"], "x2 domain");
        assert_eq!(layout["shapes"][0]["y0"], 70.0);
        assert_eq!(layout["shapes"][0]["line"]["color"], "red");
    }

    #[test]
    fn test_update_hovertemplate_hits_existing_traces_only() {
        let mut fig = Figure::new();
        fig.add_trace(Scatter::new("a", xs(1), vec![1.0]));
        fig.update_hovertemplate("%{y}");
        fig.add_trace(Scatter::new("b", xs(1), vec![1.0]));

        assert_eq!(fig.traces[0].common().hovertemplate.as_deref(), Some("%{y}"));
        assert_eq!(fig.traces[1].common().hovertemplate, None);
    }

    #[test]
    fn test_axis_values_from_index() {
        let values = AxisValues::from_index(&Index::Positional(3));
        assert_eq!(values, AxisValues::Numbers(vec![0.0, 1.0, 2.0]));
        let labels = AxisValues::from_index(&Index::Labels(vec!["a".into(), "b".into()]));
        assert_eq!(labels.positions(), vec![0.0, 1.0]);
        assert_eq!(labels.labels().unwrap()[1], "b");
    }
}
