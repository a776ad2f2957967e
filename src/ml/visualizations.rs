use std::collections::BTreeSet;

use charts::{
    AxisValues, Chart, Contour, Fill, Figure, Heatmap, Line, Marker, Mode, PlotError, Result,
    Scatter, TraceCommon,
};
use frame::{Frame, Index};
use log::debug;

use crate::metrics::{Classifier, confusion_matrix, roc_curve, sample_std};

pub const ERROR_BAND_COLOR: &str = "rgba(0,100,80,0.2)";
pub const DEFAULT_RESOLUTION: usize = 100;

fn finish(
    mut fig: Figure,
    title: Option<&str>,
    default_title: &str,
    x_title: &str,
    y_title: &str,
) -> Figure {
    fig.layout.set_title(Some(title.unwrap_or(default_title)));
    fig.layout.set_x_title(1, Some(x_title));
    fig.layout.set_y_title(1, Some(y_title));
    fig
}

/// Actual and predicted series over the frame index, with a band of one
/// residual standard deviation around the prediction.
pub fn plot_predictions(
    data: Frame,
    actual: &str,
    predicted: &str,
    title: Option<&str>,
) -> Result<Chart> {
    if data.is_empty() {
        return Err(PlotError::EmptyInput("prediction frame has no rows".into()));
    }
    let actual_values = data.column(actual)?.to_vec();
    let predicted_values = data.column(predicted)?.to_vec();
    let x = AxisValues::from_index(data.index());

    let residuals: Vec<f64> = actual_values
        .iter()
        .zip(&predicted_values)
        .map(|(a, p)| a - p)
        .collect();
    let spread = sample_std(&residuals);
    debug!("residual standard deviation {:.4}", spread);

    let upper = predicted_values.iter().map(|p| p + spread).collect();
    let lower = predicted_values.iter().map(|p| p - spread).collect();
    let band_line = || Line::default().color(ERROR_BAND_COLOR);

    let mut fig = Figure::new();
    fig.add_trace(
        Scatter::new("Actual", x.clone(), actual_values)
            .mode(Mode::Lines)
            .line(Line::width(2.0)),
    );
    fig.add_trace(
        Scatter::new("Predicted", x.clone(), predicted_values)
            .mode(Mode::Lines)
            .line(Line::width(2.0).dashed()),
    );
    fig.add_trace(Scatter::new("Error Band", x.clone(), upper).mode(Mode::Lines).line(band_line()));
    fig.add_trace(
        Scatter::new("Error Band", x, lower)
            .mode(Mode::Lines)
            .line(band_line())
            .fill(Fill::ToNextY),
    );

    let mut fig = finish(fig, title, "Actual vs Predicted Values", "Time", "Value");
    fig.layout.showlegend = Some(true);
    Ok(Chart::with_figure(data, title, fig))
}

/// `n` evenly spaced values from `start` to `end` inclusive.
fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

fn feature_span(x: &[[f64; 2]], feature: usize) -> (f64, f64) {
    x.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
        (lo.min(p[feature]), hi.max(p[feature]))
    })
}

/// Predicted class regions of `model` over the feature plane, with the
/// samples drawn on top, one trace per class.
///
/// The grid extends one unit past the data on every side and has
/// `resolution` points per axis.
pub fn plot_decision_boundary<C: Classifier + ?Sized>(
    x: &[[f64; 2]],
    y: &[i64],
    model: &C,
    title: Option<&str>,
    resolution: usize,
) -> Result<Chart> {
    if x.is_empty() {
        return Err(PlotError::EmptyInput("no samples to plot".into()));
    }
    if x.len() != y.len() {
        return Err(PlotError::LengthMismatch {
            what: "y".into(),
            expected: x.len(),
            actual: y.len(),
        });
    }
    if resolution < 2 {
        return Err(PlotError::InvalidParameter(format!(
            "grid resolution must be at least 2, got {}",
            resolution
        )));
    }
    if x.iter().flatten().any(|v| !v.is_finite()) {
        return Err(PlotError::InvalidParameter("features must be finite".into()));
    }

    let (x0, x1) = feature_span(x, 0);
    let (y0, y1) = feature_span(x, 1);
    let grid_x = linspace(x0 - 1.0, x1 + 1.0, resolution);
    let grid_y = linspace(y0 - 1.0, y1 + 1.0, resolution);

    let points: Vec<[f64; 2]> = grid_y
        .iter()
        .flat_map(|&gy| grid_x.iter().map(move |&gx| [gx, gy]))
        .collect();
    let predictions = model.predict(&points);
    if predictions.len() != points.len() {
        return Err(PlotError::LengthMismatch {
            what: "model predictions".into(),
            expected: points.len(),
            actual: predictions.len(),
        });
    }
    let z: Vec<Vec<f64>> = predictions
        .chunks(resolution)
        .map(|row| row.iter().map(|&c| c as f64).collect())
        .collect();

    let mut fig = Figure::new();
    fig.add_trace(Contour {
        common: TraceCommon::default(),
        x: grid_x,
        y: grid_y,
        z,
        colorscale: "RdBu".to_string(),
        showscale: false,
    });

    let classes: BTreeSet<i64> = y.iter().copied().collect();
    for class in classes {
        let (fx, fy): (Vec<f64>, Vec<f64>) = x
            .iter()
            .zip(y)
            .filter(|(_, label)| **label == class)
            .map(|(p, _)| (p[0], p[1]))
            .unzip();
        fig.add_trace(
            Scatter::new(format!("Class {}", class), AxisValues::Numbers(fx), fy)
                .mode(Mode::Markers)
                .marker(Marker {
                    size: Some(8.0),
                    ..Default::default()
                }),
        );
    }

    let mut fig = finish(fig, title, "Decision Boundary", "Feature 1", "Feature 2");
    fig.layout.showlegend = Some(true);

    let data = Frame::from_columns(
        Index::Positional(x.len()),
        vec![
            ("0", x.iter().map(|p| p[0]).collect()),
            ("1", x.iter().map(|p| p[1]).collect()),
        ],
    )?;
    Ok(Chart::with_figure(data, title, fig))
}

/// Heatmap of the confusion matrix, actual classes down, predicted across.
///
/// `labels` names the classes in sorted label order; without it they are
/// `Class 0`, `Class 1`, ...
pub fn plot_confusion_matrix(
    y_true: &[i64],
    y_pred: &[i64],
    title: Option<&str>,
    labels: Option<&[&str]>,
) -> Result<Chart> {
    let cm = confusion_matrix(y_true, y_pred)?;
    let n = cm.size();

    let names: Vec<String> = match labels {
        Some(labels) if labels.len() != n => {
            return Err(PlotError::LengthMismatch {
                what: "labels".into(),
                expected: n,
                actual: labels.len(),
            });
        }
        Some(labels) => labels.iter().map(|l| l.to_string()).collect(),
        None => (0..n).map(|i| format!("Class {}", i)).collect(),
    };

    let z: Vec<Vec<f64>> = cm
        .counts
        .iter()
        .map(|row| row.iter().map(|&c| c as f64).collect())
        .collect();

    let mut fig = Figure::new();
    fig.add_trace(Heatmap {
        common: TraceCommon::default(),
        z: z.clone(),
        x: AxisValues::Text(names.clone()),
        y: AxisValues::Text(names),
        colorscale: "Blues".to_string(),
        showscale: true,
        texttemplate: Some("%{z}".to_string()),
    });
    let fig = finish(fig, title, "Confusion Matrix", "Predicted", "Actual");

    let columns: Vec<(String, Vec<f64>)> = (0..n)
        .map(|j| (j.to_string(), z.iter().map(|row| row[j]).collect()))
        .collect();
    let data = Frame::from_columns(Index::Positional(n), columns)?;
    Ok(Chart::with_figure(data, title, fig))
}

/// ROC curve of a binary scorer against the diagonal of a random guess.
pub fn plot_roc_curve(y_true: &[i64], y_score: &[f64], title: Option<&str>) -> Result<Chart> {
    let roc = roc_curve(y_true, y_score)?;
    let area = roc.auc()?;
    debug!("ROC curve with {} points, AUC {:.4}", roc.fpr.len(), area);

    let mut fig = Figure::new();
    fig.add_trace(
        Scatter::new(
            format!("ROC (AUC = {:.2})", area),
            AxisValues::Numbers(roc.fpr.clone()),
            roc.tpr.clone(),
        )
        .mode(Mode::Lines)
        .line(Line::width(2.0)),
    );
    fig.add_trace(
        Scatter::new("Random", AxisValues::Numbers(vec![0.0, 1.0]), vec![0.0, 1.0])
            .mode(Mode::Lines)
            .line(Line::width(2.0).dashed()),
    );

    let mut fig = finish(fig, title, "ROC Curve", "False Positive Rate", "True Positive Rate");
    fig.layout.showlegend = Some(true);

    let data = Frame::from_columns(
        Index::Positional(roc.fpr.len()),
        vec![("fpr", roc.fpr), ("tpr", roc.tpr)],
    )?;
    Ok(Chart::with_figure(data, title, fig))
}
