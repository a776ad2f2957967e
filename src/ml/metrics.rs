use std::collections::BTreeSet;

use charts::{PlotError, Result};

/// A fitted two-feature classifier.
pub trait Classifier {
    /// Class label for each point.
    fn predict(&self, points: &[[f64; 2]]) -> Vec<i64>;
}

impl<F> Classifier for F
where
    F: Fn(&[f64; 2]) -> i64,
{
    fn predict(&self, points: &[[f64; 2]]) -> Vec<i64> {
        points.iter().map(self).collect()
    }
}

fn check_lengths(what: &str, expected: usize, actual: usize) -> Result<()> {
    if expected == 0 {
        return Err(PlotError::EmptyInput(what.to_string()));
    }
    if expected != actual {
        return Err(PlotError::LengthMismatch {
            what: what.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfusionMatrix {
    /// Sorted union of the true and predicted labels.
    pub labels: Vec<i64>,
    /// `counts[i][j]`: samples of class `labels[i]` predicted as `labels[j]`.
    pub counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    pub fn size(&self) -> usize {
        self.labels.len()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Fraction of samples on the diagonal.
    pub fn accuracy(&self) -> f64 {
        let hits: usize = (0..self.size()).map(|i| self.counts[i][i]).sum();
        hits as f64 / self.total() as f64
    }
}

pub fn confusion_matrix(y_true: &[i64], y_pred: &[i64]) -> Result<ConfusionMatrix> {
    check_lengths("y_pred", y_true.len(), y_pred.len())?;

    let labels: Vec<i64> = y_true
        .iter()
        .chain(y_pred)
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let position = |label: i64| labels.binary_search(&label).unwrap_or_default();

    let mut counts = vec![vec![0; labels.len()]; labels.len()];
    for (&t, &p) in y_true.iter().zip(y_pred) {
        counts[position(t)][position(p)] += 1;
    }

    Ok(ConfusionMatrix { labels, counts })
}

/// Receiver operating characteristic of a binary scorer.
#[derive(Debug, Clone, PartialEq)]
pub struct RocCurve {
    pub fpr: Vec<f64>,
    pub tpr: Vec<f64>,
    /// Score at or above which a sample counts as positive; the first point is `+inf`.
    pub thresholds: Vec<f64>,
}

impl RocCurve {
    pub fn auc(&self) -> Result<f64> {
        auc(&self.fpr, &self.tpr)
    }
}

/// ROC curve for labels in `{0, 1}` or `{-1, 1}`, with 1 the positive class.
///
/// One point per distinct score, highest first. Points lying on a straight
/// segment between their neighbours are dropped, and a `(0, 0)` point with
/// threshold `+inf` is prepended.
pub fn roc_curve(y_true: &[i64], y_score: &[f64]) -> Result<RocCurve> {
    check_lengths("y_score", y_true.len(), y_score.len())?;

    let classes: BTreeSet<i64> = y_true.iter().copied().collect();
    let zero_one = classes.iter().all(|c| [0, 1].contains(c));
    let signed = classes.iter().all(|c| [-1, 1].contains(c));
    if !(zero_one || signed) {
        return Err(PlotError::InvalidParameter(format!(
            "ROC labels must be {{0, 1}} or {{-1, 1}}, got {:?}",
            classes
        )));
    }
    if classes.len() < 2 {
        return Err(PlotError::InvalidParameter(
            "ROC curve needs both positive and negative samples".into(),
        ));
    }
    if y_score.iter().any(|s| !s.is_finite()) {
        return Err(PlotError::InvalidParameter("scores must be finite".into()));
    }

    let mut order: Vec<usize> = (0..y_score.len()).collect();
    order.sort_by(|&a, &b| y_score[b].total_cmp(&y_score[a]));

    // cumulative true/false positives at the last sample of each distinct score
    let mut tps = Vec::new();
    let mut fps = Vec::new();
    let mut thresholds = Vec::new();
    let mut tp = 0.0;
    for (rank, &i) in order.iter().enumerate() {
        if y_true[i] == 1 {
            tp += 1.0;
        }
        let last_of_score = order.get(rank + 1).is_none_or(|&next| y_score[next] != y_score[i]);
        if last_of_score {
            tps.push(tp);
            fps.push((rank + 1) as f64 - tp);
            thresholds.push(y_score[i]);
        }
    }

    let n = tps.len();
    let keep: Vec<usize> = (0..n)
        .filter(|&k| {
            if k == 0 || k + 1 == n {
                return true;
            }
            let bend = |v: &[f64]| v[k + 1] - 2.0 * v[k] + v[k - 1] != 0.0;
            bend(&fps) || bend(&tps)
        })
        .collect();

    let (total_fp, total_tp) = (fps[n - 1], tps[n - 1]);
    let mut curve = RocCurve {
        fpr: vec![0.0],
        tpr: vec![0.0],
        thresholds: vec![f64::INFINITY],
    };
    for k in keep {
        curve.fpr.push(fps[k] / total_fp);
        curve.tpr.push(tps[k] / total_tp);
        curve.thresholds.push(thresholds[k]);
    }
    Ok(curve)
}

/// Area under a curve by the trapezoidal rule. `x` must be monotonic.
pub fn auc(x: &[f64], y: &[f64]) -> Result<f64> {
    check_lengths("y", x.len(), y.len())?;
    if x.len() < 2 {
        return Err(PlotError::InvalidParameter(
            "at least 2 points are needed to compute an area".into(),
        ));
    }

    let steps: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
    let direction = if steps.iter().all(|d| *d >= 0.0) {
        1.0
    } else if steps.iter().all(|d| *d <= 0.0) {
        -1.0
    } else {
        return Err(PlotError::InvalidParameter("x is neither increasing nor decreasing".into()));
    };

    let area: f64 = steps
        .iter()
        .zip(y.windows(2))
        .map(|(dx, w)| dx * (w[0] + w[1]) / 2.0)
        .sum();
    Ok(direction * area)
}

/// Sample standard deviation ignoring `NaN`; `NaN` with fewer than two values.
pub fn sample_std(values: &[f64]) -> f64 {
    let finite: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    let n = finite.len();
    if n < 2 {
        return f64::NAN;
    }
    let mean = finite.iter().sum::<f64>() / n as f64;
    let ss: f64 = finite.iter().map(|v| (v - mean).powi(2)).sum();
    (ss / (n - 1) as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confusion_matrix_union_labels() {
        let cm = confusion_matrix(&[2, 0, 2, 2, 0, 1], &[0, 0, 2, 2, 0, 2]).unwrap();
        assert_eq!(cm.labels, vec![0, 1, 2]);
        assert_eq!(cm.counts, vec![vec![2, 0, 0], vec![0, 0, 1], vec![1, 0, 2]]);
        assert_eq!(cm.total(), 6);
        assert!((cm.accuracy() - 4.0 / 6.0).abs() < 1e-10);

        let cm = confusion_matrix(&[0, 0], &[0, 5]).unwrap();
        assert_eq!(cm.labels, vec![0, 5]);
        assert_eq!(cm.counts, vec![vec![1, 1], vec![0, 0]]);
    }

    #[test]
    fn test_confusion_matrix_validation() {
        assert!(matches!(confusion_matrix(&[], &[]), Err(PlotError::EmptyInput(_))));
        assert!(matches!(
            confusion_matrix(&[1, 0], &[1]),
            Err(PlotError::LengthMismatch { expected: 2, actual: 1, .. })
        ));
    }

    #[test]
    fn test_roc_curve_known_values() {
        let roc = roc_curve(&[0, 0, 1, 1], &[0.1, 0.4, 0.35, 0.8]).unwrap();
        assert_eq!(roc.fpr, vec![0.0, 0.0, 0.5, 0.5, 1.0]);
        assert_eq!(roc.tpr, vec![0.0, 0.5, 0.5, 1.0, 1.0]);
        assert_eq!(roc.thresholds[0], f64::INFINITY);
        assert_eq!(&roc.thresholds[1..], &[0.8, 0.4, 0.35, 0.1]);
        assert!((roc.auc().unwrap() - 0.75).abs() < 1e-10);
    }

    #[test]
    fn test_roc_curve_drops_collinear_points() {
        let roc = roc_curve(&[0, 0, 1, 1], &[0.1, 0.2, 0.8, 0.9]).unwrap();
        assert_eq!(roc.fpr, vec![0.0, 0.0, 0.0, 1.0]);
        assert_eq!(roc.tpr, vec![0.0, 0.5, 1.0, 1.0]);
        assert!((roc.auc().unwrap() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_roc_curve_ties_and_signed_labels() {
        let roc = roc_curve(&[-1, 1, -1, 1], &[0.5, 0.5, 0.5, 0.5]).unwrap();
        assert_eq!(roc.fpr, vec![0.0, 1.0]);
        assert_eq!(roc.tpr, vec![0.0, 1.0]);
        assert!((roc.auc().unwrap() - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_roc_curve_validation() {
        assert!(roc_curve(&[1, 1], &[0.2, 0.3]).is_err());
        assert!(roc_curve(&[0, 2], &[0.2, 0.3]).is_err());
        assert!(roc_curve(&[0, 1], &[0.2, f64::NAN]).is_err());
        assert!(roc_curve(&[0, 1], &[0.2]).is_err());
    }

    #[test]
    fn test_auc_trapezoid() {
        assert!((auc(&[0.0, 1.0, 2.0], &[0.0, 1.0, 0.0]).unwrap() - 1.0).abs() < 1e-10);
        assert!((auc(&[2.0, 1.0, 0.0], &[1.0, 1.0, 1.0]).unwrap() - 2.0).abs() < 1e-10);
        assert!(auc(&[0.0, 2.0, 1.0], &[1.0, 1.0, 1.0]).is_err());
        assert!(auc(&[0.0], &[1.0]).is_err());
    }

    #[test]
    fn test_closure_classifier() {
        let model = |p: &[f64; 2]| i64::from(p[0] + p[1] > 0.0);
        assert_eq!(model.predict(&[[1.0, 1.0], [-1.0, -2.0]]), vec![1, 0]);
    }

    #[test]
    fn test_sample_std() {
        assert!((sample_std(&[2.0, 4.0, f64::NAN, 6.0]) - 2.0).abs() < 1e-10);
        assert!(sample_std(&[1.0]).is_nan());
    }
}
