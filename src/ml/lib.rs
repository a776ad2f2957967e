//! Diagnostic plots for machine-learning models.
//!
//! Metrics are computed here (confusion matrix, ROC curve, AUC) and drawn as
//! [`charts::Chart`]s.

pub mod metrics;
mod visualizations;

pub use metrics::{Classifier, ConfusionMatrix, RocCurve, auc, confusion_matrix, roc_curve};
pub use visualizations::*;
