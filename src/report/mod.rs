/// report/mod.rs — Figure output for an evaluation result
///
/// Plotting is a side channel. Nothing here can fail a run: every error is
/// logged and the remaining figures are still attempted.
pub mod svg;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::Result;
use crate::eval::curves::{PrCurve, RocCurve};
use crate::eval::{EvaluationResult, ProjectedPoint};
use crate::labels::{Label, NEGATIVE, POSITIVE};

pub use self::svg::SvgPlotter;

pub const ROC_FILE: &str = "roc-curve.svg";
pub const PR_FILE: &str = "pr-curve.svg";
pub const DATA_SCATTER_FILE: &str = "data-scatter.svg";
pub const RESIDUAL_SCATTER_FILE: &str = "residual-scatter.svg";

/// One colour in a scatter figure.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterGroup {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

pub trait PlotSink {
    fn plot_roc(&self, curves: &[RocCurve], title: &str, path: &Path) -> Result<()>;
    fn plot_precision_recall(&self, curve: &PrCurve, title: &str, path: &Path) -> Result<()>;
    fn plot_scatter(&self, groups: &[ScatterGroup], title: &str, path: &Path) -> Result<()>;
}

fn class_name(label: Label) -> String {
    match label {
        POSITIVE => "positive".into(),
        NEGATIVE => "negative".into(),
        other => format!("class {other}"),
    }
}

/// Projected test rows grouped by true class, in class order.
pub fn groups_by_label(points: &[ProjectedPoint], classes: &[Label]) -> Vec<ScatterGroup> {
    classes
        .iter()
        .map(|&class| ScatterGroup {
            label: class_name(class),
            points: points.iter().filter(|p| p.label == class).map(|p| (p.x, p.y)).collect(),
        })
        .filter(|g| !g.points.is_empty())
        .collect()
}

/// Projected test rows split into correct and incorrect predictions.
pub fn groups_by_outcome(points: &[ProjectedPoint]) -> Vec<ScatterGroup> {
    let (correct, incorrect): (Vec<_>, Vec<_>) = points.iter().partition(|p| p.correct());
    [("correct", correct), ("incorrect", incorrect)]
        .into_iter()
        .filter(|(_, members)| !members.is_empty())
        .map(|(label, members)| ScatterGroup {
            label: label.into(),
            points: members.iter().map(|p| (p.x, p.y)).collect(),
        })
        .collect()
}

/// Render every curve `result` carries into `dir`. Returns the files written.
pub fn publish<S: PlotSink + ?Sized>(sink: &S, result: &EvaluationResult, dir: &Path, title: &str) -> Vec<PathBuf> {
    if let Err(e) = fs::create_dir_all(dir) {
        warn!(dir = %dir.display(), error = %e, "cannot create figures directory, skipping plots");
        return Vec::new();
    }

    let mut written = Vec::new();

    let mut roc_curves = result.roc.clone();
    if result.classes.len() > 2 {
        if let Some(micro) = &result.micro_roc {
            roc_curves.push(micro.clone());
        }
    }
    if roc_curves.is_empty() {
        warn!("no ROC curve defined, skipping {ROC_FILE}");
    } else {
        let path = dir.join(ROC_FILE);
        match sink.plot_roc(&roc_curves, &format!("ROC: {title}"), &path) {
            Ok(()) => written.push(path),
            Err(e) => warn!(error = %e, "ROC figure not written"),
        }
    }

    match &result.precision_recall {
        Some(curve) => {
            let path = dir.join(PR_FILE);
            match sink.plot_precision_recall(curve, &format!("Precision-Recall: {title}"), &path) {
                Ok(()) => written.push(path),
                Err(e) => warn!(error = %e, "precision/recall figure not written"),
            }
        }
        None => warn!("no precision/recall curve defined, skipping {PR_FILE}"),
    }

    if result.projection.is_empty() {
        warn!("no projected test rows, skipping {DATA_SCATTER_FILE} and {RESIDUAL_SCATTER_FILE}");
    } else {
        let scatters = [
            (
                DATA_SCATTER_FILE,
                format!("PCA of test rows: {title}"),
                groups_by_label(&result.projection, &result.classes),
            ),
            (
                RESIDUAL_SCATTER_FILE,
                format!("Prediction outcome: {title}"),
                groups_by_outcome(&result.projection),
            ),
        ];
        for (file, heading, groups) in scatters {
            let path = dir.join(file);
            match sink.plot_scatter(&groups, &heading, &path) {
                Ok(()) => written.push(path),
                Err(e) => warn!(error = %e, file, "scatter figure not written"),
            }
        }
    }

    for path in &written {
        info!(path = %path.display(), "figure written");
    }
    written
}
