/// eval/mod.rs — Held-out evaluation and cross-validation
///
/// `evaluate` runs one complete experiment:
///
///   split → fit on train → predict test → accuracy → decision scores
///   → binarise test labels → per-class ROC, micro ROC, pooled PR curve
///   → 2-D PCA of the test rows, tagged with truth and prediction
///
/// The evaluator keeps no state between calls. The classifier is refitted
/// every time, and the inputs are only read.
pub mod curves;
pub mod pca;
pub mod split;

use ndarray::{Array2, ArrayView1};
use serde::Serialize;
use tracing::{info, warn};

use crate::dataset::Dataset;
use crate::error::{ClfError, Result};
use crate::labels::Label;
use crate::svm::Classifier;
use curves::{PrCurve, RocCurve};

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationResult {
    pub accuracy: f64,
    pub n_train: usize,
    pub n_test: usize,
    pub classes: Vec<Label>,
    /// One curve per binarised column that has both outcomes in the test set.
    pub roc: Vec<RocCurve>,
    pub micro_roc: Option<RocCurve>,
    pub precision_recall: Option<PrCurve>,
    /// Test rows in PCA coordinates, for the scatter figures only.
    #[serde(skip)]
    pub projection: Vec<ProjectedPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
    pub label: Label,
    pub predicted: Label,
}

impl ProjectedPoint {
    pub fn correct(&self) -> bool {
        self.label == self.predicted
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CrossValidation {
    pub folds: usize,
    pub accuracies: Vec<f64>,
    pub mean_accuracy: f64,
}

#[derive(Debug, Clone)]
pub struct Evaluator {
    test_fraction: f64,
    seed: u64,
}

impl Evaluator {
    pub fn new(test_fraction: f64, seed: u64) -> Result<Self> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(ClfError::Config(format!(
                "test fraction must lie strictly between 0 and 1, got {test_fraction}"
            )));
        }
        Ok(Self { test_fraction, seed })
    }

    pub fn evaluate<C: Classifier>(&self, data: &Dataset, classifier: &mut C) -> Result<EvaluationResult> {
        ensure_rows(data)?;
        let parts = split::train_test_split(data.len(), self.test_fraction, self.seed)?;
        let train = data.select(&parts.train);
        let test = data.select(&parts.test);
        info!(train = train.len(), test = test.len(), seed = self.seed, "held-out split");

        classifier.fit(train.features.view(), train.labels.view())?;
        let predicted = classifier.predict(test.features.view())?;
        let hits = predicted.iter().zip(test.labels.iter()).filter(|(p, t)| p == t).count();
        let accuracy = hits as f64 / test.len() as f64;
        let scores = classifier.decision_function(test.features.view())?;
        let classes = classifier.classes().to_vec();
        info!(accuracy, "held-out accuracy");

        let truth = binarize(test.labels.view(), &classes);
        if truth.dim() != scores.dim() {
            return Err(ClfError::Shape(format!(
                "binarised labels are {:?} but decision scores are {:?}",
                truth.dim(),
                scores.dim()
            )));
        }

        let mut roc = Vec::with_capacity(truth.ncols());
        for c in 0..truth.ncols() {
            let class = column_class(&classes, c);
            let column_truth = truth.column(c).to_vec();
            let column_scores = scores.column(c).to_vec();
            match curves::roc(format!("class {class}"), &column_truth, &column_scores) {
                Some(curve) => {
                    info!(class, auc = curve.auc, "ROC");
                    roc.push(curve);
                }
                None => warn!(class, "ROC undefined: test set lacks positives or negatives for this class"),
            }
        }

        let flat_truth: Vec<bool> = truth.iter().copied().collect();
        let flat_scores: Vec<f64> = scores.iter().copied().collect();

        let micro_roc = curves::roc("micro", &flat_truth, &flat_scores);
        match &micro_roc {
            Some(curve) => info!(auc = curve.auc, "micro-averaged ROC"),
            None => warn!("micro-averaged ROC undefined"),
        }
        let precision_recall = curves::precision_recall(&flat_truth, &flat_scores);
        if let Some(pr) = &precision_recall {
            info!(average_precision = pr.average_precision, "precision/recall");
        }

        let coords = pca::project(test.features.view(), self.seed);
        let projection = coords
            .rows()
            .into_iter()
            .zip(test.labels.iter().zip(predicted.iter()))
            .map(|(row, (&label, &predicted))| ProjectedPoint {
                x: row[0],
                y: row[1],
                label,
                predicted,
            })
            .collect();

        Ok(EvaluationResult {
            accuracy,
            n_train: train.len(),
            n_test: test.len(),
            classes,
            roc,
            micro_roc,
            precision_recall,
            projection,
        })
    }

    /// Stratified k-fold accuracy. `make` supplies a fresh classifier per fold.
    pub fn cross_validate<C, F>(&self, data: &Dataset, folds: usize, mut make: F) -> Result<CrossValidation>
    where
        C: Classifier,
        F: FnMut() -> C,
    {
        ensure_rows(data)?;
        let labels = data.labels.to_vec();
        let mut accuracies = Vec::with_capacity(folds);

        for (fold, part) in split::stratified_folds(&labels, folds, self.seed)?.into_iter().enumerate() {
            let train = data.select(&part.train);
            let test = data.select(&part.test);

            let mut classifier = make();
            classifier.fit(train.features.view(), train.labels.view())?;
            let accuracy = classifier.score(test.features.view(), test.labels.view())?;
            info!(fold, accuracy, "fold scored");
            accuracies.push(accuracy);
        }

        let mean_accuracy = accuracies.iter().sum::<f64>() / accuracies.len() as f64;
        info!(folds, mean_accuracy, "cross-validation finished");

        Ok(CrossValidation {
            folds,
            accuracies,
            mean_accuracy,
        })
    }
}

fn ensure_rows(data: &Dataset) -> Result<()> {
    if data.is_empty() {
        return Err(ClfError::InsufficientData("no records to evaluate".into()));
    }
    Ok(())
}

/// One-vs-rest indicator matrix. Two classes collapse to a single column
/// marking `classes[1]`, matching the single decision column.
pub fn binarize(labels: ArrayView1<'_, Label>, classes: &[Label]) -> Array2<bool> {
    if classes.len() == 2 {
        Array2::from_shape_fn((labels.len(), 1), |(i, _)| labels[i] == classes[1])
    } else {
        Array2::from_shape_fn((labels.len(), classes.len()), |(i, c)| labels[i] == classes[c])
    }
}

fn column_class(classes: &[Label], column: usize) -> Label {
    if classes.len() == 2 {
        classes[1]
    } else {
        classes[column]
    }
}
