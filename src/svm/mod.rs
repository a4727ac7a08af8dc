/// svm/mod.rs — Classifier contract and the RBF support-vector classifier
///
/// The evaluation code only ever talks to `Classifier`. `Svc` is the
/// concrete C-SVC: one machine for two classes, one-vs-rest machines for
/// more, each solved by SMO over a precomputed Gram matrix.
pub mod kernel;
pub mod smo;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use tracing::{debug, warn};

use crate::error::{ClfError, Result};
use crate::labels::Label;

pub trait Classifier {
    /// Train from scratch. Any previous fit is discarded.
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, Label>) -> Result<()>;

    /// Sorted distinct labels seen by the last `fit`.
    fn classes(&self) -> &[Label];

    /// Unthresholded scores: one column for two classes (positive means
    /// `classes()[1]`), one column per class otherwise.
    fn decision_function(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>>;

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<Label>>;

    /// Fraction of rows predicted correctly.
    fn score(&self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, Label>) -> Result<f64> {
        let predicted = self.predict(x)?;
        if predicted.len() != y.len() {
            return Err(ClfError::Shape(format!(
                "{} predictions for {} labels",
                predicted.len(),
                y.len()
            )));
        }
        if y.is_empty() {
            return Err(ClfError::InsufficientData("cannot score an empty set".into()));
        }
        let hits = predicted.iter().zip(y.iter()).filter(|(p, t)| p == t).count();
        Ok(hits as f64 / y.len() as f64)
    }
}

#[derive(Debug, Clone)]
pub struct SvcParams {
    pub cost: f64,
    /// `None` → 1 / n_features at fit time.
    pub gamma: Option<f64>,
    pub tolerance: f64,
    pub max_iter: usize,
}

impl Default for SvcParams {
    fn default() -> Self {
        Self {
            cost: 1.0,
            gamma: None,
            tolerance: 1e-3,
            max_iter: 1_000_000,
        }
    }
}

#[derive(Debug, Clone)]
struct Machine {
    coef: Array1<f64>,
    rho: f64,
}

#[derive(Debug, Clone)]
struct Model {
    classes: Vec<Label>,
    gamma: f64,
    train: Array2<f64>,
    machines: Vec<Machine>,
}

#[derive(Debug, Clone, Default)]
pub struct Svc {
    params: SvcParams,
    model: Option<Model>,
}

impl Svc {
    pub fn new(params: SvcParams) -> Self {
        Self { params, model: None }
    }

    fn model(&self) -> Result<&Model> {
        self.model
            .as_ref()
            .ok_or_else(|| ClfError::Shape("classifier used before fit".into()))
    }
}

impl Classifier for Svc {
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, Label>) -> Result<()> {
        self.model = None;

        if x.nrows() != y.len() {
            return Err(ClfError::Shape(format!(
                "{} training rows but {} labels",
                x.nrows(),
                y.len()
            )));
        }

        let mut classes: Vec<Label> = y.to_vec();
        classes.sort_unstable();
        classes.dedup();
        if classes.len() < 2 {
            return Err(ClfError::InsufficientData(format!(
                "training set has {} distinct label(s), need at least 2",
                classes.len()
            )));
        }

        let gamma = self.params.gamma.unwrap_or(1.0 / x.ncols().max(1) as f64);
        let gram = kernel::rbf(x, x, gamma);

        // two classes: a single machine whose positive side is classes[1]
        let targets: Vec<Label> = if classes.len() == 2 {
            vec![classes[1]]
        } else {
            classes.clone()
        };

        let mut machines = Vec::with_capacity(targets.len());
        for target in targets {
            let signs: Vec<f64> = y.iter().map(|&l| if l == target { 1.0 } else { -1.0 }).collect();
            let sol = smo::solve(
                gram.view(),
                &signs,
                self.params.cost,
                self.params.tolerance,
                self.params.max_iter,
            );
            if !sol.converged {
                warn!(class = target, iterations = sol.iterations, "SMO hit the iteration cap");
            }
            debug!(
                class = target,
                iterations = sol.iterations,
                support = sol.coef.iter().filter(|c| **c != 0.0).count(),
                "trained machine"
            );
            machines.push(Machine {
                coef: sol.coef,
                rho: sol.rho,
            });
        }

        self.model = Some(Model {
            classes,
            gamma,
            train: x.to_owned(),
            machines,
        });
        Ok(())
    }

    fn classes(&self) -> &[Label] {
        self.model.as_ref().map(|m| m.classes.as_slice()).unwrap_or(&[])
    }

    fn decision_function(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        let model = self.model()?;
        if x.ncols() != model.train.ncols() {
            return Err(ClfError::Shape(format!(
                "{} feature columns, model was trained on {}",
                x.ncols(),
                model.train.ncols()
            )));
        }

        let k = kernel::rbf(x, model.train.view(), model.gamma);
        let mut scores = Array2::zeros((x.nrows(), model.machines.len()));
        for (c, machine) in model.machines.iter().enumerate() {
            let column = k.dot(&machine.coef) - machine.rho;
            scores.column_mut(c).assign(&column);
        }
        Ok(scores)
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<Label>> {
        let scores = self.decision_function(x)?;
        let classes = &self.model()?.classes;

        let labels = scores
            .rows()
            .into_iter()
            .map(|row| {
                if classes.len() == 2 {
                    if row[0] > 0.0 {
                        classes[1]
                    } else {
                        classes[0]
                    }
                } else {
                    // first maximum wins
                    let mut best = 0;
                    for (c, &s) in row.iter().enumerate() {
                        if s > row[best] {
                            best = c;
                        }
                    }
                    classes[best]
                }
            })
            .collect();
        Ok(labels)
    }
}
