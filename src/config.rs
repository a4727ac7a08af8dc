/// config.rs — Run configuration
///
/// Every tunable is carried in `PipelineConfig` and handed to the
/// components that need it. Validation happens here, before any record
/// source is opened, so a bad flag never costs a FASTA parse.
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{ClfError, Result};

pub const DEFAULT_K: usize = 6;
/// 4^12 columns is already ~16.7M features per row.
pub const MAX_K: usize = 12;
pub const DEFAULT_TEST_FRACTION: f64 = 0.3;
pub const DEFAULT_FOLDS: usize = 5;

/// Which label scheme the run predicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// positive vs negative set, labels +1 / -1
    Enhancer,
    /// none / brain / limb / neural, labels 0..=3
    Tissue,
    /// none / forebrain / midbrain / hindbrain, labels 0..=3
    FineGrain,
}

impl FromStr for Task {
    type Err = ClfError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "enhancer" => Ok(Task::Enhancer),
            "tissue" => Ok(Task::Tissue),
            "fine-grain" => Ok(Task::FineGrain),
            other => Err(ClfError::Config(format!(
                "unknown task '{other}': expected one of enhancer|tissue|fine-grain"
            ))),
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Task::Enhancer => "enhancer",
            Task::Tissue => "tissue",
            Task::FineGrain => "fine-grain",
        };
        f.write_str(name)
    }
}

/// What to do with a k-mer containing a base outside a/c/g/t.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmbiguityPolicy {
    /// Fail the run with a Lookup error.
    Reject,
    /// Drop the k-mer from the counts and log it.
    Skip,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub task: Task,
    pub k: usize,
    pub normalize: bool,
    pub test_fraction: f64,
    pub seed: u64,
    pub cost: f64,
    /// `None` means 1 / n_features, resolved once the width is known.
    pub gamma: Option<f64>,
    pub ambiguity: AmbiguityPolicy,
    /// Stratified folds for cross-validation.
    pub folds: usize,
    /// Keep only the k highest-scoring columns by chi². `None` keeps all.
    pub select_k: Option<usize>,
    /// `None` disables plotting.
    pub figures_dir: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            task: Task::Enhancer,
            k: DEFAULT_K,
            normalize: true,
            test_fraction: DEFAULT_TEST_FRACTION,
            seed: 0,
            cost: 1.0,
            gamma: None,
            ambiguity: AmbiguityPolicy::Reject,
            folds: DEFAULT_FOLDS,
            select_k: None,
            figures_dir: Some(PathBuf::from("figures")),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        validate_k(self.k)?;
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(ClfError::Config(format!(
                "test fraction must lie strictly between 0 and 1, got {}",
                self.test_fraction
            )));
        }
        if !(self.cost > 0.0 && self.cost.is_finite()) {
            return Err(ClfError::Config(format!(
                "SVM cost C must be positive, got {}",
                self.cost
            )));
        }
        if self.folds < 2 {
            return Err(ClfError::Config(format!(
                "need at least 2 folds, got {}",
                self.folds
            )));
        }
        if self.select_k == Some(0) {
            return Err(ClfError::Config("--select-k must keep at least one column".into()));
        }
        if let Some(gamma) = self.gamma {
            if !(gamma > 0.0 && gamma.is_finite()) {
                return Err(ClfError::Config(format!(
                    "RBF gamma must be positive, got {gamma}"
                )));
            }
        }
        Ok(())
    }
}

pub fn validate_k(k: usize) -> Result<()> {
    if k == 0 {
        return Err(ClfError::Config("k-mer length must be at least 1".into()));
    }
    if k > MAX_K {
        return Err(ClfError::Config(format!(
            "k-mer length {k} exceeds the supported maximum of {MAX_K}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_parsing() {
        assert_eq!("enhancer".parse::<Task>().unwrap(), Task::Enhancer);
        assert_eq!("tissue".parse::<Task>().unwrap(), Task::Tissue);
        assert_eq!("fine-grain".parse::<Task>().unwrap(), Task::FineGrain);
    }

    #[test]
    fn test_unknown_task_is_config_error() {
        let err = "heart".parse::<Task>().unwrap_err();
        assert!(matches!(err, ClfError::Config(_)));
    }

    #[test]
    fn test_task_display_roundtrips() {
        for task in [Task::Enhancer, Task::Tissue, Task::FineGrain] {
            assert_eq!(task.to_string().parse::<Task>().unwrap(), task);
        }
    }

    #[test]
    fn test_default_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_k_rejected() {
        let cfg = PipelineConfig { k: 0, ..Default::default() };
        assert!(matches!(cfg.validate(), Err(ClfError::Config(_))));
    }

    #[test]
    fn test_test_fraction_bounds() {
        for bad in [0.0, 1.0, -0.2, 1.5, f64::NAN] {
            let cfg = PipelineConfig { test_fraction: bad, ..Default::default() };
            assert!(cfg.validate().is_err(), "fraction {bad} accepted");
        }
    }

    #[test]
    fn test_single_fold_rejected() {
        let cfg = PipelineConfig { folds: 1, ..Default::default() };
        assert!(matches!(cfg.validate(), Err(ClfError::Config(_))));
    }

    #[test]
    fn test_select_zero_columns_rejected() {
        let cfg = PipelineConfig { select_k: Some(0), ..Default::default() };
        assert!(matches!(cfg.validate(), Err(ClfError::Config(_))));
        let cfg = PipelineConfig { select_k: Some(10), ..Default::default() };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_non_positive_gamma_rejected() {
        let cfg = PipelineConfig { gamma: Some(0.0), ..Default::default() };
        assert!(cfg.validate().is_err());
    }
}
