/// eval/split.rs — Seeded train/test partitions and stratified folds
///
/// Everything here is a pure function of (n, labels, seed): the same seed
/// always yields the same partition.
use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{ClfError, Result};
use crate::labels::Label;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n` and hold out the first ⌈fraction·n⌉ indices for testing.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> Result<Split> {
    let n_test = (test_fraction * n as f64).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(ClfError::InsufficientData(format!(
            "cannot hold out {test_fraction} of {n} rows and still train"
        )));
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(&mut StdRng::seed_from_u64(seed));
    let train = order.split_off(n_test);

    Ok(Split { train, test: order })
}

/// Partition row indices into `folds` test sets with each label spread as
/// evenly as possible across them. Returns one `Split` per fold.
pub fn stratified_folds(labels: &[Label], folds: usize, seed: u64) -> Result<Vec<Split>> {
    if folds < 2 {
        return Err(ClfError::Config(format!("need at least 2 folds, got {folds}")));
    }
    if labels.len() < folds {
        return Err(ClfError::InsufficientData(format!(
            "{} rows cannot fill {folds} folds",
            labels.len()
        )));
    }

    let mut by_label: BTreeMap<Label, Vec<usize>> = BTreeMap::new();
    for (i, &label) in labels.iter().enumerate() {
        by_label.entry(label).or_default().push(i);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut assignment = vec![0usize; labels.len()];
    let mut dealt = 0usize;
    for members in by_label.values_mut() {
        members.shuffle(&mut rng);
        for &row in members.iter() {
            assignment[row] = dealt % folds;
            dealt += 1;
        }
    }

    Ok((0..folds)
        .map(|fold| {
            let (test, train): (Vec<usize>, Vec<usize>) =
                (0..labels.len()).partition(|&row| assignment[row] == fold);
            Split { train, test }
        })
        .collect())
}
