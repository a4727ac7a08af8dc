/// features/select.rs — Univariate chi² column selection
///
/// For every column j and class c:
///
///   observed[c][j] = Σ x_ij over rows labelled c
///   expected[c][j] = P(c) · Σ x_ij over all rows
///   chi²_j         = Σ_c (observed − expected)² / expected
///
/// Columns are ranked by chi² and the best k are kept, in their original
/// order. Every column must be non-negative, which holds for counts,
/// frequencies and the 0/1 motif flags.
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};

use crate::error::{ClfError, Result};
use crate::labels::Label;

pub fn chi2_scores(x: ArrayView2<'_, f64>, y: ArrayView1<'_, Label>) -> Result<Array1<f64>> {
    if x.nrows() != y.len() {
        return Err(ClfError::Shape(format!(
            "{} feature rows but {} labels",
            x.nrows(),
            y.len()
        )));
    }
    if x.iter().any(|&v| v < 0.0) {
        return Err(ClfError::Config("chi² selection needs non-negative features".into()));
    }

    let mut classes: Vec<Label> = y.to_vec();
    classes.sort_unstable();
    classes.dedup();

    let n = y.len() as f64;
    let totals = x.sum_axis(Axis(0));
    let mut scores = Array1::zeros(x.ncols());

    for class in classes {
        let rows: Vec<usize> = (0..y.len()).filter(|&i| y[i] == class).collect();
        let observed = x.select(Axis(0), &rows).sum_axis(Axis(0));
        let share = rows.len() as f64 / n;

        for (j, score) in scores.iter_mut().enumerate() {
            let expected = share * totals[j];
            // an all-zero column carries no evidence either way
            if expected > 0.0 {
                *score += (observed[j] - expected).powi(2) / expected;
            }
        }
    }

    Ok(scores)
}

/// Indices of the `k` best scores, ascending. Equal scores keep the
/// lower column index; `k` larger than the width keeps everything.
pub fn top_k(scores: ArrayView1<'_, f64>, k: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));
    order.truncate(k);
    order.sort_unstable();
    order
}
