/// eval/curves.rs — ROC and precision/recall curves
///
/// Thresholds are the distinct scores in descending order. At each one
/// every sample scoring at or above it is called positive.
///
///   ROC   starts at (0, 0), ends at (1, 1); undefined without both classes
///   PR    runs from full recall down to (recall 0, precision 1);
///         undefined without positives
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RocCurve {
    pub label: String,
    pub fpr: Vec<f64>,
    pub tpr: Vec<f64>,
    pub auc: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrCurve {
    pub precision: Vec<f64>,
    pub recall: Vec<f64>,
    pub average_precision: f64,
}

/// Cumulative (false positives, true positives) at each distinct threshold.
fn cumulative_counts(truth: &[bool], scores: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut fps = Vec::new();
    let mut tps = Vec::new();
    let (mut fp, mut tp) = (0.0, 0.0);
    for (pos, &i) in order.iter().enumerate() {
        if truth[i] {
            tp += 1.0;
        } else {
            fp += 1.0;
        }
        let last_of_threshold = order
            .get(pos + 1)
            .map_or(true, |&next| scores[next] != scores[i]);
        if last_of_threshold {
            fps.push(fp);
            tps.push(tp);
        }
    }
    (fps, tps)
}

pub fn roc(label: impl Into<String>, truth: &[bool], scores: &[f64]) -> Option<RocCurve> {
    let (fps, tps) = cumulative_counts(truth, scores);
    let negatives = *fps.last()?;
    let positives = *tps.last()?;
    if negatives == 0.0 || positives == 0.0 {
        return None;
    }

    let fpr: Vec<f64> = std::iter::once(0.0).chain(fps.iter().map(|f| f / negatives)).collect();
    let tpr: Vec<f64> = std::iter::once(0.0).chain(tps.iter().map(|t| t / positives)).collect();
    let auc = trapezoid(&fpr, &tpr);

    Some(RocCurve {
        label: label.into(),
        fpr,
        tpr,
        auc,
    })
}

pub fn precision_recall(truth: &[bool], scores: &[f64]) -> Option<PrCurve> {
    let (fps, tps) = cumulative_counts(truth, scores);
    let positives = *tps.last()?;
    if positives == 0.0 {
        return None;
    }

    // stop at the first threshold that already reaches full recall
    let full = tps.iter().position(|&t| t == positives)?;

    let mut precision: Vec<f64> = (0..=full).rev().map(|i| tps[i] / (tps[i] + fps[i])).collect();
    let mut recall: Vec<f64> = (0..=full).rev().map(|i| tps[i] / positives).collect();
    precision.push(1.0);
    recall.push(0.0);

    let average_precision = recall
        .windows(2)
        .zip(&precision)
        .map(|(r, p)| (r[0] - r[1]) * p)
        .sum();

    Some(PrCurve {
        precision,
        recall,
        average_precision,
    })
}

/// Area under a piecewise-linear curve through (x, y).
pub fn trapezoid(x: &[f64], y: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| (xs[1] - xs[0]) * (ys[0] + ys[1]) / 2.0)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_perfect_ranking() {
        let truth = [false, false, true, true];
        let scores = [0.1, 0.2, 0.8, 0.9];
        let curve = roc("1", &truth, &scores).unwrap();
        assert_relative_eq!(curve.auc, 1.0);
        assert_eq!(curve.fpr.first(), Some(&0.0));
        assert_eq!(curve.tpr.last(), Some(&1.0));
    }

    #[test]
    fn test_inverted_ranking() {
        let curve = roc("1", &[true, false], &[0.1, 0.9]).unwrap();
        assert_relative_eq!(curve.auc, 0.0);
    }

    #[test]
    fn test_textbook_example() {
        // y = [0, 0, 1, 1], scores = [0.1, 0.4, 0.35, 0.8]
        let truth = [false, false, true, true];
        let scores = [0.1, 0.4, 0.35, 0.8];
        let curve = roc("1", &truth, &scores).unwrap();
        assert_eq!(curve.fpr, vec![0.0, 0.0, 0.5, 0.5, 1.0]);
        assert_eq!(curve.tpr, vec![0.0, 0.5, 0.5, 1.0, 1.0]);
        assert_relative_eq!(curve.auc, 0.75);

        let pr = precision_recall(&truth, &scores).unwrap();
        assert_eq!(pr.recall, vec![1.0, 0.5, 0.5, 0.0]);
        let expected = [2.0 / 3.0, 0.5, 1.0, 1.0];
        for (got, want) in pr.precision.iter().zip(expected) {
            assert_relative_eq!(*got, want, epsilon = 1e-12);
        }
        assert_relative_eq!(pr.average_precision, 0.5 * 2.0 / 3.0 + 0.5 * 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_tied_scores_share_a_threshold() {
        let truth = [true, false, true, false];
        let scores = [0.5, 0.5, 0.5, 0.5];
        let curve = roc("1", &truth, &scores).unwrap();
        assert_eq!(curve.fpr, vec![0.0, 1.0]);
        assert_eq!(curve.tpr, vec![0.0, 1.0]);
        assert_relative_eq!(curve.auc, 0.5);
    }

    #[test]
    fn test_single_class_is_undefined() {
        assert!(roc("1", &[true, true], &[0.2, 0.3]).is_none());
        assert!(roc("1", &[false, false], &[0.2, 0.3]).is_none());
        assert!(precision_recall(&[false, false], &[0.2, 0.3]).is_none());
        assert!(roc("1", &[], &[]).is_none());
    }

    #[test]
    fn test_trapezoid_unit_square() {
        assert_relative_eq!(trapezoid(&[0.0, 1.0], &[1.0, 1.0]), 1.0);
        assert_relative_eq!(trapezoid(&[0.0, 1.0], &[0.0, 1.0]), 0.5);
    }
}
