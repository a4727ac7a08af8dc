/// svm/kernel.rs — Gaussian (RBF) kernel
///
///   K(x, z) = exp(-gamma · |x − z|²)
///
/// Squared distances come from |x|² + |z|² − 2·x·z so the bulk of the work
/// is a single matrix product; the exponentiation runs row-parallel.
use ndarray::parallel::prelude::*;
use ndarray::{Array1, Array2, ArrayView2, Axis};

pub fn squared_norms(x: ArrayView2<'_, f64>) -> Array1<f64> {
    x.map_axis(Axis(1), |row| row.dot(&row))
}

/// Kernel between every row of `a` and every row of `b`: shape (a.rows, b.rows).
pub fn rbf(a: ArrayView2<'_, f64>, b: ArrayView2<'_, f64>, gamma: f64) -> Array2<f64> {
    let a_norms = squared_norms(a);
    let b_norms = squared_norms(b);
    let mut k = a.dot(&b.t());

    k.axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(i, mut row)| {
            for (j, v) in row.iter_mut().enumerate() {
                // rounding can push the distance a hair below zero
                let dist = (a_norms[i] + b_norms[j] - 2.0 * *v).max(0.0);
                *v = (-gamma * dist).exp();
            }
        });
    k
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_self_similarity_is_one() {
        let x = array![[1.0, 2.0], [0.5, -3.0]];
        let k = rbf(x.view(), x.view(), 0.7);
        assert_relative_eq!(k[[0, 0]], 1.0, epsilon = 1e-12);
        assert_relative_eq!(k[[1, 1]], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_known_value() {
        let a = array![[0.0, 0.0]];
        let b = array![[3.0, 4.0]];
        let k = rbf(a.view(), b.view(), 0.1);
        assert_relative_eq!(k[[0, 0]], (-2.5f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_symmetric_gram() {
        let x = array![[1.0, 0.0, 2.0], [0.0, 1.0, 1.0], [3.0, 3.0, 0.0]];
        let k = rbf(x.view(), x.view(), 0.25);
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(k[[i, j]], k[[j, i]], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_cross_shape() {
        let a = Array2::<f64>::zeros((4, 3));
        let b = Array2::<f64>::zeros((2, 3));
        assert_eq!(rbf(a.view(), b.view(), 1.0).dim(), (4, 2));
    }
}
