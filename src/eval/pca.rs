/// eval/pca.rs — Two-component PCA for the scatter figures
///
/// Principal axes come from power iteration on XcᵀXc without ever forming
/// the d×d covariance: each step is two matrix-vector products against the
/// centred rows. The second axis is kept orthogonal to the first by
/// deflation. Axis signs are fixed so that the largest loading is positive,
/// so the seeded random start does not show in the result.
use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const COMPONENTS: usize = 2;

const MAX_ITER: usize = 500;
const CONVERGED: f64 = 1e-10;

/// Rows of `x` expressed in its first two principal axes: shape (n, 2).
/// Missing axes (rank below 2, constant data) project to zero.
pub fn project(x: ArrayView2<'_, f64>, seed: u64) -> Array2<f64> {
    let Some(mean) = x.mean_axis(Axis(0)) else {
        return Array2::zeros((0, COMPONENTS));
    };
    let centred = &x - &mean;
    let total: f64 = centred.iter().map(|v| v * v).sum();
    let floor = 1e-10 * total;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut axes: Vec<Array1<f64>> = Vec::with_capacity(COMPONENTS);
    let mut projection = Array2::zeros((x.nrows(), COMPONENTS));

    for c in 0..COMPONENTS {
        if total <= 0.0 {
            break;
        }
        let start = Array1::from_shape_fn(x.ncols(), |_| rng.gen::<f64>() - 0.5);
        let Some(axis) = leading_axis(centred.view(), start, &axes, floor) else {
            break;
        };
        projection.column_mut(c).assign(&centred.dot(&axis));
        axes.push(axis);
    }

    projection
}

fn leading_axis(
    centred: ArrayView2<'_, f64>,
    mut v: Array1<f64>,
    found: &[Array1<f64>],
    floor: f64,
) -> Option<Array1<f64>> {
    orthogonalise(&mut v, found);
    v /= unit_norm(&v)?;

    for _ in 0..MAX_ITER {
        let mut w = centred.t().dot(&centred.dot(&v));
        orthogonalise(&mut w, found);
        let norm = unit_norm(&w)?;
        if norm <= floor {
            return None;
        }
        w /= norm;
        let step = (&w - &v).iter().map(|d| d * d).sum::<f64>().sqrt();
        let settled = step < CONVERGED;
        v = w;
        if settled {
            break;
        }
    }

    let pivot = v.iter().copied().fold(0.0_f64, |best, x| if x.abs() > best.abs() { x } else { best });
    if pivot < 0.0 {
        v.mapv_inplace(|x| -x);
    }
    Some(v)
}

fn orthogonalise(v: &mut Array1<f64>, found: &[Array1<f64>]) {
    for axis in found {
        let overlap = v.dot(axis);
        v.scaled_add(-overlap, axis);
    }
}

fn unit_norm(v: &Array1<f64>) -> Option<f64> {
    let norm = v.dot(v).sqrt();
    (norm > 0.0 && norm.is_finite()).then_some(norm)
}
