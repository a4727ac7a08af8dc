/// svm/smo.rs — Sequential minimal optimisation for the C-SVC dual
///
///   min ½ αᵀQα − eᵀα   s.t.  0 ≤ α ≤ C,  yᵀα = 0,  Q_ij = y_i y_j K_ij
///
/// Each step picks the maximal violating pair (i from I_up with the
/// largest −y·G, j from I_low with the smallest), solves the two-variable
/// subproblem analytically and clips it back into the box. Stops once the
/// violation drops under `tolerance` or after `max_iter` steps.
use ndarray::{Array1, ArrayView2};

/// Floor for the curvature of a two-variable subproblem.
const TAU: f64 = 1e-12;

#[derive(Debug, Clone)]
pub struct Solution {
    /// α_i · y_i for every training row.
    pub coef: Array1<f64>,
    pub rho: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// `kernel` is the full Gram matrix; `y` holds ±1 targets.
pub fn solve(kernel: ArrayView2<'_, f64>, y: &[f64], cost: f64, tolerance: f64, max_iter: usize) -> Solution {
    let n = y.len();
    let mut alpha = vec![0.0; n];
    let mut grad = vec![-1.0; n];
    let mut iterations = 0usize;
    let mut converged = false;

    while iterations < max_iter {
        let Some((i, j)) = select_pair(&alpha, &grad, y, cost, tolerance) else {
            converged = true;
            break;
        };
        iterations += 1;

        let (old_i, old_j) = (alpha[i], alpha[j]);
        let k_ii = kernel[[i, i]];
        let k_jj = kernel[[j, j]];
        let q_ij = y[i] * y[j] * kernel[[i, j]];

        if y[i] != y[j] {
            let quad = (k_ii + k_jj + 2.0 * q_ij).max(TAU);
            let delta = (-grad[i] - grad[j]) / quad;
            let diff = alpha[i] - alpha[j];
            alpha[i] += delta;
            alpha[j] += delta;

            if diff > 0.0 {
                if alpha[j] < 0.0 {
                    alpha[j] = 0.0;
                    alpha[i] = diff;
                }
                if alpha[i] > cost {
                    alpha[i] = cost;
                    alpha[j] = cost - diff;
                }
            } else {
                if alpha[i] < 0.0 {
                    alpha[i] = 0.0;
                    alpha[j] = -diff;
                }
                if alpha[j] > cost {
                    alpha[j] = cost;
                    alpha[i] = cost + diff;
                }
            }
        } else {
            let quad = (k_ii + k_jj - 2.0 * q_ij).max(TAU);
            let delta = (grad[i] - grad[j]) / quad;
            let sum = alpha[i] + alpha[j];
            alpha[i] -= delta;
            alpha[j] += delta;

            if sum > cost {
                if alpha[i] > cost {
                    alpha[i] = cost;
                    alpha[j] = sum - cost;
                }
                if alpha[j] > cost {
                    alpha[j] = cost;
                    alpha[i] = sum - cost;
                }
            } else {
                if alpha[j] < 0.0 {
                    alpha[j] = 0.0;
                    alpha[i] = sum;
                }
                if alpha[i] < 0.0 {
                    alpha[i] = 0.0;
                    alpha[j] = sum;
                }
            }
        }

        let d_i = alpha[i] - old_i;
        let d_j = alpha[j] - old_j;
        for t in 0..n {
            grad[t] += y[t] * (y[i] * kernel[[i, t]] * d_i + y[j] * kernel[[j, t]] * d_j);
        }
    }

    let rho = bias(&alpha, &grad, y, cost);
    let coef = alpha.iter().zip(y).map(|(a, t)| a * t).collect();

    Solution {
        coef,
        rho,
        iterations,
        converged,
    }
}

fn select_pair(alpha: &[f64], grad: &[f64], y: &[f64], cost: f64, tolerance: f64) -> Option<(usize, usize)> {
    let mut g_max = f64::NEG_INFINITY;
    let mut g_min = f64::INFINITY;
    let mut up = None;
    let mut low = None;

    for t in 0..y.len() {
        let v = -y[t] * grad[t];
        let in_up = (y[t] > 0.0 && alpha[t] < cost) || (y[t] < 0.0 && alpha[t] > 0.0);
        let in_low = (y[t] > 0.0 && alpha[t] > 0.0) || (y[t] < 0.0 && alpha[t] < cost);
        if in_up && v > g_max {
            g_max = v;
            up = Some(t);
        }
        if in_low && v < g_min {
            g_min = v;
            low = Some(t);
        }
    }

    match (up, low) {
        (Some(i), Some(j)) if g_max - g_min >= tolerance => Some((i, j)),
        _ => None,
    }
}

/// ρ from the free support vectors, or the midpoint of the feasible
/// interval when every α sits on a bound.
fn bias(alpha: &[f64], grad: &[f64], y: &[f64], cost: f64) -> f64 {
    let mut upper = f64::INFINITY;
    let mut lower = f64::NEG_INFINITY;
    let mut free_sum = 0.0;
    let mut free = 0usize;

    for t in 0..y.len() {
        let yg = y[t] * grad[t];
        if alpha[t] >= cost {
            if y[t] < 0.0 {
                upper = upper.min(yg);
            } else {
                lower = lower.max(yg);
            }
        } else if alpha[t] <= 0.0 {
            if y[t] > 0.0 {
                upper = upper.min(yg);
            } else {
                lower = lower.max(yg);
            }
        } else {
            free += 1;
            free_sum += yg;
        }
    }

    if free > 0 {
        free_sum / free as f64
    } else {
        (upper + lower) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::svm::kernel;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_two_points_symmetric_solution() {
        // one point per class; the optimum puts them at ±1
        let x = array![[0.0], [2.0]];
        let k = kernel::rbf(x.view(), x.view(), 0.5);
        let sol = solve(k.view(), &[-1.0, 1.0], 10.0, 1e-6, 10_000);

        assert!(sol.converged);
        assert_relative_eq!(sol.coef.sum(), 0.0, epsilon = 1e-9);

        let f0 = sol.coef[0] * k[[0, 0]] + sol.coef[1] * k[[1, 0]] - sol.rho;
        let f1 = sol.coef[0] * k[[0, 1]] + sol.coef[1] * k[[1, 1]] - sol.rho;
        assert_relative_eq!(f0, -1.0, epsilon = 1e-4);
        assert_relative_eq!(f1, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_box_constraint_respected() {
        let x = array![[0.0], [0.1], [0.2], [0.15]];
        let k = kernel::rbf(x.view(), x.view(), 1.0);
        let cost = 0.5;
        let y = [-1.0, 1.0, -1.0, 1.0];
        let sol = solve(k.view(), &y, cost, 1e-3, 100_000);

        for (c, t) in sol.coef.iter().zip(&y) {
            let a = c * t;
            assert!(a >= -1e-12 && a <= cost + 1e-12, "alpha {a} outside [0, {cost}]");
        }
        assert_relative_eq!(sol.coef.sum(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_iteration_cap() {
        let x = array![[0.0], [1.0], [2.0], [3.0]];
        let k = kernel::rbf(x.view(), x.view(), 1.0);
        let sol = solve(k.view(), &[-1.0, 1.0, -1.0, 1.0], 1.0, 1e-9, 1);
        assert_eq!(sol.iterations, 1);
        assert!(!sol.converged);
    }
}
