//! Gauss-Legendre rules for the reference interval `[-1, 1]`.

use crate::Rule;
use std::f64::consts::PI;

/// Evaluates `(P_n(x), P_n'(x))` by Bonnet's recursion.
///
/// The derivative formula divides by `x^2 - 1`, so `x` must lie in the open interval `(-1, 1)`.
fn legendre(n: usize, x: f64) -> (f64, f64) {
    let (mut current, mut previous) = (1.0, 0.0);
    for k in 1..=n {
        let k = k as f64;
        let next = ((2.0 * k - 1.0) * x * current - (k - 1.0) * previous) / k;
        previous = current;
        current = next;
    }
    let derivative = n as f64 * (x * current - previous) / (x * x - 1.0);
    (current, derivative)
}

/// Gauss-Legendre quadrature with `num_points` points.
///
/// The rule integrates polynomials of degree up to `2 * num_points - 1` exactly. Points are
/// sorted in ascending order.
///
/// # Panics
///
/// Panics if `num_points` is zero.
pub fn gauss(num_points: usize) -> Rule<1> {
    let n = num_points;
    assert!(n > 0, "Gauss rule needs at least one point");

    let mut nodes = vec![0.0; n];
    let mut weights = vec![0.0; n];

    // Roots are symmetric about the origin, so only the positive half is computed
    for i in 0..(n + 1) / 2 {
        let mut x = (PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
        let mut dp = legendre(n, x).1;
        for _ in 0..100 {
            let (p, dp_new) = legendre(n, x);
            dp = dp_new;
            let dx = p / dp;
            x -= dx;
            if dx.abs() <= 1e-15 {
                dp = legendre(n, x).1;
                break;
            }
        }
        let w = 2.0 / ((1.0 - x * x) * dp * dp);
        nodes[n - 1 - i] = x;
        weights[n - 1 - i] = w;
        nodes[i] = -x;
        weights[i] = w;
    }

    (weights, nodes.into_iter().map(|x| [x]).collect())
}

/// Smallest Gauss rule integrating polynomials of degree `strength` exactly.
pub fn gauss_for_strength(strength: usize) -> Rule<1> {
    gauss(strength / 2 + 1)
}
