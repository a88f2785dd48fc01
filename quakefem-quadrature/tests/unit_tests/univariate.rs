use quakefem_quadrature::integrate;
use quakefem_quadrature::univariate::{gauss, gauss_for_strength};

use matrixcompare::assert_scalar_eq;

#[test]
fn gauss_rules_integrate_monomials_exactly() {
    for n in 1..=40 {
        let rule = gauss(n);
        assert_eq!(rule.0.len(), n);
        assert!(rule.0.iter().all(|&w| w > 0.0));

        for alpha in 0..=(2 * n - 1) as i32 {
            let exact = (1.0 - (-1.0f64).powi(alpha + 1)) / (alpha as f64 + 1.0);
            let estimate = integrate(&rule, |x| x[0].powi(alpha));
            assert_scalar_eq!(estimate, exact, comp = abs, tol = 1e-13);
        }
    }
}

#[test]
fn gauss_points_are_sorted_and_symmetric() {
    let (weights, points) = gauss(7);
    for i in 0..7 {
        assert_scalar_eq!(points[i][0], -points[6 - i][0], comp = abs, tol = 1e-15);
        assert_scalar_eq!(weights[i], weights[6 - i], comp = abs, tol = 1e-15);
    }
    assert!(points.windows(2).all(|pair| pair[0][0] < pair[1][0]));
}

#[test]
fn gauss_for_strength_picks_smallest_rule() {
    assert_eq!(gauss_for_strength(0).0.len(), 1);
    assert_eq!(gauss_for_strength(1).0.len(), 1);
    assert_eq!(gauss_for_strength(2).0.len(), 2);
    assert_eq!(gauss_for_strength(3).0.len(), 2);
    assert_eq!(gauss_for_strength(4).0.len(), 3);
}
