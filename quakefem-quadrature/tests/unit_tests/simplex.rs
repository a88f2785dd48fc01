use super::{factorial, monomial_exponents};
use quakefem_quadrature::simplex::{tetrahedron, triangle};
use quakefem_quadrature::{integrate, Error};

use matrixcompare::assert_scalar_eq;

/// Integral of `l1^a l2^b` over the reference triangle, where `l1 = (1 + x) / 2`, `l2 = (1 + y) / 2`.
fn triangle_barycentric_integral([a, b]: [usize; 2]) -> f64 {
    2.0 * 2.0 * factorial(a) * factorial(b) / factorial(a + b + 2)
}

/// Integral of `l1^a l2^b l3^c` over the reference tetrahedron.
fn tetrahedron_barycentric_integral([a, b, c]: [usize; 3]) -> f64 {
    8.0 * factorial(a) * factorial(b) * factorial(c) / factorial(a + b + c + 3)
}

#[test]
fn triangle_rules_integrate_polynomials_of_their_strength() {
    for strength in 0..=4 {
        let rule = triangle(strength).unwrap();
        for [a, b] in monomial_exponents::<2>(strength) {
            let estimate = integrate(&rule, |x| {
                ((1.0 + x[0]) / 2.0).powi(a as i32) * ((1.0 + x[1]) / 2.0).powi(b as i32)
            });
            assert_scalar_eq!(estimate, triangle_barycentric_integral([a, b]), comp = abs, tol = 1e-13);
        }
    }
}

#[test]
fn tetrahedron_rules_integrate_polynomials_of_their_strength() {
    for strength in 0..=4 {
        let rule = tetrahedron(strength).unwrap();
        for [a, b, c] in monomial_exponents::<3>(strength) {
            let estimate = integrate(&rule, |x| {
                ((1.0 + x[0]) / 2.0).powi(a as i32)
                    * ((1.0 + x[1]) / 2.0).powi(b as i32)
                    * ((1.0 + x[2]) / 2.0).powi(c as i32)
            });
            assert_scalar_eq!(
                estimate,
                tetrahedron_barycentric_integral([a, b, c]),
                comp = abs,
                tol = 1e-13
            );
        }
    }
}

#[test]
fn rule_sizes() {
    let sizes: Vec<_> = (0..=4).map(|s| triangle(s).unwrap().0.len()).collect();
    assert_eq!(sizes, vec![1, 1, 3, 6, 6]);
    let sizes: Vec<_> = (0..=4).map(|s| tetrahedron(s).unwrap().0.len()).collect();
    assert_eq!(sizes, vec![1, 1, 4, 11, 11]);
}

#[test]
fn unavailable_strength_is_reported() {
    assert_eq!(
        triangle(5),
        Err(Error::NoRuleAvailable {
            domain: "triangle",
            strength: 5
        })
    );
    assert!(tetrahedron(9).is_err());
    let message = tetrahedron(9).unwrap_err().to_string();
    assert_eq!(message, "no tetrahedron quadrature rule of strength 9 is available");
}
