//! Fully symmetric rules for the reference triangle and tetrahedron.
//!
//! Rules are tabulated in barycentric coordinates with weights normalized to sum to one, and
//! mapped to the reference cells on construction.

use crate::{Error, Rule};

/// Reference triangle area.
const TRIANGLE_AREA: f64 = 2.0;

/// Reference tetrahedron volume.
const TETRAHEDRON_VOLUME: f64 = 4.0 / 3.0;

/// Distinct permutations of barycentric coordinates of the form `(a, b, b)`.
fn triangle_orbit(a: f64, b: f64) -> Vec<[f64; 3]> {
    if a == b {
        vec![[a, a, a]]
    } else {
        vec![[a, b, b], [b, a, b], [b, b, a]]
    }
}

/// Distinct permutations of barycentric coordinates of the form `(a, b, b, b)`.
fn tetrahedron_vertex_orbit(a: f64, b: f64) -> Vec<[f64; 4]> {
    if a == b {
        vec![[a, a, a, a]]
    } else {
        vec![[a, b, b, b], [b, a, b, b], [b, b, a, b], [b, b, b, a]]
    }
}

/// Distinct permutations of barycentric coordinates of the form `(a, a, b, b)`.
fn tetrahedron_edge_orbit(a: f64, b: f64) -> Vec<[f64; 4]> {
    vec![
        [a, a, b, b],
        [a, b, a, b],
        [a, b, b, a],
        [b, a, a, b],
        [b, a, b, a],
        [b, b, a, a],
    ]
}

fn triangle_rule(orbits: &[(f64, Vec<[f64; 3]>)]) -> Rule<2> {
    let mut weights = Vec::new();
    let mut points = Vec::new();
    for (w, orbit) in orbits {
        for [_, l1, l2] in orbit {
            weights.push(w * TRIANGLE_AREA);
            points.push([2.0 * l1 - 1.0, 2.0 * l2 - 1.0]);
        }
    }
    (weights, points)
}

fn tetrahedron_rule(orbits: &[(f64, Vec<[f64; 4]>)]) -> Rule<3> {
    let mut weights = Vec::new();
    let mut points = Vec::new();
    for (w, orbit) in orbits {
        for [_, l1, l2, l3] in orbit {
            weights.push(w * TETRAHEDRON_VOLUME);
            points.push([2.0 * l1 - 1.0, 2.0 * l2 - 1.0, 2.0 * l3 - 1.0]);
        }
    }
    (weights, points)
}

/// A rule for the reference triangle integrating polynomials of degree `strength` exactly.
///
/// Rules are available up to strength 4 (Strang and Fix).
pub fn triangle(strength: usize) -> Result<Rule<2>, Error> {
    let third = 1.0 / 3.0;
    match strength {
        0 | 1 => Ok(triangle_rule(&[(1.0, triangle_orbit(third, third))])),
        2 => Ok(triangle_rule(&[(third, triangle_orbit(2.0 / 3.0, 1.0 / 6.0))])),
        3 | 4 => {
            let a = 0.445948490915965;
            let b = 0.091576213509771;
            Ok(triangle_rule(&[
                (0.223381589678011, triangle_orbit(1.0 - 2.0 * a, a)),
                (0.109951743655322, triangle_orbit(1.0 - 2.0 * b, b)),
            ]))
        }
        _ => Err(Error::NoRuleAvailable {
            domain: "triangle",
            strength,
        }),
    }
}

/// A rule for the reference tetrahedron integrating polynomials of degree `strength` exactly.
///
/// Rules are available up to strength 4. The strength 4 rule (Keast) has a negative weight at
/// the centroid.
pub fn tetrahedron(strength: usize) -> Result<Rule<3>, Error> {
    match strength {
        0 | 1 => Ok(tetrahedron_rule(&[(1.0, tetrahedron_vertex_orbit(0.25, 0.25))])),
        2 => {
            let a = 0.5854101966249685;
            let b = 0.1381966011250105;
            Ok(tetrahedron_rule(&[(0.25, tetrahedron_vertex_orbit(a, b))]))
        }
        3 | 4 => {
            let c = 0.399403576166799;
            let d = 0.100596423833201;
            Ok(tetrahedron_rule(&[
                (-6.0 * 74.0 / 5625.0, tetrahedron_vertex_orbit(0.25, 0.25)),
                (6.0 * 343.0 / 45000.0, tetrahedron_vertex_orbit(11.0 / 14.0, 1.0 / 14.0)),
                (6.0 * 56.0 / 2250.0, tetrahedron_edge_orbit(c, d)),
            ]))
        }
        _ => Err(Error::NoRuleAvailable {
            domain: "tetrahedron",
            strength,
        }),
    }
}
