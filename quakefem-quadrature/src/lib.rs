//! Quadrature rules for the reference cells used by `quakefem`.
//!
//! All reference cells live in `[-1, 1]^d`:
//!
//! - the line `[-1, 1]`,
//! - the triangle with vertices `(-1, -1)`, `(1, -1)`, `(-1, 1)` (area 2),
//! - the quadrilateral `[-1, 1]^2`,
//! - the tetrahedron with vertices `(-1, -1, -1)`, `(1, -1, -1)`, `(-1, 1, -1)`, `(-1, -1, 1)`
//!   (volume 4/3),
//! - the hexahedron `[-1, 1]^3`.
//!
//! Rules are plain `f64` data so that they can be converted to whatever scalar type the
//! consumer works with.

use std::fmt;
use std::fmt::{Display, Formatter};

pub mod simplex;
pub mod tensor;
pub mod univariate;

/// Library-wide error type.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// No rule of the requested strength is available for the domain.
    NoRuleAvailable { domain: &'static str, strength: usize },
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRuleAvailable { domain, strength } => {
                write!(f, "no {domain} quadrature rule of strength {strength} is available")
            }
        }
    }
}

impl std::error::Error for Error {}

/// A D-dimensional point.
pub type Point<const D: usize> = [f64; D];

/// A D-dimensional rule, given as `(weights, points)`.
pub type Rule<const D: usize> = (Vec<f64>, Vec<Point<D>>);

/// Approximates the integral of `f` over the reference domain of `rule`.
pub fn integrate<const D: usize>(rule: &Rule<D>, f: impl Fn(&Point<D>) -> f64) -> f64 {
    let (weights, points) = rule;
    weights.iter().zip(points).map(|(w, x)| w * f(x)).sum()
}
