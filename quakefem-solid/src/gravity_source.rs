use quakefem::material::BodyForce;
use quakefem::{Error, Real, Result};
use numeric_literals::replace_float_literals;
use serde::{Deserialize, Serialize};

/// A source for the gravitational force.
///
/// This source implements the force density
/// <div>$$
/// \rho \vec g,
/// $$</div>
/// where $\rho$ is the density of the material and $\vec g \in \mathbb{R}^d$ is the
/// $d$-dimensional gravitational acceleration vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GravitySource<T> {
    gravitational_acceleration: Vec<T>,
}

impl<T: Real> GravitySource<T> {
    pub fn from_acceleration(gravitational_acceleration: Vec<T>) -> Self {
        Self {
            gravitational_acceleration,
        }
    }

    /// Gravity of magnitude `acceleration` along `direction`, which need not be normalized.
    pub fn from_direction(direction: &[T], acceleration: T) -> Result<Self> {
        let norm = direction.iter().fold(T::zero(), |acc, &d| acc + d * d).sqrt();
        if !(norm > T::zero()) {
            return Err(Error::configuration("Gravity direction must be nonzero."));
        }
        let gravitational_acceleration = direction.iter().map(|&d| d * acceleration / norm).collect();
        Ok(Self {
            gravitational_acceleration,
        })
    }

    /// Standard gravity pointing in the negative direction of the last axis.
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    pub fn standard(space_dim: usize) -> Self {
        let standard_gravity = 9.80665;
        let mut gravitational_acceleration = vec![T::zero(); space_dim];
        if let Some(g) = gravitational_acceleration.last_mut() {
            *g = -standard_gravity;
        }
        Self {
            gravitational_acceleration,
        }
    }

    pub fn gravitational_acceleration(&self) -> &[T] {
        &self.gravitational_acceleration
    }
}

impl<T: Real> BodyForce<T> for GravitySource<T> {
    fn body_force(&self, _point: &[T], density: T, force: &mut [T]) {
        assert_eq!(force.len(), self.gravitational_acceleration.len(), "Force dimension mismatch");
        for (f, &g) in force.iter_mut().zip(&self.gravitational_acceleration) {
            *f = density * g;
        }
    }
}
