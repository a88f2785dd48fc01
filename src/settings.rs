//! Serializable integrator settings.
use serde::{Deserialize, Serialize};

/// Strain measure used to evaluate stresses.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrainFormulation {
    /// Small strain `sym(grad u)`.
    #[default]
    Infinitesimal,
    /// Green-Lagrange strain with first Piola-Kirchhoff stresses.
    Finite,
}

/// Settings of the explicit (central difference) elasticity integrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplicitSettings<T> {
    pub time_step: T,
    /// Use the row-sum lumped mass for inertia.
    #[serde(default)]
    pub lumped: bool,
    #[serde(default)]
    pub formulation: StrainFormulation,
    /// Gravitational acceleration, one component per spatial dimension.
    #[serde(default)]
    pub gravity: Option<Vec<T>>,
}

impl<T> ExplicitSettings<T> {
    pub fn new(time_step: T) -> Self {
        Self {
            time_step,
            lumped: false,
            formulation: StrainFormulation::default(),
            gravity: None,
        }
    }

    pub fn with_lumped(self, lumped: bool) -> Self {
        Self { lumped, ..self }
    }

    pub fn with_formulation(self, formulation: StrainFormulation) -> Self {
        Self { formulation, ..self }
    }

    pub fn with_gravity(self, gravity: Vec<T>) -> Self {
        Self {
            gravity: Some(gravity),
            ..self
        }
    }
}

/// Settings of the quasi-static elasticity integrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImplicitSettings<T> {
    #[serde(default)]
    pub gravity: Option<Vec<T>>,
}

impl<T> Default for ImplicitSettings<T> {
    fn default() -> Self {
        Self { gravity: None }
    }
}

/// Settings of a Neumann traction boundary condition.
///
/// The up direction orienting surface tractions is passed to
/// [`Neumann::initialize`](crate::bc::Neumann::initialize) together with the mesh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeumannSettings {
    /// Label of the boundary in the mesh.
    pub label: String,
}

impl NeumannSettings {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}
