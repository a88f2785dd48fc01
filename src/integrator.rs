//! Volume integrators: elemental residuals and Jacobians assembled into global targets.
//!
//! An integrator is created ready to use from an initialized [`ElasticMaterial`] and the
//! [`Quadrature`] it was initialized with. Every integration pass computes the quadrature geometry
//! of each cell, evaluates the elemental contribution and scatters it into the caller's global
//! structure. The first failing cell aborts the pass.
use crate::assembly::{MatrixAssembly, VectorAssembly};
use crate::error::{Error, Result};
use crate::fields::Fields;
use crate::material::{BodyForce, ElasticMaterial, Rheology};
use crate::mesh::Mesh;
use crate::quadrature::Quadrature;
use quakefem_traits::Real;

mod elasticity_explicit;
mod elasticity_implicit;
pub mod kernels;

pub use elasticity_explicit::ElasticityExplicit;
pub use elasticity_implicit::ElasticityImplicit;

/// Integration of residual and Jacobian contributions over the cells of a mesh.
pub trait Integrator<T: Real> {
    /// Names of the global fields read by the integrator.
    fn required_fields(&self) -> &[&'static str];

    /// Checks that the mesh and fields are compatible with the integrator.
    fn verify_configuration(&self, mesh: &Mesh<T>, fields: &Fields<T>) -> Result<()>;

    /// Adds the residual contributions at time `t` to `residual`.
    fn integrate_residual(
        &self,
        residual: &mut dyn VectorAssembly<T>,
        t: T,
        fields: &Fields<T>,
        mesh: &Mesh<T>,
    ) -> Result<()>;

    /// Adds the Jacobian contributions at time `t` to `jacobian`.
    fn integrate_jacobian(
        &self,
        jacobian: &mut dyn MatrixAssembly<T>,
        t: T,
        fields: &Fields<T>,
        mesh: &Mesh<T>,
    ) -> Result<()>;

    /// Adds the lumped (row-sum) Jacobian to the diagonal vector `jacobian`.
    fn integrate_jacobian_lumped(
        &self,
        _jacobian: &mut dyn VectorAssembly<T>,
        _t: T,
        _fields: &Fields<T>,
        _mesh: &Mesh<T>,
    ) -> Result<()> {
        Err(Error::Unsupported {
            operation: "lumped Jacobian",
        })
    }

    /// Whether the Jacobian must be recomputed before the next solve.
    fn needs_new_jacobian(&self) -> bool;
}

/// Checks that a volume integrator's quadrature and material fit `mesh`.
pub(crate) fn check_volume_mesh<T, R>(
    mesh: &Mesh<T>,
    quadrature: &Quadrature<T>,
    material: &ElasticMaterial<T, R>,
) -> Result<()>
where
    T: Real,
    R: Rheology<T>,
{
    if mesh.space_dim() != quadrature.space_dim() {
        return Err(Error::configuration(format!(
            "Mesh dimension {} does not match quadrature dimension {}.",
            mesh.space_dim(),
            quadrature.space_dim()
        )));
    }
    let num_basis = quadrature.num_basis();
    if let Some(cell) = (0..mesh.num_cells()).find(|&c| mesh.cell_vertices(c).len() != num_basis) {
        return Err(Error::configuration(format!(
            "Cell {} has {} nodes, but the quadrature basis has {} functions.",
            cell,
            mesh.cell_vertices(cell).len(),
            num_basis
        )));
    }
    if material.num_cells() != mesh.num_cells() {
        return Err(Error::configuration(format!(
            "Material '{}' was initialized on {} cells, but the mesh has {}.",
            material.label(),
            material.num_cells(),
            mesh.num_cells()
        )));
    }
    Ok(())
}

/// Checks that every required field exists with one value per component and vertex.
pub(crate) fn check_fields<T: Real>(names: &[&str], mesh: &Mesh<T>, fields: &Fields<T>) -> Result<()> {
    let len = mesh.space_dim() * mesh.num_vertices();
    names.iter().try_for_each(|name| fields.check(name, len))
}

/// Checks settings shared by the volume integrators.
pub(crate) fn check_volume_setup<T, R>(
    quadrature: &Quadrature<T>,
    material: &ElasticMaterial<T, R>,
    gravity: Option<&[T]>,
) -> Result<()>
where
    T: Real,
    R: Rheology<T>,
{
    if quadrature.cell_dim() != quadrature.space_dim() {
        return Err(Error::configuration(format!(
            "Volume integration requires full-dimensional cells, got {:?}.",
            quadrature.geometry()
        )));
    }
    if material.num_quad_pts() != quadrature.num_quad_pts() {
        return Err(Error::configuration(format!(
            "Material '{}' has {} quadrature points per cell, but the quadrature has {}.",
            material.label(),
            material.num_quad_pts(),
            quadrature.num_quad_pts()
        )));
    }
    if let Some(gravity) = gravity {
        if gravity.len() != quadrature.space_dim() {
            return Err(Error::configuration(format!(
                "Gravity has {} components in a {}-dimensional problem.",
                gravity.len(),
                quadrature.space_dim()
            )));
        }
    }
    Ok(())
}

/// Uniform gravitational acceleration with force density `ρ g`.
#[derive(Debug, Clone)]
pub(crate) struct Gravity<T>(pub Vec<T>);

impl<T: Real> BodyForce<T> for Gravity<T> {
    fn body_force(&self, _point: &[T], density: T, force: &mut [T]) {
        for (f, &g) in force.iter_mut().zip(&self.0) {
            *f = density * g;
        }
    }
}
