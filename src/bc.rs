//! Boundary integrators.
use crate::assembly::{for_each_cell, MatrixAssembly, VectorAssembly};
use crate::cell_geometry::orientation::{local_to_global, orientation};
use crate::error::{Error, Result};
use crate::fields::Fields;
use crate::integrator::Integrator;
use crate::mesh::Mesh;
use crate::quadrature::{Quadrature, QuadratureBuffer};
use crate::settings::NeumannSettings;
use crate::spatialdb::{CartesianCoordSys, SpatialDatabase};
use log::{debug, warn};
use nalgebra::DVector;
use quakefem_traits::Real;

/// Names of the traction components queried from the database, shear components first.
pub fn traction_names(space_dim: usize) -> Result<&'static [&'static str]> {
    let names: &'static [&'static str] = match space_dim {
        1 => &["normal-traction"],
        2 => &["shear-traction", "normal-traction"],
        3 => &["horiz-shear-traction", "vert-shear-traction", "normal-traction"],
        _ => {
            return Err(Error::configuration(format!(
                "Neumann tractions are not defined in {space_dim} dimensions."
            )))
        }
    };
    Ok(names)
}

#[derive(Debug, Clone)]
struct NeumannState<T> {
    boundary: Mesh<T>,
    /// Global tractions, `space_dim` entries per quadrature point of every boundary cell.
    tractions: Vec<T>,
}

/// Neumann traction boundary condition.
///
/// Tractions are given in the local frame of each boundary cell (shear components, then the
/// normal component) and rotated into global coordinates once, in [`Neumann::initialize`]. The
/// residual contribution is `r_a = ∫ N_a t dA`. Tractions do not depend on the solution, so the
/// Jacobian contributions vanish.
pub struct Neumann<'a, T: Real> {
    label: String,
    quadrature: &'a Quadrature<T>,
    db: &'a dyn SpatialDatabase<T>,
    state: Option<NeumannState<T>>,
}

impl<'a, T: Real> Neumann<'a, T> {
    /// Creates an uninitialized boundary condition.
    ///
    /// `quadrature` must live on the boundary cells, one dimension below the mesh.
    pub fn new(settings: &NeumannSettings, quadrature: &'a Quadrature<T>, db: &'a dyn SpatialDatabase<T>) -> Self {
        Self {
            label: settings.label.clone(),
            quadrature,
            db,
            state: None,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// The boundary mesh extracted during initialization.
    pub fn boundary_mesh(&self) -> Option<&Mesh<T>> {
        self.state.as_ref().map(|state| &state.boundary)
    }

    /// Global traction at quadrature point `q` of boundary cell `cell`.
    pub fn traction_global(&self, cell: usize, q: usize) -> Option<&[T]> {
        let state = self.state.as_ref()?;
        let s = state.boundary.space_dim();
        let nq = self.quadrature.num_quad_pts();
        if q >= nq {
            return None;
        }
        let offset = (cell * nq + q) * s;
        state.tractions.get(offset..offset + s)
    }

    /// Extracts the boundary, orients its cells and computes global tractions at all quadrature
    /// points.
    pub fn initialize(&mut self, mesh: &Mesh<T>, coord_sys: &CartesianCoordSys, up_dir: &[T]) -> Result<()> {
        if up_dir.len() != 3 {
            return Err(Error::configuration(
                "Up direction for surface orientation must be a vector with 3 components.",
            ));
        }
        let boundary = mesh.boundary_mesh(&self.label).ok_or_else(|| {
            Error::configuration(format!(
                "Could not construct boundary mesh for Neumann traction boundary condition '{}'.",
                self.label
            ))
        })?;
        if coord_sys.space_dim != mesh.space_dim() {
            return Err(Error::configuration(format!(
                "Coordinate system dimension {} does not match mesh dimension {}.",
                coord_sys.space_dim,
                mesh.space_dim()
            )));
        }
        self.check_boundary(&boundary)?;

        let s = mesh.space_dim();
        let nq = self.quadrature.num_quad_pts();
        let names = traction_names(s)?;
        let mut local = vec![T::zero(); s];
        let mut tractions = Vec::with_capacity(boundary.num_cells() * nq * s);
        for_each_cell(
            &boundary,
            self.quadrature,
            vec![T::zero(); nq * s],
            |_, buffer, cell_tractions: &mut Vec<T>| {
                for (q, global) in cell_tractions.chunks_exact_mut(s).enumerate() {
                    let rotation = orientation(buffer.jacobian(q), up_dir)?;
                    self.db.query(buffer.quad_point(q), names, &mut local)?;
                    local_to_global(&rotation, &local, global);
                }
                Ok(())
            },
            |_, cell_tractions| tractions.extend_from_slice(cell_tractions),
        )?;

        if boundary.num_cells() == 0 {
            warn!("Neumann traction boundary condition '{}' has no boundary cells", self.label);
        }
        debug!(
            "Initialized Neumann traction boundary condition '{}' on {} cells",
            self.label,
            boundary.num_cells()
        );
        self.state = Some(NeumannState { boundary, tractions });
        Ok(())
    }

    fn check_boundary(&self, boundary: &Mesh<T>) -> Result<()> {
        let space_dim = boundary.space_dim();
        if self.quadrature.space_dim() != space_dim || self.quadrature.cell_dim() + 1 != space_dim {
            return Err(Error::configuration(format!(
                "Neumann traction boundary condition '{}' needs a quadrature on {}-dimensional cells in {} dimensions, got {:?}.",
                self.label,
                space_dim.saturating_sub(1),
                space_dim,
                self.quadrature.geometry()
            )));
        }
        let num_basis = self.quadrature.num_basis();
        if let Some(cell) = boundary.cells().iter().find(|cell| cell.len() != num_basis) {
            return Err(Error::configuration(format!(
                "Boundary '{}' has a cell with {} nodes, but the quadrature basis has {} functions.",
                self.label,
                cell.len(),
                num_basis
            )));
        }
        Ok(())
    }

    fn state(&self) -> Result<&NeumannState<T>> {
        self.state.as_ref().ok_or_else(|| {
            Error::configuration(format!(
                "Neumann traction boundary condition '{}' has not been initialized.",
                self.label
            ))
        })
    }

    fn compute_element_residual(&self, cell: usize, buffer: &QuadratureBuffer<T>, output: &mut DVector<T>, tractions: &[T]) {
        let s = self.quadrature.space_dim();
        let nq = self.quadrature.num_quad_pts();
        let basis = self.quadrature.basis();
        output.fill(T::zero());
        for (q, &measure) in buffer.measures().iter().enumerate() {
            let offset = (cell * nq + q) * s;
            let traction = &tractions[offset..offset + s];
            for (a, &phi_a) in basis.values(q).iter().enumerate() {
                for (i, &t_i) in traction.iter().enumerate() {
                    output[s * a + i] += measure * phi_a * t_i;
                }
            }
        }
    }
}

impl<'a, T: Real> Integrator<T> for Neumann<'a, T> {
    fn required_fields(&self) -> &[&'static str] {
        &[]
    }

    fn verify_configuration(&self, mesh: &Mesh<T>, _fields: &Fields<T>) -> Result<()> {
        let boundary = mesh.boundary_mesh(&self.label).ok_or_else(|| {
            Error::configuration(format!(
                "Mesh has no boundary '{}' for Neumann traction boundary condition.",
                self.label
            ))
        })?;
        self.check_boundary(&boundary)
    }

    fn integrate_residual(
        &self,
        residual: &mut dyn VectorAssembly<T>,
        _t: T,
        _fields: &Fields<T>,
        _mesh: &Mesh<T>,
    ) -> Result<()> {
        let state = self.state()?;
        let boundary = &state.boundary;
        let s = boundary.space_dim();
        debug!(
            "Integrating Neumann tractions on '{}' over {} cells",
            self.label,
            boundary.num_cells()
        );
        for_each_cell(
            boundary,
            self.quadrature,
            DVector::zeros(s * self.quadrature.num_basis()),
            |cell, buffer, output: &mut DVector<T>| {
                self.compute_element_residual(cell, buffer, output, &state.tractions);
                Ok(())
            },
            |cell, output| residual.add_element_vector(boundary.cell_vertices(cell), s, output),
        )
    }

    fn integrate_jacobian(
        &self,
        _jacobian: &mut dyn MatrixAssembly<T>,
        _t: T,
        _fields: &Fields<T>,
        _mesh: &Mesh<T>,
    ) -> Result<()> {
        debug!("Neumann traction boundary condition '{}' has no Jacobian contribution", self.label);
        Ok(())
    }

    fn integrate_jacobian_lumped(
        &self,
        _jacobian: &mut dyn VectorAssembly<T>,
        _t: T,
        _fields: &Fields<T>,
        _mesh: &Mesh<T>,
    ) -> Result<()> {
        debug!(
            "Neumann traction boundary condition '{}' has no lumped Jacobian contribution",
            self.label
        );
        Ok(())
    }

    fn needs_new_jacobian(&self) -> bool {
        false
    }
}
