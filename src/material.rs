//! Rheology interface and per-quadrature-point material properties.
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::quadrature::Quadrature;
use crate::spatialdb::SpatialDatabase;
use log::debug;
use nalgebra::{DMatrix, DVector};
use quakefem_traits::Real;
use std::fmt::Debug;

/// Constitutive model mapping strain to stress at a point.
pub trait Rheology<T: Real>: Sync {
    type Parameters: Clone + Debug + Send + Sync + 'static;

    /// Names of the values queried from the property database at every quadrature point.
    fn property_names(&self) -> &[&'static str];

    /// Builds the parameters at a point from property values ordered as
    /// [`property_names`](Self::property_names).
    ///
    /// Non-physical values are reported as material errors.
    fn parameters_from_properties(&self, properties: &[T]) -> Result<Self::Parameters>;

    fn density(&self, parameters: &Self::Parameters) -> T;

    /// Speed of the fastest elastic wave, used for stable explicit time steps.
    fn wave_speed(&self, parameters: &Self::Parameters) -> T;

    /// Stress for a symmetric `dim x dim` strain tensor.
    fn compute_stress(&self, strain: &DMatrix<T>, parameters: &Self::Parameters) -> Result<DMatrix<T>>;

    /// The stress contraction `a_k (d sigma_ik / d grad(u)_jm) b_m e_i (x) e_j`.
    ///
    /// For an isotropic or otherwise symmetric rheology this is the tangent stiffness block
    /// coupling two nodes with basis gradients `a` and `b`.
    fn compute_stress_contraction(&self, a: &DVector<T>, b: &DVector<T>, parameters: &Self::Parameters) -> DMatrix<T>;
}

/// A rheology bound to a mesh, with parameters sampled at every quadrature point of every cell.
#[derive(Debug, Clone)]
pub struct ElasticMaterial<T: Real, R: Rheology<T>> {
    label: String,
    rheology: R,
    num_quad_pts: usize,
    parameters: Vec<R::Parameters>,
}

impl<T: Real, R: Rheology<T>> ElasticMaterial<T, R> {
    /// Queries the property database at the physical quadrature points of all cells.
    pub fn initialize(
        label: impl Into<String>,
        rheology: R,
        db: &dyn SpatialDatabase<T>,
        quadrature: &Quadrature<T>,
        mesh: &Mesh<T>,
    ) -> Result<Self> {
        let label = label.into();
        if mesh.space_dim() != quadrature.space_dim() {
            return Err(Error::configuration(format!(
                "Material '{}' uses {}-dimensional quadrature on a {}-dimensional mesh.",
                label,
                quadrature.space_dim(),
                mesh.space_dim()
            )));
        }

        let names = rheology.property_names().to_vec();
        let mut properties = vec![T::zero(); names.len()];
        let mut coordinates = Vec::new();
        let mut buffer = quadrature.create_buffer();
        let num_quad_pts = quadrature.num_quad_pts();
        let mut parameters = Vec::with_capacity(mesh.num_cells() * num_quad_pts);

        for cell in 0..mesh.num_cells() {
            mesh.populate_cell_coordinates(cell, &mut coordinates);
            quadrature.compute_geometry(&coordinates, &mut buffer)?;
            for q in 0..num_quad_pts {
                db.query(buffer.quad_point(q), &names, &mut properties)?;
                parameters.push(rheology.parameters_from_properties(&properties)?);
            }
        }

        debug!(
            "Initialized material '{}' on {} cells with {} quadrature points each",
            label,
            mesh.num_cells(),
            num_quad_pts
        );

        Ok(Self {
            label,
            rheology,
            num_quad_pts,
            parameters,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn rheology(&self) -> &R {
        &self.rheology
    }

    pub fn num_cells(&self) -> usize {
        if self.num_quad_pts == 0 {
            0
        } else {
            self.parameters.len() / self.num_quad_pts
        }
    }

    pub fn num_quad_pts(&self) -> usize {
        self.num_quad_pts
    }

    /// Parameters at the quadrature points of `cell`.
    pub fn cell_parameters(&self, cell: usize) -> &[R::Parameters] {
        &self.parameters[cell * self.num_quad_pts..(cell + 1) * self.num_quad_pts]
    }
}

/// Body force per unit volume at a point.
pub trait BodyForce<T: Real>: Sync {
    /// Writes the force density at `point` for a material of the given density into `force`.
    fn body_force(&self, point: &[T], density: T, force: &mut [T]);
}
