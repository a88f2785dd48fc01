use super::kernels::{add_element_body_force, add_element_internal_force, assemble_element_stiffness_matrix};
use super::{check_fields, check_volume_mesh, check_volume_setup, Gravity, Integrator};
use crate::assembly::{for_each_cell, par_for_each_cell, MatrixAssembly, VectorAssembly};
use crate::error::Result;
use crate::fields::{Fields, DISP_INCR, DISP_T};
use crate::material::{BodyForce, ElasticMaterial, Rheology};
use crate::mesh::Mesh;
use crate::quadrature::{Quadrature, QuadratureBuffer};
use crate::settings::{ImplicitSettings, StrainFormulation};
use log::debug;
use nalgebra::{DMatrix, DMatrixViewMut, DVector, DVectorViewMut};
use quakefem_traits::Real;
use std::sync::atomic::{AtomicBool, Ordering};

const REQUIRED_FIELDS: [&str; 2] = [DISP_T, DISP_INCR];

/// Quasi-static small-strain elasticity.
///
/// The residual is `f_body - ∫ ∇Nᵀ σ(u(t) + Δu) dV` and the Jacobian is the stiffness matrix
/// obtained from the rheology's stress contraction. A lumped Jacobian is not available.
///
/// Required fields: [`DISP_T`] and [`DISP_INCR`].
pub struct ElasticityImplicit<'a, T: Real, R: Rheology<T>> {
    material: &'a ElasticMaterial<T, R>,
    quadrature: &'a Quadrature<T>,
    gravity: Option<Gravity<T>>,
    body_force: Option<&'a dyn BodyForce<T>>,
    needs_new_jacobian: AtomicBool,
}

impl<'a, T: Real, R: Rheology<T>> ElasticityImplicit<'a, T, R> {
    /// Binds an initialized material and the quadrature it was initialized with.
    pub fn new(
        material: &'a ElasticMaterial<T, R>,
        quadrature: &'a Quadrature<T>,
        settings: ImplicitSettings<T>,
    ) -> Result<Self> {
        check_volume_setup(quadrature, material, settings.gravity.as_deref())?;
        debug!(
            "Implicit elasticity for material '{}' with gravity {:?}",
            material.label(),
            settings.gravity
        );
        Ok(Self {
            material,
            quadrature,
            gravity: settings.gravity.map(Gravity),
            body_force: None,
            needs_new_jacobian: AtomicBool::new(true),
        })
    }

    /// Adds a body force on top of any configured gravity.
    pub fn with_body_force(self, body_force: &'a dyn BodyForce<T>) -> Self {
        Self {
            body_force: Some(body_force),
            ..self
        }
    }

    /// Residual with cells integrated in parallel.
    pub fn par_integrate_residual(
        &self,
        residual: &mut dyn VectorAssembly<T>,
        fields: &Fields<T>,
        mesh: &Mesh<T>,
    ) -> Result<()> {
        self.residual_pass(residual, fields, mesh, true)
    }

    /// Jacobian with cells integrated in parallel.
    pub fn par_integrate_jacobian(&self, jacobian: &mut dyn MatrixAssembly<T>, mesh: &Mesh<T>) -> Result<()> {
        self.jacobian_pass(jacobian, mesh, true)
    }

    fn element_len(&self) -> usize {
        self.quadrature.space_dim() * self.quadrature.num_basis()
    }

    fn compute_element_residual(
        &self,
        cell: usize,
        buffer: &QuadratureBuffer<T>,
        output: &mut DVector<T>,
        fields: &Fields<T>,
        mesh: &Mesh<T>,
    ) -> Result<()> {
        let s = mesh.space_dim();
        let nodes = mesh.cell_vertices(cell);
        let rheology = self.material.rheology();
        let params = self.material.cell_parameters(cell);

        let mut u = DVector::zeros(0);
        let mut u_incr = DVector::zeros(0);
        fields.gather(DISP_T, nodes, s, &mut u)?;
        fields.gather(DISP_INCR, nodes, s, &mut u_incr)?;
        u += u_incr;

        output.fill(T::zero());
        let basis = self.quadrature.basis();
        if let Some(gravity) = &self.gravity {
            add_element_body_force(DVectorViewMut::from(&mut *output), basis, buffer, rheology, params, gravity);
        }
        if let Some(source) = self.body_force {
            add_element_body_force(DVectorViewMut::from(&mut *output), basis, buffer, rheology, params, source);
        }
        add_element_internal_force(
            DVectorViewMut::from(&mut *output),
            -T::one(),
            &u,
            buffer,
            rheology,
            params,
            StrainFormulation::Infinitesimal,
        )
    }

    fn residual_pass(
        &self,
        residual: &mut dyn VectorAssembly<T>,
        fields: &Fields<T>,
        mesh: &Mesh<T>,
        parallel: bool,
    ) -> Result<()> {
        check_volume_mesh(mesh, self.quadrature, self.material)?;
        debug!(
            "Integrating implicit elasticity residual of material '{}' over {} cells",
            self.material.label(),
            mesh.num_cells()
        );
        let s = mesh.space_dim();
        let len = self.element_len();
        let compute = |cell: usize, buffer: &QuadratureBuffer<T>, output: &mut DVector<T>| {
            self.compute_element_residual(cell, buffer, output, fields, mesh)
        };
        let sink = |cell: usize, output: &DVector<T>| residual.add_element_vector(mesh.cell_vertices(cell), s, output);
        if parallel {
            par_for_each_cell(mesh, self.quadrature, || DVector::zeros(len), compute, sink)
        } else {
            for_each_cell(mesh, self.quadrature, DVector::zeros(len), compute, sink)
        }
    }

    fn jacobian_pass(&self, jacobian: &mut dyn MatrixAssembly<T>, mesh: &Mesh<T>, parallel: bool) -> Result<()> {
        check_volume_mesh(mesh, self.quadrature, self.material)?;
        debug!(
            "Integrating implicit elasticity Jacobian of material '{}' over {} cells",
            self.material.label(),
            mesh.num_cells()
        );
        let s = mesh.space_dim();
        let len = self.element_len();
        let compute = |cell: usize, buffer: &QuadratureBuffer<T>, output: &mut DMatrix<T>| {
            assemble_element_stiffness_matrix(
                DMatrixViewMut::from(output),
                buffer,
                self.material.rheology(),
                self.material.cell_parameters(cell),
                s,
            );
            Ok(())
        };
        let sink = |cell: usize, output: &DMatrix<T>| jacobian.add_element_matrix(mesh.cell_vertices(cell), s, output);
        if parallel {
            par_for_each_cell(mesh, self.quadrature, || DMatrix::zeros(len, len), compute, sink)?;
        } else {
            for_each_cell(mesh, self.quadrature, DMatrix::zeros(len, len), compute, sink)?;
        }
        self.needs_new_jacobian.store(false, Ordering::Relaxed);
        Ok(())
    }
}

impl<'a, T: Real, R: Rheology<T>> Integrator<T> for ElasticityImplicit<'a, T, R> {
    fn required_fields(&self) -> &[&'static str] {
        &REQUIRED_FIELDS
    }

    fn verify_configuration(&self, mesh: &Mesh<T>, fields: &Fields<T>) -> Result<()> {
        check_volume_mesh(mesh, self.quadrature, self.material)?;
        check_fields(&REQUIRED_FIELDS, mesh, fields)
    }

    fn integrate_residual(
        &self,
        residual: &mut dyn VectorAssembly<T>,
        _t: T,
        fields: &Fields<T>,
        mesh: &Mesh<T>,
    ) -> Result<()> {
        self.residual_pass(residual, fields, mesh, false)
    }

    fn integrate_jacobian(
        &self,
        jacobian: &mut dyn MatrixAssembly<T>,
        _t: T,
        _fields: &Fields<T>,
        mesh: &Mesh<T>,
    ) -> Result<()> {
        self.jacobian_pass(jacobian, mesh, false)
    }

    /// The stiffness of linear elasticity does not change between solves.
    fn needs_new_jacobian(&self) -> bool {
        self.needs_new_jacobian.load(Ordering::Relaxed)
    }
}
