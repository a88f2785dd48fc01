use super::kernels::{add_element_body_force, add_element_internal_force, assemble_element_mass_matrix};
use super::{check_fields, check_volume_mesh, check_volume_setup, Gravity, Integrator};
use crate::assembly::{for_each_cell, lump_row_sums, par_for_each_cell, MatrixAssembly, VectorAssembly};
use crate::error::{Error, Result};
use crate::fields::{Fields, DISP_INCR, DISP_T, DISP_T_MINUS_DT};
use crate::material::{BodyForce, ElasticMaterial, Rheology};
use crate::mesh::Mesh;
use crate::quadrature::{Quadrature, QuadratureBuffer};
use crate::settings::ExplicitSettings;
use log::debug;
use nalgebra::{DMatrix, DMatrixViewMut, DVector, DVectorViewMut};
use quakefem_traits::Real;
use std::sync::atomic::{AtomicBool, Ordering};

const REQUIRED_FIELDS: [&str; 3] = [DISP_T, DISP_T_MINUS_DT, DISP_INCR];

/// Dynamic elasticity with central differences in time.
///
/// With `u(t+dt) = u(t) + Δu` the residual is
///
/// $$
/// r = f_\text{body} - \frac{1}{\Delta t^2} M \left(u(t+dt) - 2 u(t) + u(t-dt)\right)
///     - \int \nabla N^T P(u(t)) \\, \mathrm{d}V,
/// $$
///
/// where `M` is the consistent mass matrix, or its row-sum lumping if configured. The Jacobian
/// is `M / dt²`.
///
/// Required fields: [`DISP_T`], [`DISP_T_MINUS_DT`] and [`DISP_INCR`].
pub struct ElasticityExplicit<'a, T: Real, R: Rheology<T>> {
    material: &'a ElasticMaterial<T, R>,
    quadrature: &'a Quadrature<T>,
    settings: ExplicitSettings<T>,
    gravity: Option<Gravity<T>>,
    body_force: Option<&'a dyn BodyForce<T>>,
    needs_new_jacobian: AtomicBool,
}

impl<'a, T: Real, R: Rheology<T>> ElasticityExplicit<'a, T, R> {
    /// Binds an initialized material and the quadrature it was initialized with.
    pub fn new(
        material: &'a ElasticMaterial<T, R>,
        quadrature: &'a Quadrature<T>,
        settings: ExplicitSettings<T>,
    ) -> Result<Self> {
        check_time_step(settings.time_step)?;
        check_volume_setup(quadrature, material, settings.gravity.as_deref())?;
        debug!(
            "Explicit elasticity for material '{}': dt = {}, lumped = {}, {:?} strain",
            material.label(),
            settings.time_step,
            settings.lumped,
            settings.formulation
        );
        Ok(Self {
            material,
            quadrature,
            gravity: settings.gravity.clone().map(Gravity),
            settings,
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

    pub fn settings(&self) -> &ExplicitSettings<T> {
        &self.settings
    }

    pub fn time_step(&self) -> T {
        self.settings.time_step
    }

    /// Changes the time step. The Jacobian must be recomputed if it changed.
    pub fn set_time_step(&mut self, time_step: T) -> Result<()> {
        check_time_step(time_step)?;
        if time_step != self.settings.time_step {
            self.settings.time_step = time_step;
            *self.needs_new_jacobian.get_mut() = true;
        }
        Ok(())
    }

    /// Largest stable time step: the smallest ratio of cell width to P-wave speed.
    pub fn stable_time_step(&self, mesh: &Mesh<T>) -> Result<T> {
        check_volume_mesh(mesh, self.quadrature, self.material)?;
        let geometry = self.quadrature.geometry();
        let corner_len = geometry.num_corners() * mesh.space_dim();
        let rheology = self.material.rheology();

        let mut coordinates = Vec::new();
        let mut stable = None;
        for cell in 0..mesh.num_cells() {
            mesh.populate_cell_coordinates(cell, &mut coordinates);
            let width = geometry.min_cell_width(&coordinates[..corner_len])?;
            for params in self.material.cell_parameters(cell) {
                let dt = width / rheology.wave_speed(params);
                stable = Some(match stable {
                    Some(current) => T::min(current, dt),
                    None => dt,
                });
            }
        }
        stable.ok_or_else(|| Error::configuration("Cannot compute a stable time step for a mesh without cells."))
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

    /// Mass matrix divided by `dt²`.
    fn compute_element_jacobian(&self, cell: usize, buffer: &QuadratureBuffer<T>, output: &mut DMatrix<T>) {
        assemble_element_mass_matrix(
            DMatrixViewMut::from(&mut *output),
            self.quadrature.basis(),
            buffer.measures(),
            self.material.rheology(),
            self.material.cell_parameters(cell),
            self.quadrature.space_dim(),
        );
        let dt = self.settings.time_step;
        output.unscale_mut(dt * dt);
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

        let mut u_t = DVector::zeros(0);
        let mut u_tmdt = DVector::zeros(0);
        let mut u_incr = DVector::zeros(0);
        fields.gather(DISP_T, nodes, s, &mut u_t)?;
        fields.gather(DISP_T_MINUS_DT, nodes, s, &mut u_tmdt)?;
        fields.gather(DISP_INCR, nodes, s, &mut u_incr)?;

        output.fill(T::zero());
        let basis = self.quadrature.basis();
        if let Some(gravity) = &self.gravity {
            add_element_body_force(DVectorViewMut::from(&mut *output), basis, buffer, rheology, params, gravity);
        }
        if let Some(source) = self.body_force {
            add_element_body_force(DVectorViewMut::from(&mut *output), basis, buffer, rheology, params, source);
        }

        // u(t+dt) - 2 u(t) + u(t-dt)
        let second_difference = u_incr - &u_t + u_tmdt;
        let mut mass = DMatrix::zeros(output.len(), output.len());
        self.compute_element_jacobian(cell, buffer, &mut mass);
        if self.settings.lumped {
            *output -= lump_row_sums(&mass).component_mul(&second_difference);
        } else {
            output.gemv(-T::one(), &mass, &second_difference, T::one());
        }

        add_element_internal_force(
            DVectorViewMut::from(&mut *output),
            -T::one(),
            &u_t,
            buffer,
            rheology,
            params,
            self.settings.formulation,
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
            "Integrating explicit elasticity residual of material '{}' over {} cells",
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
            "Integrating explicit elasticity Jacobian of material '{}' over {} cells",
            self.material.label(),
            mesh.num_cells()
        );
        let s = mesh.space_dim();
        let len = self.element_len();
        let compute = |cell: usize, buffer: &QuadratureBuffer<T>, output: &mut DMatrix<T>| {
            self.compute_element_jacobian(cell, buffer, output);
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

fn check_time_step<T: Real>(time_step: T) -> Result<()> {
    if time_step > T::zero() {
        Ok(())
    } else {
        Err(Error::configuration(format!("Time step must be positive, got {time_step}.")))
    }
}

impl<'a, T: Real, R: Rheology<T>> Integrator<T> for ElasticityExplicit<'a, T, R> {
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

    fn integrate_jacobian_lumped(
        &self,
        jacobian: &mut dyn VectorAssembly<T>,
        _t: T,
        _fields: &Fields<T>,
        mesh: &Mesh<T>,
    ) -> Result<()> {
        check_volume_mesh(mesh, self.quadrature, self.material)?;
        debug!(
            "Integrating lumped explicit elasticity Jacobian of material '{}' over {} cells",
            self.material.label(),
            mesh.num_cells()
        );
        let s = mesh.space_dim();
        let len = self.element_len();
        let mut mass = DMatrix::zeros(len, len);
        for_each_cell(
            mesh,
            self.quadrature,
            DVector::zeros(len),
            |cell, buffer, output: &mut DVector<T>| {
                self.compute_element_jacobian(cell, buffer, &mut mass);
                *output = lump_row_sums(&mass);
                Ok(())
            },
            |cell, output| jacobian.add_element_vector(mesh.cell_vertices(cell), s, output),
        )?;
        self.needs_new_jacobian.store(false, Ordering::Relaxed);
        Ok(())
    }

    fn needs_new_jacobian(&self) -> bool {
        self.needs_new_jacobian.load(Ordering::Relaxed)
    }
}
