//! Central difference time stepping of a 2D plane strain block loaded by a traction on its right
//! edge.
//!
//! With a lumped mass the Jacobian is diagonal, so every step is a single division.
use eyre::eyre;
use nalgebra::DVector;
use quakefem::basis::LagrangeBasis;
use quakefem::bc::Neumann;
use quakefem::cell_geometry::CellGeometry;
use quakefem::fields::{Fields, DISP_INCR, DISP_T, DISP_T_MINUS_DT};
use quakefem::integrator::{ElasticityExplicit, Integrator};
use quakefem::material::ElasticMaterial;
use quakefem::mesh::Mesh;
use quakefem::quadrature::Quadrature;
use quakefem::settings::{ExplicitSettings, NeumannSettings};
use quakefem::spatialdb::{CartesianCoordSys, UniformDb};
use quakefem_solid::IsotropicLinearElasticity;

/// A `length x length` square divided into `n x n` quadrilaterals, with the right edge labelled.
fn square_quad_mesh(length: f64, n: usize) -> eyre::Result<Mesh<f64>> {
    let h = length / n as f64;
    let vertices = (0..=n)
        .flat_map(|j| (0..=n).flat_map(move |i| [i as f64 * h, j as f64 * h]))
        .collect();
    let v = |i: usize, j: usize| j * (n + 1) + i;
    let cells = (0..n)
        .flat_map(|j| (0..n).map(move |i| vec![v(i, j), v(i + 1, j), v(i + 1, j + 1), v(i, j + 1)]))
        .collect();
    let right = (0..n).map(|j| vec![v(n, j), v(n, j + 1)]).collect();
    Ok(Mesh::from_vertices_and_cells(2, vertices, cells)?.with_boundary("right", right)?)
}

fn main() -> eyre::Result<()> {
    let mesh = square_quad_mesh(1000.0, 20)?;
    let n = 2 * mesh.num_vertices();

    let volume_quadrature = Quadrature::gauss(CellGeometry::Quad2d, LagrangeBasis::Quad4)?;
    let rock = UniformDb::new("rock")
        .with_value("density", 2500.0)
        .with_value("vs", 3000.0)
        .with_value("vp", 5291.502622129181);
    let material = ElasticMaterial::initialize("rock", IsotropicLinearElasticity, &rock, &volume_quadrature, &mesh)?;

    let settings = ExplicitSettings::new(1.0).with_lumped(true);
    let mut elasticity = ElasticityExplicit::new(&material, &volume_quadrature, settings)?;
    let dt = 0.5 * elasticity.stable_time_step(&mesh)?;
    elasticity.set_time_step(dt)?;

    let boundary_quadrature = Quadrature::gauss(CellGeometry::Line2d, LagrangeBasis::Line2)?;
    let tractions = UniformDb::new("tractions")
        .with_value("shear-traction", 0.0)
        .with_value("normal-traction", -1.0e6);
    let mut neumann = Neumann::new(&NeumannSettings::new("right"), &boundary_quadrature, &tractions);
    // Only surfaces in 3D use the up direction
    neumann.initialize(&mesh, &CartesianCoordSys::new(2), &[0.0, 0.0, 1.0])?;

    let mut fields = Fields::new()
        .with_field(DISP_T, DVector::zeros(n))
        .with_field(DISP_T_MINUS_DT, DVector::zeros(n))
        .with_field(DISP_INCR, DVector::zeros(n));
    elasticity.verify_configuration(&mesh, &fields)?;
    neumann.verify_configuration(&mesh, &fields)?;

    let mut lumped = DVector::zeros(n);
    elasticity.integrate_jacobian_lumped(&mut lumped, 0.0, &fields, &mesh)?;
    if lumped.iter().any(|&m| m <= 0.0) {
        return Err(eyre!("lumped mass must be positive"));
    }

    println!("dt = {dt:.4e} s");
    let mut t = 0.0;
    for step in 1..=200 {
        let mut residual = DVector::zeros(n);
        elasticity.integrate_residual(&mut residual, t, &fields, &mesh)?;
        neumann.integrate_residual(&mut residual, t, &fields, &mesh)?;

        // The residual is affine in the increment, with the diagonal Jacobian as slope
        let increment = residual.component_div(&lumped);
        let disp_t = fields.get(DISP_T)?.clone();
        let disp_next = &disp_t + &increment;
        fields.insert(DISP_T_MINUS_DT, disp_t);
        fields.insert(DISP_T, disp_next);
        t += dt;

        if step % 20 == 0 {
            let max_disp = fields.get(DISP_T)?.amax();
            println!("step {step:4}  t = {t:.4e} s  max |u| = {max_disp:.4e} m");
        }
    }

    Ok(())
}
