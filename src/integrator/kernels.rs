//! Elemental kernels evaluated on the quadrature geometry of one cell.
//!
//! Nodal vectors are blocked by node: entry `s * a + i` is component `i` of node `a`, where `s`
//! is the solution dimension. The `assemble_*` kernels overwrite their output, the `add_*`
//! kernels accumulate into it.
use crate::assembly::clone_upper_to_lower;
use crate::error::Result;
use crate::material::{BodyForce, Rheology};
use crate::quadrature::{BasisTable, QuadratureBuffer};
use crate::settings::StrainFormulation;
use itertools::izip;
use nalgebra::{DMatrix, DMatrixView, DMatrixViewMut, DVector, DVectorViewMut};
use numeric_literals::replace_float_literals;
use quakefem_traits::Real;

/// Assembles the element mass matrix.
///
/// The matrix consists of `s x s` blocks
///
/// $$
/// M_{ab} = I^s \int_K \rho \\, N_a \\, N_b \\, \mathrm{d}V,
/// $$
///
/// where the density is taken from the material parameters at each quadrature point.
///
/// # Panics
///
/// Panics if the output is not `s * num_basis` square or the quadrature data have different
/// lengths.
pub fn assemble_element_mass_matrix<T, R>(
    mut output: DMatrixViewMut<T>,
    basis: &BasisTable<T>,
    measures: &[T],
    rheology: &R,
    parameters: &[R::Parameters],
    solution_dim: usize,
) where
    T: Real,
    R: Rheology<T>,
{
    let s = solution_dim;
    let n = basis.num_basis();
    assert_eq!(output.shape(), (s * n, s * n), "Output matrix dimension mismatch");
    assert_eq!(measures.len(), parameters.len(), "Quadrature data dimension mismatch");

    output.fill(T::zero());
    for (q, &measure, params) in izip!(0.., measures, parameters) {
        let phi = basis.values(q);
        let weight = measure * rheology.density(params);
        for a in 0..n {
            for b in a..n {
                let m_ab = weight * phi[a] * phi[b];
                for i in 0..s {
                    output[(s * a + i, s * b + i)] += m_ab;
                }
            }
        }
    }
    clone_upper_to_lower(&mut output);
}

/// Assembles the element stiffness matrix `K_ab = ∫ C(∇N_a, ∇N_b) dV` from the rheology's
/// stress contraction.
pub fn assemble_element_stiffness_matrix<T, R>(
    mut output: DMatrixViewMut<T>,
    buffer: &QuadratureBuffer<T>,
    rheology: &R,
    parameters: &[R::Parameters],
    solution_dim: usize,
) where
    T: Real,
    R: Rheology<T>,
{
    let s = solution_dim;
    assert_eq!(output.nrows(), output.ncols(), "Output matrix must be square");
    assert_eq!(buffer.num_quad_pts(), parameters.len(), "Quadrature data dimension mismatch");

    output.fill(T::zero());
    for (q, &measure, params) in izip!(0.., buffer.measures(), parameters) {
        let g = buffer.basis_derivatives(q);
        let n = g.nrows();
        for a in 0..n {
            let grad_a = g.row(a).transpose();
            for b in a..n {
                let grad_b = g.row(b).transpose();
                let contraction = rheology.compute_stress_contraction(&grad_a, &grad_b, params);
                let mut block = output.view_mut((s * a, s * b), (s, s));
                block += contraction * measure;
            }
        }
    }
    // Only the upper block triangle was computed
    clone_upper_to_lower(&mut output);
}

/// Displacement gradient `H_ij = ∂u_i / ∂x_j` from nodal displacements and physical basis
/// derivatives (`num_basis x space_dim`).
pub fn compute_displacement_gradient<T: Real>(u: &DVector<T>, basis_derivatives: &DMatrix<T>) -> DMatrix<T> {
    let n = basis_derivatives.nrows();
    assert_eq!(u.len() % n, 0, "Nodal values do not match the number of basis functions");
    // Column a holds the displacement of node a
    let u_nodes = DMatrixView::from_slice(u.as_slice(), u.len() / n, n);
    u_nodes * basis_derivatives
}

/// The stress measure that is integrated against basis gradients.
///
/// For infinitesimal strain this is the Cauchy stress of `sym(H)`. For finite strain it is the
/// first Piola-Kirchhoff stress `P = F S(E)` with `F = I + H` and `E = (FᵀF - I) / 2`.
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
pub fn compute_stress_measure<T, R>(
    grad_u: &DMatrix<T>,
    rheology: &R,
    parameters: &R::Parameters,
    formulation: StrainFormulation,
) -> Result<DMatrix<T>>
where
    T: Real,
    R: Rheology<T>,
{
    match formulation {
        StrainFormulation::Infinitesimal => {
            let strain = (grad_u + grad_u.transpose()) * 0.5;
            rheology.compute_stress(&strain, parameters)
        }
        StrainFormulation::Finite => {
            let dim = grad_u.nrows();
            let identity = DMatrix::<T>::identity(dim, dim);
            let f = &identity + grad_u;
            let green_strain = (f.tr_mul(&f) - identity) * 0.5;
            let second_piola = rheology.compute_stress(&green_strain, parameters)?;
            Ok(f * second_piola)
        }
    }
}

/// Adds `alpha * ∫ P ∇N_a dV` to every node block of `output`, where `P` is the stress measure
/// of the nodal displacements `u`.
pub fn add_element_internal_force<T, R>(
    mut output: DVectorViewMut<T>,
    alpha: T,
    u: &DVector<T>,
    buffer: &QuadratureBuffer<T>,
    rheology: &R,
    parameters: &[R::Parameters],
    formulation: StrainFormulation,
) -> Result<()>
where
    T: Real,
    R: Rheology<T>,
{
    assert_eq!(output.len(), u.len(), "Output vector dimension mismatch");
    assert_eq!(buffer.num_quad_pts(), parameters.len(), "Quadrature data dimension mismatch");

    for (q, &measure, params) in izip!(0.., buffer.measures(), parameters) {
        let g = buffer.basis_derivatives(q);
        let s = u.len() / g.nrows();
        let grad_u = compute_displacement_gradient(u, g);
        let stress = compute_stress_measure(&grad_u, rheology, params, formulation)?;
        for a in 0..g.nrows() {
            let grad_a = g.row(a).transpose();
            output
                .rows_mut(s * a, s)
                .gemv(alpha * measure, &stress, &grad_a, T::one());
        }
    }
    Ok(())
}

/// Adds `∫ N_a f dV` to every node block of `output` for the force density `f` of `source`.
pub fn add_element_body_force<T, R>(
    mut output: DVectorViewMut<T>,
    basis: &BasisTable<T>,
    buffer: &QuadratureBuffer<T>,
    rheology: &R,
    parameters: &[R::Parameters],
    source: &dyn BodyForce<T>,
) where
    T: Real,
    R: Rheology<T>,
{
    let n = basis.num_basis();
    let s = output.len() / n;
    assert_eq!(output.len(), s * n, "Output vector dimension mismatch");

    let mut force = vec![T::zero(); s];
    for (q, &measure, params) in izip!(0.., buffer.measures(), parameters) {
        source.body_force(buffer.quad_point(q), rheology.density(params), &mut force);
        for (a, &phi_a) in basis.values(q).iter().enumerate() {
            for (i, &f_i) in force.iter().enumerate() {
                output[s * a + i] += measure * phi_a * f_i;
            }
        }
    }
}
