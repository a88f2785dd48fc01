use nalgebra::DMatrixViewMut;
use numeric_literals::replace_float_literals;
use quakefem_traits::Real;

#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
pub(super) fn coords_ref_to_global<T: Real>(space_dim: usize, coords_ref: &[T], vertices: &[T], output: &mut [T]) {
    let p0 = 0.5 * (1.0 + coords_ref[0]);
    let p1 = 0.5 * (1.0 + coords_ref[1]);
    debug_assert!(p0 >= -1e-10 && p1 >= -1e-10 && p0 + p1 <= 1.0 + 1e-10);

    for d in 0..space_dim {
        let x0 = vertices[d];
        let x1 = vertices[space_dim + d];
        let x2 = vertices[2 * space_dim + d];
        output[d] = x0 + (x1 - x0) * p0 + (x2 - x0) * p1;
    }
}

/// Constant over the cell.
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
pub(super) fn jacobian<T: Real>(space_dim: usize, vertices: &[T], output: &mut DMatrixViewMut<T>) {
    for d in 0..space_dim {
        let x0 = vertices[d];
        output[(d, 0)] = 0.5 * (vertices[space_dim + d] - x0);
        output[(d, 1)] = 0.5 * (vertices[2 * space_dim + d] - x0);
    }
}
