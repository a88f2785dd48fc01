use nalgebra::DMatrixViewMut;
use numeric_literals::replace_float_literals;
use quakefem_traits::Real;

#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
pub(super) fn coords_ref_to_global<T: Real>(space_dim: usize, coords_ref: &[T], vertices: &[T], output: &mut [T]) {
    let p0 = 0.5 * (1.0 + coords_ref[0]);
    for d in 0..space_dim {
        let x0 = vertices[d];
        let x1 = vertices[space_dim + d];
        output[d] = x0 + (x1 - x0) * p0;
    }
}

#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
pub(super) fn jacobian<T: Real>(space_dim: usize, vertices: &[T], output: &mut DMatrixViewMut<T>) {
    for d in 0..space_dim {
        output[(d, 0)] = 0.5 * (vertices[space_dim + d] - vertices[d]);
    }
}
