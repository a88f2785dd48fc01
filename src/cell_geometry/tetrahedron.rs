use nalgebra::DMatrixViewMut;
use numeric_literals::replace_float_literals;
use quakefem_traits::Real;

/// Barycentric blend of the corners with `p_i = (1 + ref_i) / 2`.
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
pub(super) fn coords_ref_to_global<T: Real>(coords_ref: &[T], vertices: &[T], output: &mut [T]) {
    let p0 = 0.5 * (1.0 + coords_ref[0]);
    let p1 = 0.5 * (1.0 + coords_ref[1]);
    let p2 = 0.5 * (1.0 + coords_ref[2]);
    debug_assert!(p0 >= -1e-10 && p1 >= -1e-10 && p2 >= -1e-10 && p0 + p1 + p2 <= 1.0 + 1e-10);

    for d in 0..3 {
        let x0 = vertices[d];
        output[d] = x0 + (vertices[3 + d] - x0) * p0 + (vertices[6 + d] - x0) * p1 + (vertices[9 + d] - x0) * p2;
    }
}

/// Constant over the cell: column `k` is half the edge from corner 0 to corner `k + 1`.
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
pub(super) fn jacobian<T: Real>(vertices: &[T], output: &mut DMatrixViewMut<T>) {
    for d in 0..3 {
        let x0 = vertices[d];
        output[(d, 0)] = 0.5 * (vertices[3 + d] - x0);
        output[(d, 1)] = 0.5 * (vertices[6 + d] - x0);
        output[(d, 2)] = 0.5 * (vertices[9 + d] - x0);
    }
}
