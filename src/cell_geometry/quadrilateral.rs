use nalgebra::DMatrixViewMut;
use numeric_literals::replace_float_literals;
use quakefem_traits::Real;

#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
pub(super) fn coords_ref_to_global<T: Real>(space_dim: usize, coords_ref: &[T], vertices: &[T], output: &mut [T]) {
    let (xi, eta) = (coords_ref[0], coords_ref[1]);
    let n = [
        0.25 * (1.0 - xi) * (1.0 - eta),
        0.25 * (1.0 + xi) * (1.0 - eta),
        0.25 * (1.0 + xi) * (1.0 + eta),
        0.25 * (1.0 - xi) * (1.0 + eta),
    ];
    for d in 0..space_dim {
        output[d] = (0..4).fold(0.0, |x, i| x + n[i] * vertices[i * space_dim + d]);
    }
}

/// Bilinear in the reference coordinates.
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
pub(super) fn jacobian<T: Real>(space_dim: usize, location: &[T], vertices: &[T], output: &mut DMatrixViewMut<T>) {
    let (xi, eta) = (location[0], location[1]);
    for d in 0..space_dim {
        let x = |i: usize| vertices[i * space_dim + d];
        output[(d, 0)] = 0.25 * ((1.0 - eta) * (x(1) - x(0)) + (1.0 + eta) * (x(2) - x(3)));
        output[(d, 1)] = 0.25 * ((1.0 - xi) * (x(3) - x(0)) + (1.0 + xi) * (x(2) - x(1)));
    }
}
