use nalgebra::DMatrixViewMut;
use numeric_literals::replace_float_literals;
use quakefem_traits::Real;

/// Signs of the reference corners, in corner order.
const CORNER_SIGNS: [[f64; 3]; 8] = [
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
    [1.0, 1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, 1.0],
    [-1.0, 1.0, 1.0],
];

fn sign<T: Real>(corner: usize, axis: usize) -> T {
    T::from_f64(CORNER_SIGNS[corner][axis]).expect("Literal must fit in T")
}

#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
pub(super) fn coords_ref_to_global<T: Real>(coords_ref: &[T], vertices: &[T], output: &mut [T]) {
    output.fill(0.0);
    for i in 0..8 {
        let n = (0..3).fold(0.125, |n, k| n * (1.0 + sign::<T>(i, k) * coords_ref[k]));
        for d in 0..3 {
            output[d] += n * vertices[3 * i + d];
        }
    }
}

/// Trilinear map: derivative along axis `k` of corner function `i` drops the factor for `k`.
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
pub(super) fn jacobian<T: Real>(location: &[T], vertices: &[T], output: &mut DMatrixViewMut<T>) {
    output.fill(0.0);
    for i in 0..8 {
        let factors: [T; 3] = [0, 1, 2].map(|k| 1.0 + sign::<T>(i, k) * location[k]);
        for k in 0..3 {
            let dn = 0.125 * sign::<T>(i, k) * factors[(k + 1) % 3] * factors[(k + 2) % 3];
            for d in 0..3 {
                output[(d, k)] += dn * vertices[3 * i + d];
            }
        }
    }
}
