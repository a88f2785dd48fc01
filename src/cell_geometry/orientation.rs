//! Local orientation of boundary cells.
//!
//! An orientation matrix has `space_dim` rows, each a unit vector in global coordinates. The
//! shear (tangential) directions come first and the normal direction last, so a vector with
//! local components `v` has global components `R^T v`.
use crate::error::{Error, Result};
use nalgebra::{DMatrix, Dyn, Matrix, Storage, Vector3};
use numeric_literals::replace_float_literals;
use quakefem_traits::Real;

/// Computes the orientation of a boundary cell from its Jacobian.
///
/// `jacobian` has `space_dim` rows and `space_dim - 1` columns. The up direction selects the
/// along-strike direction of surfaces in 3D and is ignored in lower dimensions. It must always
/// have three components.
pub fn orientation<T, S>(jacobian: &Matrix<T, Dyn, Dyn, S>, up_dir: &[T]) -> Result<DMatrix<T>>
where
    T: Real,
    S: Storage<T, Dyn, Dyn>,
{
    if up_dir.len() != 3 {
        return Err(Error::configuration(
            "Up direction for surface orientation must be a vector with 3 components.",
        ));
    }
    match jacobian.shape() {
        (1, 0) => Ok(DMatrix::identity(1, 1)),
        (2, 1) => orient_line(jacobian[(0, 0)], jacobian[(1, 0)]),
        (3, 2) => {
            let a = Vector3::new(jacobian[(0, 0)], jacobian[(1, 0)], jacobian[(2, 0)]);
            let b = Vector3::new(jacobian[(0, 1)], jacobian[(1, 1)], jacobian[(2, 1)]);
            let up = Vector3::new(up_dir[0], up_dir[1], up_dir[2]);
            orient_surface(&a, &b, &up)
        }
        (rows, cols) => Err(Error::configuration(format!(
            "Cannot orient a cell with a {rows}x{cols} Jacobian; boundary cells must have dimension space_dim - 1."
        ))),
    }
}

/// A line in 2D: the tangent is the shear direction, the normal points to its right.
fn orient_line<T: Real>(j0: T, j1: T) -> Result<DMatrix<T>> {
    let length = (j0 * j0 + j1 * j1).sqrt();
    if !(length > T::zero()) {
        return Err(Error::degenerate_cell(length));
    }
    let (t0, t1) = (j0 / length, j1 / length);
    Ok(DMatrix::from_row_slice(2, 2, &[t0, t1, t1, -t0]))
}

/// A surface in 3D: rows are along-strike, up-dip and normal.
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
fn orient_surface<T: Real>(a: &Vector3<T>, b: &Vector3<T>, up: &Vector3<T>) -> Result<DMatrix<T>> {
    let normal = a.cross(b);
    let area = normal.norm();
    if !(area > 0.0) {
        return Err(Error::degenerate_cell(area));
    }
    let r = normal / area;

    let up_norm = up.norm();
    if !(up_norm > 0.0) {
        return Err(Error::configuration("Up direction for surface orientation must be nonzero."));
    }
    let strike = (up / up_norm).cross(&r);
    let strike_norm = strike.norm();
    if strike_norm < 1e-6 {
        return Err(Error::configuration(
            "Up direction for surface orientation is parallel to the surface normal.",
        ));
    }
    let p = strike / strike_norm;
    let q = r.cross(&p);

    Ok(DMatrix::from_row_slice(
        3,
        3,
        &[p.x, p.y, p.z, q.x, q.y, q.z, r.x, r.y, r.z],
    ))
}

/// Rotates a vector in local (shear, ..., normal) components into global coordinates.
pub fn local_to_global<T: Real>(orientation: &DMatrix<T>, local: &[T], global: &mut [T]) {
    let n = orientation.nrows();
    assert_eq!(local.len(), n);
    assert_eq!(global.len(), n);
    for (i, g) in global.iter_mut().enumerate() {
        *g = (0..n).fold(T::zero(), |acc, k| acc + orientation[(k, i)] * local[k]);
    }
}
