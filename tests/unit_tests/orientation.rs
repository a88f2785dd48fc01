use quakefem::cell_geometry::orientation::{local_to_global, orientation};
use quakefem::Error;
use nalgebra::{DMatrix, Matrix3x2, Vector3};
use proptest::prelude::*;
use util::{assert_approx_matrix_eq, assert_approx_slice_eq, assert_err_matches};

const UP: [f64; 3] = [0.0, 0.0, 1.0];

#[test]
fn point_orientation_is_identity() {
    let jacobian = DMatrix::<f64>::zeros(1, 0);
    let r = orientation(&jacobian, &UP).unwrap();
    assert_eq!(r, DMatrix::identity(1, 1));
}

#[test]
fn line_orientation_in_2d() {
    // Edge from (1, 0) to (1, 1) on the reference line [-1, 1]
    let jacobian = DMatrix::from_column_slice(2, 1, &[0.0, 0.5]);
    let r = orientation(&jacobian, &UP).unwrap();
    assert_approx_matrix_eq!(r, DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 1.0, 0.0]), abstol = 1e-15);

    let mut global = [0.0; 2];
    local_to_global(&r, &[1.0, 2.0], &mut global);
    assert_approx_slice_eq!(global, [2.0, 1.0], reltol = 1e-15);
}

#[test]
fn surface_orientation_in_3d() {
    // Triangle (1, 0, 0), (1, 1, 0), (1, 0, 1) on the reference triangle
    let jacobian = DMatrix::from_column_slice(3, 2, &[0.0, 0.5, 0.0, 0.0, 0.0, 0.5]);
    let r = orientation(&jacobian, &UP).unwrap();
    #[rustfmt::skip]
    let expected = DMatrix::from_row_slice(3, 3, &[
        0.0, 1.0, 0.0,
        0.0, 0.0, 1.0,
        1.0, 0.0, 0.0,
    ]);
    assert_approx_matrix_eq!(r, expected, abstol = 1e-15);

    let mut global = [0.0; 3];
    local_to_global(&r, &[1.0, 2.0, 3.0], &mut global);
    assert_approx_slice_eq!(global, [3.0, 1.0, 2.0], reltol = 1e-15);
}

#[test]
fn up_direction_parallel_to_normal_is_rejected() {
    let jacobian = DMatrix::from_column_slice(3, 2, &[0.5, 0.0, 0.0, 0.0, 0.5, 0.0]);
    assert_err_matches!(orientation(&jacobian, &UP), Error::Configuration(_));
    assert_err_matches!(orientation(&jacobian, &[0.0, 0.0, 0.0]), Error::Configuration(_));
    assert!(orientation(&jacobian, &[0.0, 1.0, 0.0]).is_ok());
}

#[test]
fn up_direction_must_have_three_components() {
    let jacobian = DMatrix::from_column_slice(2, 1, &[0.0, 0.5]);
    assert_eq!(
        orientation(&jacobian, &[0.0, 1.0]),
        Err(Error::Configuration(
            "Up direction for surface orientation must be a vector with 3 components.".to_string()
        ))
    );
}

#[test]
fn degenerate_and_full_dimensional_cells_are_rejected() {
    let collapsed = DMatrix::from_column_slice(3, 2, &[0.5, 0.0, 0.0, 1.0, 0.0, 0.0]);
    assert_err_matches!(orientation(&collapsed, &UP), Error::DegenerateCell { .. });

    let collapsed_line = DMatrix::<f64>::zeros(2, 1);
    assert_err_matches!(orientation(&collapsed_line, &UP), Error::DegenerateCell { .. });

    let volume = DMatrix::<f64>::identity(3, 3);
    assert_err_matches!(orientation(&volume, &UP), Error::Configuration(_));
}

proptest! {
    #[test]
    fn surface_orientation_is_right_handed_rotation(
        a in prop::array::uniform3(-1.0..1.0f64),
        b in prop::array::uniform3(-1.0..1.0f64),
    ) {
        let j = Matrix3x2::from_columns(&[Vector3::from(a), Vector3::from(b)]);
        let normal = j.column(0).cross(&j.column(1));
        prop_assume!(normal.norm() > 1e-3);
        prop_assume!(normal.normalize().cross(&Vector3::z()).norm() > 1e-3);

        let jacobian = DMatrix::from_column_slice(3, 2, j.as_slice());
        let r = orientation(&jacobian, &UP).unwrap();
        assert_approx_matrix_eq!(&r * r.transpose(), DMatrix::<f64>::identity(3, 3), abstol = 1e-12);
        prop_assert!((r.determinant() - 1.0).abs() < 1e-12);

        // The last row is the unit normal, and the first lies in the horizontal plane
        let n = normal.normalize();
        for i in 0..3 {
            prop_assert!((r[(2, i)] - n[i]).abs() < 1e-12);
        }
        prop_assert!(r[(0, 2)].abs() < 1e-12);
    }
}
