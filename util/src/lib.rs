//! Assertion helpers for the quakefem test suites.

/// Poor man's approx assertion for matrices and vectors.
#[macro_export]
macro_rules! assert_approx_matrix_eq {
    ($x:expr, $y:expr, abstol = $tol:expr) => {{
        let diff = &$x - &$y;

        let max_absdiff = diff.abs().max();
        let approx_eq = max_absdiff <= $tol;

        if !approx_eq {
            println!("abstol: {:e}", $tol);
            println!("left: {}", $x);
            println!("right: {}", $y);
            println!("diff: {:e}", diff);
        }
        assert!(approx_eq);
    }};
}

/// Element-wise approx assertion for slices, with a tolerance relative to the magnitude of the
/// expected values.
#[macro_export]
macro_rules! assert_approx_slice_eq {
    ($actual:expr, $expected:expr, reltol = $tol:expr) => {{
        let actual: &[f64] = &$actual;
        let expected: &[f64] = &$expected;
        assert_eq!(actual.len(), expected.len(), "slice lengths differ");
        for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
            let scale = e.abs().max(1.0);
            if (a - e).abs() > $tol * scale {
                panic!("entry {} differs: left = {:e}, right = {:e}, reltol = {:e}", i, a, e, $tol);
            }
        }
    }};
}

/// Asserts that a `Result` is an `Err` whose value matches the given pattern.
#[macro_export]
macro_rules! assert_err_matches {
    ($result:expr, $pattern:pat) => {{
        match $result {
            Err($pattern) => {}
            Err(other) => panic!("unexpected error variant: {:?}", other),
            Ok(_) => panic!("expected an error matching {}", std::stringify!($pattern)),
        }
    }};
}
