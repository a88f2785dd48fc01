use quakefem::basis::LagrangeBasis;
use quakefem::cell_geometry::CellShape;
use nalgebra::{DMatrix, DMatrixViewMut};
use proptest::prelude::*;
use util::assert_approx_slice_eq;

const ALL_BASES: [LagrangeBasis; 10] = [
    LagrangeBasis::Point1,
    LagrangeBasis::Line2,
    LagrangeBasis::Line3,
    LagrangeBasis::Tri3,
    LagrangeBasis::Tri6,
    LagrangeBasis::Quad4,
    LagrangeBasis::Quad9,
    LagrangeBasis::Tet4,
    LagrangeBasis::Tet10,
    LagrangeBasis::Hex8,
];

fn evaluate(basis: LagrangeBasis, xi: &[f64]) -> Vec<f64> {
    let mut values = vec![0.0; basis.num_basis()];
    basis.populate_basis(xi, &mut values);
    values
}

fn evaluate_gradients(basis: LagrangeBasis, xi: &[f64]) -> DMatrix<f64> {
    let mut gradients = DMatrix::zeros(basis.num_basis(), xi.len());
    basis.populate_basis_gradients(xi, DMatrixViewMut::from(&mut gradients));
    gradients
}

/// Reference coordinates of every node of `basis`, in node order.
fn node_positions(basis: LagrangeBasis) -> Vec<Vec<f64>> {
    let shape = basis.shape();
    let d = shape.cell_dim();
    let corners: Vec<Vec<f64>> = shape.reference_vertices().chunks(d).map(<[f64]>::to_vec).collect();
    let midpoint = |[a, b]: [usize; 2]| -> Vec<f64> { (0..d).map(|k| 0.5 * (corners[a][k] + corners[b][k])).collect() };
    let edges: Vec<[usize; 2]> = match basis {
        LagrangeBasis::Line3 | LagrangeBasis::Tri6 | LagrangeBasis::Quad9 => shape.edges().to_vec(),
        LagrangeBasis::Tet10 => vec![[1, 2], [0, 2], [0, 1], [0, 3], [1, 3], [2, 3]],
        _ => vec![],
    };
    let mut nodes = corners.clone();
    nodes.extend(edges.into_iter().map(midpoint));
    if basis == LagrangeBasis::Quad9 {
        nodes.push(vec![0.0, 0.0]);
    }
    nodes
}

fn point_in_reference_cell(shape: CellShape) -> BoxedStrategy<Vec<f64>> {
    let d = shape.cell_dim();
    let cube = prop::collection::vec(-1.0..=1.0f64, d);
    if shape.is_simplex() {
        // Keep the barycentric coordinates non-negative: sum_k (1 + xi_k) <= 2
        cube.prop_filter("outside reference simplex", |xi| xi.iter().map(|x| 1.0 + x).sum::<f64>() <= 2.0)
            .boxed()
    } else {
        cube.boxed()
    }
}

fn basis_and_point() -> impl Strategy<Value = (LagrangeBasis, Vec<f64>)> {
    prop::sample::select(ALL_BASES.to_vec())
        .prop_flat_map(|basis| (Just(basis), point_in_reference_cell(basis.shape())))
}

#[test]
fn tet10_values_and_gradients() {
    let xi = [-0.8, -0.8, -0.8];
    let values = evaluate(LagrangeBasis::Tet10, &xi);
    assert_approx_slice_eq!(
        values,
        [0.28, -0.08, -0.08, -0.08, 0.04, 0.28, 0.28, 0.28, 0.04, 0.04],
        reltol = 1e-14
    );

    let gradients = evaluate_gradients(LagrangeBasis::Tet10, &xi);
    let node_0: Vec<f64> = gradients.row(0).iter().copied().collect();
    assert_approx_slice_eq!(node_0, [-0.9, -0.9, -0.9], reltol = 1e-14);
    // Edge 1-2 node
    let node_4: Vec<f64> = gradients.row(4).iter().copied().collect();
    assert_approx_slice_eq!(node_4, [0.2, 0.2, 0.0], reltol = 1e-14);
}

#[test]
fn basis_functions_are_nodal() {
    for basis in ALL_BASES {
        if basis == LagrangeBasis::Point1 {
            assert_eq!(evaluate(basis, &[]), vec![1.0]);
            continue;
        }
        let nodes = node_positions(basis);
        assert_eq!(nodes.len(), basis.num_basis(), "{basis:?}");
        for (i, xi) in nodes.iter().enumerate() {
            let expected: Vec<f64> = (0..nodes.len())
                .map(|j| if i == j { 1.0 } else { 0.0 })
                .collect();
            assert_approx_slice_eq!(evaluate(basis, xi), expected, reltol = 1e-14);
        }
    }
}

#[test]
fn linear_and_quadratic_bases_per_shape() {
    assert_eq!(LagrangeBasis::linear(CellShape::Tetrahedron), LagrangeBasis::Tet4);
    assert_eq!(LagrangeBasis::quadratic(CellShape::Tetrahedron), Some(LagrangeBasis::Tet10));
    assert_eq!(LagrangeBasis::quadratic(CellShape::Hexahedron), None);
    for basis in ALL_BASES {
        assert_eq!(LagrangeBasis::linear(basis.shape()).num_basis(), basis.shape().num_corners());
    }
}

proptest! {
    #[test]
    fn partition_of_unity((basis, xi) in basis_and_point()) {
        let sum: f64 = evaluate(basis, &xi).iter().sum();
        prop_assert!((sum - 1.0).abs() < 1e-12);

        let gradients = evaluate_gradients(basis, &xi);
        for k in 0..xi.len() {
            prop_assert!(gradients.column(k).sum().abs() < 1e-12);
        }
    }

    #[test]
    fn gradients_match_finite_differences((basis, xi) in basis_and_point()) {
        let h = 1e-6;
        let gradients = evaluate_gradients(basis, &xi);
        for k in 0..xi.len() {
            let mut forward = xi.clone();
            forward[k] += h;
            let mut backward = xi.clone();
            backward[k] -= h;
            let (f, b) = (evaluate(basis, &forward), evaluate(basis, &backward));
            for i in 0..basis.num_basis() {
                let fd = (f[i] - b[i]) / (2.0 * h);
                prop_assert!((fd - gradients[(i, k)]).abs() < 1e-7);
            }
        }
    }
}
