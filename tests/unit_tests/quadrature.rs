use super::*;
use quakefem::cell_geometry::CellShape;
use quakefem::quadrature::BasisTable;
use quakefem::Error;
use nalgebra::DMatrix;
use matrixcompare::assert_scalar_eq;
use util::{assert_approx_matrix_eq, assert_approx_slice_eq, assert_err_matches};

const ALL_GEOMETRIES: [(CellGeometry, LagrangeBasis); 6] = [
    (CellGeometry::Line1d, LagrangeBasis::Line3),
    (CellGeometry::Tri2d, LagrangeBasis::Tri6),
    (CellGeometry::Quad2d, LagrangeBasis::Quad9),
    (CellGeometry::Tet3d, LagrangeBasis::Tet10),
    (CellGeometry::Hex3d, LagrangeBasis::Hex8),
    (CellGeometry::Tri3d, LagrangeBasis::Tri3),
];

#[test]
fn gauss_rules_integrate_reference_volume() {
    // Measure of the reference cell [-1, 1]^d or its simplex
    let volumes = [
        (CellShape::Line, 2.0),
        (CellShape::Triangle, 2.0),
        (CellShape::Quadrilateral, 4.0),
        (CellShape::Tetrahedron, 4.0 / 3.0),
        (CellShape::Hexahedron, 8.0),
    ];
    for (shape, volume) in volumes {
        for strength in 0..5 {
            let rule = QuadratureRule::<f64>::gauss(shape, strength).unwrap();
            let sum: f64 = rule.weights().iter().sum();
            assert!((sum - volume).abs() < 1e-10, "{shape:?} with strength {strength}");
            assert_eq!(rule.cell_dim(), shape.cell_dim());
        }
    }
}

#[test]
fn compute_geometry_on_distorted_tet10() {
    let mesh = tet10_mesh();
    let quadrature = tet10_quadrature();
    let mut buffer = quadrature.create_buffer();
    let mut coordinates = Vec::new();
    mesh.populate_cell_coordinates(0, &mut coordinates);
    quadrature.compute_geometry(&coordinates, &mut buffer).unwrap();

    assert_eq!(buffer.num_quad_pts(), 4);
    for q in 0..4 {
        assert_scalar_eq!(buffer.jacobian_det(q), 2.134375, comp = abs, tol = 1e-12);
        assert_scalar_eq!(buffer.measures()[q], 2.134375 / 3.0, comp = abs, tol = 1e-12);
        let identity = buffer.jacobian_inv(q) * buffer.jacobian(q);
        assert_approx_matrix_eq!(identity, DMatrix::<f64>::identity(3, 3), abstol = 1e-12);
        // Physical derivatives of a partition of unity sum to zero
        for k in 0..3 {
            assert!(buffer.basis_derivatives(q).column(k).sum().abs() < 1e-12);
        }
    }
    assert_approx_slice_eq!(buffer.quad_point(0), [-0.03, -1.45, -0.55], reltol = 1e-12);

    // Passing only the corners gives the same geometry
    let mut corners_only = quadrature.create_buffer();
    quadrature
        .compute_geometry(&coordinates[..12], &mut corners_only)
        .unwrap();
    assert_eq!(buffer, corners_only);
}

#[test]
fn physical_derivatives_reproduce_linear_fields() {
    let mesh = tet10_mesh();
    let quadrature = tet10_quadrature();
    let mut buffer = quadrature.create_buffer();
    let mut coordinates = Vec::new();
    mesh.populate_cell_coordinates(0, &mut coordinates);
    quadrature.compute_geometry(&coordinates, &mut buffer).unwrap();

    // f(x) = 2 x - y + 3 z has gradient (2, -1, 3)
    let nodal = DMatrix::from_iterator(
        1,
        10,
        coordinates.chunks(3).map(|x| 2.0 * x[0] - x[1] + 3.0 * x[2]),
    );
    for q in 0..4 {
        let gradient = &nodal * buffer.basis_derivatives(q);
        assert_approx_matrix_eq!(gradient, DMatrix::from_row_slice(1, 3, &[2.0, -1.0, 3.0]), abstol = 1e-12);
    }
}

#[test]
fn embedded_triangle_uses_pseudo_inverse() {
    let quadrature = Quadrature::<f64>::gauss(CellGeometry::Tri3d, LagrangeBasis::Tri3).unwrap();
    let mut buffer = quadrature.create_buffer();
    let vertices = [0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 1.0, 1.0];
    quadrature.compute_geometry(&vertices, &mut buffer).unwrap();

    let area: f64 = buffer.measures().iter().sum();
    assert_scalar_eq!(area, 2f64.sqrt(), comp = abs, tol = 1e-12);
    for q in 0..buffer.num_quad_pts() {
        assert_eq!(buffer.jacobian(q).shape(), (3, 2));
        assert_eq!(buffer.jacobian_inv(q).shape(), (2, 3));
        let identity = buffer.jacobian_inv(q) * buffer.jacobian(q);
        assert_approx_matrix_eq!(identity, DMatrix::<f64>::identity(2, 2), abstol = 1e-12);
    }
}

#[test]
fn measures_sum_to_cell_volume() {
    #[rustfmt::skip]
    let cells: [(CellGeometry, Vec<f64>, f64); 5] = [
        (CellGeometry::Line1d, vec![1.0, 4.0], 3.0),
        (CellGeometry::Tri2d, vec![0.0, 0.0, 3.0, 0.0, 0.0, 4.0], 6.0),
        (CellGeometry::Quad2d, vec![0.0, 0.0, 2.0, 0.0, 3.0, 1.0, -1.0, 1.0], 3.0),
        (CellGeometry::Tet3d, vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0], 1.0 / 6.0),
        (CellGeometry::Hex3d, vec![
            0.0, 0.0, 0.0,  2.0, 0.0, 0.0,  2.0, 1.0, 0.0,  0.0, 1.0, 0.0,
            0.0, 0.0, 3.0,  2.0, 0.0, 3.0,  2.0, 1.0, 3.0,  0.0, 1.0, 3.0,
        ], 6.0),
    ];
    for (geometry, vertices, volume) in cells {
        let basis = LagrangeBasis::linear(geometry.shape());
        let quadrature = Quadrature::gauss(geometry, basis).unwrap();
        let mut buffer = quadrature.create_buffer();
        quadrature.compute_geometry(&vertices, &mut buffer).unwrap();
        let sum: f64 = buffer.measures().iter().sum();
        assert!((sum - volume).abs() < 1e-12, "{geometry:?}");
    }
}

#[test]
fn buffers_adapt_to_any_quadrature() {
    let mut buffer = quakefem::quadrature::QuadratureBuffer::default();
    for (geometry, basis) in ALL_GEOMETRIES {
        let quadrature = Quadrature::<f64>::gauss(geometry, basis).unwrap();
        let reference = geometry.reference_vertices::<f64>();
        // Embed the reference cell in the physical space
        let d = geometry.space_dim();
        let vertices: Vec<f64> = reference
            .row_iter()
            .flat_map(|row| (0..d).map(move |k| if k < row.len() { row[k] } else { 0.0 }))
            .collect();
        quadrature.compute_geometry(&vertices, &mut buffer).unwrap();
        assert_eq!(buffer.num_quad_pts(), quadrature.num_quad_pts());
        assert_eq!(buffer.basis_derivatives(0).shape(), (quadrature.num_basis(), d));
    }
}

#[test]
fn inverted_cell_is_reported() {
    let quadrature = tet10_quadrature();
    let mut buffer = quadrature.create_buffer();
    let mut coordinates = tet10_mesh().vertices()[..12].to_vec();
    coordinates.swap(0, 3);
    coordinates.swap(1, 4);
    coordinates.swap(2, 5);
    assert_err_matches!(
        quadrature.compute_geometry(&coordinates, &mut buffer),
        Error::DegenerateCell { .. }
    );
}

#[test]
fn invalid_construction_is_configuration_error() {
    assert_err_matches!(QuadratureRule::<f64>::new(2, vec![], vec![]), Error::Configuration(_));
    assert_err_matches!(
        QuadratureRule::new(2, vec![0.0, 0.0, 0.5], vec![1.0, 1.0]),
        Error::Configuration(_)
    );

    let rule = QuadratureRule::gauss(CellShape::Triangle, 2).unwrap();
    assert_err_matches!(
        Quadrature::<f64>::from_lagrange(CellGeometry::Tet3d, rule.clone(), LagrangeBasis::Tri3),
        Error::Configuration(_)
    );
    assert_err_matches!(
        Quadrature::<f64>::from_lagrange(CellGeometry::Tet3d, rule.clone(), LagrangeBasis::Tet4),
        Error::Configuration(_)
    );

    // Basis tabulated on a different rule
    let other = QuadratureRule::gauss(CellShape::Triangle, 4).unwrap();
    let table = BasisTable::from_lagrange(LagrangeBasis::Tri3, &other).unwrap();
    assert_err_matches!(
        Quadrature::new(CellGeometry::Tri2d, rule.clone(), table),
        Error::Configuration(_)
    );
    assert_err_matches!(
        BasisTable::<f64>::new(3, vec![1.0; 4], vec![DMatrix::zeros(3, 2)]),
        Error::Configuration(_)
    );

    let quadrature = Quadrature::from_lagrange(CellGeometry::Tri2d, rule, LagrangeBasis::Tri3).unwrap();
    let mut buffer = quadrature.create_buffer();
    assert_err_matches!(
        quadrature.compute_geometry(&[0.0, 0.0, 1.0, 0.0], &mut buffer),
        Error::Configuration(_)
    );
}
