use quakefem::mesh::Mesh;
use quakefem_solid::materials::LameParameters;

mod materials;

fn lame_parameters() -> LameParameters<f64> {
    LameParameters {
        mu: 384.0,
        lambda: 577.0,
    }
}

/// The unit square divided into `n x n` counter-clockwise quadrilaterals.
fn unit_square_quad_mesh(n: usize) -> Mesh<f64> {
    let h = 1.0 / n as f64;
    let vertices = (0..=n)
        .flat_map(|j| (0..=n).flat_map(move |i| [i as f64 * h, j as f64 * h]))
        .collect();
    let v = |i: usize, j: usize| j * (n + 1) + i;
    let cells = (0..n)
        .flat_map(|j| (0..n).map(move |i| vec![v(i, j), v(i + 1, j), v(i + 1, j + 1), v(i, j + 1)]))
        .collect();
    Mesh::from_vertices_and_cells(2, vertices, cells).unwrap()
}
