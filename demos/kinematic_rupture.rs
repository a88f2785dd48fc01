//! Slip histories of a Brune source on a vertical 2D fault, with rupture spreading upwards from
//! the bottom at constant speed.
use nalgebra::DVector;
use quakefem::basis::LagrangeBasis;
use quakefem::cell_geometry::CellGeometry;
use quakefem::faults::{BruneSlipFn, KinematicSource, INITIATION_TIME, RISE_TIME};
use quakefem::mesh::Mesh;
use quakefem::quadrature::Quadrature;
use quakefem::spatialdb::UserFunctionDb;

fn main() -> eyre::Result<()> {
    let num_segments = 8;
    let depth = 8000.0;
    let h = depth / num_segments as f64;
    let vertices = (0..=num_segments).flat_map(|i| [0.0, -depth + i as f64 * h]).collect();
    let cells = (0..num_segments).map(|i| vec![i, i + 1]).collect();
    let fault = Mesh::from_vertices_and_cells(2, vertices, cells)?;

    let rupture_speed = 2500.0;
    let db = UserFunctionDb::new("rupture")
        .with_function(INITIATION_TIME, move |x: &[f64]| (x[1] + depth) / rupture_speed)
        .with_function("final_slip_left_lateral", |x: &[f64]| 2.0 * (1.0 + x[1] / 8000.0).sin().max(0.1))
        .with_function("final_slip_opening", |_: &[f64]| 0.0)
        .with_function(RISE_TIME, |_: &[f64]| 1.5);

    let quadrature = Quadrature::gauss(CellGeometry::Line2d, LagrangeBasis::Line2)?;
    let source = KinematicSource::initialize(BruneSlipFn, 0.0, &db, &quadrature, &fault)?;

    let mut slip = DVector::zeros(2 * source.num_points());
    for step in 0..=10 {
        let t = 0.5 * step as f64;
        source.slip(t, slip.as_mut_slice());
        let left_lateral: Vec<String> = slip
            .iter()
            .step_by(2)
            .map(|s| format!("{s:5.2}"))
            .collect();
        println!("t = {t:4.1} s  slip [m]: {}", left_lateral.join(" "));
    }

    Ok(())
}
