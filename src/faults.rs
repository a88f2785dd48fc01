//! Kinematic fault sources: prescribed slip as a function of time.
//!
//! Slip is expressed in the local fault frame, shear components first and opening last, matching
//! the boundary orientation in [`cell_geometry::orientation`](crate::cell_geometry::orientation).
use crate::assembly::for_each_cell;
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::quadrature::Quadrature;
use crate::spatialdb::SpatialDatabase;
use log::debug;
use numeric_literals::replace_float_literals;
use quakefem_traits::Real;
use serde::{Deserialize, Serialize};

/// Name of the slip initiation time, relative to the origin time.
pub const INITIATION_TIME: &str = "initiation_time";
/// Name of the rise time of the Brune slip function.
pub const RISE_TIME: &str = "rise_time";

/// Names of the final slip components in `space_dim` dimensions.
pub fn final_slip_names(space_dim: usize) -> Result<&'static [&'static str]> {
    let names: &'static [&'static str] = match space_dim {
        1 => &["final_slip_opening"],
        2 => &["final_slip_left_lateral", "final_slip_opening"],
        3 => &["final_slip_left_lateral", "final_slip_reverse", "final_slip_opening"],
        _ => {
            return Err(Error::configuration(format!(
                "Fault slip is not defined in {space_dim} dimensions."
            )))
        }
    };
    Ok(names)
}

/// Slip parameters at one point of a fault.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlipParameters<T> {
    pub initiation_time: T,
    pub final_slip: Vec<T>,
    /// Values named by [`SlipTimeFn::auxiliary_names`], in the same order.
    pub auxiliary: Vec<T>,
}

/// Time history of slip at a point.
pub trait SlipTimeFn<T: Real>: Sync {
    /// Names of the values queried in addition to the initiation time and final slip.
    fn auxiliary_names(&self) -> &[&'static str];

    /// Rejects parameters for which the slip history is undefined.
    fn check_parameters(&self, _parameters: &SlipParameters<T>) -> Result<()> {
        Ok(())
    }

    /// Writes the slip at time `t` into `slip`, one entry per final slip component.
    fn slip(&self, t: T, origin_time: T, parameters: &SlipParameters<T>, slip: &mut [T]);
}

/// Slip history of the Brune (1970) far-field time function.
///
/// With `t0 = origin_time + initiation_time` and `τ = 0.21081916 rise_time`, the slip is zero
/// before `t0` and `final_slip (1 - exp(-(t - t0)/τ) (1 + (t - t0)/τ))` afterwards. About 95% of
/// the final slip is reached after one rise time.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BruneSlipFn;

impl<T: Real> SlipTimeFn<T> for BruneSlipFn {
    fn auxiliary_names(&self) -> &[&'static str] {
        &[RISE_TIME]
    }

    fn check_parameters(&self, parameters: &SlipParameters<T>) -> Result<()> {
        match parameters.auxiliary.first() {
            Some(&rise_time) if rise_time > T::zero() => Ok(()),
            Some(rise_time) => Err(Error::configuration(format!(
                "Rise time of the Brune slip function must be positive, got {rise_time}."
            ))),
            None => Err(Error::configuration("Brune slip function requires a rise time.")),
        }
    }

    /// Parameters that fail [`check_parameters`](SlipTimeFn::check_parameters) because the rise
    /// time is missing or not positive degenerate to a step at `t0`.
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn slip(&self, t: T, origin_time: T, parameters: &SlipParameters<T>, slip: &mut [T]) {
        assert_eq!(slip.len(), parameters.final_slip.len(), "Slip output dimension mismatch");
        let t0 = origin_time + parameters.initiation_time;
        if t <= t0 {
            slip.fill(0.0);
            return;
        }
        let rise_time = parameters.auxiliary.first().copied().unwrap_or(0.0);
        let fraction = if rise_time > 0.0 {
            let elapsed = (t - t0) / (0.21081916 * rise_time);
            1.0 - (-elapsed).exp() * (1.0 + elapsed)
        } else {
            1.0
        };
        for (s, &d) in slip.iter_mut().zip(&parameters.final_slip) {
            *s = d * fraction;
        }
    }
}

/// Slip that jumps to its final value at the initiation time.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSlipFn;

impl<T: Real> SlipTimeFn<T> for StepSlipFn {
    fn auxiliary_names(&self) -> &[&'static str] {
        &[]
    }

    fn slip(&self, t: T, origin_time: T, parameters: &SlipParameters<T>, slip: &mut [T]) {
        assert_eq!(slip.len(), parameters.final_slip.len(), "Slip output dimension mismatch");
        if t >= origin_time + parameters.initiation_time {
            slip.copy_from_slice(&parameters.final_slip);
        } else {
            slip.fill(T::zero());
        }
    }
}

/// A slip-time function with parameters sampled at the quadrature points of a fault mesh.
#[derive(Debug, Clone)]
pub struct KinematicSource<T: Real, F> {
    slip_fn: F,
    origin_time: T,
    space_dim: usize,
    parameters: Vec<SlipParameters<T>>,
}

impl<T: Real, F: SlipTimeFn<T>> KinematicSource<T, F> {
    /// Queries the slip parameters at every quadrature point of the fault cells.
    ///
    /// `quadrature` lives on the fault cells, one dimension below `fault_mesh`'s space.
    pub fn initialize(
        slip_fn: F,
        origin_time: T,
        db: &dyn SpatialDatabase<T>,
        quadrature: &Quadrature<T>,
        fault_mesh: &Mesh<T>,
    ) -> Result<Self> {
        let space_dim = fault_mesh.space_dim();
        if quadrature.space_dim() != space_dim || quadrature.cell_dim() + 1 != space_dim {
            return Err(Error::configuration(format!(
                "Fault quadrature on {:?} cells does not fit a {}-dimensional mesh.",
                quadrature.geometry(),
                space_dim
            )));
        }

        let slip_names = final_slip_names(space_dim)?;
        let names: Vec<&str> = std::iter::once(INITIATION_TIME)
            .chain(slip_names.iter().copied())
            .chain(slip_fn.auxiliary_names().iter().copied())
            .collect();
        let nq = quadrature.num_quad_pts();
        let mut parameters = Vec::with_capacity(fault_mesh.num_cells() * nq);

        for_each_cell(
            fault_mesh,
            quadrature,
            vec![T::zero(); nq * names.len()],
            |_, buffer, values: &mut Vec<T>| {
                for (q, point_values) in values.chunks_exact_mut(names.len()).enumerate() {
                    db.query(buffer.quad_point(q), &names, point_values)?;
                }
                Ok(())
            },
            |_, values| {
                for point_values in values.chunks_exact(names.len()) {
                    let (final_slip, auxiliary) = point_values[1..].split_at(space_dim);
                    parameters.push(SlipParameters {
                        initiation_time: point_values[0],
                        final_slip: final_slip.to_vec(),
                        auxiliary: auxiliary.to_vec(),
                    });
                }
            },
        )?;
        parameters
            .iter()
            .try_for_each(|params| slip_fn.check_parameters(params))?;

        debug!(
            "Initialized kinematic source on {} fault cells with {} quadrature points each",
            fault_mesh.num_cells(),
            nq
        );
        Ok(Self {
            slip_fn,
            origin_time,
            space_dim,
            parameters,
        })
    }

    pub fn origin_time(&self) -> T {
        self.origin_time
    }

    pub fn num_points(&self) -> usize {
        self.parameters.len()
    }

    pub fn parameters(&self) -> &[SlipParameters<T>] {
        &self.parameters
    }

    /// Slip at time `t` at all points, `space_dim` entries per point.
    pub fn slip(&self, t: T, slip: &mut [T]) {
        assert_eq!(slip.len(), self.space_dim * self.num_points(), "Slip output dimension mismatch");
        for (params, point_slip) in self.parameters.iter().zip(slip.chunks_exact_mut(self.space_dim)) {
            self.slip_fn.slip(t, self.origin_time, params, point_slip);
        }
    }
}
