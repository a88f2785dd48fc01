//! Scalar traits shared by the `quakefem` crates.
use nalgebra::RealField;

pub use nalgebra;

/// Floating-point scalar used throughout cell geometry, quadrature and integration.
///
/// Every `Copy` type implementing [`RealField`] (in practice `f32` and `f64`) is `Real`.
pub trait Real: RealField + Copy {}

impl<T: RealField + Copy> Real for T {}
