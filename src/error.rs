//! Library-wide error type.
use quakefem_traits::Real;
use thiserror::Error;

/// Errors raised by geometry, quadrature and integration routines.
///
/// All variants are fatal for the current assembly pass. Nothing in this crate retries.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum Error {
    /// Inconsistent dimensions, missing fields or otherwise malformed setup.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// A cell with a zero or wrongly signed Jacobian determinant.
    #[error("degenerate cell: Jacobian determinant is {det:e}")]
    DegenerateCell { det: f64 },
    /// Failure reported by a rheology, e.g. a non-physical parameter.
    #[error("material error: {0}")]
    Material(String),
    /// An operation that exists on an interface but is not available for this implementor.
    #[error("operation not supported: {operation}")]
    Unsupported { operation: &'static str },
}

impl Error {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn material(message: impl Into<String>) -> Self {
        Self::Material(message.into())
    }

    /// Builds a degenerate-cell error from a determinant of any scalar type.
    pub fn degenerate_cell<T: Real>(det: T) -> Self {
        let det = nalgebra::try_convert::<T, f64>(det).unwrap_or(f64::NAN);
        Self::DegenerateCell { det }
    }
}

impl From<quakefem_quadrature::Error> for Error {
    fn from(err: quakefem_quadrature::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
