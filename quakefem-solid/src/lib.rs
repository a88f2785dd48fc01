//! Rheologies and body forces for `quakefem`.
pub mod gravity_source;
pub mod materials;

pub use gravity_source::GravitySource;
pub use materials::IsotropicLinearElasticity;
