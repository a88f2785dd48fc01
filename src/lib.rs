//! Cell geometry, quadrature and elasticity integration for crustal deformation and earthquake
//! rupture simulations.
//!
//! The crate computes elemental residuals and Jacobians by numerical integration on reference
//! cells and assembles them into caller-owned global vectors and matrices. Solving the assembled
//! systems and stepping in time are left to the caller.
pub mod assembly;
pub mod basis;
pub mod bc;
pub mod cell_geometry;
pub mod error;
pub mod faults;
pub mod fields;
pub mod integrator;
pub mod material;
pub mod mesh;
pub mod quadrature;
pub mod settings;
pub mod spatialdb;

pub use error::{Error, Result};
pub use quakefem_traits::Real;

pub extern crate nalgebra;
pub extern crate nalgebra_sparse;
