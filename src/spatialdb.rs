//! Spatial databases: parameter fields keyed by physical location.
use crate::error::{Error, Result};
use quakefem_traits::Real;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Source of named parameter values at physical points.
pub trait SpatialDatabase<T: Real>: Sync {
    /// Writes the values named by `names` at `point` into `values`, in the same order.
    ///
    /// Fails for unknown names and for points outside the domain covered by the database.
    fn query(&self, point: &[T], names: &[&str], values: &mut [T]) -> Result<()>;
}

/// Cartesian coordinate system.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartesianCoordSys {
    pub space_dim: usize,
}

impl CartesianCoordSys {
    pub fn new(space_dim: usize) -> Self {
        Self { space_dim }
    }
}

fn check_lengths<T>(names: &[&str], values: &[T]) {
    assert_eq!(names.len(), values.len(), "One output value per queried name is required");
}

/// Database with the same values everywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniformDb<T> {
    label: String,
    values: BTreeMap<String, T>,
}

impl<T: Real> UniformDb<T> {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, name: impl Into<String>, value: T) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl<T: Real> SpatialDatabase<T> for UniformDb<T> {
    fn query(&self, _point: &[T], names: &[&str], values: &mut [T]) -> Result<()> {
        check_lengths(names, values);
        for (name, value) in names.iter().zip(values.iter_mut()) {
            *value = *self.values.get(*name).ok_or_else(|| {
                Error::configuration(format!("Spatial database '{}' has no value '{}'.", self.label, name))
            })?;
        }
        Ok(())
    }
}

type UserFunction<T> = Box<dyn Fn(&[T]) -> T + Send + Sync>;

/// Database whose values are functions of position.
///
/// An optional bounding box restricts the domain on which queries succeed.
pub struct UserFunctionDb<T> {
    label: String,
    functions: BTreeMap<String, UserFunction<T>>,
    bounds: Option<(Vec<T>, Vec<T>)>,
}

impl<T: Real> UserFunctionDb<T> {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            functions: BTreeMap::new(),
            bounds: None,
        }
    }

    pub fn with_function(mut self, name: impl Into<String>, function: impl Fn(&[T]) -> T + Send + Sync + 'static) -> Self {
        self.functions.insert(name.into(), Box::new(function));
        self
    }

    /// Restricts queries to the axis-aligned box `[min, max]`.
    pub fn with_bounds(mut self, min: Vec<T>, max: Vec<T>) -> Self {
        self.bounds = Some((min, max));
        self
    }

    fn contains(&self, point: &[T]) -> bool {
        match &self.bounds {
            None => true,
            Some((min, max)) => {
                point.len() == min.len()
                    && point
                        .iter()
                        .zip(min.iter().zip(max))
                        .all(|(&x, (&lo, &hi))| lo <= x && x <= hi)
            }
        }
    }
}

impl<T: Real> fmt::Debug for UserFunctionDb<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserFunctionDb")
            .field("label", &self.label)
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .field("bounds", &self.bounds)
            .finish()
    }
}

impl<T: Real> SpatialDatabase<T> for UserFunctionDb<T> {
    fn query(&self, point: &[T], names: &[&str], values: &mut [T]) -> Result<()> {
        check_lengths(names, values);
        if !self.contains(point) {
            return Err(Error::configuration(format!(
                "Point {:?} is outside the domain of spatial database '{}'.",
                point, self.label
            )));
        }
        for (name, value) in names.iter().zip(values.iter_mut()) {
            let function = self.functions.get(*name).ok_or_else(|| {
                Error::configuration(format!("Spatial database '{}' has no value '{}'.", self.label, name))
            })?;
            *value = function(point);
        }
        Ok(())
    }
}
