//! Named global solution fields.
use crate::error::{Error, Result};
use nalgebra::{DVector, DVectorViewMut};
use quakefem_traits::Real;
use std::collections::BTreeMap;

/// Displacement at the current time `t`.
pub const DISP_T: &str = "disp(t)";
/// Displacement at the previous time step `t - dt`.
pub const DISP_T_MINUS_DT: &str = "disp(t-dt)";
/// Displacement increment from `t` to `t + dt`.
pub const DISP_INCR: &str = "dispIncr(t->t+dt)";

/// Global fields keyed by name, each with `solution_dim` components per vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct Fields<T: Real> {
    fields: BTreeMap<String, DVector<T>>,
}

impl<T: Real> Default for Fields<T> {
    fn default() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }
}

impl<T: Real> Fields<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, values: DVector<T>) -> Self {
        self.insert(name, values);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, values: DVector<T>) {
        self.fields.insert(name.into(), values);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Result<&DVector<T>> {
        self.fields
            .get(name)
            .ok_or_else(|| Error::configuration(format!("Field '{name}' is not available.")))
    }

    /// Checks that the field exists and has the given length.
    pub fn check(&self, name: &str, expected_len: usize) -> Result<()> {
        let field = self.get(name)?;
        if field.len() != expected_len {
            return Err(Error::configuration(format!(
                "Field '{}' has {} entries, expected {}.",
                name,
                field.len(),
                expected_len
            )));
        }
        Ok(())
    }

    /// Gathers the values of a field at the given nodes into `local`.
    pub fn gather(&self, name: &str, nodes: &[usize], solution_dim: usize, local: &mut DVector<T>) -> Result<()> {
        let global = self.get(name)?;
        if let Some(&node) = nodes.iter().find(|&&node| solution_dim * (node + 1) > global.len()) {
            return Err(Error::configuration(format!(
                "Field '{}' has no values for node {} ({} entries with {} components per node).",
                name,
                node,
                global.len(),
                solution_dim
            )));
        }
        local.resize_vertically_mut(solution_dim * nodes.len(), T::zero());
        gather_global_to_local(global, local.into(), nodes, solution_dim);
        Ok(())
    }
}

/// Copies the `solution_dim` components of each node in `nodes` from a global vector into
/// consecutive blocks of `local`.
pub fn gather_global_to_local<T: Real>(
    global: &DVector<T>,
    mut local: DVectorViewMut<T>,
    nodes: &[usize],
    solution_dim: usize,
) {
    let s = solution_dim;
    assert_eq!(local.len(), s * nodes.len(), "Local vector has wrong size");
    for (i_local, &i_global) in nodes.iter().enumerate() {
        local
            .rows_mut(s * i_local, s)
            .copy_from(&global.rows(s * i_global, s));
    }
}
