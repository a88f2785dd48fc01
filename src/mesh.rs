//! Minimal unstructured mesh with labelled boundaries.
use crate::error::{Error, Result};
use quakefem_traits::Real;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Index-based mesh: flat vertex coordinates, cell-to-vertex connectivity and named boundary
/// facets.
///
/// Vertex coordinates are stored vertex-major with `space_dim` entries per vertex. Cells list
/// corners first, followed by any higher-order nodes. Boundary facets reference the same vertex
/// array and follow the same node conventions as cells of one dimension lower.
///
/// Deserialization goes through the same checks as [`Mesh::from_vertices_and_cells`] and
/// [`Mesh::with_boundary`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "MeshData<T>",
    bound(deserialize = "T: Real + Deserialize<'de>")
)]
pub struct Mesh<T> {
    space_dim: usize,
    vertices: Vec<T>,
    cells: Vec<Vec<usize>>,
    #[serde(default)]
    boundaries: BTreeMap<String, Vec<Vec<usize>>>,
}

/// Unvalidated serialized form of a [`Mesh`].
#[derive(Deserialize)]
struct MeshData<T> {
    space_dim: usize,
    vertices: Vec<T>,
    cells: Vec<Vec<usize>>,
    #[serde(default)]
    boundaries: BTreeMap<String, Vec<Vec<usize>>>,
}

impl<T: Real> TryFrom<MeshData<T>> for Mesh<T> {
    type Error = Error;

    fn try_from(data: MeshData<T>) -> Result<Self> {
        let MeshData {
            space_dim,
            vertices,
            cells,
            boundaries,
        } = data;
        boundaries.into_iter().try_fold(
            Self::from_vertices_and_cells(space_dim, vertices, cells)?,
            |mesh, (label, facets)| mesh.with_boundary(label, facets),
        )
    }
}

impl<T: Real> Mesh<T> {
    /// Construct a mesh from vertex coordinates and connectivity.
    ///
    /// Fails if the coordinates do not match the space dimension or a cell references a vertex
    /// that does not exist.
    pub fn from_vertices_and_cells(space_dim: usize, vertices: Vec<T>, cells: Vec<Vec<usize>>) -> Result<Self> {
        if space_dim == 0 || vertices.len() % space_dim != 0 {
            return Err(Error::configuration(format!(
                "{} vertex coordinates cannot be split into {space_dim}-dimensional vertices.",
                vertices.len()
            )));
        }
        let mesh = Self {
            space_dim,
            vertices,
            cells,
            boundaries: BTreeMap::new(),
        };
        mesh.check_connectivity(&mesh.cells)?;
        Ok(mesh)
    }

    /// Adds a named set of boundary facets.
    pub fn with_boundary(mut self, label: impl Into<String>, facets: Vec<Vec<usize>>) -> Result<Self> {
        self.check_connectivity(&facets)?;
        self.boundaries.insert(label.into(), facets);
        Ok(self)
    }

    fn check_connectivity(&self, cells: &[Vec<usize>]) -> Result<()> {
        let num_vertices = self.num_vertices();
        match cells.iter().flatten().find(|&&v| v >= num_vertices) {
            Some(v) => Err(Error::configuration(format!(
                "Connectivity references vertex {v}, but the mesh has {num_vertices} vertices."
            ))),
            None => Ok(()),
        }
    }

    pub fn space_dim(&self) -> usize {
        self.space_dim
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len() / self.space_dim
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn vertices(&self) -> &[T] {
        &self.vertices
    }

    pub fn vertex(&self, index: usize) -> &[T] {
        &self.vertices[index * self.space_dim..(index + 1) * self.space_dim]
    }

    pub fn cells(&self) -> &[Vec<usize>] {
        &self.cells
    }

    pub fn cell_vertices(&self, cell: usize) -> &[usize] {
        &self.cells[cell]
    }

    /// Labels of all boundaries.
    pub fn boundary_labels(&self) -> impl Iterator<Item = &str> {
        self.boundaries.keys().map(String::as_str)
    }

    /// Writes the coordinates of all nodes of `cell` into `coordinates`, replacing its contents.
    pub fn populate_cell_coordinates(&self, cell: usize, coordinates: &mut Vec<T>) {
        coordinates.clear();
        for &v in self.cell_vertices(cell) {
            coordinates.extend_from_slice(self.vertex(v));
        }
    }

    /// Extracts the boundary with the given label as a mesh of facets over the same vertices.
    pub fn boundary_mesh(&self, label: &str) -> Option<Mesh<T>> {
        self.boundaries.get(label).map(|facets| Mesh {
            space_dim: self.space_dim,
            vertices: self.vertices.clone(),
            cells: facets.clone(),
            boundaries: BTreeMap::new(),
        })
    }
}
