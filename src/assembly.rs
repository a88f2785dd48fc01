//! Global assembly targets and cell loops.
//!
//! Elemental vectors and matrices are blocked by node: entry `s * a + i` belongs to component `i`
//! of node `a`. Global indices follow the same convention with global vertex indices.
use crate::error::Result;
use crate::mesh::Mesh;
use crate::quadrature::{Quadrature, QuadratureBuffer};
use davenport::{define_thread_local_workspace, with_thread_local_workspace};
use nalgebra::{DMatrix, DVector, Dyn, Matrix, StorageMut};
use nalgebra_sparse::CooMatrix;
use quakefem_traits::Real;
use rayon::prelude::*;

/// Receives elemental vectors.
pub trait VectorAssembly<T: Real> {
    fn add_element_vector(&mut self, nodes: &[usize], solution_dim: usize, element: &DVector<T>);
}

/// Receives elemental matrices.
pub trait MatrixAssembly<T: Real> {
    fn add_element_matrix(&mut self, nodes: &[usize], solution_dim: usize, element: &DMatrix<T>);
}

impl<T: Real> VectorAssembly<T> for DVector<T> {
    fn add_element_vector(&mut self, nodes: &[usize], solution_dim: usize, element: &DVector<T>) {
        let s = solution_dim;
        assert_eq!(element.len(), s * nodes.len(), "Element vector has wrong size");
        for (a, &node) in nodes.iter().enumerate() {
            let mut block = self.rows_mut(s * node, s);
            block += element.rows(s * a, s);
        }
    }
}

impl<T: Real> MatrixAssembly<T> for DMatrix<T> {
    fn add_element_matrix(&mut self, nodes: &[usize], solution_dim: usize, element: &DMatrix<T>) {
        let s = solution_dim;
        assert_eq!(element.nrows(), s * nodes.len(), "Element matrix has wrong size");
        assert_eq!(element.ncols(), s * nodes.len(), "Element matrix has wrong size");
        for (a, &node_a) in nodes.iter().enumerate() {
            for (b, &node_b) in nodes.iter().enumerate() {
                let mut block = self.view_mut((s * node_a, s * node_b), (s, s));
                block += element.view((s * a, s * b), (s, s));
            }
        }
    }
}

impl<T: Real> MatrixAssembly<T> for CooMatrix<T> {
    fn add_element_matrix(&mut self, nodes: &[usize], solution_dim: usize, element: &DMatrix<T>) {
        let s = solution_dim;
        assert_eq!(element.nrows(), s * nodes.len(), "Element matrix has wrong size");
        for (a, &node_a) in nodes.iter().enumerate() {
            for (b, &node_b) in nodes.iter().enumerate() {
                for i in 0..s {
                    for j in 0..s {
                        self.push(s * node_a + i, s * node_b + j, element[(s * a + i, s * b + j)]);
                    }
                }
            }
        }
    }
}

/// The lumped approximation of a matrix: the vector of its row sums.
pub fn lump_row_sums<T: Real>(matrix: &DMatrix<T>) -> DVector<T> {
    DVector::from_iterator(matrix.nrows(), matrix.row_iter().map(|row| row.sum()))
}

/// Copies the upper triangle of a square matrix into its lower triangle.
pub(crate) fn clone_upper_to_lower<T, S>(matrix: &mut Matrix<T, Dyn, Dyn, S>)
where
    T: Real,
    S: StorageMut<T, Dyn, Dyn>,
{
    for j in 0..matrix.ncols() {
        for i in (j + 1)..matrix.nrows() {
            matrix[(i, j)] = matrix[(j, i)];
        }
    }
}

/// Scratch data for one cell: node coordinates and quadrature geometry.
#[derive(Debug)]
pub struct CellWorkspace<T: Real> {
    pub coordinates: Vec<T>,
    pub quadrature: QuadratureBuffer<T>,
}

impl<T: Real> Default for CellWorkspace<T> {
    fn default() -> Self {
        Self {
            coordinates: Vec::new(),
            quadrature: QuadratureBuffer::default(),
        }
    }
}

impl<T: Real> CellWorkspace<T> {
    /// Computes the quadrature geometry of `cell`.
    pub fn prepare(&mut self, mesh: &Mesh<T>, quadrature: &Quadrature<T>, cell: usize) -> Result<()> {
        mesh.populate_cell_coordinates(cell, &mut self.coordinates);
        quadrature.compute_geometry(&self.coordinates, &mut self.quadrature)
    }
}

define_thread_local_workspace!(WORKSPACE);

/// Computes an elemental contribution for every cell in sequence and passes it to `sink`.
///
/// `compute` must overwrite its output entirely. The first error aborts the loop.
pub(crate) fn for_each_cell<T, O, F, G>(
    mesh: &Mesh<T>,
    quadrature: &Quadrature<T>,
    mut output: O,
    mut compute: F,
    mut sink: G,
) -> Result<()>
where
    T: Real,
    F: FnMut(usize, &QuadratureBuffer<T>, &mut O) -> Result<()>,
    G: FnMut(usize, &O),
{
    let mut workspace = CellWorkspace::default();
    for cell in 0..mesh.num_cells() {
        workspace.prepare(mesh, quadrature, cell)?;
        compute(cell, &workspace.quadrature, &mut output)?;
        sink(cell, &output);
    }
    Ok(())
}

/// Parallel counterpart of [`for_each_cell`].
///
/// Elemental contributions are computed concurrently, each thread with its own
/// [`CellWorkspace`], and handed to `sink` in cell order afterwards.
pub(crate) fn par_for_each_cell<T, O, E, F, G>(
    mesh: &Mesh<T>,
    quadrature: &Quadrature<T>,
    create_output: E,
    compute: F,
    mut sink: G,
) -> Result<()>
where
    T: Real,
    O: Send,
    E: Fn() -> O + Sync,
    F: Fn(usize, &QuadratureBuffer<T>, &mut O) -> Result<()> + Sync,
    G: FnMut(usize, &O),
{
    let contributions: Vec<O> = (0..mesh.num_cells())
        .into_par_iter()
        .with_min_len(16)
        .map(|cell| {
            with_thread_local_workspace(&WORKSPACE, |workspace: &mut CellWorkspace<T>| {
                workspace.prepare(mesh, quadrature, cell)?;
                let mut output = create_output();
                compute(cell, &workspace.quadrature, &mut output)?;
                Ok(output)
            })
        })
        .collect::<Result<Vec<O>>>()?;

    for (cell, contribution) in contributions.iter().enumerate() {
        sink(cell, contribution);
    }
    Ok(())
}
