//! Reference-cell geometry: coordinate maps, Jacobians and boundary shapes.
//!
//! A [`CellGeometry`] describes one of a closed set of straight-sided cell shapes embedded in a
//! space of equal or higher dimension. Physical cells are described by the coordinates of their
//! corners, passed as a flat slice with `num_corners * space_dim` entries (vertex-major).
//!
//! The reference cells are:
//!
//! - point: no coordinates,
//! - line: `-1`, `1`,
//! - triangle: `(-1, -1)`, `(1, -1)`, `(-1, 1)`,
//! - quadrilateral: `(-1, -1)`, `(1, -1)`, `(1, 1)`, `(-1, 1)`,
//! - tetrahedron: `(-1, -1, -1)`, `(1, -1, -1)`, `(-1, 1, -1)`, `(-1, -1, 1)`,
//! - hexahedron: the quadrilateral at `z = -1` followed by the quadrilateral at `z = 1`.
use crate::error::{Error, Result};
use nalgebra::{DMatrix, DMatrixViewMut, Dyn, Matrix, Storage};
use quakefem_traits::Real;
use serde::{Deserialize, Serialize};

mod hexahedron;
mod line;
pub mod orientation;
mod quadrilateral;
mod tetrahedron;
mod triangle;

/// The topological shape of a cell, independent of the embedding space.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellShape {
    Point,
    Line,
    Triangle,
    Quadrilateral,
    Tetrahedron,
    Hexahedron,
}

impl CellShape {
    pub fn cell_dim(&self) -> usize {
        match self {
            Self::Point => 0,
            Self::Line => 1,
            Self::Triangle | Self::Quadrilateral => 2,
            Self::Tetrahedron | Self::Hexahedron => 3,
        }
    }

    pub fn num_corners(&self) -> usize {
        match self {
            Self::Point => 1,
            Self::Line => 2,
            Self::Triangle => 3,
            Self::Quadrilateral => 4,
            Self::Tetrahedron => 4,
            Self::Hexahedron => 8,
        }
    }

    /// Pairs of corners connected by an edge.
    pub fn edges(&self) -> &'static [[usize; 2]] {
        match self {
            Self::Point => &[],
            Self::Line => &[[0, 1]],
            Self::Triangle => &[[0, 1], [1, 2], [2, 0]],
            Self::Quadrilateral => &[[0, 1], [1, 2], [2, 3], [3, 0]],
            Self::Tetrahedron => &[[0, 1], [1, 2], [2, 0], [0, 3], [1, 3], [2, 3]],
            Self::Hexahedron => &[
                [0, 1],
                [1, 2],
                [2, 3],
                [3, 0],
                [4, 5],
                [5, 6],
                [6, 7],
                [7, 4],
                [0, 4],
                [1, 5],
                [2, 6],
                [3, 7],
            ],
        }
    }

    /// Reference vertex coordinates, `num_corners * cell_dim` entries.
    #[rustfmt::skip]
    pub fn reference_vertices(&self) -> &'static [f64] {
        match self {
            Self::Point => &[],
            Self::Line => &[-1.0, 1.0],
            Self::Triangle => &[
                -1.0, -1.0,
                 1.0, -1.0,
                -1.0,  1.0,
            ],
            Self::Quadrilateral => &[
                -1.0, -1.0,
                 1.0, -1.0,
                 1.0,  1.0,
                -1.0,  1.0,
            ],
            Self::Tetrahedron => &[
                -1.0, -1.0, -1.0,
                 1.0, -1.0, -1.0,
                -1.0,  1.0, -1.0,
                -1.0, -1.0,  1.0,
            ],
            Self::Hexahedron => &[
                -1.0, -1.0, -1.0,
                 1.0, -1.0, -1.0,
                 1.0,  1.0, -1.0,
                -1.0,  1.0, -1.0,
                -1.0, -1.0,  1.0,
                 1.0, -1.0,  1.0,
                 1.0,  1.0,  1.0,
                -1.0,  1.0,  1.0,
            ],
        }
    }

    pub fn is_simplex(&self) -> bool {
        matches!(self, Self::Point | Self::Line | Self::Triangle | Self::Tetrahedron)
    }
}

/// Geometry of a reference cell embedded in a space of dimension `space_dim`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellGeometry {
    Point1d,
    Point2d,
    Point3d,
    Line1d,
    Line2d,
    Line3d,
    Tri2d,
    Tri3d,
    Quad2d,
    Quad3d,
    Tet3d,
    Hex3d,
}

/// Jacobian of the reference-to-physical map at a point, with its determinant.
///
/// `matrix` has dimensions `space_dim x cell_dim`. For cells of lower dimension than the space
/// the determinant is the volume scaling `sqrt(det(J^T J))`.
#[derive(Debug, Clone, PartialEq)]
pub struct CellJacobian<T: Real> {
    pub matrix: DMatrix<T>,
    pub det: T,
}

impl CellGeometry {
    /// Selects the geometry for the given shape and embedding dimension.
    pub fn new(shape: CellShape, space_dim: usize) -> Result<Self> {
        use CellGeometry::*;
        use CellShape::*;
        let geometry = match (shape, space_dim) {
            (Point, 1) => Point1d,
            (Point, 2) => Point2d,
            (Point, 3) => Point3d,
            (Line, 1) => Line1d,
            (Line, 2) => Line2d,
            (Line, 3) => Line3d,
            (Triangle, 2) => Tri2d,
            (Triangle, 3) => Tri3d,
            (Quadrilateral, 2) => Quad2d,
            (Quadrilateral, 3) => Quad3d,
            (Tetrahedron, 3) => Tet3d,
            (Hexahedron, 3) => Hex3d,
            _ => {
                return Err(Error::configuration(format!(
                    "No cell geometry for {shape:?} cells in {space_dim} dimensions."
                )))
            }
        };
        Ok(geometry)
    }

    pub fn shape(&self) -> CellShape {
        use CellGeometry::*;
        match self {
            Point1d | Point2d | Point3d => CellShape::Point,
            Line1d | Line2d | Line3d => CellShape::Line,
            Tri2d | Tri3d => CellShape::Triangle,
            Quad2d | Quad3d => CellShape::Quadrilateral,
            Tet3d => CellShape::Tetrahedron,
            Hex3d => CellShape::Hexahedron,
        }
    }

    pub fn cell_dim(&self) -> usize {
        self.shape().cell_dim()
    }

    pub fn space_dim(&self) -> usize {
        use CellGeometry::*;
        match self {
            Point1d | Line1d => 1,
            Point2d | Line2d | Tri2d | Quad2d => 2,
            Point3d | Line3d | Tri3d | Quad3d | Tet3d | Hex3d => 3,
        }
    }

    pub fn num_corners(&self) -> usize {
        self.shape().num_corners()
    }

    /// Reference vertices as a `num_corners x cell_dim` matrix.
    pub fn reference_vertices<T: Real>(&self) -> DMatrix<T> {
        let shape = self.shape();
        DMatrix::from_row_iterator(
            shape.num_corners(),
            shape.cell_dim(),
            shape
                .reference_vertices()
                .iter()
                .map(|&x| T::from_f64(x).expect("Literal must fit in T")),
        )
    }

    /// The geometry of the boundary facets of this cell.
    ///
    /// The result has `cell_dim - 1` and the same space dimension. Points have no boundary.
    pub fn geometry_lower_dim(&self) -> Result<CellGeometry> {
        use CellGeometry::*;
        match self {
            Point1d | Point2d | Point3d => Err(Error::Unsupported {
                operation: "lower-dimension geometry of a point",
            }),
            Line1d => Ok(Point1d),
            Line2d => Ok(Point2d),
            Line3d => Ok(Point3d),
            Tri2d | Quad2d => Ok(Line2d),
            Tri3d | Quad3d => Ok(Line3d),
            Tet3d => Ok(Tri3d),
            Hex3d => Ok(Quad3d),
        }
    }

    fn check_vertices<T>(&self, vertices: &[T]) -> Result<()> {
        let expected = self.num_corners() * self.space_dim();
        if vertices.len() != expected {
            return Err(Error::configuration(format!(
                "{:?} cell expects {} vertex coordinates, got {}.",
                self,
                expected,
                vertices.len()
            )));
        }
        Ok(())
    }

    fn check_reference_point<T>(&self, coords_ref: &[T]) -> Result<()> {
        if coords_ref.len() != self.cell_dim() {
            return Err(Error::configuration(format!(
                "{:?} cell expects reference points with {} coordinates, got {}.",
                self,
                self.cell_dim(),
                coords_ref.len()
            )));
        }
        Ok(())
    }

    /// Maps a point in reference coordinates to physical coordinates.
    ///
    /// `output` must hold `space_dim` entries.
    pub fn coords_ref_to_global<T: Real>(&self, coords_ref: &[T], vertices: &[T], output: &mut [T]) -> Result<()> {
        self.check_vertices(vertices)?;
        self.check_reference_point(coords_ref)?;
        assert_eq!(output.len(), self.space_dim(), "Output must have space_dim entries");

        let space_dim = self.space_dim();
        match self.shape() {
            CellShape::Point => output.copy_from_slice(vertices),
            CellShape::Line => line::coords_ref_to_global(space_dim, coords_ref, vertices, output),
            CellShape::Triangle => triangle::coords_ref_to_global(space_dim, coords_ref, vertices, output),
            CellShape::Quadrilateral => quadrilateral::coords_ref_to_global(space_dim, coords_ref, vertices, output),
            CellShape::Tetrahedron => tetrahedron::coords_ref_to_global(coords_ref, vertices, output),
            CellShape::Hexahedron => hexahedron::coords_ref_to_global(coords_ref, vertices, output),
        }
        Ok(())
    }

    /// Computes the Jacobian of the reference-to-physical map at `location`.
    ///
    /// Returns a degenerate-cell error if the determinant is zero, or negative for cells with
    /// `cell_dim == space_dim` (inverted cells).
    pub fn jacobian<T: Real>(&self, vertices: &[T], location: &[T]) -> Result<CellJacobian<T>> {
        let mut matrix = DMatrix::zeros(self.space_dim(), self.cell_dim());
        let det = self.jacobian_into(vertices, location, DMatrixViewMut::from(&mut matrix))?;
        Ok(CellJacobian { matrix, det })
    }

    /// Same as [`jacobian`](Self::jacobian), writing the matrix into a preallocated
    /// `space_dim x cell_dim` buffer and returning the determinant.
    pub fn jacobian_into<T: Real>(&self, vertices: &[T], location: &[T], mut output: DMatrixViewMut<T>) -> Result<T> {
        self.check_vertices(vertices)?;
        self.check_reference_point(location)?;
        assert_eq!(output.nrows(), self.space_dim(), "Jacobian must have space_dim rows");
        assert_eq!(output.ncols(), self.cell_dim(), "Jacobian must have cell_dim columns");

        let space_dim = self.space_dim();
        match self.shape() {
            CellShape::Point => {}
            CellShape::Line => line::jacobian(space_dim, vertices, &mut output),
            CellShape::Triangle => triangle::jacobian(space_dim, vertices, &mut output),
            CellShape::Quadrilateral => quadrilateral::jacobian(space_dim, location, vertices, &mut output),
            CellShape::Tetrahedron => tetrahedron::jacobian(vertices, &mut output),
            CellShape::Hexahedron => hexahedron::jacobian(location, vertices, &mut output),
        }

        let det = jacobian_determinant(&output);
        // Also rejects NaN
        if !(det > T::zero()) {
            return Err(Error::degenerate_cell(det));
        }
        Ok(det)
    }

    /// The shortest edge of the cell, measured between corners.
    pub fn min_cell_width<T: Real>(&self, vertices: &[T]) -> Result<T> {
        self.check_vertices(vertices)?;
        let d = self.space_dim();
        let vertex = |i: usize| &vertices[d * i..d * (i + 1)];
        self.shape()
            .edges()
            .iter()
            .map(|&[a, b]| {
                vertex(a)
                    .iter()
                    .zip(vertex(b))
                    .fold(T::zero(), |acc, (&xa, &xb)| acc + (xb - xa) * (xb - xa))
                    .sqrt()
            })
            .reduce(|a, b| a.min(b))
            .ok_or(Error::Unsupported {
                operation: "width of a point cell",
            })
    }
}

/// Determinant of a Jacobian with `space_dim` rows and `cell_dim` columns.
///
/// Square Jacobians use the closed-form cofactor expansion. Rectangular Jacobians of embedded
/// cells use `sqrt(det(J^T J))`, and a Jacobian without columns (a point) has determinant one.
pub fn jacobian_determinant<T, S>(j: &Matrix<T, Dyn, Dyn, S>) -> T
where
    T: Real,
    S: Storage<T, Dyn, Dyn>,
{
    let (rows, cols) = j.shape();
    if cols == 0 {
        return T::one();
    }
    if rows == cols {
        return square_determinant(&j.clone_owned());
    }
    let metric = j.tr_mul(j);
    square_determinant(&metric).max(T::zero()).sqrt()
}

fn square_determinant<T: Real>(m: &DMatrix<T>) -> T {
    match m.nrows() {
        1 => m[(0, 0)],
        2 => m[(0, 0)] * m[(1, 1)] - m[(0, 1)] * m[(1, 0)],
        3 => {
            m[(0, 0)] * (m[(1, 1)] * m[(2, 2)] - m[(1, 2)] * m[(2, 1)])
                - m[(0, 1)] * (m[(1, 0)] * m[(2, 2)] - m[(1, 2)] * m[(2, 0)])
                + m[(0, 2)] * (m[(1, 0)] * m[(2, 1)] - m[(1, 1)] * m[(2, 0)])
        }
        _ => m.determinant(),
    }
}
