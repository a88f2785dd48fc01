//! Quadrature rules, tabulated basis functions and per-cell quadrature geometry.
//!
//! A [`Quadrature`] is immutable configuration: a [`CellGeometry`], a [`QuadratureRule`] and a
//! [`BasisTable`]. Computing the geometry of a physical cell writes into an explicitly owned
//! [`QuadratureBuffer`], so a single `Quadrature` can be shared between threads as long as each
//! thread has its own buffer.
use crate::basis::LagrangeBasis;
use crate::cell_geometry::{CellGeometry, CellShape};
use crate::error::{Error, Result};
use itertools::izip;
use nalgebra::{DMatrix, DMatrixViewMut};
use quakefem_quadrature::{simplex, tensor, univariate};
use quakefem_traits::Real;

fn convert<T: Real>(x: f64) -> T {
    T::from_f64(x).expect("Literal must fit in T")
}

/// Points and weights on a reference cell.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadratureRule<T> {
    cell_dim: usize,
    points: Vec<T>,
    weights: Vec<T>,
}

impl<T: Real> QuadratureRule<T> {
    /// Creates a rule from points stored point-major (`weights.len() * cell_dim` entries).
    pub fn new(cell_dim: usize, points: Vec<T>, weights: Vec<T>) -> Result<Self> {
        if weights.is_empty() {
            return Err(Error::configuration("Quadrature rule must have at least one point."));
        }
        if points.len() != weights.len() * cell_dim {
            return Err(Error::configuration(format!(
                "Quadrature rule with {} weights in {} dimensions needs {} point coordinates, got {}.",
                weights.len(),
                cell_dim,
                weights.len() * cell_dim,
                points.len()
            )));
        }
        Ok(Self {
            cell_dim,
            points,
            weights,
        })
    }

    /// The standard rule for `shape` integrating polynomials of degree `strength` exactly.
    pub fn gauss(shape: CellShape, strength: usize) -> Result<Self> {
        fn flatten<T: Real, const D: usize>((weights, points): quakefem_quadrature::Rule<D>) -> (Vec<T>, Vec<T>) {
            (
                weights.into_iter().map(convert::<T>).collect(),
                points.into_iter().flatten().map(convert::<T>).collect(),
            )
        }

        let (weights, points) = match shape {
            CellShape::Point => (vec![T::one()], vec![]),
            CellShape::Line => flatten(univariate::gauss_for_strength(strength)),
            CellShape::Triangle => flatten(simplex::triangle(strength)?),
            CellShape::Quadrilateral => flatten(tensor::quadrilateral_gauss(strength / 2 + 1)),
            CellShape::Tetrahedron => flatten(simplex::tetrahedron(strength)?),
            CellShape::Hexahedron => flatten(tensor::hexahedron_gauss(strength / 2 + 1)),
        };
        Self::new(shape.cell_dim(), points, weights)
    }

    pub fn cell_dim(&self) -> usize {
        self.cell_dim
    }

    pub fn num_points(&self) -> usize {
        self.weights.len()
    }

    pub fn point(&self, q: usize) -> &[T] {
        &self.points[q * self.cell_dim..(q + 1) * self.cell_dim]
    }

    pub fn weights(&self) -> &[T] {
        &self.weights
    }
}

/// Basis function values and reference derivatives at the points of a quadrature rule.
#[derive(Debug, Clone, PartialEq)]
pub struct BasisTable<T: Real> {
    num_basis: usize,
    values: Vec<T>,
    derivatives: Vec<DMatrix<T>>,
}

impl<T: Real> BasisTable<T> {
    /// Creates a table from explicit data.
    ///
    /// `values` is quadrature-point-major (`num_quad_pts * num_basis`), and `derivatives` holds one
    /// `num_basis x cell_dim` matrix per quadrature point.
    pub fn new(num_basis: usize, values: Vec<T>, derivatives: Vec<DMatrix<T>>) -> Result<Self> {
        if num_basis == 0 || values.len() != derivatives.len() * num_basis {
            return Err(Error::configuration(format!(
                "Basis table with {} basis functions at {} points needs {} values, got {}.",
                num_basis,
                derivatives.len(),
                derivatives.len() * num_basis,
                values.len()
            )));
        }
        if let Some(first) = derivatives.first() {
            let cell_dim = first.ncols();
            if derivatives
                .iter()
                .any(|d| d.nrows() != num_basis || d.ncols() != cell_dim)
            {
                return Err(Error::configuration(format!(
                    "Basis derivatives must be {num_basis}x{cell_dim} at every quadrature point."
                )));
            }
        }
        Ok(Self {
            num_basis,
            values,
            derivatives,
        })
    }

    /// Tabulates a Lagrange basis at the points of `rule`.
    pub fn from_lagrange(basis: LagrangeBasis, rule: &QuadratureRule<T>) -> Result<Self> {
        let cell_dim = basis.shape().cell_dim();
        if rule.cell_dim() != cell_dim {
            return Err(Error::configuration(format!(
                "Cannot tabulate {basis:?} basis at {}-dimensional quadrature points.",
                rule.cell_dim()
            )));
        }
        let num_basis = basis.num_basis();
        let mut values = vec![T::zero(); rule.num_points() * num_basis];
        let mut derivatives = Vec::with_capacity(rule.num_points());
        for (q, values_q) in values.chunks_exact_mut(num_basis).enumerate() {
            let xi = rule.point(q);
            basis.populate_basis(xi, values_q);
            let mut gradients = DMatrix::zeros(num_basis, cell_dim);
            basis.populate_basis_gradients(xi, DMatrixViewMut::from(&mut gradients));
            derivatives.push(gradients);
        }
        Self::new(num_basis, values, derivatives)
    }

    pub fn num_basis(&self) -> usize {
        self.num_basis
    }

    pub fn num_quad_pts(&self) -> usize {
        self.derivatives.len()
    }

    /// Basis values at quadrature point `q`.
    pub fn values(&self, q: usize) -> &[T] {
        &self.values[q * self.num_basis..(q + 1) * self.num_basis]
    }

    /// Reference derivatives at quadrature point `q`, one row per basis function.
    pub fn derivatives(&self, q: usize) -> &DMatrix<T> {
        &self.derivatives[q]
    }
}

/// Per-cell working data produced by [`Quadrature::compute_geometry`].
///
/// The contents are overwritten by every call. Concurrent workers each need their own buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadratureBuffer<T: Real> {
    space_dim: usize,
    quad_points: Vec<T>,
    jacobians: Vec<DMatrix<T>>,
    jacobian_dets: Vec<T>,
    jacobian_invs: Vec<DMatrix<T>>,
    basis_derivatives: Vec<DMatrix<T>>,
    measures: Vec<T>,
}

impl<T: Real> Default for QuadratureBuffer<T> {
    fn default() -> Self {
        Self {
            space_dim: 0,
            quad_points: Vec::new(),
            jacobians: Vec::new(),
            jacobian_dets: Vec::new(),
            jacobian_invs: Vec::new(),
            basis_derivatives: Vec::new(),
            measures: Vec::new(),
        }
    }
}

impl<T: Real> QuadratureBuffer<T> {
    fn resize(&mut self, num_quad_pts: usize, num_basis: usize, cell_dim: usize, space_dim: usize) {
        let resize_matrices = |matrices: &mut Vec<DMatrix<T>>, rows: usize, cols: usize| {
            matrices.resize_with(num_quad_pts, || DMatrix::zeros(rows, cols));
            for m in matrices.iter_mut() {
                if m.shape() != (rows, cols) {
                    *m = DMatrix::zeros(rows, cols);
                }
            }
        };
        self.space_dim = space_dim;
        self.quad_points.resize(num_quad_pts * space_dim, T::zero());
        self.jacobian_dets.resize(num_quad_pts, T::zero());
        self.measures.resize(num_quad_pts, T::zero());
        resize_matrices(&mut self.jacobians, space_dim, cell_dim);
        resize_matrices(&mut self.jacobian_invs, cell_dim, space_dim);
        resize_matrices(&mut self.basis_derivatives, num_basis, space_dim);
    }

    pub fn num_quad_pts(&self) -> usize {
        self.measures.len()
    }

    /// Physical coordinates of quadrature point `q`.
    pub fn quad_point(&self, q: usize) -> &[T] {
        &self.quad_points[q * self.space_dim..(q + 1) * self.space_dim]
    }

    /// All physical quadrature points, point-major.
    pub fn quad_points(&self) -> &[T] {
        &self.quad_points
    }

    pub fn jacobian(&self, q: usize) -> &DMatrix<T> {
        &self.jacobians[q]
    }

    pub fn jacobian_det(&self, q: usize) -> T {
        self.jacobian_dets[q]
    }

    /// Inverse of the Jacobian, or its pseudo-inverse for cells embedded in a higher dimension.
    pub fn jacobian_inv(&self, q: usize) -> &DMatrix<T> {
        &self.jacobian_invs[q]
    }

    /// Physical basis derivatives at point `q`: a `num_basis x space_dim` matrix.
    pub fn basis_derivatives(&self, q: usize) -> &DMatrix<T> {
        &self.basis_derivatives[q]
    }

    /// Integration measures `weight * |det|`, one per quadrature point.
    pub fn measures(&self) -> &[T] {
        &self.measures
    }
}

/// Immutable quadrature configuration for one kind of cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Quadrature<T: Real> {
    geometry: CellGeometry,
    rule: QuadratureRule<T>,
    basis: BasisTable<T>,
}

impl<T: Real> Quadrature<T> {
    pub fn new(geometry: CellGeometry, rule: QuadratureRule<T>, basis: BasisTable<T>) -> Result<Self> {
        if rule.cell_dim() != geometry.cell_dim() {
            return Err(Error::configuration(format!(
                "Quadrature rule dimension {} does not match cell dimension {} of {:?}.",
                rule.cell_dim(),
                geometry.cell_dim(),
                geometry
            )));
        }
        if basis.num_quad_pts() != rule.num_points() {
            return Err(Error::configuration(format!(
                "Basis table has {} quadrature points but the rule has {}.",
                basis.num_quad_pts(),
                rule.num_points()
            )));
        }
        if basis.derivatives(0).ncols() != geometry.cell_dim() {
            return Err(Error::configuration(format!(
                "Basis derivatives have dimension {} but the cell has dimension {}.",
                basis.derivatives(0).ncols(),
                geometry.cell_dim()
            )));
        }
        if basis.num_basis() < geometry.num_corners() {
            return Err(Error::configuration(format!(
                "A basis with {} functions cannot describe a cell with {} corners.",
                basis.num_basis(),
                geometry.num_corners()
            )));
        }
        Ok(Self { geometry, rule, basis })
    }

    /// Tabulates a Lagrange basis on `rule`.
    pub fn from_lagrange(geometry: CellGeometry, rule: QuadratureRule<T>, basis: LagrangeBasis) -> Result<Self> {
        if basis.shape() != geometry.shape() {
            return Err(Error::configuration(format!(
                "{basis:?} basis does not live on {geometry:?} cells."
            )));
        }
        let table = BasisTable::from_lagrange(basis, &rule)?;
        Self::new(geometry, rule, table)
    }

    /// A Lagrange basis with the standard rule integrating its mass matrix exactly.
    pub fn gauss(geometry: CellGeometry, basis: LagrangeBasis) -> Result<Self> {
        let rule = QuadratureRule::gauss(geometry.shape(), basis.mass_strength())?;
        Self::from_lagrange(geometry, rule, basis)
    }

    pub fn geometry(&self) -> &CellGeometry {
        &self.geometry
    }

    pub fn rule(&self) -> &QuadratureRule<T> {
        &self.rule
    }

    pub fn basis(&self) -> &BasisTable<T> {
        &self.basis
    }

    pub fn cell_dim(&self) -> usize {
        self.geometry.cell_dim()
    }

    pub fn space_dim(&self) -> usize {
        self.geometry.space_dim()
    }

    pub fn num_quad_pts(&self) -> usize {
        self.rule.num_points()
    }

    pub fn num_basis(&self) -> usize {
        self.basis.num_basis()
    }

    /// A buffer sized for this quadrature.
    pub fn create_buffer(&self) -> QuadratureBuffer<T> {
        let mut buffer = QuadratureBuffer::default();
        buffer.resize(self.num_quad_pts(), self.num_basis(), self.cell_dim(), self.space_dim());
        buffer
    }

    /// Computes the quadrature geometry of one physical cell.
    ///
    /// `cell_coordinates` holds either the corner coordinates (`num_corners * space_dim`) or the
    /// coordinates of all nodes (`num_basis * space_dim`) with the corners first. Only corners
    /// enter the geometric map.
    ///
    /// Fails with a degenerate-cell error if any Jacobian determinant is not positive.
    pub fn compute_geometry(&self, cell_coordinates: &[T], buffer: &mut QuadratureBuffer<T>) -> Result<()> {
        let space_dim = self.space_dim();
        let cell_dim = self.cell_dim();
        let num_corners = self.geometry.num_corners();
        let corner_len = num_corners * space_dim;
        if cell_coordinates.len() != corner_len && cell_coordinates.len() != self.num_basis() * space_dim {
            return Err(Error::configuration(format!(
                "Expected {} or {} cell coordinates for {:?} cells, got {}.",
                corner_len,
                self.num_basis() * space_dim,
                self.geometry,
                cell_coordinates.len()
            )));
        }
        let vertices = &cell_coordinates[..corner_len];

        buffer.resize(self.num_quad_pts(), self.num_basis(), cell_dim, space_dim);
        let QuadratureBuffer {
            quad_points,
            jacobians,
            jacobian_dets,
            jacobian_invs,
            basis_derivatives,
            measures,
            ..
        } = buffer;

        let points = quad_points.chunks_exact_mut(space_dim);
        for (q, x, j, det, j_inv, dn_dx, measure, &w) in izip!(
            0..,
            points,
            jacobians,
            jacobian_dets,
            jacobian_invs,
            basis_derivatives,
            measures,
            self.rule.weights()
        ) {
            let xi = self.rule.point(q);
            self.geometry.coords_ref_to_global(xi, vertices, x)?;
            // Rejects non-positive determinants
            *det = self
                .geometry
                .jacobian_into(vertices, xi, DMatrixViewMut::from(&mut *j))?;

            *j_inv = pseudo_inverse(j).ok_or_else(|| Error::degenerate_cell(*det))?;
            if cell_dim == 0 {
                dn_dx.fill(T::zero());
            } else {
                self.basis.derivatives(q).mul_to(j_inv, dn_dx);
            }
            *measure = w * det.abs();
        }

        Ok(())
    }
}

/// Inverse of a square Jacobian, or `(J^T J)^{-1} J^T` for a tall one.
fn pseudo_inverse<T: Real>(j: &DMatrix<T>) -> Option<DMatrix<T>> {
    let (rows, cols) = j.shape();
    if cols == 0 {
        Some(DMatrix::zeros(0, rows))
    } else if rows == cols {
        j.clone().try_inverse()
    } else {
        let metric_inv = j.tr_mul(j).try_inverse()?;
        Some(metric_inv * j.transpose())
    }
}
