//! Lagrange basis functions on the reference cells.
use crate::cell_geometry::CellShape;
use nalgebra::DMatrixViewMut;
use numeric_literals::replace_float_literals;
use quakefem_traits::Real;
use serde::{Deserialize, Serialize};

/// Nodal Lagrange bases for the reference cells.
///
/// Corner nodes always come first, in the corner order of the reference cell. Higher-order nodes
/// follow:
///
/// - `Line3`: the midpoint.
/// - `Tri6`: midpoints of edges `0-1`, `1-2`, `2-0`.
/// - `Tet10`: midpoints of edges `1-2`, `0-2`, `0-1`, `0-3`, `1-3`, `2-3`.
/// - `Quad9`: midpoints of edges `0-1`, `1-2`, `2-3`, `3-0`, then the center.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LagrangeBasis {
    Point1,
    Line2,
    Line3,
    Tri3,
    Tri6,
    Quad4,
    Quad9,
    Tet4,
    Tet10,
    Hex8,
}

const LINE3_EDGES: [[usize; 2]; 1] = [[0, 1]];
const TRI6_EDGES: [[usize; 2]; 3] = [[0, 1], [1, 2], [2, 0]];
const TET10_EDGES: [[usize; 2]; 6] = [[1, 2], [0, 2], [0, 1], [0, 3], [1, 3], [2, 3]];

/// Reference position of each `Quad9` node along each axis.
const QUAD9_NODES: [[i8; 2]; 9] = [
    [-1, -1],
    [1, -1],
    [1, 1],
    [-1, 1],
    [0, -1],
    [1, 0],
    [0, 1],
    [-1, 0],
    [0, 0],
];

impl LagrangeBasis {
    /// The linear basis on the given shape.
    pub fn linear(shape: CellShape) -> Self {
        match shape {
            CellShape::Point => Self::Point1,
            CellShape::Line => Self::Line2,
            CellShape::Triangle => Self::Tri3,
            CellShape::Quadrilateral => Self::Quad4,
            CellShape::Tetrahedron => Self::Tet4,
            CellShape::Hexahedron => Self::Hex8,
        }
    }

    /// The quadratic basis on the given shape, if one is available.
    pub fn quadratic(shape: CellShape) -> Option<Self> {
        match shape {
            CellShape::Point => Some(Self::Point1),
            CellShape::Line => Some(Self::Line3),
            CellShape::Triangle => Some(Self::Tri6),
            CellShape::Quadrilateral => Some(Self::Quad9),
            CellShape::Tetrahedron => Some(Self::Tet10),
            CellShape::Hexahedron => None,
        }
    }

    pub fn shape(&self) -> CellShape {
        match self {
            Self::Point1 => CellShape::Point,
            Self::Line2 | Self::Line3 => CellShape::Line,
            Self::Tri3 | Self::Tri6 => CellShape::Triangle,
            Self::Quad4 | Self::Quad9 => CellShape::Quadrilateral,
            Self::Tet4 | Self::Tet10 => CellShape::Tetrahedron,
            Self::Hex8 => CellShape::Hexahedron,
        }
    }

    pub fn num_basis(&self) -> usize {
        match self {
            Self::Point1 => 1,
            Self::Line2 => 2,
            Self::Line3 | Self::Tri3 => 3,
            Self::Quad4 | Self::Tet4 => 4,
            Self::Tri6 => 6,
            Self::Hex8 => 8,
            Self::Quad9 => 9,
            Self::Tet10 => 10,
        }
    }

    /// Polynomial degree needed to integrate a product of two basis functions exactly.
    pub fn mass_strength(&self) -> usize {
        match self {
            Self::Point1 => 0,
            Self::Line2 | Self::Tri3 | Self::Tet4 => 2,
            Self::Quad4 | Self::Hex8 => 2,
            Self::Line3 | Self::Tri6 | Self::Tet10 => 4,
            Self::Quad9 => 4,
        }
    }

    fn quadratic_edges(&self) -> &'static [[usize; 2]] {
        match self {
            Self::Line3 => &LINE3_EDGES,
            Self::Tri6 => &TRI6_EDGES,
            Self::Tet10 => &TET10_EDGES,
            _ => &[],
        }
    }

    /// Evaluates all basis functions at the reference point `xi`.
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    pub fn populate_basis<T: Real>(&self, xi: &[T], basis_values: &mut [T]) {
        assert_eq!(xi.len(), self.shape().cell_dim(), "Reference point has wrong dimension");
        assert_eq!(basis_values.len(), self.num_basis(), "Output has wrong number of basis functions");

        match self {
            Self::Point1 => basis_values[0] = 1.0,
            Self::Line2 | Self::Tri3 | Self::Tet4 => {
                let (l, _) = barycentric(xi);
                basis_values.copy_from_slice(&l[..basis_values.len()]);
            }
            Self::Line3 | Self::Tri6 | Self::Tet10 => {
                let (l, _) = barycentric(xi);
                let corners = xi.len() + 1;
                for i in 0..corners {
                    basis_values[i] = l[i] * (2.0 * l[i] - 1.0);
                }
                for (k, &[i, j]) in self.quadratic_edges().iter().enumerate() {
                    basis_values[corners + k] = 4.0 * l[i] * l[j];
                }
            }
            Self::Quad4 | Self::Hex8 => {
                let signs = self.shape().reference_vertices();
                let d = xi.len();
                for (i, value) in basis_values.iter_mut().enumerate() {
                    *value = (0..d).fold(1.0, |n, k| {
                        let s = T::from_f64(signs[i * d + k]).expect("Literal must fit in T");
                        n * 0.5 * (1.0 + s * xi[k])
                    });
                }
            }
            Self::Quad9 => {
                for (i, value) in basis_values.iter_mut().enumerate() {
                    let [a, b] = QUAD9_NODES[i];
                    *value = quadratic_1d(a, xi[0]).0 * quadratic_1d(b, xi[1]).0;
                }
            }
        }
    }

    /// Evaluates the reference gradients of all basis functions at `xi`.
    ///
    /// Row `i` of `gradients` holds the gradient of basis function `i`.
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    pub fn populate_basis_gradients<T: Real>(&self, xi: &[T], mut gradients: DMatrixViewMut<T>) {
        let d = self.shape().cell_dim();
        assert_eq!(xi.len(), d, "Reference point has wrong dimension");
        assert_eq!(gradients.nrows(), self.num_basis());
        assert_eq!(gradients.ncols(), d);

        match self {
            Self::Point1 => {}
            Self::Line2 | Self::Tri3 | Self::Tet4 => {
                let (_, grad_l) = barycentric(xi);
                for i in 0..=d {
                    for k in 0..d {
                        gradients[(i, k)] = grad_l[i][k];
                    }
                }
            }
            Self::Line3 | Self::Tri6 | Self::Tet10 => {
                let (l, grad_l) = barycentric(xi);
                for i in 0..=d {
                    for k in 0..d {
                        gradients[(i, k)] = (4.0 * l[i] - 1.0) * grad_l[i][k];
                    }
                }
                for (e, &[i, j]) in self.quadratic_edges().iter().enumerate() {
                    for k in 0..d {
                        gradients[(d + 1 + e, k)] = 4.0 * (l[j] * grad_l[i][k] + l[i] * grad_l[j][k]);
                    }
                }
            }
            Self::Quad4 | Self::Hex8 => {
                let signs = self.shape().reference_vertices();
                for i in 0..self.num_basis() {
                    let s = |k: usize| T::from_f64(signs[i * d + k]).expect("Literal must fit in T");
                    for k in 0..d {
                        gradients[(i, k)] = (0..d).fold(1.0, |g, m| {
                            if m == k {
                                g * 0.5 * s(m)
                            } else {
                                g * 0.5 * (1.0 + s(m) * xi[m])
                            }
                        });
                    }
                }
            }
            Self::Quad9 => {
                for (i, &[a, b]) in QUAD9_NODES.iter().enumerate() {
                    let (na, dna) = quadratic_1d(a, xi[0]);
                    let (nb, dnb) = quadratic_1d(b, xi[1]);
                    gradients[(i, 0)] = dna * nb;
                    gradients[(i, 1)] = na * dnb;
                }
            }
        }
    }
}

/// Barycentric coordinates on a reference simplex of dimension `xi.len()`, with their
/// (constant) reference gradients.
///
/// `L_k = (1 + xi_{k-1}) / 2` for `k >= 1` and `L_0 = 1 - sum_k L_k`.
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
fn barycentric<T: Real>(xi: &[T]) -> ([T; 4], [[T; 3]; 4]) {
    let d = xi.len();
    let mut l = [0.0; 4];
    let mut grad = [[0.0; 3]; 4];
    l[0] = 1.0;
    for k in 0..d {
        l[k + 1] = 0.5 * (1.0 + xi[k]);
        l[0] -= l[k + 1];
        grad[k + 1][k] = 0.5;
        grad[0][k] = -0.5;
    }
    (l, grad)
}

/// 1D quadratic Lagrange polynomial on the nodes `{-1, 0, 1}` associated with `node`, and its
/// derivative, evaluated at `x`.
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
fn quadratic_1d<T: Real>(node: i8, x: T) -> (T, T) {
    match node {
        -1 => (0.5 * x * (x - 1.0), x - 0.5),
        1 => (0.5 * x * (x + 1.0), x + 0.5),
        _ => (1.0 - x * x, -2.0 * x),
    }
}
