//! Gauss rules for quadrilaterals and hexahedra, formed as tensor products of 1D rules.

use crate::univariate::gauss;
use crate::{Point, Rule};

fn tensor_product<const D: usize>(points_per_dim: usize) -> Rule<D> {
    let (weights1d, points1d) = gauss(points_per_dim);
    let total = points_per_dim.pow(D as u32);
    let mut weights = Vec::with_capacity(total);
    let mut points = Vec::with_capacity(total);

    for linear_index in 0..total {
        // The last coordinate varies fastest
        let mut remainder = linear_index;
        let mut point: Point<D> = [0.0; D];
        let mut weight = 1.0;
        for d in (0..D).rev() {
            let i = remainder % points_per_dim;
            remainder /= points_per_dim;
            point[d] = points1d[i][0];
            weight *= weights1d[i];
        }
        weights.push(weight);
        points.push(point);
    }

    (weights, points)
}

/// Gauss rule for the reference quadrilateral with `points_per_dim` points along each axis.
pub fn quadrilateral_gauss(points_per_dim: usize) -> Rule<2> {
    tensor_product(points_per_dim)
}

/// Gauss rule for the reference hexahedron with `points_per_dim` points along each axis.
pub fn hexahedron_gauss(points_per_dim: usize) -> Rule<3> {
    tensor_product(points_per_dim)
}
