//! Point-in-element tests guarding spatial interpolation.

use manifoldkit_core::{
    error::{ManifoldError, Result},
    types::{DMatrix, DVector, Scalar},
};
use std::fmt::Debug;

/// Decides whether a query point lies inside the element spanned by nodes.
pub trait ElementTest<T: Scalar>: Send + Sync + Debug {
    /// Returns `true` when `point` lies inside (or on the boundary of) the
    /// element with the given `vertices`.
    fn contains(&self, point: &DVector<T>, vertices: &[DVector<T>]) -> Result<bool>;
}

fn check_dimensions<T: Scalar>(point: &DVector<T>, vertices: &[DVector<T>]) -> Result<()> {
    for v in vertices {
        if v.len() != point.len() {
            return Err(ManifoldError::dimension_mismatch(
                format!("vertices of dimension {}", point.len()),
                format!("vertex of dimension {}", v.len()),
            ));
        }
    }
    Ok(())
}

/// Barycentric coordinates of `point` with respect to a d-simplex.
///
/// `vertices` must hold exactly `d + 1` points of dimension `d`. The returned
/// weights sum to one; all of them are non-negative iff the point lies in
/// the simplex.
///
/// # Errors
///
/// - `DimensionMismatch` for a wrong vertex count or dimension.
/// - `NumericalError` if the simplex is degenerate (zero volume).
pub fn barycentric_coordinates<T: Scalar>(
    point: &DVector<T>,
    vertices: &[DVector<T>],
) -> Result<DVector<T>> {
    let d = point.len();
    if vertices.len() != d + 1 {
        return Err(ManifoldError::dimension_mismatch(
            format!("{} vertices for a {}-simplex", d + 1, d),
            format!("{} vertices", vertices.len()),
        ));
    }
    check_dimensions(point, vertices)?;

    let v0 = &vertices[0];
    let edges = DMatrix::from_fn(d, d, |i, j| vertices[j + 1][i] - v0[i]);
    let rhs = point - v0;
    let lambda = edges
        .lu()
        .solve(&rhs)
        .ok_or_else(|| ManifoldError::numerical_error("degenerate simplex element"))?;

    let mut weights = DVector::zeros(d + 1);
    weights[0] = T::one() - lambda.sum();
    for i in 0..d {
        weights[i + 1] = lambda[i];
    }
    Ok(weights)
}

/// Containment in a d-simplex (segment, triangle, tetrahedron, …).
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimplexElement {
    /// Barycentric weights down to `-tolerance` count as inside.
    pub tolerance: f64,
}

impl Default for SimplexElement {
    fn default() -> Self {
        Self { tolerance: 1e-10 }
    }
}

impl SimplexElement {
    /// Creates a simplex test with the default boundary tolerance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the boundary tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

impl<T: Scalar> ElementTest<T> for SimplexElement {
    fn contains(&self, point: &DVector<T>, vertices: &[DVector<T>]) -> Result<bool> {
        let weights = barycentric_coordinates(point, vertices)?;
        let tol = <T as Scalar>::from_f64(self.tolerance);
        Ok(weights.iter().all(|&w| w >= -tol))
    }
}

/// Containment in a simple planar polygon (crossing-number rule).
///
/// Vertices are taken in order; the polygon is closed implicitly.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolygonElement;

impl<T: Scalar> ElementTest<T> for PolygonElement {
    fn contains(&self, point: &DVector<T>, vertices: &[DVector<T>]) -> Result<bool> {
        if point.len() != 2 {
            return Err(ManifoldError::dimension_mismatch(
                "2-dimensional point",
                format!("{}-dimensional point", point.len()),
            ));
        }
        if vertices.len() < 3 {
            return Err(ManifoldError::invalid_parameter(
                "a polygon needs at least 3 vertices",
            ));
        }
        check_dimensions(point, vertices)?;

        let (x, y) = (point[0], point[1]);
        let mut inside = false;
        let mut j = vertices.len() - 1;
        for i in 0..vertices.len() {
            let (xi, yi) = (vertices[i][0], vertices[i][1]);
            let (xj, yj) = (vertices[j][0], vertices[j][1]);
            if (yi > y) != (yj > y) {
                let x_cross = xi + (y - yi) * (xj - xi) / (yj - yi);
                if x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        Ok(inside)
    }
}
