//! Tangent frames from the null space of the surface gradient.

use nalgebra::{Matrix3, Point3, RowVector3, Vector3};

use crate::surface::SurfaceError;

/// Orthonormal basis of the tangent plane at a surface point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TangentFrame {
    pub t1: Vector3<f64>,
    pub t2: Vector3<f64>,
}

impl TangentFrame {
    /// Unit tangent vector at `angle` radians from `t1` toward `t2`.
    pub fn direction(&self, angle: f64) -> Vector3<f64> {
        self.t1 * angle.cos() + self.t2 * angle.sin()
    }
}

/// Computes the tangent plane at `at` as the null space of the 3×3 matrix
/// whose first row is `gradient` and whose other rows are zero.
///
/// The null space is read off the right singular vectors whose singular
/// values fall below `3·ε·σ_max`. On a smooth surface point the gradient is
/// non-zero and exactly two such vectors exist; any other count is reported
/// as [`SurfaceError::DegenerateTangentSpace`].
///
/// # Examples
///
/// ```
/// use manifold::tangent_frame;
/// use nalgebra::{Point3, Vector3};
///
/// let normal = Vector3::new(0.0, 0.0, 2.0);
/// let frame = tangent_frame(&Point3::origin(), &normal).unwrap();
/// assert!(frame.t1.dot(&normal).abs() < 1e-12);
/// assert!(frame.t2.dot(&normal).abs() < 1e-12);
/// ```
pub fn tangent_frame(
    at: &Point3<f64>,
    gradient: &Vector3<f64>,
) -> Result<TangentFrame, SurfaceError> {
    let degenerate = |rank| SurfaceError::DegenerateTangentSpace {
        x: at.x,
        y: at.y,
        z: at.z,
        rank,
    };

    if !gradient.iter().all(|g| g.is_finite()) {
        return Err(degenerate(0));
    }

    let stacked = Matrix3::from_rows(&[
        gradient.transpose(),
        RowVector3::zeros(),
        RowVector3::zeros(),
    ]);
    let svd = stacked.svd(false, true);
    let v_t = svd.v_t.ok_or_else(|| degenerate(0))?;

    let tolerance = svd.singular_values.max() * 3.0 * f64::EPSILON;
    let null: Vec<Vector3<f64>> = svd
        .singular_values
        .iter()
        .enumerate()
        .filter(|(_, sigma)| **sigma <= tolerance)
        .map(|(k, _)| v_t.row(k).transpose())
        .collect();

    match null.as_slice() {
        [t1, t2] => Ok(TangentFrame { t1: *t1, t2: *t2 }),
        other => Err(degenerate(other.len())),
    }
}
