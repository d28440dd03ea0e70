//! Newton-step projection of velocities onto an implicit surface
//!
//! Given an unconstrained velocity `P`, the projector returns
//!
//! ```text
//! dX/dt = P − c·∂F/∂X,    c = (⟨∂F/∂X, P⟩ + ⟨∂F/∂q, Q⟩ + φ·F) / ‖∂F/∂X‖²
//! ```
//!
//! which removes the normal component of `P`, compensates for a shape that
//! changes at rate `Q`, and pulls the point back toward `F = 0` with
//! stiffness `φ`.

use nalgebra::{Point3, Vector2, Vector3};

use crate::surface::{ImplicitSurface, SurfaceError, SurfaceEval};

/// Velocity projector for a single implicit constraint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstraintProjector {
    /// Relaxation stiffness φ applied to the constraint violation
    pub stiffness: f64,
    /// Imposed shape-parameter rate `Q = dq/dt`
    pub shape_rate: Vector2<f64>,
}

impl ConstraintProjector {
    /// Creates a projector for a static surface.
    pub fn new(stiffness: f64) -> Self {
        Self {
            stiffness,
            shape_rate: Vector2::zeros(),
        }
    }

    /// Sets the imposed shape-parameter rate `Q`.
    pub fn with_shape_rate(mut self, shape_rate: Vector2<f64>) -> Self {
        self.shape_rate = shape_rate;
        self
    }

    /// Scalar Newton correction `c` for velocity `force` at an evaluated point.
    ///
    /// Fails with [`SurfaceError::DegenerateGradient`] when `‖∂F/∂X‖² = 0`.
    pub fn correction(
        &self,
        at: &Point3<f64>,
        eval: &SurfaceEval,
        force: &Vector3<f64>,
    ) -> Result<f64, SurfaceError> {
        let norm_sq = eval.gradient.norm_squared();
        if norm_sq == 0.0 || !norm_sq.is_finite() {
            return Err(SurfaceError::degenerate_gradient(at));
        }

        let numerator = eval.gradient.dot(force)
            + eval.shape_gradient.dot(&self.shape_rate)
            + self.stiffness * eval.value;
        Ok(numerator / norm_sq)
    }

    /// Projected velocity for an already evaluated point.
    pub fn project(
        &self,
        at: &Point3<f64>,
        eval: &SurfaceEval,
        force: &Vector3<f64>,
    ) -> Result<Vector3<f64>, SurfaceError> {
        let c = self.correction(at, eval, force)?;
        Ok(force - eval.gradient * c)
    }

    /// Evaluates `surface` at `at` and projects `force`.
    ///
    /// # Examples
    ///
    /// ```
    /// use manifold::{ConstraintProjector, Torus};
    /// use nalgebra::{Point3, Vector3};
    ///
    /// let torus = Torus::new(1.0, 3.0).unwrap();
    /// let projector = ConstraintProjector::new(1.0);
    ///
    /// // Outer equator: the normal is +x, so a radial push is cancelled
    /// let at = Point3::new(4.0, 0.0, 0.0);
    /// let v = projector
    ///     .project_on(&torus, &at, &Vector3::new(1.0, 0.5, 0.0))
    ///     .unwrap();
    /// assert!(v.x.abs() < 1e-12);
    /// assert!((v.y - 0.5).abs() < 1e-12);
    /// ```
    pub fn project_on<S: ImplicitSurface + ?Sized>(
        &self,
        surface: &S,
        at: &Point3<f64>,
        force: &Vector3<f64>,
    ) -> Result<Vector3<f64>, SurfaceError> {
        let eval = surface.evaluate(at);
        self.project(at, &eval, force)
    }
}
