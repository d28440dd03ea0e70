use nalgebra::{Point3, Vector2, Vector3};
use thiserror::Error;

/// Errors raised while evaluating or constraining to a surface.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SurfaceError {
    /// Shape parameters that do not describe a valid surface.
    #[error("invalid surface shape: {0}")]
    InvalidShape(String),

    /// The spatial gradient vanishes, so no normal direction exists.
    #[error("surface gradient vanishes at ({x:.6}, {y:.6}, {z:.6})")]
    DegenerateGradient { x: f64, y: f64, z: f64 },

    /// The null space of the gradient is not a plane.
    #[error("tangent space at ({x:.6}, {y:.6}, {z:.6}) has dimension {rank}, expected 2")]
    DegenerateTangentSpace { x: f64, y: f64, z: f64, rank: usize },
}

impl SurfaceError {
    pub(crate) fn degenerate_gradient(at: &Point3<f64>) -> Self {
        Self::DegenerateGradient {
            x: at.x,
            y: at.y,
            z: at.z,
        }
    }
}

/// Constraint value and derivatives at a single point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceEval {
    /// `F(X, q)`, zero exactly on the surface
    pub value: f64,
    /// `∂F/∂X`, the unnormalized surface normal
    pub gradient: Vector3<f64>,
    /// `∂F/∂q`, sensitivity to the shape parameters
    pub shape_gradient: Vector2<f64>,
}

/// A 2-manifold in 3-space given as the zero set of `F(X, q)`.
///
/// Implementations are pure: evaluating never mutates the surface.
///
/// # Examples
///
/// ```
/// use manifold::{ImplicitSurface, Torus};
/// use nalgebra::Point3;
///
/// let torus = Torus::new(1.0, 3.0).unwrap();
/// let on_surface = Point3::new(4.0, 0.0, 0.0);
/// assert_eq!(torus.value(&on_surface), 0.0);
/// ```
pub trait ImplicitSurface: Send + Sync {
    /// Constraint value `F(X, q)`
    fn value(&self, x: &Point3<f64>) -> f64;

    /// Spatial gradient `∂F/∂X`
    fn gradient(&self, x: &Point3<f64>) -> Vector3<f64>;

    /// Shape gradient `∂F/∂q`
    fn shape_gradient(&self, x: &Point3<f64>) -> Vector2<f64>;

    /// Current shape parameters `q`
    fn shape(&self) -> Vector2<f64>;

    /// Evaluates value and both gradients at once.
    ///
    /// Implementations that share intermediate terms between the three
    /// quantities should override this.
    fn evaluate(&self, x: &Point3<f64>) -> SurfaceEval {
        SurfaceEval {
            value: self.value(x),
            gradient: self.gradient(x),
            shape_gradient: self.shape_gradient(x),
        }
    }
}

/// A surface with a global two-angle parameterization.
///
/// Both parameters are periodic with period 2π.
pub trait ParametricSurface {
    /// Maps parameters `(u, v)` to a point on the surface.
    fn embed(&self, u: f64, v: f64) -> Point3<f64>;
}
