//! Implicit surfaces and the constraint machinery that keeps points on them.
//!
//! A surface is the zero set of a scalar function `F(X, q) = 0`, where `q`
//! holds the shape parameters. This crate provides:
//!
//! - the [`ImplicitSurface`] evaluation interface (value, spatial gradient,
//!   shape gradient) and its torus implementation,
//! - tangent frames computed as the null space of the surface gradient,
//! - the Newton-style [`ConstraintProjector`] that cancels the normal
//!   component of a velocity and pulls points back toward `F = 0`,
//! - seeded rejection sampling of points on the surface.

pub mod projection;
pub mod sampling;
pub mod surface;
pub mod tangent;
pub mod torus;

#[cfg(test)]
mod projection_test;
#[cfg(test)]
mod sampling_test;

pub use projection::ConstraintProjector;
pub use surface::{ImplicitSurface, ParametricSurface, SurfaceError, SurfaceEval};
pub use tangent::{TangentFrame, tangent_frame};
pub use torus::Torus;
