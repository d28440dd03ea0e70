//! Ring torus as an implicit surface
//!
//! ```text
//! F(X, q) = (|X|² + R² − r²)² − 4R²(x² + y²),    q = (r, R)
//! ```
//!
//! The torus is centered at the origin with its symmetry axis along `z`.
//! `r` is the tube (minor) radius and `R` the distance from the axis to the
//! tube center (major radius).

use std::f64::consts::TAU;

use nalgebra::{Point3, Vector2, Vector3};
use serde::{Deserialize, Serialize};

use crate::surface::{ImplicitSurface, ParametricSurface, SurfaceError, SurfaceEval};

/// A ring torus with `0 < r < R`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Torus {
    minor_radius: f64,
    major_radius: f64,
}

impl Torus {
    /// Creates a torus, rejecting self-intersecting or degenerate shapes.
    ///
    /// # Examples
    ///
    /// ```
    /// use manifold::Torus;
    ///
    /// assert!(Torus::new(1.0, 3.0).is_ok());
    /// assert!(Torus::new(3.0, 1.0).is_err()); // spindle torus
    /// assert!(Torus::new(0.0, 1.0).is_err());
    /// ```
    pub fn new(minor_radius: f64, major_radius: f64) -> Result<Self, SurfaceError> {
        if !(minor_radius > 0.0 && minor_radius.is_finite()) {
            return Err(SurfaceError::InvalidShape(format!(
                "minor radius must be positive and finite, got {minor_radius}"
            )));
        }
        if !(major_radius > 0.0 && major_radius.is_finite()) {
            return Err(SurfaceError::InvalidShape(format!(
                "major radius must be positive and finite, got {major_radius}"
            )));
        }
        if minor_radius >= major_radius {
            return Err(SurfaceError::InvalidShape(format!(
                "minor radius {minor_radius} must be smaller than major radius {major_radius}"
            )));
        }
        Ok(Self {
            minor_radius,
            major_radius,
        })
    }

    pub fn minor_radius(&self) -> f64 {
        self.minor_radius
    }

    pub fn major_radius(&self) -> f64 {
        self.major_radius
    }

    /// Inverse of [`ParametricSurface::embed`] for points on or near the surface.
    ///
    /// Returns `(u, v)` in `[0, 2π)`, where `u` is the angle around the `z`
    /// axis and `v` the angle around the tube.
    pub fn parametric_coords(&self, x: &Point3<f64>) -> (f64, f64) {
        let u = x.y.atan2(x.x).rem_euclid(TAU);
        let rho = (x.x * x.x + x.y * x.y).sqrt();
        let v = x.z.atan2(rho - self.major_radius).rem_euclid(TAU);
        (u, v)
    }

    /// Relative surface-area density at tube angle `v`, normalized to 1 on
    /// the outer equator.
    ///
    /// Used as the acceptance probability when sampling uniformly by area.
    pub fn area_weight(&self, v: f64) -> f64 {
        (self.major_radius + self.minor_radius * v.cos()) / (self.major_radius + self.minor_radius)
    }

    /// Total surface area `4π²rR`
    pub fn area(&self) -> f64 {
        TAU * TAU * self.minor_radius * self.major_radius
    }
}

impl ImplicitSurface for Torus {
    fn value(&self, x: &Point3<f64>) -> f64 {
        self.evaluate(x).value
    }

    fn gradient(&self, x: &Point3<f64>) -> Vector3<f64> {
        self.evaluate(x).gradient
    }

    fn shape_gradient(&self, x: &Point3<f64>) -> Vector2<f64> {
        self.evaluate(x).shape_gradient
    }

    fn shape(&self) -> Vector2<f64> {
        Vector2::new(self.minor_radius, self.major_radius)
    }

    fn evaluate(&self, x: &Point3<f64>) -> SurfaceEval {
        let r = self.minor_radius;
        let big_r = self.major_radius;
        let rho_sq = x.x * x.x + x.y * x.y;
        // s = |X|² + R² − r²
        let s = x.coords.norm_squared() + big_r * big_r - r * r;

        let value = s * s - 4.0 * big_r * big_r * rho_sq;

        let planar = 4.0 * s - 8.0 * big_r * big_r;
        let gradient = Vector3::new(planar * x.x, planar * x.y, 4.0 * s * x.z);

        let shape_gradient = Vector2::new(-4.0 * r * s, 4.0 * big_r * s - 8.0 * big_r * rho_sq);

        SurfaceEval {
            value,
            gradient,
            shape_gradient,
        }
    }
}

impl ParametricSurface for Torus {
    fn embed(&self, u: f64, v: f64) -> Point3<f64> {
        let ring = self.major_radius + self.minor_radius * v.cos();
        Point3::new(ring * u.cos(), ring * u.sin(), self.minor_radius * v.sin())
    }
}
