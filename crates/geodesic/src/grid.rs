//! Regular, periodically wrapped sampling grids embedded on a surface.

use std::f64::consts::TAU;

use manifold::ParametricSurface;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::error::GeodesicError;

/// Smallest extent along either axis for which the eight wrapped neighbors
/// of a cell are distinct from each other and from the cell itself
pub const MIN_GRID_EXTENT: usize = 3;

/// A `n_theta × n_phi` grid of surface samples, wrapped in both directions.
///
/// Cell `(i, j)` sits at parameters `(2πi/n_theta, 2πj/n_phi)` and has
/// vertex index `i·n_phi + j`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshGrid {
    n_theta: usize,
    n_phi: usize,
    points: Vec<Point3<f64>>,
}

impl MeshGrid {
    /// Samples `surface` on a regular parameter grid.
    ///
    /// # Examples
    ///
    /// ```
    /// use geodesic::grid::MeshGrid;
    /// use manifold::Torus;
    ///
    /// let torus = Torus::new(1.0, 3.0).unwrap();
    /// let grid = MeshGrid::sample(&torus, 8, 4).unwrap();
    /// assert_eq!(grid.len(), 32);
    /// ```
    pub fn sample<S: ParametricSurface + ?Sized>(
        surface: &S,
        n_theta: usize,
        n_phi: usize,
    ) -> Result<Self, GeodesicError> {
        check_extent(n_theta, n_phi)?;
        let points = (0..n_theta)
            .flat_map(|i| {
                let theta = TAU * i as f64 / n_theta as f64;
                (0..n_phi).map(move |j| {
                    let phi = TAU * j as f64 / n_phi as f64;
                    surface.embed(theta, phi)
                })
            })
            .collect();
        Ok(Self {
            n_theta,
            n_phi,
            points,
        })
    }

    /// Wraps an explicit point list laid out row-major by `theta`.
    pub fn from_points(
        n_theta: usize,
        n_phi: usize,
        points: Vec<Point3<f64>>,
    ) -> Result<Self, GeodesicError> {
        check_extent(n_theta, n_phi)?;
        if points.len() != n_theta * n_phi {
            return Err(GeodesicError::InvalidGrid(format!(
                "expected {} points for a {n_theta}x{n_phi} grid, got {}",
                n_theta * n_phi,
                points.len()
            )));
        }
        Ok(Self {
            n_theta,
            n_phi,
            points,
        })
    }

    pub fn n_theta(&self) -> usize {
        self.n_theta
    }

    pub fn n_phi(&self) -> usize {
        self.n_phi
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    pub fn point(&self, vertex: usize) -> Point3<f64> {
        self.points[vertex]
    }

    /// Vertex index of cell `(i, j)`, wrapping both indices.
    pub fn vertex(&self, i: isize, j: isize) -> usize {
        let i = i.rem_euclid(self.n_theta as isize) as usize;
        let j = j.rem_euclid(self.n_phi as isize) as usize;
        i * self.n_phi + j
    }

    /// Cell `(i, j)` of a vertex index.
    pub fn cell(&self, vertex: usize) -> (usize, usize) {
        (vertex / self.n_phi, vertex % self.n_phi)
    }

    /// The eight wrapped grid neighbors of `vertex`.
    pub fn neighbors(&self, vertex: usize) -> [usize; 8] {
        let (i, j) = self.cell(vertex);
        let (i, j) = (i as isize, j as isize);
        [
            self.vertex(i - 1, j - 1),
            self.vertex(i - 1, j),
            self.vertex(i - 1, j + 1),
            self.vertex(i, j - 1),
            self.vertex(i, j + 1),
            self.vertex(i + 1, j - 1),
            self.vertex(i + 1, j),
            self.vertex(i + 1, j + 1),
        ]
    }

    /// Coordinates split into `[xs, ys, zs]`, each laid out like the vertices.
    pub fn coordinate_arrays(&self) -> [Vec<f64>; 3] {
        [
            self.points.iter().map(|p| p.x).collect(),
            self.points.iter().map(|p| p.y).collect(),
            self.points.iter().map(|p| p.z).collect(),
        ]
    }
}

fn check_extent(n_theta: usize, n_phi: usize) -> Result<(), GeodesicError> {
    if n_theta < MIN_GRID_EXTENT || n_phi < MIN_GRID_EXTENT {
        return Err(GeodesicError::InvalidGrid(format!(
            "grid must be at least {MIN_GRID_EXTENT}x{MIN_GRID_EXTENT}, got {n_theta}x{n_phi}"
        )));
    }
    Ok(())
}
