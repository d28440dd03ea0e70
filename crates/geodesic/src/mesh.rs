//! The precomputed geodesic bundle and its builder.

use std::time::Instant;

use manifold::{ImplicitSurface, ParametricSurface};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::adjacency::AdjacencyGraph;
use crate::cache::{MeshStore, load_or_compute};
use crate::distance::DistanceTable;
use crate::error::GeodesicError;
use crate::grid::MeshGrid;
use crate::octree::Octree;

/// Default grid resolution around the ring
pub const DEFAULT_N_THETA: usize = 80;
/// Default grid resolution around the tube
pub const DEFAULT_N_PHI: usize = 40;
/// Default octree leaf capacity
pub const DEFAULT_BUCKET_SIZE: usize = 16;

/// Identity of a mesh bundle; a cached bundle is reused only on an exact match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshKey {
    pub n_theta: usize,
    pub n_phi: usize,
    pub shape: [f64; 2],
    pub bucket_size: usize,
}

/// Grid, adjacency, all-pairs distances and nearest-point index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeodesicMesh {
    key: MeshKey,
    grid: MeshGrid,
    adjacency: AdjacencyGraph,
    distances: DistanceTable,
    index: Octree,
}

impl GeodesicMesh {
    /// Derives adjacency, distances and the octree from a sampled grid.
    pub fn from_grid(grid: MeshGrid, shape: [f64; 2], bucket_size: usize) -> Result<Self, GeodesicError> {
        let adjacency = AdjacencyGraph::from_grid(&grid);
        debug!(
            vertices = adjacency.vertex_count(),
            edges = adjacency.edge_count(),
            "Built mesh adjacency"
        );
        Self::from_parts(grid, adjacency, shape, bucket_size)
    }

    /// Assembles a bundle over an explicit graph on the grid's vertices.
    ///
    /// The graph need not be connected; vertices in different components
    /// end up at infinite distance.
    pub fn from_parts(
        grid: MeshGrid,
        adjacency: AdjacencyGraph,
        shape: [f64; 2],
        bucket_size: usize,
    ) -> Result<Self, GeodesicError> {
        if adjacency.vertex_count() != grid.len() {
            return Err(GeodesicError::InvalidGrid(format!(
                "graph has {} vertices but the grid has {}",
                adjacency.vertex_count(),
                grid.len()
            )));
        }
        let key = MeshKey {
            n_theta: grid.n_theta(),
            n_phi: grid.n_phi(),
            shape,
            bucket_size,
        };

        let started = Instant::now();
        let distances = DistanceTable::compute(&adjacency);
        info!(
            vertices = distances.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Computed all-pairs geodesic distances"
        );

        let index = Octree::build(grid.points(), bucket_size)?;
        debug!(nodes = index.node_count(), "Built mesh octree");

        Ok(Self {
            key,
            grid,
            adjacency,
            distances,
            index,
        })
    }

    pub fn key(&self) -> &MeshKey {
        &self.key
    }

    pub fn grid(&self) -> &MeshGrid {
        &self.grid
    }

    pub fn adjacency(&self) -> &AdjacencyGraph {
        &self.adjacency
    }

    pub fn distances(&self) -> &DistanceTable {
        &self.distances
    }

    pub fn index(&self) -> &Octree {
        &self.index
    }

    /// Mesh vertex closest to an arbitrary position
    pub fn nearest_vertex(&self, position: &Point3<f64>) -> Option<usize> {
        self.index.nearest(position)
    }

    /// Geodesic distance between the mesh vertices nearest to `a` and `b`.
    ///
    /// `f64::INFINITY` when the vertices are disconnected or the mesh is empty.
    pub fn geodesic_distance(&self, a: &Point3<f64>, b: &Point3<f64>) -> f64 {
        match (self.nearest_vertex(a), self.nearest_vertex(b)) {
            (Some(va), Some(vb)) => self.distances.distance(va, vb),
            _ => f64::INFINITY,
        }
    }
}

/// Samples a surface and assembles a [`GeodesicMesh`].
///
/// # Examples
///
/// ```
/// use geodesic::mesh::GeodesicMeshBuilder;
/// use manifold::Torus;
///
/// let torus = Torus::new(1.0, 3.0).unwrap();
/// let mesh = GeodesicMeshBuilder::new(&torus)
///     .with_resolution(8, 4)
///     .build()
///     .unwrap();
///
/// assert_eq!(mesh.grid().len(), 32);
/// assert_eq!(mesh.distances().unreachable_pairs(), 0);
/// ```
pub struct GeodesicMeshBuilder<'a, S> {
    surface: &'a S,
    n_theta: usize,
    n_phi: usize,
    bucket_size: usize,
}

impl<'a, S: ImplicitSurface + ParametricSurface> GeodesicMeshBuilder<'a, S> {
    pub fn new(surface: &'a S) -> Self {
        Self {
            surface,
            n_theta: DEFAULT_N_THETA,
            n_phi: DEFAULT_N_PHI,
            bucket_size: DEFAULT_BUCKET_SIZE,
        }
    }

    pub fn with_resolution(mut self, n_theta: usize, n_phi: usize) -> Self {
        self.n_theta = n_theta;
        self.n_phi = n_phi;
        self
    }

    pub fn with_bucket_size(mut self, bucket_size: usize) -> Self {
        self.bucket_size = bucket_size;
        self
    }

    /// Key the built mesh will carry
    pub fn key(&self) -> MeshKey {
        let shape = self.surface.shape();
        MeshKey {
            n_theta: self.n_theta,
            n_phi: self.n_phi,
            shape: [shape.x, shape.y],
            bucket_size: self.bucket_size,
        }
    }

    /// Computes the full bundle. O(V³); see [`DistanceTable::compute`].
    pub fn build(&self) -> Result<GeodesicMesh, GeodesicError> {
        let key = self.key();
        info!(
            n_theta = key.n_theta,
            n_phi = key.n_phi,
            "Sampling geodesic mesh"
        );
        let grid = MeshGrid::sample(self.surface, self.n_theta, self.n_phi)?;
        GeodesicMesh::from_grid(grid, key.shape, self.bucket_size)
    }

    /// Loads a matching bundle from `store`, or builds and persists one.
    pub fn load_or_build(&self, store: &dyn MeshStore) -> Result<GeodesicMesh, GeodesicError> {
        load_or_compute(store, &self.key(), || self.build())
    }
}
