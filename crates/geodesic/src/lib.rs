//! Geodesic-distance infrastructure for surface-bound agents.
//!
//! A surface is sampled on a periodic grid, each sample is linked to its
//! eight grid neighbors, and Floyd-Warshall turns that graph into an
//! all-pairs distance table. An octree over the samples maps arbitrary
//! positions to their nearest vertex so that distances between agents can be
//! read from the table. The whole bundle is expensive to build and is meant
//! to be cached through a [`MeshStore`].

pub mod adjacency;
pub mod cache;
pub mod distance;
pub mod error;
pub mod grid;
pub mod mesh;
pub mod octree;

#[cfg(test)]
mod cache_test;
#[cfg(test)]
mod octree_test;

pub use adjacency::AdjacencyGraph;
pub use cache::{FileMeshStore, MemoryMeshStore, MeshStore, NoMeshStore, load_or_compute};
pub use distance::DistanceTable;
pub use error::{CacheError, GeodesicError};
pub use grid::MeshGrid;
pub use mesh::{GeodesicMesh, GeodesicMeshBuilder, MeshKey};
pub use octree::Octree;
