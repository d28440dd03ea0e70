use thiserror::Error;

/// Errors produced while building or loading geodesic meshes.
#[derive(Debug, Error)]
pub enum GeodesicError {
    /// Grid or index parameters that cannot describe a usable mesh.
    #[error("invalid mesh: {0}")]
    InvalidGrid(String),

    /// The mesh cache could not be read or written.
    #[error("mesh cache error: {0}")]
    Cache(#[from] CacheError),
}

/// Failures of a [`MeshStore`](crate::cache::MeshStore).
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache bundle could not be encoded or decoded: {0}")]
    Codec(#[from] postcard::Error),

    /// An in-memory store whose lock was poisoned by a panicking writer.
    #[error("cache store is poisoned")]
    Poisoned,
}
