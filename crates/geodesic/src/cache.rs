//! Persistence port for precomputed geodesic meshes.
//!
//! Startup follows a three-step contract: attempt to load, compute when the
//! bundle is absent, stale or unreadable, then persist the fresh bundle.
//! Load failures are never fatal; they only force a rebuild.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{info, warn};

use crate::error::{CacheError, GeodesicError};
use crate::mesh::{GeodesicMesh, MeshKey};

/// Storage backend for a single mesh bundle.
pub trait MeshStore: Send + Sync {
    /// Returns the stored bundle, `None` if nothing has been stored yet.
    fn load(&self) -> Result<Option<GeodesicMesh>, CacheError>;

    /// Replaces the stored bundle.
    fn save(&self, mesh: &GeodesicMesh) -> Result<(), CacheError>;
}

/// Postcard-encoded bundle in a single file.
#[derive(Debug, Clone)]
pub struct FileMeshStore {
    path: PathBuf,
}

impl FileMeshStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MeshStore for FileMeshStore {
    fn load(&self) -> Result<Option<GeodesicMesh>, CacheError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&self.path)?;
        Ok(Some(postcard::from_bytes(&bytes)?))
    }

    fn save(&self, mesh: &GeodesicMesh) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let bytes = postcard::to_stdvec(mesh)?;
        // Write beside the target and rename so readers never see a partial file
        let staging = self.path.with_extension("partial");
        fs::write(&staging, bytes)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

/// In-process store, mainly for injecting small meshes in tests.
#[derive(Debug, Default)]
pub struct MemoryMeshStore {
    pub(crate) slot: Mutex<Option<GeodesicMesh>>,
}

impl MemoryMeshStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mesh(mesh: GeodesicMesh) -> Self {
        Self {
            slot: Mutex::new(Some(mesh)),
        }
    }

    pub fn is_populated(&self) -> bool {
        self.slot.lock().map(|slot| slot.is_some()).unwrap_or(false)
    }
}

impl MeshStore for MemoryMeshStore {
    fn load(&self) -> Result<Option<GeodesicMesh>, CacheError> {
        let slot = self.slot.lock().map_err(|_| CacheError::Poisoned)?;
        Ok(slot.clone())
    }

    fn save(&self, mesh: &GeodesicMesh) -> Result<(), CacheError> {
        let mut slot = self.slot.lock().map_err(|_| CacheError::Poisoned)?;
        *slot = Some(mesh.clone());
        Ok(())
    }
}

/// Store that never holds anything: always compute, never persist.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMeshStore;

impl MeshStore for NoMeshStore {
    fn load(&self) -> Result<Option<GeodesicMesh>, CacheError> {
        Ok(None)
    }

    fn save(&self, _mesh: &GeodesicMesh) -> Result<(), CacheError> {
        Ok(())
    }
}

/// Loads the bundle matching `key` from `store`, or runs `compute` and
/// persists its result.
///
/// A stored bundle with a different key is treated as stale. Failing to
/// persist is logged and does not discard the computed mesh.
pub fn load_or_compute<F>(
    store: &dyn MeshStore,
    key: &MeshKey,
    compute: F,
) -> Result<GeodesicMesh, GeodesicError>
where
    F: FnOnce() -> Result<GeodesicMesh, GeodesicError>,
{
    match store.load() {
        Ok(Some(mesh)) if mesh.key() == key => {
            info!(
                n_theta = key.n_theta,
                n_phi = key.n_phi,
                "Loaded geodesic mesh from cache"
            );
            return Ok(mesh);
        }
        Ok(Some(mesh)) => warn!(
            cached = ?mesh.key(),
            requested = ?key,
            "Cached geodesic mesh is stale, rebuilding"
        ),
        Ok(None) => info!("No cached geodesic mesh, computing"),
        Err(error) => warn!(%error, "Failed to load geodesic mesh cache, rebuilding"),
    }

    let mesh = compute()?;
    if let Err(error) = store.save(&mesh) {
        warn!(%error, "Failed to persist geodesic mesh");
    }
    Ok(mesh)
}
