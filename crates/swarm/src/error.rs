use geodesic::GeodesicError;
use manifold::SurfaceError;
use thiserror::Error;

/// A configuration value rejected before any simulation state is built.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SwarmError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Surface(#[from] SurfaceError),

    #[error(transparent)]
    Geodesic(#[from] GeodesicError),

    #[error("geodesic neighbor selection requires a mesh")]
    MissingMesh,

    #[error("expected {expected} velocities, got {actual}")]
    VelocityCount { expected: usize, actual: usize },
}
