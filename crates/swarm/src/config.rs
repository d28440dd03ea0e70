//! Run parameters, loaded from JSON and checked before a run starts.
//!
//! Every field has a default, so a partial file only needs to name what it
//! changes:
//!
//! ```
//! use swarm::config::SwarmConfig;
//!
//! let config = SwarmConfig::from_json_str(r#"{ "agent_count": 12, "repulsion": { "range": 0.25 } }"#)
//!     .unwrap();
//! assert_eq!(config.agent_count, 12);
//! assert_eq!(config.repulsion.range, 0.25);
//! assert!(config.repulsion.enabled);
//! ```

use std::path::Path;

use geodesic::GeodesicMeshBuilder;
use geodesic::grid::MIN_GRID_EXTENT;
use geodesic::mesh::{DEFAULT_BUCKET_SIZE, DEFAULT_N_PHI, DEFAULT_N_THETA};
use manifold::{ConstraintProjector, Torus};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, SwarmError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmConfig {
    pub agent_count: usize,
    pub dt: f64,
    pub total_time: f64,
    /// Constraint pull-back rate `φ`
    pub stiffness: f64,
    pub seed: u64,
    /// Positions kept per agent trail
    pub history_depth: usize,
    pub surface: SurfaceConfig,
    pub repulsion: RepulsionConfig,
    pub polarity: PolarityConfig,
    pub alignment: AlignmentConfig,
    pub mesh: MeshConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub minor_radius: f64,
    pub major_radius: f64,
    /// Imposed shape rates `Q`, `(dr/dt, dR/dt)`
    pub shape_rate: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepulsionConfig {
    pub enabled: bool,
    /// `α`
    pub strength: f64,
    /// `σ`
    pub range: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolarityConfig {
    pub enabled: bool,
    pub amplitude: f64,
    pub heading_std_dev: f64,
    /// Steps between heading perturbations of a given agent
    pub period: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeighborMode {
    /// Every other agent is a neighbor
    #[default]
    All,
    /// Agents within `neighbor_threshold` geodesic distance
    Geodesic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    pub enabled: bool,
    /// `K`
    pub coupling: f64,
    /// `σ`
    pub softening: f64,
    /// `γ`
    pub exponent: f64,
    pub neighbor_threshold: f64,
    pub neighbors: NeighborMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    pub n_theta: usize,
    pub n_phi: usize,
    pub bucket_size: usize,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            agent_count: 50,
            dt: 0.01,
            total_time: 10.0,
            stiffness: 10.0,
            seed: 42,
            history_depth: 20,
            surface: SurfaceConfig::default(),
            repulsion: RepulsionConfig::default(),
            polarity: PolarityConfig::default(),
            alignment: AlignmentConfig::default(),
            mesh: MeshConfig::default(),
        }
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            minor_radius: 1.0,
            major_radius: 3.0,
            shape_rate: [0.0, 0.0],
        }
    }
}

impl Default for RepulsionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            strength: 2.0,
            range: 0.5,
        }
    }
}

impl Default for PolarityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            amplitude: 1.0,
            heading_std_dev: 0.5,
            period: 10,
        }
    }
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            coupling: 1.0,
            softening: 1.0,
            exponent: 0.5,
            neighbor_threshold: 1.0,
            neighbors: NeighborMode::All,
        }
    }
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            n_theta: DEFAULT_N_THETA,
            n_phi: DEFAULT_N_PHI,
            bucket_size: DEFAULT_BUCKET_SIZE,
        }
    }
}

fn require_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be positive, got {value}")))
    }
}

fn require_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be non-negative, got {value}")))
    }
}

fn require_finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be finite, got {value}")))
    }
}

impl SwarmConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Rejects parameter combinations that cannot produce a meaningful run.
    ///
    /// Force sections are checked even when disabled so that toggling a
    /// generator on never exposes a latent bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent_count == 0 {
            return Err(ConfigError::invalid("agent_count", "at least one agent is required"));
        }
        require_positive("dt", self.dt)?;
        require_positive("total_time", self.total_time)?;
        require_non_negative("stiffness", self.stiffness)?;
        if self.history_depth == 0 {
            return Err(ConfigError::invalid("history_depth", "must keep at least one position"));
        }

        let surface = &self.surface;
        require_positive("surface.minor_radius", surface.minor_radius)?;
        require_positive("surface.major_radius", surface.major_radius)?;
        if surface.minor_radius >= surface.major_radius {
            return Err(ConfigError::invalid(
                "surface.minor_radius",
                format!(
                    "minor radius {} must be smaller than major radius {}",
                    surface.minor_radius, surface.major_radius
                ),
            ));
        }
        require_finite("surface.shape_rate", surface.shape_rate[0])?;
        require_finite("surface.shape_rate", surface.shape_rate[1])?;

        require_finite("repulsion.strength", self.repulsion.strength)?;
        require_positive("repulsion.range", self.repulsion.range)?;

        require_finite("polarity.amplitude", self.polarity.amplitude)?;
        require_non_negative("polarity.heading_std_dev", self.polarity.heading_std_dev)?;
        if self.polarity.period == 0 {
            return Err(ConfigError::invalid("polarity.period", "must be at least one step"));
        }

        require_finite("alignment.coupling", self.alignment.coupling)?;
        require_positive("alignment.softening", self.alignment.softening)?;
        require_finite("alignment.exponent", self.alignment.exponent)?;
        require_non_negative("alignment.neighbor_threshold", self.alignment.neighbor_threshold)?;

        if self.mesh.n_theta < MIN_GRID_EXTENT || self.mesh.n_phi < MIN_GRID_EXTENT {
            return Err(ConfigError::invalid(
                "mesh",
                format!(
                    "grid must be at least {MIN_GRID_EXTENT}x{MIN_GRID_EXTENT}, got {}x{}",
                    self.mesh.n_theta, self.mesh.n_phi
                ),
            ));
        }
        if self.mesh.bucket_size == 0 {
            return Err(ConfigError::invalid("mesh.bucket_size", "must be at least one"));
        }
        Ok(())
    }

    /// Number of steps needed to reach `total_time`
    pub fn step_count(&self) -> u64 {
        // Absorb rounding so that e.g. 1.0 / 0.1 is 10 steps, not 11
        (self.total_time / self.dt - 1e-9).ceil().max(0.0) as u64
    }

    pub fn torus(&self) -> Result<Torus, SwarmError> {
        Ok(Torus::new(self.surface.minor_radius, self.surface.major_radius)?)
    }

    pub fn projector(&self) -> ConstraintProjector {
        let [dr, d_big_r] = self.surface.shape_rate;
        ConstraintProjector::new(self.stiffness).with_shape_rate(Vector2::new(dr, d_big_r))
    }

    pub fn mesh_builder<'a>(&self, torus: &'a Torus) -> GeodesicMeshBuilder<'a, Torus> {
        GeodesicMeshBuilder::new(torus)
            .with_resolution(self.mesh.n_theta, self.mesh.n_phi)
            .with_bucket_size(self.mesh.bucket_size)
    }

    pub fn uses_geodesic_neighbors(&self) -> bool {
        self.alignment.enabled && self.alignment.neighbors == NeighborMode::Geodesic
    }
}
