use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use geodesic::{FileMeshStore, GeodesicMesh, MeshStore, NoMeshStore};
use nalgebra::Vector3;
use swarm::config::{NeighborMode, SwarmConfig};
use swarm::simulation::Simulation;
use swarm::{Frame, FrameSink};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "swarm",
    version,
    about = "Run a surface-constrained swarm on a torus"
)]
struct Cli {
    /// JSON configuration file; omitted fields take their defaults.
    #[arg(long, env = "SWARM_CONFIG")]
    config: Option<PathBuf>,

    /// Random seed for placement, schedules and heading noise.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of agents.
    #[arg(long)]
    agents: Option<usize>,

    /// Simulated time to run for.
    #[arg(long)]
    total_time: Option<f64>,

    /// Where the precomputed geodesic mesh is cached.
    #[arg(long, env = "SWARM_MESH_CACHE", default_value = "swarm-mesh.bin")]
    mesh_cache: PathBuf,

    /// Always rebuild the geodesic mesh and never write it to disk.
    #[arg(long)]
    no_cache: bool,

    /// Restrict alignment neighbors by geodesic distance.
    #[arg(long)]
    geodesic: bool,

    /// Steps between progress lines.
    #[arg(long, default_value_t = 100)]
    log_every: u64,
}

impl Cli {
    fn resolve_config(&self) -> Result<SwarmConfig> {
        let mut config = match &self.config {
            Some(path) => SwarmConfig::from_json_file(path)
                .with_context(|| format!("loading configuration from {}", path.display()))?,
            None => SwarmConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(agents) = self.agents {
            config.agent_count = agents;
        }
        if let Some(total_time) = self.total_time {
            config.total_time = total_time;
        }
        if self.geodesic {
            config.alignment.neighbors = NeighborMode::Geodesic;
        }
        config.validate().context("invalid configuration")?;
        Ok(config)
    }

    fn mesh_store(&self) -> Box<dyn MeshStore> {
        if self.no_cache {
            Box::new(NoMeshStore)
        } else {
            Box::new(FileMeshStore::new(&self.mesh_cache))
        }
    }
}

/// Logs a one-line summary of every n-th frame.
struct LogSink {
    every: u64,
}

impl FrameSink for LogSink {
    fn observe(&mut self, frame: &Frame<'_>) {
        if self.every == 0 || frame.step % self.every != 0 {
            return;
        }
        let n = frame.agents.len().max(1) as f64;
        let centroid = frame
            .positions()
            .fold(Vector3::zeros(), |acc, p| acc + p.coords)
            / n;
        let mean_speed = frame.agents.iter().map(|a| a.speed()).sum::<f64>() / n;
        let vertices = frame.mesh.len();
        info!(
            step = frame.step,
            time = frame.time,
            mean_speed,
            vertices,
            centroid_x = centroid.x,
            centroid_y = centroid.y,
            centroid_z = centroid.z,
            "Frame"
        );
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    let mesh = Arc::new(load_mesh(&config, cli.mesh_store().as_ref())?);
    info!(
        vertices = mesh.grid().len(),
        geodesic_neighbors = config.uses_geodesic_neighbors(),
        "Geodesic mesh ready"
    );

    let mut simulation = Simulation::new(config, Some(mesh)).context("setting up simulation")?;
    let mut sink = LogSink {
        every: cli.log_every,
    };
    let summary = simulation
        .run_with_sink(&mut sink)
        .context("simulation aborted")?;

    info!(
        steps = summary.steps,
        time = summary.time,
        max_violation = summary.max_constraint_violation,
        polarization = summary.polarization,
        "Run finished"
    );
    Ok(())
}

fn load_mesh(config: &SwarmConfig, store: &dyn MeshStore) -> Result<GeodesicMesh> {
    let torus = config.torus().context("building surface")?;
    config
        .mesh_builder(&torus)
        .load_or_build(store)
        .context("preparing geodesic mesh")
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}
