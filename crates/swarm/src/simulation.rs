//! Main simulation driver.
//!
//! Orchestrates one timestep in a fixed order:
//! 1. Advance scheduled polarity headings
//! 2. Evaluate every force generator against the current snapshot
//! 3. Project each total force onto the surface
//! 4. Integrate positions
//! 5. Record the force breakdown as next step's lagged totals

use std::f64::consts::TAU;
use std::sync::Arc;
use std::time::Instant;

use geodesic::{GeodesicMesh, MeshGrid};
use manifold::sampling::sample_points_on_torus;
use manifold::{ConstraintProjector, ImplicitSurface};
use nalgebra::{Point3, Vector3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaChaRng;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::agent::{Agent, AgentId, ForceBreakdown};
use crate::config::{NeighborMode, SwarmConfig};
use crate::error::SwarmError;
use crate::forces::{
    FlockingAlignment, ForceSet, NeighborSelection, PolaritySchedule, RandomPolarity, Repulsion,
};
use crate::frame::{Frame, FrameSink, NullSink};
use crate::integrator::{ExplicitEuler, Integrator};
use crate::state::SwarmState;

/// Steps between progress log lines
const PROGRESS_INTERVAL: u64 = 100;

/// Outcome of a single [`Simulation::step`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    /// Index of the step just taken
    pub step: u64,
    /// Agents whose heading was perturbed this step
    pub perturbed: usize,
    pub max_constraint_violation: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub steps: u64,
    pub time: f64,
    /// Worst `|F|` seen after any step of the run
    pub max_constraint_violation: f64,
    pub polarization: f64,
    /// Repulsion potential of the final configuration
    pub potential_energy: f64,
}

pub struct Simulation {
    config: SwarmConfig,
    surface: Arc<dyn ImplicitSurface>,
    projector: ConstraintProjector,
    forces: ForceSet,
    integrator: Box<dyn Integrator>,
    state: SwarmState,
    mesh: Option<Arc<GeodesicMesh>>,
    grid: MeshGrid,
    rng: ChaChaRng,
}

impl Simulation {
    /// Validates `config` and seeds agents uniformly by area on its torus.
    ///
    /// `mesh` is required when alignment uses geodesic neighbors. Frames
    /// carry its grid, or a grid sampled at `config.mesh` resolution when
    /// no mesh is given.
    ///
    /// # Examples
    ///
    /// ```
    /// use swarm::config::SwarmConfig;
    /// use swarm::simulation::Simulation;
    ///
    /// let config = SwarmConfig { agent_count: 8, total_time: 0.05, ..SwarmConfig::default() };
    /// let mut simulation = Simulation::new(config, None).unwrap();
    /// let summary = simulation.run().unwrap();
    ///
    /// assert_eq!(summary.steps, 5);
    /// assert!(summary.max_constraint_violation < 0.5);
    /// ```
    pub fn new(config: SwarmConfig, mesh: Option<Arc<GeodesicMesh>>) -> Result<Self, SwarmError> {
        config.validate()?;
        let torus = config.torus()?;
        let mut rng = ChaChaRng::seed_from_u64(config.seed);
        let positions = sample_points_on_torus(&torus, config.agent_count, &mut rng);
        Self::assemble(config, Arc::new(torus), positions, mesh, rng)
    }

    /// Like [`Simulation::new`], but places agents at `positions` on an
    /// arbitrary surface. `agent_count` is taken from `positions`.
    ///
    /// Without a mesh, the frame grid is still sampled from the configured
    /// torus.
    pub fn with_positions(
        mut config: SwarmConfig,
        surface: Arc<dyn ImplicitSurface>,
        positions: Vec<Point3<f64>>,
        mesh: Option<Arc<GeodesicMesh>>,
    ) -> Result<Self, SwarmError> {
        config.agent_count = positions.len();
        config.validate()?;
        let rng = ChaChaRng::seed_from_u64(config.seed);
        Self::assemble(config, surface, positions, mesh, rng)
    }

    fn assemble(
        config: SwarmConfig,
        surface: Arc<dyn ImplicitSurface>,
        positions: Vec<Point3<f64>>,
        mesh: Option<Arc<GeodesicMesh>>,
        mut rng: ChaChaRng,
    ) -> Result<Self, SwarmError> {
        let forces = build_forces(&config, &surface, mesh.as_ref())?;
        let grid = match &mesh {
            Some(mesh) => mesh.grid().clone(),
            None => MeshGrid::sample(&config.torus()?, config.mesh.n_theta, config.mesh.n_phi)?,
        };

        let agents = positions
            .into_iter()
            .enumerate()
            .map(|(i, position)| {
                let heading = rng.random::<f64>() * TAU;
                let schedule = PolaritySchedule::random(config.polarity.period, &mut rng);
                Agent::new(AgentId(i as u32), position, heading, schedule, config.history_depth)
            })
            .collect();

        Ok(Self {
            projector: config.projector(),
            config,
            surface,
            forces,
            integrator: Box::new(ExplicitEuler),
            state: SwarmState::new(agents),
            mesh,
            grid,
            rng,
        })
    }

    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }

    pub fn state(&self) -> &SwarmState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SwarmState {
        &mut self.state
    }

    pub fn forces(&self) -> &ForceSet {
        &self.forces
    }

    pub fn surface(&self) -> &dyn ImplicitSurface {
        self.surface.as_ref()
    }

    pub fn mesh(&self) -> Option<&GeodesicMesh> {
        self.mesh.as_deref()
    }

    /// Surface samples handed to frame sinks
    pub fn grid(&self) -> &MeshGrid {
        &self.grid
    }

    pub fn is_finished(&self) -> bool {
        self.state.step >= self.config.step_count()
    }

    pub fn frame(&self) -> Frame<'_> {
        Frame {
            step: self.state.step,
            time: self.state.time,
            agents: &self.state.agents,
            mesh: &self.grid,
        }
    }

    /// Force contributions for the current state, without advancing it.
    pub fn evaluate_forces(&mut self) -> Result<Vec<ForceBreakdown>, SwarmError> {
        self.forces.evaluate(&self.state)
    }

    /// Execute one timestep.
    pub fn step(&mut self) -> Result<StepReport, SwarmError> {
        let step = self.state.step;
        let perturbed = self
            .forces
            .perturb_headings(&mut self.state.agents, step, &mut self.rng);

        let breakdowns = self.forces.evaluate(&self.state)?;

        let surface = self.surface.as_ref();
        let projector = &self.projector;
        let velocities = self
            .state
            .agents
            .par_iter()
            .zip(breakdowns.par_iter())
            .map(|(agent, forces)| projector.project_on(surface, &agent.position, &forces.total()))
            .collect::<Result<Vec<Vector3<f64>>, _>>()?;

        self.integrator
            .step(&mut self.state, self.config.dt, &velocities)?;

        for (agent, forces) in self.state.agents.iter_mut().zip(breakdowns) {
            agent.previous = forces;
        }

        Ok(StepReport {
            step,
            perturbed,
            max_constraint_violation: self.state.max_constraint_violation(surface),
        })
    }

    /// Run to completion without observing frames.
    pub fn run(&mut self) -> Result<RunSummary, SwarmError> {
        self.run_with_sink(&mut NullSink)
    }

    /// Steps until `total_time` is reached, handing `sink` a frame after
    /// every step. The first error aborts the run.
    pub fn run_with_sink(&mut self, sink: &mut dyn FrameSink) -> Result<RunSummary, SwarmError> {
        let total_steps = self.config.step_count();
        info!(
            agents = self.state.agent_count(),
            steps = total_steps,
            dt = self.config.dt,
            forces = ?self.forces.enabled_names(),
            "Starting simulation"
        );

        let started = Instant::now();
        let mut worst = self.state.max_constraint_violation(self.surface.as_ref());
        while !self.is_finished() {
            let report = self.step()?;
            worst = worst.max(report.max_constraint_violation);
            sink.observe(&self.frame());

            if (report.step + 1) % PROGRESS_INTERVAL == 0 {
                debug!(
                    step = report.step + 1,
                    time = self.state.time,
                    max_violation = report.max_constraint_violation,
                    polarization = self.state.polarization(),
                    potential_energy = self.forces.potential_energy(&self.state),
                    "Simulation progress"
                );
            }
        }

        let summary = RunSummary {
            steps: self.state.step,
            time: self.state.time,
            max_constraint_violation: worst,
            polarization: self.state.polarization(),
            potential_energy: self.forces.potential_energy(&self.state),
        };
        info!(
            steps = summary.steps,
            time = summary.time,
            max_violation = summary.max_constraint_violation,
            polarization = summary.polarization,
            potential_energy = summary.potential_energy,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Simulation complete"
        );
        Ok(summary)
    }
}

fn build_forces(
    config: &SwarmConfig,
    surface: &Arc<dyn ImplicitSurface>,
    mesh: Option<&Arc<GeodesicMesh>>,
) -> Result<ForceSet, SwarmError> {
    let mut forces = ForceSet::empty();

    if config.repulsion.enabled {
        forces = forces.with_repulsion(Repulsion::new(
            config.repulsion.strength,
            config.repulsion.range,
        ));
    }

    if config.polarity.enabled {
        forces = forces.with_polarity(RandomPolarity::new(
            Arc::clone(surface),
            config.polarity.amplitude,
            config.polarity.heading_std_dev,
        ));
    }

    if config.alignment.enabled {
        let alignment = &config.alignment;
        let neighbors = match alignment.neighbors {
            NeighborMode::All => NeighborSelection::All,
            NeighborMode::Geodesic => NeighborSelection::Geodesic {
                mesh: mesh.cloned().ok_or(SwarmError::MissingMesh)?,
                threshold: alignment.neighbor_threshold,
            },
        };
        forces = forces.with_alignment(
            FlockingAlignment::new(
                alignment.coupling,
                alignment.softening,
                alignment.exponent,
                config.dt,
            )
            .with_neighbors(neighbors),
        );
    }

    Ok(forces)
}
