//! Multi-agent dynamics constrained to an implicit surface.
//!
//! Agents carry a position on the surface, a walk heading and the force
//! contributions of their previous step. Every step the enabled force
//! generators are evaluated against a read-only snapshot, the summed force
//! is projected onto the surface's tangent plane (with a pull-back toward
//! `F = 0`), and positions are advanced with explicit Euler.
//!
//! ```
//! use swarm::config::SwarmConfig;
//! use swarm::simulation::Simulation;
//!
//! let config = SwarmConfig { agent_count: 4, total_time: 0.02, ..SwarmConfig::default() };
//! let mut simulation = Simulation::new(config, None).unwrap();
//! simulation.step().unwrap();
//!
//! assert_eq!(simulation.state().step, 1);
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod forces;
pub mod frame;
pub mod history;
pub mod integrator;
pub mod simulation;
pub mod state;


pub use agent::{Agent, AgentColor, AgentId, ForceBreakdown};
pub use config::{NeighborMode, SwarmConfig};
pub use error::{ConfigError, SwarmError};
pub use forces::{ForceModel, ForceSet};
pub use frame::{Frame, FrameSink, NullSink};
pub use history::TrajectoryHistory;
pub use integrator::{ExplicitEuler, Integrator};
pub use simulation::{RunSummary, Simulation, StepReport};
pub use state::SwarmState;
