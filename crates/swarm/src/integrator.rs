//! Time integration for surface-bound swarms

use nalgebra::{Point3, Vector3};

use crate::error::SwarmError;
use crate::state::SwarmState;

/// Advances agent positions from already projected velocities.
pub trait Integrator: Send + Sync {
    /// Advance the swarm by one timestep
    ///
    /// # Arguments
    ///
    /// * `state` - Current swarm state (modified in place)
    /// * `dt` - Timestep
    /// * `velocities` - One projected velocity per agent, evaluated on the
    ///   state before this call
    fn step(&self, state: &mut SwarmState, dt: f64, velocities: &[Vector3<f64>]) -> Result<(), SwarmError>;
}

/// Explicit Euler: `X ← X + dt·dX/dt`
///
/// # Examples
///
/// ```
/// use nalgebra::{Point3, Vector3};
/// use swarm::agent::{Agent, AgentId};
/// use swarm::forces::PolaritySchedule;
/// use swarm::integrator::{ExplicitEuler, Integrator};
/// use swarm::state::SwarmState;
///
/// let agent = Agent::new(AgentId(0), Point3::new(4.0, 0.0, 0.0), 0.0, PolaritySchedule::new(0, 1), 4);
/// let mut state = SwarmState::new(vec![agent]);
///
/// ExplicitEuler.step(&mut state, 0.5, &[Vector3::new(0.0, 2.0, 0.0)]).unwrap();
/// assert_eq!(state.agents[0].position, Point3::new(4.0, 1.0, 0.0));
/// assert_eq!(state.step, 1);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplicitEuler;

impl Integrator for ExplicitEuler {
    fn step(&self, state: &mut SwarmState, dt: f64, velocities: &[Vector3<f64>]) -> Result<(), SwarmError> {
        if velocities.len() != state.agents.len() {
            return Err(SwarmError::VelocityCount {
                expected: state.agents.len(),
                actual: velocities.len(),
            });
        }

        // Fill the next buffer completely before touching any agent
        let next: Vec<Point3<f64>> = state
            .agents
            .iter()
            .zip(velocities)
            .map(|(agent, v)| agent.position + v * dt)
            .collect();

        state
            .agents
            .iter_mut()
            .zip(next)
            .zip(velocities)
            .for_each(|((agent, position), velocity)| {
                agent.position = position;
                agent.velocity = *velocity;
                agent.trail.push(position);
            });

        state.time += dt;
        state.step += 1;
        Ok(())
    }
}
