//! Persistent random walk in the tangent plane

use std::sync::Arc;

use manifold::sampling::sample_gaussian;
use manifold::{ImplicitSurface, tangent_frame};
use nalgebra::Vector3;
use rand::Rng;
use rand_chacha::ChaChaRng;
use serde::{Deserialize, Serialize};

use crate::agent::Agent;
use crate::error::SwarmError;
use crate::forces::ForceModel;
use crate::state::SwarmState;

/// Cyclic schedule firing once every `period` steps, at `offset`.
///
/// # Examples
///
/// ```
/// use swarm::forces::PolaritySchedule;
///
/// let schedule = PolaritySchedule::new(2, 5);
/// let fired: Vec<u64> = (0..12).filter(|&s| schedule.fires(s)).collect();
/// assert_eq!(fired, vec![2, 7]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolaritySchedule {
    offset: u32,
    period: u32,
}

impl PolaritySchedule {
    /// `offset` is reduced modulo `period`; a zero period is treated as 1.
    pub fn new(offset: u32, period: u32) -> Self {
        let period = period.max(1);
        Self {
            offset: offset % period,
            period,
        }
    }

    /// Schedule with a uniformly drawn offset in `[0, period)`.
    pub fn random(period: u32, rng: &mut ChaChaRng) -> Self {
        let period = period.max(1);
        Self::new(rng.random_range(0..period), period)
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn period(&self) -> u32 {
        self.period
    }

    pub fn fires(&self, step: u64) -> bool {
        step % u64::from(self.period) == u64::from(self.offset)
    }
}

/// Constant-speed walk along each agent's heading.
///
/// The heading lives in the tangent frame at the agent's current position
/// and only changes through [`RandomPolarity::perturb`].
#[derive(Clone)]
pub struct RandomPolarity {
    pub amplitude: f64,
    pub heading_std_dev: f64,
    surface: Arc<dyn ImplicitSurface>,
}

impl RandomPolarity {
    pub fn new(surface: Arc<dyn ImplicitSurface>, amplitude: f64, heading_std_dev: f64) -> Self {
        Self {
            amplitude,
            heading_std_dev,
            surface,
        }
    }

    /// Adds a Gaussian kick to the heading of every agent whose schedule
    /// fires at `step`. Agents are visited in index order so the draws are
    /// reproducible for a given generator state.
    pub fn perturb(&self, agents: &mut [Agent], step: u64, rng: &mut ChaChaRng) -> usize {
        let mut perturbed = 0;
        for agent in agents.iter_mut().filter(|a| a.schedule.fires(step)) {
            agent.heading += sample_gaussian(rng, 0.0, self.heading_std_dev);
            perturbed += 1;
        }
        perturbed
    }
}

impl ForceModel for RandomPolarity {
    fn name(&self) -> &'static str {
        "polarity"
    }

    fn contribution(&self, idx: usize, state: &SwarmState) -> Result<Vector3<f64>, SwarmError> {
        let agent = &state.agents[idx];
        let gradient = self.surface.gradient(&agent.position);
        let frame = tangent_frame(&agent.position, &gradient)?;
        Ok(frame.direction(agent.heading) * self.amplitude)
    }
}
