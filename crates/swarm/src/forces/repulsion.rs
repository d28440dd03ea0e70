//! Direct pairwise Gaussian repulsion (O(N²) implementation)

use nalgebra::Vector3;

use crate::error::SwarmError;
use crate::forces::ForceModel;
use crate::state::SwarmState;

/// Soft pairwise repulsion with a Gaussian falloff.
///
/// Agent `i` receives `α·Σ_{j≠i} exp(−‖Xi−Xj‖²/2σ²)·(Xi−Xj)`, the negative
/// gradient of `α·σ²·Σ_{i<j} exp(−‖Xi−Xj‖²/2σ²)`.
///
/// # Examples
///
/// ```
/// use nalgebra::Vector3;
/// use swarm::forces::Repulsion;
///
/// let repulsion = Repulsion::new(2.0, 0.5);
/// let push = repulsion.kernel(&Vector3::new(0.5, 0.0, 0.0));
///
/// // Points away from the other agent
/// assert!(push.x > 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Repulsion {
    /// `α`
    pub strength: f64,
    /// `σ`
    pub range: f64,
}

impl Repulsion {
    pub fn new(strength: f64, range: f64) -> Self {
        Self { strength, range }
    }

    /// Push on an agent displaced by `offset = Xi − Xj` from another.
    pub fn kernel(&self, offset: &Vector3<f64>) -> Vector3<f64> {
        offset * (self.strength * self.falloff(offset))
    }

    fn falloff(&self, offset: &Vector3<f64>) -> f64 {
        (-offset.norm_squared() / (2.0 * self.range * self.range)).exp()
    }
}

impl ForceModel for Repulsion {
    fn name(&self) -> &'static str {
        "repulsion"
    }

    fn contribution(&self, idx: usize, state: &SwarmState) -> Result<Vector3<f64>, SwarmError> {
        let agent = &state.agents[idx];
        Ok(state
            .agents
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != idx)
            .map(|(_, other)| self.kernel(&(agent.position - other.position)))
            .fold(Vector3::zeros(), |acc, push| acc + push))
    }

    fn potential_energy(&self, state: &SwarmState) -> f64 {
        let scale = self.strength * self.range * self.range;
        state
            .agents
            .iter()
            .enumerate()
            .flat_map(|(i, a)| {
                state.agents[i + 1..]
                    .iter()
                    .map(move |b| scale * self.falloff(&(a.position - b.position)))
            })
            .sum()
    }
}
