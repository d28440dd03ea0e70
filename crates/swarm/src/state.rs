use manifold::ImplicitSurface;
use nalgebra::{Point3, Vector3};

use crate::agent::{Agent, AgentId};

/// Complete state of the swarm at a given step
#[derive(Debug, Clone, PartialEq)]
pub struct SwarmState {
    /// Elapsed simulated time
    pub time: f64,
    /// Index of the next step to run
    pub step: u64,
    pub agents: Vec<Agent>,
}

impl SwarmState {
    /// Creates a state at `t = 0` holding `agents`
    pub fn new(agents: Vec<Agent>) -> Self {
        Self {
            time: 0.0,
            step: 0,
            agents,
        }
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn get_agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn positions(&self) -> Vec<Point3<f64>> {
        self.agents.iter().map(|a| a.position).collect()
    }

    /// Largest `|F(X, q)|` over all agents
    pub fn max_constraint_violation<S: ImplicitSurface + ?Sized>(&self, surface: &S) -> f64 {
        self.agents
            .iter()
            .map(|a| surface.value(&a.position).abs())
            .fold(0.0, f64::max)
    }

    /// Norm of the mean unit velocity, in `[0, 1]`.
    ///
    /// 1 means every moving agent heads the same way; agents at rest are
    /// ignored, and a swarm entirely at rest has polarization 0.
    pub fn polarization(&self) -> f64 {
        let (sum, moving) = self
            .agents
            .iter()
            .filter(|a| a.speed() > 0.0)
            .fold((Vector3::zeros(), 0usize), |(sum, n), a| {
                (sum + a.velocity / a.speed(), n + 1)
            });
        if moving == 0 {
            0.0
        } else {
            (sum / moving as f64).magnitude()
        }
    }

    pub fn mean_speed(&self) -> f64 {
        if self.agents.is_empty() {
            return 0.0;
        }
        self.agents.iter().map(Agent::speed).sum::<f64>() / self.agents.len() as f64
    }
}
