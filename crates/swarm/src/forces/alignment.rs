//! Cucker-Smale style alignment on lagged force totals

use std::sync::Arc;

use geodesic::GeodesicMesh;
use nalgebra::Vector3;

use crate::error::SwarmError;
use crate::forces::ForceModel;
use crate::state::SwarmState;

/// Which other agents count as neighbors
#[derive(Debug, Clone)]
pub enum NeighborSelection {
    /// Every other agent
    All,
    /// Agents whose nearest mesh vertices are within `threshold` of each
    /// other along the surface. Disconnected vertices never qualify.
    Geodesic {
        mesh: Arc<GeodesicMesh>,
        threshold: f64,
    },
}

/// Steers each agent toward the force totals its neighbors accumulated on
/// the previous step.
///
/// For agent `i` with neighbor set `S`:
///
/// ```text
/// A_i = dt · (1/|S|) · Σ_{j∈S} H(‖Xi−Xj‖) · (prev_j − prev_i)
/// H(d) = K / (σ² + d²)^γ
/// ```
///
/// An empty `S` yields zero.
#[derive(Debug, Clone)]
pub struct FlockingAlignment {
    /// `K`
    pub coupling: f64,
    /// `σ`
    pub softening: f64,
    /// `γ`
    pub exponent: f64,
    pub dt: f64,
    neighbors: NeighborSelection,
    /// Nearest mesh vertex per agent, refreshed by `prepare`
    vertices: Vec<Option<usize>>,
}

impl FlockingAlignment {
    pub fn new(coupling: f64, softening: f64, exponent: f64, dt: f64) -> Self {
        Self {
            coupling,
            softening,
            exponent,
            dt,
            neighbors: NeighborSelection::All,
            vertices: Vec::new(),
        }
    }

    pub fn with_neighbors(mut self, neighbors: NeighborSelection) -> Self {
        self.neighbors = neighbors;
        self.vertices.clear();
        self
    }

    pub fn neighbors(&self) -> &NeighborSelection {
        &self.neighbors
    }

    /// Communication weight `H(d)`
    pub fn weight(&self, distance: f64) -> f64 {
        let sigma_sq = self.softening * self.softening;
        self.coupling / (sigma_sq + distance * distance).powf(self.exponent)
    }

    /// Whether `j` is in the neighbor set of `i`. Requires a prior
    /// [`ForceModel::prepare`] in geodesic mode.
    pub fn is_neighbor(&self, i: usize, j: usize) -> bool {
        if i == j {
            return false;
        }
        match &self.neighbors {
            NeighborSelection::All => true,
            NeighborSelection::Geodesic { mesh, threshold } => {
                match (self.vertex_of(i), self.vertex_of(j)) {
                    (Some(vi), Some(vj)) => {
                        let d = mesh.distances().distance(vi, vj);
                        d.is_finite() && d <= *threshold
                    }
                    _ => false,
                }
            }
        }
    }

    fn vertex_of(&self, idx: usize) -> Option<usize> {
        self.vertices.get(idx).copied().flatten()
    }
}

impl ForceModel for FlockingAlignment {
    fn name(&self) -> &'static str {
        "alignment"
    }

    fn prepare(&mut self, state: &SwarmState) -> Result<(), SwarmError> {
        if let NeighborSelection::Geodesic { mesh, .. } = &self.neighbors {
            self.vertices = state
                .agents
                .iter()
                .map(|a| mesh.nearest_vertex(&a.position))
                .collect();
        }
        Ok(())
    }

    fn contribution(&self, idx: usize, state: &SwarmState) -> Result<Vector3<f64>, SwarmError> {
        let agent = &state.agents[idx];
        let own = agent.previous.total();

        let (sum, count) = state
            .agents
            .iter()
            .enumerate()
            .filter(|(j, _)| self.is_neighbor(idx, *j))
            .fold((Vector3::zeros(), 0usize), |(sum, count), (_, other)| {
                let h = self.weight(agent.distance_to(other));
                (sum + (other.previous.total() - own) * h, count + 1)
            });

        if count == 0 {
            return Ok(Vector3::zeros());
        }
        Ok(sum * (self.dt / count as f64))
    }
}
