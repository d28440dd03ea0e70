//! Read-only per-step view handed to visualization collaborators.

use geodesic::MeshGrid;
use nalgebra::Point3;

use crate::agent::{Agent, AgentColor};
use crate::history::TrajectoryHistory;

/// Snapshot of the swarm after a step. Borrowed, so sinks cannot write back.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub step: u64,
    pub time: f64,
    pub agents: &'a [Agent],
    pub mesh: &'a MeshGrid,
}

impl<'a> Frame<'a> {
    pub fn positions(&self) -> impl Iterator<Item = &'a Point3<f64>> + 'a {
        self.agents.iter().map(|a| &a.position)
    }

    pub fn trails(&self) -> impl Iterator<Item = &'a TrajectoryHistory> + 'a {
        self.agents.iter().map(|a| &a.trail)
    }

    pub fn colors(&self) -> impl Iterator<Item = AgentColor> + 'a {
        self.agents.iter().map(|a| a.color)
    }

    /// Mesh vertex coordinates as separate x, y and z arrays
    pub fn mesh_coordinates(&self) -> [Vec<f64>; 3] {
        self.mesh.coordinate_arrays()
    }
}

/// Receives one [`Frame`] per step.
pub trait FrameSink {
    fn observe(&mut self, frame: &Frame<'_>);
}

/// Discards every frame
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn observe(&mut self, _frame: &Frame<'_>) {}
}
