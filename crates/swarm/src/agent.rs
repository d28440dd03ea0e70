use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::forces::polarity::PolaritySchedule;
use crate::history::TrajectoryHistory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u32);

/// Per-generator force contributions accumulated by one agent in one step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ForceBreakdown {
    pub repulsion: Vector3<f64>,
    pub polarity: Vector3<f64>,
    pub alignment: Vector3<f64>,
}

impl ForceBreakdown {
    /// Sum of the three contributions
    pub fn total(&self) -> Vector3<f64> {
        self.repulsion + self.polarity + self.alignment
    }
}

/// Fixed display color, derived from the agent id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl AgentColor {
    /// Steps the hue by the golden angle per id so neighbors in id order
    /// get well-separated colors.
    pub fn from_id(id: AgentId) -> Self {
        const GOLDEN_ANGLE_DEG: f64 = 137.507_764;
        let hue = (id.0 as f64 * GOLDEN_ANGLE_DEG).rem_euclid(360.0);
        Self::from_hsv(hue, 0.65, 0.95)
    }

    fn from_hsv(hue: f64, saturation: f64, value: f64) -> Self {
        let c = value * saturation;
        let h = hue / 60.0;
        let x = c * (1.0 - (h.rem_euclid(2.0) - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = value - c;
        let to_byte = |channel: f64| ((channel + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Self {
            r: to_byte(r),
            g: to_byte(g),
            b: to_byte(b),
        }
    }
}

/// A point agent confined to the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub id: AgentId,
    pub position: Point3<f64>,
    /// Most recent projected velocity
    pub velocity: Vector3<f64>,
    /// Walk direction, radians within the local tangent frame
    pub heading: f64,
    pub schedule: PolaritySchedule,
    /// Contributions from the previous step; read by the alignment lag term
    pub previous: ForceBreakdown,
    pub color: AgentColor,
    pub trail: TrajectoryHistory,
}

impl Agent {
    pub fn new(
        id: AgentId,
        position: Point3<f64>,
        heading: f64,
        schedule: PolaritySchedule,
        history_depth: usize,
    ) -> Self {
        let mut trail = TrajectoryHistory::new(history_depth);
        trail.push(position);
        Self {
            id,
            position,
            velocity: Vector3::zeros(),
            heading,
            schedule,
            previous: ForceBreakdown::default(),
            color: AgentColor::from_id(id),
            trail,
        }
    }

    pub fn distance_to(&self, other: &Agent) -> f64 {
        (self.position - other.position).magnitude()
    }

    pub fn speed(&self) -> f64 {
        self.velocity.magnitude()
    }
}
