//! Force generators acting on surface-bound agents
//!
//! Each generator reads the whole swarm and produces one displacement
//! contribution per agent. [`ForceSet`] runs the enabled generators and
//! keeps the three contributions apart so the alignment lag term can read
//! them back on the next step.

use nalgebra::Vector3;
use rand_chacha::ChaChaRng;
use rayon::prelude::*;

use crate::agent::{Agent, ForceBreakdown};
use crate::error::SwarmError;
use crate::state::SwarmState;

pub mod alignment;
pub mod polarity;
pub mod repulsion;

#[cfg(test)]
mod polarity_test;
#[cfg(test)]
mod repulsion_test;

pub use alignment::{FlockingAlignment, NeighborSelection};
pub use polarity::{PolaritySchedule, RandomPolarity};
pub use repulsion::Repulsion;

/// A source of displacement on agents in a swarm
///
/// Contributions must depend only on `state`, so that every agent can be
/// evaluated against the same snapshot in any order.
pub trait ForceModel: Send + Sync {
    /// Short label used in logs
    fn name(&self) -> &'static str;

    /// Refreshes per-step caches before any contribution is requested.
    fn prepare(&mut self, _state: &SwarmState) -> Result<(), SwarmError> {
        Ok(())
    }

    /// Contribution for the agent at index `idx` in `state.agents`
    fn contribution(&self, idx: usize, state: &SwarmState) -> Result<Vector3<f64>, SwarmError>;

    /// Potential whose negative gradient is this force, if one exists
    fn potential_energy(&self, _state: &SwarmState) -> f64 {
        0.0
    }
}

/// The three generators, each individually togglable.
pub struct ForceSet {
    pub repulsion: Option<Repulsion>,
    pub polarity: Option<RandomPolarity>,
    pub alignment: Option<FlockingAlignment>,
}

impl ForceSet {
    pub fn empty() -> Self {
        Self {
            repulsion: None,
            polarity: None,
            alignment: None,
        }
    }

    pub fn with_repulsion(mut self, repulsion: Repulsion) -> Self {
        self.repulsion = Some(repulsion);
        self
    }

    pub fn with_polarity(mut self, polarity: RandomPolarity) -> Self {
        self.polarity = Some(polarity);
        self
    }

    pub fn with_alignment(mut self, alignment: FlockingAlignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn enabled_names(&self) -> Vec<&'static str> {
        let repulsion = self.repulsion.as_ref().map(|f| f.name());
        let polarity = self.polarity.as_ref().map(|f| f.name());
        let alignment = self.alignment.as_ref().map(|f| f.name());
        [repulsion, polarity, alignment].into_iter().flatten().collect()
    }

    /// Advances scheduled headings for `step`. Returns how many changed.
    pub fn perturb_headings(&self, agents: &mut [Agent], step: u64, rng: &mut ChaChaRng) -> usize {
        match &self.polarity {
            Some(polarity) => polarity.perturb(agents, step, rng),
            None => 0,
        }
    }

    /// Evaluates every enabled generator for every agent against `state`.
    pub fn evaluate(&mut self, state: &SwarmState) -> Result<Vec<ForceBreakdown>, SwarmError> {
        if let Some(f) = self.repulsion.as_mut() {
            f.prepare(state)?;
        }
        if let Some(f) = self.polarity.as_mut() {
            f.prepare(state)?;
        }
        if let Some(f) = self.alignment.as_mut() {
            f.prepare(state)?;
        }

        let this = &*self;
        (0..state.agents.len())
            .into_par_iter()
            .map(|idx| {
                Ok(ForceBreakdown {
                    repulsion: contribution_of(this.repulsion.as_ref(), idx, state)?,
                    polarity: contribution_of(this.polarity.as_ref(), idx, state)?,
                    alignment: contribution_of(this.alignment.as_ref(), idx, state)?,
                })
            })
            .collect()
    }

    /// Summed potential of the enabled generators; only repulsion has one.
    pub fn potential_energy(&self, state: &SwarmState) -> f64 {
        let repulsion = self.repulsion.as_ref().map_or(0.0, |f| f.potential_energy(state));
        let polarity = self.polarity.as_ref().map_or(0.0, |f| f.potential_energy(state));
        let alignment = self.alignment.as_ref().map_or(0.0, |f| f.potential_energy(state));
        repulsion + polarity + alignment
    }
}

fn contribution_of<F: ForceModel>(
    force: Option<&F>,
    idx: usize,
    state: &SwarmState,
) -> Result<Vector3<f64>, SwarmError> {
    match force {
        Some(f) => f.contribution(idx, state),
        None => Ok(Vector3::zeros()),
    }
}
