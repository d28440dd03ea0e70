use std::sync::Arc;

use approx::assert_relative_eq;
use manifold::{ImplicitSurface, ParametricSurface, SurfaceError, Torus};
use nalgebra::{Point3, Vector2, Vector3};
use rand::SeedableRng;
use rand_chacha::ChaChaRng;

use crate::agent::{Agent, AgentId};
use crate::error::SwarmError;
use crate::forces::{ForceModel, PolaritySchedule, RandomPolarity};
use crate::state::SwarmState;

fn make_test_polarity() -> RandomPolarity {
    RandomPolarity::new(Arc::new(Torus::new(1.0, 3.0).unwrap()), 1.5, 0.5)
}

fn make_agents(schedules: &[PolaritySchedule]) -> Vec<Agent> {
    let torus = Torus::new(1.0, 3.0).unwrap();
    schedules
        .iter()
        .enumerate()
        .map(|(i, s)| Agent::new(AgentId(i as u32), torus.embed(i as f64, 0.5), 0.0, *s, 1))
        .collect()
}

#[test]
fn test_schedule_offset_reduced_modulo_period() {
    let schedule = PolaritySchedule::new(13, 5);
    assert_eq!(schedule.offset(), 3);
    assert_eq!(schedule.period(), 5);
}

#[test]
fn test_schedule_period_one_fires_every_step() {
    let schedule = PolaritySchedule::new(0, 1);
    assert!((0..20).all(|s| schedule.fires(s)));
}

#[test]
fn test_random_schedule_offsets_in_range() {
    let mut rng = ChaChaRng::seed_from_u64(42);
    let schedules: Vec<PolaritySchedule> =
        (0..200).map(|_| PolaritySchedule::random(7, &mut rng)).collect();

    assert!(schedules.iter().all(|s| s.offset() < 7 && s.period() == 7));
    // Every offset shows up with 200 draws
    for offset in 0..7 {
        assert!(schedules.iter().any(|s| s.offset() == offset));
    }
}

#[test]
fn test_perturb_only_scheduled_agents() {
    let polarity = make_test_polarity();
    let mut agents = make_agents(&[
        PolaritySchedule::new(0, 4),
        PolaritySchedule::new(1, 4),
        PolaritySchedule::new(2, 4),
    ]);
    let mut rng = ChaChaRng::seed_from_u64(1);

    for step in 0..12 {
        let before: Vec<f64> = agents.iter().map(|a| a.heading).collect();
        let changed = polarity.perturb(&mut agents, step, &mut rng);

        for (agent, old) in agents.iter().zip(&before) {
            if agent.schedule.fires(step) {
                assert_ne!(agent.heading, *old, "step {step}, agent {:?}", agent.id);
            } else {
                assert_eq!(agent.heading, *old, "step {step}, agent {:?}", agent.id);
            }
        }
        let expected = agents.iter().filter(|a| a.schedule.fires(step)).count();
        assert_eq!(changed, expected);
    }
}

#[test]
fn test_perturb_reproducible() {
    let polarity = make_test_polarity();
    let schedules = [PolaritySchedule::new(0, 2), PolaritySchedule::new(1, 2)];
    let mut a = make_agents(&schedules);
    let mut b = make_agents(&schedules);
    let mut rng_a = ChaChaRng::seed_from_u64(9);
    let mut rng_b = ChaChaRng::seed_from_u64(9);

    for step in 0..10 {
        polarity.perturb(&mut a, step, &mut rng_a);
        polarity.perturb(&mut b, step, &mut rng_b);
    }

    assert_eq!(a, b);
}

#[test]
fn test_contribution_tangent_with_amplitude() {
    let torus = Torus::new(1.0, 3.0).unwrap();
    let polarity = make_test_polarity();
    let mut agents = make_agents(&[PolaritySchedule::new(0, 1); 3]);
    for (agent, heading) in agents.iter_mut().zip([0.0, 1.0, 4.0]) {
        agent.heading = heading;
    }
    let state = SwarmState::new(agents);

    for (idx, agent) in state.agents.iter().enumerate() {
        let push = polarity.contribution(idx, &state).unwrap();
        let normal = torus.gradient(&agent.position).normalize();

        assert_relative_eq!(push.magnitude(), 1.5, epsilon = 1e-12);
        assert!(push.dot(&normal).abs() < 1e-10);
    }
}

#[test]
fn test_heading_rotates_within_tangent_plane() {
    let polarity = make_test_polarity();
    let mut agents = make_agents(&[PolaritySchedule::new(0, 1)]);
    let base = SwarmState::new(agents.clone());
    agents[0].heading = std::f64::consts::FRAC_PI_2;
    let turned = SwarmState::new(agents);

    let a = polarity.contribution(0, &base).unwrap();
    let b = polarity.contribution(0, &turned).unwrap();

    assert!(a.dot(&b).abs() < 1e-10);
}

/// Surface whose gradient vanishes everywhere
struct Flat;

impl ImplicitSurface for Flat {
    fn value(&self, _x: &Point3<f64>) -> f64 {
        0.0
    }

    fn gradient(&self, _x: &Point3<f64>) -> Vector3<f64> {
        Vector3::zeros()
    }

    fn shape_gradient(&self, _x: &Point3<f64>) -> Vector2<f64> {
        Vector2::zeros()
    }

    fn shape(&self) -> Vector2<f64> {
        Vector2::zeros()
    }
}

#[test]
fn test_degenerate_tangent_space_is_an_error() {
    let polarity = RandomPolarity::new(Arc::new(Flat), 1.0, 0.1);
    let state = SwarmState::new(make_agents(&[PolaritySchedule::new(0, 1)]));

    let result = polarity.contribution(0, &state);

    assert!(matches!(
        result,
        Err(SwarmError::Surface(SurfaceError::DegenerateTangentSpace { rank: 3, .. }))
    ));
}
