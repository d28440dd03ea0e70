use approx::assert_relative_eq;
use nalgebra::{Point3, Vector3};

use crate::agent::{Agent, AgentId};
use crate::forces::{ForceModel, PolaritySchedule, Repulsion};
use crate::state::SwarmState;

fn make_test_state(positions: &[Point3<f64>]) -> SwarmState {
    let agents = positions
        .iter()
        .enumerate()
        .map(|(i, p)| Agent::new(AgentId(i as u32), *p, 0.0, PolaritySchedule::new(0, 1), 1))
        .collect();
    SwarmState::new(agents)
}

#[test]
fn test_single_agent_feels_nothing() {
    let state = make_test_state(&[Point3::new(4.0, 0.0, 0.0)]);
    let repulsion = Repulsion::new(2.0, 0.5);

    assert_eq!(repulsion.contribution(0, &state).unwrap(), Vector3::zeros());
}

#[test]
fn test_pair_pushes_apart() {
    let state = make_test_state(&[Point3::new(4.0, 0.0, 0.0), Point3::new(3.5, 0.0, 0.0)]);
    let repulsion = Repulsion::new(2.0, 0.5);

    let on_first = repulsion.contribution(0, &state).unwrap();
    let on_second = repulsion.contribution(1, &state).unwrap();

    assert!(on_first.x > 0.0);
    assert!(on_second.x < 0.0);
    // Equal and opposite
    assert_relative_eq!(on_first, -on_second);
}

#[test]
fn test_pair_magnitude() {
    let state = make_test_state(&[Point3::new(4.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)]);
    let repulsion = Repulsion::new(2.0, 0.5);

    // α·exp(−d²/2σ²)·d with d = 2, σ = 0.5
    let expected = 2.0 * (-4.0_f64 / 0.5).exp() * 2.0;
    let force = repulsion.contribution(0, &state).unwrap();

    assert_relative_eq!(force.magnitude(), expected, max_relative = 1e-12);
}

#[test]
fn test_coincident_agents_cancel() {
    let state = make_test_state(&[Point3::new(4.0, 0.0, 0.0), Point3::new(4.0, 0.0, 0.0)]);
    let repulsion = Repulsion::new(2.0, 0.5);

    assert_eq!(repulsion.contribution(0, &state).unwrap(), Vector3::zeros());
}

#[test]
fn test_contributions_superpose() {
    let positions = [
        Point3::new(4.0, 0.0, 0.0),
        Point3::new(3.8, 0.3, 0.1),
        Point3::new(4.1, -0.2, 0.4),
    ];
    let state = make_test_state(&positions);
    let repulsion = Repulsion::new(1.5, 0.4);

    let expected = repulsion.kernel(&(positions[0] - positions[1]))
        + repulsion.kernel(&(positions[0] - positions[2]));

    assert_relative_eq!(repulsion.contribution(0, &state).unwrap(), expected);
}

#[test]
fn test_wider_range_pushes_further() {
    let state = make_test_state(&[Point3::new(4.0, 0.0, 0.0), Point3::new(3.0, 0.0, 0.0)]);

    let narrow = Repulsion::new(2.0, 0.25).contribution(0, &state).unwrap();
    let wide = Repulsion::new(2.0, 1.0).contribution(0, &state).unwrap();

    assert!(wide.magnitude() > narrow.magnitude());
}

#[test]
fn test_potential_energy_positive() {
    let state = make_test_state(&[Point3::new(4.0, 0.0, 0.0), Point3::new(3.5, 0.0, 0.0)]);
    let repulsion = Repulsion::new(2.0, 0.5);

    assert!(repulsion.potential_energy(&state) > 0.0);
}

#[test]
fn test_force_is_negative_potential_gradient() {
    let positions = [
        Point3::new(4.0, 0.0, 0.0),
        Point3::new(3.6, 0.2, -0.1),
        Point3::new(3.9, -0.3, 0.3),
    ];
    let repulsion = Repulsion::new(2.0, 0.5);
    let force = repulsion.contribution(0, &make_test_state(&positions)).unwrap();

    let h = 1e-6;
    for axis in 0..3 {
        let mut plus = positions;
        let mut minus = positions;
        plus[0][axis] += h;
        minus[0][axis] -= h;
        let slope = (repulsion.potential_energy(&make_test_state(&plus))
            - repulsion.potential_energy(&make_test_state(&minus)))
            / (2.0 * h);
        assert_relative_eq!(force[axis], -slope, epsilon = 1e-6);
    }
}
