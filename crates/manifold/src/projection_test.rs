use approx::assert_abs_diff_eq;
use nalgebra::{Point3, Vector2, Vector3};

use crate::projection::ConstraintProjector;
use crate::surface::{ImplicitSurface, ParametricSurface, SurfaceError};
use crate::torus::Torus;

fn torus() -> Torus {
    Torus::new(1.0, 3.0).unwrap()
}

#[test]
fn removes_normal_component_on_surface() {
    let torus = torus();
    let projector = ConstraintProjector::new(5.0);
    let p = torus.embed(0.7, 2.3);
    let force = Vector3::new(0.4, -1.2, 2.0);

    let v = projector.project_on(&torus, &p, &force).unwrap();
    let n = torus.gradient(&p);

    assert_abs_diff_eq!(v.dot(&n), 0.0, epsilon = 1e-9);
}

#[test]
fn tangent_force_passes_through_unchanged() {
    let torus = torus();
    let projector = ConstraintProjector::new(1.0);
    let p = Point3::new(4.0, 0.0, 0.0);
    let tangent = Vector3::new(0.0, 1.0, -2.0);

    let v = projector.project_on(&torus, &p, &tangent).unwrap();
    assert_abs_diff_eq!(v, tangent, epsilon = 1e-12);
}

#[test]
fn off_surface_point_is_pulled_back() {
    let torus = torus();
    let projector = ConstraintProjector::new(1.0);
    // Slightly outside the outer equator
    let p = Point3::new(4.05, 0.0, 0.0);
    assert!(torus.value(&p) > 0.0);

    let v = projector.project_on(&torus, &p, &Vector3::zeros()).unwrap();
    assert!(v.x < 0.0);

    // A small step along v reduces the violation
    let next = p + v * 1e-3;
    assert!(torus.value(&next).abs() < torus.value(&p).abs());
}

#[test]
fn shape_rate_contributes_to_correction() {
    let torus = torus();
    let p = torus.embed(1.0, 1.0);
    let eval = torus.evaluate(&p);
    let force = Vector3::zeros();

    let static_c = ConstraintProjector::new(0.0)
        .correction(&p, &eval, &force)
        .unwrap();
    let moving_c = ConstraintProjector::new(0.0)
        .with_shape_rate(Vector2::new(0.1, 0.0))
        .correction(&p, &eval, &force)
        .unwrap();

    assert_abs_diff_eq!(static_c, 0.0, epsilon = 1e-12);
    let expected = eval.shape_gradient.x * 0.1 / eval.gradient.norm_squared();
    assert_abs_diff_eq!(moving_c, expected, epsilon = 1e-12);
}

#[test]
fn zero_gradient_is_rejected() {
    let torus = torus();
    // The origin is a critical point of F
    let origin = Point3::origin();
    assert_eq!(torus.gradient(&origin), Vector3::zeros());

    let err = ConstraintProjector::new(1.0)
        .project_on(&torus, &origin, &Vector3::new(1.0, 0.0, 0.0))
        .unwrap_err();
    assert!(matches!(err, SurfaceError::DegenerateGradient { .. }));
}
