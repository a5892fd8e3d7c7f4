use approx::{assert_abs_diff_eq, assert_relative_eq};
use electrostatics_common::{
    vec_to_angle, Charge, ChargeSet, DomainBounds, ElectricField, FieldLineTracer, GaussianCircle, Potential,
    Preset, Termination, TraceParams, Vec2, VectorField,
};
use std::f64::consts::{FRAC_PI_4, TAU};

fn sample_points() -> Vec<Vec2> {
    vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(13.0, -7.5),
        Vec2::new(-120.0, 45.0),
        Vec2::new(250.0, 199.0),
        Vec2::new(-3.0, 0.25),
    ]
}

#[test]
fn fields_superpose() {
    let a = Charge::point(-20.0, 5.0, 1e-6);
    let b = Charge::line(-2e-6, [30.0, -40.0], [60.0, 10.0]).unwrap();
    let both = [a, b];
    let field_ab = ElectricField::new(&both);
    let field_a = ElectricField::new(std::slice::from_ref(&a));
    let field_b = ElectricField::new(std::slice::from_ref(&b));

    for p in sample_points() {
        let sum = field_a.vector(p) + field_b.vector(p);
        let together = field_ab.vector(p);
        assert_relative_eq!(together.x, sum.x, epsilon = 1e-22, max_relative = 1e-12);
        assert_relative_eq!(together.y, sum.y, epsilon = 1e-22, max_relative = 1e-12);

        let v = Potential::new(&both).magnitude(p);
        let v_sum = a.potential(p) + b.potential(p);
        assert_relative_eq!(v, v_sum, epsilon = 1e-22, max_relative = 1e-12);
    }
}

#[test]
fn inverse_square_reference_values() {
    let charges = [Charge::point(0.0, 0.0, 1e-6)];
    let e = ElectricField::new(&charges).vector(Vec2::new(10.0, 0.0));
    assert_relative_eq!(e.x, 1e-8, max_relative = 1e-12);
    assert_abs_diff_eq!(e.y, 0.0);
    let v = Potential::new(&charges).magnitude(Vec2::new(10.0, 0.0));
    assert_relative_eq!(v, 1e-7, max_relative = 1e-12);
}

#[test]
fn dipole_bisector_field_is_along_the_axis() {
    let charges = [Charge::point(-50.0, 0.0, 1e-6), Charge::point(50.0, 0.0, -1e-6)];
    let field = ElectricField::new(&charges);
    for y in [-250.0, -1.0, 0.0, 3.3, 77.0] {
        // On the bisector of equal and opposite charges the field is parallel
        // to the axis joining them; nothing runs along the bisector itself.
        let e = field.vector(Vec2::new(0.0, y));
        assert_abs_diff_eq!(e.y, 0.0, epsilon = 1e-20);
    }
}

#[test]
fn like_charge_pair_bisector_has_no_x_component() {
    let charges = [Charge::point(-50.0, 0.0, 1e-6), Charge::point(50.0, 0.0, 1e-6)];
    let field = ElectricField::new(&charges);
    for y in [-250.0, -1.0, 3.3, 77.0] {
        let e = field.vector(Vec2::new(0.0, y));
        assert_abs_diff_eq!(e.x, 0.0, epsilon = 1e-20);
    }
}

#[test]
fn compensated_quadrupole_cancels_at_centre() {
    let set = ChargeSet::from_specs(&Preset::FalseMonopole.charges()).unwrap();
    assert_abs_diff_eq!(set.field().magnitude(Vec2::zero()), 0.0, epsilon = 1e-20);

    let set = ChargeSet::from_specs(&Preset::Quadrupole.charges()).unwrap();
    assert_abs_diff_eq!(set.field().magnitude(Vec2::zero()), 0.0, epsilon = 1e-20);
}

#[test]
fn uniform_flux_points_are_45_degrees_apart() {
    let charges = [Charge::point(5.0, 5.0, 1e-6)];
    let field = ElectricField::new(&charges);
    let circle = GaussianCircle::new(Vec2::zero(), 50.0);
    let points = circle.fluxpoints(&field, 8, true).unwrap();
    assert_eq!(points.len(), 8);
    for (k, p) in points.iter().enumerate() {
        assert_relative_eq!(p.length(), 50.0, max_relative = 1e-12);
        let expected = k as f64 * FRAC_PI_4;
        let got = vec_to_angle(*p).rem_euclid(TAU);
        assert_abs_diff_eq!(got, expected, epsilon = 1e-9);
    }
}

/// Outward flux through the arc between two angles, by fine trapezoids.
fn arc_flux(field: &impl VectorField, circle: &GaussianCircle, from: f64, to: f64) -> f64 {
    let steps = 400;
    let h = (to - from) / steps as f64;
    (0..steps)
        .map(|j| {
            let a0 = from + j as f64 * h;
            let a1 = a0 + h;
            let f0 = field.projection(circle.point_at(a0), a0);
            let f1 = field.projection(circle.point_at(a1), a1);
            (f0 + f1) / 2.0 * h
        })
        .sum()
}

#[test]
fn weighted_flux_points_carry_equal_flux() {
    let charges = [Charge::point(10.0, 0.0, 1e-6)];
    let field = ElectricField::new(&charges);
    let circle = GaussianCircle::new(Vec2::zero(), 50.0);
    let n = 8;

    let angles = circle.flux_angles(&field, n, false).unwrap();
    let points = circle.fluxpoints(&field, n, false).unwrap();
    assert_eq!(angles.len(), n);
    assert_eq!(points.len(), n);
    assert!(angles.windows(2).all(|w| w[1] > w[0]));

    let mut bounds = angles.clone();
    bounds.push(angles[0] + TAU);
    let increments: Vec<f64> = bounds
        .windows(2)
        .map(|w| arc_flux(&field, &circle, w[0], w[1]))
        .collect();
    let total: f64 = increments.iter().sum();
    for inc in &increments {
        assert_relative_eq!(*inc, total / n as f64, max_relative = 1e-3);
    }

    // Flux crowds toward the off-centre charge, so gaps are not uniform.
    let gaps: Vec<f64> = bounds.windows(2).map(|w| w[1] - w[0]).collect();
    let widest = gaps.iter().cloned().fold(f64::MIN, f64::max);
    let narrowest = gaps.iter().cloned().fold(f64::MAX, f64::min);
    assert!(widest > 1.3 * narrowest, "gaps {:?}", gaps);
}

#[test]
fn trace_from_isolated_charge_exits_domain() {
    let charges = [Charge::point(0.0, 0.0, 1e-6)];
    let field = ElectricField::new(&charges);
    let bounds = DomainBounds::from_screen(800, 600).unwrap();
    let params = TraceParams::default();
    let tracer = FieldLineTracer::new(&field, bounds);
    for seed in [Vec2::new(0.5, 0.0), Vec2::new(-0.3, 0.4), Vec2::new(0.0, -1.0)] {
        let line = tracer.trace(seed, &params).unwrap();
        assert_eq!(line.termination(), Termination::OutOfBounds);
        assert!(line.steps() <= params.max_steps);
        assert!(line.points().iter().all(|p| bounds.contains(*p)));
    }
}

#[test]
fn trace_at_null_point_stops_within_one_step() {
    let charges = [Charge::point(-50.0, 0.0, 1e-6), Charge::point(50.0, 0.0, 1e-6)];
    let field = ElectricField::new(&charges);
    let bounds = DomainBounds::from_screen(800, 600).unwrap();
    let line = FieldLineTracer::new(&field, bounds)
        .trace(Vec2::zero(), &TraceParams::default())
        .unwrap();
    assert_eq!(line.termination(), Termination::FieldNull);
    assert!(line.steps() <= 1);
}

#[test]
fn retracing_gives_an_identical_new_line() {
    let set = ChargeSet::from_specs(&Preset::Dipole.charges()).unwrap();
    let field = set.field();
    let tracer = FieldLineTracer::new(&field, DomainBounds::from_screen(800, 600).unwrap());
    let seed = Vec2::new(-70.0, 5.0);
    let first = tracer.trace(seed, &TraceParams::default()).unwrap();
    let second = tracer.trace(seed, &TraceParams::default()).unwrap();
    assert_eq!(first, second);
}
