use crate::domain::DomainBounds;
use crate::error::{FieldError, FieldResult};
use crate::field::VectorField;
use crate::vecmath::Vec2;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_STEPS: usize = 300;
pub const DEFAULT_STEP_SIZE: f64 = 5.0;

/// Which way a line is followed relative to the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceDirection {
    /// Along the field, away from positive charges.
    #[default]
    Forward,
    /// Against the field, away from negative charges.
    Backward,
}

impl TraceDirection {
    fn sign(self) -> f64 {
        match self {
            TraceDirection::Forward => 1.0,
            TraceDirection::Backward => -1.0,
        }
    }
}

/// Why a trace stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The field vanished at the current point.
    FieldNull,
    /// The next step would have left the domain.
    OutOfBounds,
    /// The step budget ran out.
    MaxSteps,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceParams {
    pub max_steps: usize,
    pub step_size: f64,
    #[serde(default)]
    pub direction: TraceDirection,
}

impl Default for TraceParams {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            step_size: DEFAULT_STEP_SIZE,
            direction: TraceDirection::Forward,
        }
    }
}

/// Ordered points of one traced line, seed first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldLine {
    points: Vec<Vec2>,
    termination: Termination,
}

impl FieldLine {
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn termination(&self) -> Termination {
        self.termination
    }

    /// Number of steps taken (points after the seed).
    pub fn steps(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    pub fn into_points(self) -> Vec<Vec2> {
        self.points
    }
}

/// Fixed-step Euler integrator along the field direction.
///
/// Only the direction of the field is used at each step; its strength is
/// discarded, so consecutive points are exactly `step_size` apart.
pub struct FieldLineTracer<'f, F: VectorField + ?Sized> {
    field: &'f F,
    bounds: DomainBounds,
}

impl<'f, F: VectorField + ?Sized> FieldLineTracer<'f, F> {
    pub fn new(field: &'f F, bounds: DomainBounds) -> Self {
        Self { field, bounds }
    }

    pub fn bounds(&self) -> &DomainBounds {
        &self.bounds
    }

    /// Traces a fresh line from `x0`.
    pub fn trace(&self, x0: Vec2, params: &TraceParams) -> FieldResult<FieldLine> {
        if !(params.step_size > 0.0) || !params.step_size.is_finite() {
            return Err(FieldError::InvalidParameter {
                message: format!("step_size must be positive, got {}", params.step_size),
            });
        }
        if !x0.is_finite() {
            return Err(FieldError::InvalidParameter {
                message: format!("seed point ({}, {}) is not finite", x0.x, x0.y),
            });
        }

        let sign = params.direction.sign();
        let mut current = x0;
        let mut points = Vec::with_capacity(params.max_steps.min(1024) + 1);
        points.push(current);

        for _ in 0..params.max_steps {
            let e = self.field.vector(current);
            let magnitude = e.length();
            if magnitude == 0.0 || !magnitude.is_finite() {
                return Ok(FieldLine { points, termination: Termination::FieldNull });
            }
            current = current + e * (sign * params.step_size / magnitude);
            if !self.bounds.contains(current) {
                return Ok(FieldLine { points, termination: Termination::OutOfBounds });
            }
            points.push(current);
        }

        Ok(FieldLine { points, termination: Termination::MaxSteps })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charge::Charge;
    use crate::field::ElectricField;
    use approx::assert_relative_eq;

    fn screen() -> DomainBounds {
        DomainBounds::from_screen(800, 600).unwrap()
    }

    #[test]
    fn isolated_charge_line_leaves_domain() {
        let charges = [Charge::point(0.0, 0.0, 1e-6)];
        let field = ElectricField::new(&charges);
        let line = FieldLineTracer::new(&field, screen())
            .trace(Vec2::new(1.0, 0.0), &TraceParams::default())
            .unwrap();
        assert_eq!(line.termination(), Termination::OutOfBounds);
        assert!(line.steps() < DEFAULT_MAX_STEPS);
        // Radial line: 1 + 5k stays inside up to x = 396.
        assert_eq!(line.steps(), 79);
        let last = line.points().last().unwrap();
        assert_relative_eq!(last.x, 396.0, max_relative = 1e-9);
    }

    #[test]
    fn steps_are_fixed_length() {
        let charges = [Charge::point(-30.0, 10.0, 1e-6), Charge::point(40.0, -5.0, 3e-6)];
        let field = ElectricField::new(&charges);
        let line = FieldLineTracer::new(&field, screen())
            .trace(Vec2::new(-25.0, 12.0), &TraceParams::default())
            .unwrap();
        for pair in line.points().windows(2) {
            assert_relative_eq!(pair[0].distance(pair[1]), DEFAULT_STEP_SIZE, max_relative = 1e-9);
        }
    }

    #[test]
    fn null_point_stops_immediately() {
        let charges = [Charge::point(-50.0, 0.0, 1e-6), Charge::point(50.0, 0.0, 1e-6)];
        let field = ElectricField::new(&charges);
        let line = FieldLineTracer::new(&field, screen())
            .trace(Vec2::zero(), &TraceParams::default())
            .unwrap();
        assert_eq!(line.termination(), Termination::FieldNull);
        assert_eq!(line.points(), &[Vec2::zero()]);
    }

    #[test]
    fn step_budget_limits_length() {
        let uniform = |_: Vec2| Vec2::new(0.0, 1.0);
        let params = TraceParams { max_steps: 10, step_size: 1.0, ..TraceParams::default() };
        let line = FieldLineTracer::new(&uniform, screen()).trace(Vec2::zero(), &params).unwrap();
        assert_eq!(line.termination(), Termination::MaxSteps);
        assert_eq!(line.points().len(), 11);
        assert_relative_eq!(line.points()[10].y, 10.0);
    }

    #[test]
    fn backward_trace_runs_against_the_field() {
        let charges = [Charge::point(0.0, 0.0, -1e-6)];
        let field = ElectricField::new(&charges);
        let params = TraceParams { direction: TraceDirection::Backward, ..TraceParams::default() };
        let line = FieldLineTracer::new(&field, screen()).trace(Vec2::new(0.0, 2.0), &params).unwrap();
        assert_eq!(line.termination(), Termination::OutOfBounds);
        assert!(line.points().windows(2).all(|w| w[1].y > w[0].y));
    }

    #[test]
    fn rejects_bad_step_size() {
        let uniform = |_: Vec2| Vec2::new(1.0, 0.0);
        let params = TraceParams { step_size: 0.0, ..TraceParams::default() };
        let err = FieldLineTracer::new(&uniform, screen()).trace(Vec2::zero(), &params).unwrap_err();
        assert!(matches!(err, FieldError::InvalidParameter { .. }));
    }
}
