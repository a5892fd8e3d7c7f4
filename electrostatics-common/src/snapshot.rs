use crate::charge::Charge;
use crate::domain::DomainBounds;
use crate::flux::GaussianCircle;
use crate::tracer::{FieldLine, TraceDirection};
use crate::vecmath::Vec2;
use serde::{Deserialize, Serialize};

// Gain applied before the log10 in the heatmap scaling.
const POTENTIAL_LOG_GAIN: f64 = 5e8;
const POTENTIAL_LOG_FLOOR: f64 = 1e-10;

/// Seed points placed on one charge's Gaussian circle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedCircle {
    pub charge_index: usize,
    pub circle: GaussianCircle,
    /// True when the flux-weighted placement failed and the points are
    /// evenly spaced instead.
    pub fell_back_to_uniform: bool,
    pub points: Vec<Vec2>,
}

/// A traced field line and where it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracedLine {
    pub charge_index: usize,
    pub direction: TraceDirection,
    pub line: FieldLine,
}

/// Field direction and strength at one grid point of the arrow overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrowSample {
    pub position: Vec2,
    /// Unit vector along the field.
    pub direction: Vec2,
    pub magnitude: f64,
}

/// Potential sampled on a square `resolution x resolution` grid, row-major
/// from `(xmin, ymin)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PotentialGrid {
    pub bounds: DomainBounds,
    pub resolution: usize,
    pub values: Vec<f64>,
    /// `log10(|V| * 5e8 + 1e-10)` per sample, non-finite results set to 0.
    pub scaled: Vec<f64>,
}

impl PotentialGrid {
    /// World coordinate of grid node `(row, col)`; nodes include both edges.
    pub fn node(bounds: &DomainBounds, resolution: usize, row: usize, col: usize) -> Vec2 {
        let steps = (resolution.max(2) - 1) as f64;
        Vec2::new(
            bounds.xmin + bounds.width() * col as f64 / steps,
            bounds.ymin + bounds.height() * row as f64 / steps,
        )
    }

    pub fn value_at(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.resolution || col >= self.resolution {
            return None;
        }
        self.values.get(row * self.resolution + col).copied()
    }
}

/// Heatmap scaling of a potential value.
pub fn log_scale_potential(v: f64) -> f64 {
    let scaled = (v.abs() * POTENTIAL_LOG_GAIN + POTENTIAL_LOG_FLOOR).log10();
    if scaled.is_finite() {
        scaled
    } else {
        0.0
    }
}

/// Everything computed for one scene, ready to be saved or rendered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSnapshot {
    pub charges: Vec<Charge>,
    pub domain: DomainBounds,
    pub seeds: Vec<SeedCircle>,
    pub field_lines: Vec<TracedLine>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub arrows: Vec<ArrowSample>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub potential: Option<PotentialGrid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn grid_nodes_span_both_edges() {
        let b = DomainBounds::new(-10.0, 10.0, 0.0, 4.0).unwrap();
        assert_eq!(PotentialGrid::node(&b, 5, 0, 0), Vec2::new(-10.0, 0.0));
        assert_eq!(PotentialGrid::node(&b, 5, 4, 4), Vec2::new(10.0, 4.0));
        assert_eq!(PotentialGrid::node(&b, 5, 2, 1), Vec2::new(-5.0, 2.0));
    }

    #[test]
    fn log_scaling_handles_zero_and_sign() {
        assert_relative_eq!(log_scale_potential(0.0), -10.0, epsilon = 1e-12);
        assert_relative_eq!(log_scale_potential(-2e-9), log_scale_potential(2e-9));
        assert_relative_eq!(log_scale_potential(2e-9), 1.0_f64.log10(), epsilon = 1e-9);
        assert_eq!(log_scale_potential(f64::NAN), 0.0);
    }
}
