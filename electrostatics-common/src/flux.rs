use crate::error::{FieldError, FieldResult};
use crate::field::VectorField;
use crate::vecmath::{angle_to_vec, lininterp, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Angles sampled around the circle, closing sample included.
pub const FLUX_SAMPLES: usize = 1001;

// Relative agreement required between the trapezoidal total and the plain sum.
const FLUX_CONSISTENCY_RTOL: f64 = 1e-5;

/// Circle used to place field-line seeds so that each carries the same flux.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaussianCircle {
    pub center: Vec2,
    pub radius: f64,
    /// Angle (radians) of the first sample.
    #[serde(default)]
    pub angular_offset: f64,
}

impl GaussianCircle {
    pub fn new(center: Vec2, radius: f64) -> Self {
        Self { center, radius, angular_offset: 0.0 }
    }

    pub fn with_offset(mut self, angular_offset: f64) -> Self {
        self.angular_offset = angular_offset;
        self
    }

    /// Point on the circle at `angle` radians.
    pub fn point_at(&self, angle: f64) -> Vec2 {
        self.center + angle_to_vec(angle) * self.radius
    }

    /// `n` points on the circle such that consecutive points bound equal
    /// outward flux of `field`. With `uniform` the field is ignored and the
    /// points are evenly spaced.
    pub fn fluxpoints<F: VectorField + ?Sized>(
        &self,
        field: &F,
        n: usize,
        uniform: bool,
    ) -> FieldResult<Vec<Vec2>> {
        Ok(self
            .flux_angles(field, n, uniform)?
            .into_iter()
            .map(|a| self.point_at(a))
            .collect())
    }

    /// Angles (radians, increasing from the offset) of the points returned
    /// by [`GaussianCircle::fluxpoints`].
    pub fn flux_angles<F: VectorField + ?Sized>(
        &self,
        field: &F,
        n: usize,
        uniform: bool,
    ) -> FieldResult<Vec<f64>> {
        if n == 0 {
            return Ok(Vec::new());
        }
        if !(self.radius > 0.0) || !self.radius.is_finite() {
            return Err(FieldError::InvalidParameter {
                message: format!("Gaussian circle radius must be positive, got {}", self.radius),
            });
        }
        debug_assert_eq!((FLUX_SAMPLES - 1) % 4, 0);

        let intervals = (FLUX_SAMPLES - 1) as f64;
        let angles: Vec<f64> = (0..FLUX_SAMPLES)
            .map(|i| self.angular_offset + TAU * i as f64 / intervals)
            .collect();

        let flux = if uniform {
            vec![1.0; FLUX_SAMPLES]
        } else {
            self.signed_flux(field, &angles)?
        };

        // Cumulative trapezoidal flux, starting at zero.
        let mut intflux = Vec::with_capacity(FLUX_SAMPLES);
        intflux.push(0.0);
        let mut running = 0.0;
        for pair in flux.windows(2) {
            running += (pair[0] + pair[1]) / 2.0;
            intflux.push(running);
        }

        // First and last samples are the same point, so the trapezoid total
        // equals the sum over one full turn.
        let summed: f64 = flux[..FLUX_SAMPLES - 1].iter().sum();
        if !running.is_finite()
            || !summed.is_finite()
            || (running - summed).abs() > FLUX_CONSISTENCY_RTOL * summed.abs()
        {
            return Err(FieldError::InconsistentFlux { integrated: running, summed });
        }

        Ok((0..n)
            .map(|k| {
                let target = running * k as f64 / n as f64;
                lininterp(&intflux, &angles, target)
            })
            .collect())
    }

    /// Outward flux weights, flipped so they are positive when the circle
    /// holds net negative charge.
    fn signed_flux<F: VectorField + ?Sized>(&self, field: &F, angles: &[f64]) -> FieldResult<Vec<f64>> {
        let mut flux: Vec<f64> = angles
            .iter()
            .map(|&a| field.projection(self.point_at(a), a))
            .collect();

        if flux.iter().all(|&f| f == 0.0) {
            return Err(FieldError::ZeroFlux { cx: self.center.x, cy: self.center.y });
        }
        let total: f64 = flux.iter().sum();
        if total < 0.0 {
            flux.iter_mut().for_each(|f| *f = -*f);
        }
        if total == 0.0 || flux.iter().any(|&f| !(f >= 0.0)) {
            return Err(FieldError::AmbiguousFluxSign { cx: self.center.x, cy: self.center.y });
        }
        Ok(flux)
    }
}
