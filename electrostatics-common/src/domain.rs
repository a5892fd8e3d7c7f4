use crate::error::{FieldError, FieldResult};
use crate::vecmath::Vec2;
use serde::{Deserialize, Serialize};

/// Rectangular region of the plane that field lines are traced inside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainBounds {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl DomainBounds {
    /// Validated bounds; every value finite and each minimum below its maximum.
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> FieldResult<Self> {
        let finite = [xmin, xmax, ymin, ymax].iter().all(|v| v.is_finite());
        if !finite || xmin >= xmax || ymin >= ymax {
            return Err(FieldError::InvalidDomain { xmin, xmax, ymin, ymax });
        }
        Ok(Self { xmin, xmax, ymin, ymax })
    }

    /// World rectangle for a screen of `width x height` pixels centred on the
    /// origin, one world unit per pixel. Odd sizes round the minimum down, so
    /// 801 pixels span [-401, 400].
    pub fn from_screen(width: u32, height: u32) -> FieldResult<Self> {
        let (w, h) = (i64::from(width), i64::from(height));
        Self::new(
            (-w).div_euclid(2) as f64,
            w.div_euclid(2) as f64,
            (-h).div_euclid(2) as f64,
            h.div_euclid(2) as f64,
        )
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: Vec2) -> bool {
        self.xmin <= p.x && p.x <= self.xmax && self.ymin <= p.y && p.y <= self.ymax
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// The window shown when zoomed by `zoom` and panned horizontally by
    /// `x_offset`.
    pub fn view_window(&self, zoom: f64, x_offset: f64) -> FieldResult<Self> {
        if !(zoom > 0.0) || !zoom.is_finite() {
            return Err(FieldError::InvalidParameter {
                message: format!("zoom must be positive, got {}", zoom),
            });
        }
        Self::new(
            self.xmin / zoom + x_offset,
            self.xmax / zoom + x_offset,
            self.ymin / zoom,
            self.ymax / zoom,
        )
    }
}
