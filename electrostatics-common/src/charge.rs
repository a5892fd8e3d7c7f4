use crate::error::{FieldError, FieldResult};
use crate::vecmath::{angle, is_left, point_line_distance, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};

/// Radius (world units) inside which a sample counts as "on" a charge.
/// Hit-testing heuristic only; never enters the physics.
pub const DEFAULT_PROXIMITY_RADIUS: f64 = 0.01;

/// Idealized charge `q` concentrated at `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointCharge {
    pub x: f64,
    pub y: f64,
    pub q: f64,
}

impl PointCharge {
    pub fn new(x: f64, y: f64, q: f64) -> Self {
        Self { x, y, q }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Moves the charge to `p` (drag edits).
    pub fn move_to(&mut self, p: Vec2) {
        self.x = p.x;
        self.y = p.y;
    }

    /// Inverse-square field at `p`.
    ///
    /// Zero when `q == 0` and exactly at the charge's own location, where the
    /// field is singular.
    pub fn field(&self, p: Vec2) -> Vec2 {
        if self.q == 0.0 {
            return Vec2::zero();
        }
        let d = p - self.position();
        let r2 = d.length_squared();
        if r2 == 0.0 {
            return Vec2::zero();
        }
        let r = r2.sqrt();
        d * (self.q / r2 / r)
    }

    /// `q / r`, or zero at the charge itself.
    pub fn potential(&self, p: Vec2) -> f64 {
        let r = p.distance(self.position());
        if r == 0.0 {
            0.0
        } else {
            self.q / r
        }
    }

    pub fn distance_to(&self, p: Vec2) -> f64 {
        p.distance(self.position())
    }

    pub fn is_close(&self, p: Vec2, radius: f64) -> bool {
        self.distance_to(p) < radius
    }
}

/// Total charge `q` spread uniformly along the segment `x1 -> x2`.
///
/// Endpoints are private so the segment can never collapse to a point; edit
/// them through [`LineCharge::set_endpoints`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineCharge {
    q: f64,
    x1: Vec2,
    x2: Vec2,
}

impl LineCharge {
    pub fn new(q: f64, x1: Vec2, x2: Vec2) -> FieldResult<Self> {
        check_segment(x1, x2)?;
        Ok(Self { q, x1, x2 })
    }

    pub fn q(&self) -> f64 {
        self.q
    }

    pub fn x1(&self) -> Vec2 {
        self.x1
    }

    pub fn x2(&self) -> Vec2 {
        self.x2
    }

    pub fn length(&self) -> f64 {
        (self.x2 - self.x1).length()
    }

    pub fn midpoint(&self) -> Vec2 {
        (self.x1 + self.x2) * 0.5
    }

    /// Linear charge density.
    pub fn lam(&self) -> f64 {
        self.q / self.length()
    }

    /// Replaces both endpoints. A degenerate segment is rejected and the
    /// charge keeps its previous geometry.
    pub fn set_endpoints(&mut self, x1: Vec2, x2: Vec2) -> FieldResult<()> {
        check_segment(x1, x2)?;
        self.x1 = x1;
        self.x2 = x2;
        Ok(())
    }

    /// Field at `p`, assembled from its components parallel and perpendicular
    /// to the segment.
    ///
    /// Zero at either endpoint. On the line through the segment the
    /// perpendicular part vanishes and only the parallel part remains.
    pub fn field(&self, p: Vec2) -> Vec2 {
        let (x1, x2) = (self.x1, self.x2);
        let r1 = p.distance(x1);
        let r2 = p.distance(x2);
        if r1 == 0.0 || r2 == 0.0 {
            return Vec2::zero();
        }
        let lam = self.lam();

        let theta1 = angle(p, x1, x2);
        let theta2 = PI - angle(p, x2, x1);
        let a = point_line_distance(p, x1, x2);
        let sign = if is_left(p, x1, x2) { 1.0 } else { -1.0 };

        let e_para = lam * (1.0 / r2 - 1.0 / r1);
        let e_perp = if a == 0.0 {
            0.0
        } else {
            -sign * lam * (theta2.cos() - theta1.cos()) / a
        };

        let u = (x2 - x1).normalize_or_zero();
        let n = Vec2::new(-u.y, u.x);
        u * e_para + n * e_perp
    }

    /// `lam * ln((r1 + r2 + L) / (r1 + r2 - L))`; zero on the segment itself,
    /// where the potential diverges.
    pub fn potential(&self, p: Vec2) -> f64 {
        let r1 = p.distance(self.x1);
        let r2 = p.distance(self.x2);
        let l = self.length();
        let denom = r1 + r2 - l;
        if denom <= 0.0 {
            return 0.0;
        }
        self.lam() * ((r1 + r2 + l) / denom).ln()
    }

    /// Distance to the segment: perpendicular distance when `p` projects
    /// inside it, otherwise distance to the nearer endpoint.
    pub fn distance_to(&self, p: Vec2) -> f64 {
        let theta1 = angle(p, self.x1, self.x2);
        let theta2 = angle(p, self.x2, self.x1);
        if theta1 < FRAC_PI_2 && theta2 < FRAC_PI_2 {
            point_line_distance(p, self.x1, self.x2)
        } else {
            p.distance(self.x1).min(p.distance(self.x2))
        }
    }

    /// Capsule-shaped proximity test around the segment.
    pub fn is_close(&self, p: Vec2, radius: f64) -> bool {
        self.distance_to(p) < radius
    }
}

fn check_segment(x1: Vec2, x2: Vec2) -> FieldResult<()> {
    if x1 == x2 {
        return Err(FieldError::DegenerateGeometry { x: x1.x, y: x1.y });
    }
    Ok(())
}

/// Wire/config form of a charge: `{type = "point", x, y, q}` or
/// `{type = "line", q, start = [x, y], end = [x, y]}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChargeSpec {
    Point { x: f64, y: f64, q: f64 },
    Line { q: f64, start: [f64; 2], end: [f64; 2] },
}

/// A point or line charge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ChargeSpec", into = "ChargeSpec")]
pub enum Charge {
    Point(PointCharge),
    Line(LineCharge),
}

impl Charge {
    pub fn point(x: f64, y: f64, q: f64) -> Self {
        Charge::Point(PointCharge::new(x, y, q))
    }

    pub fn line(q: f64, x1: impl Into<Vec2>, x2: impl Into<Vec2>) -> FieldResult<Self> {
        Ok(Charge::Line(LineCharge::new(q, x1.into(), x2.into())?))
    }

    pub fn q(&self) -> f64 {
        match self {
            Charge::Point(c) => c.q,
            Charge::Line(c) => c.q(),
        }
    }

    /// Position of a point charge, midpoint of a line charge.
    pub fn center(&self) -> Vec2 {
        match self {
            Charge::Point(c) => c.position(),
            Charge::Line(c) => c.midpoint(),
        }
    }

    pub fn field(&self, p: Vec2) -> Vec2 {
        match self {
            Charge::Point(c) => c.field(p),
            Charge::Line(c) => c.field(p),
        }
    }

    pub fn potential(&self, p: Vec2) -> f64 {
        match self {
            Charge::Point(c) => c.potential(p),
            Charge::Line(c) => c.potential(p),
        }
    }

    pub fn distance_to(&self, p: Vec2) -> f64 {
        match self {
            Charge::Point(c) => c.distance_to(p),
            Charge::Line(c) => c.distance_to(p),
        }
    }

    pub fn is_close(&self, p: Vec2, radius: f64) -> bool {
        match self {
            Charge::Point(c) => c.is_close(p, radius),
            Charge::Line(c) => c.is_close(p, radius),
        }
    }
}

impl TryFrom<ChargeSpec> for Charge {
    type Error = FieldError;

    fn try_from(spec: ChargeSpec) -> FieldResult<Self> {
        match spec {
            ChargeSpec::Point { x, y, q } => Ok(Charge::point(x, y, q)),
            ChargeSpec::Line { q, start, end } => Charge::line(q, start, end),
        }
    }
}

impl From<Charge> for ChargeSpec {
    fn from(charge: Charge) -> Self {
        match charge {
            Charge::Point(c) => ChargeSpec::Point { x: c.x, y: c.y, q: c.q },
            Charge::Line(c) => ChargeSpec::Line {
                q: c.q,
                start: [c.x1.x, c.x1.y],
                end: [c.x2.x, c.x2.y],
            },
        }
    }
}
