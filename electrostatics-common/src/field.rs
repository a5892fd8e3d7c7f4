use crate::charge::Charge;
use crate::error::{FieldError, FieldResult};
use crate::vecmath::{angle_to_vec, Vec2};

/// Anything that yields a field vector at a point.
///
/// Tracing and flux sampling only need this, so they work against the charge
/// aggregate as well as against synthetic fields.
pub trait VectorField {
    fn vector(&self, p: Vec2) -> Vec2;

    fn magnitude(&self, p: Vec2) -> f64 {
        self.vector(p).length()
    }

    /// Component of the field at `p` along the unit vector at `angle` radians.
    fn projection(&self, p: Vec2, angle: f64) -> f64 {
        self.vector(p).dot(angle_to_vec(angle))
    }
}

impl<F> VectorField for F
where
    F: Fn(Vec2) -> Vec2,
{
    fn vector(&self, p: Vec2) -> Vec2 {
        self(p)
    }
}

/// Superposed electric field of a charge collection.
///
/// Borrows the collection and keeps nothing per charge, so every query sees
/// the charges as they are right now.
#[derive(Debug, Clone, Copy)]
pub struct ElectricField<'a> {
    charges: &'a [Charge],
}

impl<'a> ElectricField<'a> {
    pub fn new(charges: &'a [Charge]) -> Self {
        Self { charges }
    }

    pub fn charges(&self) -> &'a [Charge] {
        self.charges
    }

    /// Sum of every charge's field at `p`.
    pub fn vector(&self, p: Vec2) -> Vec2 {
        self.charges
            .iter()
            .fold(Vec2::zero(), |acc, charge| acc + charge.field(p))
    }

    pub fn magnitude(&self, p: Vec2) -> f64 {
        self.vector(p).length()
    }

    pub fn projection(&self, p: Vec2, angle: f64) -> f64 {
        self.vector(p).dot(angle_to_vec(angle))
    }

    /// Field vectors at each of `points`.
    pub fn vectors(&self, points: &[Vec2]) -> Vec<Vec2> {
        points.iter().map(|&p| self.vector(p)).collect()
    }

    /// Projections of the field at `points[i]` onto the unit vector at
    /// `angles[i]`. Both slices must have the same length.
    pub fn projections(&self, points: &[Vec2], angles: &[f64]) -> FieldResult<Vec<f64>> {
        if points.len() != angles.len() {
            return Err(FieldError::InvalidParameter {
                message: format!(
                    "projection needs one angle per point, got {} points and {} angles",
                    points.len(),
                    angles.len()
                ),
            });
        }
        Ok(points
            .iter()
            .zip(angles)
            .map(|(&p, &a)| self.projection(p, a))
            .collect())
    }
}

impl VectorField for ElectricField<'_> {
    fn vector(&self, p: Vec2) -> Vec2 {
        ElectricField::vector(self, p)
    }
}
