use crate::charge::Charge;
use crate::vecmath::Vec2;

/// Superposed scalar potential of a charge collection.
#[derive(Debug, Clone, Copy)]
pub struct Potential<'a> {
    charges: &'a [Charge],
}

impl<'a> Potential<'a> {
    pub fn new(charges: &'a [Charge]) -> Self {
        Self { charges }
    }

    /// Sum of every charge's potential at `p`.
    pub fn magnitude(&self, p: Vec2) -> f64 {
        self.charges.iter().map(|c| c.potential(p)).sum()
    }

    pub fn magnitudes(&self, points: &[Vec2]) -> Vec<f64> {
        points.iter().map(|&p| self.magnitude(p)).collect()
    }
}
