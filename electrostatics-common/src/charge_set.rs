use crate::charge::{Charge, ChargeSpec};
use crate::error::{FieldError, FieldResult};
use crate::field::ElectricField;
use crate::potential::Potential;
use crate::vecmath::Vec2;

/// Which end of a line charge an edit applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnd {
    Start,
    End,
}

/// The owned, editable charge collection.
///
/// Field and potential views borrow it, so an edit can only happen while no
/// view is alive and every view built afterwards sees the new state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChargeSet {
    charges: Vec<Charge>,
}

impl ChargeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the collection from config records, failing on the first
    /// invalid one.
    pub fn from_specs(specs: &[ChargeSpec]) -> FieldResult<Self> {
        let charges = specs
            .iter()
            .map(|&spec| Charge::try_from(spec))
            .collect::<FieldResult<Vec<_>>>()?;
        Ok(Self { charges })
    }

    pub fn as_slice(&self) -> &[Charge] {
        &self.charges
    }

    pub fn len(&self) -> usize {
        self.charges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charges.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Charge> {
        self.charges.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Charge> {
        self.charges.iter()
    }

    /// Appends `charge` and returns its index.
    pub fn add(&mut self, charge: Charge) -> usize {
        self.charges.push(charge);
        self.charges.len() - 1
    }

    pub fn remove(&mut self, index: usize) -> Option<Charge> {
        (index < self.charges.len()).then(|| self.charges.remove(index))
    }

    pub fn clear(&mut self) {
        self.charges.clear();
    }

    /// Index of the first charge within `radius` of `p`.
    pub fn find_close(&self, p: Vec2, radius: f64) -> Option<usize> {
        self.charges.iter().position(|c| c.is_close(p, radius))
    }

    /// Moves a point charge to `to`, or shifts a line charge so its midpoint
    /// lands on `to`.
    pub fn move_charge(&mut self, index: usize, to: Vec2) -> FieldResult<()> {
        match self.charge_mut(index)? {
            Charge::Point(c) => c.move_to(to),
            Charge::Line(c) => {
                let shift = to - c.midpoint();
                c.set_endpoints(c.x1() + shift, c.x2() + shift)?;
            }
        }
        Ok(())
    }

    /// Drags one end of a line charge to `to`. Collapsing the segment fails
    /// with [`FieldError::DegenerateGeometry`] and leaves the charge as it was.
    pub fn move_line_endpoint(&mut self, index: usize, end: LineEnd, to: Vec2) -> FieldResult<()> {
        match self.charge_mut(index)? {
            Charge::Line(c) => match end {
                LineEnd::Start => c.set_endpoints(to, c.x2()),
                LineEnd::End => c.set_endpoints(c.x1(), to),
            },
            Charge::Point(_) => Err(FieldError::InvalidParameter {
                message: format!("charge {} is a point charge and has no endpoints", index),
            }),
        }
    }

    pub fn field(&self) -> ElectricField<'_> {
        ElectricField::new(&self.charges)
    }

    pub fn potential(&self) -> Potential<'_> {
        Potential::new(&self.charges)
    }

    fn charge_mut(&mut self, index: usize) -> FieldResult<&mut Charge> {
        let len = self.charges.len();
        self.charges.get_mut(index).ok_or_else(|| FieldError::InvalidParameter {
            message: format!("charge index {} out of range for {} charges", index, len),
        })
    }
}

impl FromIterator<Charge> for ChargeSet {
    fn from_iter<I: IntoIterator<Item = Charge>>(iter: I) -> Self {
        Self { charges: iter.into_iter().collect() }
    }
}
