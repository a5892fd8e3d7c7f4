use electrostatics_common::{
    log_scale_potential, ArrowSample, Charge, DomainBounds, ElectricField, FieldError, FieldResult, Potential,
    PotentialGrid, Vec2, MAX_ARROWS_PER_AXIS,
};
use rayon::prelude::*;

/// Which arrow samples to drop based on distance to the nearest charge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowCulling {
    /// Samples closer than this to any charge are dropped.
    pub min_distance: f64,
    /// Samples farther than this from every charge are dropped.
    pub max_distance: Option<f64>,
}

impl ArrowCulling {
    pub fn none() -> Self {
        Self { min_distance: 0.0, max_distance: None }
    }

    #[inline(always)]
    fn keeps(&self, p: Vec2, charges: &[Charge]) -> bool {
        if self.min_distance <= 0.0 && self.max_distance.is_none() {
            return true;
        }
        let nearest = charges
            .iter()
            .map(|c| c.distance_to(p))
            .fold(f64::INFINITY, f64::min);
        if nearest < self.min_distance {
            return false;
        }
        match self.max_distance {
            Some(max) => nearest <= max,
            None => true,
        }
    }
}

/// Grid coordinates `start, start + spacing, ...` strictly below `end`,
/// at most [`MAX_ARROWS_PER_AXIS`] of them.
fn axis_samples(start: f64, end: f64, spacing: f64) -> FieldResult<Vec<f64>> {
    let count = ((end - start) / spacing).ceil().max(0.0);
    if !(spacing > 0.0) || !(count <= MAX_ARROWS_PER_AXIS as f64) {
        return Err(FieldError::InvalidParameter {
            message: format!(
                "arrow spacing {} over [{}, {}] exceeds {} samples per axis",
                spacing, start, end, MAX_ARROWS_PER_AXIS
            ),
        });
    }
    Ok((0..count as usize)
        .map(|i| start + i as f64 * spacing)
        .filter(|&v| v < end)
        .collect())
}

/// Samples the field every `spacing` units over `bounds` (parallel).
///
/// Points where the field is zero or not finite carry no direction and are
/// skipped, as are points removed by `culling`. Output is row-major from
/// `(xmin, ymin)`.
pub fn arrow_grid(
    field: &ElectricField<'_>,
    bounds: &DomainBounds,
    spacing: f64,
    culling: &ArrowCulling,
) -> FieldResult<Vec<ArrowSample>> {
    let xs = axis_samples(bounds.xmin, bounds.xmax, spacing)?;
    let ys = axis_samples(bounds.ymin, bounds.ymax, spacing)?;
    let positions: Vec<Vec2> = ys
        .iter()
        .flat_map(|&y| xs.iter().map(move |&x| Vec2::new(x, y)))
        .collect();
    let charges = field.charges();

    Ok(positions
        .par_iter()
        .filter_map(|&position| {
            if !culling.keeps(position, charges) {
                return None;
            }
            let e = field.vector(position);
            let magnitude = e.length();
            if magnitude == 0.0 || !magnitude.is_finite() {
                return None;
            }
            Some(ArrowSample { position, direction: e / magnitude, magnitude })
        })
        .collect())
}

/// Samples the potential on a `resolution x resolution` grid spanning
/// `bounds` edge to edge (parallel).
pub fn potential_grid(potential: &Potential<'_>, bounds: &DomainBounds, resolution: usize) -> PotentialGrid {
    let values: Vec<f64> = (0..resolution * resolution)
        .into_par_iter()
        .map(|idx| {
            let (row, col) = (idx / resolution, idx % resolution);
            potential.magnitude(PotentialGrid::node(bounds, resolution, row, col))
        })
        .collect();
    let scaled = values.par_iter().map(|&v| log_scale_potential(v)).collect();

    PotentialGrid { bounds: *bounds, resolution, values, scaled }
}
