use crate::grid::{arrow_grid, potential_grid, ArrowCulling};
use anyhow::Result;
use electrostatics_common::{
    ArrowSample, Charge, ChargeSet, DomainBounds, FieldError, FieldLine, FieldLineTracer, FieldResult, FieldSnapshot,
    GaussianCircle, PotentialGrid, ScenarioConfig, SeedCircle, TraceDirection, TracedLine, Vec2,
};
use log::{debug, info, warn};
use rayon::prelude::*;

/// A charge scene plus the settings used to trace and sample it.
pub struct FieldSimulation {
    config: ScenarioConfig,
    charges: ChargeSet,
    /// Tracing bounds. Unset until a domain is configured.
    domain: Option<DomainBounds>,
}

impl FieldSimulation {
    pub fn new(config: ScenarioConfig) -> Result<Self> {
        let charges = config.build_charges()?;
        let domain = match &config.domain {
            Some(domain) => Some(domain.bounds()?),
            None => None,
        };
        if let Some(preset) = config.preset {
            info!("Loaded preset '{}' ({}).", preset, preset.description());
        }
        Ok(Self { config, charges, domain })
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    pub fn charges(&self) -> &ChargeSet {
        &self.charges
    }

    /// Mutable access for interactive edits; later traces see the new state.
    pub fn charges_mut(&mut self) -> &mut ChargeSet {
        &mut self.charges
    }

    pub fn domain(&self) -> Option<&DomainBounds> {
        self.domain.as_ref()
    }

    pub fn set_domain(&mut self, bounds: DomainBounds) {
        self.domain = Some(bounds);
    }

    /// Index of the charge under `p`, using the configured proximity radius.
    pub fn find_charge(&self, p: Vec2) -> Option<usize> {
        self.charges.find_close(p, self.config.sampling.proximity_radius)
    }

    fn require_domain(&self) -> FieldResult<DomainBounds> {
        self.domain.ok_or(FieldError::UninitializedDomain)
    }

    /// Traces a single field line from `x0` with the configured step settings.
    pub fn trace(&self, x0: Vec2, direction: TraceDirection) -> FieldResult<FieldLine> {
        let bounds = self.require_domain()?;
        let field = self.charges.field();
        FieldLineTracer::new(&field, bounds).trace(x0, &self.config.tracing.params(direction))
    }

    /// Places flux-weighted seed points around every charged object.
    ///
    /// Uncharged objects get no seeds. When the weighted placement is not
    /// possible (the field crosses the circle in both directions, or has no
    /// flux at all) the seeds fall back to even spacing.
    pub fn seed_circles(&self) -> FieldResult<Vec<SeedCircle>> {
        let seeding = &self.config.seeding;
        let field = self.charges.field();
        let mut seeds = Vec::new();

        for (charge_index, charge) in self.charges.iter().enumerate() {
            let n = seeding.line_count(charge.q())?;
            if charge.q() == 0.0 || n == 0 {
                debug!("Charge {} carries no field lines.", charge_index);
                continue;
            }
            let radius = self.seed_radius(charge_index, charge);
            let circle = GaussianCircle::new(charge.center(), radius).with_offset(seeding.angular_offset_deg.to_radians());

            let (points, fell_back_to_uniform) = match circle.fluxpoints(&field, n, seeding.uniform) {
                Ok(points) => (points, false),
                Err(e @ (FieldError::AmbiguousFluxSign { .. }
                | FieldError::ZeroFlux { .. }
                | FieldError::InconsistentFlux { .. })) => {
                    warn!("Charge {}: flux-weighted seeding failed ({}); spacing seeds evenly.", charge_index, e);
                    (circle.fluxpoints(&field, n, true)?, true)
                }
                Err(e) => return Err(e),
            };
            debug!("Charge {}: {} seeds on radius {:.2}.", charge_index, points.len(), radius);
            seeds.push(SeedCircle { charge_index, circle, fell_back_to_uniform, points });
        }
        Ok(seeds)
    }

    /// Radius of the seed circle around `charge`.
    ///
    /// Nominally the configured radius around a point charge, or half the
    /// segment plus that radius around a line charge's midpoint. It is capped
    /// at half the distance to the nearest other charged object so the
    /// circle never reaches into a neighbour's flux.
    fn seed_radius(&self, charge_index: usize, charge: &Charge) -> f64 {
        let seeding = &self.config.seeding;
        let nominal = match charge {
            Charge::Point(_) => seeding.radius,
            Charge::Line(line) => line.length() / 2.0 + seeding.radius,
        };
        let center = charge.center();
        let nearest = self
            .charges
            .iter()
            .enumerate()
            .filter(|&(i, other)| i != charge_index && other.q() != 0.0)
            .map(|(_, other)| other.distance_to(center))
            .fold(f64::INFINITY, f64::min);
        let capped = nominal.min(nearest / 2.0);
        if capped > 0.0 {
            capped
        } else {
            // Overlapping charges; nothing smaller would separate them.
            nominal
        }
    }

    /// Traces one line per seed, away from the charge that owns it (parallel).
    pub fn trace_field_lines(&self, seeds: &[SeedCircle]) -> FieldResult<Vec<TracedLine>> {
        let bounds = self.require_domain()?;
        let field = self.charges.field();
        let tracer = FieldLineTracer::new(&field, bounds);

        let jobs: Vec<(usize, TraceDirection, Vec2)> = seeds
            .iter()
            .flat_map(|seed| {
                let direction = match self.charges.get(seed.charge_index) {
                    Some(c) if c.q() < 0.0 => TraceDirection::Backward,
                    _ => TraceDirection::Forward,
                };
                seed.points.iter().map(move |&p| (seed.charge_index, direction, p))
            })
            .collect();

        jobs.par_iter()
            .map(|&(charge_index, direction, x0)| -> FieldResult<TracedLine> {
                let line = tracer.trace(x0, &self.config.tracing.params(direction))?;
                Ok(TracedLine { charge_index, direction, line })
            })
            .collect()
    }

    /// Field arrows over the tracing domain, culled per the sampling settings.
    pub fn sample_arrows(&self) -> FieldResult<Vec<ArrowSample>> {
        let bounds = self.require_domain()?;
        let sampling = &self.config.sampling;
        let culling = ArrowCulling {
            min_distance: sampling.arrow_min_distance,
            max_distance: sampling.arrow_max_distance,
        };
        arrow_grid(&self.charges.field(), &bounds, sampling.arrow_spacing, &culling)
    }

    /// Potential over the zoomed and panned view window.
    pub fn sample_potential(&self) -> Result<PotentialGrid> {
        let window = match &self.config.domain {
            Some(domain) => domain.view_window()?,
            None => self.require_domain()?,
        };
        Ok(potential_grid(&self.charges.potential(), &window, self.config.sampling.potential_resolution))
    }

    /// Computes seeds, field lines, arrows and the potential grid for the
    /// current charges.
    pub fn record_snapshot(&self) -> Result<FieldSnapshot> {
        let domain = self.require_domain()?;
        let seeds = self.seed_circles()?;
        let field_lines = self.trace_field_lines(&seeds)?;
        let arrows = self.sample_arrows()?;
        let potential = self.sample_potential()?;

        let fallbacks = seeds.iter().filter(|s| s.fell_back_to_uniform).count();
        info!(
            "Snapshot: {} charges | {} seed circles ({} uniform fallbacks) | {} field lines | {} arrows | {}x{} potential grid",
            self.charges.len(),
            seeds.len(),
            fallbacks,
            field_lines.len(),
            arrows.len(),
            potential.resolution,
            potential.resolution
        );

        Ok(FieldSnapshot {
            charges: self.charges.as_slice().to_vec(),
            domain,
            seeds,
            field_lines,
            arrows,
            potential: Some(potential),
        })
    }
}
