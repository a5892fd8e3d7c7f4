use crate::charge::ChargeSpec;
use crate::charge_set::ChargeSet;
use crate::domain::DomainBounds;
use crate::error::{FieldError, FieldResult};
use crate::flux::FLUX_SAMPLES;
use crate::presets::Preset;
use crate::tracer::{TraceDirection, TraceParams, DEFAULT_MAX_STEPS, DEFAULT_STEP_SIZE};
use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

// Screen the scene is viewed on; world bounds derive from it.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct DomainConfig {
    pub screen_width: u32,
    pub screen_height: u32,
    #[serde(default = "default_zoom")]
    pub zoom: f64,
    #[serde(default)]
    pub x_offset: f64,
}

impl DomainConfig {
    /// Bounds field lines are traced inside.
    pub fn bounds(&self) -> Result<DomainBounds> {
        Ok(DomainBounds::from_screen(self.screen_width, self.screen_height)?)
    }

    /// Window the potential is sampled over (zoom and pan applied).
    pub fn view_window(&self) -> Result<DomainBounds> {
        Ok(self.bounds()?.view_window(self.zoom, self.x_offset)?)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct TracingConfig {
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    #[serde(default = "default_step_size")]
    pub step_size: f64,
}

impl Default for TracingConfig {
    fn default() -> Self {
        TracingConfig { max_steps: DEFAULT_MAX_STEPS, step_size: DEFAULT_STEP_SIZE }
    }
}

impl TracingConfig {
    pub fn params(&self, direction: TraceDirection) -> TraceParams {
        TraceParams { max_steps: self.max_steps, step_size: self.step_size, direction }
    }
}

/// Most field lines a single charge may start.
pub const MAX_LINES_PER_CHARGE: usize = FLUX_SAMPLES - 1;

/// Most samples along one axis of the arrow grid.
pub const MAX_ARROWS_PER_AXIS: usize = 4096;

/// Largest accepted potential grid resolution.
pub const MAX_POTENTIAL_RESOLUTION: usize = 4096;

// Where field lines start: flux-weighted points on a small circle per charge.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SeedingConfig {
    #[serde(default = "default_seed_radius")]
    pub radius: f64,
    #[serde(default = "default_lines_per_unit_charge")]
    pub lines_per_unit_charge: f64,
    #[serde(default = "default_unit_charge")]
    pub unit_charge: f64,
    #[serde(default)]
    pub uniform: bool,
    #[serde(default)]
    pub angular_offset_deg: f64,
}

impl Default for SeedingConfig {
    fn default() -> Self {
        SeedingConfig {
            radius: default_seed_radius(),
            lines_per_unit_charge: default_lines_per_unit_charge(),
            unit_charge: default_unit_charge(),
            uniform: false,
            angular_offset_deg: 0.0,
        }
    }
}

impl SeedingConfig {
    /// Number of lines to start at a charge of magnitude `q`, at most
    /// [`MAX_LINES_PER_CHARGE`].
    pub fn line_count(&self, q: f64) -> FieldResult<usize> {
        let count = (self.lines_per_unit_charge * q.abs() / self.unit_charge).round();
        if !(count <= MAX_LINES_PER_CHARGE as f64) {
            return Err(FieldError::InvalidParameter {
                message: format!(
                    "charge {} would start {} field lines; the limit is {}",
                    q, count, MAX_LINES_PER_CHARGE
                ),
            });
        }
        Ok(count as usize)
    }
}

// Grid sampling for the potential heatmap and the arrow overlay.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SamplingConfig {
    #[serde(default = "default_potential_resolution")]
    pub potential_resolution: usize,
    #[serde(default = "default_arrow_spacing")]
    pub arrow_spacing: f64,
    #[serde(default)]
    pub arrow_min_distance: f64,
    #[serde(default)]
    pub arrow_max_distance: Option<f64>,
    #[serde(default = "default_proximity_radius")]
    pub proximity_radius: f64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        SamplingConfig {
            potential_resolution: default_potential_resolution(),
            arrow_spacing: default_arrow_spacing(),
            arrow_min_distance: 0.0,
            arrow_max_distance: None,
            proximity_radius: default_proximity_radius(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Bincode,
    Messagepack,
}

// Configuration for output settings
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct OutputConfig {
    pub base_filename: String,
    #[serde(default = "default_format")]
    pub format: OutputFormat,
    #[serde(default = "default_true")]
    pub save_snapshot: bool,
    #[serde(default)]
    pub save_field_lines_csv: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            base_filename: "electrostatics".to_string(),
            format: default_format(),
            save_snapshot: true,
            save_field_lines_csv: false,
        }
    }
}

// Main scenario configuration structure, loaded from config.toml.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub domain: Option<DomainConfig>,
    #[serde(default)]
    pub tracing: TracingConfig,
    #[serde(default)]
    pub seeding: SeedingConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub preset: Option<Preset>,
    #[serde(default)]
    pub charges: Vec<ChargeSpec>,
    #[serde(default)]
    pub output: OutputConfig,
}

impl ScenarioConfig {
    /// Loads the scenario configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path_ref.display(), e))?;
        let config = Self::from_toml_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Invalid config '{}': {}", path_ref.display(), e))?;
        info!("Loaded scenario configuration from '{}'.", path_ref.display());
        Ok(config)
    }

    /// Parses and validates a scenario from TOML text.
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: ScenarioConfig = toml::from_str(config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Scenario built from a preset with default settings.
    pub fn from_preset(preset: Preset, domain: Option<DomainConfig>) -> Self {
        ScenarioConfig {
            domain,
            tracing: TracingConfig::default(),
            seeding: SeedingConfig::default(),
            sampling: SamplingConfig::default(),
            preset: Some(preset),
            charges: Vec::new(),
            output: OutputConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(domain) = &self.domain {
            if domain.screen_width == 0 || domain.screen_height == 0 {
                anyhow::bail!("screen_width and screen_height must be greater than 0.");
            }
            if !(domain.zoom > 0.0) {
                anyhow::bail!("zoom must be positive.");
            }
        }
        if !(self.tracing.step_size > 0.0) {
            anyhow::bail!("step_size must be positive.");
        }
        if !(self.seeding.radius > 0.0) {
            anyhow::bail!("seeding radius must be positive.");
        }
        if !(self.seeding.unit_charge > 0.0) {
            anyhow::bail!("unit_charge must be positive.");
        }
        if !(self.seeding.lines_per_unit_charge >= 0.0) {
            anyhow::bail!("lines_per_unit_charge must not be negative.");
        }
        if self.sampling.potential_resolution < 2 || self.sampling.potential_resolution > MAX_POTENTIAL_RESOLUTION {
            anyhow::bail!("potential_resolution must be between 2 and {}.", MAX_POTENTIAL_RESOLUTION);
        }
        if !(self.sampling.arrow_spacing > 0.0) {
            anyhow::bail!("arrow_spacing must be positive.");
        }
        if let Some(domain) = &self.domain {
            let bounds = domain.bounds()?;
            let per_axis = bounds.width().max(bounds.height()) / self.sampling.arrow_spacing;
            if !(per_axis <= MAX_ARROWS_PER_AXIS as f64) {
                anyhow::bail!(
                    "arrow_spacing {} gives {:.0} arrows per axis; the limit is {}.",
                    self.sampling.arrow_spacing,
                    per_axis,
                    MAX_ARROWS_PER_AXIS
                );
            }
        }
        if let Some(max) = self.sampling.arrow_max_distance {
            if max <= self.sampling.arrow_min_distance {
                anyhow::bail!("arrow_max_distance must exceed arrow_min_distance.");
            }
        }
        if self.preset.is_some() && !self.charges.is_empty() {
            anyhow::bail!("Specify either a preset or explicit charges, not both.");
        }
        // Degenerate lines and oversized line counts fail at load time.
        let charges = ChargeSet::from_specs(&self.charge_specs())?;
        for charge in charges.iter() {
            self.seeding.line_count(charge.q())?;
        }
        Ok(())
    }

    /// Charge records this scenario starts from.
    pub fn charge_specs(&self) -> Vec<ChargeSpec> {
        match self.preset {
            Some(preset) => preset.charges(),
            None => self.charges.clone(),
        }
    }

    pub fn build_charges(&self) -> Result<ChargeSet> {
        Ok(ChargeSet::from_specs(&self.charge_specs())?)
    }
}

fn default_zoom() -> f64 {
    1.0
}

fn default_max_steps() -> usize {
    DEFAULT_MAX_STEPS
}

fn default_step_size() -> f64 {
    DEFAULT_STEP_SIZE
}

fn default_seed_radius() -> f64 {
    10.0
}

fn default_lines_per_unit_charge() -> f64 {
    8.0
}

fn default_unit_charge() -> f64 {
    1e-6
}

fn default_potential_resolution() -> usize {
    200
}

fn default_arrow_spacing() -> f64 {
    40.0
}

fn default_proximity_radius() -> f64 {
    crate::charge::DEFAULT_PROXIMITY_RADIUS
}

fn default_format() -> OutputFormat {
    OutputFormat::Json
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"
        [domain]
        screen_width = 800
        screen_height = 600
        zoom = 2.0

        [tracing]
        max_steps = 150

        [[charges]]
        type = "point"
        x = -80.0
        y = 0.0
        q = 1e-6

        [[charges]]
        type = "line"
        q = -1e-6
        start = [40.0, -120.0]
        end = [40.0, 120.0]

        [output]
        base_filename = "two_charges"
        format = "bincode"
    "#;

    #[test]
    fn parses_full_scenario() {
        let config = ScenarioConfig::from_toml_str(SCENARIO).unwrap();
        let domain = config.domain.as_ref().unwrap();
        assert_eq!(domain.bounds().unwrap(), DomainBounds::from_screen(800, 600).unwrap());
        assert_eq!(domain.view_window().unwrap().xmax, 200.0);
        assert_eq!(config.tracing.max_steps, 150);
        assert_eq!(config.tracing.step_size, DEFAULT_STEP_SIZE);
        assert_eq!(config.seeding, SeedingConfig::default());
        assert_eq!(config.output.format, OutputFormat::Bincode);
        assert!(config.output.save_snapshot);
        assert_eq!(config.build_charges().unwrap().len(), 2);
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = ScenarioConfig::from_toml_str("").unwrap();
        assert!(config.domain.is_none());
        assert!(config.build_charges().unwrap().is_empty());
        assert_eq!(config.sampling.potential_resolution, 200);
        assert_eq!(config.output.base_filename, "electrostatics");
    }

    #[test]
    fn preset_supplies_charges() {
        let config = ScenarioConfig::from_toml_str("preset = \"two_lines\"").unwrap();
        assert_eq!(config.preset, Some(Preset::TwoLines));
        assert_eq!(config.build_charges().unwrap().len(), 2);
    }

    #[test]
    fn rejects_invalid_settings() {
        let degenerate = r#"
            [[charges]]
            type = "line"
            q = 1.0
            start = [1.0, 1.0]
            end = [1.0, 1.0]
        "#;
        assert!(ScenarioConfig::from_toml_str(degenerate).is_err());
        assert!(ScenarioConfig::from_toml_str("[tracing]\nstep_size = 0.0").is_err());
        assert!(ScenarioConfig::from_toml_str("[sampling]\narrow_min_distance = 5.0\narrow_max_distance = 1.0").is_err());
        assert!(ScenarioConfig::from_toml_str("[domain]\nscreen_width = 0\nscreen_height = 10").is_err());

        let both = "preset = \"dipole\"\n[[charges]]\ntype = \"point\"\nx = 0.0\ny = 0.0\nq = 1.0";
        assert!(ScenarioConfig::from_toml_str(both).is_err());
    }

    #[test]
    fn line_count_scales_with_charge() {
        let seeding = SeedingConfig::default();
        assert_eq!(seeding.line_count(1e-6).unwrap(), 8);
        assert_eq!(seeding.line_count(-4e-6).unwrap(), 32);
        assert_eq!(seeding.line_count(0.0).unwrap(), 0);
        assert_eq!(seeding.line_count(125e-6).unwrap(), MAX_LINES_PER_CHARGE);
        assert!(seeding.line_count(126e-6).is_err());
        assert!(seeding.line_count(f64::INFINITY).is_err());
    }

    #[test]
    fn rejects_unbounded_line_counts() {
        let dense = r#"
            [seeding]
            lines_per_unit_charge = 1e30

            [[charges]]
            type = "point"
            x = 0.0
            y = 0.0
            q = 1e-6
        "#;
        assert!(ScenarioConfig::from_toml_str(dense).is_err());
        // The same density is fine while there are no charges to seed.
        assert!(ScenarioConfig::from_toml_str("[seeding]\nlines_per_unit_charge = 1e30").is_ok());
    }

    #[test]
    fn rejects_unbounded_sample_grids() {
        let fine = r#"
            [domain]
            screen_width = 800
            screen_height = 600

            [sampling]
            arrow_spacing = 1e-300
        "#;
        assert!(ScenarioConfig::from_toml_str(fine).is_err());
        assert!(ScenarioConfig::from_toml_str("[sampling]\npotential_resolution = 100000").is_err());

        let coarse = "[domain]\nscreen_width = 800\nscreen_height = 600\n[sampling]\narrow_spacing = 0.5";
        assert!(ScenarioConfig::from_toml_str(coarse).is_ok());
    }
}
