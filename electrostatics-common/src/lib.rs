pub mod charge;
pub mod charge_set;
pub mod config;
pub mod domain;
pub mod error;
pub mod field;
pub mod flux;
pub mod potential;
pub mod presets;
pub mod snapshot;
pub mod tracer;
pub mod vecmath;

// Re-export key types for easier use by dependent crates
pub use charge::{Charge, ChargeSpec, LineCharge, PointCharge, DEFAULT_PROXIMITY_RADIUS};
pub use charge_set::{ChargeSet, LineEnd};
pub use config::{
    DomainConfig, OutputConfig, OutputFormat, SamplingConfig, ScenarioConfig, SeedingConfig, TracingConfig,
    MAX_ARROWS_PER_AXIS, MAX_LINES_PER_CHARGE, MAX_POTENTIAL_RESOLUTION,
};
pub use domain::DomainBounds;
pub use error::{FieldError, FieldResult};
pub use field::{ElectricField, VectorField};
pub use flux::{GaussianCircle, FLUX_SAMPLES};
pub use potential::Potential;
pub use presets::Preset;
pub use snapshot::{log_scale_potential, ArrowSample, FieldSnapshot, PotentialGrid, SeedCircle, TracedLine};
pub use tracer::{FieldLine, FieldLineTracer, Termination, TraceDirection, TraceParams};
pub use vecmath::{angle_to_vec, vec_to_angle, Vec2};
