use thiserror::Error;

/// Failures surfaced by field, tracing and flux operations.
///
/// Singular evaluations (sampling exactly on a charge) are not errors; they
/// resolve to zero where they happen.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error("Degenerate line charge: endpoints coincide at ({x}, {y})")]
    DegenerateGeometry { x: f64, y: f64 },

    #[error("Flux through Gaussian circle at ({cx}, {cy}) changes sign; cannot place field lines")]
    AmbiguousFluxSign { cx: f64, cy: f64 },

    #[error("Field is zero everywhere on Gaussian circle at ({cx}, {cy}); flux is undefined")]
    ZeroFlux { cx: f64, cy: f64 },

    #[error("Integrated flux {integrated} does not match summed flux {summed}")]
    InconsistentFlux { integrated: f64, summed: f64 },

    #[error("Domain bounds have not been configured")]
    UninitializedDomain,

    #[error("Invalid domain bounds: x in [{xmin}, {xmax}], y in [{ymin}, {ymax}]")]
    InvalidDomain { xmin: f64, xmax: f64, ymin: f64, ymax: f64 },

    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    #[error("Unknown preset scenario '{name}'")]
    UnknownPreset { name: String },
}

pub type FieldResult<T> = Result<T, FieldError>;
