use crate::charge::ChargeSpec;
use crate::error::FieldError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ready-made charge arrangements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    Blank,
    Dipole,
    FalseMonopole,
    LinePoint,
    TwoLines,
    Quadrupole,
}

impl Preset {
    pub const ALL: [Preset; 6] = [
        Preset::Blank,
        Preset::Dipole,
        Preset::FalseMonopole,
        Preset::LinePoint,
        Preset::TwoLines,
        Preset::Quadrupole,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Blank => "blank",
            Preset::Dipole => "dipole",
            Preset::FalseMonopole => "false_monopole",
            Preset::LinePoint => "line_point",
            Preset::TwoLines => "two_lines",
            Preset::Quadrupole => "quadrupole",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Preset::Blank => "no charges",
            Preset::Dipole => "equal and opposite point charges on the x axis",
            Preset::FalseMonopole => "four positive charges around a compensating negative centre",
            Preset::LinePoint => "positive line charge facing a negative point charge",
            Preset::TwoLines => "parallel line charges of opposite sign",
            Preset::Quadrupole => "alternating charges on the axes with a neutral centre marker",
        }
    }

    pub fn charges(self) -> Vec<ChargeSpec> {
        let point = |x, y, q| ChargeSpec::Point { x, y, q };
        let line = |q, start, end| ChargeSpec::Line { q, start, end };
        match self {
            Preset::Blank => Vec::new(),
            Preset::Dipole => vec![point(-80.0, 0.0, 1e-6), point(80.0, 0.0, -1e-6)],
            Preset::FalseMonopole => vec![
                point(-160.0, 0.0, 1e-6),
                point(160.0, 0.0, 1e-6),
                point(0.0, -160.0, 1e-6),
                point(0.0, 160.0, 1e-6),
                point(0.0, 0.0, -4e-6),
            ],
            Preset::LinePoint => vec![
                line(1e-6, [-80.0, -160.0], [-80.0, 160.0]),
                point(80.0, 0.0, -1e-6),
            ],
            Preset::TwoLines => vec![
                line(1e-6, [-40.0, -120.0], [-40.0, 120.0]),
                line(-1e-6, [40.0, -120.0], [40.0, 120.0]),
            ],
            Preset::Quadrupole => vec![
                point(-160.0, 0.0, 1e-6),
                point(160.0, 0.0, 1e-6),
                point(0.0, -160.0, -1e-6),
                point(0.0, 160.0, -1e-6),
                point(0.0, 0.0, 0.0),
            ],
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Preset::ALL
            .into_iter()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| FieldError::UnknownPreset { name: s.to_string() })
    }
}
