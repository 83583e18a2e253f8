//! Tube parameters encoded in the entity layer name.
//!
//! Layout: `name_od_wall[_heat[_parallel[_resistance[_orificeIn[_orificeOut[_heatFactor[_enthalpy]]]]]]]`.
//! The first three fields are mandatory. Every later field is read only when all
//! fields before it were present; an unreadable optional field stops parsing and
//! leaves the rest at their defaults.

use serde::{Deserialize, Serialize};

const OPTIONAL_FIELDS: [&str; 7] = [
    "heat per length",
    "parallel count",
    "extra resistance",
    "inlet orifice",
    "outlet orifice",
    "heat factor",
    "inlet enthalpy",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TubeMetadata {
    pub name: String,
    pub outer_diameter: f64,
    pub wall_thickness: f64,
    /// Heat absorbed per metre of tube; turned into an absolute value by the validator.
    pub heat_per_length: f64,
    pub parallel_count: u32,
    pub extra_resistance: f64,
    pub inlet_orifice: f64,
    pub outlet_orifice: f64,
    pub heat_factor: f64,
    pub inlet_enthalpy: f64,
}

impl TubeMetadata {
    fn with_mandatory(name: String, outer_diameter: f64, wall_thickness: f64) -> Self {
        Self {
            name,
            outer_diameter,
            wall_thickness,
            heat_per_length: 0.0,
            parallel_count: 1,
            extra_resistance: 0.0,
            inlet_orifice: 0.0,
            outlet_orifice: 0.0,
            heat_factor: 1.0,
            inlet_enthalpy: 0.0,
        }
    }

    pub fn parse(text: &str) -> MetadataParse {
        parse_metadata(text)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetadataProblem {
    #[error("layer text has no tube name")]
    MissingName,
    #[error("layer text lacks mandatory field `{field}`")]
    MissingField { field: &'static str },
    #[error("mandatory field `{field}` is not a number: {raw:?}")]
    InvalidMandatory { field: &'static str, raw: String },
    #[error("optional field `{field}` is not valid: {raw:?}; remaining fields use defaults")]
    InvalidOptional { field: &'static str, raw: String },
}

impl MetadataProblem {
    pub fn rejects_tube(&self) -> bool {
        !matches!(self, MetadataProblem::InvalidOptional { .. })
    }
}

/// `metadata` is `None` exactly when a mandatory field failed.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataParse {
    pub metadata: Option<TubeMetadata>,
    pub problems: Vec<MetadataProblem>,
}

fn parse_metadata(text: &str) -> MetadataParse {
    let mut fields = text.split('_').map(str::trim);
    let mut problems = Vec::new();

    let name = match fields.next() {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => {
            problems.push(MetadataProblem::MissingName);
            return MetadataParse {
                metadata: None,
                problems,
            };
        }
    };

    let mut mandatory = [0.0f64; 2];
    for (slot, field) in mandatory.iter_mut().zip(["outer diameter", "wall thickness"]) {
        match fields.next() {
            None | Some("") => problems.push(MetadataProblem::MissingField { field }),
            Some(raw) => match parse_number(raw) {
                Some(v) => *slot = v,
                None => problems.push(MetadataProblem::InvalidMandatory {
                    field,
                    raw: raw.to_string(),
                }),
            },
        }
    }
    if !problems.is_empty() {
        return MetadataParse {
            metadata: None,
            problems,
        };
    }

    let mut meta = TubeMetadata::with_mandatory(name, mandatory[0], mandatory[1]);
    for field in OPTIONAL_FIELDS {
        let raw = match fields.next() {
            None | Some("") => break,
            Some(raw) => raw,
        };
        if !apply_optional(&mut meta, field, raw) {
            problems.push(MetadataProblem::InvalidOptional {
                field,
                raw: raw.to_string(),
            });
            break;
        }
    }

    MetadataParse {
        metadata: Some(meta),
        problems,
    }
}

fn apply_optional(meta: &mut TubeMetadata, field: &str, raw: &str) -> bool {
    if field == "parallel count" {
        return match raw.parse::<u32>() {
            Ok(n) if n > 0 => {
                meta.parallel_count = n;
                true
            }
            _ => false,
        };
    }
    let Some(v) = parse_number(raw) else {
        return false;
    };
    match field {
        "heat per length" => meta.heat_per_length = v,
        "extra resistance" => meta.extra_resistance = v,
        "inlet orifice" => meta.inlet_orifice = v,
        "outlet orifice" => meta.outlet_orifice = v,
        "heat factor" => meta.heat_factor = v,
        "inlet enthalpy" => meta.inlet_enthalpy = v,
        _ => return false,
    }
    true
}

/// Accepts a decimal comma, since layer names are typed by hand.
fn parse_number(raw: &str) -> Option<f64> {
    let v: f64 = raw.replace(',', ".").parse().ok()?;
    v.is_finite().then_some(v)
}
