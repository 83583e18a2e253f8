use crate::model::TubeNetwork;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

pub const TUBE_SECTION_MARKER: &str = "TubeData";

/// Run parameters written into the mesh header for the circulation solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverParams {
    pub max_iterations: u32,
    pub tolerance: f64,
    pub verbosity: u8,
    pub method: char,
    /// Drum pressure, bar.
    pub pressure: f64,
    /// Absolute tube roughness, mm.
    pub roughness: f64,
    pub level_factor: f64,
    pub drum_level_offset: f64,
    pub drum_resistance: f64,
    pub start_circulation_ratio: f64,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-4,
            verbosity: 0,
            method: 'N',
            pressure: 100.0,
            roughness: 0.05,
            level_factor: 1.0,
            drum_level_offset: 0.0,
            drum_resistance: 0.0,
            start_circulation_ratio: 10.0,
        }
    }
}

/// Renders the solver input. Output depends only on the network and parameters.
pub fn write_mesh(network: &TubeNetwork, source_name: &str, params: &SolverParams) -> String {
    let mut out = String::new();
    let name = if source_name.trim().is_empty() {
        "tubenet"
    } else {
        source_name.trim()
    };

    let _ = writeln!(out, "{name}");
    let _ = writeln!(
        out,
        "{} {} {} {}",
        params.max_iterations,
        num(params.tolerance),
        params.verbosity,
        params.method
    );
    let _ = writeln!(
        out,
        "{} {} {} {} {} {}",
        num(params.pressure),
        num(params.roughness),
        num(params.level_factor),
        num(params.drum_level_offset),
        num(params.drum_resistance),
        num(params.start_circulation_ratio)
    );

    for (idx, p) in network.points().iter().enumerate() {
        let _ = writeln!(
            out,
            "{idx:>6}{:>14.3}{:>14.3}{:>14.3}",
            clean(p.x),
            clean(p.y),
            clean(p.z)
        );
    }

    let _ = writeln!(out, "{TUBE_SECTION_MARKER}");
    for (idx, t) in network.tubes.iter().enumerate() {
        let _ = writeln!(out, "{}", t.name);
        let _ = writeln!(
            out,
            "{idx:>6}{:>6}{:>6}{:>10.2}{:>8.2}{:>12.1}{:>10.1}{:>12.3}{:>4}{:>10.3}{:>8.2}{:>8.2}{:>8.3}{:>10.2}",
            t.point_in,
            t.point_out,
            clean(t.outer_diameter),
            clean(t.wall_thickness),
            clean(t.length),
            clean(t.bend_radius()),
            clean(t.heat_absorption),
            t.parallel_count,
            clean(t.extra_resistance),
            clean(t.inlet_orifice),
            clean(t.outlet_orifice),
            clean(t.heat_factor),
            clean(t.inlet_enthalpy)
        );
    }
    out
}

fn num(v: f64) -> String {
    format!("{}", clean(v))
}

// Keeps "-0.000" and NaN out of the file.
fn clean(v: f64) -> f64 {
    if !v.is_finite() || v == 0.0 {
        0.0
    } else {
        v
    }
}
