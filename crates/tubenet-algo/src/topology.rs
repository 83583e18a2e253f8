use crate::structs::DrumSpec;
use anyhow::{bail, Result};
use tracing::info;
use tubenet_core::model::{Tube, TubeNetwork, TubeShape, DRUM_CENTER_INDEX};
use tubenet_core::report::ErrorReport;

#[derive(Debug, Clone)]
pub struct TopologyConfig {
    /// Above this many orphans the drawing is treated as a dual-drum boiler.
    pub dual_drum_orphan_threshold: usize,
    pub drums: Vec<DrumSpec>,
    pub drum_shell_margin: f64,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            dual_drum_orphan_threshold: 10,
            drums: Vec::new(),
            drum_shell_margin: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopologyOutcome {
    pub orphans: Vec<usize>,
    pub synthesized: Vec<usize>,
}

/// Points (other than `hubs`) with fewer than two incident tubes.
pub fn find_orphans(network: &TubeNetwork, hubs: &[usize]) -> Vec<usize> {
    network
        .points()
        .iter()
        .enumerate()
        .filter(|(idx, p)| !hubs.contains(idx) && p.tube_count < 2)
        .map(|(idx, _)| idx)
        .collect()
}

/// Flags orphan points, first wiring shell points to their drums when the drawing
/// looks like a dual-drum boiler with omitted shell connections.
pub fn check_topology(
    network: &mut TubeNetwork,
    report: &mut ErrorReport,
    cfg: &TopologyConfig,
) -> Result<TopologyOutcome> {
    for drum in &cfg.drums {
        if drum.diameter.is_nan() || drum.diameter <= 0.0 || drum.wall_thickness < 0.0 {
            bail!("invalid drum specification: {drum:?}");
        }
        if drum.wall_thickness * 2.0 >= drum.diameter {
            bail!("drum wall thickness {} leaves no bore", drum.wall_thickness);
        }
    }

    network.recount();
    let mut hubs = vec![DRUM_CENTER_INDEX];
    let mut orphans = find_orphans(network, &hubs);
    let mut synthesized = Vec::new();

    if orphans.len() > cfg.dual_drum_orphan_threshold && !cfg.drums.is_empty() {
        info!(
            orphans = orphans.len(),
            drums = cfg.drums.len(),
            "connecting shell points to drums"
        );
        for (k, drum) in cfg.drums.iter().enumerate() {
            let mut hub = None;
            let mut remaining = Vec::with_capacity(orphans.len());
            for idx in orphans {
                let pos = network.points()[idx].pos();
                if !drum.shell_holds(pos, cfg.drum_shell_margin) {
                    remaining.push(idx);
                    continue;
                }
                let center = *hub.get_or_insert_with(|| network.registry.find_or_insert(drum.center));
                if idx == center {
                    remaining.push(idx);
                    continue;
                }
                let tube = drum_tube(network, k, drum, idx, center);
                network.tubes.push(tube);
                synthesized.push(network.tubes.len() - 1);
            }
            if let Some(center) = hub {
                if !hubs.contains(&center) {
                    hubs.push(center);
                }
            }
            orphans = remaining;
        }
        network.recount();
        orphans = find_orphans(network, &hubs);
    }

    for &idx in &orphans {
        let at = network.points()[idx].pos();
        report.report_orphan(idx, at);
    }
    info!(
        orphans = orphans.len(),
        synthesized = synthesized.len(),
        "topology checked"
    );
    Ok(TopologyOutcome {
        orphans,
        synthesized,
    })
}

/// Straight connector from a shell point to the drum center. Sizes follow the
/// single tube already at the point, or the drum wall when there is none.
fn drum_tube(network: &TubeNetwork, k: usize, drum: &DrumSpec, point: usize, hub: usize) -> Tube {
    let template = network.tubes.iter().find(|t| t.touches(point));
    let (outer_diameter, wall_thickness) = match template {
        Some(t) => (t.outer_diameter, t.wall_thickness),
        None => (drum.diameter, drum.wall_thickness),
    };
    let points = network.points();
    Tube {
        name: format!("DRUM{}_{point}", k + 1),
        point_in: point,
        point_out: hub,
        outer_diameter,
        wall_thickness,
        shape: TubeShape::Straight,
        length: points[point].pos().distance(points[hub].pos()),
        heat_absorption: 0.0,
        parallel_count: 1,
        extra_resistance: 0.0,
        inlet_orifice: 0.0,
        outlet_orifice: 0.0,
        heat_factor: 1.0,
        inlet_enthalpy: 0.0,
        metadata_text: String::new(),
    }
}
