use anyhow::Result;
use tubenet_core::mesh::{write_mesh, SolverParams};
use tubenet_core::model::{TubeCandidate, TubeNetwork};
use tubenet_core::overlay::{DrawingSink, Overlay};
use tubenet_core::report::{ErrorReport, IssueKind};
use tubenet_core::validate::{load_candidates, ConflictPrompt, LoadConfig};

pub mod intersect;
pub mod structs;
pub mod topology;

use intersect::{find_intersections, IntersectionConfig};
use structs::RunSummary;
use topology::{check_topology, TopologyConfig};

#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub load: LoadConfig,
    pub topology: TopologyConfig,
    pub intersections: IntersectionConfig,
}

/// Frozen result of one run: the network plus everything reported about it.
#[derive(Debug, Clone)]
pub struct CheckedDrawing {
    pub network: TubeNetwork,
    pub report: ErrorReport,
    pub synthesized: usize,
}

impl CheckedDrawing {
    pub fn is_clean(&self) -> bool {
        !self.report.has_errors()
    }

    /// Solver input, only for drawings without reported errors.
    pub fn mesh(&self, source_name: &str, params: &SolverParams) -> Option<String> {
        self.is_clean()
            .then(|| write_mesh(&self.network, source_name, params))
    }

    /// Numbering overlay for a clean drawing, error overlay otherwise.
    pub fn draw<S: DrawingSink>(&self, sink: &mut S) {
        let mut overlay = Overlay::new(sink);
        if self.is_clean() {
            overlay.draw_numbering(&self.network);
        } else {
            overlay.draw_errors(&self.network, &self.report);
        }
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            clean: self.is_clean(),
            points: self.network.points().len(),
            tubes: self.network.tubes.len(),
            synthesized_tubes: self.synthesized,
            orphans: self.report.orphans.len(),
            tube_errors: self.report.tube_errors.len(),
            intersections: self.report.count(IssueKind::Intersection),
            issues: self.report.issues.clone(),
        }
    }
}

/// Validate, then check topology, then look for crossing tubes.
pub fn check_drawing(
    candidates: &[TubeCandidate],
    cfg: &PipelineConfig,
    prompt: Option<&mut dyn ConflictPrompt>,
) -> Result<CheckedDrawing> {
    let (mut network, mut report) = load_candidates(candidates, &cfg.load, prompt);
    tracing::info!(
        records = candidates.len(),
        points = network.points().len(),
        tubes = network.tubes.len(),
        "drawing loaded"
    );

    let topo = check_topology(&mut network, &mut report, &cfg.topology)?;

    let crossings = find_intersections(&network, &cfg.intersections);
    for c in &crossings {
        report.report_intersection(
            c.at,
            format!(
                "tubes {} and {} cross",
                network.tubes[c.first].name, network.tubes[c.second].name
            ),
        );
    }
    tracing::info!(
        crossings = crossings.len(),
        issues = report.issues.len(),
        "drawing checked"
    );

    Ok(CheckedDrawing {
        network,
        report,
        synthesized: topo.synthesized.len(),
    })
}
