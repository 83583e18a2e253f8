use crate::geom::{same_span, Vec3};
use crate::metadata::{MetadataProblem, TubeMetadata};
use crate::model::{Tube, TubeCandidate, TubeNetwork};
use crate::registry::{PointRegistry, POINT_TOLERANCE};
use crate::report::{ErrorReport, IssueKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What to do when a candidate has the same endpoints as an accepted tube but a
/// different layer text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    /// Keep the earlier tube, drop the candidate without reporting.
    AutoReject,
    /// Reject both tubes and anchor one error at their shared midpoint.
    #[default]
    AutoReport,
    /// Ask a [`ConflictPrompt`]; falls back to `AutoReport` when none is attached.
    PromptCaller,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictDecision {
    KeepExisting,
    Report,
}

pub trait ConflictPrompt {
    fn resolve(&mut self, existing: &Tube, candidate: &TubeCandidate) -> ConflictDecision;
}

#[derive(Debug, Clone)]
pub struct LoadConfig {
    pub point_tolerance: f64,
    pub min_tube_length: f64,
    pub min_inner_diameter: f64,
    pub conflict_policy: ConflictPolicy,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            point_tolerance: POINT_TOLERANCE,
            min_tube_length: 10.0,
            min_inner_diameter: 5.0,
            conflict_policy: ConflictPolicy::AutoReport,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    Degenerate,
    ExactDuplicate { existing: usize },
    Conflict,
    Metadata,
    Geometry,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Index into [`TubeValidator::tubes`]. It stays valid for the validator's
    /// lifetime; `finish` drops withdrawn tubes and renumbers the rest.
    Accepted(usize),
    Rejected(Rejection),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted(_))
    }
}

/// Turns parsed candidates into tubes. A candidate is appended only after every
/// check passes, so rejected records leave no points or tubes behind.
pub struct TubeValidator<'p> {
    cfg: LoadConfig,
    registry: PointRegistry,
    tubes: Vec<Tube>,
    /// Raw endpoints of each accepted tube, index-aligned with `tubes`.
    spans: Vec<(Vec3, Vec3)>,
    /// Set for tubes taken back after an overlap conflict.
    withdrawn: Vec<bool>,
    /// Spans already reported as conflicting.
    conflicts: Vec<(Vec3, Vec3)>,
    report: ErrorReport,
    prompt: Option<&'p mut dyn ConflictPrompt>,
}

impl<'p> TubeValidator<'p> {
    pub fn new(cfg: LoadConfig) -> Self {
        let registry = PointRegistry::with_tolerance(cfg.point_tolerance);
        Self {
            cfg,
            registry,
            tubes: Vec::new(),
            spans: Vec::new(),
            withdrawn: Vec::new(),
            conflicts: Vec::new(),
            report: ErrorReport::default(),
            prompt: None,
        }
    }

    pub fn with_prompt(mut self, prompt: &'p mut dyn ConflictPrompt) -> Self {
        self.prompt = Some(prompt);
        self
    }

    /// Every accepted tube, including ones withdrawn by a later conflict.
    pub fn tubes(&self) -> &[Tube] {
        &self.tubes
    }

    pub fn is_withdrawn(&self, idx: usize) -> bool {
        self.withdrawn.get(idx).copied().unwrap_or(false)
    }

    pub fn report(&self) -> &ErrorReport {
        &self.report
    }

    pub fn validate(&mut self, cand: &TubeCandidate) -> Verdict {
        let tol = self.cfg.point_tolerance;
        let anchor = cand.anchor();

        if cand.start.approx_eq(cand.end, tol) {
            self.report.report_tube(
                IssueKind::DegenerateTube,
                anchor,
                format!(
                    "tube {:?} (line {}) has coincident endpoints",
                    cand.layer, cand.source_line
                ),
            );
            return Verdict::Rejected(Rejection::Degenerate);
        }

        if let Some(rejection) = self.check_overlap(cand, anchor) {
            return Verdict::Rejected(rejection);
        }

        let parsed = TubeMetadata::parse(&cand.layer);
        let (fatal, warnings): (Vec<_>, Vec<_>) =
            parsed.problems.iter().partition(|p| p.rejects_tube());
        if !warnings.is_empty() {
            self.report.report_tube(
                IssueKind::InvalidMetadata,
                anchor,
                describe(&cand.layer, cand.source_line, &warnings),
            );
        }
        let meta = match parsed.metadata {
            Some(meta) if fatal.is_empty() => meta,
            _ => {
                self.report.report_tube(
                    IssueKind::InvalidMetadata,
                    anchor,
                    describe(&cand.layer, cand.source_line, &fatal),
                );
                return Verdict::Rejected(Rejection::Metadata);
            }
        };

        let length = cand.length();
        let mut geometry_ok = true;
        if length < self.cfg.min_tube_length {
            self.report.report_tube(
                IssueKind::TubeTooShort,
                anchor,
                format!(
                    "tube {} is {length:.1} mm long, minimum is {} mm",
                    meta.name, self.cfg.min_tube_length
                ),
            );
            geometry_ok = false;
        }
        let inner = meta.outer_diameter - 2.0 * meta.wall_thickness;
        if inner < self.cfg.min_inner_diameter {
            self.report.report_tube(
                IssueKind::WallTooThick,
                anchor,
                format!(
                    "tube {} has inner diameter {inner:.1} mm, minimum is {} mm",
                    meta.name, self.cfg.min_inner_diameter
                ),
            );
            geometry_ok = false;
        }
        if !geometry_ok {
            return Verdict::Rejected(Rejection::Geometry);
        }

        if let (Some(a), Some(b)) = (self.registry.find(cand.start), self.registry.find(cand.end)) {
            if a == b {
                self.report.report_tube(
                    IssueKind::DegenerateTube,
                    anchor,
                    format!("tube {} collapses onto point {a}", meta.name),
                );
                return Verdict::Rejected(Rejection::Degenerate);
            }
        }
        let point_in = self.registry.find_or_insert(cand.start);
        let point_out = self.registry.find_or_insert(cand.end);

        let tube = Tube {
            name: meta.name,
            point_in,
            point_out,
            outer_diameter: meta.outer_diameter,
            wall_thickness: meta.wall_thickness,
            shape: cand.shape.clone(),
            length,
            heat_absorption: meta.heat_per_length * length / 1000.0,
            parallel_count: meta.parallel_count,
            extra_resistance: meta.extra_resistance,
            inlet_orifice: meta.inlet_orifice,
            outlet_orifice: meta.outlet_orifice,
            heat_factor: meta.heat_factor,
            inlet_enthalpy: meta.inlet_enthalpy,
            metadata_text: cand.layer.clone(),
        };
        debug!(
            name = %tube.name,
            point_in,
            point_out,
            length,
            "accepted tube"
        );
        self.tubes.push(tube);
        self.spans.push((cand.start, cand.end));
        self.withdrawn.push(false);
        Verdict::Accepted(self.tubes.len() - 1)
    }

    /// Earlier tubes win ties: an exact duplicate is always the later record.
    fn check_overlap(&mut self, cand: &TubeCandidate, anchor: Vec3) -> Option<Rejection> {
        let tol = self.cfg.point_tolerance;
        if self
            .conflicts
            .iter()
            .any(|&(a, b)| same_span(a, b, cand.start, cand.end, tol))
        {
            return Some(Rejection::Conflict);
        }

        let existing = self
            .spans
            .iter()
            .zip(&self.withdrawn)
            .position(|(&(a, b), &gone)| !gone && same_span(a, b, cand.start, cand.end, tol))?;
        if self.tubes[existing].metadata_text == cand.layer {
            debug!(layer = %cand.layer, existing, "dropped duplicate tube");
            return Some(Rejection::ExactDuplicate { existing });
        }

        let decision = match (self.cfg.conflict_policy, self.prompt.as_deref_mut()) {
            (ConflictPolicy::AutoReject, _) => ConflictDecision::KeepExisting,
            (ConflictPolicy::PromptCaller, Some(prompt)) => {
                prompt.resolve(&self.tubes[existing], cand)
            }
            _ => ConflictDecision::Report,
        };
        if decision == ConflictDecision::KeepExisting {
            debug!(layer = %cand.layer, existing, "kept earlier of two overlapping tubes");
            return Some(Rejection::ExactDuplicate { existing });
        }

        self.withdrawn[existing] = true;
        self.conflicts.push(self.spans[existing]);
        let removed = &self.tubes[existing];
        self.report.report_tube(
            IssueKind::OverlappingTube,
            anchor,
            format!(
                "tubes {:?} and {:?} occupy the same span",
                removed.metadata_text, cand.layer
            ),
        );
        Some(Rejection::Conflict)
    }

    pub fn finish(self) -> (TubeNetwork, ErrorReport) {
        let tubes = self
            .tubes
            .into_iter()
            .zip(self.withdrawn)
            .filter_map(|(tube, gone)| (!gone).then_some(tube))
            .collect();
        let mut network = TubeNetwork {
            registry: self.registry,
            tubes,
        };
        network.recount();
        (network, self.report)
    }
}

/// Validates every candidate in order.
pub fn load_candidates<'p>(
    candidates: &[TubeCandidate],
    cfg: &LoadConfig,
    prompt: Option<&'p mut dyn ConflictPrompt>,
) -> (TubeNetwork, ErrorReport) {
    let mut validator = TubeValidator::new(cfg.clone());
    if let Some(prompt) = prompt {
        validator = validator.with_prompt(prompt);
    }
    for cand in candidates {
        validator.validate(cand);
    }
    validator.finish()
}

fn describe(layer: &str, line: usize, problems: &[&MetadataProblem]) -> String {
    let parts: Vec<String> = problems.iter().map(|p| p.to_string()).collect();
    format!("layer {layer:?} (line {line}): {}", parts.join("; "))
}
