use crate::geom::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    DegenerateTube,
    OverlappingTube,
    InvalidMetadata,
    TubeTooShort,
    WallTooThick,
    OrphanPoint,
    Intersection,
}

/// The three groups drawn in distinct colors on the error overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Orphan,
    Tube,
    Crossing,
}

impl IssueKind {
    pub fn class(self) -> ErrorClass {
        match self {
            IssueKind::OrphanPoint => ErrorClass::Orphan,
            IssueKind::Intersection => ErrorClass::Crossing,
            _ => ErrorClass::Tube,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            IssueKind::DegenerateTube => "degenerate_tube",
            IssueKind::OverlappingTube => "overlapping_tube",
            IssueKind::InvalidMetadata => "invalid_metadata",
            IssueKind::TubeTooShort => "tube_too_short",
            IssueKind::WallTooThick => "wall_too_thick",
            IssueKind::OrphanPoint => "orphan_point",
            IssueKind::Intersection => "intersection",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub message: String,
    pub anchor: Vec3,
}

/// Reported problems gathered over one run. Any entry suppresses mesh output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub orphans: Vec<usize>,
    pub tube_errors: Vec<Vec3>,
    pub intersections: Vec<Vec3>,
    pub issues: Vec<Issue>,
}

impl ErrorReport {
    pub fn has_errors(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn report_tube(&mut self, kind: IssueKind, anchor: Vec3, message: impl Into<String>) {
        self.push(kind, anchor, message.into());
    }

    pub fn report_orphan(&mut self, point: usize, at: Vec3) {
        self.orphans.push(point);
        self.push(
            IssueKind::OrphanPoint,
            at,
            format!("point {point} is connected to fewer than two tubes"),
        );
    }

    pub fn report_intersection(&mut self, at: Vec3, message: impl Into<String>) {
        self.push(IssueKind::Intersection, at, message.into());
    }

    pub fn count(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|i| i.kind == kind).count()
    }

    fn push(&mut self, kind: IssueKind, anchor: Vec3, message: String) {
        tracing::warn!(code = kind.code(), "{message}");
        match kind.class() {
            ErrorClass::Orphan => {}
            ErrorClass::Tube => self.tube_errors.push(anchor),
            ErrorClass::Crossing => self.intersections.push(anchor),
        }
        self.issues.push(Issue {
            kind,
            message,
            anchor,
        });
    }
}
