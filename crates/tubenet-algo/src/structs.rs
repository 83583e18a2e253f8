use serde::{Deserialize, Serialize};
use tubenet_core::geom::Vec3;
use tubenet_core::report::Issue;

/// A drum whose shell connections may be left out of the drawing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrumSpec {
    pub center: Vec3,
    pub diameter: f64,
    pub wall_thickness: f64,
}

impl DrumSpec {
    /// Radial band `[d/2 - t - margin, d/2 + margin]` around the drum axis.
    pub fn shell_band(&self, margin: f64) -> (f64, f64) {
        let r = self.diameter * 0.5;
        (r - self.wall_thickness - margin, r + margin)
    }

    /// Drum axes are world-aligned: the point is tested as seen along Y (XZ plane)
    /// and along X (YZ plane).
    pub fn shell_holds(&self, p: Vec3, margin: f64) -> bool {
        let (lo, hi) = self.shell_band(margin);
        let d = p.sub(self.center);
        let in_xz = (d.x * d.x + d.z * d.z).sqrt();
        let in_yz = (d.y * d.y + d.z * d.z).sqrt();
        (lo..=hi).contains(&in_xz) || (lo..=hi).contains(&in_yz)
    }
}

/// Two tubes whose chords meet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Crossing {
    pub first: usize,
    pub second: usize,
    pub at: Vec3,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub clean: bool,
    pub points: usize,
    pub tubes: usize,
    pub synthesized_tubes: usize,
    pub orphans: usize,
    pub tube_errors: usize,
    pub intersections: usize,
    pub issues: Vec<Issue>,
}
