//! Object coordinate system (OCS) to world (WCS) conversion for arc entities.
//!
//! The local basis is derived from the extrusion axis alone, using the
//! arbitrary-axis rule of the drawing format.

use crate::geom::Vec3;

/// Threshold below which both `|Nx|` and `|Ny|` mark the axis as "near world Z".
pub const ARBITRARY_AXIS_LIMIT: f64 = 1.0 / 64.0;

/// Radii below this are treated as degenerate arcs.
pub const MIN_ARC_RADIUS: f64 = 1e-6;

const WORLD_Y: Vec3 = Vec3::new(0.0, 1.0, 0.0);
const WORLD_Z: Vec3 = Vec3::new(0.0, 0.0, 1.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArbitraryAxis {
    pub ax: Vec3,
    pub ay: Vec3,
    pub az: Vec3,
}

impl ArbitraryAxis {
    pub fn new(normal: Vec3) -> Self {
        let reference = if is_near_world_z(normal) {
            WORLD_Y
        } else {
            WORLD_Z
        };
        let ax = normalized(reference.cross(normal));
        let ay = normal.cross(ax);
        Self {
            ax,
            ay,
            az: normal,
        }
    }

    pub fn to_world(&self, local: Vec3) -> Vec3 {
        Vec3::new(
            local.x * self.ax.x + local.y * self.ay.x + local.z * self.az.x,
            local.x * self.ax.y + local.y * self.ay.y + local.z * self.az.y,
            local.x * self.ax.z + local.y * self.ay.z + local.z * self.az.z,
        )
    }
}

pub fn is_near_world_z(normal: Vec3) -> bool {
    normal.x.abs() < ARBITRARY_AXIS_LIMIT && normal.y.abs() < ARBITRARY_AXIS_LIMIT
}

/// World position of the point at `angle_deg` on a circle given in its local frame.
///
/// A radius below [`MIN_ARC_RADIUS`] yields the transformed center. The axis is
/// used as given; a non-unit axis produces a scaled, non-orthonormal basis.
pub fn ocs_to_wcs(center: Vec3, normal: Vec3, radius: f64, angle_deg: f64) -> Vec3 {
    let basis = ArbitraryAxis::new(normal);
    if radius < MIN_ARC_RADIUS {
        return basis.to_world(center);
    }
    let a = angle_deg.to_radians();
    let local = Vec3::new(
        center.x + radius * a.cos(),
        center.y + radius * a.sin(),
        center.z,
    );
    basis.to_world(local)
}

fn normalized(v: Vec3) -> Vec3 {
    let len = v.norm();
    if !len.is_finite() || len < 1e-12 {
        return v;
    }
    v.scale(1.0 / len)
}
