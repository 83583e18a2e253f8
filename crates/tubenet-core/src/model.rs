use crate::geom::Vec3;
use crate::ocs::{ocs_to_wcs, ArbitraryAxis};
use crate::registry::PointRegistry;
use serde::{Deserialize, Serialize};

/// Fixed drum center, pre-registered at index 0 of every network.
pub const DRUM_CENTER: Vec3 = Vec3::new(100000.0, 100000.0, 100000.0);
pub const DRUM_CENTER_INDEX: usize = 0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub tube_count: usize,
}

impl Point {
    pub fn new(pos: Vec3) -> Self {
        Self {
            x: pos.x,
            y: pos.y,
            z: pos.z,
            tube_count: 0,
        }
    }

    pub fn pos(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

/// Arc parameters as read from the drawing; center and angles live in the local frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcGeometry {
    pub center: Vec3,
    pub axis: Vec3,
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
}

impl ArcGeometry {
    pub fn start_point(&self) -> Vec3 {
        ocs_to_wcs(self.center, self.axis, self.radius, self.start_angle)
    }

    pub fn end_point(&self) -> Vec3 {
        ocs_to_wcs(self.center, self.axis, self.radius, self.end_angle)
    }

    pub fn mid_point(&self) -> Vec3 {
        let mid = (self.start_angle + self.end_angle) * 0.5;
        ocs_to_wcs(self.center, self.axis, self.radius, mid)
    }

    pub fn world_center(&self) -> Vec3 {
        ArbitraryAxis::new(self.axis).to_world(self.center)
    }

    /// `|end - start|` in radians times the bend radius; angles are not wrapped.
    pub fn length(&self) -> f64 {
        (self.end_angle - self.start_angle).abs().to_radians() * self.radius
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TubeShape {
    Straight,
    Bent(ArcGeometry),
}

impl TubeShape {
    pub fn bend_radius(&self) -> f64 {
        match self {
            TubeShape::Straight => 0.0,
            TubeShape::Bent(arc) => arc.radius,
        }
    }
}

/// A parsed LINE/ARC record that has not been validated yet.
#[derive(Debug, Clone, PartialEq)]
pub struct TubeCandidate {
    pub start: Vec3,
    pub end: Vec3,
    pub layer: String,
    pub shape: TubeShape,
    /// Input line where the record started.
    pub source_line: usize,
}

impl TubeCandidate {
    pub fn line(start: Vec3, end: Vec3, layer: impl Into<String>) -> Self {
        Self {
            start,
            end,
            layer: layer.into(),
            shape: TubeShape::Straight,
            source_line: 0,
        }
    }

    pub fn arc(arc: ArcGeometry, layer: impl Into<String>) -> Self {
        Self {
            start: arc.start_point(),
            end: arc.end_point(),
            layer: layer.into(),
            shape: TubeShape::Bent(arc),
            source_line: 0,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.source_line = line;
        self
    }

    pub fn length(&self) -> f64 {
        match &self.shape {
            TubeShape::Straight => self.start.distance(self.end),
            TubeShape::Bent(arc) => arc.length(),
        }
    }

    /// Representative point used to anchor diagnostics.
    pub fn anchor(&self) -> Vec3 {
        match &self.shape {
            TubeShape::Straight => self.start.midpoint(self.end),
            TubeShape::Bent(arc) => arc.mid_point(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tube {
    pub name: String,
    pub point_in: usize,
    pub point_out: usize,
    pub outer_diameter: f64,
    pub wall_thickness: f64,
    pub shape: TubeShape,
    pub length: f64,
    pub heat_absorption: f64,
    pub parallel_count: u32,
    pub extra_resistance: f64,
    pub inlet_orifice: f64,
    pub outlet_orifice: f64,
    pub heat_factor: f64,
    pub inlet_enthalpy: f64,
    pub metadata_text: String,
}

impl Tube {
    pub fn bend_radius(&self) -> f64 {
        self.shape.bend_radius()
    }

    pub fn inner_diameter(&self) -> f64 {
        self.outer_diameter - 2.0 * self.wall_thickness
    }

    pub fn touches(&self, point: usize) -> bool {
        self.point_in == point || self.point_out == point
    }

    pub fn shares_endpoint(&self, other: &Tube) -> bool {
        self.touches(other.point_in) || self.touches(other.point_out)
    }
}

/// Points and tubes produced by the load phase.
#[derive(Debug, Clone)]
pub struct TubeNetwork {
    pub registry: PointRegistry,
    pub tubes: Vec<Tube>,
}

impl TubeNetwork {
    pub fn points(&self) -> &[Point] {
        self.registry.points()
    }

    pub fn endpoints(&self, tube: &Tube) -> (Vec3, Vec3) {
        let points = self.points();
        (points[tube.point_in].pos(), points[tube.point_out].pos())
    }

    /// Midpoint of the straight chord or of the arc.
    pub fn anchor(&self, tube: &Tube) -> Vec3 {
        match &tube.shape {
            TubeShape::Straight => {
                let (a, b) = self.endpoints(tube);
                a.midpoint(b)
            }
            TubeShape::Bent(arc) => arc.mid_point(),
        }
    }

    pub fn recount(&mut self) {
        self.registry.recount(&self.tubes);
    }
}
