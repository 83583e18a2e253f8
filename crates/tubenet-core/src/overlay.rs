//! Numbering and error overlays rendered through a [`DrawingSink`].

use crate::geom::Vec3;
use crate::model::{TubeNetwork, TubeShape, DRUM_CENTER};
use crate::report::ErrorReport;

pub type Handle = u32;

pub const LAYER_TUBES: &str = "TUBES";
pub const LAYER_POINTS: &str = "POINTS";
pub const LAYER_ORPHANS: &str = "ERR_ORPHAN";
pub const LAYER_TUBE_ERRORS: &str = "ERR_TUBE";
pub const LAYER_CROSSINGS: &str = "ERR_CROSS";

pub const COLOR_TUBE: i16 = 7;
pub const COLOR_LABEL: i16 = 3;
pub const COLOR_ORPHAN: i16 = 1;
pub const COLOR_TUBE_ERROR: i16 = 2;
pub const COLOR_CROSSING: i16 = 6;

const TEXT_HEIGHT: f64 = 25.0;

/// Receiver of drawing primitives. Handles are unique and increase monotonically.
pub trait DrawingSink {
    fn emit_line(&mut self, handle: Handle, layer: &str, color: i16, from: Vec3, to: Vec3);
    /// `center` and the angles are in the frame defined by `axis`.
    #[allow(clippy::too_many_arguments)]
    fn emit_arc(
        &mut self,
        handle: Handle,
        layer: &str,
        color: i16,
        center: Vec3,
        axis: Vec3,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    );
    fn emit_point(&mut self, handle: Handle, layer: &str, color: i16, at: Vec3);
    fn emit_text(&mut self, handle: Handle, layer: &str, color: i16, at: Vec3, height: f64, text: &str);
    fn emit_arrow(&mut self, handle: Handle, layer: &str, color: i16, from: Vec3, to: Vec3);
}

pub struct Overlay<'a, S: DrawingSink> {
    sink: &'a mut S,
    next_handle: Handle,
}

impl<'a, S: DrawingSink> Overlay<'a, S> {
    pub fn new(sink: &'a mut S) -> Self {
        Self {
            sink,
            next_handle: 0x100,
        }
    }

    pub fn next_handle(&self) -> Handle {
        self.next_handle
    }

    fn handle(&mut self) -> Handle {
        let h = self.next_handle;
        self.next_handle += 1;
        h
    }

    /// Tube geometry with index labels and flow arrows, plus labelled points.
    pub fn draw_numbering(&mut self, network: &TubeNetwork) {
        self.draw_tubes(network);
        for (idx, tube) in network.tubes.iter().enumerate() {
            let (a, b) = network.endpoints(tube);
            let mid = network.anchor(tube);
            let h = self.handle();
            self.sink
                .emit_text(h, LAYER_TUBES, COLOR_LABEL, mid, TEXT_HEIGHT, &format!("T{idx}"));
            let dir = b.sub(a);
            let len = dir.norm();
            if len > 0.0 {
                let tip = mid.add(dir.scale(TEXT_HEIGHT.min(len * 0.25) / len));
                let h = self.handle();
                self.sink.emit_arrow(h, LAYER_TUBES, COLOR_LABEL, mid, tip);
            }
        }
        for (idx, p) in network.points().iter().enumerate() {
            let h = self.handle();
            self.sink.emit_point(h, LAYER_POINTS, COLOR_LABEL, p.pos());
            let h = self.handle();
            self.sink
                .emit_text(h, LAYER_POINTS, COLOR_LABEL, p.pos(), TEXT_HEIGHT, &format!("P{idx}"));
        }
    }

    /// Tube geometry plus one leader from the drum center to every error location.
    pub fn draw_errors(&mut self, network: &TubeNetwork, report: &ErrorReport) {
        self.draw_tubes(network);
        let points = network.points();
        for &idx in &report.orphans {
            if let Some(p) = points.get(idx) {
                self.leader(LAYER_ORPHANS, COLOR_ORPHAN, p.pos());
            }
        }
        for &at in &report.tube_errors {
            self.leader(LAYER_TUBE_ERRORS, COLOR_TUBE_ERROR, at);
        }
        for &at in &report.intersections {
            self.leader(LAYER_CROSSINGS, COLOR_CROSSING, at);
        }
    }

    fn draw_tubes(&mut self, network: &TubeNetwork) {
        for tube in &network.tubes {
            let h = self.handle();
            match &tube.shape {
                TubeShape::Straight => {
                    let (a, b) = network.endpoints(tube);
                    self.sink.emit_line(h, LAYER_TUBES, COLOR_TUBE, a, b);
                }
                TubeShape::Bent(arc) => self.sink.emit_arc(
                    h,
                    LAYER_TUBES,
                    COLOR_TUBE,
                    arc.center,
                    arc.axis,
                    arc.radius,
                    arc.start_angle,
                    arc.end_angle,
                ),
            }
        }
    }

    fn leader(&mut self, layer: &str, color: i16, to: Vec3) {
        let h = self.handle();
        self.sink.emit_line(h, layer, color, DRUM_CENTER, to);
    }
}
