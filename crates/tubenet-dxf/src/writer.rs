use std::fmt::Write as _;
use tubenet_core::geom::Vec3;
use tubenet_core::overlay::{DrawingSink, Handle};

/// Collects overlay primitives as ASCII DXF entity records.
#[derive(Debug, Default)]
pub struct DxfWriter {
    body: String,
    entities: usize,
}

impl DxfWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entity_count(&self) -> usize {
        self.entities
    }

    /// Wraps the collected records in an ENTITIES section.
    pub fn finish(self) -> String {
        let mut out = String::with_capacity(self.body.len() + 64);
        pair(&mut out, 0, "SECTION");
        pair(&mut out, 2, "ENTITIES");
        out.push_str(&self.body);
        pair(&mut out, 0, "ENDSEC");
        pair(&mut out, 0, "EOF");
        out
    }

    fn begin(&mut self, kind: &str, handle: Handle, layer: &str, color: i16) {
        self.entities += 1;
        pair(&mut self.body, 0, kind);
        pair(&mut self.body, 5, &format!("{handle:X}"));
        pair(&mut self.body, 8, layer);
        pair(&mut self.body, 62, &color.to_string());
    }

    fn point(&mut self, base: i32, p: Vec3) {
        pair(&mut self.body, base, &num(p.x));
        pair(&mut self.body, base + 10, &num(p.y));
        pair(&mut self.body, base + 20, &num(p.z));
    }
}

impl DrawingSink for DxfWriter {
    fn emit_line(&mut self, handle: Handle, layer: &str, color: i16, from: Vec3, to: Vec3) {
        self.begin("LINE", handle, layer, color);
        self.point(10, from);
        self.point(11, to);
    }

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
    ) {
        self.begin("ARC", handle, layer, color);
        self.point(10, center);
        pair(&mut self.body, 40, &num(radius));
        pair(&mut self.body, 50, &num(start_angle));
        pair(&mut self.body, 51, &num(end_angle));
        self.point(210, axis);
    }

    fn emit_point(&mut self, handle: Handle, layer: &str, color: i16, at: Vec3) {
        self.begin("POINT", handle, layer, color);
        self.point(10, at);
    }

    fn emit_text(&mut self, handle: Handle, layer: &str, color: i16, at: Vec3, height: f64, text: &str) {
        self.begin("TEXT", handle, layer, color);
        self.point(10, at);
        pair(&mut self.body, 40, &num(height));
        pair(&mut self.body, 1, text);
    }

    // Two-vertex leader with its arrowhead at the first vertex.
    fn emit_arrow(&mut self, handle: Handle, layer: &str, color: i16, from: Vec3, to: Vec3) {
        self.begin("LEADER", handle, layer, color);
        pair(&mut self.body, 71, "1");
        pair(&mut self.body, 76, "2");
        self.point(10, to);
        self.point(10, from);
    }
}

fn pair(out: &mut String, code: i32, value: &str) {
    let _ = writeln!(out, "{code:>3}");
    let _ = writeln!(out, "{value}");
}

fn num(v: f64) -> String {
    if !v.is_finite() {
        return "0.0".to_string();
    }
    let mut s = format!("{v:.6}");
    if s == "-0.000000" {
        s = "0.000000".to_string();
    }
    s
}
