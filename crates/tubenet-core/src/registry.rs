use crate::geom::Vec3;
use crate::model::{Point, Tube, DRUM_CENTER};

/// Points are equal when every coordinate differs by less than this (mm).
pub const POINT_TOLERANCE: f64 = 1.0;

/// Append-only point store with tolerance-based deduplication.
///
/// Lookups are a linear scan; a drawing holds a few hundred distinct points.
#[derive(Debug, Clone)]
pub struct PointRegistry {
    points: Vec<Point>,
    tolerance: f64,
}

impl Default for PointRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PointRegistry {
    pub fn new() -> Self {
        Self::with_tolerance(POINT_TOLERANCE)
    }

    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            points: vec![Point::new(DRUM_CENTER)],
            tolerance,
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn find(&self, pos: Vec3) -> Option<usize> {
        self.points
            .iter()
            .position(|p| p.pos().approx_eq(pos, self.tolerance))
    }

    /// Index of the first point within tolerance, appending `pos` when none matches.
    pub fn find_or_insert(&mut self, pos: Vec3) -> usize {
        if let Some(idx) = self.find(pos) {
            return idx;
        }
        self.points.push(Point::new(pos));
        self.points.len() - 1
    }

    pub fn get(&self, idx: usize) -> Option<&Point> {
        self.points.get(idx)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn recount(&mut self, tubes: &[Tube]) {
        for p in &mut self.points {
            p.tube_count = 0;
        }
        for t in tubes {
            self.points[t.point_in].tube_count += 1;
            self.points[t.point_out].tube_count += 1;
        }
    }
}
