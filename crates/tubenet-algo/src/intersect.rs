use crate::structs::Crossing;
use itertools::Itertools;
use nalgebra::Vector3;
use tubenet_core::geom::Vec3;
use tubenet_core::model::TubeNetwork;

#[derive(Debug, Clone)]
pub struct IntersectionConfig {
    /// Largest distance between the two carrier lines still counted as meeting (mm).
    pub line_distance_tolerance: f64,
    /// `|d1 x d2| <= parallel_tolerance * |d1| * |d2|` counts as parallel.
    pub parallel_tolerance: f64,
}

impl Default for IntersectionConfig {
    fn default() -> Self {
        Self {
            line_distance_tolerance: 1e-3,
            parallel_tolerance: 1e-9,
        }
    }
}

/// Exhaustive pairwise scan over tubes that share no endpoint. Bent tubes are
/// tested by their chord.
pub fn find_intersections(network: &TubeNetwork, cfg: &IntersectionConfig) -> Vec<Crossing> {
    network
        .tubes
        .iter()
        .enumerate()
        .tuple_combinations()
        .filter(|((_, a), (_, b))| !a.shares_endpoint(b))
        .filter_map(|((i, a), (j, b))| {
            let (p1, q1) = network.endpoints(a);
            let (p2, q2) = network.endpoints(b);
            segment_intersection(p1, q1, p2, q2, cfg).map(|at| Crossing {
                first: i,
                second: j,
                at,
            })
        })
        .collect()
}

/// Point on `p1..q1` where it meets `p2..q2`, if both parameters fall in `[0, 1]`.
pub fn segment_intersection(
    p1: Vec3,
    q1: Vec3,
    p2: Vec3,
    q2: Vec3,
    cfg: &IntersectionConfig,
) -> Option<Vec3> {
    let a = to_na(p1);
    let d1 = to_na(q1) - a;
    let d2 = to_na(q2) - to_na(p2);
    let w = to_na(p2) - a;

    let c = d1.cross(&d2);
    let c_len = c.norm();
    if c_len <= cfg.parallel_tolerance * d1.norm() * d2.norm() {
        return None;
    }
    if (w.dot(&c) / c_len).abs() > cfg.line_distance_tolerance {
        return None;
    }

    // Solve in the plane normal to the dominant component of c.
    let k = c.iamax();
    let (i, j) = ((k + 1) % 3, (k + 2) % 3);
    let t = (w[i] * d2[j] - w[j] * d2[i]) / c[k];
    let u = (d1[j] * w[i] - d1[i] * w[j]) / c[k];
    if !(0.0..=1.0).contains(&t) || !(0.0..=1.0).contains(&u) {
        return None;
    }
    let at = a + d1 * t;
    Some(Vec3::new(at.x, at.y, at.z))
}

fn to_na(v: Vec3) -> Vector3<f64> {
    Vector3::new(v.x, v.y, v.z)
}
