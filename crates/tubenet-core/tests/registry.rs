use tubenet_core::geom::Vec3;
use tubenet_core::model::{DRUM_CENTER, DRUM_CENTER_INDEX};
use tubenet_core::registry::PointRegistry;

#[test]
fn drum_center_is_preregistered() {
    let mut reg = PointRegistry::new();
    assert_eq!(1, reg.len());
    assert_eq!(DRUM_CENTER_INDEX, reg.find_or_insert(DRUM_CENTER));
    assert_eq!(
        DRUM_CENTER_INDEX,
        reg.find_or_insert(Vec3::new(100000.5, 99999.5, 100000.0))
    );
}

#[test]
fn points_within_tolerance_share_an_index() {
    let mut reg = PointRegistry::new();
    let a = reg.find_or_insert(Vec3::new(0.0, 0.0, 0.0));
    let b = reg.find_or_insert(Vec3::new(0.99, -0.99, 0.5));
    assert_eq!(a, b);
    assert_eq!(2, reg.len());
}

#[test]
fn a_full_unit_apart_on_one_axis_is_distinct() {
    let mut reg = PointRegistry::new();
    let a = reg.find_or_insert(Vec3::new(0.0, 0.0, 0.0));
    let b = reg.find_or_insert(Vec3::new(0.0, 1.0, 0.0));
    let c = reg.find_or_insert(Vec3::new(0.5, 0.5, 1.5));
    assert_ne!(a, b);
    assert_ne!(a, c);
    assert_ne!(b, c);
    assert_eq!(vec![1, 2, 3], vec![a, b, c]);
}

#[test]
fn first_match_wins_and_position_is_kept() {
    let mut reg = PointRegistry::new();
    let a = reg.find_or_insert(Vec3::new(0.0, 0.0, 0.0));
    let b = reg.find_or_insert(Vec3::new(1.5, 0.0, 0.0));
    // within tolerance of both; the earlier point is returned
    let c = reg.find_or_insert(Vec3::new(0.8, 0.0, 0.0));
    assert_eq!(a, c);
    assert_ne!(a, b);
    assert_eq!(Vec3::new(0.0, 0.0, 0.0), reg.get(a).map(|p| p.pos()).unwrap_or_default());
    assert_eq!(None, reg.find(Vec3::new(50.0, 0.0, 0.0)));
}
