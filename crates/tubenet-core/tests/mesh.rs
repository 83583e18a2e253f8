use tubenet_core::geom::Vec3;
use tubenet_core::mesh::{write_mesh, SolverParams, TUBE_SECTION_MARKER};
use tubenet_core::model::TubeCandidate;
use tubenet_core::validate::{load_candidates, LoadConfig};

fn triangle() -> Vec<TubeCandidate> {
    let a = Vec3::new(0.0, 0.0, 0.0);
    let b = Vec3::new(1000.0, 0.0, 0.0);
    let c = Vec3::new(0.0, 1000.0, 0.0);
    vec![
        TubeCandidate::line(a, b, "T1_60_5_50_2"),
        TubeCandidate::line(b, c, "T2_60_5"),
        TubeCandidate::line(c, a, "T3_60_5"),
    ]
}

#[test]
fn writes_header_points_and_tubes() {
    let (network, report) = load_candidates(&triangle(), &LoadConfig::default(), None);
    assert!(!report.has_errors());

    let mesh = write_mesh(&network, "unit", &SolverParams::default());
    let lines: Vec<&str> = mesh.lines().collect();
    assert_eq!("unit", lines[0]);
    assert_eq!("100 0.0001 0 N", lines[1]);
    assert_eq!("100 0.05 1 0 0 10", lines[2]);
    assert_eq!(
        "     0    100000.000    100000.000    100000.000",
        lines[3]
    );
    assert_eq!("     2      1000.000         0.000         0.000", lines[5]);
    assert_eq!(TUBE_SECTION_MARKER, lines[7]);
    assert_eq!("T1", lines[8]);
    assert_eq!("T2", lines[10]);
    assert_eq!("T3", lines[12]);
    assert_eq!(14, lines.len());

    let cols: Vec<&str> = lines[9].split_whitespace().collect();
    assert_eq!(
        vec![
            "0", "1", "2", "60.00", "5.00", "1000.0", "0.0", "50.000", "2", "0.000", "0.00",
            "0.00", "1.000", "0.00"
        ],
        cols
    );
}

#[test]
fn output_is_reproducible() {
    let params = SolverParams {
        method: 'S',
        pressure: 160.0,
        ..SolverParams::default()
    };
    let (first, _) = load_candidates(&triangle(), &LoadConfig::default(), None);
    let (second, _) = load_candidates(&triangle(), &LoadConfig::default(), None);
    let a = write_mesh(&first, "unit", &params);
    assert_eq!(a, write_mesh(&second, "unit", &params));
    assert!(a.lines().nth(1).is_some_and(|l| l.ends_with(" S")));
}

#[test]
fn solver_params_fill_missing_json_fields() {
    let params: SolverParams =
        serde_json::from_str(r#"{"pressure": 120.0, "method": "G"}"#).expect("parse");
    assert_eq!(120.0, params.pressure);
    assert_eq!('G', params.method);
    assert_eq!(100, params.max_iterations);
}
