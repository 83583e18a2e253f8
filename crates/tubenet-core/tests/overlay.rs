use tubenet_core::geom::Vec3;
use tubenet_core::model::{TubeCandidate, DRUM_CENTER};
use tubenet_core::overlay::{
    DrawingSink, Handle, Overlay, COLOR_CROSSING, COLOR_ORPHAN, COLOR_TUBE_ERROR, LAYER_ORPHANS,
    LAYER_TUBES,
};
use tubenet_core::validate::{load_candidates, LoadConfig};

#[derive(Debug, Default)]
struct Recording {
    calls: Vec<(Handle, &'static str, String, i16)>,
    leaders: Vec<(i16, Vec3, Vec3)>,
}

impl DrawingSink for Recording {
    fn emit_line(&mut self, handle: Handle, layer: &str, color: i16, from: Vec3, to: Vec3) {
        self.calls.push((handle, "line", layer.to_string(), color));
        if from == DRUM_CENTER {
            self.leaders.push((color, from, to));
        }
    }

    fn emit_arc(
        &mut self,
        handle: Handle,
        layer: &str,
        color: i16,
        _center: Vec3,
        _axis: Vec3,
        _radius: f64,
        _start_angle: f64,
        _end_angle: f64,
    ) {
        self.calls.push((handle, "arc", layer.to_string(), color));
    }

    fn emit_point(&mut self, handle: Handle, layer: &str, color: i16, _at: Vec3) {
        self.calls.push((handle, "point", layer.to_string(), color));
    }

    fn emit_text(&mut self, handle: Handle, layer: &str, color: i16, _at: Vec3, _height: f64, _text: &str) {
        self.calls.push((handle, "text", layer.to_string(), color));
    }

    fn emit_arrow(&mut self, handle: Handle, layer: &str, color: i16, _from: Vec3, _to: Vec3) {
        self.calls.push((handle, "arrow", layer.to_string(), color));
    }
}

fn path() -> Vec<TubeCandidate> {
    vec![
        TubeCandidate::line(Vec3::new(0.0, 0.0, 0.0), Vec3::new(500.0, 0.0, 0.0), "A_60_5"),
        TubeCandidate::line(Vec3::new(500.0, 0.0, 0.0), Vec3::new(500.0, 500.0, 0.0), "B_60_5"),
    ]
}

#[test]
fn numbering_labels_every_tube_and_point() {
    let (network, _) = load_candidates(&path(), &LoadConfig::default(), None);
    let mut sink = Recording::default();
    let mut overlay = Overlay::new(&mut sink);
    overlay.draw_numbering(&network);
    let last = overlay.next_handle();

    let kinds = |k: &str| sink.calls.iter().filter(|c| c.1 == k).count();
    assert_eq!(2, kinds("line"));
    assert_eq!(2, kinds("arrow"));
    assert_eq!(4, kinds("point"));
    assert_eq!(2 + 4, kinds("text"));
    assert!(sink.calls[..2].iter().all(|c| c.2 == LAYER_TUBES));

    let handles: Vec<Handle> = sink.calls.iter().map(|c| c.0).collect();
    assert!(handles.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(last, handles[handles.len() - 1] + 1);
}

#[test]
fn error_overlay_draws_one_leader_per_problem_with_class_colors() {
    let (network, mut report) = load_candidates(&path(), &LoadConfig::default(), None);
    report.report_orphan(1, network.points()[1].pos());
    report.report_tube(
        tubenet_core::report::IssueKind::TubeTooShort,
        Vec3::new(1.0, 2.0, 3.0),
        "short",
    );
    report.report_intersection(Vec3::new(4.0, 5.0, 6.0), "cross");

    let mut sink = Recording::default();
    Overlay::new(&mut sink).draw_errors(&network, &report);

    assert_eq!(
        vec![
            (COLOR_ORPHAN, DRUM_CENTER, Vec3::new(0.0, 0.0, 0.0)),
            (COLOR_TUBE_ERROR, DRUM_CENTER, Vec3::new(1.0, 2.0, 3.0)),
            (COLOR_CROSSING, DRUM_CENTER, Vec3::new(4.0, 5.0, 6.0)),
        ],
        sink.leaders
    );
    assert!(sink.calls.iter().any(|c| c.2 == LAYER_ORPHANS));
}
