use approx::assert_abs_diff_eq;
use tubenet_core::model::TubeShape;
use tubenet_dxf::{parse_reader, parse_str, ParseError};

fn drawing(body: &str) -> String {
    format!("  0\nSECTION\n  2\nHEADER\n  9\n$ACADVER\n  1\nAC1009\n  0\nENDSEC\n  0\nSECTION\n  2\nENTITIES\n{body}  0\nENDSEC\n  0\nEOF\n")
}

const LINE: &str = "  0\nLINE\n  8\nRISER_60_5\n 10\n0.0\n 20\n0.0\n 30\n0.0\n 11\n0.0\n 21\n1500.0\n 31\n0.0\n";

#[test]
fn reads_line_record() {
    let cands = parse_str(&drawing(LINE)).expect("parse");
    assert_eq!(1, cands.len());
    let c = &cands[0];
    assert_eq!("RISER_60_5", c.layer);
    assert_eq!(TubeShape::Straight, c.shape);
    assert_eq!(1500.0, c.end.y);
    assert_eq!(16, c.source_line);
}

#[test]
fn reads_arc_record_through_local_frame() {
    let arc = "  0\nARC\n  8\nBEND_60_5\n 10\n0.0\n 20\n0.0\n 30\n0.0\n 40\n300.0\n 50\n0.0\n 51\n90.0\n210\n0.0\n220\n0.0\n230\n-1.0\n";
    let cands = parse_str(&drawing(arc)).expect("parse");
    assert_eq!(1, cands.len());
    let c = &cands[0];
    match &c.shape {
        TubeShape::Bent(geom) => {
            assert_eq!(300.0, geom.radius);
            assert_eq!(-1.0, geom.axis.z);
        }
        other => panic!("expected arc, got {other:?}"),
    }
    // Mirrored frame: local +x maps to world -x.
    assert_abs_diff_eq!(-300.0, c.start.x, epsilon = 1e-9);
    assert_abs_diff_eq!(300.0, c.end.y, epsilon = 1e-9);
}

#[test]
fn skips_other_entities_and_unknown_groups() {
    let body = format!(
        "  0\nCIRCLE\n  8\nX\n 10\n1.0\n 40\n5.0\n{}",
        LINE.replace("  8\nRISER", " 62\n3\n  6\nCONTINUOUS\n  8\nRISER")
    );
    let cands = parse_str(&drawing(&body)).expect("parse");
    assert_eq!(1, cands.len());
    assert_eq!("RISER_60_5", cands[0].layer);
}

#[test]
fn layer_value_is_kept_verbatim() {
    let body = LINE.replace("RISER_60_5", "RISER_60,3_5 ");
    let cands = parse_str(&drawing(&body)).expect("parse");
    assert_eq!("RISER_60,3_5 ", cands[0].layer);
}

#[test]
fn missing_entities_section_is_fatal() {
    let err = parse_str("  0\nSECTION\n  2\nHEADER\n  0\nENDSEC\n  0\nEOF\n").unwrap_err();
    assert!(matches!(err, ParseError::MissingEntitiesSection));
}

#[test]
fn malformed_number_is_fatal_with_line() {
    let body = LINE.replace("1500.0", "15OO");
    let err = parse_str(&drawing(&body)).unwrap_err();
    match err {
        ParseError::InvalidNumber { record, tag, line, .. } => {
            assert_eq!("LINE", record);
            assert_eq!(21, tag);
            assert_eq!(28, line);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn non_finite_numbers_are_fatal() {
    let body = LINE.replace("1500.0", "nan");
    match parse_str(&drawing(&body)).unwrap_err() {
        ParseError::InvalidNumber { tag, raw, line, .. } => {
            assert_eq!(21, tag);
            assert_eq!("nan", raw);
            assert_eq!(28, line);
        }
        other => panic!("unexpected error {other:?}"),
    }

    let arc = "  0\nARC\n  8\nBEND_60_5\n 10\n0.0\n 20\n0.0\n 30\n0.0\n 40\ninf\n 50\n0.0\n 51\n90.0\n";
    let err = parse_str(&drawing(arc)).unwrap_err();
    assert!(matches!(err, ParseError::InvalidNumber { record: "ARC", tag: 40, .. }));

    let body = LINE.replace("1500.0", "-infinity");
    let err = parse_str(&drawing(&body)).unwrap_err();
    assert!(matches!(err, ParseError::InvalidNumber { tag: 21, .. }));
}

#[test]
fn code_page_bytes_in_layer_do_not_abort() {
    let mut bytes = drawing(LINE).replace("RISER_60_5", "RISER_#60_5").into_bytes();
    for b in bytes.iter_mut().filter(|b| **b == b'#') {
        *b = 0xD8;
    }
    let cands = parse_reader(&bytes[..]).expect("parse");
    assert_eq!(1, cands.len());
    assert_eq!("RISER_\u{FFFD}60_5", cands[0].layer);
    assert_eq!(16, cands[0].source_line);
    assert_eq!(1500.0, cands[0].end.y);
}

#[test]
fn entity_names_only_follow_a_zero_code() {
    let body = format!(
        "  0\nTEXT\n  8\nARC\n  1\nEOF\n  0\nCIRCLE\n  8\nLINE\n 40\n5.0\n{LINE}"
    );
    let cands = parse_str(&drawing(&body)).expect("parse");
    assert_eq!(1, cands.len());
    assert_eq!("RISER_60_5", cands[0].layer);
    assert_eq!(TubeShape::Straight, cands[0].shape);
}

#[test]
fn bad_group_code_is_fatal() {
    let body = LINE.replace(" 31\n", "abc\n");
    let err = parse_str(&drawing(&body)).unwrap_err();
    assert!(matches!(err, ParseError::InvalidTag { ref raw, line: 29 } if raw == "abc"));
    assert_eq!(Some(29), err.line());
}

#[test]
fn input_ending_inside_record_is_fatal() {
    let text = "  0\nSECTION\n  2\nENTITIES\n  0\nARC\n  8\nB_60_5\n 10\n";
    let err = parse_str(&text).unwrap_err();
    assert!(matches!(
        err,
        ParseError::UnexpectedEof {
            record: "ARC",
            line: 9
        }
    ));
}

#[test]
fn section_without_terminator_ends_at_eof() {
    let text = format!("  0\nSECTION\n  2\nENTITIES\n{LINE}  0\n");
    let cands = parse_str(&text).expect("parse");
    assert_eq!(1, cands.len());
}

#[test]
fn crlf_line_endings_are_accepted() {
    let text = drawing(LINE).replace('\n', "\r\n");
    let cands = parse_str(&text).expect("parse");
    assert_eq!("RISER_60_5", cands[0].layer);
}
