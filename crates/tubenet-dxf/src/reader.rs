//! Line-oriented reader for the LINE/ARC subset of the ENTITIES section.
//!
//! Only the value after a `0` group code names an entity. Any desynchronisation
//! (bad group code, bad or non-finite number, input ending inside a record)
//! aborts the whole read: field positions cannot be trusted afterwards.

use std::io::BufRead;
use std::path::PathBuf;
use tubenet_core::geom::Vec3;
use tubenet_core::model::{ArcGeometry, TubeCandidate};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("cannot read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("read failed after line {line}: {source}")]
    Read {
        line: usize,
        source: std::io::Error,
    },
    #[error("no ENTITIES section found")]
    MissingEntitiesSection,
    #[error("line {line}: input ended inside a {record} record")]
    UnexpectedEof { record: &'static str, line: usize },
    #[error("line {line}: expected a group code, found {raw:?}")]
    InvalidTag { raw: String, line: usize },
    #[error("line {line}: {record} group {tag} is not a number: {raw:?}")]
    InvalidNumber {
        record: &'static str,
        tag: i32,
        raw: String,
        line: usize,
    },
}

impl ParseError {
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::Read { line, .. }
            | ParseError::UnexpectedEof { line, .. }
            | ParseError::InvalidTag { line, .. }
            | ParseError::InvalidNumber { line, .. } => Some(*line),
            ParseError::Io { .. } | ParseError::MissingEntitiesSection => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Terminator,
    Layer,
    X1,
    Y1,
    Z1,
    X2,
    Y2,
    Z2,
    Radius,
    StartAngle,
    EndAngle,
    AxisX,
    AxisY,
    AxisZ,
    Ignored,
}

impl Field {
    fn from_code(code: i32) -> Self {
        match code {
            0 => Field::Terminator,
            8 => Field::Layer,
            10 => Field::X1,
            20 => Field::Y1,
            30 => Field::Z1,
            11 => Field::X2,
            21 => Field::Y2,
            31 => Field::Z2,
            40 => Field::Radius,
            50 => Field::StartAngle,
            51 => Field::EndAngle,
            210 => Field::AxisX,
            220 => Field::AxisY,
            230 => Field::AxisZ,
            _ => Field::Ignored,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordKind {
    Line,
    Arc,
}

impl RecordKind {
    fn name(self) -> &'static str {
        match self {
            RecordKind::Line => "LINE",
            RecordKind::Arc => "ARC",
        }
    }
}

#[derive(Debug)]
struct Record {
    kind: RecordKind,
    line: usize,
    layer: String,
    p1: [f64; 3],
    p2: [f64; 3],
    radius: f64,
    start_angle: f64,
    end_angle: f64,
    axis: [f64; 3],
}

impl Record {
    fn new(kind: RecordKind, line: usize) -> Self {
        Self {
            kind,
            line,
            layer: String::new(),
            p1: [0.0; 3],
            p2: [0.0; 3],
            radius: 0.0,
            start_angle: 0.0,
            end_angle: 0.0,
            axis: [0.0, 0.0, 1.0],
        }
    }

    fn set(&mut self, field: Field, v: f64) {
        match field {
            Field::X1 => self.p1[0] = v,
            Field::Y1 => self.p1[1] = v,
            Field::Z1 => self.p1[2] = v,
            Field::X2 => self.p2[0] = v,
            Field::Y2 => self.p2[1] = v,
            Field::Z2 => self.p2[2] = v,
            Field::Radius => self.radius = v,
            Field::StartAngle => self.start_angle = v,
            Field::EndAngle => self.end_angle = v,
            Field::AxisX => self.axis[0] = v,
            Field::AxisY => self.axis[1] = v,
            Field::AxisZ => self.axis[2] = v,
            Field::Terminator | Field::Layer | Field::Ignored => {}
        }
    }

    fn finish(self) -> TubeCandidate {
        let [x1, y1, z1] = self.p1;
        let cand = match self.kind {
            RecordKind::Line => {
                let [x2, y2, z2] = self.p2;
                TubeCandidate::line(Vec3::new(x1, y1, z1), Vec3::new(x2, y2, z2), self.layer)
            }
            RecordKind::Arc => {
                let [nx, ny, nz] = self.axis;
                TubeCandidate::arc(
                    ArcGeometry {
                        center: Vec3::new(x1, y1, z1),
                        axis: Vec3::new(nx, ny, nz),
                        radius: self.radius,
                        start_angle: self.start_angle,
                        end_angle: self.end_angle,
                    },
                    self.layer,
                )
            }
        };
        cand.at_line(self.line)
    }
}

enum State {
    Preamble,
    /// Expecting a group code between records.
    Entities,
    /// A `0` code was read; the next value names the entity.
    EntityType,
    InRecord(Record),
}

struct Lines<R> {
    inner: R,
    line: usize,
    raw: Vec<u8>,
    buf: String,
}

impl<R: BufRead> Lines<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            line: 0,
            raw: Vec::new(),
            buf: String::new(),
        }
    }

    /// Next line without its line terminator. Bytes that are not UTF-8 (code-page
    /// text from older drawings) are replaced, never rejected.
    fn next_line(&mut self) -> Result<Option<&str>, ParseError> {
        self.raw.clear();
        let n = self
            .inner
            .read_until(b'\n', &mut self.raw)
            .map_err(|source| ParseError::Read {
                line: self.line,
                source,
            })?;
        if n == 0 {
            return Ok(None);
        }
        self.line += 1;
        self.buf = String::from_utf8_lossy(&self.raw).into_owned();
        Ok(Some(self.buf.trim_end_matches(['\r', '\n'])))
    }

    /// Group code outside a record; `None` at end of input.
    fn next_code(&mut self) -> Result<Option<i32>, ParseError> {
        let line = self.line + 1;
        let Some(raw) = self.next_line()? else {
            return Ok(None);
        };
        raw.trim()
            .parse()
            .map(Some)
            .map_err(|_| ParseError::InvalidTag {
                raw: raw.to_string(),
                line,
            })
    }
}

pub fn parse_str(input: &str) -> Result<Vec<TubeCandidate>, ParseError> {
    parse_reader(input.as_bytes())
}

pub fn parse_file(path: impl Into<PathBuf>) -> Result<Vec<TubeCandidate>, ParseError> {
    let path = path.into();
    let file = std::fs::File::open(&path).map_err(|source| ParseError::Io {
        path: path.clone(),
        source,
    })?;
    parse_reader(std::io::BufReader::new(file))
}

pub fn parse_reader<R: BufRead>(reader: R) -> Result<Vec<TubeCandidate>, ParseError> {
    let mut lines = Lines::new(reader);
    let mut state = State::Preamble;
    let mut out = Vec::new();

    loop {
        state = match state {
            State::Preamble => {
                let Some(code) = lines.next_code()? else {
                    return Err(ParseError::MissingEntitiesSection);
                };
                match lines.next_line()? {
                    None => return Err(ParseError::MissingEntitiesSection),
                    Some(v) if code == 2 && v.trim() == "ENTITIES" => State::Entities,
                    Some(_) => State::Preamble,
                }
            }
            State::Entities => match lines.next_code()? {
                None => break,
                Some(0) => State::EntityType,
                // Field of an entity we do not read.
                Some(_) => match lines.next_line()? {
                    None => break,
                    Some(_) => State::Entities,
                },
            },
            State::EntityType => {
                let at = lines.line + 1;
                match lines.next_line()?.map(str::trim) {
                    None | Some("ENDSEC") | Some("EOF") => break,
                    Some("LINE") => State::InRecord(Record::new(RecordKind::Line, at)),
                    Some("ARC") => State::InRecord(Record::new(RecordKind::Arc, at)),
                    Some(_) => State::Entities,
                }
            }
            State::InRecord(mut rec) => {
                let field = read_tag(&mut lines, rec.kind)?;
                if field == Field::Terminator {
                    out.push(rec.finish());
                    State::EntityType
                } else {
                    read_value(&mut lines, &mut rec, field)?;
                    State::InRecord(rec)
                }
            }
        };
    }

    tracing::debug!(records = out.len(), lines = lines.line, "parsed entity section");
    Ok(out)
}

fn read_tag<R: BufRead>(lines: &mut Lines<R>, kind: RecordKind) -> Result<Field, ParseError> {
    let line = lines.line;
    let raw = lines.next_line()?.ok_or(ParseError::UnexpectedEof {
        record: kind.name(),
        line,
    })?;
    let code: i32 = raw.trim().parse().map_err(|_| ParseError::InvalidTag {
        raw: raw.to_string(),
        line: line + 1,
    })?;
    Ok(Field::from_code(code))
}

fn read_value<R: BufRead>(
    lines: &mut Lines<R>,
    rec: &mut Record,
    field: Field,
) -> Result<(), ParseError> {
    let line = lines.line;
    let raw = lines.next_line()?.ok_or(ParseError::UnexpectedEof {
        record: rec.kind.name(),
        line,
    })?;
    match field {
        Field::Layer => rec.layer = raw.to_string(),
        Field::Ignored => {}
        _ => {
            let v = raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| ParseError::InvalidNumber {
                    record: rec.kind.name(),
                    tag: field_code(field),
                    raw: raw.to_string(),
                    line: line + 1,
                })?;
            rec.set(field, v);
        }
    }
    Ok(())
}

fn field_code(field: Field) -> i32 {
    match field {
        Field::Terminator => 0,
        Field::Layer => 8,
        Field::X1 => 10,
        Field::Y1 => 20,
        Field::Z1 => 30,
        Field::X2 => 11,
        Field::Y2 => 21,
        Field::Z2 => 31,
        Field::Radius => 40,
        Field::StartAngle => 50,
        Field::EndAngle => 51,
        Field::AxisX => 210,
        Field::AxisY => 220,
        Field::AxisZ => 230,
        Field::Ignored => -1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_known_group_codes() {
        for code in [0, 8, 10, 20, 30, 11, 21, 31, 40, 50, 51, 210, 220, 230] {
            assert_eq!(code, field_code(Field::from_code(code)));
        }
        assert_eq!(Field::Ignored, Field::from_code(62));
    }
}
