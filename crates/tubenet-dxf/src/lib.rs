use anyhow::{Context, Result};
use std::path::Path;
use tubenet_core::model::TubeCandidate;

pub mod reader;
pub mod writer;

pub use reader::{parse_reader, parse_str, ParseError};
pub use writer::DxfWriter;

/// Reads every LINE/ARC record of a drawing file as an unvalidated tube.
pub fn import_dxf(path: &Path) -> Result<Vec<TubeCandidate>> {
    let candidates =
        reader::parse_file(path).with_context(|| format!("load DXF: {path:?}"))?;
    tracing::info!(records = candidates.len(), "read {path:?}");
    Ok(candidates)
}
