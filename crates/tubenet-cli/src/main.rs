use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tubenet_algo::structs::DrumSpec;
use tubenet_algo::{check_drawing, PipelineConfig};
use tubenet_core::geom::Vec3;
use tubenet_core::mesh::SolverParams;
use tubenet_core::model::{Tube, TubeCandidate};
use tubenet_core::validate::{ConflictDecision, ConflictPolicy, ConflictPrompt};
use tubenet_dxf::DxfWriter;

#[derive(Debug, Parser)]
#[command(name = "tubenet")]
#[command(about = "Boiler tube network checker and circulation mesh exporter.")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check a drawing; write the mesh when clean, an error overlay otherwise.
    Check {
        input: PathBuf,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        /// Project name used for output files and the mesh header.
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        report: Option<PathBuf>,
        /// JSON file with solver parameters.
        #[arg(long)]
        params: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = PolicyArg::AutoReport)]
        conflict_policy: PolicyArg,
        /// Drum as `x,y,z,diameter,wall`; repeat for a second drum.
        #[arg(long = "drum", value_parser = parse_drum)]
        drums: Vec<DrumSpec>,
        #[arg(long)]
        max_iterations: Option<u32>,
        #[arg(long)]
        pressure: Option<f64>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    AutoReject,
    AutoReport,
    Prompt,
}

impl From<PolicyArg> for ConflictPolicy {
    fn from(v: PolicyArg) -> Self {
        match v {
            PolicyArg::AutoReject => ConflictPolicy::AutoReject,
            PolicyArg::AutoReport => ConflictPolicy::AutoReport,
            PolicyArg::Prompt => ConflictPolicy::PromptCaller,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Check {
            input,
            out_dir,
            name,
            report,
            params,
            conflict_policy,
            drums,
            max_iterations,
            pressure,
        } => {
            let mut solver = load_params(params.as_deref())?;
            if let Some(v) = max_iterations {
                solver.max_iterations = v;
            }
            if let Some(v) = pressure {
                solver.pressure = v;
            }
            let mut cfg = PipelineConfig::default();
            cfg.load.conflict_policy = conflict_policy.into();
            cfg.topology.drums = drums;
            check(&input, &out_dir, name, report.as_deref(), &cfg, &solver)
        }
    }
}

fn check(
    input: &Path,
    out_dir: &Path,
    name: Option<String>,
    report: Option<&Path>,
    cfg: &PipelineConfig,
    solver: &SolverParams,
) -> Result<()> {
    ensure_input_file(input)?;
    let name = name.unwrap_or_else(|| {
        input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("drawing")
            .to_string()
    });

    let candidates = tubenet_dxf::import_dxf(input)?;
    let mut stdin_prompt = StdinPrompt;
    let prompt: Option<&mut dyn ConflictPrompt> =
        if cfg.load.conflict_policy == ConflictPolicy::PromptCaller {
            Some(&mut stdin_prompt)
        } else {
            None
        };
    let checked = check_drawing(&candidates, cfg, prompt)?;

    let summary = checked.summary();
    let json = serde_json::to_string_pretty(&summary).context("serialize report")?;
    if let Some(path) = report {
        write_file(path, &json).with_context(|| format!("write report: {path:?}"))?;
    } else {
        println!("{json}");
    }

    let mut dxf = DxfWriter::new();
    checked.draw(&mut dxf);

    match checked.mesh(&name, solver) {
        Some(mesh) => {
            let mesh_path = out_dir.join(format!("{name}.msh"));
            write_file(&mesh_path, &mesh).with_context(|| format!("write mesh: {mesh_path:?}"))?;
            let overlay_path = out_dir.join(format!("{name}_numbers.dxf"));
            write_file(&overlay_path, &dxf.finish())
                .with_context(|| format!("write overlay: {overlay_path:?}"))?;
            tracing::info!(
                points = summary.points,
                tubes = summary.tubes,
                "wrote {mesh_path:?}"
            );
            Ok(())
        }
        None => {
            let overlay_path = out_dir.join(format!("{name}_errors.dxf"));
            write_file(&overlay_path, &dxf.finish())
                .with_context(|| format!("write overlay: {overlay_path:?}"))?;
            bail!(
                "drawing has {} reported problem(s); see {overlay_path:?}",
                summary.issues.len()
            );
        }
    }
}

/// Keeps the earlier tube when the operator answers `y`.
struct StdinPrompt;

impl ConflictPrompt for StdinPrompt {
    fn resolve(&mut self, existing: &Tube, candidate: &TubeCandidate) -> ConflictDecision {
        eprint!(
            "tube {:?} overlaps existing tube {:?} (line {}). Keep the existing one? [y/N] ",
            candidate.layer, existing.metadata_text, candidate.source_line
        );
        let _ = std::io::stderr().flush();
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return ConflictDecision::Report;
        }
        match answer.trim() {
            "y" | "Y" | "yes" => ConflictDecision::KeepExisting,
            _ => ConflictDecision::Report,
        }
    }
}

fn parse_drum(raw: &str) -> Result<DrumSpec, String> {
    let values = raw
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid drum {raw:?}: {e}"))?;
    match values.as_slice() {
        &[x, y, z, diameter, wall_thickness] => Ok(DrumSpec {
            center: Vec3::new(x, y, z),
            diameter,
            wall_thickness,
        }),
        _ => Err(format!(
            "drum needs five values x,y,z,diameter,wall; got {}",
            values.len()
        )),
    }
}

fn load_params(path: Option<&Path>) -> Result<SolverParams> {
    let Some(path) = path else {
        return Ok(SolverParams::default());
    };
    let raw = std::fs::read_to_string(path).with_context(|| format!("read params: {path:?}"))?;
    serde_json::from_str(&raw).with_context(|| format!("parse params: {path:?}"))
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    std::fs::write(path, contents)?;
    Ok(())
}

fn ensure_input_file(input: &Path) -> Result<()> {
    match std::fs::metadata(input) {
        Ok(meta) => {
            if meta.is_file() {
                Ok(())
            } else {
                bail!("input is not a file: {input:?}");
            }
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            bail!("input not found: {input:?} (cwd: {cwd:?}).");
        }
        Err(err) => Err(err).with_context(|| format!("stat input: {input:?}")),
    }
}
