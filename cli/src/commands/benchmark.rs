//! Benchmark command - run solvers over every game in a directory

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use rayon::prelude::*;
use tracing::{info, warn};

use ggg_arena::{FileFormat, GameFile};
use ggg_engine::batch::solve_timed;
use ggg_engine::registry::SolverEntry;
use ggg_engine::{GameKind, Graph};

use super::csv_field;

#[derive(Parser, Debug)]
#[command(about = "Benchmark solvers on a directory of games")]
pub struct BenchmarkArgs {
    /// Kind of game in the directory
    #[arg(long, short = 'g')]
    pub game: GameKind,

    /// Directory holding .json and .dot game files
    #[arg(long, short = 'd')]
    pub dir: PathBuf,

    /// Solver ids to run; every solver for the kind when omitted
    #[arg(long, short = 's')]
    pub solver: Vec<String>,

    /// `solver,game_file,solve_time,success,error_message` rows
    #[arg(long)]
    pub csv: bool,
}

/// One solver on one game
#[derive(Debug, Clone)]
pub struct Record {
    pub solver: &'static str,
    pub game_file: String,
    pub solve_time: f64,
    pub success: bool,
    pub error_message: String,
}

/// Game files in `dir`, sorted by name.
pub fn game_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let entries =
        fs::read_dir(dir).with_context(|| format!("cannot read directory {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && FileFormat::from_path(&path).is_ok() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Returns whether every run succeeded.
pub fn execute<V, E>(entries: Vec<SolverEntry<Graph<V, E>>>, args: &BenchmarkArgs) -> Result<bool>
where
    Graph<V, E>: GameFile + Sync,
{
    for id in &args.solver {
        if !entries.iter().any(|e| e.id == id.as_str()) {
            bail!("no {} solver with id '{id}'", args.game);
        }
    }
    let selected: Vec<&SolverEntry<Graph<V, E>>> = entries
        .iter()
        .filter(|e| args.solver.is_empty() || args.solver.iter().any(|id| id == e.id))
        .collect();

    let files = game_files(&args.dir)?;
    if files.is_empty() {
        warn!(dir = %args.dir.display(), "no .json or .dot files found");
    }
    info!(files = files.len(), solvers = selected.len(), "benchmark started");

    let records: Vec<Record> = files
        .par_iter()
        .flat_map_iter(|path| run_file(&selected, path))
        .collect();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if args.csv {
        writeln!(out, "solver,game_file,solve_time,success,error_message")?;
        for r in &records {
            writeln!(
                out,
                "{},{},{:.6},{},{}",
                csv_field(r.solver),
                csv_field(&r.game_file),
                r.solve_time,
                r.success,
                csv_field(&r.error_message)
            )?;
        }
    } else {
        write_report(&mut out, &selected, &records)?;
    }
    out.flush()?;
    Ok(records.iter().all(|r| r.success))
}

fn run_file<G: GameFile>(selected: &[&SolverEntry<G>], path: &Path) -> Vec<Record> {
    let game_file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let graph: G = match ggg_arena::load(path) {
        Ok(graph) => graph,
        Err(err) => {
            warn!(file = %path.display(), error = %err, "cannot load game");
            return selected
                .iter()
                .map(|entry| Record {
                    solver: entry.name(),
                    game_file: game_file.clone(),
                    solve_time: 0.0,
                    success: false,
                    error_message: err.to_string(),
                })
                .collect();
        }
    };

    selected
        .iter()
        .map(|entry| {
            let solver = entry.build();
            let run = solve_timed(solver.as_ref(), &graph);
            let success = run.succeeded();
            let error_message = match &run.result {
                Err(err) => err.to_string(),
                Ok(s) if !s.is_valid() => "invalid game graph".to_string(),
                Ok(s) if !s.is_solved() => "not solved".to_string(),
                Ok(_) => String::new(),
            };
            Record {
                solver: solver.name(),
                game_file: game_file.clone(),
                solve_time: run.elapsed.as_secs_f64(),
                success,
                error_message,
            }
        })
        .collect()
}

fn write_report<G>(
    out: &mut dyn Write,
    selected: &[&SolverEntry<G>],
    records: &[Record],
) -> Result<()> {
    for r in records {
        let status = if r.success { "ok" } else { "FAILED" };
        write!(out, "{:<56} {:<32} {:>12.6}s  {status}", r.solver, r.game_file, r.solve_time)?;
        if !r.error_message.is_empty() {
            write!(out, "  ({})", r.error_message)?;
        }
        writeln!(out)?;
    }
    writeln!(out)?;
    for entry in selected {
        let name = entry.name();
        let runs: Vec<&Record> = records.iter().filter(|r| r.solver == name).collect();
        let successes = runs.iter().filter(|r| r.success).count();
        let total: f64 = runs.iter().map(|r| r.solve_time).sum();
        writeln!(
            out,
            "{name}: {successes}/{} solved, total {total:.6}s, mean {:.6}s",
            runs.len(),
            if runs.is_empty() { 0.0 } else { total / runs.len() as f64 }
        )?;
    }
    Ok(())
}
