//! Solve command - solve one game file with one solver

use std::io::Write;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::info;

use ggg_arena::GameFile;
use ggg_engine::batch::solve_timed;
use ggg_engine::registry::{find, SolverEntry};
use ggg_engine::{GameKind, Graph, Solution};

use super::{csv_field, open_output};

#[derive(Parser, Debug)]
#[command(about = "Solve a game file")]
pub struct SolveArgs {
    /// Kind of game in the input file
    #[arg(long, short = 'g')]
    pub game: GameKind,

    /// Solver id, see `ggg list-solvers`
    #[arg(long, short = 's')]
    pub solver: String,

    /// Game file (.json or .dot)
    #[arg(long, short = 'i')]
    pub input: PathBuf,

    /// Write the result here instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// One `vertex,winner,strategy,value` row per vertex
    #[arg(long, conflicts_with_all = ["time_only", "json"])]
    pub csv: bool,

    /// Print only the solve time in seconds
    #[arg(long, conflicts_with = "json")]
    pub time_only: bool,

    /// Print the solution as JSON
    #[arg(long)]
    pub json: bool,
}

/// Returns whether the game was valid and solved.
pub fn execute<V, E>(entries: Vec<SolverEntry<Graph<V, E>>>, args: &SolveArgs) -> Result<bool>
where
    Graph<V, E>: GameFile,
{
    let solver = find(entries, &args.solver).ok_or_else(|| {
        anyhow!(
            "no {} solver with id '{}' (see `ggg list-solvers --game {}`)",
            args.game,
            args.solver,
            args.game
        )
    })?;
    let graph: Graph<V, E> = ggg_arena::load(&args.input)
        .with_context(|| format!("failed to load {}", args.input.display()))?;

    let run = solve_timed(solver.as_ref(), &graph);
    let seconds = run.elapsed.as_secs_f64();
    let solution = run
        .result
        .with_context(|| format!("{} failed on {}", solver.name(), args.input.display()))?;
    info!(
        solver = solver.name(),
        seconds,
        solved = solution.is_solved(),
        "solve finished"
    );

    let mut out = open_output(args.output.as_deref())?;
    if args.time_only {
        writeln!(out, "{seconds:.6}")?;
    } else if args.json {
        serde_json::to_writer_pretty(&mut out, &solution)?;
        writeln!(out)?;
    } else if args.csv {
        write_csv(out.as_mut(), &graph, &solution)?;
    } else {
        writeln!(out, "Solver: {}", solver.name())?;
        writeln!(
            out,
            "Game: {} ({} vertices, {} edges)",
            args.input.display(),
            graph.len(),
            graph.edge_count()
        )?;
        writeln!(
            out,
            "Valid: {}  Solved: {}",
            yes_no(solution.is_valid()),
            yes_no(solution.is_solved())
        )?;
        writeln!(out, "Time: {seconds:.6} s")?;
        writeln!(out)?;
        write_table(out.as_mut(), &graph, &solution)?;
        if !solution.stats().is_empty() {
            writeln!(out)?;
            writeln!(out, "Statistics: {}", solution.stats())?;
        }
    }
    out.flush()?;
    Ok(solution.is_valid() && solution.is_solved())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn write_csv<V, E>(out: &mut dyn Write, graph: &Graph<V, E>, solution: &Solution) -> Result<()> {
    writeln!(out, "vertex,winner,strategy,value")?;
    for v in graph.ids() {
        let winner = solution.winner(v).map(|p| p.to_string()).unwrap_or_default();
        let strategy = solution
            .strategy(v)
            .map(|s| csv_field(graph.name(s)))
            .unwrap_or_default();
        let value = solution.value(v).map(|x| format!("{x:.6}")).unwrap_or_default();
        writeln!(out, "{},{winner},{strategy},{value}", csv_field(graph.name(v)))?;
    }
    Ok(())
}

fn write_table<V, E>(out: &mut dyn Write, graph: &Graph<V, E>, solution: &Solution) -> Result<()> {
    let width = graph.ids().map(|v| graph.name(v).len()).max().unwrap_or(0);
    for v in graph.ids() {
        let winner = solution
            .winner(v)
            .map_or_else(|| "-".to_string(), |p| p.to_string());
        let strategy = solution.strategy(v).map_or("-", |s| graph.name(s));
        write!(
            out,
            "{:<width$}  winner {winner}  strategy {strategy}",
            graph.name(v)
        )?;
        if let Some(value) = solution.value(v) {
            write!(out, "  value {value:.6}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}
