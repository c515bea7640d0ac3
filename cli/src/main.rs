//! ggg CLI - solve, generate and benchmark games on graphs
//!
//! Logging goes to stderr through `tracing`; `RUST_LOG` overrides the level
//! chosen with `-v` / `-q`. The exit status is non-zero on any error and when
//! a solve did not finish.

mod commands;

use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ggg_engine::registry::{self, listing};
use ggg_engine::GameKind;

use commands::benchmark::{self, BenchmarkArgs};
use commands::generate::{self, GenerateArgs};
use commands::solve::{self, SolveArgs};

#[derive(Parser, Debug)]
#[command(name = "ggg")]
#[command(about = "Solvers for parity, mean-payoff and discounted games on graphs")]
#[command(version)]
struct Cli {
    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Solve(SolveArgs),
    Generate(GenerateArgs),
    /// List the solvers available for each kind of game
    ListSolvers {
        #[arg(long, short = 'g')]
        game: Option<GameKind>,
    },
    Benchmark(BenchmarkArgs),
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn list_solvers(game: Option<GameKind>) {
    let kinds: Vec<GameKind> = match game {
        Some(kind) => vec![kind],
        None => GameKind::ALL.to_vec(),
    };
    for kind in kinds {
        println!("{kind}:");
        for (id, name) in listing(kind) {
            println!("  {id:<14}{name}");
        }
    }
}

/// `Ok(false)` when the command ran but some solve did not succeed
fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Command::Solve(args) => match args.game {
            GameKind::Parity => solve::execute(registry::parity_solvers(), &args),
            GameKind::MeanPayoff => solve::execute(registry::mean_payoff_solvers(), &args),
            GameKind::Discounted => solve::execute(registry::discounted_solvers(), &args),
            GameKind::Stochastic => solve::execute(registry::stochastic_solvers(), &args),
        },
        Command::Generate(args) => generate::execute(&args).map(|()| true),
        Command::ListSolvers { game } => {
            list_solvers(game);
            Ok(true)
        }
        Command::Benchmark(args) => match args.game {
            GameKind::Parity => benchmark::execute(registry::parity_solvers(), &args),
            GameKind::MeanPayoff => benchmark::execute(registry::mean_payoff_solvers(), &args),
            GameKind::Discounted => benchmark::execute(registry::discounted_solvers(), &args),
            GameKind::Stochastic => benchmark::execute(registry::stochastic_solvers(), &args),
        },
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_solve_arguments() {
        let cli = Cli::try_parse_from([
            "ggg", "-vv", "solve", "--game", "mean-payoff", "--solver", "msca", "-i", "g.json",
            "--csv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Solve(args) => {
                assert_eq!(args.game, GameKind::MeanPayoff);
                assert_eq!(args.solver, "msca");
                assert!(args.csv);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_csv_conflicts_with_json() {
        let parsed = Cli::try_parse_from([
            "ggg", "solve", "-g", "parity", "-s", "pp", "-i", "g.dot", "--csv", "--json",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_generate_accepts_negative_weights() {
        let cli = Cli::try_parse_from([
            "ggg", "generate", "mean-payoff", "--min-weight", "-5", "--max-weight", "-1",
        ])
        .unwrap();
        match cli.command {
            Command::Generate(args) => {
                assert_eq!(args.min_weight, -5);
                assert_eq!(args.max_weight, -1);
                assert_eq!(args.count, 1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
