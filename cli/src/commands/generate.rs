//! Generate command - write seeded random games to a directory

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;

use ggg_arena::generate::{
    self, generate_many, DiscountedParams, MeanPayoffParams, ParityParams, StochasticParams,
    Topology,
};
use ggg_arena::{FileFormat, GameFile};
use ggg_engine::{GameKind, Priority};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Dot,
}

impl From<Format> for FileFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => FileFormat::Json,
            Format::Dot => FileFormat::Dot,
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Generate random games")]
pub struct GenerateArgs {
    /// Kind of game to generate
    pub kind: GameKind,

    /// Output directory, created if missing
    #[arg(long, short = 'o', default_value = ".")]
    pub output: PathBuf,

    /// Number of games
    #[arg(long, short = 'n', default_value_t = 1)]
    pub count: usize,

    #[arg(long, default_value_t = 10)]
    pub vertices: usize,

    #[arg(long, default_value_t = 1)]
    pub min_out_degree: usize,

    #[arg(long, default_value_t = 3)]
    pub max_out_degree: usize,

    /// Seed of the first game; game i uses seed + i
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Parity only
    #[arg(long, default_value_t = 0)]
    pub min_priority: Priority,

    /// Parity only
    #[arg(long, default_value_t = 5)]
    pub max_priority: Priority,

    /// Vertex weight (mean-payoff) or edge weight (discounted, stochastic)
    #[arg(long, default_value_t = -10, allow_negative_numbers = true)]
    pub min_weight: i64,

    #[arg(long, default_value_t = 10, allow_negative_numbers = true)]
    pub max_weight: i64,

    /// Discounted and stochastic only
    #[arg(long, default_value_t = 0.1)]
    pub min_discount: f64,

    #[arg(long, default_value_t = 0.9)]
    pub max_discount: f64,

    /// Stochastic only: share of vertices owned by chance
    #[arg(long, default_value_t = 0.3)]
    pub chance_ratio: f64,

    /// File format; DOT for parity and discounted games, JSON otherwise
    #[arg(long, value_enum)]
    pub format: Option<Format>,
}

impl GenerateArgs {
    fn topology(&self) -> Topology {
        Topology {
            vertices: self.vertices,
            min_out_degree: self.min_out_degree,
            max_out_degree: self.max_out_degree,
        }
    }

    fn file_format(&self) -> FileFormat {
        self.format
            .map_or_else(|| FileFormat::default_for(self.kind), FileFormat::from)
    }
}

pub fn execute(args: &GenerateArgs) -> Result<()> {
    fs::create_dir_all(&args.output)
        .with_context(|| format!("cannot create directory {}", args.output.display()))?;
    let topology = args.topology();
    let (min_weight, max_weight) = (args.min_weight as f64, args.max_weight as f64);

    match args.kind {
        GameKind::Parity => {
            let params = ParityParams {
                topology,
                min_priority: args.min_priority,
                max_priority: args.max_priority,
            };
            let games = generate_many(args.count, args.seed, |seed| generate::parity(&params, seed))?;
            write_games(args, &games)
        }
        GameKind::MeanPayoff => {
            let params = MeanPayoffParams {
                topology,
                min_weight: args.min_weight,
                max_weight: args.max_weight,
            };
            let games =
                generate_many(args.count, args.seed, |seed| generate::mean_payoff(&params, seed))?;
            write_games(args, &games)
        }
        GameKind::Discounted => {
            let params = DiscountedParams {
                topology,
                min_weight,
                max_weight,
                min_discount: args.min_discount,
                max_discount: args.max_discount,
            };
            let games =
                generate_many(args.count, args.seed, |seed| generate::discounted(&params, seed))?;
            write_games(args, &games)
        }
        GameKind::Stochastic => {
            let params = StochasticParams {
                topology,
                min_weight,
                max_weight,
                min_discount: args.min_discount,
                max_discount: args.max_discount,
                chance_ratio: args.chance_ratio,
            };
            let games =
                generate_many(args.count, args.seed, |seed| generate::stochastic(&params, seed))?;
            write_games(args, &games)
        }
    }
}

/// File name of the `index`-th generated game, counting from 1
pub fn file_name(kind: GameKind, index: usize, format: FileFormat) -> String {
    format!(
        "{}_game_{index}.{}",
        kind.as_str().replace('-', "_"),
        format.extension()
    )
}

fn write_games<G: GameFile>(args: &GenerateArgs, games: &[G]) -> Result<()> {
    let format = args.file_format();
    for (i, game) in games.iter().enumerate() {
        let path = args.output.join(file_name(args.kind, i + 1, format));
        ggg_arena::save(game, &path)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    info!(
        kind = %args.kind,
        count = games.len(),
        dir = %args.output.display(),
        "games written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        assert_eq!(
            file_name(GameKind::Parity, 1, FileFormat::Dot),
            "parity_game_1.dot"
        );
        assert_eq!(
            file_name(GameKind::MeanPayoff, 12, FileFormat::Json),
            "mean_payoff_game_12.json"
        );
    }
}
