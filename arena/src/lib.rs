//! ggg Arena - game files and random game generation
//!
//! Reads and writes every game kind as JSON or as the DOT subset the
//! generators emit, and generates seeded random games for benchmarks.
//! [`load`] and [`save`] pick the format from the file extension.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use ggg_engine::{DiscountedGraph, GameKind, MeanPayoffGraph, ParityGraph, StochasticGraph};

pub mod dot;
pub mod error;
pub mod generate;
pub mod json;

pub use error::{FormatError, GenerateError};

/// On-disk encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Dot,
}

impl FileFormat {
    /// Format implied by the extension of `path`
    pub fn from_path(path: &Path) -> Result<Self, FormatError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match ext.as_str() {
            "json" => Ok(FileFormat::Json),
            "dot" | "gv" => Ok(FileFormat::Dot),
            _ => Err(FormatError::Extension(ext)),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            FileFormat::Json => "json",
            FileFormat::Dot => "dot",
        }
    }

    /// Format the generators write for `kind` by default
    pub fn default_for(kind: GameKind) -> Self {
        match kind {
            GameKind::Parity | GameKind::Discounted => FileFormat::Dot,
            GameKind::MeanPayoff | GameKind::Stochastic => FileFormat::Json,
        }
    }
}

/// A game graph that can be stored in either file format.
pub trait GameFile: Sized {
    const KIND: GameKind;

    fn read(path: &Path) -> Result<Self, FormatError>;
    fn write(&self, path: &Path) -> Result<(), FormatError>;
}

macro_rules! game_file {
    ($graph:ty, $kind:expr, $read:ident, $write:ident) => {
        impl GameFile for $graph {
            const KIND: GameKind = $kind;

            fn read(path: &Path) -> Result<Self, FormatError> {
                let format = FileFormat::from_path(path)?;
                let reader = BufReader::new(File::open(path)?);
                match format {
                    FileFormat::Json => json::$read(reader),
                    FileFormat::Dot => dot::$read(reader),
                }
            }

            fn write(&self, path: &Path) -> Result<(), FormatError> {
                let format = FileFormat::from_path(path)?;
                let writer = BufWriter::new(File::create(path)?);
                match format {
                    FileFormat::Json => json::$write(self, writer),
                    FileFormat::Dot => dot::$write(self, writer),
                }
            }
        }
    };
}

game_file!(ParityGraph, GameKind::Parity, read_parity, write_parity);
game_file!(MeanPayoffGraph, GameKind::MeanPayoff, read_mean_payoff, write_mean_payoff);
game_file!(DiscountedGraph, GameKind::Discounted, read_discounted, write_discounted);
game_file!(StochasticGraph, GameKind::Stochastic, read_stochastic, write_stochastic);

/// Load a game, choosing JSON or DOT from the extension.
pub fn load<G: GameFile>(path: impl AsRef<Path>) -> Result<G, FormatError> {
    let path = path.as_ref();
    let graph = G::read(path)?;
    tracing::debug!(kind = %G::KIND, path = %path.display(), "loaded game");
    Ok(graph)
}

/// Save a game, choosing JSON or DOT from the extension.
pub fn save<G: GameFile>(graph: &G, path: impl AsRef<Path>) -> Result<(), FormatError> {
    graph.write(path.as_ref())
}

pub fn load_parity(path: impl AsRef<Path>) -> Result<ParityGraph, FormatError> {
    load(path)
}

pub fn load_mean_payoff(path: impl AsRef<Path>) -> Result<MeanPayoffGraph, FormatError> {
    load(path)
}

pub fn load_discounted(path: impl AsRef<Path>) -> Result<DiscountedGraph, FormatError> {
    load(path)
}

pub fn load_stochastic(path: impl AsRef<Path>) -> Result<StochasticGraph, FormatError> {
    load(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ggg_engine::fixtures;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(FileFormat::from_path(Path::new("a/b.JSON")).unwrap(), FileFormat::Json);
        assert_eq!(FileFormat::from_path(Path::new("g.dot")).unwrap(), FileFormat::Dot);
        assert!(matches!(
            FileFormat::from_path(Path::new("g.txt")),
            Err(FormatError::Extension(ext)) if ext == "txt"
        ));
        assert!(FileFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_save_and_load_both_formats() {
        let dir = std::env::temp_dir().join(format!("ggg-arena-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let graph = fixtures::mp_choice();
        for ext in ["json", "dot"] {
            let path = dir.join(format!("choice.{ext}"));
            save(&graph, &path).unwrap();
            let back = load_mean_payoff(&path).unwrap();
            assert_eq!(back.vertices(), graph.vertices());
            for v in graph.ids() {
                assert_eq!(back.edges(v), graph.edges(v));
            }
        }
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            load_parity("/nonexistent/ggg/game.dot"),
            Err(FormatError::Io(_))
        ));
    }
}
