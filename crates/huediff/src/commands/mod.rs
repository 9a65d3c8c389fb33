use crate::config::{Config, DiffAlgorithm, OutputFormat};
use clap::{Subcommand, ValueEnum};
use huediff_core::{Mode, Side};
use std::path::PathBuf;

pub mod diff;
pub mod session;

/// Accept any mode name; unknown names compare as text
fn parse_mode(name: &str) -> Result<Mode, String> {
    Ok(Mode::resolve(name))
}

/// Which of the two session inputs a command applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Slot {
    #[value(name = "1", alias = "old")]
    First,
    #[value(name = "2", alias = "new")]
    Second,
}

impl From<Slot> for Side {
    fn from(slot: Slot) -> Self {
        match slot {
            Slot::First => Side::Old,
            Slot::Second => Side::New,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compare two files (or stdin with `-`)
    Diff {
        /// First input
        old: String,

        /// Second input
        new: String,

        /// Comparison granularity
        #[arg(short, long, value_parser = parse_mode)]
        mode: Option<Mode>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Diff algorithm
        #[arg(short, long, value_enum)]
        algorithm: Option<DiffAlgorithm>,

        /// Treat OLD and NEW as the text to compare instead of paths
        #[arg(short, long)]
        literal: bool,
    },

    /// Work with the persisted comparison session
    Session {
        #[command(subcommand)]
        command: SessionCommand,
    },

    /// List the available modes
    Modes,
}

#[derive(Subcommand)]
pub enum SessionCommand {
    /// Print the current comparison
    Show {
        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Replace an input with the contents of a file (or stdin with `-`)
    Set {
        #[arg(value_enum)]
        slot: Slot,

        source: PathBuf,
    },

    /// Replace an input with the clipboard text
    Paste {
        #[arg(value_enum)]
        slot: Slot,
    },

    /// Clear one input, or the whole session when no input is given
    Clear {
        #[arg(value_enum)]
        slot: Option<Slot>,
    },

    /// Change the comparison granularity
    Mode {
        #[arg(value_parser = parse_mode)]
        mode: Mode,
    },
}

impl Commands {
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        match self {
            Commands::Diff {
                old,
                new,
                mode,
                format,
                algorithm,
                literal,
            } => diff::execute(
                config,
                diff::Options {
                    old,
                    new,
                    mode: mode.unwrap_or(config.default_mode),
                    format: format.unwrap_or(config.format),
                    algorithm: algorithm.unwrap_or(config.algorithm),
                    literal: *literal,
                },
            ),
            Commands::Session { command } => session::execute(config, command),
            Commands::Modes => {
                for mode in Mode::ALL {
                    println!("{mode}");
                }
                Ok(())
            }
        }
    }
}
