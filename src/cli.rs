//! Command-line interface for strictly_solitaire.

use clap::{Parser, Subcommand};

/// Strictly Solitaire - Freecell in the terminal
#[derive(Parser, Debug)]
#[command(name = "strictly_solitaire")]
#[command(about = "Freecell with paced auto-complete and statistics", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "freecell.toml", global = true)]
    pub config: std::path::PathBuf,

    /// Override the statistics database path
    #[arg(long, global = true)]
    pub db_path: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a freshly dealt layout
    Deal {
        /// Deal seed for a reproducible layout
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Load the near-won fixture and watch auto-complete finish it
    Demo,

    /// Play a game, one command per line
    Play {
        /// Deal seed for a reproducible layout
        #[arg(long)]
        seed: Option<u64>,

        /// Player name for statistics
        #[arg(long)]
        player: Option<String>,

        /// Move whole runs regardless of free space
        #[arg(long)]
        unbounded: bool,
    },

    /// Show statistics for a player
    Stats {
        /// Player name (defaults to the configured player)
        #[arg(long)]
        player: Option<String>,

        /// Number of recent games to list
        #[arg(long, default_value_t = strictly_solitaire::DEFAULT_RECENT_LIMIT)]
        recent: i64,
    },
}
