//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Personal study timer.
///
/// Tracks study sessions in a local SQLite log and reports streaks,
/// averages, and a yearly heatmap. `st serve` runs the toggle daemon with
/// the OBS overlay WebSocket; bind a global hot-key to `st toggle`.
#[derive(Debug, Parser)]
#[command(name = "st", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the full statistics snapshot.
    Stats {
        /// Output as JSON instead of the human-readable table.
        #[arg(long)]
        json: bool,
    },

    /// Render the yearly study heatmap.
    Heatmap {
        /// Year to render (defaults to the current year).
        #[arg(long)]
        year: Option<i32>,

        /// Output the per-date summary as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Inspect and adjust the session log.
    Log {
        #[command(subcommand)]
        action: LogAction,
    },

    /// Export all sessions as a JSON array.
    Export {
        /// Write to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import sessions from a JSON array file.
    Import {
        /// File produced by `st export` (or compatible).
        file: PathBuf,
    },

    /// Run the timer daemon with the overlay WebSocket.
    Serve,

    /// Toggle the timer on the running daemon.
    Toggle,

    /// Show current tracking status.
    Status,
}

/// Session log operations.
#[derive(Debug, Subcommand)]
pub enum LogAction {
    /// List recent sessions.
    List {
        /// Maximum number of sessions to show (0 = all).
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Add minutes of study to a date, anchored at midnight.
    Add {
        /// Target date (YYYY-MM-DD).
        #[arg(long)]
        date: NaiveDate,

        /// Minutes to add (positive).
        #[arg(long)]
        minutes: i64,
    },

    /// Deduct minutes from a date, consuming newest sessions first.
    Deduct {
        /// Target date (YYYY-MM-DD).
        #[arg(long)]
        date: NaiveDate,

        /// Minutes to deduct (positive).
        #[arg(long)]
        minutes: i64,
    },

    /// Apply a signed minute delta to one session.
    Edit {
        /// Session ID.
        #[arg(long)]
        id: i64,

        /// Minute delta; a result of zero or below deletes the session.
        #[arg(long, allow_hyphen_values = true)]
        minutes: i64,
    },

    /// Delete one session by ID.
    Delete {
        /// Session ID.
        #[arg(long)]
        id: i64,
    },
}
