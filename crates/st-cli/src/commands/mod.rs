//! CLI subcommand implementations.

pub mod export;
pub mod heatmap;
pub mod import;
pub mod log;
pub mod overlay;
pub mod serve;
pub mod stats;
pub mod status;
pub mod toggle;
