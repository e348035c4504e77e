use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "cooccur",
    version,
    about = "Record co-occurring labels and mine association rules from them"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Pretty-print JSON output (default: compact)
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Dataset file (overrides `dataset_path` from the configuration)
    #[arg(long, global = true)]
    pub dataset: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the HTTP API
    Serve {
        /// Address to bind (default: `listen` from the configuration)
        #[arg(short, long)]
        listen: Option<String>,
    },

    /// Start MCP (Model Context Protocol) server over stdio
    Mcp,

    /// Print every stored transaction
    List,

    /// Append a transaction
    Add {
        /// Item labels, as separate arguments or comma-separated
        #[arg(required = true, value_delimiter = ',')]
        items: Vec<String>,
    },

    /// Replace the transaction at an index
    Update {
        /// Zero-based index of the transaction
        #[arg(short, long)]
        index: usize,

        /// Item labels, as separate arguments or comma-separated
        #[arg(required = true, value_delimiter = ',')]
        items: Vec<String>,
    },

    /// Remove the transaction at an index
    Delete {
        /// Zero-based index of the transaction
        #[arg(short, long)]
        index: usize,
    },

    /// Remove every transaction
    Clear,

    /// Mine association rules from the dataset
    Rules {
        /// Minimum support, in (0, 1] (default: from configuration, 0.3)
        #[arg(short = 's', long)]
        min_support: Option<f64>,

        /// Minimum confidence, in (0, 1] (default: from configuration, 0.6)
        #[arg(short = 'c', long)]
        min_confidence: Option<f64>,
    },

    /// Generate default configuration file
    Init {
        /// Path to write the configuration file (default: ~/.config/cooccur/config.toml)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },
}
