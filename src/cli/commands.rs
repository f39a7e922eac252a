//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Streamkap provider CLI
#[derive(Parser, Debug)]
#[command(name = "streamkap-provider")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Provider configuration file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// API host, overrides the config file and STREAMKAP_HOST
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Extra connector definitions (built-in name or YAML path)
    #[arg(short, long, global = true)]
    pub connector: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List resource types
    Types,

    /// Print the schema of a resource type
    Schema {
        /// Resource type, e.g. streamkap_source_postgresql
        type_name: String,
    },

    /// Print flag snapshots of every schema
    Snapshot,

    /// Check a resource configuration without calling the API
    Validate {
        /// Resource type
        type_name: String,

        /// Inline configuration JSON
        #[arg(long)]
        config_json: Option<String>,

        /// Configuration file (JSON)
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Fetch an existing resource by id and print its state
    Import {
        /// Resource type
        type_name: String,

        /// Server id (topic name for topics)
        id: String,
    },

    /// Refresh a state document
    Read {
        /// Resource type
        type_name: String,

        /// Inline state JSON
        #[arg(long)]
        state_json: Option<String>,

        /// State file (JSON)
        #[arg(long)]
        state: Option<PathBuf>,
    },

    /// Delete the resource a state document points to
    Delete {
        /// Resource type
        type_name: String,

        /// Inline state JSON
        #[arg(long)]
        state_json: Option<String>,

        /// State file (JSON)
        #[arg(long)]
        state: Option<PathBuf>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}

impl Commands {
    /// Subcommand name as typed on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Types => "types",
            Commands::Schema { .. } => "schema",
            Commands::Snapshot => "snapshot",
            Commands::Validate { .. } => "validate",
            Commands::Import { .. } => "import",
            Commands::Read { .. } => "read",
            Commands::Delete { .. } => "delete",
        }
    }
}
