//! CLI definitions for the `emissary` binary.

pub mod ask;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Chat orchestration service in front of a hosted generative model.
#[derive(Parser)]
#[command(name = "emissary", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config.toml (default: $EMISSARY_HOME/config.toml).
    #[arg(long, global = true, env = "EMISSARY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server.
    Serve {
        /// Port to listen on (default: [server] port, 1956).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (default: [server] host, 0.0.0.0).
        #[arg(long)]
        host: Option<String>,
    },

    /// Ask one question and print the answer as it streams.
    Ask {
        /// VAC (configuration) to answer with.
        vector_name: String,

        /// The question.
        question: String,

        /// Extra instructions placed ahead of the system prompt.
        #[arg(long)]
        instructions: Option<String>,

        /// Attach the call to this trace id.
        #[arg(long)]
        trace_id: Option<String>,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
