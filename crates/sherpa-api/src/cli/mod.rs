//! CLI command definitions for the `sherpa` binary.

pub mod ask;
pub mod status;

use clap::{Parser, Subcommand};

/// Conversational city tour guide.
#[derive(Parser)]
#[command(name = "sherpa", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also export spans to stdout via OpenTelemetry.
    #[arg(long, global = true, env = "SHERPA_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server.
    Serve {
        /// Port to listen on (defaults to `[server].port`).
        #[arg(long)]
        port: Option<u16>,

        /// Address to bind (defaults to `[server].host`).
        #[arg(long)]
        host: Option<String>,
    },

    /// Run a single turn and print the reply.
    Ask {
        /// What the visitor says.
        query: String,

        /// City the visitor is in.
        #[arg(long)]
        city: String,

        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        /// Treat this as the first turn of the conversation.
        #[arg(long)]
        first: bool,

        /// Session to continue.
        #[arg(long, default_value = "default")]
        session: String,
    },

    /// Show resolved configuration and which credentials are present.
    Status,
}

impl Cli {
    /// Log filter directive for the chosen verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "warn",
            1 => "info,sherpa_core=debug,sherpa_infra=debug",
            _ => "trace",
        }
    }
}
