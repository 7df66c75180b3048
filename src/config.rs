//! Configuration and CLI argument handling

use std::path::PathBuf;
use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "enhance-your-calm")]
#[command(about = "A meditation countdown timer with an HTTP control surface")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Initial timer interval in minutes (overrides the stored preference)
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Directory for stored preferences and timer state
    #[arg(long, default_value = ".enhance-your-calm")]
    pub state_dir: PathBuf,

    /// Command line to run when the timer elapses, e.g. "paplay bowl.ogg"
    #[arg(short, long)]
    pub alarm_command: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
