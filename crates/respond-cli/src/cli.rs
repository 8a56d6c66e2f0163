//! Command-line interface definition using clap.

use clap::{Parser, Subcommand};
use respond_models::Location;
use std::path::PathBuf;

/// Build version string with git hash and build date.
fn version_string() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const BUILD_DATE: &str = env!("BUILD_DATE");

    static VERSION_STRING: std::sync::OnceLock<String> = std::sync::OnceLock::new();
    VERSION_STRING.get_or_init(|| format!("{} ({}, {})", VERSION, GIT_HASH, BUILD_DATE))
}

/// respond - emergency resource dispatch, evacuation and notification planning
#[derive(Parser, Debug)]
#[command(name = "respond")]
#[command(author, version = version_string(), about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the engine config file
    #[arg(short, long, env = "RESPOND_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Write output to this file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assign resources to incidents and print the mapping
    Optimize {
        /// Scenario file with incidents and resources
        scenario: PathBuf,
    },

    /// Assign resources and print per-assignment details
    Details {
        /// Scenario file with incidents and resources
        scenario: PathBuf,
    },

    /// Plan an evacuation around a location
    Evacuate {
        /// Venue layout file
        layout: PathBuf,

        /// Incident location as "x,y"
        #[arg(long, value_parser = parse_location, allow_hyphen_values = true)]
        at: Location,

        /// Crowd count file ({"zone id": count})
        #[arg(long)]
        crowd: PathBuf,
    },

    /// Build the notification plan for one incident
    Notify {
        /// Scenario file with incidents and resources
        scenario: PathBuf,

        /// Incident id
        #[arg(short, long)]
        incident: String,
    },

    /// Run dispatch, evacuation and notification planning for one incident
    Plan {
        /// Scenario file with incidents and resources
        scenario: PathBuf,

        /// Incident id
        #[arg(short, long)]
        incident: String,

        /// Venue layout file (overrides the scenario's layout)
        #[arg(long)]
        layout: Option<PathBuf>,

        /// Crowd count file (overrides the scenario's crowd)
        #[arg(long)]
        crowd: Option<PathBuf>,
    },

    /// Show the effective configuration
    Config,
}

/// Output format for command results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Parses "x,y" into a location.
pub fn parse_location(s: &str) -> Result<Location, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected \"x,y\", got {:?}", s))?;
    let x: f64 = x
        .trim()
        .parse()
        .map_err(|e| format!("invalid x coordinate {:?}: {}", x, e))?;
    let y: f64 = y
        .trim()
        .parse()
        .map_err(|e| format!("invalid y coordinate {:?}: {}", y, e))?;

    let location = Location::new(x, y);
    if !location.is_finite() {
        return Err(format!("coordinates must be finite, got {:?}", s));
    }
    Ok(location)
}

impl Cli {
    /// Returns the log level based on verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
