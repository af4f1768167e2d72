//! Command-line and environment configuration.
//!
//! Two subcommands share the dataset options:
//!
//! - `serve` (the default) ingests manifests and serves frames over HTTP
//! - `inspect` ingests one manifest, decodes one frame and prints it as JSON
//!
//! # Environment Variables
//!
//! - `MFL_HOST` - Server bind address (default: 0.0.0.0)
//! - `MFL_PORT` - Server port (default: 3000)
//! - `MFL_DATASETS` - Dataset manifests to ingest (comma-separated)
//! - `MFL_STRICT_FRAMES` - Reject truncated frames instead of zero-filling
//! - `MFL_CORS_ORIGINS` - Allowed CORS origins (comma-separated)
//! - `MFL_CACHE_MAX_AGE` - HTTP cache max-age seconds (default: 3600)

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::format::TruncationPolicy;
use crate::metadata::ModuleType;

// =============================================================================
// Default Values
// =============================================================================

pub const DEFAULT_HOST: &str = "0.0.0.0";

pub const DEFAULT_PORT: u16 = 3000;

/// Default HTTP cache max-age in seconds (1 hour).
pub const DEFAULT_CACHE_MAX_AGE: u32 = 3600;

// =============================================================================
// CLI
// =============================================================================

/// Multi-frame image loader.
///
/// Decodes frames of multi-frame medical image datasets and serves them,
/// together with per-frame metadata modules, to a rendering host.
#[derive(Parser, Debug)]
#[command(name = "multiframe-loader")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Options for `serve` when no subcommand is given
    #[command(flatten)]
    pub serve: ServeConfig,
}

impl Cli {
    /// Resolve the subcommand, defaulting to `serve`.
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Serve(self.serve))
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Serve frames and metadata over HTTP
    Serve(ServeConfig),

    /// Decode one frame and print its description and metadata
    Inspect(InspectConfig),
}

// =============================================================================
// Serve
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "MFL_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "MFL_PORT")]
    pub port: u16,

    /// Dataset manifest to ingest at startup (repeatable).
    #[arg(long = "dataset", env = "MFL_DATASETS", value_delimiter = ',')]
    pub datasets: Vec<PathBuf>,

    /// Fail frames that run past the end of the pixel buffer instead of
    /// zero-filling them.
    #[arg(long, env = "MFL_STRICT_FRAMES")]
    pub strict_frames: bool,

    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "MFL_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    /// HTTP Cache-Control max-age in seconds.
    #[arg(long, default_value_t = DEFAULT_CACHE_MAX_AGE, env = "MFL_CACHE_MAX_AGE")]
    pub cache_max_age: u32,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("Host must not be empty. Set --host or MFL_HOST".to_string());
        }

        if let Some(path) = self.datasets.iter().find(|p| p.as_os_str().is_empty()) {
            return Err(format!("Empty dataset manifest path: {:?}", path));
        }

        if let Some(origins) = &self.cors_origins {
            if origins.iter().any(|o| o.trim().is_empty()) {
                return Err("CORS origins must not contain empty entries".to_string());
            }
        }

        Ok(())
    }

    /// Server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn truncation_policy(&self) -> TruncationPolicy {
        policy_for(self.strict_frames)
    }
}

// =============================================================================
// Inspect
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct InspectConfig {
    /// Dataset manifest to ingest.
    #[arg(long, env = "MFL_DATASET")]
    pub dataset: PathBuf,

    /// Frame index to decode.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub frame: i64,

    /// Metadata module to print (repeatable). Prints every module when omitted.
    #[arg(long = "module")]
    pub modules: Vec<String>,

    /// Fail truncated frames instead of zero-filling them.
    #[arg(long, env = "MFL_STRICT_FRAMES")]
    pub strict_frames: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl InspectConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.dataset.as_os_str().is_empty() {
            return Err("Dataset manifest path is required. Set --dataset".to_string());
        }

        if let Some(unknown) = self.modules.iter().find(|m| ModuleType::parse(m).is_none()) {
            let known: Vec<&str> = ModuleType::ALL.iter().map(|m| m.as_str()).collect();
            return Err(format!(
                "Unknown module type '{}'. Expected one of: {}",
                unknown,
                known.join(", ")
            ));
        }

        Ok(())
    }

    /// Requested module types, or all of them when none were named.
    pub fn module_types(&self) -> Vec<ModuleType> {
        if self.modules.is_empty() {
            return ModuleType::ALL.to_vec();
        }
        self.modules
            .iter()
            .filter_map(|m| ModuleType::parse(m))
            .collect()
    }

    pub fn truncation_policy(&self) -> TruncationPolicy {
        policy_for(self.strict_frames)
    }
}

fn policy_for(strict: bool) -> TruncationPolicy {
    if strict {
        TruncationPolicy::Strict
    } else {
        TruncationPolicy::ZeroFill
    }
}

// =============================================================================
// Tests
// =============================================================================
