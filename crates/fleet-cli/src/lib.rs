// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Fleet report command-line interface
//!
//! The binary discovers servers from the environment, queries them
//! concurrently, and writes one markdown report. Everything except signal
//! handling and process exit lives here so it can be driven from tests.

pub mod app;
pub mod diagnostics;
pub mod output;
pub mod pipeline;
pub mod settings;

use std::path::PathBuf;

pub use clap::Parser;
use fleet_logging::CliLoggingArgs;

pub use app::{execute, exit_code, AppError, RunOutcome, EXIT_INTERRUPTED};
pub use settings::{ReportSettings, SettingsError, SettingsOverrides};

/// Component name used for log files and filters
pub const COMPONENT: &str = "fleet-report";

#[derive(Parser, Debug, Clone)]
#[command(name = "fleet-report")]
#[command(about = "Query storage servers over GraphQL and write a fleet status report")]
#[command(version)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Where to write the markdown report
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Prefix of the server discovery variables (`<PREFIX>_<NAME>_URL`)
    #[arg(long, value_name = "PREFIX")]
    pub env_prefix: Option<String>,

    /// Per-server query timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Maximum number of servers queried at once
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Use partial data when a response carries GraphQL errors alongside data
    #[arg(long)]
    pub ignore_errors: bool,

    /// Skip TLS certificate verification
    #[arg(long)]
    pub insecure_tls: bool,

    /// Write every server's raw response to the diagnostics directory
    #[arg(long)]
    pub debug: bool,

    /// Directory for per-server diagnostic payloads
    #[arg(long, value_name = "DIR")]
    pub diagnostics_dir: Option<PathBuf>,

    /// Also print the report to stdout
    #[arg(long)]
    pub print: bool,

    #[command(flatten)]
    pub logging: CliLoggingArgs,
}

impl Cli {
    /// Settings layer contributed by the command line
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            config_file: self.config.clone(),
            output_path: self.output.clone(),
            env_prefix: self.env_prefix.clone(),
            timeout_secs: self.timeout_secs,
            concurrency: self.concurrency,
            ignore_errors: self.ignore_errors.then_some(true),
            insecure_tls: self.insecure_tls.then_some(true),
            debug: self.debug.then_some(true),
            diagnostics_dir: self.diagnostics_dir.clone(),
        }
    }
}
