// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! One report run, from discovery to the written file

use std::io;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use fleet_graphql_client::QueryClient;
use fleet_registry::ServerRegistry;
use fleet_report::render;
use thiserror::Error;

use crate::diagnostics::write_diagnostics;
use crate::output::write_atomically;
use crate::pipeline::{query_all, reduce};
use crate::settings::{ReportSettings, SettingsError};

/// Exit status for configuration failures
pub const EXIT_CONFIG: u8 = 2;
/// Exit status for failures writing the report or starting up the client
pub const EXIT_FAILURE: u8 = 1;
/// Exit status when a termination signal abandons the run
pub const EXIT_INTERRUPTED: u8 = 130;

/// Run-level failures
///
/// Per-server failures never show up here; they degrade that server's
/// section of the report instead.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Registry(#[from] fleet_registry::Error),

    #[error("failed to write report to {path}: {source}")]
    WriteReport {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AppError {
    pub fn is_config_error(&self) -> bool {
        matches!(self, AppError::Settings(_) | AppError::Registry(_))
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_config_error() {
            EXIT_CONFIG
        } else {
            EXIT_FAILURE
        }
    }
}

/// Exit status for an error that ended the run
pub fn exit_code(err: &anyhow::Error) -> u8 {
    if let Some(app) = err.downcast_ref::<AppError>() {
        return app.exit_code();
    }
    if err.downcast_ref::<SettingsError>().is_some()
        || err.downcast_ref::<fleet_registry::Error>().is_some()
    {
        return EXIT_CONFIG;
    }
    EXIT_FAILURE
}

/// What a completed run produced
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report_path: PathBuf,
    pub markdown: String,
    pub server_count: usize,
    pub failed_count: usize,
    pub diagnostics: Vec<PathBuf>,
}

/// Discover, query, render and write
///
/// Configuration problems abort before any query is sent. Once servers are
/// discovered the report is always written, whatever individual servers did.
pub async fn execute(
    settings: &ReportSettings,
    env: &[(String, String)],
    client: &QueryClient,
    generated_at: DateTime<Utc>,
) -> Result<RunOutcome, AppError> {
    let registry = ServerRegistry::from_env(&settings.env_prefix, env.iter().cloned())?;
    tracing::info!(
        servers = registry.len(),
        prefix = registry.prefix(),
        concurrency = settings.concurrency,
        "discovered servers"
    );

    let runs = query_all(
        client,
        registry.servers(),
        &settings.query_options(),
        settings.concurrency,
    )
    .await;

    let report = render(&reduce(&runs), generated_at);
    let markdown = report.to_markdown();
    let server_count = runs.len();

    // File writes run on the blocking pool
    let diagnostics_dir = settings.diagnostics_dir.clone();
    let debug = settings.debug;
    let diagnostics =
        tokio::task::spawn_blocking(move || write_diagnostics(&diagnostics_dir, &runs, debug))
            .await
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, "diagnostics task failed");
                Vec::new()
            });

    let output_path = settings.output_path.clone();
    let contents = markdown.clone();
    tokio::task::spawn_blocking(move || write_atomically(&output_path, &contents))
        .await
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))
        .and_then(|written| written)
        .map_err(|source| AppError::WriteReport {
            path: settings.output_path.clone(),
            source,
        })?;

    let failed_count = report.failed_count();
    tracing::info!(
        path = %settings.output_path.display(),
        servers = server_count,
        failed = failed_count,
        "report written"
    );

    Ok(RunOutcome {
        report_path: settings.output_path.clone(),
        markdown,
        server_count,
        failed_count,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let config: anyhow::Error = AppError::Registry(fleet_registry::Error::NoServers {
            prefix: "FLEET".to_string(),
        })
        .into();
        assert_eq!(exit_code(&config), EXIT_CONFIG);

        let write: anyhow::Error = AppError::WriteReport {
            path: PathBuf::from("/readonly/report.md"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        }
        .into();
        assert_eq!(exit_code(&write), EXIT_FAILURE);

        let settings: anyhow::Error = SettingsError::Invalid {
            key: "concurrency",
            reason: "must be at least 1".to_string(),
        }
        .into();
        assert_eq!(exit_code(&settings), EXIT_CONFIG);

        assert_eq!(exit_code(&anyhow::anyhow!("logging failed")), EXIT_FAILURE);
    }
}
