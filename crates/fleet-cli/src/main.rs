// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;
use fleet_cli::{execute, exit_code, Cli, Parser, ReportSettings, COMPONENT, EXIT_INTERRUPTED};
use fleet_graphql_client::QueryClient;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            error!(error = %format!("{err:#}"), "fleet report failed");
            eprintln!("Error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let env = fleet_registry::process_env_snapshot();
    let settings = ReportSettings::load(&cli.overrides(), &env)?;

    cli.logging
        .clone()
        .init(COMPONENT, &settings.logging)
        .context("failed to initialise logging")?;

    let client = QueryClient::http()?;

    tokio::select! {
        outcome = execute(&settings, &env, &client, Utc::now()) => {
            let outcome = outcome?;
            if cli.print {
                print!("{}", outcome.markdown);
            }
            info!(
                path = %outcome.report_path.display(),
                servers = outcome.server_count,
                failed = outcome.failed_count,
                "done"
            );
            Ok(ExitCode::SUCCESS)
        }
        signal = shutdown_signal() => {
            warn!(signal, "termination signal received, report not written");
            Ok(ExitCode::from(EXIT_INTERRUPTED))
        }
    }
}

/// Resolves with the name of the first termination signal received
async fn shutdown_signal() -> &'static str {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => tokio::select! {
                _ = ctrl_c() => "SIGINT",
                _ = sigterm.recv() => "SIGTERM",
            },
            Err(err) => {
                warn!(error = %err, "cannot install SIGTERM handler");
                ctrl_c().await;
                "SIGINT"
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c().await;
        "ctrl-c"
    }
}

/// Ctrl-C, or never when the handler cannot be installed
async fn ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "cannot install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
}
