// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Layered run settings
//!
//! Precedence, lowest first: built-in defaults, the TOML file given with
//! `--config`, `FLEET_REPORT_*` environment variables, command-line flags.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use config::{Case, Config, Environment, File, FileFormat};
use fleet_graphql_client::QueryOptions;
use fleet_logging::LoggingConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::diagnostics::default_diagnostics_dir;

/// Prefix of environment variables that override settings
pub const SETTINGS_ENV_PREFIX: &str = "FLEET_REPORT";

pub const DEFAULT_OUTPUT_PATH: &str = "fleet-report.md";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONCURRENCY: usize = 8;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid value for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Effective settings for one run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReportSettings {
    pub output_path: PathBuf,
    pub env_prefix: String,
    pub timeout_secs: u64,
    pub concurrency: usize,
    pub ignore_errors: bool,
    pub insecure_tls: bool,
    pub debug: bool,
    pub diagnostics_dir: PathBuf,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Values given on the command line; `None` leaves lower layers in charge
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub config_file: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
    pub env_prefix: Option<String>,
    pub timeout_secs: Option<u64>,
    pub concurrency: Option<usize>,
    pub ignore_errors: Option<bool>,
    pub insecure_tls: Option<bool>,
    pub debug: Option<bool>,
    pub diagnostics_dir: Option<PathBuf>,
}

fn path_value(path: &Option<PathBuf>) -> Option<String> {
    path.as_deref().map(|p| p.to_string_lossy().into_owned())
}

impl ReportSettings {
    /// Resolve settings from every layer
    ///
    /// `env` is the process environment snapshot; only `FLEET_REPORT_*`
    /// entries are consulted.
    pub fn load(
        overrides: &SettingsOverrides,
        env: &[(String, String)],
    ) -> Result<Self, SettingsError> {
        let head = format!("{}_", SETTINGS_ENV_PREFIX);
        let env_layer: HashMap<String, String> = env
            .iter()
            .filter(|(key, _)| key.starts_with(&head))
            .cloned()
            .collect();

        let mut builder = Config::builder()
            .set_default("output-path", DEFAULT_OUTPUT_PATH)?
            .set_default("env-prefix", fleet_registry::DEFAULT_PREFIX)?
            .set_default("timeout-secs", DEFAULT_TIMEOUT_SECS)?
            .set_default("concurrency", DEFAULT_CONCURRENCY as u64)?
            .set_default("ignore-errors", false)?
            .set_default("insecure-tls", false)?
            .set_default("debug", false)?
            .set_default(
                "diagnostics-dir",
                default_diagnostics_dir().to_string_lossy().into_owned(),
            )?;

        if let Some(path) = &overrides.config_file {
            builder = builder.add_source(
                File::from(path.as_path())
                    .format(FileFormat::Toml)
                    .required(true),
            );
        }

        builder = builder
            .add_source(
                Environment::with_prefix(SETTINGS_ENV_PREFIX)
                    .prefix_separator("_")
                    .convert_case(Case::Kebab)
                    .try_parsing(true)
                    .source(Some(env_layer)),
            )
            .set_override_option("output-path", path_value(&overrides.output_path))?
            .set_override_option("env-prefix", overrides.env_prefix.clone())?
            .set_override_option("timeout-secs", overrides.timeout_secs)?
            .set_override_option("concurrency", overrides.concurrency.map(|n| n as u64))?
            .set_override_option("ignore-errors", overrides.ignore_errors)?
            .set_override_option("insecure-tls", overrides.insecure_tls)?
            .set_override_option("debug", overrides.debug)?
            .set_override_option("diagnostics-dir", path_value(&overrides.diagnostics_dir))?;

        let settings: ReportSettings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.timeout_secs == 0 {
            return Err(SettingsError::Invalid {
                key: "timeout-secs",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.concurrency == 0 {
            return Err(SettingsError::Invalid {
                key: "concurrency",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(SettingsError::Invalid {
                key: "output-path",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn query_options(&self) -> QueryOptions {
        QueryOptions {
            ignore_errors: self.ignore_errors,
            insecure_tls: self.insecure_tls,
            timeout: self.timeout(),
        }
    }
}
