// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Logging configuration types

use serde::{Deserialize, Serialize};

use crate::{CliLogLevel, LogFormat};

/// Logging section of the report configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LoggingConfig {
    /// Logging verbosity level
    #[serde(default)]
    pub log_level: Option<CliLogLevel>,

    /// Output format for log records
    #[serde(default)]
    pub log_format: Option<LogFormat>,
}
