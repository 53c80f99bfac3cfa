// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Configuration errors raised while discovering servers

use thiserror::Error;

/// Result type alias for registry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal configuration problems; any of these aborts the run before querying
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("No servers configured: set {prefix}_<NAME>_URL and {prefix}_<NAME>_API_KEY")]
    NoServers { prefix: String },

    #[error("Server '{name}' has no API key: {variable} is missing or empty")]
    MissingApiKey { name: String, variable: String },

    #[error("Invalid server name '{0}': use letters, digits and single underscores")]
    InvalidServerName(String),

    #[error("Invalid URL for server '{name}' in {variable}: {reason}")]
    InvalidUrl {
        name: String,
        variable: String,
        reason: String,
    },

    #[error("Invalid environment prefix '{0}'")]
    InvalidPrefix(String),
}
