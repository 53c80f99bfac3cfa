// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Per-server reduction of a query result into renderable state

use fleet_domain_types::{HealthFlags, QueryResult, ServerConfig, ServerSnapshot};

use crate::classify::classify;
use crate::extract::extract;

/// Overall status of one server in the report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Ok,
    Warnings,
    Error,
}

impl StatusLevel {
    pub fn emoji(&self) -> &'static str {
        match self {
            StatusLevel::Ok => "✅",
            StatusLevel::Warnings => "⚠️",
            StatusLevel::Error => "❌",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusLevel::Ok => "OK",
            StatusLevel::Warnings => "Warnings",
            StatusLevel::Error => "Error",
        }
    }
}

/// What is known about a server after its query
#[derive(Debug, Clone, PartialEq)]
pub enum ServerState {
    /// The query failed; nothing was extracted
    Failed { message: String },
    Reported {
        snapshot: Box<ServerSnapshot>,
        flags: HealthFlags,
        /// First GraphQL error of a partial success
        warning: Option<String>,
    },
}

/// A server paired with its state, ready to render
#[derive(Debug, Clone, PartialEq)]
pub struct ServerOutcome {
    pub server: ServerConfig,
    pub state: ServerState,
}

impl ServerOutcome {
    /// Extract and classify `result`, or record its failure
    ///
    /// Extraction is never attempted on a failed result.
    pub fn from_result(server: ServerConfig, result: &QueryResult) -> Self {
        let state = match extract(result) {
            Ok(snapshot) => {
                let flags = classify(&snapshot);
                ServerState::Reported {
                    snapshot: Box::new(snapshot),
                    flags,
                    warning: result.warning().map(str::to_string),
                }
            }
            Err(_) => ServerState::Failed {
                message: result
                    .error_message
                    .clone()
                    .unwrap_or_else(|| "unknown error".to_string()),
            },
        };
        Self { server, state }
    }

    pub fn failed(server: ServerConfig, message: impl Into<String>) -> Self {
        Self {
            server,
            state: ServerState::Failed {
                message: message.into(),
            },
        }
    }

    pub fn status_level(&self) -> StatusLevel {
        match &self.state {
            ServerState::Failed { .. } => StatusLevel::Error,
            ServerState::Reported {
                warning: Some(_), ..
            } => StatusLevel::Warnings,
            ServerState::Reported { .. } => StatusLevel::Ok,
        }
    }

    /// Number of flagged items, `None` for failed servers
    pub fn issue_count(&self) -> Option<usize> {
        match &self.state {
            ServerState::Failed { .. } => None,
            ServerState::Reported { flags, .. } => Some(flags.issue_count()),
        }
    }
}
