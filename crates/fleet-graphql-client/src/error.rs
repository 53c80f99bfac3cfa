// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Query failure taxonomy

use fleet_domain_types::{QueryErrorKind, QueryResult};
use std::time::Duration;
use thiserror::Error;

/// Reasons a query produced nothing usable
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("transport failure: request timed out after {0:?}")]
    Timeout(Duration),

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("empty response")]
    EmptyResponse,

    #[error("invalid JSON: {preview}")]
    InvalidJson { preview: String },

    /// First message of a GraphQL `errors` array
    #[error("{0}")]
    GraphQl(String),

    #[error("HTTP {0}")]
    HttpStatus(u16),
}

impl QueryError {
    pub fn kind(&self) -> QueryErrorKind {
        match self {
            QueryError::Transport(_) | QueryError::Timeout(_) | QueryError::ClientBuild(_) => {
                QueryErrorKind::Transport
            }
            QueryError::EmptyResponse
            | QueryError::InvalidJson { .. }
            | QueryError::GraphQl(_)
            | QueryError::HttpStatus(_) => QueryErrorKind::Protocol,
        }
    }

    /// Turn the error into a failed query result
    pub fn into_result(self) -> QueryResult {
        QueryResult::error(self.kind(), self.to_string())
    }
}

impl From<reqwest::Error> for QueryError {
    fn from(err: reqwest::Error) -> Self {
        QueryError::Transport(error_chain(&err))
    }
}

/// Render an error with all of its sources, outermost first
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut rendered = err.to_string();
    let mut current = err.source();
    while let Some(source) = current {
        let text = source.to_string();
        if !rendered.contains(&text) {
            rendered.push_str(": ");
            rendered.push_str(&text);
        }
        current = source.source();
    }
    rendered
}
