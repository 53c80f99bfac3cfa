// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Outcome of a single GraphQL query

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Classification of a query response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryStatus {
    /// Usable data, no GraphQL errors
    Ok,
    /// Usable data accompanied by GraphQL errors (partial success)
    OkWithWarnings,
    /// Nothing usable came back
    Error,
}

/// Why a query failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryErrorKind {
    /// Network, DNS, TLS or timeout failure
    Transport,
    /// Empty body, invalid JSON, GraphQL errors without usable data
    Protocol,
}

/// Result of querying one server, produced once and never mutated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub status: QueryStatus,
    /// Parsed payload; present for `Ok` and `OkWithWarnings`
    pub raw_body: Option<Value>,
    /// Failure reason, or the first GraphQL error for `OkWithWarnings`
    pub error_message: Option<String>,
    /// Set only when `status` is `Error`
    pub error_kind: Option<QueryErrorKind>,
    /// Response text as received, kept for diagnostics
    #[serde(skip)]
    pub raw_text: Option<String>,
}

impl QueryResult {
    pub fn ok(body: Value) -> Self {
        Self {
            status: QueryStatus::Ok,
            raw_body: Some(body),
            error_message: None,
            error_kind: None,
            raw_text: None,
        }
    }

    pub fn with_warnings(body: Value, first_error: impl Into<String>) -> Self {
        Self {
            status: QueryStatus::OkWithWarnings,
            raw_body: Some(body),
            error_message: Some(first_error.into()),
            error_kind: None,
            raw_text: None,
        }
    }

    pub fn error(kind: QueryErrorKind, message: impl Into<String>) -> Self {
        Self {
            status: QueryStatus::Error,
            raw_body: None,
            error_message: Some(message.into()),
            error_kind: Some(kind),
            raw_text: None,
        }
    }

    /// Attach the raw response text
    pub fn with_raw_text(mut self, text: impl Into<String>) -> Self {
        self.raw_text = Some(text.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }

    /// The `data` object of the payload, when there is one
    pub fn data(&self) -> Option<&Value> {
        self.raw_body
            .as_ref()
            .and_then(|body| body.get("data"))
            .filter(|data| data.is_object())
    }

    /// The warning message of a partial success
    pub fn warning(&self) -> Option<&str> {
        match self.status {
            QueryStatus::OkWithWarnings => self.error_message.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_constructors_set_status() {
        let ok = QueryResult::ok(json!({"data": {}}));
        assert_eq!(ok.status, QueryStatus::Ok);
        assert!(ok.error_message.is_none());
        assert!(ok.warning().is_none());

        let partial = QueryResult::with_warnings(json!({"data": {}}), "vms unavailable");
        assert_eq!(partial.status, QueryStatus::OkWithWarnings);
        assert_eq!(partial.warning(), Some("vms unavailable"));
        assert!(partial.error_kind.is_none());

        let failed = QueryResult::error(QueryErrorKind::Transport, "transport failure: refused");
        assert!(failed.is_error());
        assert!(failed.raw_body.is_none());
        assert_eq!(failed.error_kind, Some(QueryErrorKind::Transport));
        assert!(failed.warning().is_none());
    }

    #[test]
    fn test_data_requires_object() {
        assert!(QueryResult::ok(json!({"data": {"online": true}})).data().is_some());
        assert!(QueryResult::ok(json!({"data": null})).data().is_none());
        assert!(QueryResult::ok(json!({})).data().is_none());
    }
}
