// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Query execution and response classification

use fleet_domain_types::{QueryResult, QueryStatus, ServerConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use crate::document::FLEET_STATUS_QUERY;
use crate::error::QueryError;
use crate::transport::{GraphqlTransport, HttpTransport};

/// Bytes of an unparseable body kept in the error message
pub const INVALID_JSON_PREVIEW_LIMIT: usize = 500;

/// Default per-query timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-call query options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// Accept GraphQL errors when usable `data` came with them
    pub ignore_errors: bool,
    /// Skip TLS certificate verification
    pub insecure_tls: bool,
    /// Upper bound for the whole call; hitting it counts as a transport failure
    pub timeout: Duration,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            ignore_errors: false,
            insecure_tls: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Single-shot GraphQL client
#[derive(Clone)]
pub struct QueryClient {
    transport: Arc<dyn GraphqlTransport>,
}

impl QueryClient {
    /// Create a client over any transport
    pub fn new(transport: Arc<dyn GraphqlTransport>) -> Self {
        Self { transport }
    }

    /// Create a client over the reqwest transport
    pub fn http() -> Result<Self, QueryError> {
        Ok(Self::new(Arc::new(HttpTransport::new()?)))
    }

    /// Send `document` to `server` and classify the answer
    ///
    /// Never retries. Transport failures, timeouts and unusable payloads all
    /// come back as a `QueryResult` with status `Error`.
    pub async fn query(
        &self,
        server: &ServerConfig,
        document: &str,
        options: &QueryOptions,
    ) -> QueryResult {
        let body = json!({ "query": document });
        let call = self.transport.post(server, &body, options);

        let result = match tokio::time::timeout(options.timeout, call).await {
            Err(_) => QueryError::Timeout(options.timeout).into_result(),
            Ok(Err(err)) => err.into_result(),
            Ok(Ok(raw)) => classify_response(raw.status, &raw.body, options.ignore_errors),
        };

        if result.status == QueryStatus::Ok {
            tracing::debug!(server = %server.name, "query succeeded");
        } else {
            tracing::warn!(
                server = %server.name,
                status = ?result.status,
                message = result.error_message.as_deref().unwrap_or_default(),
                "query did not fully succeed"
            );
        }

        result
    }

    /// Send the composite status query
    pub async fn query_fleet_status(
        &self,
        server: &ServerConfig,
        options: &QueryOptions,
    ) -> QueryResult {
        self.query(server, FLEET_STATUS_QUERY, options).await
    }
}

/// Classify a raw response body
///
/// - empty body → `Error("empty response")`
/// - unparseable body → `Error("invalid JSON: <first 500 bytes>")`
/// - non-empty `errors` array → `OkWithWarnings` when `ignore_errors` is set
///   and a `data` object is present, `Error(<first message>)` otherwise
/// - non-2xx status without GraphQL errors → `Error("HTTP <status>")`
/// - anything else → `Ok`
pub fn classify_response(status: u16, text: &str, ignore_errors: bool) -> QueryResult {
    if text.trim().is_empty() {
        return QueryError::EmptyResponse.into_result();
    }

    let payload: Value = match serde_json::from_str(text) {
        Ok(payload) => payload,
        Err(_) => {
            return QueryError::InvalidJson {
                preview: preview(text, INVALID_JSON_PREVIEW_LIMIT).to_string(),
            }
            .into_result()
            .with_raw_text(text);
        }
    };

    if let Some(first) = first_error_message(&payload) {
        let has_data = payload.get("data").is_some_and(Value::is_object);
        let result = if ignore_errors && has_data {
            QueryResult::with_warnings(payload, first)
        } else {
            QueryError::GraphQl(first).into_result()
        };
        return result.with_raw_text(text);
    }

    if !(200..300).contains(&status) {
        return QueryError::HttpStatus(status).into_result().with_raw_text(text);
    }

    QueryResult::ok(payload).with_raw_text(text)
}

fn first_error_message(payload: &Value) -> Option<String> {
    let first = payload.get("errors")?.as_array()?.first()?;
    let message = first
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| first.to_string());
    Some(message)
}

/// Longest prefix of `text` no longer than `limit` bytes that ends on a char boundary
fn preview(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
