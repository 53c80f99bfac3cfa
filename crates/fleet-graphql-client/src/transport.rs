// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! HTTP transport for GraphQL requests

use async_trait::async_trait;
use fleet_domain_types::ServerConfig;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client as HttpClient;
use serde_json::Value;

use crate::client::QueryOptions;
use crate::error::{error_chain, QueryError};

/// Header carrying the server API key
pub const API_KEY_HEADER: &str = "x-api-key";

const USER_AGENT: &str = concat!("fleet-report/", env!("CARGO_PKG_VERSION"));

/// Status and body of an HTTP response, before any interpretation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Issues one GraphQL request and returns the raw response
///
/// Implementations report network-level problems as
/// [`QueryError::Transport`] or [`QueryError::Timeout`]; everything about the
/// response body is left to the caller.
#[async_trait]
pub trait GraphqlTransport: Send + Sync {
    async fn post(
        &self,
        server: &ServerConfig,
        body: &Value,
        options: &QueryOptions,
    ) -> Result<RawResponse, QueryError>;
}

/// reqwest-backed transport with one verifying and one non-verifying pool
#[derive(Debug, Clone)]
pub struct HttpTransport {
    verified: HttpClient,
    insecure: HttpClient,
}

impl HttpTransport {
    pub fn new() -> Result<Self, QueryError> {
        let verified = HttpClient::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| QueryError::ClientBuild(error_chain(&e)))?;
        let insecure = HttpClient::builder()
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| QueryError::ClientBuild(error_chain(&e)))?;

        Ok(Self { verified, insecure })
    }

    fn client(&self, insecure_tls: bool) -> &HttpClient {
        if insecure_tls {
            &self.insecure
        } else {
            &self.verified
        }
    }

    fn map_error(err: reqwest::Error, options: &QueryOptions) -> QueryError {
        if err.is_timeout() {
            QueryError::Timeout(options.timeout)
        } else {
            QueryError::from(err)
        }
    }
}

#[async_trait]
impl GraphqlTransport for HttpTransport {
    async fn post(
        &self,
        server: &ServerConfig,
        body: &Value,
        options: &QueryOptions,
    ) -> Result<RawResponse, QueryError> {
        let response = self
            .client(options.insecure_tls)
            .post(server.url.clone())
            .header(API_KEY_HEADER, server.api_key.as_str())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .timeout(options.timeout)
            .send()
            .await
            .map_err(|e| Self::map_error(e, options))?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| Self::map_error(e, options))?;

        tracing::debug!(server = %server.name, status, bytes = text.len(), "received response");
        Ok(RawResponse::new(status, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insecure_tls_selects_non_verifying_pool() {
        let transport = HttpTransport::new().unwrap();
        assert!(std::ptr::eq(transport.client(true), &transport.insecure));
        assert!(std::ptr::eq(transport.client(false), &transport.verified));
        assert!(!std::ptr::eq(transport.client(true), transport.client(false)));
    }
}
