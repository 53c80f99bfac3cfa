// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Concurrent querying with registry-order results

use fleet_domain_types::{QueryResult, ServerConfig};
use fleet_graphql_client::{QueryClient, QueryOptions};
use fleet_report::ServerOutcome;
use futures::stream::{self, StreamExt};
use tracing::Instrument;

/// One server and the result of querying it
#[derive(Debug, Clone, PartialEq)]
pub struct ServerRun {
    pub server: ServerConfig,
    pub result: QueryResult,
}

/// Query every server with at most `concurrency` requests in flight
///
/// Results come back in the order of `servers`, whatever the completion order.
pub async fn query_all(
    client: &QueryClient,
    servers: &[ServerConfig],
    options: &QueryOptions,
    concurrency: usize,
) -> Vec<ServerRun> {
    stream::iter(servers.iter().cloned())
        .map(|server| {
            let span = tracing::info_span!("server", server = %server.name);
            async move {
                tracing::debug!(url = %server.url, api_key = fleet_logging::redact(&server.api_key), "querying");
                let result = client.query_fleet_status(&server, options).await;
                ServerRun { server, result }
            }
            .instrument(span)
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}

/// Extract and classify every run, keeping order
pub fn reduce(runs: &[ServerRun]) -> Vec<ServerOutcome> {
    runs.iter()
        .map(|run| ServerOutcome::from_result(run.server.clone(), &run.result))
        .collect()
}
