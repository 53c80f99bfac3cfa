// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! GraphQL client for storage server status queries
//!
//! The client issues exactly one POST per call and classifies the answer as
//! success, partial success or failure. It never retries; callers decide what
//! to do with a failed [`QueryResult`](fleet_domain_types::QueryResult).
//!
//! The HTTP layer sits behind the [`GraphqlTransport`] trait so that tests and
//! alternative transports can stand in for the reqwest implementation.

pub mod client;
pub mod document;
pub mod error;
pub mod transport;

pub use client::{classify_response, QueryClient, QueryOptions};
pub use document::FLEET_STATUS_QUERY;
pub use error::QueryError;
pub use transport::{GraphqlTransport, HttpTransport, RawResponse};
