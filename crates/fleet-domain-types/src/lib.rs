// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Domain types for the fleet report tooling
//!
//! These types flow through the whole pipeline: a [`ServerConfig`] is queried
//! into a [`QueryResult`], normalised into a [`ServerSnapshot`] and classified
//! into [`HealthFlags`]. They carry no I/O and are shared by every crate.

pub mod health;
pub mod query;
pub mod server;
pub mod snapshot;

// Re-export commonly used types
pub use health::*;
pub use query::*;
pub use server::*;
pub use snapshot::*;
