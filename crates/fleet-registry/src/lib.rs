// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Discovery of the storage servers a report should cover.
//!
//! Servers are described by environment variables following the convention
//! `<PREFIX>_<NAME>_URL`, `<PREFIX>_<NAME>_API_KEY` and the optional
//! `<PREFIX>_<NAME>_NAME`. The library never reads the process environment on
//! its own: callers hand in an explicit snapshot so tests can supply
//! synthetic registries.

pub mod error;
pub mod registry;
pub mod validation;

pub use error::{Error, Result};
pub use registry::{discover_servers, process_env_snapshot, ServerRegistry, DEFAULT_PREFIX};
