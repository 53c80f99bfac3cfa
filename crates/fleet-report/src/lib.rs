// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Turns status query results into a markdown fleet report
//!
//! The pipeline for one server is
//! [`extract`] → [`classify`] → [`render_section`]; [`ServerOutcome`] bundles
//! the first two steps and [`render`] assembles the whole document. Nothing
//! in this crate performs I/O.

pub mod classify;
pub mod error;
pub mod extract;
pub mod outcome;
pub mod render;
mod wire;

pub use classify::{classify, ALERT_IMPORTANCES, HOT_DISK_THRESHOLD_CELSIUS};
pub use error::{ExtractError, Result};
pub use extract::{extract, is_unhealthy_status, kib_to_gib, KIB_PER_GIB};
pub use outcome::{ServerOutcome, ServerState, StatusLevel};
pub use render::{render, render_section, Report, SummaryRow, GENERATED_LINE_PREFIX};
