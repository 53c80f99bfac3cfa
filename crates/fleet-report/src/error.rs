// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use thiserror::Error;

/// Errors produced while turning query results into report data
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// Extraction is only defined for results that carry data
    #[error("cannot extract a snapshot from a failed query: {message}")]
    FailedQuery { message: String },
}

pub type Result<T> = std::result::Result<T, ExtractError>;
