// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Validation routines for server names, prefixes and endpoints

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

fn identifier_regex() -> &'static Regex {
    // Single underscores between alphanumeric runs, no leading/trailing underscore
    static IDENT_REGEX: OnceLock<Regex> = OnceLock::new();
    IDENT_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9]+(?:_[A-Za-z0-9]+)*$").expect("identifier pattern compiles")
    })
}

/// Validate the `<NAME>` segment of a server variable
pub fn validate_server_name(name: &str) -> Result<()> {
    if name.len() > 64 || !identifier_regex().is_match(name) {
        return Err(Error::InvalidServerName(name.to_string()));
    }
    Ok(())
}

/// Validate an environment prefix such as `FLEET`
pub fn validate_prefix(prefix: &str) -> Result<()> {
    if !identifier_regex().is_match(prefix) {
        return Err(Error::InvalidPrefix(prefix.to_string()));
    }
    Ok(())
}

/// Parse and check a server endpoint
pub fn validate_url(name: &str, variable: &str, raw: &str) -> Result<Url> {
    let invalid = |reason: String| Error::InvalidUrl {
        name: name.to_string(),
        variable: variable.to_string(),
        reason,
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid("value is empty".to_string()));
    }

    let url = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme '{}'", other))),
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }

    Ok(url)
}
