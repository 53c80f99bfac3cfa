// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Per-server diagnostic payloads
//!
//! Failed and partially successful servers always get a dump; in debug mode
//! every server does. Dumps live outside the report and never affect it.

use std::path::{Path, PathBuf};

use fleet_domain_types::{QueryResult, QueryStatus};
use serde_json::{json, Value};

use crate::pipeline::ServerRun;

/// `<tmp>/fleet-report`
pub fn default_diagnostics_dir() -> PathBuf {
    std::env::temp_dir().join("fleet-report")
}

/// Whether `result` gets a diagnostic dump
pub fn should_dump(result: &QueryResult, debug: bool) -> bool {
    debug || result.status != QueryStatus::Ok
}

/// Dump path for a run, named after the server id
pub fn dump_path(dir: &Path, run: &ServerRun) -> PathBuf {
    dir.join(format!("{}.json", run.server.file_stem()))
}

/// JSON document describing one query and whatever it received
pub fn diagnostic_document(run: &ServerRun) -> Value {
    let result = &run.result;
    let payload = match (&result.raw_body, &result.raw_text) {
        (Some(body), _) => body.clone(),
        (None, Some(text)) => Value::String(text.clone()),
        (None, None) => Value::Null,
    };
    json!({
        "server": run.server.name,
        "url": run.server.url.as_str(),
        "status": result.status,
        "errorKind": result.error_kind,
        "errorMessage": result.error_message,
        "payload": payload,
    })
}

/// Write dumps for every run that needs one; returns the paths written
///
/// Failures are logged and skipped.
pub fn write_diagnostics(dir: &Path, runs: &[ServerRun], debug: bool) -> Vec<PathBuf> {
    let pending: Vec<&ServerRun> = runs
        .iter()
        .filter(|run| should_dump(&run.result, debug))
        .collect();
    if pending.is_empty() {
        return Vec::new();
    }

    if let Err(err) = std::fs::create_dir_all(dir) {
        tracing::warn!(dir = %dir.display(), error = %err, "cannot create diagnostics directory");
        return Vec::new();
    }

    let mut written = Vec::new();
    for run in pending {
        let path = dump_path(dir, run);
        let contents = match serde_json::to_vec_pretty(&diagnostic_document(run)) {
            Ok(contents) => contents,
            Err(err) => {
                tracing::warn!(server = %run.server.name, error = %err, "cannot encode diagnostics");
                continue;
            }
        };
        match std::fs::write(&path, contents) {
            Ok(()) => {
                tracing::info!(server = %run.server.name, path = %path.display(), "wrote diagnostics");
                written.push(path);
            }
            Err(err) => {
                tracing::warn!(server = %run.server.name, path = %path.display(), error = %err, "cannot write diagnostics");
            }
        }
    }
    written
}
