// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// Replace `path` with `contents` in one rename
///
/// The data goes to a temporary file beside the target first, so readers
/// see either the previous report or the complete new one.
pub fn write_atomically(path: &Path, contents: &str) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut file = NamedTempFile::new_in(parent)?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    file.persist(path).map_err(|err| err.error)?;
    Ok(())
}
