// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Configured target servers

use url::Url;

/// One configured storage server
///
/// Discovered once at startup and never mutated afterwards. The `Debug`
/// implementation never prints the API key.
#[derive(Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Identifier taken from the environment variable name (`<NAME>`)
    pub id: String,
    /// Display name used in the report
    pub name: String,
    /// GraphQL endpoint
    pub url: Url,
    /// Secret sent with every request
    pub api_key: String,
}

impl ServerConfig {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        url: Url,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url,
            api_key: api_key.into(),
        }
    }

    /// File-system friendly version of the server id
    ///
    /// Used to name per-server diagnostic files. Ids are unique within a
    /// registry while display names are not.
    pub fn file_stem(&self) -> String {
        let stem: String = self
            .id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        if stem.trim_matches('_').is_empty() {
            "server".to_string()
        } else {
            stem
        }
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("url", &self.url.as_str())
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(id: &str, name: &str) -> ServerConfig {
        ServerConfig::new(
            id,
            name,
            Url::parse("https://tower.local/graphql").unwrap(),
            "secret-key",
        )
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let rendered = format!("{:?}", server("TOWER", "Tower"));
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn test_file_stem_follows_id() {
        assert_eq!(server("TOWER", "Tower").file_stem(), "TOWER");
        assert_eq!(server("MEDIA_BOX", "Media Box #2").file_stem(), "MEDIA_BOX");
        assert_eq!(server("a b", "x").file_stem(), "a_b");
        assert_eq!(server("??", "x").file_stem(), "server");
    }

    #[test]
    fn test_file_stem_ignores_shared_display_names() {
        let a = server("NAS_A", "Nas");
        let b = server("NAS_B", "Nas");
        assert_ne!(a.file_stem(), b.file_stem());
    }
}
