// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Server discovery from an environment snapshot

use crate::{
    error::{Error, Result},
    validation::{validate_prefix, validate_server_name, validate_url},
};
use fleet_domain_types::ServerConfig;
use std::collections::{HashMap, HashSet};

/// Prefix used when none is configured
pub const DEFAULT_PREFIX: &str = "FLEET";

const URL_SUFFIX: &str = "_URL";
const API_KEY_SUFFIX: &str = "_API_KEY";
const NAME_SUFFIX: &str = "_NAME";

/// Discover configured servers from `env`
///
/// Servers come back in the order their `<NAME>` was first seen while
/// scanning `env`, so the same environment always yields the same order.
pub fn discover_servers<I, K, V>(prefix: &str, env: I) -> Result<Vec<ServerConfig>>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    validate_prefix(prefix)?;

    let entries: Vec<(String, String)> =
        env.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
    let lookup: HashMap<&str, &str> =
        entries.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();

    let head = format!("{}_", prefix);
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for (key, _) in &entries {
        let Some(name) = key
            .strip_prefix(&head)
            .and_then(|rest| rest.strip_suffix(URL_SUFFIX))
        else {
            continue;
        };
        if name.is_empty() {
            continue;
        }
        if seen.insert(name) {
            names.push(name);
        }
    }

    if names.is_empty() {
        return Err(Error::NoServers {
            prefix: prefix.to_string(),
        });
    }

    let mut servers = Vec::with_capacity(names.len());
    for name in names {
        validate_server_name(name)?;

        let url_var = format!("{}{}{}", head, name, URL_SUFFIX);
        let key_var = format!("{}{}{}", head, name, API_KEY_SUFFIX);
        let name_var = format!("{}{}{}", head, name, NAME_SUFFIX);

        let api_key = lookup
            .get(key_var.as_str())
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| Error::MissingApiKey {
                name: name.to_string(),
                variable: key_var.clone(),
            })?;

        let url = validate_url(name, &url_var, lookup.get(url_var.as_str()).copied().unwrap_or(""))?;

        let display_name = lookup
            .get(name_var.as_str())
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .unwrap_or(name);

        tracing::debug!(server = %display_name, url = %url, "discovered server");
        servers.push(ServerConfig::new(name, display_name, url, api_key));
    }

    Ok(servers)
}

/// Snapshot of the process environment, in the order the OS reports it
///
/// Variables whose name or value is not valid UTF-8 are skipped.
pub fn process_env_snapshot() -> Vec<(String, String)> {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

/// The fixed set of servers for one run
#[derive(Debug, Clone)]
pub struct ServerRegistry {
    prefix: String,
    servers: Vec<ServerConfig>,
}

impl ServerRegistry {
    /// Build a registry from an explicit environment snapshot
    pub fn from_env<I, K, V>(prefix: &str, env: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let servers = discover_servers(prefix, env)?;
        tracing::info!(prefix, count = servers.len(), "server registry loaded");
        Ok(Self {
            prefix: prefix.to_string(),
            servers,
        })
    }

    /// Prefix the registry was discovered with
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Servers in registry order
    pub fn servers(&self) -> &[ServerConfig] {
        &self.servers
    }

    pub fn into_servers(self) -> Vec<ServerConfig> {
        self.servers
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// Find a server by its identifier or display name
    pub fn find(&self, identifier: &str) -> Option<&ServerConfig> {
        self.servers
            .iter()
            .find(|server| server.id == identifier || server.name == identifier)
    }
}
