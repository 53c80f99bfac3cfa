// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Typed extraction of a [`ServerSnapshot`] from a query payload
//!
//! Each top-level branch of `data` is decoded on its own, so a malformed or
//! missing branch only defaults that branch. Every field of the snapshot is
//! filled, either from the payload or from its documented default.

use fleet_domain_types::{
    CachePoolRecord, ContainerIssue, DiskRecord, DiskRole, DockerSummary, LoadMetrics,
    NotificationRecord, PoolUtilization, QueryResult, ServerSnapshot, StorageCapacity,
    SystemInfo, VmSummary, DEFAULT_DESCRIPTION, DEFAULT_IMPORTANCE, NOT_AVAILABLE, UNKNOWN,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ExtractError, Result};
use crate::wire;

/// KiB in one GiB
pub const KIB_PER_GIB: u64 = 1_048_576;

/// Docker state counted as running (exact match)
pub const RUNNING_STATE: &str = "RUNNING";

/// Container status fragments that mark a container unhealthy (case-insensitive)
pub const UNHEALTHY_MARKERS: [&str; 2] = ["unhealthy", "restarting"];

const UNTITLED: &str = "Untitled";

/// Whole GiB in `kib`, truncated
pub fn kib_to_gib(kib: u64) -> u64 {
    kib / KIB_PER_GIB
}

/// `part * 100 / whole`, truncated; 0 when `whole` is 0
pub fn percent_of(part: u64, whole: u64) -> u64 {
    if whole == 0 {
        return 0;
    }
    ((part as u128 * 100) / whole as u128) as u64
}

/// Whether a container status reports an unhealthy or restarting container
pub fn is_unhealthy_status(status: &str) -> bool {
    let status = status.to_lowercase();
    UNHEALTHY_MARKERS.iter().any(|marker| status.contains(marker))
}

/// Build the snapshot for a successful or partially successful query
///
/// Fails only when `result` is an `Error`; a result without a `data` object
/// yields a snapshot made entirely of defaults.
pub fn extract(result: &QueryResult) -> Result<ServerSnapshot> {
    if result.is_error() {
        return Err(ExtractError::FailedQuery {
            message: result.error_message.clone().unwrap_or_default(),
        });
    }

    let empty = Value::Object(Default::default());
    let data = result.data().unwrap_or(&empty);

    let info: wire::Info = branch(data, "info");
    let metrics: wire::Metrics = branch(data, "metrics");
    let array: wire::Array = branch(data, "array");
    let docker: wire::Docker = branch(data, "docker");
    let vms: Option<wire::Vms> = branch(data, "vms");
    let vars: wire::Vars = branch(data, "vars");
    let notifications: wire::Notifications = branch(data, "notifications");
    let shares: Vec<Value> = branch(data, "shares");
    let log_files: Vec<Value> = branch(data, "logFiles");
    let online: bool = branch(data, "online");
    let sso_enabled: bool = branch(data, "isSSOEnabled");

    Ok(ServerSnapshot {
        system: system_info(info, vars, online, sso_enabled),
        load: load_metrics(metrics),
        storage: storage_capacity(&array),
        disks: disks(&array),
        cache_pools: cache_pools(&array),
        share_count: shares.len() as u64,
        docker: docker_summary(docker),
        vms: vm_summary(vms),
        notifications: notification_records(notifications),
        log_file_count: log_files.len() as u64,
    })
}

/// Decode one top-level branch, defaulting when it is absent, null or malformed
fn branch<T>(data: &Value, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    match data.get(key) {
        None | Some(Value::Null) => T::default(),
        Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|err| {
            tracing::warn!(branch = key, error = %err, "malformed response branch, using defaults");
            T::default()
        }),
    }
}

fn or_default(value: Option<String>, default: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => default.to_string(),
    }
}

fn system_info(info: wire::Info, vars: wire::Vars, online: bool, sso_enabled: bool) -> SystemInfo {
    let os = info.os.unwrap_or_default();
    let cpu = info.cpu.unwrap_or_default();

    let os_name = match (os.distro, os.release) {
        (Some(distro), Some(release)) => format!("{distro} {release}"),
        (Some(only), None) | (None, Some(only)) => only,
        (None, None) => String::new(),
    };

    SystemInfo {
        server_name: or_default(vars.name, UNKNOWN),
        hostname: or_default(os.hostname, UNKNOWN),
        os: or_default(Some(os_name), UNKNOWN),
        version: or_default(vars.version, UNKNOWN),
        cpu_brand: or_default(cpu.brand, UNKNOWN),
        cpu_cores: cpu.cores.unwrap_or(0),
        cpu_threads: cpu.threads.unwrap_or(0),
        uptime: or_default(os.uptime, NOT_AVAILABLE),
        online,
        sso_enabled,
    }
}

fn load_metrics(metrics: wire::Metrics) -> LoadMetrics {
    let cpu_percent = metrics.cpu.and_then(|c| c.percent_total).unwrap_or(0.0);
    let memory = metrics.memory.unwrap_or_default();
    let total = memory.total.unwrap_or(0);
    let used = memory.used.unwrap_or(0);

    LoadMetrics {
        cpu_percent,
        memory_total_gib: kib_to_gib(total),
        memory_used_gib: kib_to_gib(used),
        memory_used_percent: percent_of(used, total),
    }
}

fn storage_capacity(array: &wire::Array) -> Option<StorageCapacity> {
    let kilobytes = array.capacity.as_ref()?.kilobytes.as_ref()?;
    let total = kilobytes.total.filter(|t| *t > 0)?;
    let used = kilobytes.used.unwrap_or(0);
    let free = kilobytes.free.unwrap_or(0);

    Some(StorageCapacity {
        array_state: or_default(array.state.clone(), UNKNOWN),
        total_gib: kib_to_gib(total),
        used_gib: kib_to_gib(used),
        free_gib: kib_to_gib(free),
        used_percent: percent_of(used, total),
    })
}

/// Parity disks followed by data disks
fn disks(array: &wire::Array) -> Vec<DiskRecord> {
    let parities = array.parities.iter().flatten().map(|d| (DiskRole::Parity, d));
    let data = array.disks.iter().flatten().map(|d| (DiskRole::Data, d));

    parities
        .chain(data)
        .map(|(role, disk)| DiskRecord {
            name: or_default(disk.name.clone(), UNKNOWN),
            device: or_default(disk.device.clone(), NOT_AVAILABLE),
            role,
            temp_celsius: disk.temp.unwrap_or(0),
            error_count: disk.num_errors.unwrap_or(0),
            spinning: disk.is_spinning.unwrap_or(false),
            status: or_default(disk.status.clone(), NOT_AVAILABLE),
            size_gib: kib_to_gib(disk.size.unwrap_or(0)),
        })
        .collect()
}

fn cache_pools(array: &wire::Array) -> Vec<CachePoolRecord> {
    array
        .caches
        .iter()
        .flatten()
        .map(|pool| {
            let utilization = match (pool.fs_size, pool.fs_used) {
                (Some(size), Some(used)) if size > 0 => Some(PoolUtilization {
                    used_gib: kib_to_gib(used),
                    total_gib: kib_to_gib(size),
                    used_percent: percent_of(used, size),
                }),
                _ => None,
            };
            CachePoolRecord {
                name: or_default(pool.name.clone(), UNKNOWN),
                device: or_default(pool.device.clone(), NOT_AVAILABLE),
                temp_celsius: pool.temp.unwrap_or(0),
                status: or_default(pool.status.clone(), NOT_AVAILABLE),
                utilization,
            }
        })
        .collect()
}

fn docker_summary(docker: wire::Docker) -> DockerSummary {
    let containers = docker.containers.unwrap_or_default();

    let running = containers
        .iter()
        .filter(|c| c.state.as_deref() == Some(RUNNING_STATE))
        .count() as u64;

    let unhealthy = containers
        .iter()
        .filter_map(|c| {
            let status = c.status.as_deref()?;
            is_unhealthy_status(status).then(|| ContainerIssue {
                name: container_name(c),
                status: status.to_string(),
            })
        })
        .collect();

    DockerSummary {
        total: containers.len() as u64,
        running,
        unhealthy,
    }
}

fn container_name(container: &wire::Container) -> String {
    let first = container
        .names
        .as_ref()
        .and_then(|names| names.first())
        .map(|name| name.trim_start_matches('/').to_string());
    or_default(first, UNKNOWN)
}

fn vm_summary(vms: Option<wire::Vms>) -> VmSummary {
    match vms.and_then(|v| v.domains) {
        None => VmSummary::Disabled,
        Some(domains) => VmSummary::Counts {
            total: domains.len() as u64,
            running: domains
                .iter()
                .filter(|d| d.state.as_deref() == Some(RUNNING_STATE))
                .count() as u64,
        },
    }
}

/// Date portion of a timestamp: text before the time separator, at most 10 chars
fn timestamp_date(timestamp: &str) -> String {
    let date: String = timestamp
        .split('T')
        .next()
        .unwrap_or_default()
        .chars()
        .take(10)
        .collect();
    or_default(Some(date), NOT_AVAILABLE)
}

fn notification_records(notifications: wire::Notifications) -> Vec<NotificationRecord> {
    let mut records: Vec<NotificationRecord> = notifications
        .list
        .unwrap_or_default()
        .into_iter()
        .map(|n| {
            let timestamp = n.timestamp.unwrap_or_default();
            NotificationRecord {
                importance: or_default(n.importance, DEFAULT_IMPORTANCE),
                title: or_default(n.title.or(n.subject), UNTITLED),
                description: or_default(n.description, DEFAULT_DESCRIPTION),
                date: timestamp_date(&timestamp),
                timestamp,
            }
        })
        .collect();

    // Stable ascending sort, then reverse: most recent first
    records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    records.reverse();
    records
}
