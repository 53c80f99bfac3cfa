// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Normalised, fully-defaulted view of one server's state
//!
//! Every field already holds its documented default when the source response
//! lacked it, so classification and rendering never check for nulls.

use serde::{Deserialize, Serialize};

/// Default for absent string fields that name something
pub const UNKNOWN: &str = "Unknown";
/// Default for absent string fields that describe a value
pub const NOT_AVAILABLE: &str = "N/A";
/// Default notification importance
pub const DEFAULT_IMPORTANCE: &str = "info";
/// Default notification description
pub const DEFAULT_DESCRIPTION: &str = "No description";
/// Number of notifications shown in a report section
pub const DISPLAYED_NOTIFICATIONS: usize = 10;

/// Snapshot of one server, derived deterministically from one query result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSnapshot {
    pub system: SystemInfo,
    pub load: LoadMetrics,
    /// `None` when the array reported no total capacity; the storage
    /// section is then omitted from the report
    pub storage: Option<StorageCapacity>,
    /// Parity disks first, then data disks
    pub disks: Vec<DiskRecord>,
    pub cache_pools: Vec<CachePoolRecord>,
    pub share_count: u64,
    pub docker: DockerSummary,
    pub vms: VmSummary,
    /// Every notification, most recent first
    pub notifications: Vec<NotificationRecord>,
    pub log_file_count: u64,
}

impl ServerSnapshot {
    /// The notifications shown in the report (the most recent ten)
    pub fn recent_notifications(&self) -> &[NotificationRecord] {
        let shown = self.notifications.len().min(DISPLAYED_NOTIFICATIONS);
        &self.notifications[..shown]
    }
}

/// System identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub server_name: String,
    pub hostname: String,
    pub os: String,
    pub version: String,
    pub cpu_brand: String,
    pub cpu_cores: u64,
    pub cpu_threads: u64,
    /// Boot time as reported by the server
    pub uptime: String,
    pub online: bool,
    pub sso_enabled: bool,
}

/// CPU and memory load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadMetrics {
    pub cpu_percent: f64,
    pub memory_total_gib: u64,
    pub memory_used_gib: u64,
    pub memory_used_percent: u64,
}

/// Array capacity, present only when the total is known and non-zero
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageCapacity {
    pub array_state: String,
    pub total_gib: u64,
    pub used_gib: u64,
    pub free_gib: u64,
    pub used_percent: u64,
}

/// Role of a disk in the array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiskRole {
    Parity,
    Data,
}

/// One array disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskRecord {
    pub name: String,
    pub device: String,
    pub role: DiskRole,
    pub temp_celsius: i64,
    pub error_count: u64,
    pub spinning: bool,
    pub status: String,
    pub size_gib: u64,
}

/// One cache pool device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachePoolRecord {
    pub name: String,
    pub device: String,
    pub temp_celsius: i64,
    pub status: String,
    /// `None` when the pool did not report its sizes
    pub utilization: Option<PoolUtilization>,
}

/// Filesystem usage of a cache pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolUtilization {
    pub used_gib: u64,
    pub total_gib: u64,
    pub used_percent: u64,
}

/// Docker container counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerSummary {
    pub total: u64,
    pub running: u64,
    pub unhealthy: Vec<ContainerIssue>,
}

/// A container whose status reports it unhealthy or restarting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerIssue {
    pub name: String,
    pub status: String,
}

/// Virtual machine counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VmSummary {
    /// The VM service is disabled (no domain list was returned)
    Disabled,
    Counts { total: u64, running: u64 },
}

/// One notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub importance: String,
    pub title: String,
    pub description: String,
    /// Full timestamp as reported, used for ordering
    pub timestamp: String,
    /// Date portion of the timestamp, used for display
    pub date: String,
}
