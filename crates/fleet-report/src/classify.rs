// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Threshold rules that flag anomalies in a snapshot

use fleet_domain_types::{HealthFlags, ServerSnapshot};

/// Disks strictly hotter than this are flagged (Celsius)
pub const HOT_DISK_THRESHOLD_CELSIUS: i64 = 45;

/// Notification importances that count as alerts (case-sensitive)
pub const ALERT_IMPORTANCES: [&str; 2] = ["alert", "warning"];

/// Flag hot disks, errored disks, unhealthy containers and alert notifications
///
/// Alerts are counted across every notification in the snapshot, not only
/// the ones shown in the report.
pub fn classify(snapshot: &ServerSnapshot) -> HealthFlags {
    HealthFlags {
        hot_disks: snapshot
            .disks
            .iter()
            .filter(|d| d.temp_celsius > HOT_DISK_THRESHOLD_CELSIUS)
            .cloned()
            .collect(),
        errored_disks: snapshot
            .disks
            .iter()
            .filter(|d| d.error_count > 0)
            .cloned()
            .collect(),
        unhealthy_containers: snapshot.docker.unhealthy.clone(),
        alert_notifications: snapshot
            .notifications
            .iter()
            .filter(|n| ALERT_IMPORTANCES.contains(&n.importance.as_str()))
            .cloned()
            .collect(),
    }
}
