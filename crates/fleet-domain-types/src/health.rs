// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Anomalies flagged for operator attention

use serde::{Deserialize, Serialize};

use crate::snapshot::{ContainerIssue, DiskRecord, NotificationRecord};

/// Items flagged on one server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthFlags {
    pub hot_disks: Vec<DiskRecord>,
    pub errored_disks: Vec<DiskRecord>,
    pub unhealthy_containers: Vec<ContainerIssue>,
    pub alert_notifications: Vec<NotificationRecord>,
}

impl HealthFlags {
    /// No hot and no errored disks
    pub fn disks_healthy(&self) -> bool {
        self.hot_disks.is_empty() && self.errored_disks.is_empty()
    }

    /// Total number of flagged items
    pub fn issue_count(&self) -> usize {
        self.hot_disks.len()
            + self.errored_disks.len()
            + self.unhealthy_containers.len()
            + self.alert_notifications.len()
    }

    pub fn is_clean(&self) -> bool {
        self.issue_count() == 0
    }
}
