// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! The composite status query sent to every server
//!
//! The field set is a contract with the remote API and with the response
//! extractor: renaming or regrouping fields changes the shape it expects.

/// One round trip covering system info, metrics, array, shares, workloads,
/// notifications, log files and connectivity flags
pub const FLEET_STATUS_QUERY: &str = r#"query FleetStatus {
  info {
    os { hostname distro release uptime }
    cpu { brand cores threads }
  }
  metrics {
    cpu { percentTotal }
    memory { total used free }
  }
  array {
    state
    capacity { kilobytes { free used total } }
    parities { name device temp status size numErrors isSpinning }
    disks { name device temp status size numErrors isSpinning }
    caches { name device temp status fsSize fsUsed fsFree }
  }
  shares { name free used }
  docker {
    containers { names state status image }
  }
  vms {
    domains { name state }
  }
  vars { name version }
  notifications {
    list(filter: { type: UNREAD, offset: 0, limit: 100 }) {
      importance title subject description timestamp
    }
  }
  logFiles { name size }
  online
  isSSOEnabled
}"#;
