// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Wire shapes of the status query response
//!
//! Every field is optional. Numeric fields accept JSON numbers as well as
//! numeric strings, since the remote API encodes large integers as strings.
//! Values of the wrong shape decode to `None` instead of failing the branch.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn value_to_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| *f >= 0.0).map(|f| f as u64))
        }
        _ => None,
    }
}

fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        }
        _ => None,
    }
}

fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

pub(crate) fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_u64(&value))
}

pub(crate) fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_i64(&value))
}

pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_f64(&value))
}

/// Strings pass through; numbers and booleans are stringified
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

pub(crate) fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_bool())
}

/// Elements of an array, or nothing when the value is not an array
pub(crate) fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(None);
    };
    Ok(Some(
        items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Info {
    pub os: Option<OsInfo>,
    pub cpu: Option<CpuInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct OsInfo {
    #[serde(deserialize_with = "lenient_string")]
    pub hostname: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub distro: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub release: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub uptime: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CpuInfo {
    #[serde(deserialize_with = "lenient_string")]
    pub brand: Option<String>,
    #[serde(deserialize_with = "lenient_u64")]
    pub cores: Option<u64>,
    #[serde(deserialize_with = "lenient_u64")]
    pub threads: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Metrics {
    pub cpu: Option<CpuLoad>,
    pub memory: Option<Memory>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct CpuLoad {
    #[serde(deserialize_with = "lenient_f64")]
    pub percent_total: Option<f64>,
}

/// Memory figures in KiB
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Memory {
    #[serde(deserialize_with = "lenient_u64")]
    pub total: Option<u64>,
    #[serde(deserialize_with = "lenient_u64")]
    pub used: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Array {
    #[serde(deserialize_with = "lenient_string")]
    pub state: Option<String>,
    pub capacity: Option<Capacity>,
    #[serde(deserialize_with = "lenient_list")]
    pub parities: Option<Vec<Disk>>,
    #[serde(deserialize_with = "lenient_list")]
    pub disks: Option<Vec<Disk>>,
    #[serde(deserialize_with = "lenient_list")]
    pub caches: Option<Vec<CachePool>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Capacity {
    pub kilobytes: Option<Kilobytes>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Kilobytes {
    #[serde(deserialize_with = "lenient_u64")]
    pub free: Option<u64>,
    #[serde(deserialize_with = "lenient_u64")]
    pub used: Option<u64>,
    #[serde(deserialize_with = "lenient_u64")]
    pub total: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct Disk {
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub device: Option<String>,
    #[serde(deserialize_with = "lenient_i64")]
    pub temp: Option<i64>,
    #[serde(deserialize_with = "lenient_string")]
    pub status: Option<String>,
    /// KiB
    #[serde(deserialize_with = "lenient_u64")]
    pub size: Option<u64>,
    #[serde(deserialize_with = "lenient_u64")]
    pub num_errors: Option<u64>,
    #[serde(deserialize_with = "lenient_bool")]
    pub is_spinning: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct CachePool {
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub device: Option<String>,
    #[serde(deserialize_with = "lenient_i64")]
    pub temp: Option<i64>,
    #[serde(deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(deserialize_with = "lenient_u64")]
    pub fs_size: Option<u64>,
    #[serde(deserialize_with = "lenient_u64")]
    pub fs_used: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Docker {
    #[serde(deserialize_with = "lenient_list")]
    pub containers: Option<Vec<Container>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Container {
    #[serde(deserialize_with = "lenient_list")]
    pub names: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient_string")]
    pub state: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Vms {
    #[serde(deserialize_with = "lenient_list")]
    pub domains: Option<Vec<Domain>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Domain {
    #[serde(deserialize_with = "lenient_string")]
    pub state: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Vars {
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Notifications {
    #[serde(deserialize_with = "lenient_list")]
    pub list: Option<Vec<Notification>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Notification {
    #[serde(deserialize_with = "lenient_string")]
    pub importance: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub subject: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub timestamp: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numbers_accept_strings() {
        let kb: Kilobytes =
            serde_json::from_value(json!({"total": "3000000", "used": 1024, "free": null}))
                .unwrap();
        assert_eq!(kb.total, Some(3_000_000));
        assert_eq!(kb.used, Some(1024));
        assert_eq!(kb.free, None);
    }

    #[test]
    fn test_wrong_shapes_decode_to_none() {
        let disk: Disk = serde_json::from_value(json!({
            "name": "disk1",
            "temp": {"celsius": 40},
            "numErrors": "many",
            "isSpinning": "yes"
        }))
        .unwrap();
        assert_eq!(disk.name.as_deref(), Some("disk1"));
        assert_eq!(disk.temp, None);
        assert_eq!(disk.num_errors, None);
        assert_eq!(disk.is_spinning, None);
    }

    #[test]
    fn test_list_skips_malformed_elements() {
        let docker: Docker = serde_json::from_value(json!({
            "containers": [
                {"names": ["/plex"], "state": "RUNNING"},
                "garbage",
                {"names": null, "state": "EXITED"}
            ]
        }))
        .unwrap();
        let containers = docker.containers.unwrap();
        assert_eq!(containers.len(), 2);
        assert_eq!(containers[1].names, None);
    }

    #[test]
    fn test_null_list_is_absent() {
        let vms: Vms = serde_json::from_value(json!({"domains": null})).unwrap();
        assert!(vms.domains.is_none());
        let vms: Vms = serde_json::from_value(json!({"domains": []})).unwrap();
        assert_eq!(vms.domains.map(|d| d.len()), Some(0));
    }

    #[test]
    fn test_float_temperatures_truncate() {
        let pool: CachePool = serde_json::from_value(json!({"temp": 41.7})).unwrap();
        assert_eq!(pool.temp, Some(41));
    }
}
