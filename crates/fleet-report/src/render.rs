// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Markdown rendering of the fleet report
//!
//! Rendering is pure string assembly. Sections appear in the order the
//! outcomes are given, which callers keep equal to registry order.

use chrono::{DateTime, Utc};
use fleet_domain_types::{
    CachePoolRecord, DiskRecord, DiskRole, HealthFlags, NotificationRecord, ServerSnapshot,
    VmSummary,
};

use crate::outcome::{ServerOutcome, ServerState, StatusLevel};

/// Document title
pub const REPORT_TITLE: &str = "# Fleet Status Report";

/// Prefix of the only line that differs between runs over identical data
pub const GENERATED_LINE_PREFIX: &str = "_Generated: ";

/// One row of the fleet summary table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub server_name: String,
    pub level: StatusLevel,
    pub issues: Option<usize>,
}

/// A rendered report, written once by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub summary: Vec<SummaryRow>,
    /// Markdown of each server section, in registry order
    pub sections: Vec<String>,
}

impl Report {
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();
        output.push_str(REPORT_TITLE);
        output.push_str("\n\n");
        output.push_str(&format!(
            "{}{}_\n\n",
            GENERATED_LINE_PREFIX,
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        output.push_str("## Summary\n\n");
        output.push_str("| Server | Status | Issues |\n");
        output.push_str("|--------|--------|--------|\n");
        for row in &self.summary {
            let issues = row.issues.map_or_else(|| "-".to_string(), |n| n.to_string());
            output.push_str(&format!(
                "| {} | {} {} | {} |\n",
                escape_cell(&row.server_name),
                row.level.emoji(),
                row.level.label(),
                issues
            ));
        }

        for section in &self.sections {
            output.push('\n');
            output.push_str(section);
        }
        output
    }

    /// Number of servers with a failed query
    pub fn failed_count(&self) -> usize {
        self.summary.iter().filter(|row| row.level == StatusLevel::Error).count()
    }
}

/// Assemble the report for `outcomes`, keeping their order
pub fn render(outcomes: &[ServerOutcome], generated_at: DateTime<Utc>) -> Report {
    Report {
        generated_at,
        summary: outcomes
            .iter()
            .map(|outcome| SummaryRow {
                server_name: outcome.server.name.clone(),
                level: outcome.status_level(),
                issues: outcome.issue_count(),
            })
            .collect(),
        sections: outcomes.iter().map(render_section).collect(),
    }
}

/// Markdown for one server
pub fn render_section(outcome: &ServerOutcome) -> String {
    let mut output = format!("## {}\n\n", outcome.server.name);

    match &outcome.state {
        ServerState::Failed { message } => {
            output.push_str(&format!("⚠️ Error: {}\n", message));
        }
        ServerState::Reported {
            snapshot,
            flags,
            warning,
        } => {
            if let Some(warning) = warning {
                output.push_str(&format!("> ⚠️ Partial data: {}\n\n", warning));
            }
            output.push_str(&system_block(snapshot));
            if snapshot.storage.is_some() {
                output.push('\n');
                output.push_str(&storage_block(snapshot));
            }
            output.push('\n');
            output.push_str(&workloads_block(snapshot));
            output.push('\n');
            output.push_str(&health_block(flags));
            output.push('\n');
            output.push_str(&notifications_block(snapshot.recent_notifications()));
        }
    }
    output
}

fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn system_block(snapshot: &ServerSnapshot) -> String {
    let system = &snapshot.system;
    let load = &snapshot.load;

    let mut output = String::from("### System\n\n");
    output.push_str(&format!("- **Server:** {}\n", system.server_name));
    output.push_str(&format!("- **Hostname:** {}\n", system.hostname));
    output.push_str(&format!("- **OS:** {}\n", system.os));
    output.push_str(&format!("- **Version:** {}\n", system.version));
    output.push_str(&format!(
        "- **CPU:** {} ({} cores / {} threads)\n",
        system.cpu_brand, system.cpu_cores, system.cpu_threads
    ));
    output.push_str(&format!("- **CPU Load:** {:.1}%\n", load.cpu_percent));
    output.push_str(&format!(
        "- **Memory:** {} GiB / {} GiB ({}%)\n",
        load.memory_used_gib, load.memory_total_gib, load.memory_used_percent
    ));
    output.push_str(&format!("- **Uptime:** {}\n", system.uptime));
    output.push_str(&format!("- **Online:** {}\n", yes_no(system.online)));
    output.push_str(&format!(
        "- **SSO:** {}\n",
        if system.sso_enabled { "Enabled" } else { "Disabled" }
    ));
    output
}

fn storage_block(snapshot: &ServerSnapshot) -> String {
    let mut output = String::from("### Storage\n\n");
    let Some(storage) = &snapshot.storage else {
        return output;
    };

    output.push_str(&format!("- **Array State:** {}\n", storage.array_state));
    output.push_str(&format!(
        "- **Capacity:** {} GiB / {} GiB used ({}%), {} GiB free\n",
        storage.used_gib, storage.total_gib, storage.used_percent, storage.free_gib
    ));

    if !snapshot.disks.is_empty() {
        output.push('\n');
        output.push_str("| Disk | Role | Device | Temp | Errors | Spinning | Status | Size |\n");
        output.push_str("|------|------|--------|------|--------|----------|--------|------|\n");
        for disk in &snapshot.disks {
            output.push_str(&disk_row(disk));
        }
    }

    if !snapshot.cache_pools.is_empty() {
        output.push('\n');
        output.push_str("| Pool | Device | Temp | Status | Usage |\n");
        output.push_str("|------|--------|------|--------|-------|\n");
        for pool in &snapshot.cache_pools {
            output.push_str(&pool_row(pool));
        }
    }
    output
}

fn disk_row(disk: &DiskRecord) -> String {
    let role = match disk.role {
        DiskRole::Parity => "Parity",
        DiskRole::Data => "Data",
    };
    format!(
        "| {} | {} | {} | {}°C | {} | {} | {} | {} GiB |\n",
        escape_cell(&disk.name),
        role,
        escape_cell(&disk.device),
        disk.temp_celsius,
        disk.error_count,
        yes_no(disk.spinning),
        escape_cell(&disk.status),
        disk.size_gib
    )
}

fn pool_row(pool: &CachePoolRecord) -> String {
    let usage = match &pool.utilization {
        Some(u) => format!("{} GiB / {} GiB ({}%)", u.used_gib, u.total_gib, u.used_percent),
        None => fleet_domain_types::NOT_AVAILABLE.to_string(),
    };
    format!(
        "| {} | {} | {}°C | {} | {} |\n",
        escape_cell(&pool.name),
        escape_cell(&pool.device),
        pool.temp_celsius,
        escape_cell(&pool.status),
        usage
    )
}

fn workloads_block(snapshot: &ServerSnapshot) -> String {
    let docker = &snapshot.docker;
    let mut output = String::from("### Workloads\n\n");
    output.push_str(&format!(
        "- **Docker:** {} / {} containers running\n",
        docker.running, docker.total
    ));
    match snapshot.vms {
        VmSummary::Disabled => output.push_str("- **VMs:** Disabled\n"),
        VmSummary::Counts { total, running } => {
            output.push_str(&format!("- **VMs:** {} / {} running\n", running, total))
        }
    }
    output.push_str(&format!("- **Shares:** {}\n", snapshot.share_count));
    output.push_str(&format!("- **Log Files:** {}\n", snapshot.log_file_count));
    output
}

fn health_block(flags: &HealthFlags) -> String {
    let mut output = String::from("### Health\n\n");

    if flags.disks_healthy() {
        output.push_str("- ✅ All disks healthy\n");
    } else {
        for disk in &flags.hot_disks {
            output.push_str(&format!(
                "- 🔥 Hot disk: {} ({}°C)\n",
                disk.name, disk.temp_celsius
            ));
        }
        for disk in &flags.errored_disks {
            output.push_str(&format!(
                "- ❌ Disk errors: {} ({} errors)\n",
                disk.name, disk.error_count
            ));
        }
    }

    if flags.unhealthy_containers.is_empty() {
        output.push_str("- ✅ All containers healthy\n");
    } else {
        for container in &flags.unhealthy_containers {
            output.push_str(&format!(
                "- ⚠️ Unhealthy container: {} ({})\n",
                container.name, container.status
            ));
        }
    }

    match flags.alert_notifications.len() {
        0 => output.push_str("- ✅ No alert notifications\n"),
        1 => output.push_str("- 🔔 1 alert notification\n"),
        n => output.push_str(&format!("- 🔔 {} alert notifications\n", n)),
    }
    output
}

fn notifications_block(notifications: &[NotificationRecord]) -> String {
    let mut output = String::from("### Notifications\n\n");
    if notifications.is_empty() {
        output.push_str("- No unread notifications\n");
        return output;
    }
    for n in notifications {
        output.push_str(&format!(
            "- {} **{}** [{}]: {}\n",
            n.date, n.title, n.importance, n.description
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use fleet_domain_types::{QueryErrorKind, QueryResult, ServerConfig};
    use serde_json::json;
    use url::Url;

    fn server(name: &str) -> ServerConfig {
        ServerConfig::new(
            name.to_uppercase(),
            name,
            Url::parse("https://tower.local/graphql").unwrap(),
            "key",
        )
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap()
    }

    #[test]
    fn test_failed_section_is_placeholder_only() {
        let outcome = ServerOutcome::failed(server("Backup"), "transport failure: timed out");
        assert_eq!(
            render_section(&outcome),
            "## Backup\n\n⚠️ Error: transport failure: timed out\n"
        );
    }

    #[test]
    fn test_header_and_summary() {
        let ok = ServerOutcome::from_result(server("Tower"), &QueryResult::ok(json!({"data": {}})));
        let failed = ServerOutcome::from_result(
            server("Backup"),
            &QueryResult::error(QueryErrorKind::Transport, "transport failure: refused"),
        );
        let report = render(&[ok, failed], at());
        let markdown = report.to_markdown();

        assert!(markdown.starts_with("# Fleet Status Report\n\n_Generated: 2024-05-06 07:08:09 UTC_\n\n"));
        assert!(markdown.contains("| Tower | ✅ OK | 0 |\n| Backup | ❌ Error | - |\n"));
        assert_eq!(report.failed_count(), 1);
        let tower = markdown.find("## Tower").unwrap();
        let backup = markdown.find("## Backup").unwrap();
        assert!(tower < backup);
    }

    #[test]
    fn test_storage_heading_omitted_without_capacity() {
        let outcome = ServerOutcome::from_result(
            server("Tower"),
            &QueryResult::ok(json!({"data": {"array": {"disks": [{"name": "disk1", "temp": 30}]}}})),
        );
        let section = render_section(&outcome);
        assert!(!section.contains("### Storage"));
        for heading in ["### System", "### Workloads", "### Health", "### Notifications"] {
            assert!(section.contains(heading), "missing {heading}");
        }
        assert!(section.contains("- ✅ All disks healthy\n"));
    }

    #[test]
    fn test_partial_data_warning_line() {
        let outcome = ServerOutcome::from_result(
            server("Tower"),
            &QueryResult::with_warnings(json!({"data": {}}), "docker: service unavailable"),
        );
        let section = render_section(&outcome);
        assert!(section.starts_with("## Tower\n\n> ⚠️ Partial data: docker: service unavailable\n\n### System\n"));
    }

    #[test]
    fn test_cache_pool_without_sizes_renders_not_available() {
        let outcome = ServerOutcome::from_result(
            server("Tower"),
            &QueryResult::ok(json!({"data": {"array": {
                "capacity": {"kilobytes": {"total": 2097152, "used": 1048576, "free": 1048576}},
                "caches": [{"name": "cache", "device": "nvme0n1", "temp": 35, "status": "DISK_OK"}]
            }}})),
        );
        let section = render_section(&outcome);
        assert!(section.contains("| cache | nvme0n1 | 35°C | DISK_OK | N/A |\n"));
    }

    #[test]
    fn test_escape_cell() {
        assert_eq!(escape_cell("a|b"), "a\\|b");
    }
}
