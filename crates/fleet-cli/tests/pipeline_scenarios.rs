// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! End-to-end runs over a scripted in-memory transport

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use fleet_cli::{execute, AppError, ReportSettings};
use fleet_domain_types::ServerConfig;
use fleet_graphql_client::{GraphqlTransport, QueryClient, QueryError, QueryOptions, RawResponse};
use fleet_report::GENERATED_LINE_PREFIX;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

#[derive(Clone)]
enum Script {
    Reply(String),
    Slow(Duration, String),
    Hang,
}

#[derive(Default)]
struct ScriptedTransport {
    scripts: HashMap<String, Script>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedTransport {
    fn with(mut self, id: &str, script: Script) -> Self {
        self.scripts.insert(id.to_string(), script);
        self
    }
}

#[async_trait]
impl GraphqlTransport for ScriptedTransport {
    async fn post(
        &self,
        server: &ServerConfig,
        _body: &Value,
        _options: &QueryOptions,
    ) -> Result<RawResponse, QueryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let script = self.scripts.get(&server.id).cloned();
        let response = match script {
            Some(Script::Reply(body)) => Ok(RawResponse::new(200, body)),
            Some(Script::Slow(delay, body)) => {
                tokio::time::sleep(delay).await;
                Ok(RawResponse::new(200, body))
            }
            Some(Script::Hang) => std::future::pending().await,
            None => Err(QueryError::Transport("connection refused".to_string())),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        response
    }
}

fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn fleet_env(ids: &[&str]) -> Vec<(String, String)> {
    ids.iter()
        .flat_map(|id| {
            [
                (format!("FLEET_{id}_URL"), format!("https://{}.local/graphql", id.to_lowercase())),
                (format!("FLEET_{id}_API_KEY"), format!("key-{id}")),
            ]
        })
        .collect()
}

fn settings(dir: &Path) -> ReportSettings {
    ReportSettings {
        output_path: dir.join("report.md"),
        env_prefix: "FLEET".to_string(),
        timeout_secs: 5,
        concurrency: 4,
        ignore_errors: false,
        insecure_tls: false,
        debug: false,
        diagnostics_dir: dir.join("diagnostics"),
        logging: Default::default(),
    }
}

fn hot_disk_payload() -> String {
    json!({
        "data": {
            "vars": {"name": "Tower", "version": "6.12.10"},
            "array": {
                "state": "STARTED",
                "capacity": {"kilobytes": {"total": "2097152", "used": "1048576", "free": "1048576"}},
                "disks": [{"name": "disk1", "device": "sdb", "temp": 50, "numErrors": 0, "isSpinning": true, "status": "DISK_OK"}]
            },
            "online": true
        }
    })
    .to_string()
}

fn simple_payload(name: &str) -> String {
    json!({ "data": { "vars": { "name": name }, "online": true } }).to_string()
}

#[tokio::test(start_paused = true)]
async fn scenario_a_hot_disk_and_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let transport = ScriptedTransport::default()
        .with("TOWER", Script::Reply(hot_disk_payload()))
        .with("BACKUP", Script::Hang);
    let client = QueryClient::new(Arc::new(transport));
    let settings = settings(dir.path());

    let outcome = execute(
        &settings,
        &fleet_env(&["TOWER", "BACKUP"]),
        &client,
        Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap(),
    )
    .await
    .unwrap();

    assert_eq!(outcome.server_count, 2);
    assert_eq!(outcome.failed_count, 1);

    let written = std::fs::read_to_string(&settings.output_path).unwrap();
    assert_eq!(written, outcome.markdown);

    let tower = written.find("## TOWER").unwrap();
    let backup = written.find("## BACKUP").unwrap();
    assert!(tower < backup);

    let tower_section = &written[tower..backup];
    let health = tower_section.find("### Health").unwrap();
    assert!(tower_section[health..].contains("- 🔥 Hot disk: disk1 (50°C)\n"));
    assert!(!tower_section.contains("All disks healthy"));

    assert_eq!(
        &written[backup..],
        "## BACKUP\n\n⚠️ Error: transport failure: request timed out after 5s\n"
    );

    // Failed servers always leave a diagnostic dump
    assert_eq!(outcome.diagnostics, vec![settings.diagnostics_dir.join("BACKUP.json")]);
}

#[tokio::test]
async fn scenario_b_graphql_errors_without_data() {
    let dir = tempfile::tempdir().unwrap();
    let transport = ScriptedTransport::default().with(
        "TOWER",
        Script::Reply(json!({"errors": [{"message": "Unauthorized"}]}).to_string()),
    );
    let client = QueryClient::new(Arc::new(transport));
    let settings = settings(dir.path());

    let outcome = execute(&settings, &fleet_env(&["TOWER"]), &client, Utc::now())
        .await
        .unwrap();

    assert_eq!(outcome.failed_count, 1);
    assert!(outcome
        .markdown
        .ends_with("## TOWER\n\n⚠️ Error: Unauthorized\n"));
    assert!(settings.output_path.exists());
}

#[tokio::test]
async fn partial_data_is_used_when_errors_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let body = json!({
        "data": {"vars": {"name": "Tower"}, "vms": null},
        "errors": [{"message": "vms: service disabled"}]
    })
    .to_string();
    let transport = ScriptedTransport::default().with("TOWER", Script::Reply(body));
    let client = QueryClient::new(Arc::new(transport));
    let mut settings = settings(dir.path());
    settings.ignore_errors = true;

    let outcome = execute(&settings, &fleet_env(&["TOWER"]), &client, Utc::now())
        .await
        .unwrap();

    assert_eq!(outcome.failed_count, 0);
    assert!(outcome
        .markdown
        .contains("## TOWER\n\n> ⚠️ Partial data: vms: service disabled\n\n### System\n"));
    assert!(outcome.markdown.contains("| TOWER | ⚠️ Warnings | 0 |"));
    assert!(outcome.markdown.contains("- **VMs:** Disabled\n"));
    assert_eq!(outcome.diagnostics.len(), 1);
}

#[tokio::test]
async fn runs_are_identical_apart_from_timestamp() {
    let dir = tempfile::tempdir().unwrap();
    let transport = Arc::new(
        ScriptedTransport::default()
            .with("TOWER", Script::Reply(hot_disk_payload()))
            .with("MEDIA", Script::Reply(simple_payload("media"))),
    );
    let client = QueryClient::new(transport);
    let settings = settings(dir.path());
    let environment = fleet_env(&["TOWER", "MEDIA"]);

    let first = execute(
        &settings,
        &environment,
        &client,
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    )
    .await
    .unwrap();
    let second = execute(
        &settings,
        &environment,
        &client,
        Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
    )
    .await
    .unwrap();

    let body = |text: &str| -> Vec<String> {
        text.lines()
            .filter(|line| !line.starts_with(GENERATED_LINE_PREFIX))
            .map(str::to_string)
            .collect()
    };
    assert_ne!(first.markdown, second.markdown);
    assert_eq!(body(&first.markdown), body(&second.markdown));
}

#[tokio::test(start_paused = true)]
async fn output_follows_registry_order_not_completion_order() {
    let dir = tempfile::tempdir().unwrap();
    let transport = ScriptedTransport::default()
        .with("SLOW", Script::Slow(Duration::from_secs(3), simple_payload("slow")))
        .with("FAST", Script::Reply(simple_payload("fast")));
    let client = QueryClient::new(Arc::new(transport));

    let outcome = execute(&settings(dir.path()), &fleet_env(&["SLOW", "FAST"]), &client, Utc::now())
        .await
        .unwrap();

    let slow = outcome.markdown.find("## SLOW").unwrap();
    let fast = outcome.markdown.find("## FAST").unwrap();
    assert!(slow < fast);
}

#[tokio::test(start_paused = true)]
async fn concurrency_is_bounded() {
    let dir = tempfile::tempdir().unwrap();
    let ids = ["A", "B", "C", "D", "E"];
    let transport = ids.iter().fold(ScriptedTransport::default(), |t, id| {
        t.with(id, Script::Slow(Duration::from_secs(1), simple_payload(id)))
    });
    let transport = Arc::new(transport);
    let client = QueryClient::new(transport.clone());
    let mut settings = settings(dir.path());
    settings.concurrency = 2;

    let outcome = execute(&settings, &fleet_env(&ids), &client, Utc::now())
        .await
        .unwrap();

    assert_eq!(outcome.server_count, 5);
    assert_eq!(transport.calls.load(Ordering::SeqCst), 5);
    assert_eq!(transport.max_in_flight.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn missing_api_key_aborts_before_any_query() {
    let dir = tempfile::tempdir().unwrap();
    let transport = Arc::new(ScriptedTransport::default().with("TOWER", Script::Reply(simple_payload("t"))));
    let client = QueryClient::new(transport.clone());
    let settings = settings(dir.path());
    let environment = env(&[
        ("FLEET_TOWER_URL", "https://tower.local/graphql"),
        ("FLEET_TOWER_API_KEY", "k"),
        ("FLEET_NAS_URL", "https://nas.local/graphql"),
    ]);

    let err = execute(&settings, &environment, &client, Utc::now())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Registry(_)));
    assert_eq!(err.exit_code(), 2);
    assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    assert!(!settings.output_path.exists());
}

#[tokio::test]
async fn empty_environment_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let client = QueryClient::new(Arc::new(ScriptedTransport::default()));

    let err = execute(&settings(dir.path()), &[], &client, Utc::now())
        .await
        .unwrap_err();

    assert!(err.is_config_error());
}

#[tokio::test]
async fn unwritable_output_is_a_run_failure() {
    let dir = tempfile::tempdir().unwrap();
    let client = QueryClient::new(Arc::new(
        ScriptedTransport::default().with("TOWER", Script::Reply(simple_payload("t"))),
    ));
    let mut settings = settings(dir.path());
    // An existing non-empty directory cannot be replaced by the report
    std::fs::create_dir_all(dir.path().join("taken/child")).unwrap();
    settings.output_path = dir.path().join("taken");

    let err = execute(&settings, &fleet_env(&["TOWER"]), &client, Utc::now())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::WriteReport { .. }));
    assert_eq!(err.exit_code(), 1);
}

#[tokio::test]
async fn debug_mode_dumps_every_server() {
    let dir = tempfile::tempdir().unwrap();
    let client = QueryClient::new(Arc::new(
        ScriptedTransport::default()
            .with("TOWER", Script::Reply(simple_payload("tower")))
            .with("MEDIA", Script::Reply(simple_payload("media"))),
    ));
    let mut settings = settings(dir.path());
    settings.debug = true;

    let outcome = execute(&settings, &fleet_env(&["TOWER", "MEDIA"]), &client, Utc::now())
        .await
        .unwrap();

    assert_eq!(outcome.diagnostics.len(), 2);
    let dumped: Value = serde_json::from_str(
        &std::fs::read_to_string(settings.diagnostics_dir.join("MEDIA.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(dumped["payload"]["data"]["vars"]["name"], "media");
    assert_eq!(dumped["status"], "Ok");
}

#[tokio::test]
async fn failures_sharing_a_display_name_keep_both_dumps() {
    let dir = tempfile::tempdir().unwrap();
    let client = QueryClient::new(Arc::new(ScriptedTransport::default()));
    let settings = settings(dir.path());
    let mut environment = fleet_env(&["A", "B"]);
    environment.extend(env(&[("FLEET_A_NAME", "Tower"), ("FLEET_B_NAME", "Tower")]));

    let outcome = execute(&settings, &environment, &client, Utc::now())
        .await
        .unwrap();

    assert_eq!(outcome.failed_count, 2);
    assert_eq!(
        outcome.diagnostics,
        vec![
            settings.diagnostics_dir.join("A.json"),
            settings.diagnostics_dir.join("B.json"),
        ]
    );
    assert_eq!(std::fs::read_dir(&settings.diagnostics_dir).unwrap().count(), 2);
}
