use std::sync::Arc;
use std::time::Duration;

use pushforge_bridge::mock::{RecordingNotifier, Scripted, ScriptedRunner};
use pushforge_core::{SendStatus, TargetPlatform};
use pushforge_engine::{Dispatcher, DispatcherConfig};
use pushforge_store::{Database, HistoryStore, SqliteHistoryStore, HISTORY_CAP};

const SIMS: &str = r#"{"devices":{"com.apple.CoreSimulator.SimRuntime.iOS-17-2":[
    {"udid":"SIM-1","name":"iPhone 15","state":"Booted","isAvailable":true}
]}}"#;

fn dispatcher(
    runner: ScriptedRunner,
    target: TargetPlatform,
    temp_dir: &std::path::Path,
) -> (Dispatcher, Arc<SqliteHistoryStore>) {
    let history = Arc::new(SqliteHistoryStore::new(Database::in_memory().unwrap()));
    let config = DispatcherConfig {
        temp_dir: temp_dir.to_path_buf(),
        timeout: Duration::from_secs(5),
        ..DispatcherConfig::default()
    };
    let dispatcher = Dispatcher::new(
        Arc::new(runner),
        Arc::new(RecordingNotifier::new()),
        history.clone(),
        config,
    )
    .with_target(target);
    (dispatcher, history)
}

#[tokio::test]
async fn failed_ios_send_records_once_and_reports_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let runner = ScriptedRunner::new()
        .on("simctl list devices", Scripted::ok(SIMS))
        .on("simctl push", Scripted::fail(1, "Invalid device state"));
    let (mut dispatcher, history) = dispatcher(runner, TargetPlatform::IosSimulator, dir.path());
    dispatcher.refresh().await.unwrap();

    let status = dispatcher
        .send_push(r#"{"aps":{"alert":"hello"}}"#, "com.example.app")
        .await
        .unwrap();

    assert_eq!(status, SendStatus::Failure("Invalid device state".into()));
    assert_eq!(dispatcher.status(), &SendStatus::Failure("Invalid device state".into()));

    let records = history.list(None).unwrap();
    assert_eq!(records.len(), 1);
    assert!(!records[0].success);
    assert_eq!(records[0].error_message.as_deref(), Some("Invalid device state"));
    assert_eq!(records[0].bundle_identifier, "com.example.app");
    assert_eq!(records[0].device_identifier, "SIM-1");

    // payload file cleaned up
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn history_is_capped_after_many_sends() {
    let dir = tempfile::tempdir().unwrap();
    let (mut dispatcher, history) = dispatcher(ScriptedRunner::new(), TargetPlatform::Desktop, dir.path());

    let mut first_id = None;
    for n in 0..=HISTORY_CAP {
        let payload = format!(r#"{{"title":"send {n}"}}"#);
        let status = dispatcher.send_push(&payload, "").await.unwrap();
        assert_eq!(status, SendStatus::Success);
        if n == 0 {
            first_id = history.list(Some(1)).unwrap().first().map(|r| r.id);
        }
    }

    assert_eq!(history.count().unwrap(), HISTORY_CAP);
    let records = history.list(None).unwrap();
    assert!(records.iter().all(|r| Some(r.id) != first_id));
    assert!(records.iter().all(|r| r.payload != r#"{"title":"send 0"}"#));
    assert_eq!(records[0].payload, format!(r#"{{"title":"send {HISTORY_CAP}"}}"#));
}

#[tokio::test]
async fn second_send_starts_from_a_fresh_status() {
    let dir = tempfile::tempdir().unwrap();
    let runner = ScriptedRunner::new()
        .on("simctl list devices", Scripted::ok(SIMS))
        .on("simctl push", Scripted::ok(""));
    let (mut dispatcher, history) = dispatcher(runner, TargetPlatform::IosSimulator, dir.path());
    dispatcher.refresh().await.unwrap();

    let failed = dispatcher.send_push("{oops", "com.example").await.unwrap();
    assert!(matches!(failed, SendStatus::Failure(_)));
    let sent = dispatcher.send_push("{}", "com.example").await.unwrap();
    assert_eq!(sent, SendStatus::Success);
    assert_eq!(history.count().unwrap(), 2);
}
