//! The three delivery mechanisms. Each returns `Err(message)` for a failed
//! send; the message is what the user sees and what history records.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use pushforge_bridge::{AdbBridge, LocalNotification, LocalNotifier, ProcessError, ProcessOutput, SimctlBridge};
use pushforge_core::payload::{content_or_default, parses_as_json};

pub(crate) const INVALID_PAYLOAD: &str = "Invalid payload: not valid JSON";

pub(crate) type Outcome = Result<(), String>;

fn outcome(result: Result<ProcessOutput, ProcessError>) -> Outcome {
    match result {
        Ok(output) if output.succeeded() => Ok(()),
        Ok(output) => Err(output.failure_message()),
        Err(e) => Err(e.to_string()),
    }
}

/// Payload file handed to `simctl push`; removed when dropped.
struct PayloadFile {
    path: PathBuf,
}

impl PayloadFile {
    async fn write(dir: &Path, payload: &str) -> std::io::Result<Self> {
        let file = Self {
            path: dir.join(format!("pushforge_{}.json", Uuid::new_v4())),
        };
        tokio::fs::write(&file.path, payload).await?;
        Ok(file)
    }
}

impl Drop for PayloadFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            debug!(path = %self.path.display(), error = %e, "payload file not removed");
        }
    }
}

pub(crate) async fn push_to_simulator(
    simctl: &SimctlBridge,
    temp_dir: &Path,
    udid: &str,
    bundle_id: &str,
    payload: &str,
) -> Outcome {
    if !parses_as_json(payload) {
        return Err(INVALID_PAYLOAD.to_string());
    }
    let file = PayloadFile::write(temp_dir, payload)
        .await
        .map_err(|e| format!("could not write payload file: {e}"))?;
    let result = simctl.push(udid, bundle_id, &file.path).await;
    drop(file);
    outcome(result)
}

/// Unique per send so the notification shade never collapses two sends.
fn notification_tag() -> String {
    format!("pushforge-{}", Utc::now().timestamp_millis())
}

pub(crate) async fn post_to_emulator(adb: &AdbBridge, serial: &str, payload: &str) -> Outcome {
    let content = content_or_default(payload);
    let tag = notification_tag();
    outcome(adb.post_notification(serial, &content.title, &content.body, &tag).await)
}

/// Attributes the notification to `app_id` only when that app is already
/// running; it never launches one.
pub(crate) async fn show_on_desktop(
    notifier: &dyn LocalNotifier,
    sound: Option<&str>,
    app_id: &str,
    payload: &str,
) -> Outcome {
    let content = content_or_default(payload);
    let notification = LocalNotification {
        title: content.title,
        subtitle: content.subtitle,
        body: content.body,
        sound: sound.map(str::to_string),
    };

    let identity = if app_id.is_empty() {
        None
    } else if notifier.is_app_running(app_id).await {
        Some(app_id)
    } else {
        debug!(app_id, "app not running, sending a generic notification");
        None
    };
    notifier.deliver(&notification, identity).await.map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use pushforge_bridge::mock::{RecordingNotifier, Scripted, ScriptedRunner};

    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn simulator_push_writes_then_removes_payload_file() {
        let dir = tempfile::tempdir().unwrap();
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let seen_in_call = seen.clone();
        let runner = ScriptedRunner::new()
            .on("simctl push", Scripted::ok(""))
            .observe(move |call| {
                if let Some(path) = call.args.last() {
                    seen_in_call
                        .lock()
                        .push((path.clone(), std::fs::read_to_string(path).ok()));
                }
            });
        let simctl = SimctlBridge::new(Arc::new(runner), "xcrun", TIMEOUT);

        let payload = r#"{"aps":{"alert":"hi"}}"#;
        push_to_simulator(&simctl, dir.path(), "SIM-1", "com.example", payload)
            .await
            .unwrap();

        let seen = seen.lock();
        let (path, contents) = &seen[0];
        assert!(path.contains("pushforge_") && path.ends_with(".json"));
        assert_eq!(contents.as_deref(), Some(payload));
        assert!(!Path::new(path).exists());
    }

    #[tokio::test]
    async fn failed_push_still_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::new().on("simctl push", Scripted::fail(1, "Invalid device state\n"));
        let simctl = SimctlBridge::new(Arc::new(runner), "xcrun", TIMEOUT);

        let err = push_to_simulator(&simctl, dir.path(), "SIM-1", "com.example", "{}")
            .await
            .unwrap_err();
        assert_eq!(err, "Invalid device state");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn malformed_payload_never_reaches_simctl() {
        let runner = Arc::new(ScriptedRunner::new());
        let simctl = SimctlBridge::new(runner.clone(), "xcrun", TIMEOUT);
        let err = push_to_simulator(&simctl, Path::new("/tmp"), "SIM-1", "com.example", "{nope")
            .await
            .unwrap_err();
        assert_eq!(err, INVALID_PAYLOAD);
        assert_eq!(runner.call_count(), 0);
    }

    #[tokio::test]
    async fn emulator_post_uses_extracted_content() {
        let runner = Arc::new(ScriptedRunner::new().on("notification post", Scripted::ok("")));
        let adb = AdbBridge::new(runner.clone(), PathBuf::from("adb"), TIMEOUT);

        post_to_emulator(&adb, "emulator-5554", r#"{"notification":{"title":"Hey","body":"it's here"}}"#)
            .await
            .unwrap();

        let call = &runner.calls()[0];
        let command = call.args.last().unwrap();
        assert!(command.contains("-t 'Hey' 'pushforge-"));
        assert!(command.ends_with(r"'it'\''s here'"));
    }

    #[tokio::test]
    async fn emulator_failure_falls_back_to_stdout() {
        let runner = ScriptedRunner::new().on(
            "notification post",
            Scripted::Output(ProcessOutput {
                exit_code: 255,
                stdout: "error: device offline".into(),
                stderr: String::new(),
            }),
        );
        let adb = AdbBridge::new(Arc::new(runner), PathBuf::from("adb"), TIMEOUT);
        let err = post_to_emulator(&adb, "emulator-5554", "{}").await.unwrap_err();
        assert_eq!(err, "error: device offline");
    }

    #[tokio::test]
    async fn desktop_identity_only_for_running_apps() {
        let notifier = RecordingNotifier::new().with_running(&["com.apple.Safari"]);
        let payload = r#"{"title":"Web","body":"hello"}"#;

        show_on_desktop(&notifier, Some("default"), "com.apple.Safari", payload)
            .await
            .unwrap();
        show_on_desktop(&notifier, None, "com.tinyspeck.slackmacgap", payload)
            .await
            .unwrap();

        let delivered = notifier.delivered();
        assert_eq!(delivered[0].app_id.as_deref(), Some("com.apple.Safari"));
        assert_eq!(delivered[0].notification.sound.as_deref(), Some("default"));
        assert_eq!(delivered[1].app_id, None);
        assert_eq!(delivered[1].notification.title, "Web");
    }

    #[tokio::test]
    async fn desktop_delivery_error_is_reported() {
        let notifier = RecordingNotifier::new().failing("no notification center");
        let err = show_on_desktop(&notifier, None, "", "not json").await.unwrap_err();
        assert!(err.contains("no notification center"));
    }
}
