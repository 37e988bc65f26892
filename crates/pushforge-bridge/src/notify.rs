//! Local desktop notifications.
//!
//! macOS goes through `osascript`; elsewhere `notify-send` is used. Both can
//! attribute a notification to an app, but only when that app is already
//! running: neither ever launches one.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use pushforge_core::APP_NAME;

use crate::errors::NotifyError;
use crate::process::{args, ProcessRunner};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocalNotification {
    pub title: String,
    pub subtitle: Option<String>,
    pub body: String,
    /// Sound name; `None` or empty is silent.
    pub sound: Option<String>,
}

#[async_trait]
pub trait LocalNotifier: Send + Sync {
    /// Whether the app with this identifier is currently running.
    async fn is_app_running(&self, app_id: &str) -> bool;

    /// Shows `notification`, attributed to `app_id` when given.
    async fn deliver(&self, notification: &LocalNotification, app_id: Option<&str>) -> Result<(), NotifyError>;
}

fn audible(sound: &Option<String>) -> Option<&str> {
    sound.as_deref().filter(|s| !s.is_empty())
}

/// Escapes text for an AppleScript string literal.
pub fn applescript_escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// The AppleScript for `notification`, wrapped in a `tell` block when
/// attributed to an app.
pub fn applescript(notification: &LocalNotification, app_id: Option<&str>) -> String {
    let mut command = format!(
        "display notification \"{}\" with title \"{}\"",
        applescript_escape(&notification.body),
        applescript_escape(&notification.title)
    );
    if let Some(subtitle) = notification.subtitle.as_deref().filter(|s| !s.is_empty()) {
        command.push_str(&format!(" subtitle \"{}\"", applescript_escape(subtitle)));
    }
    if let Some(sound) = audible(&notification.sound) {
        command.push_str(&format!(" sound name \"{}\"", applescript_escape(sound)));
    }
    match app_id {
        Some(id) => format!("tell application id \"{}\" to {command}", applescript_escape(id)),
        None => command,
    }
}

pub struct OsascriptNotifier {
    runner: Arc<dyn ProcessRunner>,
    osascript: String,
    timeout: Duration,
}

impl OsascriptNotifier {
    pub fn new(runner: Arc<dyn ProcessRunner>, osascript: impl Into<String>, timeout: Duration) -> Self {
        Self {
            runner,
            osascript: osascript.into(),
            timeout,
        }
    }
}

#[async_trait]
impl LocalNotifier for OsascriptNotifier {
    async fn is_app_running(&self, app_id: &str) -> bool {
        let script = format!("application id \"{}\" is running", applescript_escape(app_id));
        match self.runner.run(&self.osascript, &args(["-e", script.as_str()]), self.timeout).await {
            Ok(output) => output.succeeded() && output.stdout.trim() == "true",
            Err(e) => {
                debug!(app_id, error = %e, "running check failed");
                false
            }
        }
    }

    async fn deliver(&self, notification: &LocalNotification, app_id: Option<&str>) -> Result<(), NotifyError> {
        let script = applescript(notification, app_id);
        let output = self
            .runner
            .run(&self.osascript, &args(["-e", script.as_str()]), self.timeout)
            .await?;
        if !output.succeeded() {
            return Err(NotifyError::Failed(output.failure_message()));
        }
        info!(app_id = app_id.unwrap_or("-"), "desktop notification shown");
        Ok(())
    }
}

/// `notify-send` argument list for `notification`.
pub fn notify_send_args(notification: &LocalNotification, app_id: Option<&str>) -> Vec<String> {
    let mut argv = vec![format!("--app-name={}", app_id.unwrap_or(APP_NAME))];
    if let Some(sound) = audible(&notification.sound) {
        argv.push(format!("--hint=string:sound-name:{sound}"));
    }
    argv.push(notification.title.clone());
    let body = match notification.subtitle.as_deref().filter(|s| !s.is_empty()) {
        Some(subtitle) => format!("{subtitle}\n{}", notification.body),
        None => notification.body.clone(),
    };
    argv.push(body);
    argv
}

pub struct NotifySendNotifier {
    runner: Arc<dyn ProcessRunner>,
    notify_send: String,
    timeout: Duration,
}

impl NotifySendNotifier {
    pub fn new(runner: Arc<dyn ProcessRunner>, notify_send: impl Into<String>, timeout: Duration) -> Self {
        Self {
            runner,
            notify_send: notify_send.into(),
            timeout,
        }
    }
}

#[async_trait]
impl LocalNotifier for NotifySendNotifier {
    async fn is_app_running(&self, app_id: &str) -> bool {
        // The kernel truncates process names to 15 bytes, so match the
        // full command line, where reverse-DNS ids appear whole.
        let pattern = regex::escape(app_id);
        match self.runner.run("pgrep", &args(["-f", pattern.as_str()]), self.timeout).await {
            Ok(output) => output.succeeded(),
            Err(e) => {
                debug!(app_id, error = %e, "running check failed");
                false
            }
        }
    }

    async fn deliver(&self, notification: &LocalNotification, app_id: Option<&str>) -> Result<(), NotifyError> {
        let output = self
            .runner
            .run(&self.notify_send, &notify_send_args(notification, app_id), self.timeout)
            .await?;
        if !output.succeeded() {
            return Err(NotifyError::Failed(output.failure_message()));
        }
        info!(app_id = app_id.unwrap_or("-"), "desktop notification shown");
        Ok(())
    }
}

/// The notifier for the host OS.
pub fn system_notifier(
    runner: Arc<dyn ProcessRunner>,
    osascript: &str,
    notify_send: &str,
    timeout: Duration,
) -> Arc<dyn LocalNotifier> {
    if cfg!(target_os = "macos") {
        Arc::new(OsascriptNotifier::new(runner, osascript, timeout))
    } else {
        Arc::new(NotifySendNotifier::new(runner, notify_send, timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Scripted, ScriptedRunner};

    fn note() -> LocalNotification {
        LocalNotification {
            title: "Say \"hi\"".into(),
            subtitle: Some("Sub".into()),
            body: "C:\\path".into(),
            sound: Some("default".into()),
        }
    }

    #[test]
    fn applescript_escapes_and_attributes() {
        let script = applescript(&note(), Some("com.apple.Safari"));
        assert_eq!(
            script,
            "tell application id \"com.apple.Safari\" to display notification \"C:\\\\path\" \
             with title \"Say \\\"hi\\\"\" subtitle \"Sub\" sound name \"default\""
        );
    }

    #[test]
    fn applescript_plain_and_silent() {
        let mut silent = note();
        silent.sound = Some(String::new());
        silent.subtitle = None;
        let script = applescript(&silent, None);
        assert!(script.starts_with("display notification"));
        assert!(!script.contains("sound name"));
        assert!(!script.contains("subtitle"));
    }

    #[test]
    fn notify_send_arguments() {
        let argv = notify_send_args(&note(), None);
        assert_eq!(argv[0], "--app-name=PushForge");
        assert_eq!(argv[1], "--hint=string:sound-name:default");
        assert_eq!(argv[2], "Say \"hi\"");
        assert_eq!(argv[3], "Sub\nC:\\path");
    }

    #[tokio::test]
    async fn osascript_running_check_reads_true() {
        let runner = Arc::new(ScriptedRunner::new().on("is running", Scripted::ok("true\n")));
        let notifier = OsascriptNotifier::new(runner, "osascript", Duration::from_secs(1));
        assert!(notifier.is_app_running("com.apple.Safari").await);

        let runner = Arc::new(ScriptedRunner::new().on("is running", Scripted::ok("false\n")));
        let notifier = OsascriptNotifier::new(runner, "osascript", Duration::from_secs(1));
        assert!(!notifier.is_app_running("com.apple.Safari").await);
    }

    #[tokio::test]
    async fn delivery_failure_is_reported() {
        let runner = Arc::new(ScriptedRunner::new().on("notify-send", Scripted::fail(1, "no daemon")));
        let notifier = NotifySendNotifier::new(runner, "notify-send", Duration::from_secs(1));
        let err = notifier.deliver(&note(), None).await.unwrap_err();
        assert!(matches!(err, NotifyError::Failed(ref m) if m == "no daemon"));
    }

    #[tokio::test]
    async fn pgrep_exit_code_decides_running() {
        let runner = Arc::new(ScriptedRunner::new().on("pgrep -f slack", Scripted::ok("4242\n")));
        let notifier = NotifySendNotifier::new(runner, "notify-send", Duration::from_secs(1));
        assert!(notifier.is_app_running("slack").await);
        assert!(!notifier.is_app_running("teams").await);
    }

    #[tokio::test]
    async fn long_reverse_dns_id_matches_full_command_line() {
        let runner = Arc::new(ScriptedRunner::new());
        let notifier = NotifySendNotifier::new(runner.clone(), "notify-send", Duration::from_secs(1));
        notifier.is_app_running("org.mozilla.firefox").await;
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].args, vec!["-f".to_string(), r"org\.mozilla\.firefox".to_string()]);
    }
}
