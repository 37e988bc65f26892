//! Deterministic stand-ins for external tools, for tests.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::errors::{NotifyError, ProcessError};
use crate::notify::{LocalNotification, LocalNotifier};
use crate::process::{ProcessOutput, ProcessRunner};

/// Pre-programmed result for a matching command.
#[derive(Clone, Debug)]
pub enum Scripted {
    Output(ProcessOutput),
    NotFound,
    SpawnError(String),
    /// Wait, then produce the inner result.
    Delay(Duration, Box<Scripted>),
}

impl Scripted {
    pub fn ok(stdout: &str) -> Self {
        Self::Output(ProcessOutput::success(stdout))
    }

    pub fn fail(exit_code: i32, stderr: &str) -> Self {
        Self::Output(ProcessOutput::failure(exit_code, stderr))
    }

    pub fn delayed(delay: Duration, inner: Scripted) -> Self {
        Self::Delay(delay, Box::new(inner))
    }
}

/// One recorded invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessCall {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl ProcessCall {
    /// Program and arguments joined by spaces.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

type Observer = Box<dyn Fn(&ProcessCall) + Send + Sync>;

/// Replays canned results for commands whose command line contains a
/// pattern. The first matching rule wins; unmatched commands exit 127.
#[derive(Default)]
pub struct ScriptedRunner {
    rules: Vec<(String, Scripted)>,
    calls: Mutex<Vec<ProcessCall>>,
    observer: Option<Observer>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, pattern: &str, response: Scripted) -> Self {
        self.rules.push((pattern.to_string(), response));
        self
    }

    /// Runs `f` on every call before the response is produced.
    pub fn observe(mut self, f: impl Fn(&ProcessCall) + Send + Sync + 'static) -> Self {
        self.observer = Some(Box::new(f));
        self
    }

    pub fn calls(&self) -> Vec<ProcessCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl ProcessRunner for ScriptedRunner {
    async fn run(&self, program: &str, args: &[String], timeout: Duration) -> Result<ProcessOutput, ProcessError> {
        let call = ProcessCall {
            program: program.to_string(),
            args: args.to_vec(),
            timeout,
        };
        if let Some(observer) = &self.observer {
            observer(&call);
        }
        let line = call.command_line();
        self.calls.lock().push(call);

        let mut response = match self.rules.iter().find(|(pattern, _)| line.contains(pattern.as_str())) {
            Some((_, response)) => response.clone(),
            None => Scripted::fail(127, &format!("unscripted command: {line}")),
        };
        loop {
            match response {
                Scripted::Output(output) => return Ok(output),
                Scripted::NotFound => {
                    return Err(ProcessError::NotFound {
                        program: program.to_string(),
                    })
                }
                Scripted::SpawnError(message) => {
                    return Err(ProcessError::Spawn {
                        program: program.to_string(),
                        message,
                    })
                }
                Scripted::Delay(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    response = *inner;
                }
            }
        }
    }
}

/// A delivered notification as seen by [`RecordingNotifier`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delivered {
    pub notification: LocalNotification,
    pub app_id: Option<String>,
}

/// Notifier that records deliveries instead of showing them.
#[derive(Default)]
pub struct RecordingNotifier {
    running: Vec<String>,
    failure: Option<String>,
    delivered: Mutex<Vec<Delivered>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apps reported as running.
    pub fn with_running(mut self, app_ids: &[&str]) -> Self {
        self.running = app_ids.iter().map(|id| id.to_string()).collect();
        self
    }

    /// Every delivery fails with `message`.
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn delivered(&self) -> Vec<Delivered> {
        self.delivered.lock().clone()
    }
}

#[async_trait]
impl LocalNotifier for RecordingNotifier {
    async fn is_app_running(&self, app_id: &str) -> bool {
        self.running.iter().any(|id| id == app_id)
    }

    async fn deliver(&self, notification: &LocalNotification, app_id: Option<&str>) -> Result<(), NotifyError> {
        if let Some(message) = &self.failure {
            return Err(NotifyError::Failed(message.clone()));
        }
        self.delivered.lock().push(Delivered {
            notification: notification.clone(),
            app_id: app_id.map(str::to_string),
        });
        Ok(())
    }
}
