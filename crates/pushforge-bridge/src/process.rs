//! Subprocess execution with a per-call deadline.

use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::errors::ProcessError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How long to keep draining pipes once the child has exited or been killed.
const OUTPUT_GRACE: Duration = Duration::from_millis(250);

/// Result of a process that started. A timeout shows up as `exit_code == -1`
/// with whatever output arrived before the kill.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }

    /// Best human-readable reason for a failure: stderr, then stdout, then
    /// the exit code.
    pub fn failure_message(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        format!("Unknown error (exit code {})", self.exit_code)
    }
}

/// Runs external commands. Calls are independent and may overlap.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String], timeout: Duration) -> Result<ProcessOutput, ProcessError>;
}

/// Real subprocess execution backed by `tokio::process::Command`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioProcessRunner;

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, program: &str, args: &[String], timeout: Duration) -> Result<ProcessOutput, ProcessError> {
        let start = Instant::now();

        let mut cmd = tokio::process::Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(program, ?args, "spawning process");

        let mut child = cmd.spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ProcessError::NotFound {
                program: program.to_string(),
            },
            _ => ProcessError::Spawn {
                program: program.to_string(),
                message: e.to_string(),
            },
        })?;

        let stdout = child.stdout.take().map(spawn_reader);
        let stderr = child.stderr.take().map(spawn_reader);

        let exit_code = match tokio::time::timeout(timeout, child.wait()).await {
            Ok(Ok(status)) => status.code().unwrap_or(-1),
            Ok(Err(e)) => {
                warn!(program, error = %e, "process wait failed");
                -1
            }
            Err(_) => {
                warn!(program, timeout_ms = timeout.as_millis() as u64, "process timed out, killing");
                if let Err(e) = child.kill().await {
                    warn!(program, error = %e, "failed to kill timed-out process");
                }
                -1
            }
        };

        let output = ProcessOutput {
            exit_code,
            stdout: collect(stdout).await,
            stderr: collect(stderr).await,
        };

        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        debug!(program, exit_code, duration_ms, "process completed");
        Ok(output)
    }
}

/// Bytes read so far from one pipe, shared with the reader task so a
/// reader cut off by [`OUTPUT_GRACE`] still hands back what it drained.
type PipeBuffer = Arc<Mutex<Vec<u8>>>;

struct PipeReader {
    buffer: PipeBuffer,
    handle: JoinHandle<()>,
}

fn spawn_reader<R: AsyncRead + Unpin + Send + 'static>(pipe: R) -> PipeReader {
    let buffer = PipeBuffer::default();
    let handle = tokio::spawn(drain(pipe, Arc::clone(&buffer)));
    PipeReader { buffer, handle }
}

async fn drain<R: AsyncRead + Unpin>(mut pipe: R, buffer: PipeBuffer) {
    let mut chunk = [0u8; 4096];
    loop {
        match pipe.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => buffer.lock().extend_from_slice(&chunk[..n]),
            Err(e) => {
                debug!(error = %e, "pipe read ended early");
                break;
            }
        }
    }
}

/// Waits for a pipe reader, giving up after [`OUTPUT_GRACE`] if a grandchild
/// still holds the pipe open. Either way the bytes read so far are kept.
async fn collect(reader: Option<PipeReader>) -> String {
    let Some(PipeReader { buffer, mut handle }) = reader else {
        return String::new();
    };
    match tokio::time::timeout(OUTPUT_GRACE, &mut handle).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(error = %e, "pipe reader failed"),
        Err(_) => {
            debug!("pipe still open after exit, keeping partial output");
            handle.abort();
        }
    }
    let text = String::from_utf8_lossy(&buffer.lock()).into_owned();
    text
}

/// Converts string literals into the owned argument list `run` takes.
pub fn args<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        args(["-c", script])
    }

    #[tokio::test]
    async fn run_echo() {
        let result = TokioProcessRunner.run("sh", &sh("echo hello"), DEFAULT_TIMEOUT).await.unwrap();
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout.trim(), "hello");
        assert!(result.succeeded());
    }

    #[tokio::test]
    async fn run_exit_code_and_stderr() {
        let result = TokioProcessRunner
            .run("sh", &sh("echo oops >&2; exit 42"), DEFAULT_TIMEOUT)
            .await
            .unwrap();
        assert_eq!(result.exit_code, 42);
        assert_eq!(result.stderr.trim(), "oops");
        assert_eq!(result.failure_message(), "oops");
    }

    #[tokio::test]
    async fn timeout_kills_and_keeps_partial_output() {
        let started = Instant::now();
        let result = TokioProcessRunner
            .run("sh", &sh("echo started; exec sleep 10"), Duration::from_millis(300))
            .await
            .unwrap();
        assert_eq!(result.exit_code, -1);
        assert!(result.stdout.contains("started"));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn background_child_holding_pipe_keeps_output() {
        let started = Instant::now();
        let result = TokioProcessRunner
            .run("sh", &sh("echo hi; echo warn >&2; sleep 3 &"), DEFAULT_TIMEOUT)
            .await
            .unwrap();
        assert_eq!(result.exit_code, 0);
        assert!(result.stdout.contains("hi"));
        assert!(result.stderr.contains("warn"));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn missing_binary_is_not_found() {
        let err = TokioProcessRunner
            .run("/nonexistent/pushforge-missing-tool", &[], DEFAULT_TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::NotFound { .. }));
    }

    #[tokio::test]
    async fn concurrent_runs_are_independent() {
        let runner = TokioProcessRunner;
        let a = sh("echo a");
        let b = sh("echo b; exit 3");
        let (a, b) = tokio::join!(
            runner.run("sh", &a, DEFAULT_TIMEOUT),
            runner.run("sh", &b, DEFAULT_TIMEOUT),
        );
        assert_eq!(a.unwrap().stdout.trim(), "a");
        let b = b.unwrap();
        assert_eq!(b.stdout.trim(), "b");
        assert_eq!(b.exit_code, 3);
    }

    #[test]
    fn failure_message_preference() {
        let both = ProcessOutput {
            exit_code: 1,
            stdout: "out".into(),
            stderr: " err \n".into(),
        };
        assert_eq!(both.failure_message(), "err");
        let stdout_only = ProcessOutput {
            exit_code: 1,
            stdout: "Error: no channel\n".into(),
            stderr: "  ".into(),
        };
        assert_eq!(stdout_only.failure_message(), "Error: no channel");
        assert_eq!(ProcessOutput::failure(7, "").failure_message(), "Unknown error (exit code 7)");
    }
}
