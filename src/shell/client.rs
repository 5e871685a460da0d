use crate::core::config::Config;
use crate::core::{ExecError, Result};
use crate::su::session::{read_line_into, reap_within};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::process::Command;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

/// Runs unprivileged helper commands.
#[derive(Debug, Clone)]
pub struct ShellClient {
    timeout: Duration,
}
impl ShellClient {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.command_timeout())
    }

    /// First stdout line of `program args...` containing `filter`. Reading stops
    /// there and the process is killed. The whole call, reaping included, is
    /// bounded by the client's timeout.
    pub async fn first_line_containing(
        &self,
        program: &str,
        args: &[&str],
        filter: &str,
    ) -> Result<Option<String>> {
        let deadline = Instant::now() + self.timeout;
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ExecError::SpawnFailed {
                program: program.to_string(),
                source,
            })?;
        let Some(stdout) = child.stdout.take() else {
            return Ok(None);
        };
        let scan = async {
            let mut reader = BufReader::new(stdout);
            let mut buf = Vec::new();
            while let Some(line) = read_line_into(&mut reader, &mut buf).await? {
                if line.contains(filter) {
                    return Ok::<_, std::io::Error>(Some(line));
                }
            }
            Ok::<_, std::io::Error>(None)
        };
        let found = timeout_at(deadline, scan)
            .await
            .map_err(|_| ExecError::Timeout(self.timeout.as_millis()))??;
        if let Err(e) = child.start_kill() {
            debug!(program, error = %e, "kill after scan failed");
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if reap_within(child.wait(), remaining).await.is_none() {
            warn!(program, "helper process not reaped before timeout, leaving it to kill_on_drop");
        }
        debug!(program, filter, found = found.is_some(), "filtered command finished");
        Ok(found)
    }
}
impl Default for ShellClient {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_first_matching_line() {
        let client = ShellClient::default();
        let line = client
            .first_line_containing("sh", &["-c", "echo lo; echo 'eth0 HWaddr AA:BB'; echo 'wlan0 HWaddr CC:DD'"], "HWaddr")
            .await
            .unwrap();
        assert_eq!(line.as_deref(), Some("eth0 HWaddr AA:BB"));
    }

    #[tokio::test]
    async fn no_match_is_none() {
        let client = ShellClient::default();
        let line = client
            .first_line_containing("sh", &["-c", "echo nothing here"], "HWaddr")
            .await
            .unwrap();
        assert_eq!(line, None);
    }

    #[tokio::test]
    async fn missing_program_is_spawn_error() {
        let client = ShellClient::default();
        let err = client
            .first_line_containing("/nonexistent/busybox", &["ifconfig"], "HWaddr")
            .await
            .unwrap_err();
        assert!(matches!(err, ExecError::SpawnFailed { .. }));
    }

    #[tokio::test]
    async fn silent_process_times_out() {
        let client = ShellClient::new(Duration::from_millis(200));
        let err = client
            .first_line_containing("sleep", &["30"], "HWaddr")
            .await
            .unwrap_err();
        assert!(matches!(err, ExecError::Timeout(200)));
    }

    #[tokio::test]
    async fn match_returns_without_waiting_for_exit() {
        let client = ShellClient::new(Duration::from_secs(5));
        let started = std::time::Instant::now();
        let line = client
            .first_line_containing("sh", &["-c", "echo 'eth0 HWaddr AA'; exec sleep 30"], "HWaddr")
            .await
            .unwrap();
        assert_eq!(line.as_deref(), Some("eth0 HWaddr AA"));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
