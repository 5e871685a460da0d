use super::spec::CapturedOutput;
use crate::core::config::Config;
use crate::core::{ExecError, Result};
use std::fmt;
use std::future::Future;
use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{debug, warn};

/// How long a killed shell gets to be reaped before it is left to the runtime.
pub const KILL_GRACE: Duration = Duration::from_secs(2);
/// Per-stream capture limit; going over it truncates the capture.
pub const MAX_CAPTURE_BYTES: usize = 4 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Created,
    Opened,
    CommandSubmitted,
    Draining,
    Completed,
    TimedOut,
    SpawnFailed,
    Closed,
}
impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Created => "created",
            Self::Opened => "opened",
            Self::CommandSubmitted => "command-submitted",
            Self::Draining => "draining",
            Self::Completed => "completed",
            Self::TimedOut => "timed-out",
            Self::SpawnFailed => "spawn-failed",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// A one-shot privileged shell: one command, one drain, one close.
pub trait Session: Send {
    fn submit(&mut self, command: &str) -> impl Future<Output = Result<()>> + Send;
    fn drain(&mut self, max_wait: Option<Duration>) -> impl Future<Output = CapturedOutput> + Send;
    fn close(&mut self) -> impl Future<Output = ()> + Send;
}

/// Produces fresh sessions for the runner.
pub trait Launcher: Send + Sync {
    type Session: Session;
    fn open(&self) -> impl Future<Output = Result<Self::Session>> + Send;
}

#[derive(Debug, Clone)]
pub struct SuLauncher {
    program: String,
    args: Vec<String>,
}
impl SuLauncher {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.elevation_program.clone(), config.elevation_args.clone())
    }
    pub fn program(&self) -> &str {
        &self.program
    }
}
impl Default for SuLauncher {
    fn default() -> Self {
        Self::new("su", Vec::new())
    }
}
impl Launcher for SuLauncher {
    type Session = ElevatedSession;
    async fn open(&self) -> Result<ElevatedSession> {
        let mut session = ElevatedSession::new(&self.program, &self.args);
        session.spawn()?;
        Ok(session)
    }
}

#[derive(Debug)]
pub struct ElevatedSession {
    program: String,
    args: Vec<String>,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
    pid: Option<u32>,
    status: Option<ExitStatus>,
    state: SessionState,
    kill_grace: Duration,
    capture_limit: usize,
}
impl ElevatedSession {
    pub fn new(program: &str, args: &[String]) -> Self {
        Self {
            program: program.to_string(),
            args: args.to_vec(),
            child: None,
            stdin: None,
            stdout: None,
            stderr: None,
            pid: None,
            status: None,
            state: SessionState::Created,
            kill_grace: KILL_GRACE,
            capture_limit: MAX_CAPTURE_BYTES,
        }
    }
    pub fn with_kill_grace(mut self, grace: Duration) -> Self {
        self.kill_grace = grace;
        self
    }
    pub fn with_capture_limit(mut self, bytes: usize) -> Self {
        self.capture_limit = bytes;
        self
    }

    pub fn spawn(&mut self) -> Result<()> {
        self.expect_state(SessionState::Created, "created")?;
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Own group, so a kill also reaches whatever the shell started.
        #[cfg(unix)]
        command.process_group(0);
        let spawned = command.spawn();
        let mut child = match spawned {
            Ok(c) => c,
            Err(source) => {
                self.state = SessionState::SpawnFailed;
                return Err(ExecError::SpawnFailed {
                    program: self.program.clone(),
                    source,
                });
            }
        };
        self.pid = child.id();
        self.stdin = child.stdin.take();
        self.stdout = child.stdout.take();
        self.stderr = child.stderr.take();
        self.child = Some(child);
        self.state = SessionState::Opened;
        debug!(program = %self.program, pid = ?self.pid, "elevation shell spawned");
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        self.state
    }
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }
    /// Set once the process has been reaped.
    pub fn exit_status(&self) -> Option<ExitStatus> {
        self.status
    }
    pub fn is_closed(&self) -> bool {
        self.state == SessionState::Closed
    }

    fn expect_state(&self, expected: SessionState, name: &'static str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ExecError::InvalidState {
                actual: self.state.to_string(),
                expected: name,
            })
        }
    }

    async fn reap(&mut self, deadline: Option<(Instant, Duration)>) -> Result<()> {
        let Some(child) = self.child.as_mut() else {
            return Ok(());
        };
        let status = match deadline {
            Some((at, budget)) => timeout_at(at, child.wait())
                .await
                .map_err(|_| ExecError::Timeout(budget.as_millis()))??,
            None => child.wait().await?,
        };
        self.status = Some(status);
        Ok(())
    }

    /// Kills the shell's process group and reaps it within `kill_grace`. A shell
    /// that outlives the grace period (a setuid `su` refuses our signal) keeps
    /// `status` unset and is left to `kill_on_drop`.
    async fn terminate(&mut self) {
        if self.status.is_some() {
            return;
        }
        let Some(child) = self.child.as_mut() else {
            return;
        };
        if let Err(e) = kill_process_group(child, self.pid) {
            warn!(pid = ?self.pid, error = %e, "could not kill elevation shell");
        }
        self.status = reap_within(child.wait(), self.kill_grace).await;
        if self.status.is_none() {
            warn!(pid = ?self.pid, grace = ?self.kill_grace, "elevation shell still running after kill");
        }
    }
}
impl Session for ElevatedSession {
    async fn submit(&mut self, command: &str) -> Result<()> {
        self.expect_state(SessionState::Opened, "opened")?;
        let mut stdin = self.stdin.take().ok_or(ExecError::InvalidState {
            actual: "opened without stdin".to_string(),
            expected: "opened",
        })?;
        self.state = SessionState::CommandSubmitted;
        debug!(pid = ?self.pid, command, "submitting command");
        stdin.write_all(command.as_bytes()).await?;
        stdin.write_all(b"\n").await?;
        stdin.write_all(b"exit\n").await?;
        stdin.flush().await?;
        drop(stdin);
        Ok(())
    }

    async fn drain(&mut self, max_wait: Option<Duration>) -> CapturedOutput {
        if let Err(e) = self.expect_state(SessionState::CommandSubmitted, "command-submitted") {
            warn!(error = %e, "drain refused");
            return CapturedOutput {
                truncated: true,
                ..CapturedOutput::default()
            };
        }
        self.state = SessionState::Draining;
        let deadline = max_wait.map(|d| Instant::now() + d);
        let (mut output, end) = drain_streams(
            self.stdout.take(),
            self.stderr.take(),
            deadline,
            self.capture_limit,
        )
        .await;
        let mut completed = match end {
            DrainEnd::Closed => true,
            DrainEnd::Failed(e) => {
                warn!(pid = ?self.pid, error = %e, "stream read failed, aborting drain");
                false
            }
            DrainEnd::Deadline => {
                warn!(pid = ?self.pid, ?max_wait, "drain deadline elapsed");
                false
            }
        };
        if completed {
            if let Err(e) = self.reap(deadline.zip(max_wait)).await {
                warn!(pid = ?self.pid, error = %e, "streams closed but process did not exit in time");
                completed = false;
            }
        }
        if completed {
            self.state = SessionState::Completed;
        } else {
            self.terminate().await;
            self.state = SessionState::TimedOut;
        }
        output.truncated = !completed;
        debug!(
            pid = ?self.pid,
            stdout = output.stdout.len(),
            stderr = output.stderr.len(),
            status = ?self.status,
            "drain finished"
        );
        output
    }

    async fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.stdin = None;
        self.stdout = None;
        self.stderr = None;
        self.terminate().await;
        self.child = None;
        self.state = SessionState::Closed;
        debug!(pid = ?self.pid, status = ?self.status, "session closed");
    }
}

#[derive(Debug)]
pub(crate) enum DrainEnd {
    Closed,
    Deadline,
    Failed(io::Error),
}

/// Reads both streams concurrently until they close, the deadline passes, or a
/// read fails. Lines read before the stop are kept; only `Closed` leaves the
/// capture untruncated.
pub(crate) async fn drain_streams<O, E>(
    stdout: Option<O>,
    stderr: Option<E>,
    deadline: Option<Instant>,
    limit: usize,
) -> (CapturedOutput, DrainEnd)
where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
{
    let mut out_lines = Vec::new();
    let mut err_lines = Vec::new();
    let read = async {
        tokio::try_join!(
            read_lines(stdout, &mut out_lines, limit),
            read_lines(stderr, &mut err_lines, limit),
        )
    };
    let end = match deadline {
        Some(at) => match timeout_at(at, read).await {
            Ok(Ok(_)) => DrainEnd::Closed,
            Ok(Err(e)) => DrainEnd::Failed(e),
            Err(_) => DrainEnd::Deadline,
        },
        None => match read.await {
            Ok(_) => DrainEnd::Closed,
            Err(e) => DrainEnd::Failed(e),
        },
    };
    let output = CapturedOutput {
        stdout: out_lines,
        stderr: err_lines,
        truncated: !matches!(end, DrainEnd::Closed),
    };
    (output, end)
}

/// Collects lines into `sink`, failing once more than `limit` bytes were read.
pub(crate) async fn read_lines<R: AsyncRead + Unpin>(
    stream: Option<R>,
    sink: &mut Vec<String>,
    limit: usize,
) -> io::Result<()> {
    let Some(stream) = stream else {
        return Ok(());
    };
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    let mut total = 0usize;
    loop {
        let remaining = (limit.saturating_sub(total) as u64).saturating_add(1);
        let mut bounded = (&mut reader).take(remaining);
        let Some(line) = read_line_into(&mut bounded, &mut buf).await? else {
            return Ok(());
        };
        total += buf.len();
        if total > limit {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("capture limit of {} bytes reached", limit),
            ));
        }
        sink.push(line);
    }
}

/// Waits for `wait` at most `grace`; `None` if the process could not be reaped.
pub(crate) async fn reap_within<F>(wait: F, grace: Duration) -> Option<ExitStatus>
where
    F: Future<Output = io::Result<ExitStatus>>,
{
    match timeout(grace, wait).await {
        Ok(Ok(status)) => Some(status),
        Ok(Err(e)) => {
            warn!(error = %e, "failed to reap process");
            None
        }
        Err(_) => None,
    }
}

#[cfg(unix)]
fn kill_process_group(child: &mut Child, pid: Option<u32>) -> io::Result<()> {
    if let Some(pid) = pid {
        // The shell leads its own group, so its pid is the group id.
        let rc = unsafe { libc::killpg(pid as libc::pid_t, libc::SIGKILL) };
        if rc == 0 {
            return Ok(());
        }
        debug!(pid, error = %io::Error::last_os_error(), "killpg failed, signalling the shell alone");
    }
    child.start_kill()
}

#[cfg(not(unix))]
fn kill_process_group(child: &mut Child, _pid: Option<u32>) -> io::Result<()> {
    child.start_kill()
}

/// Next `\n`-terminated line, or `None` at end of stream. `buf` is scratch space.
pub(crate) async fn read_line_into<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    buf: &mut Vec<u8>,
) -> io::Result<Option<String>> {
    buf.clear();
    if reader.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }
    Ok(Some(decode_line(buf)))
}

pub(crate) fn decode_line(buf: &[u8]) -> String {
    let line = buf.strip_suffix(b"\n").unwrap_or(buf);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}
