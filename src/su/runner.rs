use super::classifier::classify;
use super::session::{Launcher, Session, SuLauncher};
use super::spec::{CommandSpec, ResultCode};
use crate::core::config::Config;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Drives one fresh session per command and classifies what it printed.
#[derive(Debug, Clone, Default)]
pub struct CommandRunner<L = SuLauncher> {
    launcher: L,
    default_max_wait: Option<Duration>,
}
impl CommandRunner<SuLauncher> {
    pub fn from_config(config: &Config) -> Self {
        Self::new(SuLauncher::from_config(config)).with_default_max_wait(config.max_wait())
    }
}
impl<L: Launcher> CommandRunner<L> {
    pub fn new(launcher: L) -> Self {
        Self {
            launcher,
            default_max_wait: None,
        }
    }
    /// Bound applied to specs that carry no `max_wait` of their own.
    pub fn with_default_max_wait(mut self, max_wait: Duration) -> Self {
        self.default_max_wait = Some(max_wait);
        self
    }
    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    pub async fn run(&self, spec: &CommandSpec) -> ResultCode {
        let mut session = match self.launcher.open().await {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "could not open elevated session");
                return ResultCode::ProcessSpawnFailed;
            }
        };
        let max_wait = spec.max_wait().or(self.default_max_wait);
        if let Err(e) = session.submit(spec.command()).await {
            // The shell may have exited before reading; its output still decides.
            warn!(error = %e, command = spec.command(), "submit failed");
        }
        let output = session.drain(max_wait).await;
        let code = classify(&output, spec);
        session.close().await;
        if output.truncated {
            warn!(command = spec.command(), ?max_wait, "command output truncated");
        }
        debug!(stdout = ?output.stdout, stderr = ?output.stderr, "captured output");
        info!(command = spec.command(), result = %code, "privileged command finished");
        code
    }
}
