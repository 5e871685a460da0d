#![allow(dead_code)]

use rootexec::core::{ExecError, Result};
use rootexec::su::{CapturedOutput, Launcher, Session, SuLauncher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Fake `su` that reads the command and exit lines, then runs `script`.
pub fn fake_su(script: &str) -> SuLauncher {
    SuLauncher::new("sh", vec!["-c".to_string(), format!("read cmd; read ex; {}", script)])
}

#[derive(Debug, Clone, Default)]
pub struct Script {
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
    pub fail_submit: bool,
    pub truncate: bool,
}
impl Script {
    pub fn stdout(lines: &[&str]) -> Self {
        Self {
            stdout: lines.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Default)]
pub struct Recorder {
    pub opens: AtomicUsize,
    pub closes: AtomicUsize,
    pub commands: Mutex<Vec<String>>,
    pub waits: Mutex<Vec<Option<Duration>>>,
}
impl Recorder {
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

/// Launcher whose sessions replay a fixed script and record what happened.
pub struct ScriptedLauncher {
    pub script: Script,
    pub spawn_fails: bool,
    pub recorder: Arc<Recorder>,
}
impl ScriptedLauncher {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            spawn_fails: false,
            recorder: Arc::new(Recorder::default()),
        }
    }
}
impl Launcher for ScriptedLauncher {
    type Session = ScriptedSession;
    async fn open(&self) -> Result<ScriptedSession> {
        self.recorder.opens.fetch_add(1, Ordering::SeqCst);
        if self.spawn_fails {
            return Err(ExecError::SpawnFailed {
                program: "su".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no su"),
            });
        }
        Ok(ScriptedSession {
            script: self.script.clone(),
            recorder: self.recorder.clone(),
        })
    }
}

pub struct ScriptedSession {
    script: Script,
    recorder: Arc<Recorder>,
}
impl Session for ScriptedSession {
    async fn submit(&mut self, command: &str) -> Result<()> {
        self.recorder.commands.lock().unwrap().push(command.to_string());
        if self.script.fail_submit {
            return Err(ExecError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "shell went away",
            )));
        }
        Ok(())
    }
    async fn drain(&mut self, max_wait: Option<Duration>) -> CapturedOutput {
        self.recorder.waits.lock().unwrap().push(max_wait);
        CapturedOutput {
            stdout: self.script.stdout.clone(),
            stderr: self.script.stderr.clone(),
            truncated: self.script.truncate,
        }
    }
    async fn close(&mut self) {
        self.recorder.closes.fetch_add(1, Ordering::SeqCst);
    }
}
