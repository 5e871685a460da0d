use crate::core::{ExecError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Outcome of one privileged command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultCode {
    Success,
    PermissionDenied,
    SignatureMismatch,
    IncompleteArchive,
    TargetNotFound,
    Failure,
    UnknownOutcome,
    Timeout,
    ProcessSpawnFailed,
}
impl ResultCode {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
    /// Numeric status used by older callers: 1 success, 2 denied or failed,
    /// 3 signature, 4 incomplete archive, 5 missing target, 6 anything else.
    pub fn status_code(&self) -> i32 {
        match self {
            Self::Success => 1,
            Self::PermissionDenied | Self::Failure | Self::ProcessSpawnFailed => 2,
            Self::SignatureMismatch => 3,
            Self::IncompleteArchive => 4,
            Self::TargetNotFound => 5,
            Self::UnknownOutcome | Self::Timeout => 6,
        }
    }
}
impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "success",
            Self::PermissionDenied => "permission denied",
            Self::SignatureMismatch => "signature mismatch",
            Self::IncompleteArchive => "incomplete archive",
            Self::TargetNotFound => "target not found",
            Self::Failure => "failure",
            Self::UnknownOutcome => "unknown outcome",
            Self::Timeout => "timed out",
            Self::ProcessSpawnFailed => "could not start elevation shell",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Matcher {
    /// Whole line, ignoring trailing whitespace.
    Exact(String),
    Contains(String),
    /// Both streams produced no lines at all.
    NoOutput,
}
impl Matcher {
    pub fn matches_line(&self, line: &str) -> bool {
        match self {
            Self::Exact(text) => line.trim_end() == text,
            Self::Contains(text) => line.contains(text.as_str()),
            Self::NoOutput => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(rename = "match")]
    pub matcher: Matcher,
    pub outcome: ResultCode,
}
impl Rule {
    pub fn exact(text: &str, outcome: ResultCode) -> Self {
        Self { matcher: Matcher::Exact(text.to_string()), outcome }
    }
    pub fn contains(text: &str, outcome: ResultCode) -> Self {
        Self { matcher: Matcher::Contains(text.to_string()), outcome }
    }
    pub fn no_output(outcome: ResultCode) -> Self {
        Self { matcher: Matcher::NoOutput, outcome }
    }
}

/// A table is usable only if something in it can report success.
pub fn check_rules(rules: &[Rule]) -> Result<()> {
    if rules.iter().any(|r| r.outcome.is_success()) {
        Ok(())
    } else {
        Err(ExecError::NoSuccessRule)
    }
}

/// One command for the elevated shell plus the table that classifies its output.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    command: String,
    rules: Vec<Rule>,
    fallback: ResultCode,
    max_wait: Option<Duration>,
}
impl CommandSpec {
    pub fn new(command: impl Into<String>, rules: Vec<Rule>) -> Result<Self> {
        let command = command.into();
        if command.trim().is_empty() {
            return Err(ExecError::EmptyCommand);
        }
        check_rules(&rules)?;
        Ok(Self {
            command,
            rules,
            fallback: ResultCode::UnknownOutcome,
            max_wait: None,
        })
    }
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }
    pub fn with_fallback(mut self, fallback: ResultCode) -> Self {
        self.fallback = fallback;
        self
    }
    pub fn command(&self) -> &str {
        &self.command
    }
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
    pub fn fallback(&self) -> ResultCode {
        self.fallback
    }
    pub fn max_wait(&self) -> Option<Duration> {
        self.max_wait
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
    /// Reading stopped before both streams closed.
    pub truncated: bool,
}
impl CapturedOutput {
    pub fn is_empty(&self) -> bool {
        self.stdout.is_empty() && self.stderr.is_empty()
    }
}
