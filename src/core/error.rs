use thiserror::Error;
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("failed to spawn elevation shell `{program}`: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("session is {actual}, expected {expected}")]
    InvalidState {
        actual: String,
        expected: &'static str,
    },
    #[error("command text is empty")]
    EmptyCommand,
    #[error("rule table has no Success rule")]
    NoSuccessRule,
    #[error("command timed out after {0}ms")]
    Timeout(u128),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
pub type Result<T> = std::result::Result<T, ExecError>;
