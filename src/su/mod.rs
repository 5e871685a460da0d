pub mod classifier;
pub mod runner;
pub mod session;
pub mod spec;

pub use classifier::classify;
pub use runner::CommandRunner;
pub use session::{ElevatedSession, Launcher, Session, SessionState, SuLauncher};
pub use spec::{check_rules, CapturedOutput, CommandSpec, Matcher, ResultCode, Rule};
