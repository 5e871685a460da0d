use colored::*;
use rootexec::su::ResultCode;
use std::io::{self, Write};

pub struct ConsoleUi;

impl ConsoleUi {
    pub fn write_banner() {
        let started = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        println!("{}  {}\n", "rootexec".bright_cyan().bold(), started.to_string().bright_black());
    }

    /// Trimmed line from stdin; `None` once stdin is closed.
    pub fn read_line() -> Option<String> {
        let mut buf = String::new();
        print!("> ");
        let _ = io::stdout().flush();
        match io::stdin().read_line(&mut buf) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(buf.trim().to_string()),
        }
    }

    pub fn prompt(label: &str) -> String {
        println!("{}", label);
        Self::read_line().unwrap_or_default()
    }

    pub fn info(msg: &str) {
        println!("{} {}", "[INFO]".bright_blue(), msg);
    }

    pub fn warn(msg: &str) {
        println!("{} {}", "[WARN]".bright_yellow(), msg);
    }

    pub fn error(msg: &str) {
        eprintln!("{} {}", "[ERROR]".bright_red().bold(), msg);
    }

    pub fn success(msg: &str) {
        println!("{}", msg.bright_green());
    }

    pub fn render_result(action: &str, code: ResultCode) {
        let msg = format!("{}: {} (status {})", action, code, code.status_code());
        match code {
            ResultCode::Success => Self::success(&msg),
            ResultCode::UnknownOutcome | ResultCode::Timeout => Self::warn(&msg),
            _ => Self::error(&msg),
        }
    }
}
