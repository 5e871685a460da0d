use crate::core::Result;
use crate::su::Rule;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const CONFIG_ENV: &str = "ROOTEXEC_CONFIG";
pub const CONFIG_FILE: &str = "rootexec.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub elevation_program: String,
    pub elevation_args: Vec<String>,
    pub su_search_paths: Vec<PathBuf>,
    pub max_wait_secs: u64,
    pub command_timeout_secs: u64,
    /// Replaces the built-in install rule table when set.
    pub install_rules: Option<Vec<Rule>>,
    /// Replaces the built-in uninstall rule table when set.
    pub uninstall_rules: Option<Vec<Rule>>,
}
impl Default for Config {
    fn default() -> Self {
        let su_search_paths = ["/system/bin/", "/system/xbin/", "/system/sbin/", "/sbin/", "/vendor/bin/"]
            .into_iter()
            .map(PathBuf::from)
            .collect();
        Self {
            elevation_program: "su".to_string(),
            elevation_args: Vec::new(),
            su_search_paths,
            max_wait_secs: 120,
            command_timeout_secs: 10,
            install_rules: None,
            uninstall_rules: None,
        }
    }
}
impl Config {
    /// `$ROOTEXEC_CONFIG` if set, then `./rootexec.json`, then defaults.
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::from_path(Path::new(&path));
        }
        let local = Path::new(CONFIG_FILE);
        if local.exists() {
            return Self::from_path(local);
        }
        debug!("no config file found, using defaults");
        Ok(Self::default())
    }
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
    pub fn max_wait(&self) -> Duration {
        Duration::from_secs(self.max_wait_secs)
    }
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}
