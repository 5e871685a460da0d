use super::rules::{install_rules, uninstall_rules};
use crate::core::config::Config;
use crate::core::Result;
use crate::shell::shell_quote;
use crate::su::{check_rules, CommandRunner, CommandSpec, Launcher, ResultCode, Rule, SuLauncher};
use std::path::Path;
use tracing::{info, warn};

pub struct PackageManager<L = SuLauncher> {
    runner: CommandRunner<L>,
    install_rules: Vec<Rule>,
    uninstall_rules: Vec<Rule>,
}
impl PackageManager<SuLauncher> {
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut pm = Self::new(CommandRunner::from_config(config));
        if let Some(rules) = &config.install_rules {
            pm = pm.with_install_rules(rules.clone())?;
        }
        if let Some(rules) = &config.uninstall_rules {
            pm = pm.with_uninstall_rules(rules.clone())?;
        }
        Ok(pm)
    }
}
impl<L: Launcher> PackageManager<L> {
    pub fn new(runner: CommandRunner<L>) -> Self {
        Self {
            runner,
            install_rules: install_rules(),
            uninstall_rules: uninstall_rules(),
        }
    }
    pub fn with_install_rules(mut self, rules: Vec<Rule>) -> Result<Self> {
        check_rules(&rules)?;
        self.install_rules = rules;
        Ok(self)
    }
    pub fn with_uninstall_rules(mut self, rules: Vec<Rule>) -> Result<Self> {
        check_rules(&rules)?;
        self.uninstall_rules = rules;
        Ok(self)
    }
    pub fn runner(&self) -> &CommandRunner<L> {
        &self.runner
    }

    /// Installs (or replaces) the archive at `apk` through the elevated shell.
    pub async fn install_apk(&self, apk: &Path) -> ResultCode {
        if !apk.exists() {
            warn!(path = %apk.display(), "archive does not exist");
            return ResultCode::TargetNotFound;
        }
        info!(path = %apk.display(), "installing package archive");
        let command = format!("pm install -r {}", shell_quote(&apk.to_string_lossy()));
        self.run(command, &self.install_rules).await
    }

    pub async fn uninstall(&self, package: &str) -> ResultCode {
        let package = package.trim();
        if !is_package_name(package) {
            warn!(package, "not a valid package name");
            return ResultCode::TargetNotFound;
        }
        info!(package, "uninstalling package");
        self.run(format!("pm uninstall {}", package), &self.uninstall_rules).await
    }

    async fn run(&self, command: String, rules: &[Rule]) -> ResultCode {
        match CommandSpec::new(command, rules.to_vec()) {
            Ok(spec) => self.runner.run(&spec).await,
            Err(e) => {
                warn!(error = %e, "refusing to run command");
                ResultCode::UnknownOutcome
            }
        }
    }
}

fn is_package_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.ends_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_names() {
        for ok in ["com.example", "org.fossify.gallery", "a_b.C9"] {
            assert!(is_package_name(ok), "{ok}");
        }
        for bad in ["", ".com", "com.", "com.example; reboot", "com/example", "com example"] {
            assert!(!is_package_name(bad), "{bad}");
        }
    }

    #[test]
    fn overrides_need_a_success_rule() {
        let pm = PackageManager::new(CommandRunner::new(SuLauncher::default()));
        let rules = vec![Rule::contains("Failure", ResultCode::Failure)];
        assert!(pm.with_uninstall_rules(rules).is_err());
    }
}
