use crate::core::config::Config;
use std::path::PathBuf;

/// Looks for a `su` binary in a fixed list of directories.
pub struct RootChecker {
    search_paths: Vec<PathBuf>,
}
impl RootChecker {
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self { search_paths }
    }
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.su_search_paths.clone())
    }
    pub fn su_path(&self) -> Option<PathBuf> {
        self.search_paths
            .iter()
            .map(|dir| dir.join("su"))
            .find(|candidate| candidate.exists())
    }
    pub fn is_root_system(&self) -> bool {
        self.su_path().is_some()
    }
    pub fn check(&self) -> String {
        let mut out = String::new();
        out.push_str("\n[Root check]\n");
        match self.su_path() {
            Some(path) => {
                out.push_str("Verdict: su binary present\n\n");
                out.push_str(&format!("  found: {}\n", path.display()));
            }
            None => out.push_str("Verdict: no su binary found\n\n"),
        }
        for dir in &self.search_paths {
            out.push_str(&format!("  searched: {}\n", dir.display()));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn finds_su_in_any_listed_directory() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::write(second.path().join("su"), b"").unwrap();
        let checker = RootChecker::new(vec![first.path().to_path_buf(), second.path().to_path_buf()]);
        assert!(checker.is_root_system());
        assert_eq!(checker.su_path(), Some(second.path().join("su")));
        assert!(checker.check().contains("su binary present"));
    }

    #[test]
    fn ignores_directories_not_listed() {
        let listed = tempfile::tempdir().unwrap();
        let unlisted = tempfile::tempdir().unwrap();
        fs::write(unlisted.path().join("su"), b"").unwrap();
        fs::write(listed.path().join("sudo"), b"").unwrap();
        let checker = RootChecker::new(vec![listed.path().to_path_buf()]);
        assert!(!checker.is_root_system());
        assert!(checker.check().contains("no su binary found"));
    }

    #[test]
    fn empty_search_list_is_not_rooted() {
        assert!(!RootChecker::new(Vec::new()).is_root_system());
    }
}
