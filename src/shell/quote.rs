/// Quotes `arg` for `sh` only when it holds anything outside a safe set.
pub fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-+=:,@%".contains(c));
    if safe {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_paths_are_unchanged() {
        assert_eq!(shell_quote("/sdcard/app.apk"), "/sdcard/app.apk");
        assert_eq!(shell_quote("/data/local/tmp/app-1.0_release.apk"), "/data/local/tmp/app-1.0_release.apk");
    }

    #[test]
    fn metacharacters_are_quoted() {
        assert_eq!(shell_quote("/sdcard/my app.apk"), "'/sdcard/my app.apk'");
        assert_eq!(shell_quote("a;reboot"), "'a;reboot'");
        assert_eq!(shell_quote("it's.apk"), r"'it'\''s.apk'");
        assert_eq!(shell_quote(""), "''");
    }
}
