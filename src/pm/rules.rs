use crate::su::{ResultCode, Rule};

pub const SUCCESS: &str = "Success";
pub const FAILURE: &str = "Failure";
pub const INVALID_APK: &str = "Failure [INSTALL_FAILED_INVALID_APK]";
pub const INCONSISTENT_CERTIFICATES: &str = "Failure [INSTALL_PARSE_FAILED_INCONSISTENT_CERTIFICATES]";

/// `pm install -r`. Silence on both streams means su refused without a word.
pub fn install_rules() -> Vec<Rule> {
    vec![
        Rule::exact(SUCCESS, ResultCode::Success),
        Rule::exact(INVALID_APK, ResultCode::IncompleteArchive),
        Rule::exact(INCONSISTENT_CERTIFICATES, ResultCode::SignatureMismatch),
        Rule::no_output(ResultCode::PermissionDenied),
    ]
}

/// `pm uninstall`.
pub fn uninstall_rules() -> Vec<Rule> {
    vec![
        Rule::exact(SUCCESS, ResultCode::Success),
        Rule::contains(FAILURE, ResultCode::Failure),
    ]
}
