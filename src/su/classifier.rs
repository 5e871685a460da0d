use super::spec::{CapturedOutput, CommandSpec, Matcher, ResultCode};

/// Maps captured shell output to a result code using the spec's rule table.
///
/// Truncated output is never classified by content. Stdout is scanned in full
/// before stderr; within a line, rules are tried in declared order.
pub fn classify(output: &CapturedOutput, spec: &CommandSpec) -> ResultCode {
    if output.truncated {
        return ResultCode::Timeout;
    }
    let rules = spec.rules();
    if output.is_empty() {
        if let Some(rule) = rules.iter().find(|r| r.matcher == Matcher::NoOutput) {
            return rule.outcome;
        }
    }
    output
        .stdout
        .iter()
        .chain(output.stderr.iter())
        .find_map(|line| {
            rules
                .iter()
                .find(|r| r.matcher.matches_line(line))
                .map(|r| r.outcome)
        })
        .unwrap_or_else(|| spec.fallback())
}
