use crate::exec::{ExecutionResult, ExitStatus};

/// First line of the report when a script produces neither stdout nor
/// stderr, so absence of output is never ambiguous.
const NO_OUTPUT_MARKER: &str = "(no output produced)";

/// Render the captured execution data into the report text returned to the
/// caller.
///
/// Pure function of its inputs: stdout and stderr sections appear only when
/// non-empty, the execution-info section is always present.
pub fn render(result: &ExecutionResult, timeout_secs: u64) -> String {
    let mut report = String::new();

    if result.stdout.is_empty() && result.stderr.is_empty() {
        report.push_str(NO_OUTPUT_MARKER);
        report.push('\n');
    }

    if !result.stdout.is_empty() {
        push_section(&mut report, "stdout", &result.stdout);
    }

    if !result.stderr.is_empty() {
        push_section(&mut report, "stderr", &result.stderr);
    }

    report.push_str("--- execution ---\n");
    match result.status {
        ExitStatus::Exited(code) => report.push_str(&format!("exit code: {}\n", code)),
        ExitStatus::TimedOut => report.push_str("exit code: timed out\n"),
    }
    report.push_str(&format!("elapsed: {:.2}s\n", result.elapsed.as_secs_f64()));
    report.push_str(&format!("timeout limit: {}s\n", timeout_secs));

    report
}

fn push_section(report: &mut String, title: &str, body: &str) {
    report.push_str(&format!("--- {} ---\n", title));
    report.push_str(body);
    if !body.ends_with('\n') {
        report.push('\n');
    }
}
