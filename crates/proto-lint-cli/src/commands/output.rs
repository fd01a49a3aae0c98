//! Shared output formatting for lint results.

use anyhow::{Context, Result};
use miette::GraphicalReportHandler;
use proto_lint_core::{LintResult, Violation, ViolationDiagnostic};
use std::path::Path;

use crate::OutputFormat;

/// Print lint results in the specified format.
///
/// `root` is the directory violation paths are relative to; the pretty
/// format reads sources from there.
pub fn print(result: &LintResult, format: OutputFormat, root: &Path) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(result),
        OutputFormat::Json => return print_json(result),
        OutputFormat::Compact => print_compact(result),
        OutputFormat::Pretty => return print_pretty(result, root),
    }
    Ok(())
}

fn print_text(result: &LintResult) {
    for violation in &result.violations {
        println!("{}", violation.format());
    }
    print_summary(result);
}

fn print_summary(result: &LintResult) {
    let (errors, warnings, infos) = result.count_by_severity();

    let summary_color = if errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}Found {} error(s), {} warning(s), {} info(s) in {} file(s)\x1b[0m",
        summary_color, errors, warnings, infos, result.files_checked
    );
}

fn print_json(result: &LintResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{json}");
    Ok(())
}

fn print_compact(result: &LintResult) {
    for violation in &result.violations {
        println!("{violation}");
    }
}

fn print_pretty(result: &LintResult, root: &Path) -> Result<()> {
    let handler = GraphicalReportHandler::new();

    for violation in &result.violations {
        let diagnostic = diagnostic_for(violation, root)?;
        let mut rendered = String::new();
        handler
            .render_report(&mut rendered, &diagnostic)
            .context("Failed to render diagnostic")?;
        println!("{rendered}");
    }
    print_summary(result);
    Ok(())
}

fn diagnostic_for(violation: &Violation, root: &Path) -> Result<ViolationDiagnostic> {
    let path = root.join(&violation.location.file);
    let source = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(ViolationDiagnostic::new(violation, source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::GraphicalTheme;
    use proto_lint_core::{Location, Severity};
    use tempfile::TempDir;

    #[test]
    fn diagnostic_reads_source_relative_to_root() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("a.proto"), "message Foo {}\n").unwrap();

        let violation = Violation::new(
            "PL001",
            "messages-have-comments-except-request-response-types",
            Severity::Error,
            Location::new("a.proto".into(), 1, 1).with_span(0, 7),
            "Message \"Foo\" needs a comment of the form \"// Foo ...\"",
        );

        let diagnostic = diagnostic_for(&violation, tmp.path()).unwrap();
        let mut rendered = String::new();
        GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor())
            .render_report(&mut rendered, &diagnostic)
            .unwrap();
        assert!(rendered.contains("message Foo {}"));
        assert!(rendered.contains("a.proto"));
    }

    #[test]
    fn diagnostic_for_missing_file_fails() {
        let violation = Violation::new(
            "PL001",
            "rule",
            Severity::Error,
            Location::new("gone.proto".into(), 1, 1),
            "msg",
        );
        assert!(diagnostic_for(&violation, Path::new("/nonexistent")).is_err());
    }
}
