//! List rules command implementation.

use proto_lint_core::RuleBox;
use proto_lint_rules::all_rules;
use std::fmt::Write;

/// Runs the list-rules command.
pub fn run() {
    print!("{}", render(&all_rules()));
}

fn render(rules: &[RuleBox]) -> String {
    let mut out = String::from("Available rules:\n\n");
    let name_width = rules.iter().map(|r| r.name().len()).max().unwrap_or(4);

    let _ = writeln!(out, "{:<8} {:<name_width$} Description", "Code", "Name");
    let _ = writeln!(out, "{}", "-".repeat(80));

    for rule in rules {
        let _ = writeln!(
            out,
            "{:<8} {:<name_width$} {}",
            rule.code(),
            rule.name(),
            rule.description()
        );
    }

    out.push_str("\nUse --rules to filter specific rules, e.g.:\n");
    out.push_str("  proto-lint check --rules PL001\n");
    out
}
