//! Registry of built-in rules.

use crate::MessagesHaveCommentsExceptRequestResponseTypes;
use proto_lint_core::RuleBox;

/// Returns all available rules with default settings.
#[must_use]
pub fn all_rules() -> Vec<RuleBox> {
    vec![Box::new(MessagesHaveCommentsExceptRequestResponseTypes::new())]
}

/// Looks up a rule by its name or code.
#[must_use]
pub fn rule_by_name(name: &str) -> Option<RuleBox> {
    all_rules()
        .into_iter()
        .find(|rule| rule.name() == name || rule.code().eq_ignore_ascii_case(name))
}
