//! Comment-based allowance directives.
//!
//! Supports directives like:
//! ```text
//! // proto-lint: allow(messages-have-comments-except-request-response-types) reason="generated"
//! ```

use std::collections::HashSet;

/// Result of checking for allow directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowCheck {
    /// Rule is not allowed.
    Denied,
    /// Rule is allowed with optional reason.
    Allowed {
        /// The reason provided (if any).
        reason: Option<String>,
    },
}

impl AllowCheck {
    /// Returns true if allowed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// Returns the reason if allowed.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Allowed { reason } => reason.as_deref(),
            Self::Denied => None,
        }
    }
}

/// Parsed allowance directive.
#[derive(Debug, Clone)]
struct AllowDirective {
    rules: HashSet<String>,
    reason: Option<String>,
}

/// Checks source code for an allowance comment covering `line`.
///
/// The directive may sit on the line itself (as a trailing comment) or on
/// a comment-only line directly above it:
/// ```text
/// // proto-lint: allow(rule1, rule2) reason="explanation"
/// ```
///
/// `allow(all)` matches every rule.
#[must_use]
pub fn check_allow_with_reason(content: &str, line: usize, rule_name: &str) -> AllowCheck {
    let lines: Vec<&str> = content.lines().collect();

    for check_line in [line.saturating_sub(1), line] {
        if check_line == 0 || check_line > lines.len() {
            continue;
        }
        let text = lines[check_line - 1];
        // A trailing directive belongs to the declaration on its own line.
        if check_line != line && !text.trim_start().starts_with("//") {
            continue;
        }

        if let Some(directive) = parse_allow_directive(text) {
            if directive.rules.contains(rule_name) || directive.rules.contains("all") {
                return AllowCheck::Allowed {
                    reason: directive.reason,
                };
            }
        }
    }

    AllowCheck::Denied
}

/// Parses an allowance directive from a source line.
fn parse_allow_directive(line: &str) -> Option<AllowDirective> {
    let start = comment_start(line)?;
    let comment_content = line[start + 2..].trim();

    let directive = comment_content.strip_prefix("proto-lint:")?.trim();
    let allow_content = directive.strip_prefix("allow(")?.trim();

    let paren_end = allow_content.find(')')?;
    let rules: HashSet<String> = allow_content[..paren_end]
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if rules.is_empty() {
        return None;
    }

    let rest = allow_content[paren_end + 1..].trim();
    let reason = rest.strip_prefix("reason=").and_then(|reason_part| {
        let quoted = reason_part.trim().strip_prefix('"')?;
        let end = quoted.find('"')?;
        Some(quoted[..end].to_string())
    });

    Some(AllowDirective { rules, reason })
}

/// Byte offset of the first `//` outside a string literal.
fn comment_start(line: &str) -> Option<usize> {
    let mut quote = None;
    let mut escaped = false;
    let mut chars = line.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match quote {
            Some(q) => {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' => quote = Some(c),
                '/' if chars.peek().is_some_and(|&(_, next)| next == '/') => return Some(i),
                _ => {}
            },
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULE: &str = "messages-have-comments-except-request-response-types";

    #[test]
    fn test_parse_allow_directive() {
        let directive = parse_allow_directive(&format!("// proto-lint: allow({RULE})")).unwrap();
        assert!(directive.rules.contains(RULE));
        assert!(directive.reason.is_none());
    }

    #[test]
    fn test_parse_allow_directive_with_reason() {
        let directive =
            parse_allow_directive("  // proto-lint: allow(rule-a) reason=\"generated code\"")
                .unwrap();
        assert!(directive.rules.contains("rule-a"));
        assert_eq!(directive.reason.as_deref(), Some("generated code"));
    }

    #[test]
    fn test_parse_multiple_rules() {
        let directive = parse_allow_directive("// proto-lint: allow(rule1, rule2 , rule3)").unwrap();
        assert_eq!(directive.rules.len(), 3);
        assert!(directive.rules.contains("rule2"));
    }

    #[test]
    fn test_ignores_other_comments() {
        assert!(parse_allow_directive("// Foo does things").is_none());
        assert!(parse_allow_directive("// proto-lint: allow()").is_none());
        assert!(parse_allow_directive("message Foo {}").is_none());
    }

    #[test]
    fn test_directive_on_previous_line() {
        let content = format!("// proto-lint: allow({RULE}) reason=\"wire compat\"\nmessage Foo {{}}\n");
        let result = check_allow_with_reason(&content, 2, RULE);
        assert!(result.is_allowed());
        assert_eq!(result.reason(), Some("wire compat"));
        assert!(!check_allow_with_reason(&content, 2, "other-rule").is_allowed());
    }

    #[test]
    fn test_trailing_directive_on_same_line() {
        let content = "message Foo {} // proto-lint: allow(all)\n";
        let result = check_allow_with_reason(content, 1, RULE);
        assert!(result.is_allowed());
        assert_eq!(result.reason(), None);
    }

    #[test]
    fn test_trailing_directive_does_not_cover_next_line() {
        let content = "message A {} // proto-lint: allow(all) reason=\"A only\"\nmessage B {}\n";
        assert!(check_allow_with_reason(content, 1, RULE).is_allowed());
        assert_eq!(check_allow_with_reason(content, 2, RULE), AllowCheck::Denied);
    }

    #[test]
    fn test_slashes_inside_strings_are_not_comments() {
        let line = r#"option (doc) = "see http://x // proto-lint: allow(all)";"#;
        assert!(parse_allow_directive(line).is_none());

        let line = r#"option (doc) = "a\"//b"; // proto-lint: allow(all) reason="docs""#;
        let directive = parse_allow_directive(line).unwrap();
        assert_eq!(directive.reason.as_deref(), Some("docs"));
    }

    #[test]
    fn test_directive_too_far_above() {
        let content = format!("// proto-lint: allow({RULE})\n\nmessage Foo {{}}\n");
        assert_eq!(check_allow_with_reason(&content, 3, RULE), AllowCheck::Denied);
    }
}
