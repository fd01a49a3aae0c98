//! Rule trait for defining lint rules.

use crate::context::FileContext;
use crate::schema::ProtoFile;
use crate::types::{Severity, Violation};

/// A per-file lint rule over the parsed schema model.
///
/// Rules receive the parsed file and typically walk it with a
/// [`Visit`](crate::visit::Visit) implementation. Any per-file state belongs
/// to that visitor, built fresh inside `check`, so a single rule instance can
/// be shared across threads and files.
///
/// # Example
///
/// ```ignore
/// use proto_lint_core::{FileContext, ProtoFile, Rule, Violation};
/// use proto_lint_core::visit::Visit;
///
/// pub struct NoEmptyServices;
///
/// impl Rule for NoEmptyServices {
///     fn name(&self) -> &'static str { "no-empty-services" }
///     fn code(&self) -> &'static str { "PL900" }
///
///     fn check(&self, ctx: &FileContext, file: &ProtoFile) -> Vec<Violation> {
///         let mut visitor = EmptyServiceVisitor::new(ctx);
///         visitor.visit_file(file);
///         visitor.violations
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the kebab-case name of this rule.
    fn name(&self) -> &'static str;

    /// Returns the rule code (e.g., "PL001").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for violations from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Whether this rule requires a reason when using allow directives.
    ///
    /// By default, rules with `Severity::Error` require a reason.
    fn requires_allow_reason(&self) -> bool {
        self.default_severity() == Severity::Error
    }

    /// Checks a single file and returns any violations found.
    fn check(&self, ctx: &FileContext, file: &ProtoFile) -> Vec<Violation>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Element;

    struct CountMessages;

    impl Rule for CountMessages {
        fn name(&self) -> &'static str {
            "count-messages"
        }
        fn code(&self) -> &'static str {
            "TEST001"
        }
        fn default_severity(&self) -> Severity {
            Severity::Info
        }

        fn check(&self, ctx: &FileContext, file: &ProtoFile) -> Vec<Violation> {
            file.elements
                .iter()
                .filter_map(|e| match e {
                    Element::Message(m) => Some(Violation::new(
                        self.code(),
                        self.name(),
                        self.default_severity(),
                        ctx.location(m.position, m.name.len()),
                        format!("message {}", m.name),
                    )),
                    _ => None,
                })
                .collect()
        }
    }

    #[test]
    fn defaults() {
        let rule = CountMessages;
        assert_eq!(rule.description(), "");
        assert!(!rule.requires_allow_reason());
    }

    #[test]
    fn check_through_trait_object() {
        let rule: RuleBox = Box::new(CountMessages);
        let file = crate::parse("message A {}\nmessage B {}\n").unwrap();
        let ctx = FileContext::new(std::path::Path::new("t.proto"), "", std::path::Path::new("."));
        let violations = rule.check(&ctx, &file);
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[1].location.line, 2);
    }
}
