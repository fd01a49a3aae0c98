//! Rule requiring a leading comment on every message that names it.
//!
//! # Rationale
//!
//! A message type is part of the public contract of a schema. Starting its
//! comment with the message name keeps generated documentation readable and
//! makes the type easy to find with a plain text search.
//!
//! Types that only exist as the request or response payload of an RPC are
//! described by the RPC itself, and `extend` blocks augment a type declared
//! elsewhere, so neither needs its own comment.
//!
//! # Detected Patterns
//!
//! - Messages without a leading comment
//! - Messages whose comment names a different type (`// Other ...`)
//! - Messages documented with `///` or `/* */` instead of `// Name`
//!
//! # Good Patterns
//!
//! ```text
//! // Account is a customer billing account.
//! message Account {
//!   // Address is where invoices are sent.
//!   message Address {}
//! }
//!
//! service Accounts {
//!   rpc Get(GetAccountRequest) returns (GetAccountResponse);
//! }
//!
//! message GetAccountRequest {}
//! message GetAccountResponse {}
//! ```
//!
//! # Exemption Matching
//!
//! RPC request and response types are matched against qualified message
//! names by plain string equality. `rpc Get(Inner)` does not exempt a nested
//! `Outer.Inner`, while `rpc Get(Outer.Inner)` does. A package-qualified or
//! leading-dot reference (`.acme.v1.Req`) does not match the message `Req`.

use proto_lint_core::utils::allowance::check_allow_with_reason;
use proto_lint_core::visit::{self, Visit};
use proto_lint_core::schema::Group;
use proto_lint_core::{
    FileContext, Message, ProtoFile, Rpc, Rule, Severity, Suggestion, Violation,
};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Rule code for messages-have-comments-except-request-response-types.
pub const CODE: &str = "PL001";

/// Rule name for messages-have-comments-except-request-response-types.
pub const NAME: &str = "messages-have-comments-except-request-response-types";

/// Requires `// Name ...` comments on messages that are not RPC payloads.
#[derive(Debug, Clone)]
pub struct MessagesHaveCommentsExceptRequestResponseTypes {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for MessagesHaveCommentsExceptRequestResponseTypes {
    fn default() -> Self {
        Self::new()
    }
}

impl MessagesHaveCommentsExceptRequestResponseTypes {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Error,
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    fn report(&self, ctx: &FileContext, message: &Message, text: String) -> Option<Violation> {
        let position = message.position;
        let location = ctx.location(position, message.keyword().len());

        let allow_check = check_allow_with_reason(ctx.content, position.line, NAME);
        if allow_check.is_allowed() {
            if self.requires_allow_reason() && allow_check.reason().is_none() {
                return Some(
                    Violation::new(
                        CODE,
                        NAME,
                        Severity::Warning,
                        location,
                        format!("Allow directive for '{NAME}' is missing required reason"),
                    )
                    .with_suggestion(Suggestion::new(
                        "Add reason=\"...\" to explain why this exception is necessary",
                    )),
                );
            }
            return None;
        }

        Some(
            Violation::new(CODE, NAME, self.severity, location, text).with_suggestion(
                Suggestion::new(format!(
                    "Add a leading comment starting with \"// {} \"",
                    message.name
                )),
            ),
        )
    }
}

impl Rule for MessagesHaveCommentsExceptRequestResponseTypes {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Verifies that all non-extended messages except for request and response types have a comment of the form \"// MessageName ...\"."
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &FileContext, file: &ProtoFile) -> Vec<Violation> {
        let index = MessageCommentIndex::build(file);

        debug!(
            "{}: {} message(s), {} request/response type(s)",
            ctx.relative_path.display(),
            index.messages.len(),
            index.exempt.len()
        );

        let mut violations = Vec::new();
        index.finish(|message, text| {
            violations.extend(self.report(ctx, message, text));
        });
        violations.sort_by_key(|v| (v.location.line, v.location.column));
        violations
    }
}

/// Per-file state collected while walking one schema file.
///
/// Messages register under their qualified name once their subtree has been
/// walked, so the scope stack holds exactly the enclosing names at that point.
#[derive(Debug, Default)]
pub struct MessageCommentIndex<'ast> {
    scope: Vec<&'ast str>,
    messages: HashMap<String, &'ast Message>,
    exempt: HashSet<String>,
}

impl<'ast> MessageCommentIndex<'ast> {
    /// Builds the index for a whole file.
    #[must_use]
    pub fn build(file: &'ast ProtoFile) -> Self {
        let mut index = Self::default();
        index.visit_file(file);
        index
    }

    /// Returns the qualified name of `name` inside the current scope.
    fn qualify(&self, name: &str) -> String {
        if self.scope.is_empty() {
            name.to_string()
        } else {
            format!("{}.{name}", self.scope.join("."))
        }
    }

    /// Returns whether `qualified_name` is used as an RPC request or response.
    #[must_use]
    pub fn is_exempt(&self, qualified_name: &str) -> bool {
        self.exempt.contains(qualified_name)
    }

    /// Evaluates every registered message, calling `add` once per failure.
    ///
    /// Failures are produced in no particular order.
    pub fn finish(self, mut add: impl FnMut(&'ast Message, String)) {
        for (qualified_name, &message) in &self.messages {
            if message.is_extend || self.exempt.contains(qualified_name) {
                continue;
            }
            if !has_canonical_comment(message) {
                add(
                    message,
                    format!(
                        "Message \"{0}\" needs a comment of the form \"// {0} ...\"",
                        message.name
                    ),
                );
            }
        }
    }
}

impl<'ast> Visit<'ast> for MessageCommentIndex<'ast> {
    fn visit_message(&mut self, node: &'ast Message) {
        self.scope.push(&node.name);
        visit::visit_message(self, node);
        self.scope.pop();

        let qualified_name = self.qualify(&node.name);
        self.messages.insert(qualified_name, node);
    }

    fn visit_rpc(&mut self, node: &'ast Rpc) {
        self.exempt.insert(node.request_type.clone());
        self.exempt.insert(node.returns_type.clone());
    }

    // Groups are not messages and their bodies are not searched.
    fn visit_group(&mut self, _node: &'ast Group) {}
}

/// Checks for a comment starting with `// <Name>`.
fn has_canonical_comment(message: &Message) -> bool {
    let prefix = format!("// {}", message.name);
    message
        .comment
        .as_ref()
        .is_some_and(|c| c.text().starts_with(&prefix))
}
