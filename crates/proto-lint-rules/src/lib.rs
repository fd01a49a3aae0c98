//! # proto-lint-rules
//!
//! Built-in lint rules for proto-lint.
//!
//! ## Available Rules
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | PL001 | `messages-have-comments-except-request-response-types` | Requires `// Name ...` comments on messages that are not RPC payloads or extensions |
//!
//! ## Usage
//!
//! ```ignore
//! use proto_lint_core::Analyzer;
//! use proto_lint_rules::MessagesHaveCommentsExceptRequestResponseTypes;
//!
//! let analyzer = Analyzer::builder()
//!     .root("./proto")
//!     .rule(MessagesHaveCommentsExceptRequestResponseTypes::new())
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod messages_have_comments_except_request_response_types;
mod registry;

pub use messages_have_comments_except_request_response_types::{
    MessageCommentIndex, MessagesHaveCommentsExceptRequestResponseTypes,
};
pub use registry::{all_rules, rule_by_name};

/// Re-export core types for convenience.
pub use proto_lint_core::{Rule, Severity, Violation};
