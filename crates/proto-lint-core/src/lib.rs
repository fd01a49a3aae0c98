//! # proto-lint-core
//!
//! Core framework for linting Protocol Buffers schema files.
//!
//! This crate provides the foundational pieces for building schema linters:
//!
//! - [`parse`] turning `.proto` source into the [`schema`] model
//! - [`visit::Visit`] for depth-first traversal of that model
//! - [`Rule`] trait for per-file rules
//! - [`Analyzer`] for discovering files and running rules over them
//! - [`Violation`] for representing lint findings
//!
//! ## Example
//!
//! ```ignore
//! use proto_lint_core::Analyzer;
//!
//! let analyzer = Analyzer::builder()
//!     .root("./proto")
//!     .rule(MyRule::new())
//!     .build()?;
//!
//! let result = analyzer.analyze()?;
//! println!("{}", result.format_report(Severity::Error));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod config;
mod context;
mod parser;
mod rule;
mod types;

pub mod schema;
pub mod utils;
pub mod visit;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError};
pub use config::{AnalyzerConfig, Config, ConfigError, RuleConfig};
pub use context::FileContext;
pub use parser::{parse, ParseError};
pub use rule::{Rule, RuleBox};
pub use schema::{Comment, Element, Message, Position, ProtoFile, Rpc, Service};
pub use types::{LintResult, Location, Severity, Suggestion, Violation, ViolationDiagnostic};
pub use utils::allowance::AllowCheck;
