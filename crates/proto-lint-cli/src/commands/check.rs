//! Check command implementation.

use anyhow::{Context, Result};
use proto_lint_core::{Analyzer, Config, RuleBox};
use proto_lint_rules::{all_rules, rule_by_name};
use std::path::Path;

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Runs the check command.
///
/// Returns `false` when violations at or above the configured `fail_on`
/// severity were found.
pub fn run(
    path: &Path,
    format: OutputFormat,
    rules_filter: Option<&str>,
    exclude: Vec<String>,
    source: &ConfigSource,
) -> Result<bool> {
    let config = load_config(source)?;
    let fail_on = config.fail_on_severity();

    let known: Vec<&str> = all_rules().iter().map(|r| r.name()).collect();
    for name in config.unknown_rules(&known) {
        tracing::warn!("Configuration for unknown rule: {}", name);
    }

    let mut builder = Analyzer::builder().root(path).config(config);

    for pattern in exclude {
        builder = builder.exclude(pattern);
    }

    let rules = match rules_filter {
        Some(filter) => filter_rules(filter),
        None => all_rules(),
    };
    for rule in rules {
        builder = builder.rule_box(rule);
    }

    let analyzer = builder.build().context("Failed to build analyzer")?;

    tracing::info!("Analyzing {:?} with {} rules", path, analyzer.rule_count());

    let result = analyzer.analyze().context("Analysis failed")?;

    super::output::print(&result, format, analyzer.root())?;

    Ok(!result.has_violations_at(fail_on))
}

/// Loads the configuration the resolver pointed at.
fn load_config(source: &ConfigSource) -> Result<Config> {
    let Some(path) = source.path() else {
        return Ok(Config::default());
    };
    if source.is_global() {
        tracing::info!("Using global config: {}", path.display());
    }
    Config::from_file(path).with_context(|| format!("Failed to load config: {}", path.display()))
}

/// Selects rules from a comma-separated list of names or codes.
fn filter_rules(filter: &str) -> Vec<RuleBox> {
    filter
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter_map(|name| {
            let rule = rule_by_name(name);
            if rule.is_none() {
                tracing::warn!("Unknown rule: {}", name);
            }
            rule
        })
        .collect()
}
