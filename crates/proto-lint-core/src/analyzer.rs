//! Core analyzer for orchestrating lint execution.

use crate::config::Config;
use crate::context::FileContext;
use crate::rule::{Rule, RuleBox};
use crate::types::{LintResult, Violation};

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default exclude patterns, used when none are configured.
const DEFAULT_EXCLUDES: &[&str] = &["**/vendor/**", "**/third_party/**"];

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error reading files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing a schema file.
    #[error("Parse error in {path}: {message}")]
    Parse {
        /// Path to the file that failed to parse.
        path: PathBuf,
        /// Parse error message.
        message: String,
    },

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Error walking the directory tree.
    #[error("Walk error: {0}")]
    Walk(#[from] ignore::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    rules: Vec<RuleBox>,
    exclude_patterns: Vec<String>,
    config: Option<Config>,
    fail_on_parse_error: bool,
    parallelism: Option<usize>,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds a rule to the analyzer.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed rule to the analyzer.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets whether to fail on parse errors (default: false).
    #[must_use]
    pub fn fail_on_parse_error(mut self, fail: bool) -> Self {
        self.fail_on_parse_error = fail;
        self
    }

    /// Sets the number of worker threads (default: 1, or the configured value).
    #[must_use]
    pub fn parallelism(mut self, workers: usize) -> Self {
        self.parallelism = Some(workers);
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be resolved or an
    /// exclude pattern is not a valid glob.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let config = self.config.unwrap_or_default();

        let root = self
            .root
            .unwrap_or_else(|| config.analyzer.root.clone());
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };
        let base = match root.parent() {
            Some(parent) if root.is_file() => parent.to_path_buf(),
            _ => root.clone(),
        };

        let mut exclude_patterns = self.exclude_patterns;
        exclude_patterns.extend(config.analyzer.exclude.iter().cloned());
        if exclude_patterns.is_empty() {
            exclude_patterns.extend(DEFAULT_EXCLUDES.iter().map(ToString::to_string));
        }
        let exclude_patterns = exclude_patterns
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        let parallelism = self
            .parallelism
            .or(config.analyzer.parallelism)
            .unwrap_or(1)
            .max(1);

        Ok(Analyzer {
            root,
            base,
            rules: self.rules,
            exclude_patterns,
            respect_gitignore: config.analyzer.respect_gitignore,
            config,
            fail_on_parse_error: self.fail_on_parse_error,
            parallelism,
        })
    }
}

/// The main analyzer that orchestrates lint execution.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    root: PathBuf,
    base: PathBuf,
    rules: Vec<RuleBox>,
    exclude_patterns: Vec<glob::Pattern>,
    respect_gitignore: bool,
    config: Config,
    fail_on_parse_error: bool,
    parallelism: usize,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the directory that violation paths are relative to.
    ///
    /// This is the root itself, or its parent when the root is a single file.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.base
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Returns the configuration in effect.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Analyzes all `.proto` files under the root and returns the results.
    ///
    /// Violations are sorted by file, line and column.
    ///
    /// # Errors
    ///
    /// Returns an error if file discovery or reading fails, or if a file
    /// fails to parse and `fail_on_parse_error` is set.
    pub fn analyze(&self) -> Result<LintResult, AnalyzerError> {
        info!("Starting analysis at {:?}", self.root);

        let mut result = LintResult::new();
        let files = self.discover_files()?;

        info!(
            "Found {} files to analyze ({} worker(s))",
            files.len(),
            self.parallelism
        );

        for outcome in self.run_files(&files) {
            match outcome {
                Ok(violations) => {
                    result.violations.extend(violations);
                    result.files_checked += 1;
                }
                Err(AnalyzerError::Parse { path, message }) => {
                    warn!("Failed to parse {}: {}", path.display(), message);
                    if self.fail_on_parse_error {
                        return Err(AnalyzerError::Parse { path, message });
                    }
                }
                Err(e) => return Err(e),
            }
        }

        result.sort();

        info!(
            "Analysis complete: {} violations in {} files",
            result.violations.len(),
            result.files_checked
        );

        Ok(result)
    }

    /// Lints in-memory source text as if it were the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Parse`] if `content` is not valid schema text.
    pub fn analyze_source(
        &self,
        path: &Path,
        content: &str,
    ) -> Result<Vec<Violation>, AnalyzerError> {
        let file = crate::parse(content).map_err(|e| AnalyzerError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let ctx = FileContext::new(path, content, &self.base);
        let mut violations = Vec::new();

        for rule in &self.rules {
            if !self.config.is_rule_enabled(rule.name()) {
                debug!("Skipping disabled rule: {}", rule.name());
                continue;
            }

            let rule_violations = rule.check(&ctx, &file);
            debug!(
                "{}: {} violation(s) from {}",
                ctx.relative_path.display(),
                rule_violations.len(),
                rule.name()
            );
            violations.extend(self.apply_severity_override(rule.as_ref(), rule_violations));
        }

        Ok(violations)
    }

    /// Runs every file through the rules, preserving input order.
    ///
    /// Each worker thread gets a contiguous slice of files. Rules build their
    /// per-file state inside `check`, so nothing is shared between workers
    /// beyond the read-only analyzer.
    fn run_files(&self, files: &[PathBuf]) -> Vec<Result<Vec<Violation>, AnalyzerError>> {
        let workers = self.parallelism.min(files.len());
        if workers <= 1 {
            return files.iter().map(|f| self.analyze_file(f)).collect();
        }

        let chunk_size = files.len().div_ceil(workers);
        std::thread::scope(|scope| {
            let handles: Vec<_> = files
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|f| self.analyze_file(f))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
                })
                .collect()
        })
    }

    /// Reads and analyzes a single file.
    fn analyze_file(&self, path: &Path) -> Result<Vec<Violation>, AnalyzerError> {
        debug!("Analyzing: {}", path.display());
        let content = std::fs::read_to_string(path)?;
        self.analyze_source(path, &content)
    }

    /// Applies severity overrides from configuration.
    ///
    /// Only violations at the rule's own severity are rewritten; anything
    /// else the rule emits (such as a missing allow reason) keeps its level.
    fn apply_severity_override(
        &self,
        rule: &dyn Rule,
        mut violations: Vec<Violation>,
    ) -> Vec<Violation> {
        if let Some(severity) = self.config.rule_severity(rule.name()) {
            let own = rule.default_severity();
            for v in violations.iter_mut().filter(|v| v.severity == own) {
                v.severity = severity;
            }
        }
        violations
    }

    /// Discovers all `.proto` files to analyze, sorted by path.
    fn discover_files(&self) -> Result<Vec<PathBuf>, AnalyzerError> {
        let walker = ignore::WalkBuilder::new(&self.root)
            .standard_filters(self.respect_gitignore)
            .require_git(false)
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry?;
            let path = entry.path();

            let is_proto = entry.file_type().is_some_and(|t| t.is_file())
                && path.extension().is_some_and(|ext| ext == "proto");
            if !is_proto {
                continue;
            }

            if self.should_exclude(path) {
                debug!("Excluding: {}", path.display());
                continue;
            }

            files.push(path.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    /// Checks if a path matches any exclude pattern, either as given or
    /// relative to the root.
    fn should_exclude(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.base).unwrap_or(path);
        self.exclude_patterns
            .iter()
            .any(|pattern| pattern.matches_path(path) || pattern.matches_path(relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Element, ProtoFile};
    use crate::types::Severity;
    use std::fs;
    use tempfile::TempDir;

    /// Flags every top-level message named `Bad`, and warns on `Meh`.
    struct NoBadMessages;

    impl Rule for NoBadMessages {
        fn name(&self) -> &'static str {
            "no-bad-messages"
        }
        fn code(&self) -> &'static str {
            "TEST001"
        }
        fn check(&self, ctx: &FileContext, file: &ProtoFile) -> Vec<Violation> {
            file.elements
                .iter()
                .filter_map(|e| match e {
                    Element::Message(m) if m.name == "Bad" => Some(Violation::new(
                        self.code(),
                        self.name(),
                        self.default_severity(),
                        ctx.location(m.position, 0),
                        "bad message",
                    )),
                    Element::Message(m) if m.name == "Meh" => Some(Violation::new(
                        self.code(),
                        self.name(),
                        Severity::Warning,
                        ctx.location(m.position, 0),
                        "meh message",
                    )),
                    _ => None,
                })
                .collect()
        }
    }

    fn write(dir: &Path, relative: &str, content: &str) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_builder() {
        let analyzer = Analyzer::builder()
            .root(".")
            .exclude("**/gen/**")
            .build()
            .expect("Failed to build analyzer");

        assert!(analyzer.root().exists());
        assert_eq!(analyzer.rule_count(), 0);
    }

    #[test]
    fn test_invalid_exclude_pattern() {
        let result = Analyzer::builder().root(".").exclude("a/[").build();
        assert!(matches!(result, Err(AnalyzerError::Glob(_))));
    }

    #[test]
    fn test_exclude_patterns() {
        let analyzer = Analyzer::builder()
            .root("/repo")
            .exclude("**/vendor/**")
            .exclude("gen/**")
            .build()
            .unwrap();

        assert!(analyzer.should_exclude(Path::new("/repo/vendor/google/api.proto")));
        assert!(analyzer.should_exclude(Path::new("/repo/gen/a.proto")));
        assert!(!analyzer.should_exclude(Path::new("/repo/acme/v1/a.proto")));
    }

    #[test]
    fn test_default_excludes() {
        let analyzer = Analyzer::builder().root("/repo").build().unwrap();
        assert!(analyzer.should_exclude(Path::new("/repo/third_party/x.proto")));
    }

    #[test]
    fn test_analyze_discovers_proto_files_only() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a/one.proto", "message Bad {}\n");
        write(tmp.path(), "b/two.proto", "message Good {}\nmessage Bad {}\n");
        write(tmp.path(), "b/notes.txt", "message Bad {}\n");
        write(tmp.path(), "vendor/v.proto", "message Bad {}\n");

        let result = Analyzer::builder()
            .root(tmp.path())
            .rule(NoBadMessages)
            .build()
            .unwrap()
            .analyze()
            .unwrap();

        assert_eq!(result.files_checked, 2);
        let files: Vec<_> = result
            .violations
            .iter()
            .map(|v| (v.location.file.clone(), v.location.line))
            .collect();
        assert_eq!(
            files,
            vec![
                (PathBuf::from("a/one.proto"), 1),
                (PathBuf::from("b/two.proto"), 2),
            ]
        );
    }

    #[test]
    fn test_single_file_root() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "only.proto", "message Bad {}\n");

        let analyzer = Analyzer::builder()
            .root(tmp.path().join("only.proto"))
            .rule(NoBadMessages)
            .build()
            .unwrap();
        assert_eq!(analyzer.root(), tmp.path());

        let result = analyzer.analyze().unwrap();
        assert_eq!(result.files_checked, 1);
        assert_eq!(result.violations[0].location.file, PathBuf::from("only.proto"));
    }

    #[test]
    fn test_respects_gitignore() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), ".gitignore", "generated/\n");
        write(tmp.path(), "generated/g.proto", "message Bad {}\n");
        write(tmp.path(), "src/s.proto", "message Bad {}\n");

        let result = Analyzer::builder()
            .root(tmp.path())
            .rule(NoBadMessages)
            .build()
            .unwrap()
            .analyze()
            .unwrap();
        assert_eq!(result.files_checked, 1);
    }

    #[test]
    fn test_parse_errors_are_skipped_or_fatal() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "broken.proto", "message {\n");
        write(tmp.path(), "ok.proto", "message Bad {}\n");

        let lenient = Analyzer::builder()
            .root(tmp.path())
            .rule(NoBadMessages)
            .build()
            .unwrap()
            .analyze()
            .unwrap();
        assert_eq!(lenient.files_checked, 1);
        assert_eq!(lenient.violations.len(), 1);

        let strict = Analyzer::builder()
            .root(tmp.path())
            .rule(NoBadMessages)
            .fail_on_parse_error(true)
            .build()
            .unwrap()
            .analyze();
        assert!(matches!(strict, Err(AnalyzerError::Parse { .. })));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let tmp = TempDir::new().unwrap();
        for i in 0..9 {
            write(
                tmp.path(),
                &format!("pkg{i}/f.proto"),
                "message Bad {}\nmessage Fine {}\nmessage Bad {}\n",
            );
        }

        let run = |workers| {
            Analyzer::builder()
                .root(tmp.path())
                .rule(NoBadMessages)
                .parallelism(workers)
                .build()
                .unwrap()
                .analyze()
                .unwrap()
        };
        let sequential = run(1);
        let parallel = run(4);

        assert_eq!(parallel.files_checked, 9);
        let key = |r: &LintResult| {
            r.violations
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(key(&sequential), key(&parallel));
    }

    #[test]
    fn test_config_disables_and_overrides() {
        let source = "message Bad {}\n";

        let disabled = Config::parse("[rules.no-bad-messages]\nenabled = false\n").unwrap();
        let analyzer = Analyzer::builder()
            .root(".")
            .config(disabled)
            .rule(NoBadMessages)
            .build()
            .unwrap();
        assert!(analyzer
            .analyze_source(Path::new("x.proto"), source)
            .unwrap()
            .is_empty());

        let downgraded = Config::parse("[rules.no-bad-messages]\nseverity = \"info\"\n").unwrap();
        let analyzer = Analyzer::builder()
            .root(".")
            .config(downgraded)
            .rule(NoBadMessages)
            .build()
            .unwrap();
        let violations = analyzer
            .analyze_source(Path::new("x.proto"), source)
            .unwrap();
        assert_eq!(violations[0].severity, Severity::Info);
    }

    #[test]
    fn test_severity_override_keeps_other_levels() {
        let config = Config::parse("[rules.no-bad-messages]\nseverity = \"info\"\n").unwrap();
        let analyzer = Analyzer::builder()
            .root(".")
            .config(config)
            .rule(NoBadMessages)
            .build()
            .unwrap();
        let violations = analyzer
            .analyze_source(Path::new("x.proto"), "message Bad {}\nmessage Meh {}\n")
            .unwrap();

        let levels: Vec<(&str, Severity)> = violations
            .iter()
            .map(|v| (v.message.as_str(), v.severity))
            .collect();
        assert_eq!(
            levels,
            vec![("bad message", Severity::Info), ("meh message", Severity::Warning)]
        );
    }
}
