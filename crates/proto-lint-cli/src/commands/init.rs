//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "proto-lint.toml";

const DEFAULT_CONFIG: &str = r#"# proto-lint configuration

# Minimum severity that makes `proto-lint check` exit non-zero
fail_on = "error"

[analyzer]
# Root directory to analyze (default: current directory)
# root = "./proto"

# Glob patterns to exclude from analysis
exclude = [
    "**/vendor/**",
    "**/third_party/**",
]

# Respect .gitignore files
respect_gitignore = true

# Number of worker threads (default: 1)
# parallelism = 4

# Rule configurations
# Each rule can be enabled/disabled and have its severity overridden

[rules.messages-have-comments-except-request-response-types]
enabled = true
# severity = "warning"  # Override default severity
"#;

/// Runs the init command, writing the default config into `dir`.
pub fn run(dir: &Path, force: bool) -> Result<()> {
    let config_path = write_default_config(dir, force)?;

    println!("Created {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_FILE_NAME} to configure rules");
    println!("  2. Run: proto-lint check");

    Ok(())
}

fn write_default_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    Ok(config_path)
}
