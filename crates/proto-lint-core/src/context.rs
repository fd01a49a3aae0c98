//! Context types for rule execution.

use crate::schema::Position;
use crate::types::Location;
use std::path::{Path, PathBuf};

/// Context provided to per-file rules.
///
/// Carries the file's path and raw source so rules can build locations and
/// look for inline allow directives.
#[derive(Debug, Clone)]
pub struct FileContext<'a> {
    /// Absolute path to the file.
    pub path: &'a Path,
    /// File contents as a string.
    pub content: &'a str,
    /// Path relative to the project root.
    pub relative_path: PathBuf,
}

impl<'a> FileContext<'a> {
    /// Creates a new file context.
    #[must_use]
    pub fn new(path: &'a Path, content: &'a str, root: &Path) -> Self {
        let relative_path = path
            .strip_prefix(root)
            .map_or_else(|_| path.to_path_buf(), Path::to_path_buf);

        Self {
            path,
            content,
            relative_path,
        }
    }

    /// Builds a violation location for `position`, spanning `length` bytes.
    #[must_use]
    pub fn location(&self, position: Position, length: usize) -> Location {
        Location::from_position(self.relative_path.clone(), position)
            .with_span(position.offset, length)
    }
}
