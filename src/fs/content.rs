//! Content handles
//!
//! A content handle is how a script gets to its lines. The preprocessor never reads
//! files by itself; it asks the handle of the script, and only the first time the
//! lines are needed.

use super::{normalize_path, AbsPath};
use crate::error::PathError;
use error_stack::{Report, Result, ResultExt};
use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Accessor for the content and identity of one script
pub trait Content: Debug {
    /// If the file behind the handle can be read
    fn has_valid_path(&self) -> bool;
    /// Load the lines, without line endings
    fn try_get_lines(&self) -> Result<Vec<String>, PathError>;
    /// The key under which the script is registered
    fn key(&self) -> &str;
    fn set_key(&mut self, key: String);
    /// Path of the file. For in-memory content, this is a synthetic path
    fn file_path(&self) -> &Path;
    /// The name other plugins should use to refer to this content
    fn defined_name(&self) -> &str;

    /// Directory that includes in this content are resolved against
    fn directory(&self) -> PathBuf {
        match self.file_path().parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

/// Content backed by a file on disk, read lazily
#[derive(Debug, Clone)]
pub struct PathContent {
    path: PathBuf,
    key: String,
    defined_name: String,
}

impl PathContent {
    /// Create a handle for `path` registered under `key`
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            path: path.into(),
            defined_name: key.clone(),
            key,
        }
    }

    /// Create a handle keyed by the canonical path
    pub fn from_abs(path: &AbsPath) -> Self {
        Self::new(path.as_path(), path.to_key())
    }

    /// Resolve `path` to its canonical form and create a handle keyed by it
    pub fn resolve<P>(path: P) -> Result<Self, PathError>
    where
        P: Into<PathBuf>,
    {
        let abs = AbsPath::try_from(path.into())?;
        Ok(Self::from_abs(&abs))
    }

    pub fn with_defined_name(mut self, name: impl Into<String>) -> Self {
        self.defined_name = name.into();
        self
    }
}

impl Content for PathContent {
    fn has_valid_path(&self) -> bool {
        self.path.is_file()
    }

    fn try_get_lines(&self) -> Result<Vec<String>, PathError> {
        if !self.has_valid_path() {
            return Err(Report::new(PathError::from(&self.path))
                .attach_printable("file does not exist"));
        }
        let text = fs::read_to_string(&self.path)
            .change_context_lazy(|| PathError::from(&self.path))
            .attach_printable_lazy(|| format!("could not read `{}`", self.key))?;
        log::debug!("loaded {} line(s) from {}", text.lines().count(), self.key);
        Ok(text.lines().map(String::from).collect())
    }

    fn key(&self) -> &str {
        &self.key
    }

    fn set_key(&mut self, key: String) {
        self.key = key;
    }

    fn file_path(&self) -> &Path {
        &self.path
    }

    fn defined_name(&self) -> &str {
        &self.defined_name
    }
}

/// Content supplied by the caller, never touching the disk
///
/// The key is synthetic, of the form `<dir>/memoryFile<ext>`. Includes inside
/// the content are resolved against `<dir>`.
#[derive(Debug, Clone)]
pub struct MemoryContent {
    lines: Vec<String>,
    path: PathBuf,
    key: String,
}

impl MemoryContent {
    pub fn new<I, S>(lines: I, dir: impl AsRef<Path>, ext: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let dir = dir.as_ref();
        let key = normalize_path(&format!("{}/memoryFile{ext}", dir.display()));
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            path: dir.join(format!("memoryFile{ext}")),
            key,
        }
    }

    /// Split `text` into lines and wrap it
    pub fn from_text(text: &str, dir: impl AsRef<Path>, ext: &str) -> Self {
        Self::new(text.lines(), dir, ext)
    }
}

impl Content for MemoryContent {
    fn has_valid_path(&self) -> bool {
        true
    }

    fn try_get_lines(&self) -> Result<Vec<String>, PathError> {
        Ok(self.lines.clone())
    }

    fn key(&self) -> &str {
        &self.key
    }

    fn set_key(&mut self, key: String) {
        self.key = key;
    }

    fn file_path(&self) -> &Path {
        &self.path
    }

    fn defined_name(&self) -> &str {
        &self.key
    }
}
