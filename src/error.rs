//! Error types

use std::error;
use std::fmt;
use std::path::Path;

/// Preprocessor error
///
/// Raised while a script is going through the stages. `file` is the key of the
/// script being processed and `line` is 1-based, or 0 when the error is not tied to a line.
#[derive(Debug)]
pub struct PpError {
    pub kind: PpErrorKind,
    pub file: String,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PpErrorKind {
    /// The content of a script could not be loaded
    ReadFile,
    /// Malformed `#if` chain
    Conditional,
    /// Include target could not be resolved or does not exist
    Include,
    /// `#error` directive
    Diagnostic,
    /// Plugin settings could not be applied
    Config,
    Other,
}

impl PpError {
    pub fn new(kind: PpErrorKind, file: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for PpError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let what = match self.kind {
            PpErrorKind::ReadFile => "Could not read file.",
            PpErrorKind::Conditional => "Invalid conditional block.",
            PpErrorKind::Include => "Could not include file.",
            PpErrorKind::Diagnostic => "Error directive reached.",
            PpErrorKind::Config => "Invalid plugin settings.",
            PpErrorKind::Other => "Internal error.",
        };
        if self.file.is_empty() {
            return write!(f, "{what}");
        }
        if self.line == 0 {
            write!(f, "{what} (in `{}`)", self.file)
        } else {
            write!(f, "{what} (in `{}`, line {})", self.file, self.line)
        }
    }
}

impl error::Error for PpError {}

/// Error related to paths
#[derive(Debug)]
pub struct PathError {
    /// The path that caused the error, as a string
    pub path: String,
}

impl<P> From<&P> for PathError
where
    P: AsRef<Path> + ?Sized,
{
    fn from(p: &P) -> Self {
        Self {
            path: p.as_ref().display().to_string(),
        }
    }
}

impl fmt::Display for PathError {
    #[cfg(windows)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // on windows, we try to remove the `\\?\` prefix returned
        // by `std::path::Path::display` to make the error message
        // more readable
        let path = if self.path.starts_with(r"\\?\") {
            &self.path[4..]
        } else {
            &self.path
        };
        Self::fmt_internal(path, f)
    }
    #[cfg(not(windows))]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Self::fmt_internal(&self.path, f)
    }
}

impl error::Error for PathError {}

impl PathError {
    fn fmt_internal(p: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error in path `{p}`")
    }
}

#[cfg(test)]
mod ut {
    use super::*;

    #[test]
    fn test_pp_error_display() {
        let e = PpError::new(PpErrorKind::Conditional, "/a/b.txt", 3);
        assert_eq!(
            "Invalid conditional block. (in `/a/b.txt`, line 3)",
            e.to_string()
        );
        let e = PpError::new(PpErrorKind::Include, "/a/b.txt", 0);
        assert_eq!("Could not include file. (in `/a/b.txt`)", e.to_string());
        let e = PpError::new(PpErrorKind::Config, "", 0);
        assert_eq!("Invalid plugin settings.", e.to_string());
    }

    #[cfg(not(windows))]
    #[test]
    fn test_path_error_display() {
        let e = PathError::from("foo/bar.txt");
        assert_eq!("Error in path `foo/bar.txt`", e.to_string());
    }
}
