use super::normalize_path;
use crate::error::PathError;
use error_stack::{Report, Result, ResultExt};
use std::path::{Path, PathBuf};

/// Representation of an absolute path that exists.
///
/// Using [`PathBuf`] directly in the program can be confusing,
/// since it can represent both relative and absolute paths in different contexts.
/// Hence, we use `AbsPath` wherever a path is resolved and absolute, most importantly
/// for script keys, which must be equal whenever two includes point to the same file.
///
/// We still use [`PathBuf`] in places that usually represent input from the user,
/// as it could be relative or absolute and may not exist.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AbsPath {
    p: PathBuf,
}

impl TryFrom<PathBuf> for AbsPath {
    type Error = Report<PathError>;

    /// Convert a [`PathBuf`] to an absolute path.
    ///
    /// This will error if:
    /// - the path doesn't exist
    /// - the path cannot be made absolute for some reason
    ///
    /// If the path is relative, it will be made absolute by
    /// using [`canonicalize`](std::path::Path::canonicalize)
    fn try_from(p: PathBuf) -> Result<Self, PathError> {
        if !p.exists() {
            return Err(Report::new(PathError::from(&p)).attach_printable("path does not exist"));
        }
        let p_abs = p
            .canonicalize()
            .change_context_lazy(|| PathError::from(&p))
            .attach_printable("cannot resolve path as absolute")?;

        Ok(Self { p: p_abs })
    }
}

/// Integration with [`PathBuf`] and [`Path`]
impl AbsPath {
    #[inline]
    pub fn as_path(&self) -> &Path {
        self.p.as_path()
    }
}

impl From<AbsPath> for PathBuf {
    #[inline]
    fn from(p: AbsPath) -> Self {
        p.p
    }
}

impl AsRef<Path> for AbsPath {
    #[inline]
    fn as_ref(&self) -> &Path {
        self.as_path()
    }
}

impl AbsPath {
    /// Resolve a path relative to the current path
    ///
    /// if `ext` is absolute, return `ext`, otherwise join `ext` with the current path.
    /// The resolved path must exist.
    pub fn try_resolve<P>(&self, ext: &P) -> Result<Self, PathError>
    where
        P: AsRef<Path> + ?Sized,
    {
        let path: &Path = ext.as_ref();
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.p.join(path)
        };
        Self::try_from(path)
    }

    /// Get the parent
    pub fn parent(&self) -> Result<Self, PathError> {
        let p_parent = match self.p.parent() {
            Some(p) => p,
            None => {
                return Err(Report::new(PathError::from(self))
                    .attach_printable("cannot get parent directory"))
            }
        };
        Self::try_from(p_parent.to_path_buf())
    }

    /// The path as a key string, see [`normalize_path`]
    pub fn to_key(&self) -> String {
        normalize_path(&self.p.display().to_string())
    }
}

impl std::fmt::Display for AbsPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_key())
    }
}

#[cfg(test)]
mod ut {
    use super::*;

    #[test]
    fn test_missing_path() {
        let p = PathBuf::from("this/path/does/not/exist.txt");
        assert!(AbsPath::try_from(p).is_err());
    }

    #[test]
    fn test_resolve_is_canonical() {
        let cwd = AbsPath::try_from(PathBuf::from(".")).unwrap();
        let a = cwd.try_resolve("src").unwrap();
        let b = cwd.try_resolve("src/../src").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_key(), b.to_key());
        assert_eq!(cwd, a.parent().unwrap());
    }
}
