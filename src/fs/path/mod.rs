//! Wrapper around Path objects provided by the standard library
//!
//! Scripts are identified by keys, and the default key is the canonical path of the file.
//! [`AbsPath`] makes sure a path has gone through canonicalization before it is used
//! as a key or as the working directory for resolving includes.

mod abs_path;
pub use abs_path::*;

/// Make a path string more readable in messages.
///
/// On windows, this removes the `\\?\` prefix produced by canonicalization.
/// Backslashes are turned into forward slashes so keys look the same on every platform.
pub fn normalize_path(p: &str) -> String {
    let p = p.strip_prefix(r"\\?\").unwrap_or(p);
    if cfg!(windows) {
        p.replace('\\', "/")
    } else {
        p.to_string()
    }
}

#[cfg(test)]
mod ut {
    use super::*;

    #[test]
    fn test_normalize_plain() {
        assert_eq!("a/b/c.txt", normalize_path("a/b/c.txt"));
    }

    #[test]
    fn test_normalize_verbatim_prefix() {
        assert_eq!("C:/a", normalize_path(r"\\?\C:/a"));
    }
}
