use crate::error::{PpError, PpErrorKind};
use crate::fs::Content;
use derivative::Derivative;
use error_stack::{Result, ResultExt};
use std::any::Any;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One script in the run
///
/// The lines are loaded through the content handle the first time they are needed,
/// and every plugin stage edits them in place afterwards.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct SourceScript {
    content: Box<dyn Content>,
    is_inline: bool,
    lines: Option<Vec<String>>,
    /// Data handed from one plugin to another
    #[derivative(Debug = "ignore")]
    payload: HashMap<String, Box<dyn Any>>,
}

impl SourceScript {
    pub(crate) fn new(content: Box<dyn Content>, is_inline: bool) -> Self {
        Self {
            content,
            is_inline,
            lines: None,
            payload: HashMap::new(),
        }
    }

    #[inline]
    pub fn key(&self) -> &str {
        self.content.key()
    }

    #[inline]
    pub fn is_inline(&self) -> bool {
        self.is_inline
    }

    #[inline]
    pub fn file_path(&self) -> &Path {
        self.content.file_path()
    }

    #[inline]
    pub fn defined_name(&self) -> &str {
        self.content.defined_name()
    }

    /// Directory includes of this script are resolved against
    #[inline]
    pub fn directory(&self) -> PathBuf {
        self.content.directory()
    }

    /// If the lines have been loaded
    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.lines.is_some()
    }

    /// Get the lines, loading them if this is the first access
    pub fn get_source(&mut self) -> Result<&[String], PpError> {
        Ok(self.source_mut()?.as_slice())
    }

    /// Get the lines for editing, loading them if this is the first access
    pub fn source_mut(&mut self) -> Result<&mut Vec<String>, PpError> {
        if self.lines.is_none() {
            let lines = self
                .content
                .try_get_lines()
                .change_context_lazy(|| {
                    PpError::new(PpErrorKind::ReadFile, self.content.key(), 0)
                })
                .attach_printable("could not load script content")?;
            self.lines = Some(lines);
        }
        Ok(self.lines.get_or_insert_with(Vec::new))
    }

    /// Replace the lines
    pub fn set_source(&mut self, lines: Vec<String>) {
        self.lines = Some(lines);
    }

    /// The lines, or nothing if they were never loaded
    #[inline]
    pub fn lines(&self) -> &[String] {
        self.lines.as_deref().unwrap_or_default()
    }

    pub fn set_payload<T>(&mut self, key: impl Into<String>, value: T)
    where
        T: Any,
    {
        self.payload.insert(key.into(), Box::new(value));
    }

    /// Get a payload entry, if it exists and has type `T`
    pub fn payload<T>(&self, key: &str) -> Option<&T>
    where
        T: Any,
    {
        self.payload.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    pub fn has_payload(&self, key: &str) -> bool {
        self.payload.contains_key(key)
    }
}
