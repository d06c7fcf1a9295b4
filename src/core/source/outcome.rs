use crate::error::PathError;
use crate::fs::AbsPath;
use error_stack::{Report, Result};
use std::collections::BTreeMap;
use std::path::Path;

/// Field holding the path of the resolved file
pub const FILENAME: &str = "filename";
/// Field holding the key the script is registered under
pub const KEY: &str = "key";
/// Field holding the name other plugins refer to the script by
pub const DEFINED_NAME: &str = "definedName";

/// Result of resolving the arguments of an include directive
///
/// Besides the standard fields, a scheme may add any field it wants. Those
/// extras end up in the payload of the included script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    fields: BTreeMap<String, String>,
}

impl ImportOutcome {
    pub fn new(filename: impl Into<String>, key: impl Into<String>) -> Self {
        let key = key.into();
        let mut outcome = Self::default();
        outcome.set(FILENAME, filename);
        outcome.set(DEFINED_NAME, key.clone());
        outcome.set(KEY, key);
        outcome
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn filename(&self) -> &str {
        self.get(FILENAME).unwrap_or_default()
    }

    pub fn key(&self) -> &str {
        self.get(KEY).unwrap_or_default()
    }

    pub fn defined_name(&self) -> &str {
        self.get(DEFINED_NAME).unwrap_or_else(|| self.key())
    }

    /// Fields other than the standard ones
    pub fn extras(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .filter(|(k, _)| !matches!(k.as_str(), FILENAME | KEY | DEFINED_NAME))
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Turns the arguments of an include directive and the directory of the including
/// script into an [`ImportOutcome`].
pub type ResolutionScheme = dyn Fn(&[String], &Path) -> Result<ImportOutcome, PathError>;

/// The default resolution scheme
///
/// The first argument is a path relative to `current_dir`, and is kept as the filename.
/// The canonical path is used both as the key and as the defined name, so two includes
/// of the same file end up with the same key.
pub fn resolve_by_path(args: &[String], current_dir: &Path) -> Result<ImportOutcome, PathError> {
    let arg = match args.first() {
        Some(arg) => arg,
        None => {
            return Err(Report::new(PathError::from(current_dir))
                .attach_printable("include directive has no file argument"))
        }
    };
    let abs = AbsPath::try_from(current_dir.join(arg))
        .map_err(|e| e.attach_printable(format!("could not resolve include target `{arg}`")))?;
    Ok(ImportOutcome::new(arg.as_str(), abs.to_key()))
}
