use crate::error::PathError;
use crate::fs::AbsPath;
use error_stack::{Report, Result};

/// Resolve the input files against the base directory
///
/// Every input must be an existing file. Inputs resolving to the same file are kept once,
/// at the position of their first occurrence.
pub fn resolve_inputs(inputs: &[String], base_abs_path: &AbsPath) -> Result<Vec<AbsPath>, PathError> {
    let mut files: Vec<AbsPath> = vec![];
    for input in inputs {
        let input_path = base_abs_path.as_path().join(input);
        if input_path.is_dir() {
            return Err(Report::new(PathError::from(&input_path))
                .attach_printable("input is a directory, expected a file"));
        }
        let abs_path = base_abs_path.try_resolve(input)?;
        if files.contains(&abs_path) {
            log::warn!("input {abs_path} is given more than once");
            continue;
        }
        files.push(abs_path);
    }
    Ok(files)
}

#[cfg(test)]
mod ut {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_resolve_inputs() {
        let base = AbsPath::try_from(PathBuf::from(".")).unwrap();
        let inputs = vec![
            "Cargo.toml".to_string(),
            "src/lib.rs".to_string(),
            "./Cargo.toml".to_string(),
        ];
        let files = resolve_inputs(&inputs, &base).unwrap();
        assert_eq!(2, files.len());
        assert!(files[0].to_key().ends_with("Cargo.toml"));
        assert!(resolve_inputs(&["src".to_string()], &base).is_err());
        assert!(resolve_inputs(&["missing.txt".to_string()], &base).is_err());
    }
}
