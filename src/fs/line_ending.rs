//! Line ending detection for writing compiled output

use crate::error::PathError;
use crate::fs::normalize_path;
use error_stack::{Result, ResultExt};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub const CRLF: &str = "\r\n";
pub const LF: &str = "\n";
#[cfg(windows)]
pub const OS_LINE_ENDING: &str = CRLF;
#[cfg(not(windows))]
pub const OS_LINE_ENDING: &str = LF;

pub trait GetLineEnding {
    /// Detect the line ending from the first line of the file
    fn get_line_ending(&self) -> Result<&'static str, PathError>;
}

impl<P> GetLineEnding for P
where
    P: AsRef<Path>,
{
    fn get_line_ending(&self) -> Result<&'static str, PathError> {
        let mut buf = vec![];
        let len = File::open(self)
            .map(BufReader::new)
            .and_then(|mut r| r.read_until(b'\n', &mut buf))
            .change_context_lazy(|| PathError::from(self))
            .attach_printable_lazy(|| {
                format!(
                    "failed to get line ending for file: {}",
                    normalize_path(&self.as_ref().display().to_string())
                )
            })?;
        Ok(get_line_ending_from_buf(&buf, len))
    }
}

fn get_line_ending_from_buf(buf: &[u8], len: usize) -> &'static str {
    match len {
        0 => OS_LINE_ENDING,
        1 => {
            if buf[0] == b'\n' {
                LF
            } else {
                OS_LINE_ENDING
            }
        }
        _ => {
            if buf[len - 1] == b'\n' {
                if buf[len - 2] == b'\r' {
                    CRLF
                } else {
                    LF
                }
            } else {
                OS_LINE_ENDING
            }
        }
    }
}

/// Join compiled lines into the text written to the output
pub fn join_lines<S>(lines: &[S], line_ending: &str, trailing_newline: bool) -> String
where
    S: AsRef<str>,
{
    let mut output = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            output.push_str(line_ending);
        }
        output.push_str(line.as_ref());
    }
    if trailing_newline && !lines.is_empty() {
        output.push_str(line_ending);
    }
    output
}
