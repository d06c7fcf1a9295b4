use crate::core::Verbosity;
use std::error::Error;
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Utility for displaying the status of a run
#[derive(Debug)]
pub struct Progress {
    out: StandardStream,
    verbosity: Verbosity,
}

impl Progress {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            out: StandardStream::stderr(ColorChoice::Auto),
            verbosity,
        }
    }

    /// Print a status line, e.g. `   Compiling 3 file(s)`
    ///
    /// Nothing is printed when quiet. Verbose statuses are only printed when verbose.
    pub fn print_status(
        &mut self,
        status: &str,
        message: &str,
        color: Color,
        verbose: bool,
    ) -> Result<(), Box<dyn Error>> {
        if self.verbosity == Verbosity::Quiet {
            return Ok(());
        }
        if verbose && self.verbosity != Verbosity::Verbose {
            return Ok(());
        }
        self.out.reset()?;
        self.out
            .set_color(ColorSpec::new().set_bold(true).set_fg(Some(color)))?;
        write!(self.out, "{:>12}", status)?;
        self.out.reset()?;
        writeln!(self.out, " {}", message)?;
        Ok(())
    }
}
