use crate::core::{verbs, Definitions, PreProcessor, Progress, Settings};
use crate::fs::{join_lines, AbsPath, Content, GetLineEnding, PathContent, OS_LINE_ENDING};
use error_stack::{Report, Result, ResultExt};
use std::io::Write;
use std::path::PathBuf;
use termcolor::Color;

mod config;
pub use config::*;
mod error;
pub use error::ExecuteError;
mod resolve_inputs;
use resolve_inputs::resolve_inputs;

/// Run extpp with the given config
///
/// This is the main entry point for extpp. It takes a [`Config`] and runs extpp.
/// If an error occurs, it will be printed to stderr and the function will return [`Err`].
///
/// If you want to retrieve the error object instead of printing it, use [`Extpp::run`].
pub fn extpp(config: Config) -> std::result::Result<(), ()> {
    match Extpp::run(config) {
        Ok(_) => Ok(()),
        Err(e) => {
            eprintln!("{:?}", e);
            Err(())
        }
    }
}

/// The runtime state when executing extpp
#[derive(Debug)]
pub struct Extpp {
    /// The Config
    config: Config,
    /// The Progress reporter
    progress: Progress,
}

impl Extpp {
    /// Internal run function
    ///
    /// This is what [`extpp`] calls internally. The difference is that this function
    /// returns the error instead of printing it.
    pub fn run(config: Config) -> Result<(), ExecuteError> {
        log::info!("creating extpp");
        log::debug!("using config: {:?}", config);

        let progress = Progress::new(config.verbosity.clone());
        let runtime = Self { config, progress };
        runtime.run_internal()
    }

    fn run_internal(mut self) -> Result<(), ExecuteError> {
        let base_abs_path = AbsPath::try_from(self.config.base_dir.clone())
            .change_context(ExecuteError)
            .attach_printable("cannot resolve base directory")?;
        if self.config.inputs.is_empty() {
            return Err(Report::new(ExecuteError).attach_printable("no input files"));
        }
        let inputs = resolve_inputs(&self.config.inputs, &base_abs_path)
            .change_context(ExecuteError)
            .attach_printable("cannot resolve inputs")?;

        let line_ending = match inputs.first() {
            Some(first) => first
                .get_line_ending()
                .change_context(ExecuteError)
                .attach_printable("cannot detect line ending")?,
            None => OS_LINE_ENDING,
        };
        let settings = Settings::parse(&self.config.settings)
            .change_context(ExecuteError)
            .attach_printable("cannot parse plugin settings")?;
        let mut definitions: Definitions = self.config.definitions.iter().collect();
        if !self.config.definitions.is_empty() {
            let _ = self.progress.print_status(
                verbs::USING,
                &format!("definitions {}", definitions.defined_names().join(", ")),
                Color::Yellow,
                true,
            );
        }

        let mut files: Vec<Box<dyn Content>> = vec![];
        for input in &inputs {
            let _ = self
                .progress
                .print_status(verbs::LOADING, &input.to_string(), Color::Yellow, true);
            files.push(Box::new(PathContent::from_abs(input)));
        }

        let _ = self.progress.print_status(
            verbs::COMPILING,
            &format!("{} input file(s)", inputs.len()),
            Color::Green,
            false,
        );
        let mut pp = PreProcessor::with_default_plugins();
        let lines = pp
            .run(files, &settings, &mut definitions)
            .map_err(|e| {
                let _ = self
                    .progress
                    .print_status(verbs::FAILED, "", Color::Red, false);
                e.change_context(ExecuteError)
            })?;
        for key in pp.compiled_keys() {
            let _ = self
                .progress
                .print_status(verbs::ORDER, key, Color::Yellow, true);
        }

        let text = join_lines(&lines, line_ending, self.config.trailing_newline);
        match self.config.output.clone() {
            Some(output) => self.write_output(&base_abs_path, output, &text)?,
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout
                    .write_all(text.as_bytes())
                    .and_then(|_| stdout.flush())
                    .change_context(ExecuteError)
                    .attach_printable("cannot write to stdout")?;
            }
        }

        let _ = self.progress.print_status(
            verbs::DONE,
            &format!(
                "{} line(s) from {} file(s)",
                lines.len(),
                pp.compiled_keys().len()
            ),
            Color::Green,
            false,
        );
        Ok(())
    }

    fn write_output(
        &mut self,
        base_abs_path: &AbsPath,
        output: PathBuf,
        text: &str,
    ) -> Result<(), ExecuteError> {
        let output_path = base_abs_path.as_path().join(output);
        let _ = self.progress.print_status(
            verbs::WRITING,
            &output_path.display().to_string(),
            Color::Yellow,
            true,
        );
        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)
                .change_context(ExecuteError)
                .attach_printable_lazy(|| {
                    format!("cannot create output directory `{}`", parent.display())
                })?;
        }
        std::fs::write(&output_path, text)
            .change_context(ExecuteError)
            .attach_printable_lazy(|| {
                format!("cannot write output file `{}`", output_path.display())
            })?;
        log::info!("wrote {}", output_path.display());
        Ok(())
    }
}
