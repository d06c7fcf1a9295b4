use std::path::PathBuf;

/// Config for running extpp
///
/// Use this to configure extpp when calling it from the library
/// # Example
/// ```no_run
/// use extpp::{Extpp, Config, Verbosity};
///
/// let mut cfg = Config::default();
/// cfg.inputs = vec!["main.txt".to_string()];
/// cfg.output = Some("main.out.txt".into());
/// cfg.definitions = vec!["DEBUG".to_string()];
/// cfg.verbosity = Verbosity::Verbose;
/// Extpp::run(cfg).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Base directory for resolving inputs and output. This is usually the current directory.
    pub base_dir: PathBuf,
    /// The input files, compiled together in this order
    pub inputs: Vec<String>,
    /// The output file, relative to the base directory. `None` writes to stdout
    pub output: Option<PathBuf>,
    /// Names defined before the run starts
    pub definitions: Vec<String>,
    /// Plugin settings, as `prefix:flag=value`
    pub settings: Vec<String>,
    /// The verbosity. See [`Verbosity`]
    pub verbosity: Verbosity,
    /// If the output should have trailing newline
    pub trailing_newline: bool,
}

impl Default for Config {
    /// Get the default config.
    ///
    /// This means:
    /// - Running from the current directory
    /// - No inputs
    /// - Writing to stdout
    /// - No predefined names or plugin settings
    /// - Regular verbosity
    /// - Output has trailing newline
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            inputs: vec![],
            output: None,
            definitions: vec![],
            settings: vec![],
            verbosity: Verbosity::Normal,
            trailing_newline: true,
        }
    }
}

/// The verbosity config options
#[derive(Debug, PartialEq, Clone)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}
