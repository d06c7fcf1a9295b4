use clap::Parser;
use extpp::{extpp, Config, Verbosity};
use std::path::PathBuf;

/// A staged, plugin-driven preprocessor for text files.
///
/// Compiles the input files, along with every file they include, into one output.
#[derive(Parser, Debug)]
#[command(name = "extpp")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input files, compiled together in this order
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output file. The output is written to stdout if not set
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Define a name before the run starts. Can be repeated
    #[arg(short = 'D', long = "define", value_name = "NAME")]
    definitions: Vec<String>,

    /// Plugin setting, as `prefix:flag=value` (e.g. `cond:if=@if`). Can be repeated
    #[arg(short = 's', long = "set", value_name = "SETTING")]
    settings: Vec<String>,

    /// Directory to resolve inputs and output from
    #[arg(short = 'C', long = "directory", default_value = ".")]
    base_dir: PathBuf,

    /// Don't print status
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print more status and debug logs
    #[arg(short, long)]
    verbose: bool,

    /// Don't end the output with a newline
    #[arg(long)]
    no_trailing_newline: bool,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        let verbosity = if cli.quiet {
            Verbosity::Quiet
        } else if cli.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };
        Self {
            base_dir: cli.base_dir,
            inputs: cli.inputs,
            output: cli.output,
            definitions: cli.definitions,
            settings: cli.settings,
            verbosity,
            trailing_newline: !cli.no_trailing_newline,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
    log::debug!("{:?}", cli);

    if extpp(cli.into()).is_err() {
        std::process::exit(1);
    }
}
