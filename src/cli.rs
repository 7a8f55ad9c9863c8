use std::path::PathBuf;

use clap::Parser;
use clap_verbosity_flag::{WarnLevel, Verbosity};

/// Runs the JavaScript compiler with build-graph aware diagnostic suppression.
///
/// Everything after the runner's own options is handed to the compiler, except for the runner
/// flags (`--info`, `--suppress`, `--output_errors`, `--expect_failure`, `--expect_warnings`,
/// `--export_test_functions`, `--disable_property_renaming`, `--experimental_dev_build`).
#[derive(Parser, Debug)]
#[command(version)]
pub struct Cli {
    /// Verbosity:
    /// -v -> Info
    /// -vv -> Debug
    /// -vvv -> Trace
    /// -q -> Error
    /// -qq -> Off.
    /// Default (/ no argument given): 'warn'
    #[command(flatten)]
    pub verbose: Verbosity<WarnLevel>,

    /// Path to the compiler executable.
    #[arg(long)]
    pub compiler: PathBuf,

    /// Don't colourise diagnostics.
    #[arg(long)]
    pub no_color: bool,

    /// Compiler and runner arguments, usually after `--`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}
