use anyhow::{Result, anyhow};
use std::path::PathBuf;

use crate::outcome::OutputObligations;

/// Settings for one run, split out of the compiler's argument list.
///
/// Runner flags are removed from the argument list. A few compiler flags are read as well but
/// stay in [`RunConfig::pass_through`] because the compiler needs them too.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunConfig {
    pub infos: Vec<PathBuf>,
    pub suppress_codes: Vec<String>,
    pub output_errors: Option<PathBuf>,
    pub expect_failure: bool,
    pub expect_warnings: bool,
    pub export_test_functions: bool,
    pub disable_property_renaming: bool,
    pub dev_build: bool,

    // Compiler flags we read but don't consume.
    pub roots: Vec<PathBuf>,
    pub js_output_file: Option<PathBuf>,
    pub checks_only: bool,
    pub create_source_map: Option<PathBuf>,

    pub pass_through: Vec<String>,
}

impl RunConfig {
    pub fn from_args<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = RunConfig::default();
        let mut args = args.into_iter().peekable();

        while let Some(arg) = args.next() {
            let (flag, inline_value) = match arg.split_once('=') {
                Some((flag, value)) if flag.starts_with("--") => (flag.to_string(), Some(value.to_string())),
                _ => (arg.clone(), None),
            };

            match flag.as_str() {
                "--info" => {
                    let value = consume_value(&flag, inline_value, &mut args)?;
                    config.infos.push(PathBuf::from(value));
                }
                "--output_errors" => {
                    let value = consume_value(&flag, inline_value, &mut args)?;
                    config.output_errors = Some(PathBuf::from(value));
                }
                "--suppress" => {
                    let value = consume_value(&flag, inline_value, &mut args)?;
                    config.suppress_codes.push(value);
                }
                "--expect_failure" => config.expect_failure = bool_value(&flag, &inline_value)?,
                "--expect_warnings" => config.expect_warnings = bool_value(&flag, &inline_value)?,
                "--export_test_functions" => {
                    config.export_test_functions = bool_value(&flag, &inline_value)?
                }
                "--disable_property_renaming" => {
                    config.disable_property_renaming = bool_value(&flag, &inline_value)?
                }
                "--experimental_dev_build" => config.dev_build = bool_value(&flag, &inline_value)?,
                "--js_module_root" => {
                    if let Some(value) = peek_value(&inline_value, &mut args) {
                        config.roots.push(PathBuf::from(value));
                    }
                    config.pass_through.push(arg);
                }
                "--js_output_file" => {
                    if let Some(value) = peek_value(&inline_value, &mut args) {
                        config.js_output_file = Some(PathBuf::from(value));
                    }
                    config.pass_through.push(arg);
                }
                "--create_source_map" => {
                    if let Some(value) = peek_value(&inline_value, &mut args) {
                        config.create_source_map = Some(PathBuf::from(value));
                    }
                    config.pass_through.push(arg);
                }
                "--checks_only" => {
                    config.checks_only = bool_value(&flag, &inline_value)?;
                    config.pass_through.push(arg);
                }
                _ => config.pass_through.push(arg),
            }
        }

        Ok(config)
    }

    pub fn outputs(&self) -> OutputObligations {
        OutputObligations {
            js_output_file: self.js_output_file.clone(),
            source_map: self.create_source_map.clone(),
        }
    }
}

fn consume_value<I>(
    flag: &str,
    inline_value: Option<String>,
    args: &mut std::iter::Peekable<I>,
) -> Result<String>
where
    I: Iterator<Item = String>,
{
    inline_value
        .or_else(|| args.next())
        .ok_or_else(|| anyhow!("Missing value for {}", flag))
}

/// A bare boolean flag means `true`; `--flag=true` and `--flag=false` spell it out.
fn bool_value(flag: &str, inline_value: &Option<String>) -> Result<bool> {
    match inline_value.as_deref() {
        None => Ok(true),
        Some(value) => value
            .parse::<bool>()
            .map_err(|_| anyhow!("Invalid value for {}: {}", flag, value)),
    }
}

/// Value of a pass-through flag, left in place so the compiler still sees it.
fn peek_value<I>(inline_value: &Option<String>, args: &mut std::iter::Peekable<I>) -> Option<String>
where
    I: Iterator<Item = String>,
{
    inline_value.clone().or_else(|| args.peek().cloned())
}
