use anyhow::{Context, Result};
use regex::Regex;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

use crate::config::RunConfig;
use crate::diagnostics::{Diagnostic, DiagnosticsContext, Severity};

/// The compiler that does the actual work.
///
/// Implementations report every diagnostic they produce to the context, which applies the
/// suppression policy, and return the compiler's exit status.
pub trait Compiler {
    /// `--help` and `--version` invocations don't compile anything.
    fn should_run(&self, args: &[String]) -> bool {
        !args.iter().any(|arg| arg == "--help" || arg == "--version")
    }

    fn run(&mut self, args: &[String], diagnostics: &mut DiagnosticsContext) -> Result<i32>;
}

/// Runner options that change how the compiler is invoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompilerOptions {
    pub export_test_functions: bool,
    pub disable_property_renaming: bool,
    pub dev_build: bool,
}

impl From<&RunConfig> for CompilerOptions {
    fn from(config: &RunConfig) -> Self {
        Self {
            export_test_functions: config.export_test_functions,
            disable_property_renaming: config.disable_property_renaming,
            dev_build: config.dev_build,
        }
    }
}

/// Runs an external compiler executable and reads diagnostics from its stderr.
pub struct ProcessCompiler {
    executable: PathBuf,
    options: CompilerOptions,
}

impl ProcessCompiler {
    pub fn new(executable: &Path, options: CompilerOptions) -> Self {
        Self {
            executable: executable.to_path_buf(),
            options,
        }
    }

    /// Pass-through arguments plus the flags implied by the runner options.
    pub fn command_args(&self, args: &[String]) -> Vec<String> {
        let mut command_args = args.to_vec();
        if self.options.export_test_functions {
            command_args.push("--export_test_functions".to_string());
        }
        if self.options.disable_property_renaming {
            command_args.push("--property_renaming=OFF".to_string());
        }
        if self.options.dev_build {
            command_args.push("--compilation_level=WHITESPACE_ONLY".to_string());
        }
        command_args
    }
}

impl Compiler for ProcessCompiler {
    fn run(&mut self, args: &[String], diagnostics: &mut DiagnosticsContext) -> Result<i32> {
        let command_args = self.command_args(args);
        log::debug!(
            "Running {} with {} arguments",
            self.executable.display(),
            command_args.len()
        );

        let output = Command::new(&self.executable)
            .args(&command_args)
            .output()
            .with_context(|| format!("Could not run compiler {}", self.executable.display()))?;

        std::io::stdout().write_all(&output.stdout)?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        let parsed = parse_compiler_output(&stderr);
        let explained = parsed
            .iter()
            .any(|diagnostic| diagnostic.severity == Severity::Error);
        for diagnostic in parsed {
            diagnostics.report(diagnostic);
        }

        // A compiler killed by a signal has no code.
        let exit_code = output.status.code().unwrap_or(1);
        // The compiler doesn't know what was suppressed. A failure explained by parsed errors is
        // decided by what the diagnostics context surfaced.
        if exit_code != 0 && explained {
            log::debug!(
                "Compiler exited with {} after reporting errors; deferring to surfaced diagnostics",
                exit_code
            );
            return Ok(0);
        }
        Ok(exit_code)
    }
}

fn header_regex() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    HEADER.get_or_init(|| {
        Regex::new(
            r"^(?:(?P<file>[^\s:][^:]*?)(?::(?P<line>\d+)(?::(?P<column>\d+))?)?: )?(?P<severity>ERROR|WARNING) - (?:\[(?P<key>[A-Za-z0-9_]+)\] )?(?P<message>.*)$",
        )
        .expect("valid header regex")
    })
}

fn summary_regex() -> &'static Regex {
    static SUMMARY: OnceLock<Regex> = OnceLock::new();
    SUMMARY.get_or_init(|| {
        Regex::new(r"^\d+ error\(s\), \d+ warning\(s\)").expect("valid summary regex")
    })
}

/// Split compiler stderr into diagnostics.
///
/// Lines after a diagnostic header belong to that diagnostic until the next header, a blank
/// line or the summary line.
pub fn parse_compiler_output(stderr: &str) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let mut in_diagnostic = false;

    for line in stderr.lines() {
        if let Some(captures) = header_regex().captures(line) {
            let severity = match &captures["severity"] {
                "ERROR" => Severity::Error,
                _ => Severity::Warning,
            };
            let mut diagnostic = Diagnostic::new(
                severity,
                captures.name("key").map(|key| key.as_str()),
                &captures["message"],
            );
            diagnostic.file = captures.name("file").map(|file| PathBuf::from(file.as_str()));
            diagnostic.line = captures.name("line").and_then(|line| line.as_str().parse().ok());
            diagnostic.column = captures
                .name("column")
                .and_then(|column| column.as_str().parse().ok());
            diagnostics.push(diagnostic);
            in_diagnostic = true;
        } else if summary_regex().is_match(line) {
            in_diagnostic = false;
        } else if line.trim().is_empty() {
            in_diagnostic = false;
        } else if in_diagnostic && let Some(last) = diagnostics.last_mut() {
            last.excerpt.push(line.to_string());
        } else {
            log::info!("{}", line);
        }
    }

    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::LibraryDescriptor;
    use crate::policy::DiagnosticPolicy;
    use ahash::AHashSet;

    #[test]
    fn parses_located_diagnostics_with_excerpts() {
        let stderr = "\
foo/bar.js:12:4: ERROR - [JSC_TYPE_MISMATCH] initializing variable
found   : string
required: number
var x = 'a';
        ^^^

foo/baz.js:3: WARNING - [JSC_USELESS_CODE] Suspicious code.

2 error(s), 1 warning(s)
";
        let diagnostics = parse_compiler_output(stderr);
        assert_eq!(diagnostics.len(), 2);

        let first = &diagnostics[0];
        assert_eq!(first.severity, Severity::Error);
        assert_eq!(first.key.as_deref(), Some("JSC_TYPE_MISMATCH"));
        assert_eq!(first.file, Some(PathBuf::from("foo/bar.js")));
        assert_eq!(first.line, Some(12));
        assert_eq!(first.column, Some(4));
        assert_eq!(first.message, "initializing variable");
        assert_eq!(first.excerpt.len(), 4);

        let second = &diagnostics[1];
        assert_eq!(second.severity, Severity::Warning);
        assert_eq!(second.line, Some(3));
        assert_eq!(second.column, None);
        assert!(second.excerpt.is_empty());
    }

    #[test]
    fn parses_diagnostics_without_location_or_key() {
        let diagnostics = parse_compiler_output("ERROR - [JSC_MISSING_PROVIDE_ERROR] required \"x\"\nERROR - oops\n");
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].file, None);
        assert_eq!(diagnostics[0].key.as_deref(), Some("JSC_MISSING_PROVIDE_ERROR"));
        assert_eq!(diagnostics[1].key, None);
        assert_eq!(diagnostics[1].message, "oops");
    }

    #[test]
    fn ignores_chatter_outside_diagnostics() {
        let diagnostics = parse_compiler_output("Compiling 3 files\n\n0 error(s), 0 warning(s)\n");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn runner_options_become_compiler_flags() {
        let compiler = ProcessCompiler::new(
            Path::new("compiler"),
            CompilerOptions {
                export_test_functions: true,
                disable_property_renaming: true,
                dev_build: false,
            },
        );
        assert_eq!(
            compiler.command_args(&["--js".to_string(), "a.js".to_string()]),
            vec!["--js", "a.js", "--export_test_functions", "--property_renaming=OFF"]
        );
    }

    fn script(dir: &Path, body: &str) -> String {
        let path = dir.join("compiler.sh");
        std::fs::write(&path, body).unwrap();
        path.display().to_string()
    }

    fn run_script(body: &str, descriptors: &[LibraryDescriptor]) -> (i32, usize) {
        let dir = tempfile::tempdir().unwrap();
        let script = script(dir.path(), body);
        let policy = DiagnosticPolicy::new(descriptors, AHashSet::new()).unwrap();
        let mut diagnostics = DiagnosticsContext::new(&policy, &[]);
        let mut compiler = ProcessCompiler::new(Path::new("sh"), CompilerOptions::default());
        let exit_code = compiler.run(&[script], &mut diagnostics).unwrap();
        (exit_code, diagnostics.error_count())
    }

    #[test]
    fn failure_explained_by_suppressed_errors_is_not_reported() {
        let body = "cat >&2 <<'EOF'\nm1.js:1: ERROR - [JSC_TYPE_MISMATCH] bad types\n\n1 error(s), 0 warning(s)\nEOF\nexit 1\n";
        let descriptors = [LibraryDescriptor::new("//a", &["m1"], &["checkTypes"], false)];

        let (exit_code, errors) = run_script(body, &descriptors);
        assert_eq!(exit_code, 0);
        assert_eq!(errors, 0);
    }

    #[test]
    fn failure_explained_by_surfaced_errors_is_left_to_the_context() {
        let body = "echo 'm1.js:1: ERROR - [JSC_TYPE_MISMATCH] bad types' >&2\nexit 1\n";

        let (exit_code, errors) = run_script(body, &[]);
        assert_eq!(exit_code, 0);
        assert_eq!(errors, 1);
    }

    #[test]
    fn unexplained_failure_keeps_its_exit_code() {
        let body = "echo 'java.lang.OutOfMemoryError' >&2\nexit 3\n";

        let (exit_code, errors) = run_script(body, &[]);
        assert_eq!(exit_code, 3);
        assert_eq!(errors, 0);
    }

    #[test]
    fn warnings_do_not_explain_a_failure() {
        let body = "echo 'm1.js:1: WARNING - [JSC_USELESS_CODE] useless' >&2\nexit 1\n";

        let (exit_code, _) = run_script(body, &[]);
        assert_eq!(exit_code, 1);
    }

    #[test]
    fn help_and_version_skip_compilation() {
        let compiler = ProcessCompiler::new(Path::new("compiler"), CompilerOptions::default());
        assert!(!compiler.should_run(&["--help".to_string()]));
        assert!(!compiler.should_run(&["--version".to_string()]));
        assert!(compiler.should_run(&["--js".to_string(), "a.js".to_string()]));
    }
}
