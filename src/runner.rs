use anyhow::{Context, Result};
use std::fs;
use std::io::Write;

use crate::compiler::Compiler;
use crate::config::RunConfig;
use crate::descriptor;
use crate::diagnostics::DiagnosticsContext;
use crate::outcome::{MISSING_FAILURE_NOTICE, RunOutcome};
use crate::policy::{self, DiagnosticPolicy};
use crate::render;

/// Run one compilation and return the process exit code.
///
/// Configuration and I/O problems are returned as errors. Compiler diagnostics never are: they
/// only feed into the outcome.
pub fn run<C, W>(config: &RunConfig, compiler: &mut C, stderr: &mut W, colorize: bool) -> Result<i32>
where
    C: Compiler,
    W: Write,
{
    let descriptors = descriptor::read_descriptors(&config.infos)?;
    let global_suppressions = policy::resolve_global_suppressions(&config.suppress_codes)?;
    let policy = DiagnosticPolicy::new(&descriptors, global_suppressions)?;

    let mut diagnostics = DiagnosticsContext::new(&policy, &config.roots);
    let mut compiler_exit_nonzero = false;
    if compiler.should_run(&config.pass_through) {
        let exit_code = compiler.run(&config.pass_through, &mut diagnostics)?;
        log::debug!("Compiler exited with {}", exit_code);
        compiler_exit_nonzero = exit_code != 0;
    }
    log::info!(
        "{} error(s), {} warning(s), {} suppressed",
        diagnostics.error_count(),
        diagnostics.warning_count(),
        diagnostics.suppressed_count()
    );

    let outcome = RunOutcome {
        compiler_exit_nonzero,
        has_warnings_or_errors: diagnostics.has_errors(),
        expect_failure: config.expect_failure,
        expect_warnings: config.expect_warnings,
        checks_only: config.checks_only,
        outputs: config.outputs(),
    };

    if outcome.should_print_diagnostics() {
        for surfaced in diagnostics.surfaced() {
            writeln!(stderr, "{}", render::paint(&surfaced.text, Some(surfaced.severity), colorize))?;
        }
        if !diagnostics.surfaced().is_empty() {
            let summary = render::summary(diagnostics.error_count(), diagnostics.warning_count());
            writeln!(stderr, "{}", render::paint(&summary, None, colorize))?;
        }
        stderr.flush()?;
    }

    if let Some(output_errors) = &config.output_errors {
        let mut contents = diagnostics.output_lines().join("\n");
        if !contents.is_empty() {
            contents.push('\n');
        }
        fs::write(output_errors, contents)
            .with_context(|| format!("Could not write {}", output_errors.display()))?;
    }

    let decision = outcome.finalize()?;
    if decision.missing_expected_failure {
        writeln!(stderr, "{}", render::paint(MISSING_FAILURE_NOTICE, None, colorize))?;
    }

    Ok(decision.exit_code())
}
