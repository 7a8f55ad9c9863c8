//! Turning a finished compilation into an exit code and the output files the build system
//! expects to find.

use anyhow::Result;
use std::path::PathBuf;

use crate::helpers;

pub const MISSING_FAILURE_NOTICE: &str = "ERROR: Expected failure but didn't fail.";

/// Output files declared to the build system.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputObligations {
    pub js_output_file: Option<PathBuf>,
    pub source_map: Option<PathBuf>,
}

/// Everything known once the compiler is done.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutcome {
    pub compiler_exit_nonzero: bool,
    pub has_warnings_or_errors: bool,
    pub expect_failure: bool,
    pub expect_warnings: bool,
    pub checks_only: bool,
    pub outputs: OutputObligations,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub succeeded: bool,
    pub must_emit_empty_outputs: bool,
    /// The run was expected to fail but didn't.
    pub missing_expected_failure: bool,
}

impl Decision {
    pub fn exit_code(&self) -> i32 {
        if self.succeeded { 0 } else { 1 }
    }
}

impl RunOutcome {
    pub fn failed(&self) -> bool {
        self.compiler_exit_nonzero || self.has_warnings_or_errors
    }

    pub fn decide(&self) -> Decision {
        let failed = self.failed();
        Decision {
            succeeded: failed == self.expect_failure,
            must_emit_empty_outputs: (failed && self.expect_failure) || self.checks_only,
            missing_expected_failure: !failed && self.expect_failure,
        }
    }

    /// Test fixtures that expect failures or warnings keep their diagnostics off the terminal.
    pub fn should_print_diagnostics(&self) -> bool {
        !self.expect_failure && !self.expect_warnings
    }

    /// Decide, then make sure the declared outputs exist.
    ///
    /// The JS output is replaced by an empty file when the decision asks for it. The source map
    /// is created empty after every run if the compiler didn't write one.
    pub fn finalize(&self) -> Result<Decision> {
        let decision = self.decide();

        if decision.must_emit_empty_outputs
            && let Some(js_output_file) = &self.outputs.js_output_file
        {
            log::debug!("Writing empty output {}", js_output_file.display());
            helpers::write_empty_file(js_output_file)?;
        }

        if let Some(source_map) = &self.outputs.source_map
            && !source_map.exists()
        {
            log::debug!("Compiler did not write {}, creating it empty", source_map.display());
            helpers::write_empty_file(source_map)?;
        }

        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn outcome(failed: bool, expect_failure: bool) -> RunOutcome {
        RunOutcome {
            has_warnings_or_errors: failed,
            expect_failure,
            ..Default::default()
        }
    }

    #[test]
    fn clean_run_without_expectation_succeeds() {
        let decision = outcome(false, false).decide();
        assert!(decision.succeeded);
        assert!(!decision.must_emit_empty_outputs);
        assert!(!decision.missing_expected_failure);
        assert_eq!(decision.exit_code(), 0);
    }

    #[test]
    fn failing_run_without_expectation_fails() {
        let decision = outcome(true, false).decide();
        assert!(!decision.succeeded);
        assert!(!decision.must_emit_empty_outputs);
        assert_eq!(decision.exit_code(), 1);
    }

    #[test]
    fn expected_failure_succeeds_and_emits_outputs() {
        let decision = outcome(true, true).decide();
        assert!(decision.succeeded);
        assert!(decision.must_emit_empty_outputs);
        assert!(!decision.missing_expected_failure);
    }

    #[test]
    fn missing_expected_failure_fails_with_notice() {
        let decision = outcome(false, true).decide();
        assert!(!decision.succeeded);
        assert!(!decision.must_emit_empty_outputs);
        assert!(decision.missing_expected_failure);
        assert_eq!(decision.exit_code(), 1);
    }

    #[test]
    fn compiler_exit_status_counts_as_failure() {
        let outcome = RunOutcome {
            compiler_exit_nonzero: true,
            ..Default::default()
        };
        assert!(outcome.failed());
        assert!(!outcome.decide().succeeded);
    }

    #[test]
    fn checks_only_always_emits_outputs() {
        for failed in [false, true] {
            for expect_failure in [false, true] {
                for expect_warnings in [false, true] {
                    let outcome = RunOutcome {
                        expect_warnings,
                        checks_only: true,
                        ..outcome(failed, expect_failure)
                    };
                    assert!(outcome.decide().must_emit_empty_outputs);
                }
            }
        }
    }

    #[test]
    fn expectation_flags_silence_diagnostics() {
        assert!(outcome(true, false).should_print_diagnostics());
        assert!(!outcome(true, true).should_print_diagnostics());
        let warnings = RunOutcome {
            expect_warnings: true,
            ..Default::default()
        };
        assert!(!warnings.should_print_diagnostics());
    }

    #[test]
    fn source_map_exists_after_every_run() {
        for failed in [false, true] {
            for expect_failure in [false, true] {
                let dir = tempfile::tempdir().unwrap();
                let source_map = dir.path().join("out.js.map");
                let outcome = RunOutcome {
                    outputs: OutputObligations {
                        js_output_file: None,
                        source_map: Some(source_map.clone()),
                    },
                    ..outcome(failed, expect_failure)
                };

                outcome.finalize().unwrap();
                assert!(source_map.exists(), "failed={failed} expect_failure={expect_failure}");
            }
        }
    }

    #[test]
    fn existing_source_map_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let source_map = dir.path().join("out.js.map");
        fs::write(&source_map, "{\"version\":3}").unwrap();
        let outcome = RunOutcome {
            outputs: OutputObligations {
                js_output_file: None,
                source_map: Some(source_map.clone()),
            },
            ..Default::default()
        };

        outcome.finalize().unwrap();
        assert_eq!(fs::read_to_string(&source_map).unwrap(), "{\"version\":3}");
    }

    #[test]
    fn js_output_is_written_only_when_required() {
        let dir = tempfile::tempdir().unwrap();
        let js = dir.path().join("out.js");
        let outputs = OutputObligations {
            js_output_file: Some(js.clone()),
            source_map: None,
        };

        RunOutcome {
            outputs: outputs.clone(),
            ..outcome(true, false)
        }
        .finalize()
        .unwrap();
        assert!(!js.exists());

        RunOutcome {
            outputs,
            ..outcome(true, true)
        }
        .finalize()
        .unwrap();
        assert_eq!(fs::read(&js).unwrap().len(), 0);
    }
}
