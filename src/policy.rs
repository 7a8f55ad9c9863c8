pub mod legacy;
pub mod suppressions;

use ahash::AHashSet;
use anyhow::{Result, anyhow};

use crate::descriptor::LibraryDescriptor;
use crate::diagnostics::{DiagnosticKind, kinds_for_suppress_code};
use legacy::LegacySet;
use suppressions::{LabelTable, SuppressionIndex, SuppressionTable};

/// Attribution used for modules no strict library claims.
pub const UNKNOWN_MODULE: &str = "unknown module";

/// Which diagnostics are suppressed for which module.
///
/// Built once from the descriptors of the whole transitive closure plus the run-wide
/// suppressions, then only read.
#[derive(Debug, Default)]
pub struct DiagnosticPolicy {
    legacy_modules: LegacySet,
    suppressions: SuppressionTable,
    labels: LabelTable,
    global_suppressions: AHashSet<DiagnosticKind>,
}

impl DiagnosticPolicy {
    pub fn new(
        descriptors: &[LibraryDescriptor],
        global_suppressions: AHashSet<DiagnosticKind>,
    ) -> Result<Self> {
        let legacy_modules = legacy::legacy_modules(descriptors);
        let SuppressionIndex { suppressions, labels } = SuppressionIndex::build(descriptors)?;

        log::debug!(
            "Diagnostic policy: {} legacy modules, {} modules with suppressions, {} global suppressions",
            legacy_modules.len(),
            suppressions.len(),
            global_suppressions.len()
        );

        Ok(Self {
            legacy_modules,
            suppressions,
            labels,
            global_suppressions,
        })
    }

    /// Whether `kind` reported on `module` is suppressed.
    ///
    /// Global suppressions are checked first, then legacy leniency, then the module's own list.
    pub fn is_suppressed(&self, module: &str, kind: DiagnosticKind) -> bool {
        if self.global_suppressions.contains(&kind) {
            return true;
        }
        if self.is_legacy(module) {
            return true;
        }
        self.suppressions
            .get(module)
            .is_some_and(|kinds| kinds.contains(&kind))
    }

    pub fn is_legacy(&self, module: &str) -> bool {
        self.legacy_modules.contains(module)
    }

    /// Label of the strict library that owns `module`.
    pub fn label_for(&self, module: &str) -> Option<&str> {
        self.labels.get(module).map(String::as_str)
    }

    /// Human readable owner of `module`, falling back to [`UNKNOWN_MODULE`].
    pub fn attribution(&self, module: &str) -> &str {
        self.label_for(module).unwrap_or(UNKNOWN_MODULE)
    }
}

/// Resolve `--suppress` codes into the run-wide suppression set.
pub fn resolve_global_suppressions(codes: &[String]) -> Result<AHashSet<DiagnosticKind>> {
    let mut kinds = AHashSet::new();
    for code in codes {
        let resolved = kinds_for_suppress_code(code)
            .ok_or_else(|| anyhow!("Unknown suppression code \"{}\" passed to --suppress", code))?;
        kinds.extend(resolved);
    }
    Ok(kinds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(descriptors: &[LibraryDescriptor], global: &[DiagnosticKind]) -> DiagnosticPolicy {
        DiagnosticPolicy::new(descriptors, global.iter().copied().collect()).unwrap()
    }

    #[test]
    fn global_suppression_applies_to_strict_module_without_suppressions() {
        let policy = policy(
            &[LibraryDescriptor::new("//a", &["m1"], &[], false)],
            &[DiagnosticKind::MissingJsDoc],
        );
        assert!(policy.is_suppressed("m1", DiagnosticKind::MissingJsDoc));
        assert!(policy.is_suppressed("elsewhere", DiagnosticKind::MissingJsDoc));
        assert!(!policy.is_suppressed("m1", DiagnosticKind::TypeMismatch));
    }

    #[test]
    fn legacy_module_suppresses_every_kind() {
        let policy = policy(&[LibraryDescriptor::new("//old", &["m2"], &[], true)], &[]);
        for kind in DiagnosticKind::ALL {
            assert!(policy.is_suppressed("m2", kind), "{kind} not suppressed");
        }
    }

    #[test]
    fn itemized_suppression_is_scoped_to_its_module() {
        let policy = policy(
            &[
                LibraryDescriptor::new("//a", &["m1"], &["JSC_TYPE_MISMATCH"], false),
                LibraryDescriptor::new("//b", &["m3"], &[], false),
            ],
            &[],
        );
        assert!(policy.is_suppressed("m1", DiagnosticKind::TypeMismatch));
        assert!(!policy.is_suppressed("m3", DiagnosticKind::TypeMismatch));
        assert!(!policy.is_suppressed("m1", DiagnosticKind::UselessCode));
    }

    #[test]
    fn strict_owner_removes_legacy_leniency() {
        let policy = policy(
            &[
                LibraryDescriptor::new("//new", &["shared"], &[], false),
                LibraryDescriptor::new("//old", &["shared"], &[], true),
            ],
            &[],
        );
        assert!(!policy.is_legacy("shared"));
        assert!(!policy.is_suppressed("shared", DiagnosticKind::TypeMismatch));
    }

    #[test]
    fn attribution_falls_back_to_unknown_module() {
        let policy = policy(
            &[
                LibraryDescriptor::new("//a", &["m1"], &[], false),
                LibraryDescriptor::new("//old", &["m2"], &[], true),
            ],
            &[],
        );
        assert_eq!(policy.attribution("m1"), "//a");
        assert_eq!(policy.attribution("m2"), UNKNOWN_MODULE);
        assert_eq!(policy.attribution(""), UNKNOWN_MODULE);
    }

    #[test]
    fn global_codes_resolve_or_fail() {
        let kinds =
            resolve_global_suppressions(&["lintChecks".to_string(), "JSC_USELESS_CODE".to_string()])
                .unwrap();
        assert!(kinds.contains(&DiagnosticKind::MissingSemicolon));
        assert!(kinds.contains(&DiagnosticKind::UselessCode));

        let err = resolve_global_suppressions(&["nope".to_string()]).unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn policy_is_shareable_across_threads() {
        fn assert_sync<T: Send + Sync>() {}
        assert_sync::<DiagnosticPolicy>();
    }
}
