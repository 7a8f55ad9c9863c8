use ahash::{AHashMap, AHashSet};
use anyhow::{Result, anyhow};

use crate::descriptor::LibraryDescriptor;
use crate::diagnostics::{DiagnosticKind, kinds_for_suppress_code};

pub type SuppressionTable = AHashMap<String, AHashSet<DiagnosticKind>>;
pub type LabelTable = AHashMap<String, String>;

/// Per-module suppressions and owners, taken from strict libraries only.
#[derive(Debug, Default)]
pub struct SuppressionIndex {
    pub suppressions: SuppressionTable,
    pub labels: LabelTable,
}

impl SuppressionIndex {
    /// Index every strict descriptor.
    ///
    /// Fails on suppression codes the registry does not know, and when two strict libraries
    /// declare the same module with different suppressions.
    pub fn build(descriptors: &[LibraryDescriptor]) -> Result<Self> {
        let mut index = SuppressionIndex::default();

        for descriptor in descriptors.iter().filter(|descriptor| !descriptor.legacy) {
            if descriptor.modules.is_empty() {
                continue;
            }
            let kinds = resolve_suppressions(descriptor)?;

            for module in &descriptor.modules {
                if let Some(owner) = index.labels.get(module) {
                    let existing = index.suppressions.get(module).cloned().unwrap_or_default();
                    if existing != kinds {
                        return Err(anyhow!(
                            "Module \"{}\" is declared by both {} and {} with different suppressions. \
                             A module must have a single owner.",
                            module,
                            owner,
                            descriptor.label
                        ));
                    }
                    if owner != &descriptor.label {
                        log::debug!(
                            "Module \"{}\" is also declared by {}, keeping {} as owner",
                            module,
                            descriptor.label,
                            owner
                        );
                    }
                    continue;
                }

                index.labels.insert(module.to_owned(), descriptor.label.to_owned());
                if !kinds.is_empty() {
                    index.suppressions.insert(module.to_owned(), kinds.clone());
                }
            }
        }

        Ok(index)
    }
}

fn resolve_suppressions(descriptor: &LibraryDescriptor) -> Result<AHashSet<DiagnosticKind>> {
    let mut kinds = AHashSet::new();
    for code in &descriptor.suppressions {
        let resolved = kinds_for_suppress_code(code).ok_or_else(|| {
            anyhow!(
                "Unknown suppression code \"{}\" in the suppress attribute of {}",
                code,
                descriptor.label
            )
        })?;
        kinds.extend(resolved);
    }
    Ok(kinds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexes_strict_modules_only() {
        let index = SuppressionIndex::build(&[
            LibraryDescriptor::new("//a", &["m1", "m2"], &["JSC_USELESS_CODE"], false),
            LibraryDescriptor::new("//old", &["m3"], &["checkTypes"], true),
        ])
        .unwrap();

        assert_eq!(index.labels.get("m1").map(String::as_str), Some("//a"));
        assert_eq!(index.labels.get("m2").map(String::as_str), Some("//a"));
        assert!(!index.labels.contains_key("m3"));
        assert!(index.suppressions["m2"].contains(&DiagnosticKind::UselessCode));
        assert!(!index.suppressions.contains_key("m3"));
    }

    #[test]
    fn group_codes_expand() {
        let index =
            SuppressionIndex::build(&[LibraryDescriptor::new("//a", &["m"], &["deprecated"], false)])
                .unwrap();

        let kinds = &index.suppressions["m"];
        assert!(kinds.contains(&DiagnosticKind::DeprecatedProp));
        assert!(kinds.contains(&DiagnosticKind::DeprecatedClass));
        assert!(kinds.contains(&DiagnosticKind::DeprecatedName));
    }

    #[test]
    fn unknown_code_is_fatal() {
        let err =
            SuppressionIndex::build(&[LibraryDescriptor::new("//a", &["m"], &["JSC_TYPO"], false)])
                .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("JSC_TYPO"), "{message}");
        assert!(message.contains("//a"), "{message}");
    }

    #[test]
    fn unknown_code_on_legacy_library_is_ignored() {
        assert!(
            SuppressionIndex::build(&[LibraryDescriptor::new("//old", &["m"], &["JSC_TYPO"], true)])
                .is_ok()
        );
    }

    #[test]
    fn conflicting_owners_are_rejected() {
        let err = SuppressionIndex::build(&[
            LibraryDescriptor::new("//a", &["shared"], &["checkTypes"], false),
            LibraryDescriptor::new("//b", &["shared"], &[], false),
        ])
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("shared"), "{message}");
        assert!(message.contains("//a") && message.contains("//b"), "{message}");
    }

    #[test]
    fn agreeing_owners_keep_first_label() {
        let index = SuppressionIndex::build(&[
            LibraryDescriptor::new("//a", &["shared"], &["checkTypes"], false),
            LibraryDescriptor::new("//b", &["shared"], &["checkTypes"], false),
        ])
        .unwrap();
        assert_eq!(index.labels["shared"], "//a");
    }
}
