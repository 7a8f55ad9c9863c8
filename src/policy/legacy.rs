use ahash::AHashSet;

use crate::descriptor::LibraryDescriptor;

/// Modules that receive blanket leniency.
pub type LegacySet = AHashSet<String>;

/// Modules declared by at least one legacy library and by no strict one.
///
/// A strict declaration always wins, so the result does not depend on descriptor order.
pub fn legacy_modules(descriptors: &[LibraryDescriptor]) -> LegacySet {
    let (legacy, strict): (Vec<&LibraryDescriptor>, Vec<&LibraryDescriptor>) =
        descriptors.iter().partition(|descriptor| descriptor.legacy);

    let strict_modules = strict
        .iter()
        .flat_map(|descriptor| descriptor.modules.iter())
        .collect::<AHashSet<&String>>();

    legacy
        .iter()
        .flat_map(|descriptor| descriptor.modules.iter())
        .filter(|module| !strict_modules.contains(module))
        .cloned()
        .collect()
}
