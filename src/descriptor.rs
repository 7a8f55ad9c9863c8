use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Build metadata written by one library target in the transitive closure.
///
/// On disk this is a JSON object:
///
/// ```json
/// {"label": "//foo:bar", "modules": ["foo/bar"], "suppress": ["checkTypes"], "legacy": false}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryDescriptor {
    /// Label of the owning build target.
    pub label: String,
    /// Module names defined by this target.
    #[serde(default)]
    pub modules: Vec<String>,
    /// Suppression codes the owner opted into for its own modules.
    #[serde(default, alias = "suppress")]
    pub suppressions: Vec<String>,
    /// Set for targets that predate strict checking.
    #[serde(default)]
    pub legacy: bool,
}

impl LibraryDescriptor {
    pub fn new(label: &str, modules: &[&str], suppressions: &[&str], legacy: bool) -> Self {
        Self {
            label: label.to_string(),
            modules: modules.iter().map(|module| module.to_string()).collect(),
            suppressions: suppressions.iter().map(|code| code.to_string()).collect(),
            legacy,
        }
    }
}

pub fn read_descriptor(path: &Path) -> Result<LibraryDescriptor> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Could not read library info {}", path.display()))?;
    let descriptor: LibraryDescriptor = serde_json::from_str(&contents)
        .with_context(|| format!("Malformed library info {}", path.display()))?;

    if descriptor.label.trim().is_empty() {
        return Err(anyhow!("Malformed library info {}: empty label", path.display()));
    }
    Ok(descriptor)
}

/// Read every descriptor, failing on the first one that can't be loaded.
pub fn read_descriptors(paths: &[PathBuf]) -> Result<Vec<LibraryDescriptor>> {
    let descriptors = paths
        .iter()
        .map(|path| read_descriptor(path))
        .collect::<Result<Vec<LibraryDescriptor>>>()?;
    log::debug!("Loaded {} library descriptors", descriptors.len());
    Ok(descriptors)
}
