use anyhow::{Context, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};

const SOURCE_EXTENSIONS: [&str; 4] = ["js", "mjs", "jsx", "ts"];

/// Module name for a source file, as declared in library descriptors.
///
/// The longest module root that prefixes the path is stripped, then the source extension.
/// `./` components are ignored on both sides, separators are always `/`.
pub fn module_name_for_path(file: &Path, roots: &[PathBuf]) -> String {
    let file = normalize(file);
    let stripped = roots
        .iter()
        .map(|root| normalize(root))
        .filter(|root| !root.as_os_str().is_empty() && file.starts_with(root))
        .max_by_key(|root| root.components().count())
        .and_then(|root| file.strip_prefix(&root).ok().map(Path::to_path_buf));
    let relative = stripped.unwrap_or(file);

    let relative = match relative.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if SOURCE_EXTENSIONS.contains(&ext) => relative.with_extension(""),
        _ => relative,
    };

    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect::<Vec<String>>()
        .join("/")
}

fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect()
}

/// Create (or truncate) a file so that it exists with zero bytes.
pub fn write_empty_file(path: &Path) -> Result<()> {
    fs::write(path, b"").with_context(|| format!("Could not write {}", path.display()))
}
