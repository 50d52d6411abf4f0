use anyhow::{Context, Result};
use dashmap::DashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tracing::debug;
use walkdir::WalkDir;

pub const TEMPLATE_EXTENSION: &str = "html";

pub type TemplateStore = DashMap<String, Arc<String>>;

static TEMPLATES: OnceLock<TemplateStore> = OnceLock::new();

fn store() -> &'static TemplateStore {
    TEMPLATES.get_or_init(DashMap::new)
}

/// Register an in-memory template source under `name`, replacing any previous one.
pub fn load(name: &str, data: &[u8]) -> Result<()> {
    let content = std::str::from_utf8(data)
        .with_context(|| format!("template '{}' is not valid UTF-8", name))?;
    if store()
        .insert(name.to_string(), Arc::new(content.to_string()))
        .is_some()
    {
        debug!("template replaced: name={}", name);
    }
    Ok(())
}

pub fn find_template(name: &str) -> Option<Arc<String>> {
    store().get(name).map(|v| v.value().clone())
}

pub fn unload(name: &str) -> bool {
    store().remove(name).is_some()
}

/// Recursively load every `*.html` file below `dir_path`.
///
/// Templates are registered under their `/`-separated path relative to
/// `dir_path`, e.g. `partials/row.html`. Returns the number of files loaded.
pub fn load_from_path(dir_path: &Path) -> Result<usize> {
    if !dir_path.is_dir() {
        anyhow::bail!("template directory not found: {}", dir_path.display());
    }

    let mut count = 0;
    for entry in WalkDir::new(dir_path).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", dir_path.display()))?;
        let path = entry.path();

        if path.is_file() && path.extension().is_some_and(|ext| ext == TEMPLATE_EXTENSION) {
            let name = template_name(dir_path, path)?;
            let data =
                fs::read(path).with_context(|| format!("failed to read template: {}", path.display()))?;
            load(&name, &data)?;
            count += 1;
        }
    }
    debug!("templates loaded: dir={}, count={}", dir_path.display(), count);
    Ok(count)
}

fn template_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(root)
        .with_context(|| format!("{} is outside {}", path.display(), root.display()))?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}
