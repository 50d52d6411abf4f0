use crate::error::TemplateError;
use crate::tpl::engine::Template;
use dashmap::DashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::trace;

#[derive(Clone)]
struct CachedTemplate {
    template: Arc<Template>,
    content_hash: u64,
}

/// Compiled templates keyed by name; an entry is reused only while the source hash matches.
#[derive(Default)]
pub(crate) struct TemplateCache {
    entries: DashMap<String, CachedTemplate>,
}

impl TemplateCache {
    pub(crate) fn get_or_compile<F>(
        &self,
        name: &str,
        source: &str,
        compile: F,
    ) -> Result<Arc<Template>, TemplateError>
    where
        F: FnOnce() -> Result<Template, TemplateError>,
    {
        let mut hasher = DefaultHasher::new();
        source.hash(&mut hasher);
        let new_hash = hasher.finish();

        if let Some(cached) = self.entries.get(name) {
            if cached.content_hash == new_hash {
                trace!("template cache hit: name={}", name);
                return Ok(cached.template.clone());
            }
        }

        let template = Arc::new(compile()?);
        self.entries.insert(
            name.to_string(),
            CachedTemplate {
                template: template.clone(),
                content_hash: new_hash,
            },
        );
        Ok(template)
    }

    pub(crate) fn remove(&self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
