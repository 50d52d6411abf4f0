use crate::models::settings::Settings;
use crate::tpl::value::Value;

/// Variables and settings visible to nodes during a single render.
pub struct Context<'a> {
    root: &'a Value,
    settings: &'a Settings,
}

impl<'a> Context<'a> {
    pub fn new(root: &'a Value, settings: &'a Settings) -> Self {
        Self { root, settings }
    }

    pub fn settings(&self) -> &Settings {
        self.settings
    }

    pub fn lookup(&self, key: &str) -> Option<&Value> {
        // exact match first, so a key named "a.b" wins over a nested lookup
        if let Some(v) = self.get_from_scope(key) {
            return Some(v);
        }

        let (head, rest) = key.split_once('.')?;
        let head_value = self.get_from_scope(head)?;
        Self::resolve_path(head_value, rest)
    }

    fn get_from_scope(&self, key: &str) -> Option<&'a Value> {
        match self.root {
            Value::Map(m) => m.get(key),
            _ => None,
        }
    }

    fn resolve_path<'v>(mut current: &'v Value, path: &str) -> Option<&'v Value> {
        for part in path.split('.') {
            current = match current {
                Value::Map(m) => m.get(part)?,
                Value::List(items) => items.get(part.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }
}
