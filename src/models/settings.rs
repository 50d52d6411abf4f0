use serde::Deserialize;

pub const DEFAULT_STATIC_URL: &str = "/static/";

/// Render-time configuration read by the Handlebars tags.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Prefix for static assets, e.g. `/static/` or `https://cdn.example.com/`
    pub static_url: String,
    /// Emit `data-template-name` / `text/x-handlebars` (Ember.js) instead of `id` / `text/x-handlebars-template`
    pub use_ember_style_attrs: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            static_url: DEFAULT_STATIC_URL.to_string(),
            use_ember_style_attrs: false,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by the `STATIC_URL` and `USE_EMBER_STYLE_ATTRS` environment variables.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Ok(url) = std::env::var("STATIC_URL") {
            settings.static_url = url;
        }
        if let Ok(flag) = std::env::var("USE_EMBER_STYLE_ATTRS") {
            settings.use_ember_style_attrs = parse_flag(&flag);
        }
        settings
    }

    pub fn static_url(mut self, static_url: impl Into<String>) -> Self {
        self.static_url = static_url.into();
        self
    }

    pub fn use_ember_style_attrs(mut self, enabled: bool) -> Self {
        self.use_ember_style_attrs = enabled;
        self
    }
}

pub(crate) fn parse_flag(s: &str) -> bool {
    matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::new();
        assert_eq!(s.static_url, "/static/");
        assert!(!s.use_ember_style_attrs);
    }

    #[test]
    fn test_builder() {
        let s = Settings::new()
            .static_url("https://cdn.example.com/")
            .use_ember_style_attrs(true);
        assert_eq!(s.static_url, "https://cdn.example.com/");
        assert!(s.use_ember_style_attrs);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" YES "));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_deserialize_partial() {
        let s: Settings = serde_json::from_str(r#"{"use_ember_style_attrs": true}"#).unwrap();
        assert_eq!(s.static_url, DEFAULT_STATIC_URL);
        assert!(s.use_ember_style_attrs);
    }
}
