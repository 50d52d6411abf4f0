use crate::error::TemplateError;
use crate::models::settings::Settings;
use crate::template_loader;
use crate::tpl::cache::TemplateCache;
use crate::tpl::lexer::tokenize;
use crate::tpl::library::TagLibrary;
use crate::tpl::node::{Node, NodeList};
use crate::tpl::parser::{CompileErrorHook, Parser};
use crate::tpl::render_context::Context;
use crate::tpl::serializer::to_value;
use crate::tpl::token::Token;
use std::sync::{Arc, LazyLock};
use std::time::Instant;
use tracing::debug;

/// Engine used by the module-level [`render_template`] and [`remove_template`].
pub static ENGINE: LazyLock<Engine> = LazyLock::new(|| Engine::new().with_settings(Settings::from_env()));

/// A compiled template.
#[derive(Debug)]
pub struct Template {
    name: String,
    nodes: NodeList,
}

impl Template {
    pub fn new(name: impl Into<String>, nodes: NodeList) -> Self {
        Template {
            name: name.into(),
            nodes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn render(&self, ctx: &mut Context<'_>) -> Result<String, TemplateError> {
        self.nodes.render(ctx)
    }
}

pub struct Engine {
    settings: Settings,
    library: TagLibrary,
    compile_error_hook: Option<CompileErrorHook>,
    cache: TemplateCache,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Default settings and the built-in tag library.
    pub fn new() -> Self {
        Engine {
            settings: Settings::default(),
            library: TagLibrary::with_builtins(),
            compile_error_hook: None,
            cache: TemplateCache::default(),
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_library(mut self, library: TagLibrary) -> Self {
        self.library = library;
        self
    }

    pub fn with_compile_error_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Token, &TemplateError) -> bool + Send + Sync + 'static,
    {
        self.compile_error_hook = Some(Arc::new(hook));
        self
    }

    pub fn register_tag<F>(&mut self, name: &str, compile: F)
    where
        F: Fn(&mut Parser<'_>, &Token) -> Result<Box<dyn Node>, TemplateError>
            + Send
            + Sync
            + 'static,
    {
        self.library.register(name, compile);
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Compile `source`, reusing the cached template for `name` while the source is unchanged.
    pub fn compile(&self, name: &str, source: &str) -> Result<Arc<Template>, TemplateError> {
        self.cache.get_or_compile(name, source, || {
            let start = Instant::now();
            let mut parser = Parser::new(tokenize(source), &self.library)
                .with_compile_error_hook(self.compile_error_hook.clone());
            let nodes = parser.parse(&[]);
            debug!(
                "compile template: name={}, elapsed_us={}, ok={}",
                name,
                start.elapsed().as_micros(),
                nodes.is_ok()
            );
            Ok(Template::new(name, nodes?))
        })
    }

    /// Compile (or fetch from cache) and render with `args` as the context root.
    pub fn render_template<T: serde::Serialize>(
        &self,
        name: &str,
        source: &str,
        args: &T,
    ) -> Result<String, TemplateError> {
        let template = self.compile(name, source)?;
        let value = to_value(args)?;
        let mut ctx = Context::new(&value, &self.settings);
        template.render(&mut ctx)
    }

    /// Render a template registered with [`template_loader`].
    pub fn render_named<T: serde::Serialize>(&self, name: &str, args: &T) -> Result<String, TemplateError> {
        let source = template_loader::find_template(name)
            .ok_or_else(|| TemplateError::TemplateNotFound(name.to_string()))?;
        self.render_template(name, &source, args)
    }

    /// Drop the cached compile of `name`.
    pub fn remove_template(&self, name: &str) -> bool {
        self.cache.remove(name)
    }
}

/// Render with the shared [`ENGINE`] (settings taken from the environment).
pub fn render_template<T: serde::Serialize>(
    template_name: &str,
    template_content: &str,
    args: &T,
) -> Result<String, TemplateError> {
    ENGINE.render_template(template_name, template_content, args)
}

/// Evict a template from the shared [`ENGINE`] cache.
pub fn remove_template(template_name: &str) -> bool {
    ENGINE.remove_template(template_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Page {
        name: String,
        csrf_token: String,
    }

    fn page() -> Page {
        Page {
            name: "<Ann>".into(),
            csrf_token: "t0k".into(),
        }
    }

    #[test]
    fn test_render_outside_verbatim_resolves_variables() {
        let engine = Engine::new();
        let out = engine
            .render_template("t_vars", "Hi {{ name }}!", &page())
            .unwrap();
        assert_eq!(out, "Hi &lt;Ann&gt;!");
    }

    #[test]
    fn test_render_verbatim_keeps_braces() {
        let engine = Engine::new();
        let out = engine
            .render_template("t_verbatim", "{{ name }}:{% verbatim %}{{ name }}{% endverbatim %}", &page())
            .unwrap();
        assert_eq!(out, "&lt;Ann&gt;:{{name}}");
    }

    #[test]
    fn test_compile_is_cached() {
        let engine = Engine::new();
        let a = engine.compile("t_cache", "x").unwrap();
        let b = engine.compile("t_cache", "x").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.name(), "t_cache");
        assert!(engine.remove_template("t_cache"));
        assert!(!engine.remove_template("t_cache"));
    }

    #[test]
    fn test_compile_error_hook() {
        let engine = Engine::new().with_compile_error_hook(|_token, err| err.is_syntax());
        let out = engine
            .render_template("t_hook", "{% verbatim %}a{% trans %}b{% endverbatim %}", &())
            .unwrap();
        assert_eq!(out, "ab");
    }

    #[test]
    fn test_register_custom_tag() {
        #[derive(Debug)]
        struct Shout;
        impl Node for Shout {
            fn render(&self, _ctx: &mut Context<'_>) -> Result<String, TemplateError> {
                Ok("!".into())
            }
        }

        let mut engine = Engine::new();
        engine.register_tag("shout", |_parser: &mut Parser<'_>, _token: &Token| {
            Ok(Box::new(Shout) as Box<dyn Node>)
        });
        let out = engine
            .render_template("t_custom", "{% verbatim %}{{a}}{% shout %}{% endverbatim %}", &())
            .unwrap();
        assert_eq!(out, "{{a}}!");
    }

    #[test]
    fn test_render_named_missing() {
        let err = Engine::new().render_named("no/such/template.html", &()).unwrap_err();
        assert_eq!(err, TemplateError::TemplateNotFound("no/such/template.html".into()));
    }
}
