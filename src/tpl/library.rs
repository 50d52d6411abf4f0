use crate::error::TemplateError;
use crate::tpl::node::Node;
use crate::tpl::parser::Parser;
use crate::tpl::tags::{defaulttags, handlebars};
use crate::tpl::token::Token;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Compiles one block tag into a node; may consume further tokens from the parser.
pub type CompileFn =
    Arc<dyn Fn(&mut Parser<'_>, &Token) -> Result<Box<dyn Node>, TemplateError> + Send + Sync>;

/// Dispatch table from block tag names to their compile functions.
#[derive(Clone, Default)]
pub struct TagLibrary {
    tags: HashMap<String, CompileFn>,
}

impl TagLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// `verbatim`, `tplhandlebars`, `handlebars_js`, `csrf_token`, `trans` and `static`.
    pub fn with_builtins() -> Self {
        let mut library = Self::new();
        library.register("verbatim", handlebars::verbatim);
        library.register("tplhandlebars", handlebars::tplhandlebars);
        library.register("handlebars_js", handlebars::handlebars_js);
        library.register("csrf_token", defaulttags::csrf_token);
        library.register("trans", defaulttags::trans);
        library.register("static", defaulttags::static_url);
        library
    }

    pub fn register<F>(&mut self, name: &str, compile: F)
    where
        F: Fn(&mut Parser<'_>, &Token) -> Result<Box<dyn Node>, TemplateError>
            + Send
            + Sync
            + 'static,
    {
        self.tags.insert(name.to_string(), Arc::new(compile));
    }

    pub fn get(&self, name: &str) -> Option<&CompileFn> {
        self.tags.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }
}

impl fmt::Debug for TagLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.tags.keys().collect();
        names.sort();
        f.debug_struct("TagLibrary").field("tags", &names).finish()
    }
}
