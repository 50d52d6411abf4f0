use crate::error::TemplateError;
use crate::tpl::node::{Node, escape_html};
use crate::tpl::parser::Parser;
use crate::tpl::render_context::Context;
use crate::tpl::tags::unquote;
use crate::tpl::token::Token;
use tracing::debug;

#[derive(Debug)]
pub struct CsrfTokenNode;

impl Node for CsrfTokenNode {
    fn render(&self, ctx: &mut Context<'_>) -> Result<String, TemplateError> {
        match ctx.lookup("csrf_token").and_then(|v| v.as_str()) {
            Some("NOTPROVIDED") => Ok(String::new()),
            Some(token) => Ok(format!(
                "<input type=\"hidden\" name=\"csrfmiddlewaretoken\" value=\"{}\">",
                escape_html(token)
            )),
            None => {
                debug!("csrf_token used in template but the context did not provide the value");
                Ok(String::new())
            }
        }
    }
}

/// `{% csrf_token %}`
pub fn csrf_token(_parser: &mut Parser<'_>, _token: &Token) -> Result<Box<dyn Node>, TemplateError> {
    Ok(Box::new(CsrfTokenNode))
}

#[derive(Debug)]
enum Message {
    Literal(String),
    Variable(String),
}

#[derive(Debug)]
pub struct TransNode {
    message: Message,
}

impl Node for TransNode {
    fn render(&self, ctx: &mut Context<'_>) -> Result<String, TemplateError> {
        match &self.message {
            Message::Literal(text) => Ok(text.clone()),
            Message::Variable(path) => Ok(ctx
                .lookup(path)
                .map(|v| escape_html(&v.to_string()))
                .unwrap_or_default()),
        }
    }
}

/// `{% trans "text" %}` or `{% trans variable %}`
pub fn trans(_parser: &mut Parser<'_>, token: &Token) -> Result<Box<dyn Node>, TemplateError> {
    let bits = token.split_contents();
    let [_, arg] = bits.as_slice() else {
        return Err(TemplateError::syntax(
            token.lineno,
            "'trans' takes exactly one argument",
        ));
    };
    let message = match unquote(arg) {
        Some(text) => Message::Literal(text.to_string()),
        None => Message::Variable(arg.clone()),
    };
    Ok(Box::new(TransNode { message }))
}

#[derive(Debug)]
pub struct StaticNode {
    path: String,
}

impl Node for StaticNode {
    fn render(&self, ctx: &mut Context<'_>) -> Result<String, TemplateError> {
        Ok(format!("{}{}", ctx.settings().static_url, self.path))
    }
}

/// `{% static "js/app.js" %}`
pub fn static_url(_parser: &mut Parser<'_>, token: &Token) -> Result<Box<dyn Node>, TemplateError> {
    let bits = token.split_contents();
    let path = match bits.as_slice() {
        [_, arg] => unquote(arg),
        _ => None,
    };
    let Some(path) = path else {
        return Err(TemplateError::syntax(
            token.lineno,
            "'static' takes exactly one quoted path",
        ));
    };
    Ok(Box::new(StaticNode {
        path: path.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::settings::Settings;
    use crate::tpl::library::TagLibrary;
    use crate::tpl::lexer::tokenize;
    use crate::tpl::value::Value;
    use std::collections::HashMap;

    fn render(source: &str, root: &Value) -> Result<String, TemplateError> {
        let library = TagLibrary::with_builtins();
        let mut parser = Parser::new(tokenize(source), &library);
        let nodes = parser.parse(&[])?;
        let settings = Settings::new().static_url("/s/");
        nodes.render(&mut Context::new(root, &settings))
    }

    fn root(key: &str, value: Value) -> Value {
        let mut map = HashMap::new();
        map.insert(key.to_string(), value);
        Value::Map(map)
    }

    #[test]
    fn test_csrf_token() {
        let out = render("{% csrf_token %}", &root("csrf_token", Value::from("abc"))).unwrap();
        assert_eq!(
            out,
            "<input type=\"hidden\" name=\"csrfmiddlewaretoken\" value=\"abc\">"
        );
        assert_eq!(render("{% csrf_token %}", &Value::Null).unwrap(), "");
        assert_eq!(
            render("{% csrf_token %}", &root("csrf_token", Value::from("NOTPROVIDED"))).unwrap(),
            ""
        );
    }

    #[test]
    fn test_trans() {
        assert_eq!(render("{% trans \"Your name is\" %}", &Value::Null).unwrap(), "Your name is");
        assert_eq!(
            render("{% trans greeting %}", &root("greeting", Value::from("<hi>"))).unwrap(),
            "&lt;hi&gt;"
        );
        assert!(render("{% trans %}", &Value::Null).unwrap_err().is_syntax());
    }

    #[test]
    fn test_static() {
        assert_eq!(render("{% static 'app.js' %}", &Value::Null).unwrap(), "/s/app.js");
        assert!(render("{% static app.js %}", &Value::Null).is_err());
        assert!(render("{% static %}", &Value::Null).is_err());
    }
}
