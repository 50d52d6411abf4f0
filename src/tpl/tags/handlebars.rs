use crate::error::TemplateError;
use crate::tpl::node::{HandlebarsJsNode, HandlebarsNode, Node, VerbatimNode};
use crate::tpl::parser::Parser;
use crate::tpl::scanner::scan_verbatim;
use crate::tpl::token::Token;

/// `{% verbatim %} ... {% endverbatim %}`
pub fn verbatim(parser: &mut Parser<'_>, _token: &Token) -> Result<Box<dyn Node>, TemplateError> {
    let segments = scan_verbatim(parser, "endverbatim")?;
    Ok(Box::new(VerbatimNode::new(segments)))
}

/// `{% tplhandlebars "<id>" %} ... {% endtplhandlebars %}`
///
/// The body is consumed before the argument check so a recovered error
/// leaves the parser past the end tag.
pub fn tplhandlebars(parser: &mut Parser<'_>, token: &Token) -> Result<Box<dyn Node>, TemplateError> {
    let tag_name = token.command().unwrap_or("tplhandlebars");
    let segments = scan_verbatim(parser, &format!("end{}", tag_name))?;

    let bits = token.split_contents();
    let [_, template_id] = bits.as_slice() else {
        return Err(TemplateError::syntax(
            token.lineno,
            format!("{} tag requires exactly one argument", tag_name),
        ));
    };
    let template_id = strip_quote(template_id).to_string();
    Ok(Box::new(HandlebarsNode::new(template_id, segments)))
}

/// `{% handlebars_js %}`
pub fn handlebars_js(_parser: &mut Parser<'_>, token: &Token) -> Result<Box<dyn Node>, TemplateError> {
    if token.split_contents().len() > 1 {
        return Err(TemplateError::syntax(
            token.lineno,
            "handlebars_js tag takes no arguments",
        ));
    }
    Ok(Box::new(HandlebarsJsNode))
}

// A leading double quote drops the first and last characters.
fn strip_quote(s: &str) -> &str {
    match s.strip_prefix('"') {
        Some(rest) => {
            let mut chars = rest.chars();
            chars.next_back();
            chars.as_str()
        }
        None => s,
    }
}
