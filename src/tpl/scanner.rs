use crate::error::TemplateError;
use crate::tpl::node::Segment;
use crate::tpl::parser::Parser;
use crate::tpl::token::TokenType;
use tracing::trace;

/// Consume tokens up to and including the `end_tag` block, keeping
/// client-side `{{ }}` syntax intact.
///
/// Javascript templating libraries (jQuery templates, Handlebars.js,
/// Mustache.js) use `{{if condition}} ... {{/if}}`, which the server-side
/// lexer has already split into variable tokens. Those are re-wrapped in
/// their braces; text passes through; comments are dropped; any other block
/// tag (`{% trans %}`, `{% csrf_token %}`, ...) is compiled through the
/// parser's tag library and rendered in place.
///
/// Only a block token equal to `end_tag` ends the scan; text that happens to
/// read `endverbatim` stays literal. Running out of tokens first is an
/// unclosed-tag error.
pub fn scan_verbatim(parser: &mut Parser<'_>, end_tag: &str) -> Result<Vec<Segment>, TemplateError> {
    let mut segments = Vec::new();

    loop {
        let Some(token) = parser.next_token() else {
            return Err(parser.unclosed_block_tag(&[end_tag]));
        };

        match token.token_type {
            TokenType::Block if token.contents == end_tag => break,
            TokenType::Var => append_literal(&mut segments, &format!("{{{{{}}}}}", token.contents)),
            TokenType::Text => append_literal(&mut segments, &token.contents),
            TokenType::Block => {
                if let Some(node) = parser.compile_block(&token, &[end_tag])? {
                    segments.push(Segment::Compiled(node));
                }
            }
            TokenType::Comment => {}
        }
    }

    trace!("verbatim scan done: end_tag={}, segments={}", end_tag, segments.len());
    Ok(segments)
}

fn append_literal(segments: &mut Vec<Segment>, text: &str) {
    if let Some(Segment::Literal(last)) = segments.last_mut() {
        last.push_str(text);
    } else {
        segments.push(Segment::Literal(text.to_string()));
    }
}
