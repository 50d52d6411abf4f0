use crate::tpl::token::{Token, TokenType};

const TAG_LEN: usize = 2;

fn tag_kind(opening: &str) -> Option<(TokenType, &'static str)> {
    match opening {
        "{{" => Some((TokenType::Var, "}}")),
        "{%" => Some((TokenType::Block, "%}")),
        "{#" => Some((TokenType::Comment, "#}")),
        _ => None,
    }
}

/// Split template source into text, variable, block and comment tokens.
///
/// A tag never spans lines: an opening delimiter without a matching closer
/// on the same line is kept as text.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = source;
    let mut lineno = 1;
    let mut text = String::new();
    let mut text_line = lineno;

    while !rest.is_empty() {
        let tag = rest
            .get(..TAG_LEN)
            .and_then(tag_kind)
            .and_then(|(kind, closer)| {
                let line = rest[TAG_LEN..].split('\n').next().unwrap_or_default();
                line.find(closer).map(|end| (kind, end))
            });

        match tag {
            Some((kind, end)) => {
                if !text.is_empty() {
                    tokens.push(Token::new(TokenType::Text, std::mem::take(&mut text), text_line));
                }
                let inner = &rest[TAG_LEN..TAG_LEN + end];
                tokens.push(Token::new(kind, inner.trim(), lineno));
                rest = &rest[TAG_LEN + end + TAG_LEN..];
                text_line = lineno;
            }
            None => {
                // advance to the next '{' (skipping the current char)
                let skip = rest.chars().next().map_or(1, char::len_utf8);
                let next = rest[skip..].find('{').map_or(rest.len(), |n| n + skip);
                let chunk = &rest[..next];
                if text.is_empty() {
                    text_line = lineno;
                }
                text.push_str(chunk);
                lineno += chunk.matches('\n').count();
                rest = &rest[next..];
            }
        }
    }
    if !text.is_empty() {
        tokens.push(Token::new(TokenType::Text, text, text_line));
    }
    tokens
}
