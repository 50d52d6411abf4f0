pub mod defaulttags;
pub mod handlebars;

/// Strip one level of matching quotes, if any.
pub(crate) fn unquote(s: &str) -> Option<&str> {
    let first = s.chars().next()?;
    if (first == '"' || first == '\'') && s.len() >= 2 && s.ends_with(first) {
        Some(&s[1..s.len() - 1])
    } else {
        None
    }
}
