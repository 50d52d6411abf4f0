/// Lexical category of a template fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Text,
    Var,
    Block,
    Comment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub token_type: TokenType,
    /// Delimiters and surrounding whitespace are stripped for everything but text.
    pub contents: String,
    pub lineno: usize,
}

impl Token {
    pub fn new(token_type: TokenType, contents: impl Into<String>, lineno: usize) -> Self {
        Token {
            token_type,
            contents: contents.into(),
            lineno,
        }
    }

    pub fn text(contents: impl Into<String>) -> Self {
        Self::new(TokenType::Text, contents, 1)
    }

    pub fn var(contents: impl Into<String>) -> Self {
        Self::new(TokenType::Var, contents, 1)
    }

    pub fn block(contents: impl Into<String>) -> Self {
        Self::new(TokenType::Block, contents, 1)
    }

    pub fn comment(contents: impl Into<String>) -> Self {
        Self::new(TokenType::Comment, contents, 1)
    }

    /// First whitespace-delimited word of the contents.
    pub fn command(&self) -> Option<&str> {
        self.contents.split_whitespace().next()
    }

    /// Split on whitespace, keeping quoted strings together.
    ///
    /// `tplhandlebars "my tpl"` becomes `["tplhandlebars", "\"my tpl\""]`. A
    /// backslash inside a quoted string escapes the next character.
    pub fn split_contents(&self) -> Vec<String> {
        let mut bits = Vec::new();
        let mut current = String::new();
        let mut quote: Option<char> = None;
        let mut chars = self.contents.chars();

        while let Some(c) = chars.next() {
            match quote {
                Some(q) => {
                    current.push(c);
                    if c == '\\' {
                        if let Some(escaped) = chars.next() {
                            current.push(escaped);
                        }
                    } else if c == q {
                        quote = None;
                    }
                }
                None if c.is_whitespace() => {
                    if !current.is_empty() {
                        bits.push(std::mem::take(&mut current));
                    }
                }
                None => {
                    if c == '"' || c == '\'' {
                        quote = Some(c);
                    }
                    current.push(c);
                }
            }
        }
        if !current.is_empty() {
            bits.push(current);
        }
        bits
    }
}
