use crate::error::TemplateError;
use crate::tpl::library::TagLibrary;
use crate::tpl::node::{Node, NodeList, TextNode, VariableNode};
use crate::tpl::token::{Token, TokenType};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

/// Decides whether a failed nested tag compilation may be skipped (`true`) or must abort the compile.
pub type CompileErrorHook = Arc<dyn Fn(&Token, &TemplateError) -> bool + Send + Sync>;

/// Front-poppable token queue owned by a single compile pass.
#[derive(Debug, Default)]
pub struct TokenQueue {
    tokens: VecDeque<Token>,
}

impl TokenQueue {
    pub fn new(tokens: Vec<Token>) -> Self {
        TokenQueue {
            tokens: tokens.into(),
        }
    }

    pub fn next_token(&mut self) -> Option<Token> {
        self.tokens.pop_front()
    }

    pub fn prepend_token(&mut self, token: Token) {
        self.tokens.push_front(token);
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

pub struct Parser<'l> {
    tokens: TokenQueue,
    library: &'l TagLibrary,
    compile_error_hook: Option<CompileErrorHook>,
    // (command, line) of the block tags currently being compiled
    command_stack: Vec<(String, usize)>,
}

impl<'l> Parser<'l> {
    pub fn new(tokens: Vec<Token>, library: &'l TagLibrary) -> Self {
        Parser {
            tokens: TokenQueue::new(tokens),
            library,
            compile_error_hook: None,
            command_stack: Vec::new(),
        }
    }

    pub fn with_compile_error_hook(mut self, hook: Option<CompileErrorHook>) -> Self {
        self.compile_error_hook = hook;
        self
    }

    pub fn library(&self) -> &'l TagLibrary {
        self.library
    }

    pub fn next_token(&mut self) -> Option<Token> {
        self.tokens.next_token()
    }

    pub fn prepend_token(&mut self, token: Token) {
        self.tokens.prepend_token(token);
    }

    pub fn remaining(&self) -> usize {
        self.tokens.len()
    }

    /// Parse nodes until a block tag whose command is in `parse_until`.
    ///
    /// The terminating token is left at the front of the queue. Running out of
    /// tokens with a non-empty `parse_until` is an unclosed-tag error.
    pub fn parse(&mut self, parse_until: &[&str]) -> Result<NodeList, TemplateError> {
        let mut nodes = NodeList::new();
        while let Some(token) = self.next_token() {
            match token.token_type {
                TokenType::Text => nodes.push(Box::new(TextNode::new(token.contents))),
                TokenType::Var => {
                    if token.contents.is_empty() {
                        return Err(TemplateError::syntax(token.lineno, "Empty variable tag"));
                    }
                    nodes.push(Box::new(VariableNode::new(token.contents)));
                }
                TokenType::Comment => {}
                TokenType::Block => {
                    if token.command().is_some_and(|c| parse_until.contains(&c)) {
                        self.prepend_token(token);
                        return Ok(nodes);
                    }
                    if let Some(node) = self.compile_block(&token, parse_until)? {
                        nodes.push(node);
                    }
                }
            }
        }
        if !parse_until.is_empty() {
            return Err(self.unclosed_block_tag(parse_until));
        }
        Ok(nodes)
    }

    /// Look up and run the compile function for a block token.
    ///
    /// `Ok(None)` means compilation failed but the error hook chose to skip the tag.
    pub fn compile_block(
        &mut self,
        token: &Token,
        parse_until: &[&str],
    ) -> Result<Option<Box<dyn Node>>, TemplateError> {
        let Some(command) = token.command() else {
            return Err(self.empty_block_tag(token));
        };
        let library = self.library;
        let Some(compile) = library.get(command) else {
            return Err(self.invalid_block_tag(token, command, parse_until));
        };

        self.command_stack.push((command.to_string(), token.lineno));
        let result = compile(self, token);
        self.command_stack.pop();

        match result {
            Ok(node) => Ok(Some(node)),
            Err(err) if err.is_syntax() && self.compile_function_error(token, &err) => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub fn empty_block_tag(&self, token: &Token) -> TemplateError {
        TemplateError::EmptyBlock { line: token.lineno }
    }

    pub fn invalid_block_tag(&self, token: &Token, command: &str, parse_until: &[&str]) -> TemplateError {
        TemplateError::InvalidBlock {
            line: token.lineno,
            command: command.to_string(),
            expected: parse_until.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Give the error hook a chance to swallow a failed tag compilation.
    pub fn compile_function_error(&self, token: &Token, err: &TemplateError) -> bool {
        let recovered = self
            .compile_error_hook
            .as_ref()
            .is_some_and(|hook| hook(token, err));
        debug!(
            "tag compile failed: line={}, tag={:?}, recovered={}, error={}",
            token.lineno, token.contents, recovered, err
        );
        recovered
    }

    /// Error for a block whose end tag never arrived; names the innermost open tag.
    pub fn unclosed_block_tag(&self, parse_until: &[&str]) -> TemplateError {
        let (tag, line) = match self.command_stack.last() {
            Some((command, line)) => (command.clone(), *line),
            None => {
                let first = parse_until.first().copied().unwrap_or_default();
                (first.strip_prefix("end").unwrap_or(first).to_string(), 0)
            }
        };
        TemplateError::Unclosed {
            line,
            tag,
            expected: parse_until.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::settings::Settings;
    use crate::tpl::lexer::tokenize;
    use crate::tpl::render_context::Context;
    use crate::tpl::value::Value;

    #[derive(Debug)]
    struct UpperNode(NodeList);

    impl Node for UpperNode {
        fn render(&self, ctx: &mut Context<'_>) -> Result<String, TemplateError> {
            Ok(self.0.render(ctx)?.to_uppercase())
        }
    }

    fn upper(parser: &mut Parser<'_>, _token: &Token) -> Result<Box<dyn Node>, TemplateError> {
        let body = parser.parse(&["endupper"])?;
        parser.next_token();
        Ok(Box::new(UpperNode(body)))
    }

    fn library() -> TagLibrary {
        let mut library = TagLibrary::with_builtins();
        library.register("upper", upper);
        library
    }

    fn render(source: &str, library: &TagLibrary) -> Result<String, TemplateError> {
        let mut parser = Parser::new(tokenize(source), library);
        let nodes = parser.parse(&[])?;
        let root = Value::Null;
        let settings = Settings::default();
        nodes.render(&mut Context::new(&root, &settings))
    }

    #[test]
    fn test_token_queue_order() {
        let mut q = TokenQueue::new(vec![Token::text("a"), Token::text("b")]);
        let a = q.next_token().unwrap();
        q.prepend_token(a);
        assert_eq!(q.len(), 2);
        assert_eq!(q.next_token().unwrap().contents, "a");
        assert_eq!(q.next_token().unwrap().contents, "b");
        assert!(q.next_token().is_none());
        assert!(q.is_empty());
    }

    #[test]
    fn test_parse_text_and_comment() {
        let out = render("a{# gone #}b", &library()).unwrap();
        assert_eq!(out, "ab");
    }

    #[test]
    fn test_parse_block_body() {
        let out = render("x{% upper %}abc{% endupper %}y", &library()).unwrap();
        assert_eq!(out, "xABCy");
    }

    #[test]
    fn test_parse_until_leaves_end_token() {
        let library = library();
        let mut parser = Parser::new(tokenize("a{% endupper %}b"), &library);
        let nodes = parser.parse(&["endupper"]).unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(parser.next_token().unwrap().contents, "endupper");
        assert_eq!(parser.remaining(), 1);
    }

    #[test]
    fn test_unclosed_block() {
        let err = render("\n{% upper %}abc", &library()).unwrap_err();
        assert_eq!(
            err,
            TemplateError::Unclosed {
                line: 2,
                tag: "upper".into(),
                expected: vec!["endupper".into()],
            }
        );
    }

    #[test]
    fn test_unknown_tag() {
        let err = render("{% nope 1 %}", &library()).unwrap_err();
        assert!(matches!(err, TemplateError::InvalidBlock { ref command, .. } if command == "nope"));
    }

    #[test]
    fn test_empty_block() {
        let err = render("{%  %}", &library()).unwrap_err();
        assert_eq!(err, TemplateError::EmptyBlock { line: 1 });
    }

    #[test]
    fn test_empty_variable() {
        let err = render("{{ }}", &library()).unwrap_err();
        assert!(err.is_syntax());
    }

    #[test]
    fn test_compile_error_hook_recovers() {
        let library = library();
        let hook: CompileErrorHook = Arc::new(|token: &Token, _err: &TemplateError| {
            token.contents.starts_with("trans")
        });
        let mut parser =
            Parser::new(tokenize("a{% trans %}b"), &library).with_compile_error_hook(Some(hook));
        let nodes = parser.parse(&[]).unwrap();
        assert_eq!(nodes.len(), 2);
    }

    #[test]
    fn test_compile_error_without_hook_propagates() {
        let err = render("a{% trans %}b", &library()).unwrap_err();
        assert!(err.is_syntax());
    }
}
