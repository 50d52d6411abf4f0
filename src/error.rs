use thiserror::Error;

/// Errors raised while compiling or rendering a template.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    #[error("Syntax error on line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("Empty block tag on line {line}")]
    EmptyBlock { line: usize },
    #[error("Invalid block tag on line {line}: '{command}'{}", expected_suffix(.expected))]
    InvalidBlock {
        line: usize,
        command: String,
        expected: Vec<String>,
    },
    #[error("Unclosed tag on line {line}: '{tag}'. Looking for one of: {}.", .expected.join(", "))]
    Unclosed {
        line: usize,
        tag: String,
        expected: Vec<String>,
    },
    #[error("Render error: {0}")]
    Render(String),
    #[error("Value error: {0}")]
    Value(String),
    #[error("Template not found: {0}")]
    TemplateNotFound(String),
}

impl TemplateError {
    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        TemplateError::Syntax {
            line,
            message: message.into(),
        }
    }

    /// Whether the error belongs to the compile phase (any syntax-class error).
    pub fn is_syntax(&self) -> bool {
        matches!(
            self,
            TemplateError::Syntax { .. }
                | TemplateError::EmptyBlock { .. }
                | TemplateError::InvalidBlock { .. }
                | TemplateError::Unclosed { .. }
        )
    }
}

fn expected_suffix(expected: &[String]) -> String {
    if expected.is_empty() {
        ". Did you forget to register or load this tag?".to_string()
    } else {
        format!(", expected {}", expected.join(" or "))
    }
}

impl serde::ser::Error for TemplateError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        TemplateError::Value(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unclosed_message() {
        let err = TemplateError::Unclosed {
            line: 3,
            tag: "verbatim".into(),
            expected: vec!["endverbatim".into()],
        };
        assert_eq!(
            err.to_string(),
            "Unclosed tag on line 3: 'verbatim'. Looking for one of: endverbatim."
        );
        assert!(err.is_syntax());
    }

    #[test]
    fn test_invalid_block_message() {
        let err = TemplateError::InvalidBlock {
            line: 1,
            command: "bogus".into(),
            expected: vec![],
        };
        assert!(err.to_string().contains("'bogus'"));
        assert!(err.to_string().contains("register or load"));

        let err = TemplateError::InvalidBlock {
            line: 1,
            command: "endfor".into(),
            expected: vec!["endverbatim".into()],
        };
        assert!(err.to_string().ends_with("expected endverbatim"));
    }

    #[test]
    fn test_render_is_not_syntax() {
        assert!(!TemplateError::Render("x".into()).is_syntax());
    }
}
