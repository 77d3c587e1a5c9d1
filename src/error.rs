//! Error types for parsing and template compilation

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::parser::lexer::Token;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Parse error at {span:?}: {message}")]
    Syntax {
        span: Span,
        message: String,
        expected: Vec<String>,
    },
}

impl ParseError {
    pub fn custom(span: Span, message: impl Into<String>) -> Self {
        ParseError::Syntax {
            span,
            message: message.into(),
            expected: Vec::new(),
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            ParseError::Syntax { span, .. } => span,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        match self {
            ParseError::Syntax {
                span,
                message,
                expected,
            } => {
                let expected_str = if expected.is_empty() {
                    String::new()
                } else {
                    format!("\nExpected: {}", expected.join(", "))
                };
                render_report(
                    source,
                    filename,
                    span,
                    message,
                    &format!("{}{}", message, expected_str),
                )
            }
        }
    }
}

impl<'a> From<chumsky::error::Rich<'a, Token>> for ParseError {
    fn from(err: chumsky::error::Rich<'a, Token>) -> Self {
        use chumsky::error::{RichPattern, RichReason};

        let message = match err.reason() {
            RichReason::ExpectedFound { found, .. } => {
                let found_str = match found {
                    Some(tok) => format_token(tok),
                    None => "end of input".to_string(),
                };
                format!("Unexpected {}", found_str)
            }
            RichReason::Custom(msg) => msg.to_string(),
        };

        // Format expected tokens nicely
        let mut expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                RichPattern::Token(tok) => Some(format_token(tok)),
                RichPattern::Label(label) => Some(label.to_string()),
                RichPattern::EndOfInput => Some("end of input".to_string()),
                RichPattern::Identifier(s) => Some(format!("identifier '{}'", s)),
                RichPattern::Any => Some("any token".to_string()),
                RichPattern::SomethingElse => None,
            })
            .collect();
        expected.sort();
        expected.dedup();

        ParseError::Syntax {
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

/// Format a token for human-readable error messages
fn format_token(tok: &Token) -> String {
    tok.to_string()
}

/// Errors raised while compiling one template
///
/// Spans are byte offsets into the template text, except for
/// `UnsupportedArgument`, whose span points into the host source.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    /// Unbalanced placeholder delimiters, found before any expression parsing
    #[error("invalid template: {message}")]
    TemplateSyntax { span: Span, message: String },

    /// Placeholder text is not an expression
    #[error("'{text}' is not a valid expression: {message}")]
    ExpressionSyntax {
        text: String,
        span: Span,
        message: String,
        expected: Vec<String>,
    },

    /// Valid expression syntax outside the supported subset
    #[error("unsupported expression: {construct}")]
    UnsupportedExpression { construct: String, span: Span },

    /// Argument of a format call that is not a template, name, call or concatenation of these
    #[error("unsupported format argument: {kind}")]
    UnsupportedArgument { kind: String, span: Span },
}

impl CompileError {
    pub fn span(&self) -> &Span {
        match self {
            Self::TemplateSyntax { span, .. }
            | Self::ExpressionSyntax { span, .. }
            | Self::UnsupportedExpression { span, .. }
            | Self::UnsupportedArgument { span, .. } => span,
        }
    }

    /// Stable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TemplateSyntax { .. } => "template-syntax",
            Self::ExpressionSyntax { .. } => "expression-syntax",
            Self::UnsupportedExpression { .. } => "unsupported-expression",
            Self::UnsupportedArgument { .. } => "unsupported-argument",
        }
    }

    /// True when the span is relative to template text
    pub fn is_template_relative(&self) -> bool {
        !matches!(self, Self::UnsupportedArgument { .. })
    }

    /// Shift the span by `offset` bytes
    pub(crate) fn offset(mut self, offset: usize) -> Self {
        let span = self.span_mut();
        *span = span.start + offset..span.end + offset;
        self
    }

    /// Replace the span
    pub(crate) fn at(mut self, new_span: Span) -> Self {
        *self.span_mut() = new_span;
        self
    }

    fn span_mut(&mut self) -> &mut Span {
        match self {
            Self::TemplateSyntax { span, .. }
            | Self::ExpressionSyntax { span, .. }
            | Self::UnsupportedExpression { span, .. }
            | Self::UnsupportedArgument { span, .. } => span,
        }
    }

    /// Format the error against the template text using ariadne
    pub fn format(&self, template: &str, filename: &str) -> String {
        let label = match self {
            Self::ExpressionSyntax { expected, .. } if !expected.is_empty() => {
                format!("{}\nExpected: {}", self, expected.join(", "))
            }
            _ => self.to_string(),
        };
        render_report(template, filename, self.span(), &self.to_string(), &label)
    }
}

pub(crate) fn render_report(
    source: &str,
    filename: &str,
    span: &Span,
    message: &str,
    label: &str,
) -> String {
    let mut buf = Vec::new();
    let written = Report::build(ReportKind::Error, filename, span.start)
        .with_message(message)
        .with_label(
            Label::new((filename, span.clone()))
                .with_message(label)
                .with_color(Color::Red),
        )
        .finish()
        .write((filename, Source::from(source)), &mut buf);
    match written {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(_) => format!("{}: {}", filename, message),
    }
}
