//! Diagnostics reported while rewriting
//!
//! A rejected node never aborts a pass. The rewriter hands a [`Diagnostic`]
//! to its [`DiagnosticSink`] and leaves the node as written.

use std::fmt;

use tracing::warn;

use crate::ast::Span;
use crate::error::{render_report, CompileError};

/// A compile error located in host source
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Name of the element containing the node
    pub element: String,
    /// Byte range in host source
    pub span: Span,
    pub error: CompileError,
}

impl Diagnostic {
    /// Diagnostic whose error span is already relative to host source
    pub fn new(element: impl Into<String>, span: Span, error: CompileError) -> Self {
        Self {
            element: element.into(),
            span,
            error,
        }
    }

    /// Locate a template error inside the string literal it came from
    ///
    /// `literal_span` covers the quoted literal. When the literal holds no
    /// escape sequences its source text matches `template` byte for byte and
    /// the error span is narrowed to the exact position; otherwise the whole
    /// literal is reported.
    pub fn in_literal(
        element: impl Into<String>,
        literal_span: Span,
        template: &str,
        error: CompileError,
    ) -> Self {
        let span = if error.is_template_relative() && literal_span.len() == template.len() + 2 {
            let body = literal_span.start + 1;
            let at = error.span();
            body + at.start..body + at.end
        } else {
            literal_span
        };
        Self::new(element, span, error)
    }

    pub fn kind(&self) -> &'static str {
        self.error.kind()
    }

    /// Format the diagnostic with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let label = match &self.error {
            CompileError::ExpressionSyntax { expected, .. } if !expected.is_empty() => {
                format!("{}\nExpected: {}", self.error, expected.join(", "))
            }
            _ => self.error.to_string(),
        };
        render_report(source, filename, &self.span, &self.to_string(), &label)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] in {}: {}", self.kind(), self.element, self.error)
    }
}

/// Receives diagnostics in the order they are found
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn report(&mut self, diagnostic: Diagnostic) {
        (**self).report(diagnostic);
    }
}

/// Logs each diagnostic at warn level and counts them
#[derive(Debug, Default)]
pub struct TracingSink {
    reported: usize,
}

impl TracingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reported(&self) -> usize {
        self.reported
    }
}

impl DiagnosticSink for TracingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.reported += 1;
        warn!(
            element = %diagnostic.element,
            kind = diagnostic.kind(),
            span = ?diagnostic.span,
            "{}",
            diagnostic.error
        );
    }
}
