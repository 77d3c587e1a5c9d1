//! Template-to-expression compiler
//!
//! ```
//! use brace_template::compile;
//!
//! let expr = compile("Hello, {name}!").unwrap();
//! assert_eq!(expr.to_string(), r#""Hello, " + name + "!""#);
//! ```

mod concat;
mod expr;
mod scanner;

pub use concat::{concat, Piece};
pub use expr::parse_expr;
pub use scanner::{scan, scan_with, Part, Placeholder, Segment};

use std::borrow::Cow;

use tracing::debug;

use crate::ast::Expr;
use crate::config::TemplateOptions;
use crate::error::CompileError;

/// Compile a template with the default options
pub fn compile(template: &str) -> Result<Expr, CompileError> {
    compile_with(template, &TemplateOptions::default())
}

/// Compile a template into one expression
///
/// Error spans are byte offsets into `template`. On error nothing is
/// returned for any part of the template.
pub fn compile_with(template: &str, options: &TemplateOptions) -> Result<Expr, CompileError> {
    let parts = scan_with(template, options.open, options.close)?;
    let mut pieces = Vec::with_capacity(parts.len());
    for part in parts {
        match part {
            Part::Segment(segment) => pieces.push(Piece::Text(segment.text)),
            Part::Placeholder(placeholder) => {
                let expr = compile_placeholder(placeholder.text, options)
                    .map_err(|e| e.offset(placeholder.span.start))?;
                pieces.push(Piece::Expr(expr));
            }
        }
    }
    let expr = concat(pieces);
    debug!(template, compiled = %expr, "compiled template");
    Ok(expr)
}

fn compile_placeholder(text: &str, options: &TemplateOptions) -> Result<Expr, CompileError> {
    // Backtick and double quote are both one byte, so spans stay valid
    let source = if options.backtick_quotes && text.contains('`') {
        Cow::Owned(text.replace('`', "\""))
    } else {
        Cow::Borrowed(text)
    };

    let parsed = parse_expr(&source).map_err(|e| match e {
        CompileError::ExpressionSyntax {
            span,
            message,
            expected,
            ..
        } => CompileError::ExpressionSyntax {
            text: text.to_string(),
            span,
            message,
            expected,
        },
        other => other,
    })?;

    if !options.nested_templates {
        return Ok(parsed);
    }
    // Nested literals carry no spans of their own
    expr::try_map_strings(parsed, &mut |literal| {
        compile_with(&literal, options).map_err(|e| e.at(0..text.len()))
    })
}
