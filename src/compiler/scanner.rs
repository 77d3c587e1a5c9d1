//! Placeholder scanner
//!
//! Splits a template into literal segments and placeholders. Delimiters nest:
//! a placeholder ends at the close that brings the depth back to zero, so
//! `a{f({1,2})}b` has the single placeholder `f({1,2})`.

use tracing::trace;

use crate::ast::Span;
use crate::error::CompileError;

/// Literal run of template text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'t> {
    pub text: &'t str,
    pub span: Span,
}

/// Text between a matched pair of delimiters at depth zero
///
/// `span` covers the inner text only, not the delimiters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'t> {
    pub text: &'t str,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part<'t> {
    Segment(Segment<'t>),
    Placeholder(Placeholder<'t>),
}

/// Scan with the default `{` `}` delimiters
pub fn scan(template: &str) -> Result<Vec<Part<'_>>, CompileError> {
    scan_with(template, '{', '}')
}

/// Scan a template into parts
///
/// The result starts and ends with a segment and alternates between segments
/// and placeholders; segments may be empty. Unbalanced delimiters fail the
/// whole scan.
pub fn scan_with(template: &str, open: char, close: char) -> Result<Vec<Part<'_>>, CompileError> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut segment_start = 0;
    // Byte offset of the outermost open delimiter
    let mut placeholder_open = 0;

    for (i, c) in template.char_indices() {
        if c == open {
            if depth == 0 {
                parts.push(Part::Segment(Segment {
                    text: &template[segment_start..i],
                    span: segment_start..i,
                }));
                placeholder_open = i;
            }
            depth += 1;
        } else if c == close {
            if depth == 0 {
                return Err(CompileError::TemplateSyntax {
                    span: i..i + c.len_utf8(),
                    message: format!("unmatched '{}'", close),
                });
            }
            depth -= 1;
            if depth == 0 {
                let start = placeholder_open + open.len_utf8();
                parts.push(Part::Placeholder(Placeholder {
                    text: &template[start..i],
                    span: start..i,
                }));
                segment_start = i + c.len_utf8();
            }
        }
    }

    if depth != 0 {
        return Err(CompileError::TemplateSyntax {
            span: placeholder_open..placeholder_open + open.len_utf8(),
            message: format!("unclosed '{}'", open),
        });
    }

    parts.push(Part::Segment(Segment {
        text: &template[segment_start..],
        span: segment_start..template.len(),
    }));

    trace!(parts = parts.len(), "scanned template");
    Ok(parts)
}
