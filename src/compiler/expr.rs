//! Placeholder expression parsing
//!
//! Parses placeholder text with the shared grammar and narrows the result to
//! the supported subset.

use crate::ast::{Expr, Literal};
use crate::error::{CompileError, ParseError};
use crate::parser::parse_expression;
use crate::parser::syntax::{Syntax, SyntaxNode};

/// Parse one placeholder's text into an expression
///
/// Spans in the returned error are relative to `text`.
pub fn parse_expr(text: &str) -> Result<Expr, CompileError> {
    let node = parse_expression(text).map_err(|errors| syntax_error(text, errors))?;
    convert(node)
}

fn syntax_error(text: &str, errors: Vec<ParseError>) -> CompileError {
    // Only the first error is reported
    match errors.into_iter().next() {
        Some(ParseError::Syntax {
            span,
            message,
            expected,
        }) => CompileError::ExpressionSyntax {
            text: text.to_string(),
            span,
            message,
            expected,
        },
        None => CompileError::ExpressionSyntax {
            text: text.to_string(),
            span: 0..text.len(),
            message: "invalid expression".to_string(),
            expected: Vec::new(),
        },
    }
}

fn unsupported(node: &SyntaxNode) -> CompileError {
    CompileError::UnsupportedExpression {
        construct: node.node.describe(),
        span: node.span.clone(),
    }
}

fn convert_boxed(node: SyntaxNode) -> Result<Box<Expr>, CompileError> {
    convert(node).map(Box::new)
}

fn convert(node: SyntaxNode) -> Result<Expr, CompileError> {
    if let Some(lit) = node.node.negated_literal() {
        return Ok(Expr::Literal(lit));
    }
    match node.node {
        Syntax::Literal(lit) => Ok(Expr::Literal(lit)),
        Syntax::Ident(name) => Ok(Expr::Ident(name)),
        Syntax::This => Ok(Expr::Ident("this".to_string())),
        Syntax::Paren(inner) => convert(*inner),
        Syntax::Binary { op, lhs, rhs } => Ok(Expr::Binary {
            op,
            lhs: convert_boxed(*lhs)?,
            rhs: convert_boxed(*rhs)?,
        }),
        Syntax::Ternary {
            cond,
            then,
            otherwise,
        } => Ok(Expr::Ternary {
            cond: convert_boxed(*cond)?,
            then: convert_boxed(*then)?,
            otherwise: convert_boxed(*otherwise)?,
        }),
        Syntax::Call { scope, name, args } => {
            let scope = match scope {
                Some(scope) => convert_boxed(*scope)?,
                None => Box::new(Expr::Ident("this".to_string())),
            };
            let args = args.into_iter().map(convert).collect::<Result<_, _>>()?;
            Ok(Expr::Call { scope, name, args })
        }
        Syntax::Field { scope, name } => Ok(Expr::Field {
            scope: convert_boxed(*scope)?,
            name,
        }),
        Syntax::Index { base, index } => Ok(Expr::Index {
            base: convert_boxed(*base)?,
            index: convert_boxed(*index)?,
        }),
        Syntax::Cast { target, operand } => Ok(Expr::Cast {
            target: target.to_string(),
            inner: convert_boxed(*operand)?,
        }),
        _ => Err(unsupported(&node)),
    }
}

/// Map every string literal in `expr` through `f`, outermost first
pub(crate) fn try_map_strings<E>(
    expr: Expr,
    f: &mut impl FnMut(String) -> Result<Expr, E>,
) -> Result<Expr, E> {
    Ok(match expr {
        Expr::Literal(Literal::String(s)) => return f(s),
        leaf @ (Expr::Literal(_) | Expr::Ident(_)) => leaf,
        Expr::Binary { op, lhs, rhs } => Expr::Binary {
            op,
            lhs: map_boxed(lhs, f)?,
            rhs: map_boxed(rhs, f)?,
        },
        Expr::Ternary {
            cond,
            then,
            otherwise,
        } => Expr::Ternary {
            cond: map_boxed(cond, f)?,
            then: map_boxed(then, f)?,
            otherwise: map_boxed(otherwise, f)?,
        },
        Expr::Call { scope, name, args } => {
            let scope = map_boxed(scope, f)?;
            let args = args
                .into_iter()
                .map(|arg| try_map_strings(arg, f))
                .collect::<Result<_, _>>()?;
            Expr::Call { scope, name, args }
        }
        Expr::Field { scope, name } => Expr::Field {
            scope: map_boxed(scope, f)?,
            name,
        },
        Expr::Index { base, index } => Expr::Index {
            base: map_boxed(base, f)?,
            index: map_boxed(index, f)?,
        },
        Expr::Cast { target, inner } => Expr::Cast {
            target,
            inner: map_boxed(inner, f)?,
        },
        Expr::Concat { lhs, rhs } => Expr::Concat {
            lhs: map_boxed(lhs, f)?,
            rhs: map_boxed(rhs, f)?,
        },
    })
}

fn map_boxed<E>(
    expr: Box<Expr>,
    f: &mut impl FnMut(String) -> Result<Expr, E>,
) -> Result<Box<Expr>, E> {
    try_map_strings(*expr, f).map(Box::new)
}
