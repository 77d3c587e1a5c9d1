//! Concatenator
//!
//! Folds template pieces into one left-leaning chain of [`Expr::Concat`]
//! nodes in source order. Empty text pieces never become operands.

use crate::ast::Expr;

/// One element of a template, in source order
#[derive(Debug, Clone, PartialEq)]
pub enum Piece<'t> {
    Text(&'t str),
    Expr(Expr),
}

impl Piece<'_> {
    fn into_expr(self) -> Option<Expr> {
        match self {
            Piece::Text("") => None,
            Piece::Text(text) => Some(Expr::string(text)),
            Piece::Expr(expr) => Some(expr),
        }
    }
}

/// Fold pieces into a single expression
///
/// No pieces (or only empty text) gives the empty string literal. A single
/// piece is returned as is, without an append wrapper.
pub fn concat<'t>(pieces: impl IntoIterator<Item = Piece<'t>>) -> Expr {
    let mut operands = pieces.into_iter().filter_map(Piece::into_expr);
    let Some(first) = operands.next() else {
        return Expr::string("");
    };
    operands.fold(first, Expr::concat)
}
