//! Host syntax tree
//!
//! A small host language whose string literals are compiled as templates.
//! Top-level elements are functions and constants, optionally annotated:
//!
//! ```text
//! @template
//! fn greet(name) {
//!     return "Hello, {name}!";
//! }
//!
//! @format
//! const BANNER = format("v{VERSION}" + suffix);
//! ```
//!
//! Host expressions use the same expression grammar as placeholders.

mod printer;

use crate::ast::{BinaryOp, Identifier, Literal, Span, Spanned};
use crate::factory::TreeFactory;
use crate::parser::syntax::{Syntax, SyntaxNode};

pub use crate::parser::parse_program as parse;

/// Root of a host source file
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub elements: Vec<Spanned<Element>>,
}

/// Annotated top-level declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub annotations: Vec<Spanned<Identifier>>,
    pub kind: ElementKind,
}

impl Element {
    pub fn name(&self) -> &Identifier {
        match &self.kind {
            ElementKind::Function { name, .. } | ElementKind::Const { name, .. } => &name.node,
        }
    }

    pub fn has_annotation(&self, annotation: &str) -> bool {
        self.annotations.iter().any(|a| a.node.as_str() == annotation)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    /// `fn name(params) { body }`
    Function {
        name: Spanned<Identifier>,
        params: Vec<Spanned<Identifier>>,
        body: Vec<Spanned<Stmt>>,
    },
    /// `const NAME = value;`
    Const {
        name: Spanned<Identifier>,
        value: Expr,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Let { name: Spanned<Identifier>, value: Expr },
    Return(Option<Expr>),
    Expr(Expr),
}

/// Where a host node came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Parsed from host source
    Source,
    /// Produced by the template compiler
    Generated,
}

/// Host expression node
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    pub origin: Origin,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    Ident(String),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Select {
        scope: Box<Expr>,
        name: String,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    Cast {
        target: String,
        inner: Box<Expr>,
    },
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self {
            kind,
            span,
            origin: Origin::Source,
        }
    }

    pub fn is_generated(&self) -> bool {
        self.origin == Origin::Generated
    }

    /// Dotted path of an identifier or select chain, e.g. `Strings.format`
    pub fn path(&self) -> Option<String> {
        match &self.kind {
            ExprKind::Ident(name) => Some(name.clone()),
            ExprKind::Select { scope, name } => scope.path().map(|p| format!("{}.{}", p, name)),
            _ => None,
        }
    }

    /// Short description of the node kind, used in diagnostics
    pub fn describe(&self) -> &'static str {
        match &self.kind {
            ExprKind::Literal(Literal::String(_)) => "string literal",
            ExprKind::Literal(Literal::Null) => "null literal",
            ExprKind::Literal(_) => "non-string literal",
            ExprKind::Ident(_) => "identifier",
            ExprKind::Binary { op: BinaryOp::Add, .. } => "concatenation",
            ExprKind::Binary { .. } => "binary expression",
            ExprKind::Conditional { .. } => "conditional expression",
            ExprKind::Call { .. } => "method call",
            ExprKind::Select { .. } => "field access",
            ExprKind::Index { .. } => "array access",
            ExprKind::Cast { .. } => "cast",
        }
    }

    /// Rebuild this node with every direct child passed through `f`
    pub fn map_children(self, f: &mut impl FnMut(Expr) -> Expr) -> Expr {
        let kind = match self.kind {
            kind @ (ExprKind::Literal(_) | ExprKind::Ident(_)) => kind,
            ExprKind::Binary { op, lhs, rhs } => ExprKind::Binary {
                op,
                lhs: Box::new(f(*lhs)),
                rhs: Box::new(f(*rhs)),
            },
            ExprKind::Conditional {
                cond,
                then,
                otherwise,
            } => ExprKind::Conditional {
                cond: Box::new(f(*cond)),
                then: Box::new(f(*then)),
                otherwise: Box::new(f(*otherwise)),
            },
            ExprKind::Call { callee, args } => ExprKind::Call {
                callee: Box::new(f(*callee)),
                args: args.into_iter().map(&mut *f).collect(),
            },
            ExprKind::Select { scope, name } => ExprKind::Select {
                scope: Box::new(f(*scope)),
                name,
            },
            ExprKind::Index { base, index } => ExprKind::Index {
                base: Box::new(f(*base)),
                index: Box::new(f(*index)),
            },
            ExprKind::Cast { target, inner } => ExprKind::Cast {
                target,
                inner: Box::new(f(*inner)),
            },
        };
        Expr {
            kind,
            span: self.span,
            origin: self.origin,
        }
    }

    /// Convert parsed host syntax, rejecting forms the host tree cannot hold
    pub(crate) fn from_syntax(node: SyntaxNode) -> Result<Self, (String, Span)> {
        let span = node.span;
        if let Some(lit) = node.node.negated_literal() {
            return Ok(Expr::new(ExprKind::Literal(lit), span));
        }
        let kind = match node.node {
            Syntax::Literal(lit) => ExprKind::Literal(lit),
            Syntax::Ident(name) => ExprKind::Ident(name),
            Syntax::This => ExprKind::Ident("this".to_string()),
            Syntax::Paren(inner) => return Self::from_syntax(*inner),
            Syntax::Binary { op, lhs, rhs } => ExprKind::Binary {
                op,
                lhs: Box::new(Self::from_syntax(*lhs)?),
                rhs: Box::new(Self::from_syntax(*rhs)?),
            },
            Syntax::Ternary {
                cond,
                then,
                otherwise,
            } => ExprKind::Conditional {
                cond: Box::new(Self::from_syntax(*cond)?),
                then: Box::new(Self::from_syntax(*then)?),
                otherwise: Box::new(Self::from_syntax(*otherwise)?),
            },
            Syntax::Call { scope, name, args } => {
                let callee = match scope {
                    Some(scope) => {
                        let scope = Self::from_syntax(*scope)?;
                        Expr::new(
                            ExprKind::Select {
                                scope: Box::new(scope),
                                name,
                            },
                            span.clone(),
                        )
                    }
                    None => Expr::new(ExprKind::Ident(name), span.clone()),
                };
                ExprKind::Call {
                    callee: Box::new(callee),
                    args: args
                        .into_iter()
                        .map(Self::from_syntax)
                        .collect::<Result<_, _>>()?,
                }
            }
            Syntax::Field { scope, name } => ExprKind::Select {
                scope: Box::new(Self::from_syntax(*scope)?),
                name,
            },
            Syntax::Index { base, index } => ExprKind::Index {
                base: Box::new(Self::from_syntax(*base)?),
                index: Box::new(Self::from_syntax(*index)?),
            },
            Syntax::Cast { target, operand } => ExprKind::Cast {
                target: target.to_string(),
                inner: Box::new(Self::from_syntax(*operand)?),
            },
            other => {
                return Err((
                    format!("{} is not supported in host source", other.describe()),
                    span,
                ))
            }
        };
        Ok(Expr::new(kind, span))
    }
}

/// Builds generated host nodes, all spanning the literal they replace
#[derive(Debug, Clone)]
pub struct HostFactory {
    span: Span,
}

impl HostFactory {
    pub fn new(span: Span) -> Self {
        Self { span }
    }

    fn node(&self, kind: ExprKind) -> Expr {
        Expr {
            kind,
            span: self.span.clone(),
            origin: Origin::Generated,
        }
    }
}

impl TreeFactory for HostFactory {
    type Node = Expr;

    fn literal(&mut self, literal: &Literal) -> Expr {
        self.node(ExprKind::Literal(literal.clone()))
    }

    fn ident(&mut self, name: &str) -> Expr {
        self.node(ExprKind::Ident(name.to_string()))
    }

    fn binary(&mut self, op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        self.node(ExprKind::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    fn conditional(&mut self, cond: Expr, then: Expr, otherwise: Expr) -> Expr {
        self.node(ExprKind::Conditional {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    fn call(&mut self, callee: Expr, args: Vec<Expr>) -> Expr {
        self.node(ExprKind::Call {
            callee: Box::new(callee),
            args,
        })
    }

    fn select(&mut self, scope: Expr, name: &str) -> Expr {
        self.node(ExprKind::Select {
            scope: Box::new(scope),
            name: name.to_string(),
        })
    }

    fn index(&mut self, base: Expr, index: Expr) -> Expr {
        self.node(ExprKind::Index {
            base: Box::new(base),
            index: Box::new(index),
        })
    }

    fn cast(&mut self, target: &str, inner: Expr) -> Expr {
        self.node(ExprKind::Cast {
            target: target.to_string(),
            inner: Box::new(inner),
        })
    }

    /// `+` only appends when one side is a string: `"" + node`
    fn stringify(&mut self, node: Expr) -> Expr {
        let empty = self.literal(&Literal::String(String::new()));
        self.binary(BinaryOp::Add, empty, node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Expr {
        Expr::new(ExprKind::Ident(name.to_string()), 0..name.len())
    }

    #[test]
    fn test_path_of_select_chain() {
        let expr = Expr::new(
            ExprKind::Select {
                scope: Box::new(ident("Strings")),
                name: "format".to_string(),
            },
            0..14,
        );
        assert_eq!(expr.path().as_deref(), Some("Strings.format"));
    }

    #[test]
    fn test_path_of_non_name_is_none() {
        let expr = Expr::new(ExprKind::Literal(Literal::Null), 0..4);
        assert_eq!(expr.path(), None);
    }

    #[test]
    fn test_map_children_preserves_origin_and_span() {
        let expr = Expr::new(
            ExprKind::Binary {
                op: BinaryOp::Add,
                lhs: Box::new(ident("a")),
                rhs: Box::new(ident("b")),
            },
            3..8,
        );
        let renamed = expr.map_children(&mut |child| match child.kind {
            ExprKind::Ident(name) => Expr::new(ExprKind::Ident(name.to_uppercase()), child.span),
            _ => child,
        });
        assert_eq!(renamed.span, 3..8);
        assert_eq!(renamed.origin, Origin::Source);
        assert_eq!(renamed.to_string(), "A + B");
    }

    #[test]
    fn test_host_factory_marks_generated() {
        let mut factory = HostFactory::new(4..10);
        let node = factory.literal(&Literal::String("x".to_string()));
        assert!(node.is_generated());
        assert_eq!(node.span, 4..10);
    }

    #[test]
    fn test_host_lowering_keeps_append_semantics() {
        use crate::ast;
        use crate::factory::build_template;

        let mut factory = HostFactory::new(0..5);
        let chain = ast::Expr::concat(
            ast::Expr::concat(ast::Expr::ident("a"), ast::Expr::ident("b")),
            ast::Expr::string(" items"),
        );
        let lowered = build_template(&chain, &mut factory);
        assert_eq!(lowered.to_string(), r#""" + a + b + " items""#);
        assert!(lowered.is_generated());

        let sum = ast::Expr::binary(BinaryOp::Add, ast::Expr::ident("a"), ast::Expr::ident("b"));
        let lowered = build_template(&sum, &mut factory);
        assert_eq!(lowered.to_string(), r#""" + (a + b)"#);
    }
}
