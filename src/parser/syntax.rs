//! Concrete syntax of an expression, before it is checked against the
//! supported subset.
//!
//! The grammar accepts the whole Java-flavoured expression language so that
//! constructs outside the subset (lambdas, assignment, object creation, ...)
//! are reported as unsupported rather than as garbled syntax errors.

use std::fmt;

use crate::ast::{BinaryOp, Literal, Spanned};

pub type SyntaxNode = Spanned<Syntax>;

#[derive(Debug, Clone, PartialEq)]
pub enum Syntax {
    Literal(Literal),
    Ident(String),
    This,
    Paren(Box<SyntaxNode>),
    Unary {
        op: UnaryOp,
        operand: Box<SyntaxNode>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<SyntaxNode>,
        rhs: Box<SyntaxNode>,
    },
    Ternary {
        cond: Box<SyntaxNode>,
        then: Box<SyntaxNode>,
        otherwise: Box<SyntaxNode>,
    },
    Call {
        scope: Option<Box<SyntaxNode>>,
        name: String,
        args: Vec<SyntaxNode>,
    },
    Field {
        scope: Box<SyntaxNode>,
        name: String,
    },
    Index {
        base: Box<SyntaxNode>,
        index: Box<SyntaxNode>,
    },
    Cast {
        target: TypeName,
        operand: Box<SyntaxNode>,
    },
    Assign {
        target: Box<SyntaxNode>,
        value: Box<SyntaxNode>,
    },
    InstanceOf {
        operand: Box<SyntaxNode>,
        target: TypeName,
    },
    Lambda {
        params: Vec<String>,
        body: Box<SyntaxNode>,
    },
    MethodRef {
        scope: Box<SyntaxNode>,
        name: String,
    },
    ArrayInit(Vec<SyntaxNode>),
    New {
        target: String,
    },
}

impl Syntax {
    /// Human-readable name of the construct, used in diagnostics
    pub fn describe(&self) -> String {
        match self {
            Syntax::Literal(_) => "literal".to_string(),
            Syntax::Ident(_) => "identifier".to_string(),
            Syntax::This => "'this'".to_string(),
            Syntax::Paren(_) => "parenthesized expression".to_string(),
            Syntax::Unary { op, .. } => format!("unary operator '{}'", op),
            Syntax::Binary { op, .. } => format!("binary operator '{}'", op),
            Syntax::Ternary { .. } => "conditional expression".to_string(),
            Syntax::Call { .. } => "method call".to_string(),
            Syntax::Field { .. } => "field access".to_string(),
            Syntax::Index { .. } => "array access".to_string(),
            Syntax::Cast { .. } => "cast".to_string(),
            Syntax::Assign { .. } => "assignment".to_string(),
            Syntax::InstanceOf { .. } => "instanceof test".to_string(),
            Syntax::Lambda { .. } => "lambda expression".to_string(),
            Syntax::MethodRef { .. } => "method reference".to_string(),
            Syntax::ArrayInit(_) => "array initializer".to_string(),
            Syntax::New { target } => format!("object creation 'new {}'", target),
        }
    }

    /// `-` applied directly to a numeric literal, folded into one literal
    pub(crate) fn negated_literal(&self) -> Option<Literal> {
        let Syntax::Unary {
            op: UnaryOp::Neg,
            operand,
        } = self
        else {
            return None;
        };
        match &operand.node {
            Syntax::Literal(Literal::Int(text)) => Some(Literal::Int(format!("-{}", text))),
            Syntax::Literal(Literal::Float(text)) => Some(Literal::Float(format!("-{}", text))),
            _ => None,
        }
    }

    /// True when the expression begins with a sign or step operator
    pub(crate) fn starts_with_sign(&self) -> bool {
        matches!(
            self,
            Syntax::Unary {
                op: UnaryOp::Neg | UnaryOp::Plus | UnaryOp::PreInc | UnaryOp::PreDec,
                ..
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    BitNot,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::PreInc | UnaryOp::PostInc => "++",
            UnaryOp::PreDec | UnaryOp::PostDec => "--",
        })
    }
}

/// Target of a cast or `instanceof`: a dotted name plus array dimensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeName {
    pub path: String,
    pub dims: usize,
}

const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "char", "short", "int", "long", "float", "double",
];

impl TypeName {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            dims: 0,
        }
    }

    /// Primitive (non-array) types may be followed by a signed operand in a cast
    pub fn is_primitive(&self) -> bool {
        self.dims == 0 && PRIMITIVES.contains(&self.path.as_str())
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)?;
        for _ in 0..self.dims {
            write!(f, "[]")?;
        }
        Ok(())
    }
}
