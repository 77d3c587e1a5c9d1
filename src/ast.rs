//! Expression tree produced by the template compiler

use std::fmt;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// Valid identifier (alphanumeric, underscore or `$`, not starting with a digit)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(pub String);

impl Identifier {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Literal values
///
/// Numeric literals keep their exact source text (including radix prefixes,
/// underscores, suffixes and a folded leading minus sign).
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(String),
    Float(String),
    Char(char),
    String(String),
    Bool(bool),
    Null,
}

impl Literal {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(text) | Literal::Float(text) => f.write_str(text),
            Literal::Char(c) => {
                f.write_str("'")?;
                write_escaped(f, *c, '\'')?;
                f.write_str("'")
            }
            Literal::String(s) => {
                f.write_str("\"")?;
                for c in s.chars() {
                    write_escaped(f, c, '"')?;
                }
                f.write_str("\"")
            }
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Null => f.write_str("null"),
        }
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, c: char, quote: char) -> fmt::Result {
    match c {
        '\\' => f.write_str("\\\\"),
        '\n' => f.write_str("\\n"),
        '\r' => f.write_str("\\r"),
        '\t' => f.write_str("\\t"),
        '\u{8}' => f.write_str("\\b"),
        '\u{c}' => f.write_str("\\f"),
        c if c == quote => write!(f, "\\{}", c),
        c if c.is_control() => write!(f, "\\u{:04x}", c as u32),
        c => write!(f, "{}", c),
    }
}

/// The fixed set of supported binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Or,
    And,
    BitOr,
    BitXor,
    BitAnd,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Shl,
    Shr,
    UShr,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

/// Binding strength of expression forms, loosest first
pub(crate) mod prec {
    pub const TERNARY: u8 = 1;
    pub const UNARY: u8 = 12;
    pub const POSTFIX: u8 = 13;
    pub const PRIMARY: u8 = 14;
}

impl BinaryOp {
    /// Source symbol of the operator
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::BitAnd => "&",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::UShr => ">>>",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
        }
    }

    /// Binding strength; higher binds tighter. All binary levels sit
    /// between the ternary conditional and unary operators.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 2,
            BinaryOp::And => 3,
            BinaryOp::BitOr => 4,
            BinaryOp::BitXor => 5,
            BinaryOp::BitAnd => 6,
            BinaryOp::Eq | BinaryOp::Ne => 7,
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => 8,
            BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => 9,
            BinaryOp::Add | BinaryOp::Sub => 10,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 11,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A compiled expression
///
/// Trees are built bottom-up and never contain partial or error nodes.
/// `Concat` is the string-append node produced by the concatenator; every
/// other variant comes from a parsed placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Ident(String),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Ternary {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    /// Method call; a call written without a receiver has the scope `this`
    Call {
        scope: Box<Expr>,
        name: String,
        args: Vec<Expr>,
    },
    Field {
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
    Concat {
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    pub fn string(s: impl Into<String>) -> Self {
        Expr::Literal(Literal::String(s.into()))
    }

    pub fn int(text: impl Into<String>) -> Self {
        Expr::Literal(Literal::Int(text.into()))
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn concat(lhs: Expr, rhs: Expr) -> Self {
        Expr::Concat {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn field(scope: Expr, name: impl Into<String>) -> Self {
        Expr::Field {
            scope: Box::new(scope),
            name: name.into(),
        }
    }

    pub fn call(scope: Expr, name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            scope: Box::new(scope),
            name: name.into(),
            args,
        }
    }

    /// Text of a string literal
    pub fn as_string_literal(&self) -> Option<&str> {
        match self {
            Expr::Literal(lit) => lit.as_str(),
            _ => None,
        }
    }

    /// Operands of the append chain, left to right
    ///
    /// A tree without a top-level `Concat` yields itself.
    pub fn concat_operands(&self) -> Vec<&Expr> {
        let mut operands = Vec::new();
        let mut current = self;
        while let Expr::Concat { lhs, rhs } = current {
            operands.push(rhs.as_ref());
            current = lhs;
        }
        operands.push(current);
        operands.reverse();
        operands
    }
}

/// Renders the expression in host syntax
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lowered = crate::factory::build(self, &mut crate::host::HostFactory::new(0..0));
        write!(f, "{}", lowered)
    }
}
