//! Host source printer
//!
//! Output re-parses to the same tree: operands are parenthesized whenever the
//! tree shape differs from what precedence and left associativity would give.

use std::fmt;

use super::{Element, ElementKind, Expr, ExprKind, Program, Stmt};
use crate::ast::{prec, Literal};

const INDENT: &str = "    ";

impl Expr {
    fn precedence(&self) -> u8 {
        match &self.kind {
            ExprKind::Literal(Literal::Int(text) | Literal::Float(text)) if text.starts_with('-') => {
                prec::UNARY
            }
            ExprKind::Literal(_) | ExprKind::Ident(_) => prec::PRIMARY,
            ExprKind::Binary { op, .. } => op.precedence(),
            ExprKind::Conditional { .. } => prec::TERNARY,
            ExprKind::Call { .. } | ExprKind::Select { .. } | ExprKind::Index { .. } => prec::POSTFIX,
            ExprKind::Cast { .. } => prec::UNARY,
        }
    }

    fn write_operand(&self, f: &mut fmt::Formatter<'_>, min: u8) -> fmt::Result {
        if self.precedence() < min {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Literal(lit) => write!(f, "{}", lit),
            ExprKind::Ident(name) => f.write_str(name),
            ExprKind::Binary { op, lhs, rhs } => {
                let p = op.precedence();
                lhs.write_operand(f, p)?;
                write!(f, " {} ", op)?;
                rhs.write_operand(f, p + 1)
            }
            ExprKind::Conditional {
                cond,
                then,
                otherwise,
            } => {
                cond.write_operand(f, prec::TERNARY + 1)?;
                f.write_str(" ? ")?;
                then.write_operand(f, prec::TERNARY)?;
                f.write_str(" : ")?;
                otherwise.write_operand(f, prec::TERNARY)
            }
            ExprKind::Call { callee, args } => {
                callee.write_operand(f, prec::POSTFIX)?;
                f.write_str("(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
            ExprKind::Select { scope, name } => {
                scope.write_operand(f, prec::POSTFIX)?;
                write!(f, ".{}", name)
            }
            ExprKind::Index { base, index } => {
                base.write_operand(f, prec::POSTFIX)?;
                write!(f, "[{}]", index)
            }
            ExprKind::Cast { target, inner } => {
                write!(f, "({}) ", target)?;
                // A signed operand would turn a reference cast into a subtraction
                inner.write_operand(f, prec::UNARY + 1)
            }
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Let { name, value } => write!(f, "let {} = {};", name.node, value),
            Stmt::Return(Some(value)) => write!(f, "return {};", value),
            Stmt::Return(None) => f.write_str("return;"),
            Stmt::Expr(value) => write!(f, "{};", value),
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for annotation in &self.annotations {
            writeln!(f, "@{}", annotation.node)?;
        }
        match &self.kind {
            ElementKind::Function { name, params, body } => {
                let params: Vec<&str> = params.iter().map(|p| p.node.as_str()).collect();
                writeln!(f, "fn {}({}) {{", name.node, params.join(", "))?;
                for stmt in body {
                    writeln!(f, "{}{}", INDENT, stmt.node)?;
                }
                f.write_str("}")
            }
            ElementKind::Const { name, value } => write!(f, "const {} = {};", name.node, value),
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            writeln!(f, "{}", element.node)?;
        }
        Ok(())
    }
}
