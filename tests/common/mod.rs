//! Test-only evaluator for compiled and host expressions

#![allow(dead_code)]

use std::collections::HashMap;

use brace_template::host::{self, ExprKind};
use brace_template::{BinaryOp, Expr, Literal};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
    Char(char),
    Bool(bool),
    Null,
}

impl Value {
    pub fn str(s: &str) -> Self {
        Value::Str(s.to_string())
    }

    /// String conversion used by concatenation
    pub fn render(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Char(c) => c.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => "null".to_string(),
        }
    }
}

type Function = fn(&[Value]) -> Value;

/// Variables and receiver-less functions
#[derive(Default)]
pub struct Env {
    vars: HashMap<String, Value>,
    functions: HashMap<String, Function>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn var(mut self, name: &str, value: Value) -> Self {
        self.vars.insert(name.to_string(), value);
        self
    }

    pub fn function(mut self, name: &str, f: Function) -> Self {
        self.functions.insert(name.to_string(), f);
        self
    }
}

fn parse_int(text: &str) -> i64 {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let digits: String = digits
        .trim_end_matches(['l', 'L'])
        .chars()
        .filter(|c| *c != '_')
        .collect();
    let value = if let Some(hex) = digits.strip_prefix("0x").or(digits.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).expect("hex literal")
    } else if let Some(bin) = digits.strip_prefix("0b").or(digits.strip_prefix("0B")) {
        i64::from_str_radix(bin, 2).expect("binary literal")
    } else {
        digits.parse().expect("decimal literal")
    };
    if negative {
        -value
    } else {
        value
    }
}

fn literal(lit: &Literal) -> Value {
    match lit {
        Literal::Int(text) => Value::Int(parse_int(text)),
        Literal::Float(text) => Value::Float(
            text.trim_end_matches(['f', 'F', 'd', 'D'])
                .replace('_', "")
                .parse()
                .expect("float literal"),
        ),
        Literal::Char(c) => Value::Char(*c),
        Literal::String(s) => Value::Str(s.clone()),
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Null => Value::Null,
    }
}

fn binary(op: BinaryOp, lhs: Value, rhs: Value) -> Value {
    use Value::*;
    match (op, lhs, rhs) {
        (BinaryOp::Add, l @ Str(_), r) | (BinaryOp::Add, l, r @ Str(_)) => {
            Str(l.render() + &r.render())
        }
        (BinaryOp::Add, Int(a), Int(b)) => Int(a + b),
        (BinaryOp::Sub, Int(a), Int(b)) => Int(a - b),
        (BinaryOp::Mul, Int(a), Int(b)) => Int(a * b),
        (BinaryOp::Div, Int(a), Int(b)) => Int(a / b),
        (BinaryOp::Rem, Int(a), Int(b)) => Int(a % b),
        (BinaryOp::Shl, Int(a), Int(b)) => Int(a << b),
        (BinaryOp::Shr, Int(a), Int(b)) => Int(a >> b),
        (BinaryOp::BitAnd, Int(a), Int(b)) => Int(a & b),
        (BinaryOp::BitOr, Int(a), Int(b)) => Int(a | b),
        (BinaryOp::BitXor, Int(a), Int(b)) => Int(a ^ b),
        (BinaryOp::Add, Float(a), Float(b)) => Float(a + b),
        (BinaryOp::Mul, Float(a), Float(b)) => Float(a * b),
        (BinaryOp::Lt, Int(a), Int(b)) => Bool(a < b),
        (BinaryOp::Gt, Int(a), Int(b)) => Bool(a > b),
        (BinaryOp::Le, Int(a), Int(b)) => Bool(a <= b),
        (BinaryOp::Ge, Int(a), Int(b)) => Bool(a >= b),
        (BinaryOp::Eq, a, b) => Bool(a == b),
        (BinaryOp::Ne, a, b) => Bool(a != b),
        (BinaryOp::And, Bool(a), Bool(b)) => Bool(a && b),
        (BinaryOp::Or, Bool(a), Bool(b)) => Bool(a || b),
        (op, l, r) => panic!("cannot evaluate {:?} {} {:?}", l, op, r),
    }
}

/// Evaluate a compiled expression
///
/// `Concat` always appends string renderings; `+` follows host rules and
/// only concatenates when one side is a string.
pub fn eval(expr: &Expr, env: &Env) -> Value {
    match expr {
        Expr::Literal(lit) => literal(lit),
        Expr::Ident(name) => env
            .vars
            .get(name)
            .cloned()
            .unwrap_or_else(|| panic!("unbound variable {}", name)),
        Expr::Binary { op, lhs, rhs } => binary(*op, eval(lhs, env), eval(rhs, env)),
        Expr::Ternary {
            cond,
            then,
            otherwise,
        } => match eval(cond, env) {
            Value::Bool(true) => eval(then, env),
            Value::Bool(false) => eval(otherwise, env),
            other => panic!("condition is not boolean: {:?}", other),
        },
        Expr::Call { scope, name, args } => {
            assert_eq!(**scope, Expr::ident("this"), "only receiver-less calls");
            let f = env
                .functions
                .get(name)
                .unwrap_or_else(|| panic!("unknown function {}", name));
            let args: Vec<Value> = args.iter().map(|a| eval(a, env)).collect();
            f(&args)
        }
        Expr::Field { .. } | Expr::Index { .. } => panic!("unsupported in evaluator"),
        Expr::Cast { inner, .. } => eval(inner, env),
        Expr::Concat { lhs, rhs } => {
            Value::Str(eval(lhs, env).render() + &eval(rhs, env).render())
        }
    }
}

/// Evaluate and render as a string
pub fn render(expr: &Expr, env: &Env) -> String {
    eval(expr, env).render()
}

/// Evaluate a host expression, e.g. one taken from rewritten source
pub fn eval_host(expr: &host::Expr, env: &Env) -> Value {
    match &expr.kind {
        ExprKind::Literal(lit) => literal(lit),
        ExprKind::Ident(name) => env
            .vars
            .get(name)
            .cloned()
            .unwrap_or_else(|| panic!("unbound variable {}", name)),
        ExprKind::Binary { op, lhs, rhs } => {
            binary(*op, eval_host(lhs, env), eval_host(rhs, env))
        }
        ExprKind::Conditional {
            cond,
            then,
            otherwise,
        } => match eval_host(cond, env) {
            Value::Bool(true) => eval_host(then, env),
            Value::Bool(false) => eval_host(otherwise, env),
            other => panic!("condition is not boolean: {:?}", other),
        },
        ExprKind::Call { callee, args } => {
            let name = match callee.path() {
                Some(path) => path.strip_prefix("this.").unwrap_or(&path).to_string(),
                None => panic!("unsupported callee {}", callee),
            };
            let f = env
                .functions
                .get(&name)
                .unwrap_or_else(|| panic!("unknown function {}", name));
            let args: Vec<Value> = args.iter().map(|a| eval_host(a, env)).collect();
            f(&args)
        }
        ExprKind::Select { .. } | ExprKind::Index { .. } => panic!("unsupported in evaluator"),
        ExprKind::Cast { inner, .. } => eval_host(inner, env),
    }
}

/// Value of the constant `name` in a host program
pub fn const_value<'p>(program: &'p host::Program, name: &str) -> &'p host::Expr {
    program
        .elements
        .iter()
        .find_map(|element| match &element.node.kind {
            host::ElementKind::Const { name: n, value } if n.node.as_str() == name => Some(value),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no constant {}", name))
}
