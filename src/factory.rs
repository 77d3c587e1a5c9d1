//! Tree factory capability
//!
//! The compiler never builds host nodes itself. A host supplies a
//! [`TreeFactory`] and [`build`] lowers a compiled [`Expr`] through it.
//! [`build_template`] lowers a whole compiled template, whose value is
//! always a string.

use crate::ast::{BinaryOp, Expr, Literal};

/// Constructs host expression nodes of each supported kind
pub trait TreeFactory {
    type Node;

    fn literal(&mut self, literal: &Literal) -> Self::Node;
    fn ident(&mut self, name: &str) -> Self::Node;
    fn binary(&mut self, op: BinaryOp, lhs: Self::Node, rhs: Self::Node) -> Self::Node;
    fn conditional(&mut self, cond: Self::Node, then: Self::Node, otherwise: Self::Node)
        -> Self::Node;
    /// Apply `callee` (an identifier or select chain) to `args`
    fn call(&mut self, callee: Self::Node, args: Vec<Self::Node>) -> Self::Node;
    fn select(&mut self, scope: Self::Node, name: &str) -> Self::Node;
    fn index(&mut self, base: Self::Node, index: Self::Node) -> Self::Node;
    fn cast(&mut self, target: &str, inner: Self::Node) -> Self::Node;

    /// String append; hosts whose `+` already concatenates keep the default
    fn concat(&mut self, lhs: Self::Node, rhs: Self::Node) -> Self::Node {
        self.binary(BinaryOp::Add, lhs, rhs)
    }

    /// Convert a node that is not a string literal to a string
    ///
    /// Applied to the first operand of an append chain and to a template
    /// that is a single placeholder. Hosts whose `concat` always appends
    /// strings keep the default.
    fn stringify(&mut self, node: Self::Node) -> Self::Node {
        node
    }
}

/// Lower a compiled expression into host nodes
pub fn build<F: TreeFactory>(expr: &Expr, factory: &mut F) -> F::Node {
    match expr {
        Expr::Literal(lit) => factory.literal(lit),
        Expr::Ident(name) => factory.ident(name),
        Expr::Binary { op, lhs, rhs } => {
            let lhs = build(lhs, factory);
            let rhs = build(rhs, factory);
            factory.binary(*op, lhs, rhs)
        }
        Expr::Ternary {
            cond,
            then,
            otherwise,
        } => {
            let cond = build(cond, factory);
            let then = build(then, factory);
            let otherwise = build(otherwise, factory);
            factory.conditional(cond, then, otherwise)
        }
        Expr::Call { scope, name, args } => {
            let scope = build(scope, factory);
            let callee = factory.select(scope, name);
            let args = args.iter().map(|arg| build(arg, factory)).collect();
            factory.call(callee, args)
        }
        Expr::Field { scope, name } => {
            let scope = build(scope, factory);
            factory.select(scope, name)
        }
        Expr::Index { base, index } => {
            let base = build(base, factory);
            let index = build(index, factory);
            factory.index(base, index)
        }
        Expr::Cast { target, inner } => {
            let inner = build(inner, factory);
            factory.cast(target, inner)
        }
        Expr::Concat { lhs, rhs } => {
            let lhs = match lhs.as_ref() {
                Expr::Concat { .. } => build(lhs, factory),
                head => build_string(head, factory),
            };
            let rhs = build(rhs, factory);
            factory.concat(lhs, rhs)
        }
    }
}

/// Lower a compiled template; the resulting node is string-valued
pub fn build_template<F: TreeFactory>(expr: &Expr, factory: &mut F) -> F::Node {
    match expr {
        Expr::Concat { .. } => build(expr, factory),
        other => build_string(other, factory),
    }
}

fn build_string<F: TreeFactory>(expr: &Expr, factory: &mut F) -> F::Node {
    let node = build(expr, factory);
    if expr.as_string_literal().is_some() {
        node
    } else {
        factory.stringify(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Renders nodes as s-expressions
    struct SExpr;

    impl TreeFactory for SExpr {
        type Node = String;

        fn literal(&mut self, literal: &Literal) -> String {
            literal.to_string()
        }
        fn ident(&mut self, name: &str) -> String {
            name.to_string()
        }
        fn binary(&mut self, op: BinaryOp, lhs: String, rhs: String) -> String {
            format!("({} {} {})", op, lhs, rhs)
        }
        fn conditional(&mut self, cond: String, then: String, otherwise: String) -> String {
            format!("(if {} {} {})", cond, then, otherwise)
        }
        fn call(&mut self, callee: String, args: Vec<String>) -> String {
            format!("(call {} [{}])", callee, args.join(" "))
        }
        fn select(&mut self, scope: String, name: &str) -> String {
            format!("{}.{}", scope, name)
        }
        fn index(&mut self, base: String, index: String) -> String {
            format!("(index {} {})", base, index)
        }
        fn cast(&mut self, target: &str, inner: String) -> String {
            format!("(as {} {})", target, inner)
        }
        fn concat(&mut self, lhs: String, rhs: String) -> String {
            format!("(++ {} {})", lhs, rhs)
        }
        fn stringify(&mut self, node: String) -> String {
            format!("(str {})", node)
        }
    }

    /// Keeps every default
    struct Plus;

    impl TreeFactory for Plus {
        type Node = String;

        fn literal(&mut self, literal: &Literal) -> String {
            literal.to_string()
        }
        fn ident(&mut self, name: &str) -> String {
            name.to_string()
        }
        fn binary(&mut self, op: BinaryOp, lhs: String, rhs: String) -> String {
            format!("({} {} {})", op, lhs, rhs)
        }
        fn conditional(&mut self, cond: String, then: String, otherwise: String) -> String {
            format!("(if {} {} {})", cond, then, otherwise)
        }
        fn call(&mut self, callee: String, args: Vec<String>) -> String {
            format!("(call {} [{}])", callee, args.join(" "))
        }
        fn select(&mut self, scope: String, name: &str) -> String {
            format!("{}.{}", scope, name)
        }
        fn index(&mut self, base: String, index: String) -> String {
            format!("(index {} {})", base, index)
        }
        fn cast(&mut self, target: &str, inner: String) -> String {
            format!("(as {} {})", target, inner)
        }
    }

    #[test]
    fn test_call_lowers_to_select_callee() {
        let expr = Expr::call(Expr::ident("this"), "size", vec![Expr::int("1")]);
        assert_eq!(build(&expr, &mut SExpr), "(call this.size [1])");
    }

    #[test]
    fn test_concat_uses_factory_override() {
        let expr = Expr::concat(Expr::string("a"), Expr::ident("b"));
        assert_eq!(build(&expr, &mut SExpr), r#"(++ "a" b)"#);
    }

    #[test]
    fn test_chain_head_is_stringified() {
        let expr = Expr::concat(
            Expr::concat(Expr::ident("a"), Expr::ident("b")),
            Expr::string("c"),
        );
        assert_eq!(build(&expr, &mut SExpr), r#"(++ (++ (str a) b) "c")"#);
        assert_eq!(build(&expr, &mut Plus), r#"(+ (+ a b) "c")"#);
    }

    #[test]
    fn test_string_head_is_not_stringified() {
        let expr = Expr::concat(Expr::string("x"), Expr::ident("n"));
        assert_eq!(build(&expr, &mut SExpr), r#"(++ "x" n)"#);
    }

    #[test]
    fn test_template_of_single_placeholder() {
        assert_eq!(build_template(&Expr::ident("n"), &mut SExpr), "(str n)");
        assert_eq!(build_template(&Expr::string("n"), &mut SExpr), r#""n""#);
        assert_eq!(build(&Expr::ident("n"), &mut SExpr), "n");
    }

    #[test]
    fn test_nested_forms() {
        let expr = Expr::Cast {
            target: "String".to_string(),
            inner: Box::new(Expr::Index {
                base: Box::new(Expr::field(Expr::ident("a"), "items")),
                index: Box::new(Expr::binary(BinaryOp::Sub, Expr::ident("i"), Expr::int("1"))),
            }),
        };
        assert_eq!(
            build(&expr, &mut SExpr),
            "(as String (index a.items (- i 1)))"
        );
    }

    #[test]
    fn test_display_renders_host_syntax() {
        let expr = Expr::concat(
            Expr::concat(Expr::string("Hello, "), Expr::ident("name")),
            Expr::string("!"),
        );
        assert_eq!(expr.to_string(), r#""Hello, " + name + "!""#);
        let expr = Expr::concat(Expr::ident("a"), Expr::ident("b"));
        assert_eq!(expr.to_string(), r#""" + a + b"#);
    }
}
