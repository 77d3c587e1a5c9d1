//! Properties of the template compiler, checked by evaluating its output

mod common;

use brace_template::{compile, compile_with, BinaryOp, CompileError, Expr, TemplateOptions};
use common::{eval, render, Env, Value};
use pretty_assertions::assert_eq;

/// Naive substitution, the reference the compiled tree must agree with
fn substitute(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (name, value) in values {
        out = out.replace(&format!("{{{}}}", name), value);
    }
    out
}

#[test]
fn test_plain_templates_are_identity() {
    for template in ["", "plain", "with \"quotes\" and \\ slashes", "ünïcödé", "a] [b"] {
        assert_eq!(compile(template).unwrap(), Expr::string(template));
    }
}

#[test]
fn test_hello_world() {
    let expr = compile("Hello, {name}!").unwrap();
    let env = Env::new().var("name", Value::str("World"));
    assert_eq!(render(&expr, &env), "Hello, World!");
}

#[test]
fn test_arithmetic_precedence() {
    let expr = compile("{1+2*3}").unwrap();
    assert_eq!(eval(&expr, &Env::new()), Value::Int(7));
}

#[test]
fn test_adjacent_placeholders() {
    let expr = compile("{a}{b}").unwrap();
    assert_eq!(expr, Expr::concat(Expr::ident("a"), Expr::ident("b")));
    let env = Env::new().var("a", Value::str("x")).var("b", Value::str("y"));
    assert_eq!(render(&expr, &env), "xy");
}

#[test]
fn test_empty_template() {
    assert_eq!(compile("").unwrap(), Expr::string(""));
}

#[test]
fn test_unbalanced_template() {
    assert!(matches!(
        compile("a{b"),
        Err(CompileError::TemplateSyntax { .. })
    ));
    assert!(matches!(
        compile("a}b"),
        Err(CompileError::TemplateSyntax { .. })
    ));
}

#[test]
fn test_nested_delimiters_form_one_placeholder() {
    // The inner braces reach the expression parser as an array initializer
    let err = compile("a{f({1,2})}b").unwrap_err();
    assert_eq!(
        err,
        CompileError::UnsupportedExpression {
            construct: "array initializer".to_string(),
            span: 4..9,
        }
    );
}

#[test]
fn test_evaluation_matches_substitution() {
    let cases: &[(&str, &[(&str, &str)])] = &[
        ("{a}", &[("a", "1")]),
        ("x{a}y", &[("a", "mid")]),
        ("{a} and {b}", &[("a", "left"), ("b", "right")]),
        ("{a}{b}{c}", &[("a", "1"), ("b", "2"), ("c", "3")]),
        ("[{a}]({b})", &[("a", "text"), ("b", "url")]),
        ("{a}{a}", &[("a", "twice")]),
    ];
    for (template, values) in cases {
        let env = values
            .iter()
            .fold(Env::new(), |env, (name, value)| env.var(name, Value::str(value)));
        let expr = compile(template).unwrap();
        assert_eq!(
            render(&expr, &env),
            substitute(template, values),
            "template {:?}",
            template
        );
    }
}

#[test]
fn test_concatenation_is_left_leaning_in_source_order() {
    let expr = compile("a{x}b{y}c").unwrap();
    let operands: Vec<String> = expr
        .concat_operands()
        .into_iter()
        .map(|e| e.to_string())
        .collect();
    assert_eq!(operands, vec!["\"a\"", "x", "\"b\"", "y", "\"c\""]);
    match &expr {
        Expr::Concat { rhs, .. } => assert_eq!(**rhs, Expr::string("c")),
        other => panic!("Expected concat, got {:?}", other),
    }
}

#[test]
fn test_no_precedence_across_placeholders() {
    // `1 + 2` stays grouped inside its placeholder
    let expr = compile("n={1 + 2}").unwrap();
    assert_eq!(render(&expr, &Env::new()), "n=3");
    assert_eq!(expr.to_string(), "\"n=\" + (1 + 2)");
}

#[test]
fn test_ternary_and_calls() {
    let expr = compile("{count} item{count == 1 ? `` : `s`} in {upper(`box`)}").unwrap();
    let env = Env::new()
        .var("count", Value::Int(3))
        .function("upper", |args| Value::Str(args[0].render().to_uppercase()));
    assert_eq!(render(&expr, &env), "3 items in BOX");
}

#[test]
fn test_operator_set() {
    let cases = [
        ("{a || b}", BinaryOp::Or),
        ("{a && b}", BinaryOp::And),
        ("{a | b}", BinaryOp::BitOr),
        ("{a ^ b}", BinaryOp::BitXor),
        ("{a & b}", BinaryOp::BitAnd),
        ("{a == b}", BinaryOp::Eq),
        ("{a != b}", BinaryOp::Ne),
        ("{a < b}", BinaryOp::Lt),
        ("{a > b}", BinaryOp::Gt),
        ("{a <= b}", BinaryOp::Le),
        ("{a >= b}", BinaryOp::Ge),
        ("{a << b}", BinaryOp::Shl),
        ("{a >> b}", BinaryOp::Shr),
        ("{a >>> b}", BinaryOp::UShr),
        ("{a + b}", BinaryOp::Add),
        ("{a - b}", BinaryOp::Sub),
        ("{a * b}", BinaryOp::Mul),
        ("{a / b}", BinaryOp::Div),
        ("{a % b}", BinaryOp::Rem),
    ];
    for (template, op) in cases {
        assert_eq!(
            compile(template).unwrap(),
            Expr::binary(op, Expr::ident("a"), Expr::ident("b")),
            "template {}",
            template
        );
    }
}

#[test]
fn test_syntax_error_span_points_into_template() {
    let err = compile("total: {a +}").unwrap_err();
    match err {
        CompileError::ExpressionSyntax { text, span, .. } => {
            assert_eq!(text, "a +");
            assert!(span.start >= 8 && span.end <= 11, "span {:?}", span);
        }
        other => panic!("Expected syntax error, got {:?}", other),
    }
}

#[test]
fn test_rendered_output_snapshots() {
    insta::assert_snapshot!(compile("Hello, {name}!").unwrap(), @r#""Hello, " + name + "!""#);
    insta::assert_snapshot!(compile("{a}{b}").unwrap(), @r#""" + a + b"#);
    insta::assert_snapshot!(compile("x{a ? b : c}").unwrap(), @r#""x" + (a ? b : c)"#);
    insta::assert_snapshot!(compile("{items[i].name}: {(int) total}").unwrap(), @r#""" + items[i].name + ": " + (int) total"#);
    insta::assert_snapshot!(compile("{size()} items").unwrap(), @r#""" + this.size() + " items""#);
}

#[test]
fn test_nested_templates_option() {
    let options = TemplateOptions::default().with_nested_templates(true);
    let expr = compile_with("{wrap(`<{tag}>`)}", &options).unwrap();
    let env = Env::new()
        .var("tag", Value::str("b"))
        .function("wrap", |args| Value::Str(format!("[{}]", args[0].render())));
    assert_eq!(render(&expr, &env), "[<b>]");
}
