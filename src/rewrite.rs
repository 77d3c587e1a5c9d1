//! Template rewriting over a host program
//!
//! Two modes, chosen per element by annotation:
//!
//! - [`Mode::Literal`]: every string literal in the element is compiled as a
//!   template and replaced by the compiled expression.
//! - [`Mode::CallArgument`]: only the argument of a format call is compiled.
//!   A literal argument is compiled, a `+` chain is classified leaf by leaf,
//!   identifiers, calls and `null` pass through, anything else is rejected.
//!
//! Replacement nodes are marked [`Origin::Generated`] and never revisited, so
//! rewriting a rewritten program changes nothing.

use tracing::{debug, info};

use crate::ast::{BinaryOp, Literal, Span};
use crate::compiler::compile_with;
use crate::config::Config;
use crate::diagnostic::{Diagnostic, DiagnosticSink};
use crate::error::CompileError;
use crate::factory::build_template;
use crate::host::{Element, ElementKind, Expr, ExprKind, HostFactory, Program, Stmt};

/// Which nodes of an element are templates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Literal,
    CallArgument,
}

/// Counters for one rewriter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteStats {
    /// Elements processed in some mode
    pub elements: usize,
    /// Nodes replaced by compiled output
    pub compiled: usize,
    /// Nodes left as written because of a diagnostic
    pub rejected: usize,
}

pub struct Rewriter<'c, D> {
    config: &'c Config,
    sink: D,
    stats: RewriteStats,
}

impl<'c, D: DiagnosticSink> Rewriter<'c, D> {
    pub fn new(config: &'c Config, sink: D) -> Self {
        Self {
            config,
            sink,
            stats: RewriteStats::default(),
        }
    }

    pub fn stats(&self) -> RewriteStats {
        self.stats
    }

    pub fn into_sink(self) -> D {
        self.sink
    }

    /// Mode selected by the element's annotations; literal mode wins
    pub fn mode_of(&self, element: &Element) -> Option<Mode> {
        let selected = |annotation: &Option<String>| {
            annotation
                .as_deref()
                .is_some_and(|name| element.has_annotation(name))
        };
        if selected(&self.config.rewrite.literal_annotation) {
            Some(Mode::Literal)
        } else if selected(&self.config.rewrite.call_annotation) {
            Some(Mode::CallArgument)
        } else {
            None
        }
    }

    /// Rewrite every annotated element; other elements are returned untouched
    pub fn rewrite(&mut self, program: Program) -> Program {
        let before = self.stats;
        let elements = program
            .elements
            .into_iter()
            .map(|mut element| {
                if let Some(mode) = self.mode_of(&element.node) {
                    element.node = self.rewrite_element(element.node, mode);
                }
                element
            })
            .collect();
        info!(
            elements = self.stats.elements - before.elements,
            compiled = self.stats.compiled - before.compiled,
            rejected = self.stats.rejected - before.rejected,
            "rewrite pass complete"
        );
        Program { elements }
    }

    pub fn rewrite_element(&mut self, element: Element, mode: Mode) -> Element {
        self.stats.elements += 1;
        let name = element.name().to_string();
        debug!(element = %name, ?mode, "rewriting element");

        let mut visit = |expr: Expr| match mode {
            Mode::Literal => self.literal_mode(&name, expr),
            Mode::CallArgument => self.call_mode(&name, expr),
        };

        let kind = match element.kind {
            ElementKind::Function { name, params, body } => ElementKind::Function {
                name,
                params,
                body: body
                    .into_iter()
                    .map(|mut stmt| {
                        stmt.node = match stmt.node {
                            Stmt::Let { name, value } => Stmt::Let {
                                name,
                                value: visit(value),
                            },
                            Stmt::Return(value) => Stmt::Return(value.map(&mut visit)),
                            Stmt::Expr(value) => Stmt::Expr(visit(value)),
                        };
                        stmt
                    })
                    .collect(),
            },
            ElementKind::Const { name, value } => ElementKind::Const {
                name,
                value: visit(value),
            },
        };
        Element {
            annotations: element.annotations,
            kind,
        }
    }

    /// Pre-order: a replaced literal is not descended into
    fn literal_mode(&mut self, element: &str, expr: Expr) -> Expr {
        if expr.is_generated() {
            return expr;
        }
        if let ExprKind::Literal(Literal::String(template)) = &expr.kind {
            return match self.compile_literal(template, &expr.span) {
                Ok(Some(compiled)) => {
                    self.stats.compiled += 1;
                    compiled
                }
                Ok(None) => expr,
                Err(error) => {
                    let diagnostic =
                        Diagnostic::in_literal(element, expr.span.clone(), template, error);
                    self.reject(diagnostic);
                    expr
                }
            };
        }
        expr.map_children(&mut |child| self.literal_mode(element, child))
    }

    /// Post-order: format calls nested in an argument are rewritten on their own first
    fn call_mode(&mut self, element: &str, expr: Expr) -> Expr {
        if expr.is_generated() {
            return expr;
        }
        let expr = expr.map_children(&mut |child| self.call_mode(element, child));
        if !self.is_format_call(&expr) {
            return expr;
        }

        let Expr { kind, span, origin } = expr;
        let (callee, args) = match kind {
            ExprKind::Call { callee, args } => (callee, args),
            kind => return Expr { kind, span, origin },
        };

        if args.len() != 1 {
            let error = CompileError::UnsupportedArgument {
                kind: format!("{} arguments", args.len()),
                span: span.clone(),
            };
            self.reject(Diagnostic::new(element, span.clone(), error));
            return Expr {
                kind: ExprKind::Call { callee, args },
                span,
                origin,
            };
        }

        let original = args[0].clone();
        let mut changed = false;
        let rewritten = args
            .into_iter()
            .map(|arg| self.classify(element, arg, &mut changed))
            .collect::<Result<Vec<_>, _>>();
        let args = match rewritten {
            Ok(args) => {
                if changed {
                    self.stats.compiled += 1;
                }
                args
            }
            Err(diagnostic) => {
                self.reject(diagnostic);
                vec![original]
            }
        };
        Expr {
            kind: ExprKind::Call { callee, args },
            span,
            origin,
        }
    }

    fn is_format_call(&self, expr: &Expr) -> bool {
        match &expr.kind {
            ExprKind::Call { callee, .. } => callee
                .path()
                .is_some_and(|path| self.config.rewrite.is_format_function(&path)),
            _ => false,
        }
    }

    /// Compile the literal leaves of a format argument
    ///
    /// Nested calls are values, not templates: their arguments are not
    /// classified here.
    fn classify(
        &mut self,
        element: &str,
        arg: Expr,
        changed: &mut bool,
    ) -> Result<Expr, Diagnostic> {
        if arg.is_generated() {
            return Ok(arg);
        }
        match arg.kind {
            ExprKind::Literal(Literal::String(template)) => {
                match self.compile_literal(&template, &arg.span) {
                    Ok(Some(compiled)) => {
                        *changed = true;
                        Ok(compiled)
                    }
                    Ok(None) => Ok(Expr::new(
                        ExprKind::Literal(Literal::String(template)),
                        arg.span,
                    )),
                    Err(error) => Err(Diagnostic::in_literal(element, arg.span, &template, error)),
                }
            }
            ExprKind::Literal(Literal::Null) | ExprKind::Ident(_) | ExprKind::Call { .. } => {
                Ok(arg)
            }
            ExprKind::Binary {
                op: BinaryOp::Add,
                lhs,
                rhs,
            } => {
                let lhs = self.classify(element, *lhs, changed)?;
                let rhs = self.classify(element, *rhs, changed)?;
                Ok(Expr {
                    kind: ExprKind::Binary {
                        op: BinaryOp::Add,
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                    },
                    span: arg.span,
                    origin: arg.origin,
                })
            }
            _ => {
                let error = CompileError::UnsupportedArgument {
                    kind: arg.describe().to_string(),
                    span: arg.span.clone(),
                };
                Err(Diagnostic::new(element, arg.span, error))
            }
        }
    }

    /// Compile one literal; `None` when the template has no placeholders
    fn compile_literal(&self, template: &str, span: &Span) -> Result<Option<Expr>, CompileError> {
        let compiled = compile_with(template, &self.config.template)?;
        if compiled.as_string_literal() == Some(template) {
            return Ok(None);
        }
        let mut factory = HostFactory::new(span.clone());
        let replacement = build_template(&compiled, &mut factory);
        debug!(span = ?span, replacement = %replacement, "compiled literal");
        Ok(Some(replacement))
    }

    fn reject(&mut self, diagnostic: Diagnostic) {
        self.stats.rejected += 1;
        self.sink.report(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host;

    fn rewrite(source: &str) -> (String, Vec<Diagnostic>, RewriteStats) {
        let config = Config::default();
        let program = host::parse(source).expect("Should parse");
        let mut rewriter = Rewriter::new(&config, Vec::new());
        let program = rewriter.rewrite(program);
        let stats = rewriter.stats();
        (program.to_string(), rewriter.into_sink(), stats)
    }

    #[test]
    fn test_unannotated_element_untouched() {
        let (out, diags, stats) = rewrite("const A = \"{x}\";");
        assert_eq!(out, "const A = \"{x}\";\n");
        assert!(diags.is_empty());
        assert_eq!(stats.elements, 0);
    }

    #[test]
    fn test_literal_mode_replaces_literal() {
        let (out, diags, stats) = rewrite("@template\nconst A = \"Hi {name}!\";");
        assert_eq!(out, "@template\nconst A = \"Hi \" + name + \"!\";\n");
        assert!(diags.is_empty());
        assert_eq!(stats.compiled, 1);
    }

    #[test]
    fn test_literal_mode_parenthesizes_in_context() {
        let (out, _, _) = rewrite("@template\nconst A = \"{a ? b : c}\".length();");
        assert_eq!(out, "@template\nconst A = (\"\" + (a ? b : c)).length();\n");
    }

    #[test]
    fn test_plain_literal_not_counted() {
        let (out, _, stats) = rewrite("@template\nconst A = \"plain\";");
        assert_eq!(out, "@template\nconst A = \"plain\";\n");
        assert_eq!(stats.compiled, 0);
    }

    #[test]
    fn test_call_mode_only_touches_format_argument() {
        let (out, diags, stats) =
            rewrite("@format\nconst A = format(\"{x}!\") + \"{y}\";");
        assert_eq!(out, "@format\nconst A = format(\"\" + x + \"!\") + \"{y}\";\n");
        assert!(diags.is_empty());
        assert_eq!(stats.compiled, 1);
    }

    #[test]
    fn test_call_mode_concatenation_leaves() {
        let (out, diags, _) = rewrite("@format\nconst A = Strings.format(\"a{x}\" + y + \"{z}\");");
        assert_eq!(
            out,
            "@format\nconst A = Strings.format(\"a\" + x + y + (\"\" + z));\n"
        );
        assert!(diags.is_empty());
    }

    #[test]
    fn test_call_mode_passthrough() {
        let (out, diags, stats) = rewrite("@format\nconst A = format(name);\nconst B = 1;");
        assert!(out.starts_with("@format\nconst A = format(name);\n"));
        assert!(diags.is_empty());
        assert_eq!(stats.compiled, 0);
    }

    #[test]
    fn test_call_mode_unsupported_argument() {
        let (out, diags, stats) = rewrite("@format\nconst A = format(a * 2);");
        assert_eq!(out, "@format\nconst A = format(a * 2);\n");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind(), "unsupported-argument");
        assert_eq!(diags[0].span, 25..30);
        assert_eq!(stats.rejected, 1);
    }

    #[test]
    fn test_call_mode_argument_count() {
        let (_, diags, _) = rewrite("@format\nconst A = format(\"{a}\", b);");
        assert_eq!(diags.len(), 1);
        match &diags[0].error {
            CompileError::UnsupportedArgument { kind, .. } => assert_eq!(kind, "2 arguments"),
            other => panic!("Expected unsupported argument, got {:?}", other),
        }
    }

    #[test]
    fn test_failed_leaf_leaves_whole_call() {
        let (out, diags, _) = rewrite("@format\nconst A = format(\"{a}\" + \"{b\");");
        assert_eq!(out, "@format\nconst A = format(\"{a}\" + \"{b\");\n");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind(), "template-syntax");
    }

    #[test]
    fn test_nested_format_call_rewritten_on_its_own() {
        let (out, diags, stats) = rewrite("@format\nconst A = format(\"[\" + format(\"{x}\"));");
        assert_eq!(out, "@format\nconst A = format(\"[\" + format(\"\" + x));\n");
        assert!(diags.is_empty());
        assert_eq!(stats.compiled, 1);
    }

    #[test]
    fn test_literal_mode_wins() {
        let (out, _, _) = rewrite("@format\n@template\nconst A = \"{a}\" + \"{b}\";");
        assert_eq!(out, "@format\n@template\nconst A = \"\" + a + (\"\" + b);\n");
    }

    #[test]
    fn test_error_does_not_stop_siblings() {
        let source = "@template\nfn f() {\n    let a = \"{x\";\n    return \"{y}\";\n}";
        let (out, diags, stats) = rewrite(source);
        assert_eq!(
            out,
            "@template\nfn f() {\n    let a = \"{x\";\n    return \"\" + y;\n}\n"
        );
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].element, "f");
        assert_eq!(stats.compiled, 1);
        assert_eq!(stats.rejected, 1);
    }

    #[test]
    fn test_second_pass_is_noop() {
        let config = Config::default();
        // The generated literal "{" would be an unclosed template if revisited
        let source = r#"@template
const A = "{\"\\u007b\"}" + "-{x}";"#;
        let program = host::parse(source).expect("Should parse");
        let mut rewriter = Rewriter::new(&config, Vec::new());
        let once = rewriter.rewrite(program);
        let twice = rewriter.rewrite(once.clone());
        assert_eq!(once, twice);
        assert!(rewriter.into_sink().is_empty());
    }
}
