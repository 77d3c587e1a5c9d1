//! Brace Template - compile-time string templates
//!
//! Compiles string literals with embedded `{expression}` placeholders into
//! concatenation expressions, and rewrites host programs so that annotated
//! literals (or format-call arguments) are replaced by their compiled form.
//!
//! # Example
//!
//! ```rust
//! use brace_template::rewrite_source;
//!
//! let output = rewrite_source(r#"
//!     @template
//!     fn greet(name) {
//!         return "Hello, {name}!";
//!     }
//! "#).unwrap();
//!
//! assert!(output.diagnostics.is_empty());
//! assert!(output.source().contains(r#"return "Hello, " + name + "!";"#));
//! ```

pub mod ast;
pub mod compiler;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod factory;
pub mod host;
pub mod parser;
pub mod rewrite;

pub use ast::{BinaryOp, Expr, Literal};
pub use compiler::{compile, compile_with, concat, parse_expr, scan, scan_with};
pub use config::{Config, ConfigError, RewriteConfig, TemplateOptions};
pub use diagnostic::{Diagnostic, DiagnosticSink, TracingSink};
pub use error::{CompileError, ParseError};
pub use factory::{build, build_template, TreeFactory};
pub use rewrite::{Mode, RewriteStats, Rewriter};

use thiserror::Error;

/// Errors that stop a whole rewrite
///
/// Template errors never appear here: they are per-node diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    /// Host source does not parse
    #[error("parse errors: {}", format_parse_errors(.0))]
    Parse(Vec<ParseError>),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl From<Vec<ParseError>> for Error {
    fn from(errors: Vec<ParseError>) -> Self {
        Error::Parse(errors)
    }
}

fn format_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result of rewriting host source
#[derive(Debug, Clone)]
pub struct RewriteOutput {
    pub program: host::Program,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: RewriteStats,
}

impl RewriteOutput {
    /// The rewritten program as host source
    pub fn source(&self) -> String {
        self.program.to_string()
    }
}

/// Rewrite host source with the default configuration
pub fn rewrite_source(source: &str) -> Result<RewriteOutput, Error> {
    rewrite_source_with_config(source, &Config::default())
}

/// Parse, rewrite and collect diagnostics
///
/// # Example
///
/// ```rust
/// use brace_template::{rewrite_source_with_config, Config, RewriteConfig};
///
/// let config = Config::default()
///     .with_rewrite(RewriteConfig::default().with_format_functions(["fmt"]));
///
/// let output = rewrite_source_with_config(
///     "@format\nconst A = fmt(\"v{major}.{minor}\");",
///     &config,
/// ).unwrap();
/// assert_eq!(output.source(), "@format\nconst A = fmt(\"v\" + major + \".\" + minor);\n");
/// ```
pub fn rewrite_source_with_config(source: &str, config: &Config) -> Result<RewriteOutput, Error> {
    config.validate()?;
    let program = host::parse(source)?;
    let mut rewriter = Rewriter::new(config, Vec::new());
    let program = rewriter.rewrite(program);
    let stats = rewriter.stats();
    Ok(RewriteOutput {
        program,
        diagnostics: rewriter.into_sink(),
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_source_reports_without_failing() {
        let output = rewrite_source("@template\nconst A = \"{a\";\nconst B = 1;").unwrap();
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.stats.rejected, 1);
        assert!(output.source().contains("const A = \"{a\";"));
    }

    #[test]
    fn test_host_parse_error_fails() {
        let result = rewrite_source("fn (");
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn test_invalid_config_fails() {
        let config = Config::default()
            .with_template(TemplateOptions::default().with_delimiters('{', '{'));
        let result = rewrite_source_with_config("const A = 1;", &config);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_compile_reexport() {
        assert_eq!(compile("x").unwrap(), Expr::string("x"));
    }
}
