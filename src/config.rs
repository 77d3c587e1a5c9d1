//! Compiler and rewriter configuration
//!
//! Loaded from TOML:
//!
//! ```toml
//! [template]
//! open = "{"
//! close = "}"
//! backtick_quotes = true
//! nested_templates = false
//!
//! [rewrite]
//! literal_annotation = "template"
//! call_annotation = "format"
//! format_functions = ["format", "Strings.format"]
//! ```
//!
//! Every key is optional.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// How template text is scanned and compiled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateOptions {
    /// Opening placeholder delimiter
    pub open: char,
    /// Closing placeholder delimiter
    pub close: char,
    /// Replace backticks in placeholder text with double quotes before parsing
    pub backtick_quotes: bool,
    /// Compile string literals found inside placeholder expressions as templates
    pub nested_templates: bool,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            open: '{',
            close: '}',
            backtick_quotes: true,
            nested_templates: false,
        }
    }
}

impl TemplateOptions {
    pub fn with_delimiters(mut self, open: char, close: char) -> Self {
        self.open = open;
        self.close = close;
        self
    }

    pub fn with_backtick_quotes(mut self, enabled: bool) -> Self {
        self.backtick_quotes = enabled;
        self
    }

    pub fn with_nested_templates(mut self, enabled: bool) -> Self {
        self.nested_templates = enabled;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for c in [self.open, self.close] {
            if c == '`' || c == '"' {
                return Err(ConfigError::Invalid(format!(
                    "{:?} cannot be used as a placeholder delimiter",
                    c
                )));
            }
        }
        if self.open == self.close {
            return Err(ConfigError::Invalid(format!(
                "opening and closing delimiters must differ, both are {:?}",
                self.open
            )));
        }
        Ok(())
    }
}

/// Which elements and calls the rewriter compiles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteConfig {
    /// Annotation selecting literal mode; `None` disables the mode
    pub literal_annotation: Option<String>,
    /// Annotation selecting call-argument mode; `None` disables the mode
    pub call_annotation: Option<String>,
    /// Callee paths treated as format calls, e.g. `format` or `Strings.format`
    pub format_functions: Vec<String>,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            literal_annotation: Some("template".to_string()),
            call_annotation: Some("format".to_string()),
            format_functions: vec!["format".to_string(), "Strings.format".to_string()],
        }
    }
}

impl RewriteConfig {
    pub fn with_literal_annotation(mut self, annotation: Option<&str>) -> Self {
        self.literal_annotation = annotation.map(str::to_string);
        self
    }

    pub fn with_call_annotation(mut self, annotation: Option<&str>) -> Self {
        self.call_annotation = annotation.map(str::to_string);
        self
    }

    pub fn with_format_functions<S: Into<String>>(
        mut self,
        functions: impl IntoIterator<Item = S>,
    ) -> Self {
        self.format_functions = functions.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_format_function(&self, path: &str) -> bool {
        self.format_functions.iter().any(|f| f == path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let (Some(literal), Some(call)) = (&self.literal_annotation, &self.call_annotation) {
            if literal == call {
                return Err(ConfigError::Invalid(format!(
                    "annotation '{}' cannot select both literal and call-argument mode",
                    literal
                )));
            }
        }
        Ok(())
    }
}

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub template: TemplateOptions,
    pub rewrite: RewriteConfig,
}

/// TOML structure for deserializing configuration
#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    #[serde(default)]
    template: TomlTemplate,
    #[serde(default)]
    rewrite: TomlRewrite,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TomlTemplate {
    open: Option<String>,
    close: Option<String>,
    backtick_quotes: Option<bool>,
    nested_templates: Option<bool>,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TomlRewrite {
    literal_annotation: Option<String>,
    call_annotation: Option<String>,
    format_functions: Option<Vec<String>>,
}

fn single_char(key: &str, value: &str) -> Result<char, ConfigError> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(ConfigError::Invalid(format!(
            "{} must be a single character, got {:?}",
            key, value
        ))),
    }
}

/// An empty annotation name disables the mode
fn annotation(value: Option<String>, default: Option<String>) -> Option<String> {
    match value {
        Some(name) if name.is_empty() => None,
        Some(name) => Some(name),
        None => default,
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;
        let defaults = Config::default();

        let template = TemplateOptions {
            open: match parsed.template.open {
                Some(open) => single_char("template.open", &open)?,
                None => defaults.template.open,
            },
            close: match parsed.template.close {
                Some(close) => single_char("template.close", &close)?,
                None => defaults.template.close,
            },
            backtick_quotes: parsed
                .template
                .backtick_quotes
                .unwrap_or(defaults.template.backtick_quotes),
            nested_templates: parsed
                .template
                .nested_templates
                .unwrap_or(defaults.template.nested_templates),
        };

        let rewrite = RewriteConfig {
            literal_annotation: annotation(
                parsed.rewrite.literal_annotation,
                defaults.rewrite.literal_annotation,
            ),
            call_annotation: annotation(
                parsed.rewrite.call_annotation,
                defaults.rewrite.call_annotation,
            ),
            format_functions: parsed
                .rewrite
                .format_functions
                .unwrap_or(defaults.rewrite.format_functions),
        };

        let config = Config { template, rewrite };
        config.validate()?;
        Ok(config)
    }

    pub fn with_template(mut self, template: TemplateOptions) -> Self {
        self.template = template;
        self
    }

    pub fn with_rewrite(mut self, rewrite: RewriteConfig) -> Self {
        self.rewrite = rewrite;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.template.validate()?;
        self.rewrite.validate()
    }
}
