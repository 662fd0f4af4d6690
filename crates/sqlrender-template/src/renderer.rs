//! Template rendering
//!
//! Binds the helper catalog and a request into one template and renders it
//! to bytes. Rendering is all-or-nothing: any failure discards the output.

use minijinja::{Environment, Error as JinjaError, ErrorKind, UndefinedBehavior};
use sqlrender_core::{GenerateRequest, PluginOptions, RenderConfig};
use std::path::Path;
use std::sync::Arc;
use crate::context::RenderContext;

/// Name of the template compiled into the binary
pub const EMBEDDED_TEMPLATE_NAME: &str = "queries.rs.jinja";

const EMBEDDED_TEMPLATE: &str = include_str!("../templates/queries.rs.jinja");

/// A named template body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSource {
    /// Name used in diagnostics
    pub name: String,

    /// Template text
    pub source: String,
}

impl TemplateSource {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    /// The template compiled into the binary
    pub fn embedded() -> Self {
        Self::new(EMBEDDED_TEMPLATE_NAME, EMBEDDED_TEMPLATE)
    }

    /// Load a template from disk, named after the file
    pub fn from_file(path: &Path) -> Result<Self, RenderError> {
        let source = std::fs::read_to_string(path)?;
        Ok(Self::new(path.display().to_string(), source))
    }
}

impl Default for TemplateSource {
    fn default() -> Self {
        Self::embedded()
    }
}

/// Error during template parsing or rendering
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Error parsing template {name}: {message}")]
    Syntax {
        name: String,
        message: String,
        line: Option<usize>,
    },

    #[error("Error executing template {name}: {message}")]
    Render {
        name: String,
        message: String,
        line: Option<usize>,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl RenderError {
    /// Line the error was reported at, when known
    pub fn line(&self) -> Option<usize> {
        match self {
            RenderError::Syntax { line, .. } | RenderError::Render { line, .. } => *line,
            RenderError::IoError(_) => None,
        }
    }

    fn from_jinja(error: JinjaError, name: &str) -> Self {
        let name = error.name().unwrap_or(name).to_string();
        let line = error.line();
        let message = describe(&error);

        if error.kind() == ErrorKind::SyntaxError {
            RenderError::Syntax { name, message, line }
        } else {
            RenderError::Render { name, message, line }
        }
    }
}

/// Flatten an error and its sources into one line
fn describe(error: &JinjaError) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// A parsed template with its helper environment
pub struct Renderer {
    env: Environment<'static>,
    name: String,
    plugin_options: Arc<PluginOptions>,
}

impl Renderer {
    /// Build the environment and parse the template
    pub fn new(
        template: &TemplateSource,
        settings: &RenderConfig,
        plugin_options: PluginOptions,
    ) -> Result<Self, RenderError> {
        let mut env = Environment::new();

        env.set_trim_blocks(settings.trim_blocks);
        env.set_lstrip_blocks(settings.lstrip_blocks);
        env.set_keep_trailing_newline(settings.keep_trailing_newline);
        if settings.strict_undefined {
            env.set_undefined_behavior(UndefinedBehavior::Strict);
        }

        let plugin_options = Arc::new(plugin_options);
        crate::functions::register_functions(&mut env, Arc::clone(&plugin_options));

        env.add_template_owned(template.name.clone(), template.source.clone())
            .map_err(|e| RenderError::from_jinja(e, &template.name))?;

        tracing::debug!(template = %template.name, "parsed template");

        Ok(Self {
            env,
            name: template.name.clone(),
            plugin_options,
        })
    }

    /// Render the template against a request
    pub fn render(&self, request: &GenerateRequest) -> Result<Vec<u8>, RenderError> {
        let context = RenderContext::new(request, &self.plugin_options);
        let template = self
            .env
            .get_template(&self.name)
            .map_err(|e| RenderError::from_jinja(e, &self.name))?;

        let mut buf = Vec::new();
        template
            .render_to_write(context.to_minijinja_value(), &mut buf)
            .map_err(|e| RenderError::from_jinja(e, &self.name))?;

        tracing::debug!(template = %self.name, bytes = buf.len(), "rendered template");
        Ok(buf)
    }
}

/// Parse a template without rendering it
pub fn check_template(template: &TemplateSource, settings: &RenderConfig) -> Result<(), RenderError> {
    Renderer::new(template, settings, PluginOptions::default()).map(|_| ())
}
