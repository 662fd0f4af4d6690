//! Generation pipeline
//!
//! resolve options -> deduplicate parameters -> render -> assemble response.
//! Every failure is returned to the caller; nothing here exits the process.

use sqlrender_core::{resolve_options, Config, GenerateRequest, GenerateResponse, OptionsError, OptionsPolicy};
use sqlrender_template::{RenderError, Renderer, TemplateSource};
use crate::dedup::dedupe_parameter_names;
use crate::response::assemble;

/// Generation errors
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    Options(#[from] OptionsError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Renders requests with one template
#[derive(Debug, Clone)]
pub struct Generator {
    template: TemplateSource,
    config: Config,
}

impl Generator {
    /// Create a generator for a template with default configuration
    pub fn new(template: TemplateSource) -> Self {
        Self {
            template,
            config: Config::default(),
        }
    }

    /// Create a generator from configuration, loading the configured
    /// template or falling back to the embedded one
    pub fn from_config(config: &Config) -> Result<Self, GenerateError> {
        let template = match config.template_path() {
            Some(path) => TemplateSource::from_file(&path)?,
            None => TemplateSource::embedded(),
        };

        Ok(Self::new(template).with_config(config.clone()))
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Override how malformed plugin options are handled
    pub fn with_options_policy(mut self, policy: OptionsPolicy) -> Self {
        self.config.options_policy = policy;
        self
    }

    pub fn template(&self) -> &TemplateSource {
        &self.template
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run one generation call
    ///
    /// The request is consumed: parameter names are rewritten in place before
    /// rendering. Output is all-or-nothing.
    pub fn generate(&self, mut request: GenerateRequest) -> Result<GenerateResponse, GenerateError> {
        let _span = tracing::debug_span!(
            "generate",
            template = %self.template.name,
            queries = request.queries.len()
        )
        .entered();

        let resolved = resolve_options(&request.plugin_options, self.config.options_policy)?;
        tracing::debug!(
            filename = %resolved.options.filename,
            plugin_options = resolved.plugin_options.len(),
            "resolved plugin options"
        );

        let renamed = dedupe_parameter_names(&mut request.queries);
        tracing::debug!(renamed, "deduplicated parameter names");

        let renderer = Renderer::new(&self.template, &self.config.render, resolved.plugin_options)?;
        let contents = renderer.render(&request)?;

        if resolved.options.filename.is_empty() {
            tracing::warn!("plugin option `filename` is empty; emitting a file with an empty name");
        }
        tracing::info!(
            file = %resolved.options.filename,
            bytes = contents.len(),
            "generated file"
        );

        Ok(assemble(resolved.options.filename, contents))
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new(TemplateSource::embedded())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlrender_core::{Column, Query};

    fn request(options: &str) -> GenerateRequest {
        let mut request = GenerateRequest::default();
        request.plugin_options = options.as_bytes().to_vec();
        request.queries.push(
            Query::new("Q", ":many", "SELECT * FROM t WHERE id = ? OR id = ?")
                .with_param(Column::new("id", "int8"))
                .with_param(Column::new("id", "int8")),
        );
        request
    }

    fn names_template() -> TemplateSource {
        TemplateSource::new(
            "names",
            "{% for p in queries[0].params %}{{ p.column.name }};{% endfor %}",
        )
    }

    #[test]
    fn parameters_are_deduplicated_before_rendering() {
        let response = Generator::new(names_template())
            .generate(request(r#"{"filename": "out.txt"}"#))
            .unwrap();

        assert_eq!(response.files[0].contents_lossy(), "id;id1;");
    }

    #[test]
    fn strict_policy_rejects_malformed_options() {
        let err = Generator::new(names_template())
            .generate(request("[]"))
            .unwrap_err();

        assert!(matches!(err, GenerateError::Options(_)));
    }

    #[test]
    fn lenient_policy_degrades() {
        let response = Generator::new(names_template())
            .with_options_policy(OptionsPolicy::Lenient)
            .generate(request("[]"))
            .unwrap();

        assert_eq!(response.files[0].name, "");
        assert_eq!(response.files[0].contents_lossy(), "id;id1;");
    }

    #[test]
    fn missing_template_file_is_io_error() {
        let mut config = Config::default();
        config.template = Some("/nonexistent/sqlrender/template.jinja".into());

        let err = Generator::from_config(&config).unwrap_err();
        assert!(matches!(err, GenerateError::Render(RenderError::IoError(_))));
    }

    #[test]
    fn default_uses_embedded_template() {
        let generator = Generator::default();
        assert_eq!(generator.template().name, sqlrender_template::EMBEDDED_TEMPLATE_NAME);
        assert_eq!(generator.config().options_policy, OptionsPolicy::Strict);
    }
}
