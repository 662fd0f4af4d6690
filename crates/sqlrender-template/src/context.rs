//! Root binding for template rendering
//!
//! Every field of the request is reachable at the template root
//! (`queries`, `catalog`, `settings`, `sqlc_version`, ...), next to the
//! free-form plugin options under `options`.

use minijinja::Value as MinijinjaValue;
use serde::Serialize;
use sqlrender_core::{GenerateRequest, PluginOptions};

/// Data bound to a template for one generation call
#[derive(Debug, Clone, Serialize)]
pub struct RenderContext<'a> {
    #[serde(flatten)]
    pub request: &'a GenerateRequest,

    /// Free-form plugin options (same data as `GetPluginOption`)
    pub options: &'a PluginOptions,
}

impl<'a> RenderContext<'a> {
    pub fn new(request: &'a GenerateRequest, options: &'a PluginOptions) -> Self {
        Self { request, options }
    }

    /// Convert to MiniJinja value for rendering
    pub fn to_minijinja_value(&self) -> MinijinjaValue {
        MinijinjaValue::from_serialize(self)
    }
}
