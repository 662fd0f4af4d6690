//! Template rendering for generated query code
//!
//! This crate handles:
//! - The fixed catalog of template helpers (Contains, Dict, GetPluginOption, Split, ToLower)
//! - Binding a generation request as the template root
//! - Parsing and rendering a template to bytes
//! - The default template compiled into the binary

pub mod renderer;
pub mod context;
pub mod functions;

pub use renderer::{check_template, RenderError, Renderer, TemplateSource, EMBEDDED_TEMPLATE_NAME};
pub use context::RenderContext;
pub use functions::{
    contains_function, dict_function, plugin_option, register_functions, split_function,
    to_lower_function, value_formatter,
};
