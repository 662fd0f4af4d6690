//! sqlrender core
//!
//! Stable domain model shared by the template and engine crates.
//! Field names in `plugin` are part of the wire contract and the template
//! surface - never rename them.

pub mod plugin;
pub mod options;
pub mod config;

pub use plugin::{
    Catalog, Codegen, Column, CompositeType, Enum, File, GenerateRequest, GenerateResponse,
    Identifier, Parameter, Query, Schema, Settings, Table,
};
pub use options::{resolve_options, Options, OptionsError, OptionsPolicy, PluginOptions, ResolvedOptions};
pub use config::{Config, ConfigError, RenderConfig};
