//! sqlrender engine - generation pipeline
//!
//! This crate implements the generation call:
//! - Plugin option resolution (via sqlrender-core)
//! - Parameter name deduplication
//! - Template rendering (via sqlrender-template)
//! - Response assembly

pub mod dedup;
pub mod generator;
pub mod response;

pub use dedup::{dedupe_parameter_names, dedupe_query};
pub use generator::{GenerateError, Generator};
pub use response::assemble;
