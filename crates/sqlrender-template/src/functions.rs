//! Template helper functions
//!
//! The fixed catalog of helpers available to every template by name:
//! `Contains`, `Dict`, `GetPluginOption`, `Split` and `ToLower`.

use minijinja::value::{Rest, ValueKind};
use minijinja::{Environment, Error, ErrorKind, Output, State, Value};
use sqlrender_core::PluginOptions;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Contains() - case-sensitive substring test
///
/// Usage in templates: {{ Contains(query.cmd, "many") }}
pub fn contains_function(haystack: &str, needle: &str) -> bool {
    haystack.contains(needle)
}

/// Dict() - builds a mapping from alternating keys and values
///
/// Usage in templates: {% set types = Dict("int4", "i32", "text", "String") %}
/// Returns: a key-ordered map; later duplicate keys win
pub fn dict_function(values: Rest<Value>) -> Result<Value, Error> {
    if values.len() % 2 != 0 {
        return Err(Error::new(
            ErrorKind::InvalidOperation,
            "Dict() requires an even number of arguments",
        ));
    }

    let mut dict = BTreeMap::new();
    for pair in values.chunks(2) {
        let key = pair[0].as_str().ok_or_else(|| {
            Error::new(ErrorKind::InvalidOperation, "Dict() keys must be strings")
        })?;
        dict.insert(key.to_string(), pair[1].clone());
    }

    Ok(Value::from_serialize(&dict))
}

/// GetPluginOption() - reads a key from the free-form plugin options
///
/// Returns "" for unknown keys, never an error.
pub fn plugin_option(options: &PluginOptions, name: &str) -> Value {
    match options.get(name) {
        Some(value) => Value::from_serialize(value),
        None => Value::from(""),
    }
}

/// Split() - splits on a literal separator
///
/// An empty separator splits into individual characters.
pub fn split_function(s: &str, sep: &str) -> Vec<String> {
    if sep.is_empty() {
        return s.chars().map(String::from).collect();
    }
    s.split(sep).map(String::from).collect()
}

/// ToLower() - lower-cases a string
pub fn to_lower_function(s: &str) -> String {
    s.to_lowercase()
}

/// Output formatter: booleans print as `true`/`false`, everything else as usual
pub fn value_formatter(out: &mut Output<'_>, state: &State<'_, '_>, value: &Value) -> Result<(), Error> {
    if value.kind() == ValueKind::Bool {
        out.write_str(if value.is_true() { "true" } else { "false" })?;
        return Ok(());
    }
    minijinja::escape_formatter(out, state, value)
}

/// Install every helper, and the output formatter, on the environment
pub fn register_functions(env: &mut Environment<'_>, plugin_options: Arc<PluginOptions>) {
    env.set_formatter(value_formatter);
    env.add_function("Contains", contains_function);
    env.add_function("Dict", dict_function);
    env.add_function("GetPluginOption", move |name: String| -> Value {
        plugin_option(&plugin_options, &name)
    });
    env.add_function("Split", split_function);
    env.add_function("ToLower", to_lower_function);
}
