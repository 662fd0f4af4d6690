//! Code generation request/response contract
//!
//! These types mirror the structured metadata handed to a codegen plugin by
//! the upstream SQL compiler: the catalog, the parsed queries with their bind
//! parameters and result columns, and the opaque plugin option blobs.
//!
//! Field names are part of the wire contract and of the template surface.
//! Do not rename them.

use serde::{Deserialize, Serialize};

/// A qualified name (`catalog.schema.name`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Identifier {
    pub catalog: String,
    pub schema: String,
    pub name: String,
}

impl Identifier {
    /// Create an identifier with only a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Create a schema-qualified identifier
    pub fn qualified(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            catalog: String::new(),
            schema: schema.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for part in [&self.catalog, &self.schema] {
            if !part.is_empty() {
                write!(f, "{}.", part)?;
            }
        }
        write!(f, "{}", self.name)
    }
}

/// A named, typed attribute: either a parameter's bound column or a result column
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Column {
    /// Column name (the only field parameter deduplication rewrites)
    pub name: String,

    /// `NOT NULL` constraint present
    pub not_null: bool,

    pub is_array: bool,

    pub comment: String,

    /// Declared length, `-1` when unbounded
    pub length: i32,

    /// Bound through a named parameter (`@name` / `sqlc.arg(name)`)
    pub is_named_param: bool,

    pub is_func_call: bool,

    pub scope: String,

    /// Table the column belongs to
    pub table: Option<Identifier>,

    pub table_alias: String,

    /// Database type of the column
    #[serde(rename = "type")]
    pub column_type: Option<Identifier>,

    pub is_sqlc_slice: bool,

    pub embed_table: Option<Identifier>,

    pub original_name: String,

    pub unsigned: bool,

    pub array_dims: i32,
}

impl Column {
    /// Create a column with a bare type name
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: Some(Identifier::new(type_name)),
            ..Self::default()
        }
    }

    /// Mark the column as `NOT NULL`
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// The bare type name, or `""` when no type was resolved
    pub fn type_name(&self) -> &str {
        self.column_type
            .as_ref()
            .map(|t| t.name.as_str())
            .unwrap_or("")
    }
}

/// A bind site within a query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameter {
    /// 1-based bind position
    pub number: i32,

    pub column: Option<Column>,
}

impl Parameter {
    pub fn new(number: i32, column: Column) -> Self {
        Self {
            number,
            column: Some(column),
        }
    }

    /// Name of the bound column, if any
    pub fn column_name(&self) -> Option<&str> {
        self.column.as_ref().map(|c| c.name.as_str())
    }
}

/// One SQL statement plus its parameters and result columns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Query {
    /// SQL text as it should be sent to the database
    pub text: String,

    /// Query name from the `-- name:` annotation
    pub name: String,

    /// Command annotation (`:one`, `:many`, `:exec`, ...)
    pub cmd: String,

    /// Result columns
    pub columns: Vec<Column>,

    /// Bind parameters in bind order
    pub params: Vec<Parameter>,

    pub comments: Vec<String>,

    /// Source file the query was declared in
    pub filename: String,

    pub insert_into_table: Option<Identifier>,
}

impl Query {
    /// Create a query with no columns or parameters
    pub fn new(name: impl Into<String>, cmd: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cmd: cmd.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    /// Append a bind parameter, numbering it by position
    pub fn with_param(mut self, column: Column) -> Self {
        let number = self.params.len() as i32 + 1;
        self.params.push(Parameter::new(number, column));
        self
    }

    /// Append a result column
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Enum {
    pub name: String,
    pub vals: Vec<String>,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositeType {
    pub name: String,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Table {
    pub rel: Option<Identifier>,
    pub columns: Vec<Column>,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Schema {
    pub comment: String,
    pub name: String,
    pub tables: Vec<Table>,
    pub enums: Vec<Enum>,
    pub composite_types: Vec<CompositeType>,
}

/// Schema/catalog context the queries were compiled against
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub comment: String,
    pub default_schema: String,
    pub name: String,
    pub schemas: Vec<Schema>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Codegen {
    pub out: String,
    pub plugin: String,
    #[serde(with = "blob")]
    pub options: Vec<u8>,
}

/// Settings block of the upstream project configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub version: String,
    pub engine: String,
    pub schema: Vec<String>,
    pub queries: Vec<String>,
    pub codegen: Codegen,
}

/// Structured query metadata supplied for one generation call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateRequest {
    pub settings: Settings,
    pub catalog: Catalog,
    pub queries: Vec<Query>,
    pub sqlc_version: String,

    /// Plugin configuration, conventionally a JSON object
    #[serde(with = "blob")]
    pub plugin_options: Vec<u8>,

    #[serde(with = "blob")]
    pub global_options: Vec<u8>,
}

impl GenerateRequest {
    /// Parse a request from its JSON wire form
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Parse a request from JSON bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// A generated output file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct File {
    /// Output path relative to the caller's output directory
    pub name: String,

    #[serde(with = "blob")]
    pub contents: Vec<u8>,
}

impl File {
    pub fn new(name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }

    /// Contents as text, replacing invalid UTF-8
    pub fn contents_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.contents)
    }
}

/// Files produced by one generation call, in emission order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateResponse {
    pub files: Vec<File>,
}

impl GenerateResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a file
    pub fn push_file(&mut self, file: File) -> &mut Self {
        self.files.push(file);
        self
    }

    /// Find a file by name
    pub fn file(&self, name: &str) -> Option<&File> {
        self.files.iter().find(|f| f.name == name)
    }

    /// Serialize to pretty JSON
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Byte blobs travel as JSON strings.
///
/// On input a string is taken as its UTF-8 bytes, any other JSON value is
/// re-encoded compactly, and `null` becomes empty.
mod blob {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&String::from_utf8_lossy(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        match Option::<serde_json::Value>::deserialize(deserializer)? {
            None | Some(serde_json::Value::Null) => Ok(Vec::new()),
            Some(serde_json::Value::String(s)) => Ok(s.into_bytes()),
            Some(other) => serde_json::to_vec(&other).map_err(serde::de::Error::custom),
        }
    }
}
