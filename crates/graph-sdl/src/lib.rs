//! # graph-sdl
//!
//! GraphQL SDL generation from graph schema descriptions.
//!
//! This crate turns one or more schema description files into a single
//! GraphQL SDL document that a Neo4j-GraphQL-style library can load as is:
//! one `type` per node label, one field per property and one
//! `@relationship`-annotated field per edge end.
//!
//! ## Architecture
//!
//! 1. **Load** - Read each file as introspection JSON or MDF YAML (`input`)
//! 2. **Merge** - Overlay every file onto one ordered model, left to right (`model`)
//! 3. **Resolve** - Map value domains to GraphQL types (`domain`) and expand
//!    edges into relationship fields (`relationship`)
//! 4. **Emit** - Serialize the model to SDL and syntax-check the result (`emit`)
//!
//! ## Usage
//!
//! ```no_run
//! use graph_sdl::{Transpiler, TranspileOptions};
//!
//! let mut transpiler = Transpiler::new(TranspileOptions::default());
//! transpiler.add_file("model/ccdi-dcc-model.yml")?;
//! transpiler.add_file("model/ccdi-dcc-model-props.yml")?;
//!
//! let sdl = transpiler.render()?;
//! print!("{}", sdl);
//! # Ok::<(), graph_sdl::SdlError>(())
//! ```

pub mod domain;
pub mod emit;
pub mod input;
pub mod model;
pub mod options;
pub mod relationship;
mod transpiler;

use std::path::PathBuf;
use thiserror::Error;

pub use domain::{GqlType, Scalar, ValueDomain};
pub use input::InputFormat;
pub use model::{
    Cardinality, Direction, EdgeDeclaration, Multiplicity, NodeDefinition, PropertyDefinition,
    RelationshipDefinition, SchemaModel,
};
pub use options::{FieldNaming, TranspileOptions};
pub use transpiler::{transpile_files, Transpiler};

#[derive(Debug, Error)]
pub enum SdlError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{path}: missing required section: {section}")]
    MissingSection { path: PathBuf, section: String },

    #[error("relationship `{edge}` references undeclared node `{label}`")]
    UnknownNode { edge: String, label: String },

    #[error("relationship `{edge}` has unknown multiplicity `{value}`")]
    UnknownMultiplicity { edge: String, value: String },

    #[error("property `{property}` of node `{node}` has no definition")]
    UndefinedProperty { node: String, property: String },

    #[error("node labels `{first}` and `{second}` both map to type `{name}`")]
    DuplicateType {
        name: String,
        first: String,
        second: String,
    },

    #[error("node `{0}` collides with the helper type of the same name")]
    ReservedTypeName(String),

    #[error("no input files given")]
    NoInput,

    #[error("generated SDL failed to parse: {0}")]
    InvalidSdl(String),
}

pub type Result<T> = std::result::Result<T, SdlError>;
