//! Input loading.
//!
//! Two formats are understood:
//!
//! - `memgraph`: graph database introspection JSON (`{"schema": {"nodes": [...], "edges": [...]}}`)
//! - `mdf`: Model Description Format YAML (`Nodes`, `Relationships`, `PropDefinitions`)
//!
//! Either way a file becomes one [`SourceDocument`] that the model builder
//! overlays onto what came before.

pub mod mdf;
pub mod memgraph;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::ValueDomain;
use crate::model::{EdgeDeclaration, NodeDeclaration};
use crate::{Result, SdlError};

/// Everything one input file declares.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub handle: Option<String>,
    pub version: Option<String>,
    pub nodes: Vec<NodeDeclaration>,
    /// Named property types that nodes (in this or any other file) refer to.
    pub property_definitions: Vec<(String, ValueDomain)>,
    pub edges: Vec<EdgeDeclaration>,
}

impl SourceDocument {
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            handle: None,
            version: None,
            nodes: Vec::new(),
            property_definitions: Vec::new(),
            edges: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// Pick per file from the extension, then from the content.
    #[default]
    Auto,
    Json,
    Mdf,
}

impl InputFormat {
    /// Resolve `Auto` for one file. `.json` is JSON, `.yml`/`.yaml` is MDF,
    /// otherwise content starting with `{` is JSON and anything else MDF.
    pub fn resolve(self, path: &Path, content: &str) -> InputFormat {
        if self != InputFormat::Auto {
            return self;
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("json") => InputFormat::Json,
            Some("yml") | Some("yaml") => InputFormat::Mdf,
            _ if content.trim_start().starts_with('{') => InputFormat::Json,
            _ => InputFormat::Mdf,
        }
    }
}

impl FromStr for InputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "json" | "memgraph" => Ok(Self::Json),
            "mdf" | "yaml" | "yml" => Ok(Self::Mdf),
            other => Err(format!("unknown input format `{}` (expected auto, json or mdf)", other)),
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auto => "auto",
            Self::Json => "json",
            Self::Mdf => "mdf",
        })
    }
}

/// Read and parse one input file.
pub fn load_file(path: impl AsRef<Path>, format: InputFormat) -> Result<SourceDocument> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| SdlError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_str(path, &content, format)
}

/// Parse already loaded content. `path` is only used for format detection and
/// error messages.
pub fn parse_str(path: &Path, content: &str, format: InputFormat) -> Result<SourceDocument> {
    let format = format.resolve(path, content);
    debug!(path = %path.display(), %format, "parsing input");

    match format {
        InputFormat::Json => memgraph::parse(path, content),
        InputFormat::Mdf | InputFormat::Auto => mdf::parse(path, content),
    }
}
