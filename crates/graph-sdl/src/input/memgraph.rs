//! Graph database introspection JSON.
//!
//! The shape is what Memgraph's `SHOW SCHEMA INFO` returns:
//!
//! ```json
//! {
//!   "schema": {
//!     "nodes": [
//!       { "labels": ["participant"],
//!         "properties": [ { "key": "participant_id", "types": [ { "type": "String", "count": 12 } ] } ] }
//!     ],
//!     "edges": [
//!       { "type": "of_study", "start_node_labels": ["participant"], "end_node_labels": ["study"] }
//!     ]
//!   }
//! }
//! ```
//!
//! Counts, filling factors and edge properties are ignored. The first label of
//! a node is its GraphQL type name.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use super::SourceDocument;
use crate::domain::ValueDomain;
use crate::model::{EdgeDeclaration, Multiplicity, NodeDeclaration, PropertyDeclaration};
use crate::{Result, SdlError};

#[derive(Debug, Deserialize)]
struct IntrospectionDocument {
    schema: Option<IntrospectionSchema>,
}

#[derive(Debug, Deserialize)]
struct IntrospectionSchema {
    #[serde(default)]
    nodes: Vec<NodeInfo>,
    #[serde(default)]
    edges: Vec<EdgeInfo>,
}

#[derive(Debug, Deserialize)]
struct NodeInfo {
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    properties: Vec<PropertyInfo>,
}

#[derive(Debug, Deserialize)]
struct PropertyInfo {
    key: String,
    #[serde(default)]
    types: Vec<TypeEntry>,
}

/// Type entries come either as bare names or as `{ "type": ..., "count": ... }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TypeEntry {
    Name(String),
    Detailed {
        #[serde(rename = "type")]
        name: String,
    },
}

impl TypeEntry {
    fn name(&self) -> &str {
        match self {
            TypeEntry::Name(name) | TypeEntry::Detailed { name } => name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct EdgeInfo {
    #[serde(rename = "type", default)]
    edge_type: String,
    #[serde(default)]
    start_node_labels: Vec<String>,
    #[serde(default)]
    end_node_labels: Vec<String>,
}

pub fn parse(path: &Path, content: &str) -> Result<SourceDocument> {
    let document: IntrospectionDocument =
        serde_json::from_str(content).map_err(|source| SdlError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    let schema = document.schema.ok_or_else(|| SdlError::MissingSection {
        path: path.to_path_buf(),
        section: "schema".to_string(),
    })?;

    let mut doc = SourceDocument::empty(path);

    for node in schema.nodes {
        let Some(label) = node.labels.into_iter().next() else {
            debug!(path = %path.display(), "skipping node without labels");
            continue;
        };

        let properties = node
            .properties
            .into_iter()
            .map(|prop| {
                let domain = declared_domain(&prop.types);
                PropertyDeclaration::typed(prop.key, domain)
            })
            .collect();

        doc.nodes.push(NodeDeclaration { label, properties });
    }

    for edge in schema.edges {
        let (Some(source), Some(target)) = (
            edge.start_node_labels.into_iter().next(),
            edge.end_node_labels.into_iter().next(),
        ) else {
            debug!(edge = %edge.edge_type, "skipping edge without start or end labels");
            continue;
        };
        if edge.edge_type.is_empty() {
            debug!(%source, %target, "skipping edge without a type");
            continue;
        }

        doc.edges.push(EdgeDeclaration {
            label: edge.edge_type,
            source,
            target,
            multiplicity: Multiplicity::ManyToMany,
        });
    }

    debug!(
        path = %path.display(),
        nodes = doc.nodes.len(),
        edges = doc.edges.len(),
        "parsed introspection JSON"
    );
    Ok(doc)
}

/// First non-null type name, or an unrecognized domain when there is none.
fn declared_domain(types: &[TypeEntry]) -> ValueDomain {
    types
        .iter()
        .map(TypeEntry::name)
        .find(|name| !name.eq_ignore_ascii_case("null"))
        .map(ValueDomain::from_name)
        .unwrap_or_default()
}
