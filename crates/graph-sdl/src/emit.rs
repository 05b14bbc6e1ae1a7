//! SDL serialization.

use crate::model::{Cardinality, NodeDefinition, RelationshipDefinition, SchemaModel};
use crate::options::TranspileOptions;
use crate::{Result, SdlError};

/// Name of the helper type returned by count-by-field queries.
pub const HELPER_TYPE_NAME: &str = "FieldCount";

const HELPER_TYPE: &str = "type FieldCount {\n  field: String!\n  count: Int!\n}\n";

/// Render `model` as SDL and make sure the result parses.
pub fn emit(model: &SchemaModel, options: &TranspileOptions) -> Result<String> {
    let sdl = render(model, options);
    check_syntax(&sdl)?;
    Ok(sdl)
}

/// Render `model` as SDL without checking it.
pub fn render(model: &SchemaModel, options: &TranspileOptions) -> String {
    let mut blocks: Vec<String> = Vec::with_capacity(model.nodes.len() + 2);

    if options.header {
        let mut header = String::from("#graphql\n\n# Auto-generated by graph-sdl. Do not edit.\n");
        match (&model.handle, &model.version) {
            (Some(handle), Some(version)) => header.push_str(&format!("# Model: {} {}\n", handle, version)),
            (Some(handle), None) => header.push_str(&format!("# Model: {}\n", handle)),
            (None, Some(version)) => header.push_str(&format!("# Model version: {}\n", version)),
            (None, None) => {}
        }
        blocks.push(header);
    }

    for node in &model.nodes {
        blocks.push(render_node(node));
    }

    if options.helper_type {
        blocks.push(HELPER_TYPE.to_string());
    }

    blocks.join("\n")
}

fn render_node(node: &NodeDefinition) -> String {
    if node.properties.is_empty() && node.relationships.is_empty() {
        return format!("type {}\n", node.label);
    }

    let mut output = format!("type {} {{\n", node.label);
    for prop in &node.properties {
        output.push_str(&format!("  {}: {}\n", prop.name, prop.domain.to_gql()));
    }
    for rel in &node.relationships {
        output.push_str(&format!("  {}\n", relationship_field(rel)));
    }
    output.push_str("}\n");
    output
}

/// `field: Type @relationship(type: "LABEL", direction: OUT)`
pub fn relationship_field(rel: &RelationshipDefinition) -> String {
    let ty = match rel.cardinality {
        Cardinality::Single => rel.target.clone(),
        Cardinality::List => format!("[{}!]!", rel.target),
    };
    format!(
        "{}: {} @relationship(type: \"{}\", direction: {})",
        rel.field_name,
        ty,
        escape_string(&rel.edge_label),
        rel.direction
    )
}

fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

/// Parse `sdl` as a GraphQL schema document.
pub fn check_syntax(sdl: &str) -> Result<()> {
    graphql_parser::parse_schema::<String>(sdl)
        .map(|_| ())
        .map_err(|e| SdlError::InvalidSdl(e.to_string()))
}
