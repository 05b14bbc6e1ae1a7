//! The merged schema model.
//!
//! Input readers produce declarations ([`NodeDeclaration`], property
//! definitions, [`EdgeDeclaration`]). A [`ModelBuilder`] overlays them file by
//! file, then [`ModelBuilder::build`] resolves property domains, validates
//! edges and expands them into relationship fields, yielding a [`SchemaModel`]
//! that is never mutated again.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, warn};

use crate::domain::ValueDomain;
use crate::emit::HELPER_TYPE_NAME;
use crate::input::SourceDocument;
use crate::options::TranspileOptions;
use crate::relationship::{sanitize_name, synthesize_relationships, FieldNamer};
use crate::{Result, SdlError};

/// Traversal direction of a relationship field, seen from the node that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Out,
    In,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Out => "OUT",
            Direction::In => "IN",
        })
    }
}

/// Whether a relationship field holds one node or a list of nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Single,
    List,
}

/// Edge multiplicity as declared by MDF `Mul` markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Multiplicity {
    OneToOne,
    OneToMany,
    ManyToOne,
    #[default]
    ManyToMany,
}

impl Multiplicity {
    /// Parse `one_to_many` style markers. Case and `-`/`_` are ignored.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "one_to_one" => Some(Self::OneToOne),
            "one_to_many" => Some(Self::OneToMany),
            "many_to_one" => Some(Self::ManyToOne),
            "many_to_many" => Some(Self::ManyToMany),
            _ => None,
        }
    }

    /// Cardinality of the OUT field on the source node.
    ///
    /// `many_to_one` means many sources point at one destination, so each
    /// source holds a single destination.
    pub fn out_cardinality(self) -> Cardinality {
        match self {
            Self::OneToOne | Self::ManyToOne => Cardinality::Single,
            Self::OneToMany | Self::ManyToMany => Cardinality::List,
        }
    }

    /// Cardinality of the IN field on the destination node.
    pub fn in_cardinality(self) -> Cardinality {
        match self {
            Self::OneToOne | Self::OneToMany => Cardinality::Single,
            Self::ManyToOne | Self::ManyToMany => Cardinality::List,
        }
    }
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OneToOne => "one_to_one",
            Self::OneToMany => "one_to_many",
            Self::ManyToOne => "many_to_one",
            Self::ManyToMany => "many_to_many",
        })
    }
}

/// A property as listed on a node in some input file.
///
/// `domain` is `None` when the file only names the property (MDF `Props`) and
/// the type comes from a property definition elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDeclaration {
    pub name: String,
    pub domain: Option<ValueDomain>,
}

impl PropertyDeclaration {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: None,
        }
    }

    pub fn typed(name: impl Into<String>, domain: ValueDomain) -> Self {
        Self {
            name: name.into(),
            domain: Some(domain),
        }
    }
}

/// A node label with the properties one input file lists for it.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDeclaration {
    pub label: String,
    pub properties: Vec<PropertyDeclaration>,
}

/// An edge `source -[label]-> target` as read from input.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeDeclaration {
    pub label: String,
    pub source: String,
    pub target: String,
    pub multiplicity: Multiplicity,
}

/// A resolved property field.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDefinition {
    pub name: String,
    pub domain: ValueDomain,
}

/// A resolved relationship field.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipDefinition {
    /// Field name, unique within the owning node.
    pub field_name: String,
    pub edge_label: String,
    pub direction: Direction,
    /// Label of the node at the other end.
    pub target: String,
    pub cardinality: Cardinality,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeDefinition {
    pub label: String,
    pub properties: Vec<PropertyDefinition>,
    pub relationships: Vec<RelationshipDefinition>,
}

impl NodeDefinition {
    pub fn property(&self, name: &str) -> Option<&PropertyDefinition> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn relationship(&self, field_name: &str) -> Option<&RelationshipDefinition> {
        self.relationships.iter().find(|r| r.field_name == field_name)
    }
}

/// The fully merged and resolved model, ready to emit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaModel {
    pub handle: Option<String>,
    pub version: Option<String>,
    /// Nodes in order of first appearance across all inputs.
    pub nodes: Vec<NodeDefinition>,
}

impl SchemaModel {
    pub fn node(&self, label: &str) -> Option<&NodeDefinition> {
        self.nodes.iter().find(|n| n.label == label)
    }

    pub fn node_labels(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.label.as_str()).collect()
    }
}

/// Overlays source documents in order.
#[derive(Debug, Default)]
pub struct ModelBuilder {
    handle: Option<String>,
    version: Option<String>,
    nodes: Vec<NodeDeclaration>,
    node_index: HashMap<String, usize>,
    definitions: HashMap<String, ValueDomain>,
    edges: Vec<EdgeDeclaration>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlay one document. Later documents only ever add: new labels, new
    /// properties on existing labels, new edges.
    pub fn merge(&mut self, doc: SourceDocument) {
        if self.handle.is_none() {
            self.handle = doc.handle;
        }
        if self.version.is_none() {
            self.version = doc.version;
        }

        for node in doc.nodes {
            self.merge_node(node);
        }

        for (name, domain) in doc.property_definitions {
            match self.definitions.get(&name) {
                Some(existing) if *existing != domain => {
                    warn!(
                        property = %name,
                        kept = %existing,
                        ignored = %domain,
                        "conflicting property definition, keeping the first"
                    );
                }
                Some(_) => {}
                None => {
                    self.definitions.insert(name, domain);
                }
            }
        }

        for edge in doc.edges {
            self.merge_edge(edge);
        }
    }

    fn merge_node(&mut self, decl: NodeDeclaration) {
        let idx = match self.node_index.get(&decl.label).copied() {
            Some(idx) => {
                debug!(label = %decl.label, "extending existing node");
                idx
            }
            None => {
                self.node_index.insert(decl.label.clone(), self.nodes.len());
                self.nodes.push(NodeDeclaration {
                    label: decl.label,
                    properties: Vec::new(),
                });
                self.nodes.len() - 1
            }
        };

        for prop in decl.properties {
            merge_property(&mut self.nodes[idx], prop);
        }
    }

    fn merge_edge(&mut self, edge: EdgeDeclaration) {
        let existing = self.edges.iter().find(|e| {
            e.label == edge.label && e.source == edge.source && e.target == edge.target
        });
        match existing {
            Some(e) if e.multiplicity != edge.multiplicity => {
                warn!(
                    edge = %edge.label,
                    source = %edge.source,
                    target = %edge.target,
                    kept = %e.multiplicity,
                    ignored = %edge.multiplicity,
                    "conflicting multiplicity, keeping the first"
                );
            }
            Some(_) => {
                debug!(edge = %edge.label, "edge already declared");
            }
            None => self.edges.push(edge),
        }
    }

    /// Resolve property domains, validate edges and synthesize relationship
    /// fields.
    pub fn build(self, options: &TranspileOptions) -> Result<SchemaModel> {
        let mut nodes = Vec::with_capacity(self.nodes.len());
        let mut namers = Vec::with_capacity(self.nodes.len());
        let mut type_names: HashMap<String, &str> = HashMap::with_capacity(self.nodes.len());

        for decl in &self.nodes {
            let type_name = sanitize_name(&decl.label);
            if options.helper_type && type_name == HELPER_TYPE_NAME {
                return Err(SdlError::ReservedTypeName(decl.label.clone()));
            }
            if let Some(first) = type_names.insert(type_name.clone(), &decl.label) {
                return Err(SdlError::DuplicateType {
                    name: type_name,
                    first: first.to_string(),
                    second: decl.label.clone(),
                });
            }

            let mut namer = FieldNamer::new();
            let mut properties = Vec::with_capacity(decl.properties.len());

            for prop in &decl.properties {
                let domain = match (&prop.domain, self.definitions.get(&prop.name)) {
                    (Some(domain), _) => domain.clone(),
                    (None, Some(domain)) => domain.clone(),
                    (None, None) if options.strict => {
                        return Err(SdlError::UndefinedProperty {
                            node: decl.label.clone(),
                            property: prop.name.clone(),
                        });
                    }
                    (None, None) => {
                        debug!(node = %decl.label, property = %prop.name, "no definition, using String");
                        ValueDomain::default()
                    }
                };
                if !domain.is_recognized() {
                    debug!(node = %decl.label, property = %prop.name, domain = %domain, "unrecognized domain, using String");
                }

                properties.push(PropertyDefinition {
                    name: namer.claim(&sanitize_name(&prop.name)),
                    domain,
                });
            }

            nodes.push(NodeDefinition {
                label: type_name,
                properties,
                relationships: Vec::new(),
            });
            namers.push(namer);
        }

        synthesize_relationships(
            &mut nodes,
            &mut namers,
            &self.node_index,
            &self.edges,
            options.naming,
        )?;

        Ok(SchemaModel {
            handle: self.handle,
            version: self.version,
            nodes,
        })
    }
}

fn merge_property(node: &mut NodeDeclaration, prop: PropertyDeclaration) {
    let Some(existing) = node.properties.iter_mut().find(|p| p.name == prop.name) else {
        node.properties.push(prop);
        return;
    };

    if existing.domain.is_none() {
        existing.domain = prop.domain;
    } else if let (Some(kept), Some(ignored)) = (&existing.domain, &prop.domain) {
        if kept != ignored {
            warn!(
                node = %node.label,
                property = %prop.name,
                kept = %kept,
                ignored = %ignored,
                "conflicting property type, keeping the first"
            );
        }
    }
}
