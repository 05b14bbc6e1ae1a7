//! Relationship field synthesis.
//!
//! Every edge `A -[label]-> B` becomes two fields: an `OUT` field on `A`
//! typed `B`, and an `IN` field on `B` typed `A`. Field names come from the
//! configured [`FieldNaming`] strategy and are made unique per node with
//! `_2`, `_3`, ... suffixes.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::model::{Direction, EdgeDeclaration, NodeDefinition, RelationshipDefinition};
use crate::options::FieldNaming;
use crate::{Result, SdlError};

/// Hands out unique field names for one GraphQL type.
#[derive(Debug, Default)]
pub struct FieldNamer {
    taken: HashSet<String>,
    suffixes: HashMap<String, usize>,
}

impl FieldNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `base`, or `base_N` with the smallest `N >= 2` not yet taken.
    pub fn claim(&mut self, base: &str) -> String {
        if self.taken.insert(base.to_string()) {
            return base.to_string();
        }

        let n = self.suffixes.entry(base.to_string()).or_insert(1);
        loop {
            *n += 1;
            let candidate = format!("{}_{}", base, n);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

/// Replace characters GraphQL names cannot contain with `_`, and prefix a
/// leading digit with `_`.
pub fn sanitize_name(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Lightweight English singular: `studies` → `study`, `classes` → `class`,
/// `samples` → `sample`. Words ending in `is`, `us` or `ss` (`diagnosis`,
/// `status`, `class`) are already singular and left alone.
pub fn singularize(name: &str) -> String {
    if let Some(stem) = name.strip_suffix("ies") {
        format!("{}y", stem)
    } else if let Some(stem) = name.strip_suffix("sses") {
        format!("{}ss", stem)
    } else if name.ends_with("is") || name.ends_with("us") || name.ends_with("ss") {
        name.to_string()
    } else if let Some(stem) = name.strip_suffix('s') {
        stem.to_string()
    } else {
        name.to_string()
    }
}

/// Lightweight English plural: `study` → `studies`, `sample` → `samples`.
/// Names already ending in `s` are kept.
pub fn pluralize(name: &str) -> String {
    if name.ends_with('s') {
        name.to_string()
    } else if let Some(stem) = name.strip_suffix('y') {
        format!("{}ies", stem)
    } else {
        format!("{}s", name)
    }
}

/// Base field name (before collision suffixes) for a relationship on node
/// `own` pointing at node `other` through edge `edge_label`.
pub fn field_base_name(naming: FieldNaming, own: &str, other: &str, edge_label: &str) -> String {
    match naming {
        FieldNaming::Edge => {
            sanitize_name(&format!("{}_{}", singularize(other), edge_label).to_lowercase())
        }
        FieldNaming::Target if own == other => sanitize_name(other),
        FieldNaming::Target => sanitize_name(&pluralize(other)),
    }
}

/// Validate `edges` against the declared nodes and attach relationship fields
/// to `nodes`, in edge order. `namers[i]` already holds the property names of
/// `nodes[i]`; `index` maps declared labels to positions in `nodes`.
pub fn synthesize_relationships(
    nodes: &mut [NodeDefinition],
    namers: &mut [FieldNamer],
    index: &HashMap<String, usize>,
    edges: &[EdgeDeclaration],
    naming: FieldNaming,
) -> Result<()> {
    let lookup = |edge: &EdgeDeclaration, label: &str| {
        index.get(label).copied().ok_or_else(|| SdlError::UnknownNode {
            edge: edge.label.clone(),
            label: label.to_string(),
        })
    };

    for edge in edges {
        let src = lookup(edge, &edge.source)?;
        let dst = lookup(edge, &edge.target)?;

        let ends = [
            (src, dst, Direction::Out, edge.multiplicity.out_cardinality()),
            (dst, src, Direction::In, edge.multiplicity.in_cardinality()),
        ];

        for (own, other, direction, cardinality) in ends {
            let base = field_base_name(naming, &nodes[own].label, &nodes[other].label, &edge.label);
            let field_name = namers[own].claim(&base);
            if field_name != base {
                debug!(node = %nodes[own].label, base = %base, field = %field_name, "field name collision");
            }

            let target = nodes[other].label.clone();
            nodes[own].relationships.push(RelationshipDefinition {
                field_name,
                edge_label: edge.label.clone(),
                direction,
                target,
                cardinality,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cardinality, Multiplicity};

    fn nodes(labels: &[&str]) -> (Vec<NodeDefinition>, Vec<FieldNamer>, HashMap<String, usize>) {
        let defs = labels
            .iter()
            .map(|l| NodeDefinition {
                label: l.to_string(),
                properties: Vec::new(),
                relationships: Vec::new(),
            })
            .collect();
        let namers = labels.iter().map(|_| FieldNamer::new()).collect();
        let index = labels.iter().enumerate().map(|(i, l)| (l.to_string(), i)).collect();
        (defs, namers, index)
    }

    fn edge(label: &str, source: &str, target: &str, multiplicity: Multiplicity) -> EdgeDeclaration {
        EdgeDeclaration {
            label: label.to_string(),
            source: source.to_string(),
            target: target.to_string(),
            multiplicity,
        }
    }

    fn field_names(node: &NodeDefinition) -> Vec<&str> {
        node.relationships.iter().map(|r| r.field_name.as_str()).collect()
    }

    #[test]
    fn test_claim_suffixes_in_order() {
        let mut namer = FieldNamer::new();
        assert_eq!(namer.claim("study"), "study");
        assert_eq!(namer.claim("study"), "study_2");
        assert_eq!(namer.claim("study"), "study_3");
        assert_eq!(namer.claim("sample"), "sample");
    }

    #[test]
    fn test_claim_skips_literal_names() {
        let mut namer = FieldNamer::new();
        namer.claim("study_2");
        assert_eq!(namer.claim("study"), "study");
        assert_eq!(namer.claim("study"), "study_3");
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("participant_id"), "participant_id");
        assert_eq!(sanitize_name("age-at.diagnosis"), "age_at_diagnosis");
        assert_eq!(sanitize_name("3d_image"), "_3d_image");
        assert_eq!(sanitize_name(""), "_");
    }

    #[test]
    fn test_singularize_and_pluralize() {
        assert_eq!(singularize("studies"), "study");
        assert_eq!(singularize("samples"), "sample");
        assert_eq!(singularize("class"), "class");
        assert_eq!(singularize("classes"), "class");
        assert_eq!(singularize("diagnosis"), "diagnosis");
        assert_eq!(singularize("analysis"), "analysis");
        assert_eq!(singularize("status"), "status");
        assert_eq!(singularize("study"), "study");
        assert_eq!(pluralize("study"), "studies");
        assert_eq!(pluralize("sample"), "samples");
        assert_eq!(pluralize("diagnosis"), "diagnosis");
    }

    #[test]
    fn test_edge_naming() {
        assert_eq!(
            field_base_name(FieldNaming::Edge, "participant", "study", "of_study"),
            "study_of_study"
        );
        assert_eq!(
            field_base_name(FieldNaming::Edge, "Sample", "Participants", "OF"),
            "participant_of"
        );
        assert_eq!(
            field_base_name(FieldNaming::Edge, "participant", "diagnosis", "of_participant"),
            "diagnosis_of_participant"
        );
        assert_eq!(field_base_name(FieldNaming::Target, "participant", "study", "x"), "studies");
        assert_eq!(field_base_name(FieldNaming::Target, "sample", "sample", "x"), "sample");
    }

    #[test]
    fn test_both_directions() {
        let (mut defs, mut namers, index) = nodes(&["participant", "study"]);
        let edges = vec![edge("of_study", "participant", "study", Multiplicity::ManyToOne)];

        synthesize_relationships(&mut defs, &mut namers, &index, &edges, FieldNaming::Edge).unwrap();

        let out = &defs[0].relationships[0];
        assert_eq!(out.field_name, "study_of_study");
        assert_eq!(out.direction, Direction::Out);
        assert_eq!(out.target, "study");
        assert_eq!(out.cardinality, Cardinality::Single);

        let inc = &defs[1].relationships[0];
        assert_eq!(inc.field_name, "participant_of_study");
        assert_eq!(inc.direction, Direction::In);
        assert_eq!(inc.target, "participant");
        assert_eq!(inc.edge_label, "of_study");
        assert_eq!(inc.cardinality, Cardinality::List);
    }

    #[test]
    fn test_collision_on_target_naming() {
        let (mut defs, mut namers, index) = nodes(&["sample", "participant"]);
        let edges = vec![
            edge("of_participant", "sample", "participant", Multiplicity::ManyToMany),
            edge("donated_by", "sample", "participant", Multiplicity::ManyToMany),
        ];

        synthesize_relationships(&mut defs, &mut namers, &index, &edges, FieldNaming::Target).unwrap();

        assert_eq!(field_names(&defs[0]), vec!["participants", "participants_2"]);
        assert_eq!(defs[0].relationships[1].edge_label, "donated_by");
        assert_eq!(field_names(&defs[1]), vec!["samples", "samples_2"]);
    }

    #[test]
    fn test_self_reference_keeps_both_ends() {
        let (mut defs, mut namers, index) = nodes(&["sample"]);
        let edges = vec![edge("derived_from", "sample", "sample", Multiplicity::ManyToOne)];

        synthesize_relationships(&mut defs, &mut namers, &index, &edges, FieldNaming::Edge).unwrap();

        assert_eq!(field_names(&defs[0]), vec!["sample_derived_from", "sample_derived_from_2"]);
        assert_eq!(defs[0].relationships[0].direction, Direction::Out);
        assert_eq!(defs[0].relationships[1].direction, Direction::In);
    }

    #[test]
    fn test_collision_with_property_name() {
        let (mut defs, mut namers, index) = nodes(&["participant", "study"]);
        namers[0].claim("studies");
        let edges = vec![edge("of_study", "participant", "study", Multiplicity::ManyToMany)];

        synthesize_relationships(&mut defs, &mut namers, &index, &edges, FieldNaming::Target).unwrap();

        assert_eq!(field_names(&defs[0]), vec!["studies_2"]);
    }

    #[test]
    fn test_unknown_source_fails() {
        let (mut defs, mut namers, index) = nodes(&["study"]);
        let edges = vec![edge("of_study", "ghost", "study", Multiplicity::ManyToMany)];

        let err = synthesize_relationships(&mut defs, &mut namers, &index, &edges, FieldNaming::Edge)
            .unwrap_err();
        assert!(matches!(err, SdlError::UnknownNode { ref label, .. } if label == "ghost"));
    }
}
