//! Model Description Format (MDF) YAML.
//!
//! An MDF model is usually split in two files, a model file and a props file,
//! but any file may carry any of the sections:
//!
//! ```yaml
//! Handle: CCDI
//! Version: 1.0.0
//! Nodes:
//!   participant:
//!     Props:
//!       - participant_id
//! Relationships:
//!   of_participant:
//!     Mul: many_to_one
//!     Ends:
//!       - Src: sample
//!         Dst: participant
//! PropDefinitions:
//!   participant_id:
//!     Type: string
//! ```
//!
//! Keys the transpiler has no use for (`Desc`, `Tags`, `Term`, `Req`, ...)
//! are ignored.

use std::path::Path;

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use tracing::debug;

use super::SourceDocument;
use crate::domain::ValueDomain;
use crate::model::{EdgeDeclaration, Multiplicity, NodeDeclaration, PropertyDeclaration};
use crate::{Result, SdlError};

#[derive(Debug, Deserialize)]
struct MdfDocument {
    #[serde(rename = "Handle")]
    handle: Option<Value>,
    #[serde(rename = "Version")]
    version: Option<Value>,
    #[serde(rename = "Nodes")]
    nodes: Option<Mapping>,
    #[serde(rename = "Relationships")]
    relationships: Option<Mapping>,
    #[serde(rename = "PropDefinitions")]
    prop_definitions: Option<Mapping>,
}

#[derive(Debug, Default, Deserialize)]
struct MdfNode {
    #[serde(rename = "Props", default)]
    props: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct MdfRelationship {
    #[serde(rename = "Mul")]
    mul: Option<String>,
    #[serde(rename = "Ends")]
    ends: Option<Vec<MdfEnd>>,
}

#[derive(Debug, Deserialize)]
struct MdfEnd {
    #[serde(rename = "Src")]
    src: String,
    #[serde(rename = "Dst")]
    dst: String,
    #[serde(rename = "Mul")]
    mul: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct MdfPropDefinition {
    #[serde(rename = "Type")]
    ty: Option<Value>,
    #[serde(rename = "Enum")]
    values: Option<Value>,
}

pub fn parse(path: &Path, content: &str) -> Result<SourceDocument> {
    let yaml_err = |source| SdlError::Yaml {
        path: path.to_path_buf(),
        source,
    };

    let document: MdfDocument = serde_yaml::from_str(content).map_err(yaml_err)?;

    if document.nodes.is_none()
        && document.relationships.is_none()
        && document.prop_definitions.is_none()
    {
        return Err(SdlError::MissingSection {
            path: path.to_path_buf(),
            section: "Nodes, Relationships or PropDefinitions".to_string(),
        });
    }

    let mut doc = SourceDocument::empty(path);
    doc.handle = document.handle.as_ref().and_then(scalar_to_string);
    doc.version = document.version.as_ref().and_then(scalar_to_string);

    for (key, value) in document.nodes.into_iter().flatten() {
        let label = key_to_string(&key);
        let node: Option<MdfNode> = serde_yaml::from_value(value).map_err(yaml_err)?;
        let properties = node
            .and_then(|n| n.props)
            .unwrap_or_default()
            .into_iter()
            .map(PropertyDeclaration::named)
            .collect();
        doc.nodes.push(NodeDeclaration { label, properties });
    }

    for (key, value) in document.relationships.into_iter().flatten() {
        let label = key_to_string(&key);
        let rel: MdfRelationship = serde_yaml::from_value::<Option<MdfRelationship>>(value)
            .map_err(yaml_err)?
            .unwrap_or_default();

        let Some(ends) = rel.ends else {
            return Err(SdlError::MissingSection {
                path: path.to_path_buf(),
                section: format!("Relationships.{}.Ends", label),
            });
        };

        let default_mul = parse_multiplicity(&label, rel.mul.as_deref())?;
        for end in ends {
            let multiplicity = match end.mul.as_deref() {
                Some(mul) => parse_multiplicity(&label, Some(mul))?,
                None => default_mul,
            };
            doc.edges.push(EdgeDeclaration {
                label: label.clone(),
                source: end.src,
                target: end.dst,
                multiplicity,
            });
        }
    }

    for (key, value) in document.prop_definitions.into_iter().flatten() {
        let name = key_to_string(&key);
        let def: MdfPropDefinition = serde_yaml::from_value::<Option<MdfPropDefinition>>(value)
            .map_err(yaml_err)?
            .unwrap_or_default();
        let domain = property_domain(def.ty.as_ref(), def.values.is_some());
        doc.property_definitions.push((name, domain));
    }

    debug!(
        path = %path.display(),
        nodes = doc.nodes.len(),
        edges = doc.edges.len(),
        properties = doc.property_definitions.len(),
        "parsed MDF"
    );
    Ok(doc)
}

fn parse_multiplicity(edge: &str, mul: Option<&str>) -> Result<Multiplicity> {
    match mul {
        None => Ok(Multiplicity::default()),
        Some(value) => Multiplicity::parse(value).ok_or_else(|| SdlError::UnknownMultiplicity {
            edge: edge.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Work out the value domain of an MDF property from its `Type` and whether
/// it carries an `Enum` list.
///
/// `Type` comes in several shapes:
/// - `string`, `integer`, ... a scalar name
/// - `[a, b, c]` a value set
/// - `{ pattern: ... }` a regexp
/// - `{ value_type: number, units: [...] }` a scalar with units
/// - `{ value_type: list, item_type: ... }` a list
fn property_domain(ty: Option<&Value>, has_enum: bool) -> ValueDomain {
    match ty {
        None if has_enum => ValueDomain::ValueSet,
        None => ValueDomain::default(),
        Some(Value::String(name)) => {
            let domain = ValueDomain::from_name(name);
            if has_enum && domain == ValueDomain::String {
                ValueDomain::ValueSet
            } else {
                domain
            }
        }
        Some(Value::Sequence(_)) => ValueDomain::ValueSet,
        Some(Value::Mapping(map)) => mapping_domain(map, has_enum),
        Some(other) => ValueDomain::Unrecognized(scalar_to_string(other).unwrap_or_default()),
    }
}

fn mapping_domain(map: &Mapping, has_enum: bool) -> ValueDomain {
    if map.contains_key("pattern") {
        return ValueDomain::Regexp;
    }

    let has_enum = has_enum || map.contains_key("Enum") || map.contains_key("enum");
    match map.get("value_type").and_then(Value::as_str) {
        Some(vt) if vt.eq_ignore_ascii_case("list") => {
            let item = match map.get("item_type") {
                Some(item) => property_domain(Some(item), false),
                None if has_enum => ValueDomain::ValueSet,
                None => ValueDomain::default(),
            };
            ValueDomain::list_of(item)
        }
        Some(vt) => property_domain(Some(&Value::String(vt.to_string())), has_enum),
        None if has_enum => ValueDomain::ValueSet,
        None => ValueDomain::Unrecognized("mapping".to_string()),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn key_to_string(key: &Value) -> String {
    scalar_to_string(key).unwrap_or_else(|| {
        serde_yaml::to_string(key)
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(yaml: &str) -> Result<SourceDocument> {
        parse(Path::new("model.yml"), yaml)
    }

    fn domain_of(doc: &SourceDocument, name: &str) -> ValueDomain {
        doc.property_definitions
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d.clone())
            .unwrap_or_else(|| panic!("no definition for {}", name))
    }

    #[test]
    fn test_nodes_keep_file_order() {
        let doc = parse_str(
            r#"
Handle: CCDI
Version: 2.1
Nodes:
  study:
    Props:
      - study_id
      - study_name
  participant:
    Props:
      - participant_id
  diagnosis:
"#,
        )
        .unwrap();

        assert_eq!(doc.handle.as_deref(), Some("CCDI"));
        assert_eq!(doc.version.as_deref(), Some("2.1"));
        let labels: Vec<_> = doc.nodes.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["study", "participant", "diagnosis"]);
        assert_eq!(
            doc.nodes[0].properties,
            vec![PropertyDeclaration::named("study_id"), PropertyDeclaration::named("study_name")]
        );
        assert!(doc.nodes[2].properties.is_empty());
    }

    #[test]
    fn test_relationship_ends_and_multiplicity() {
        let doc = parse_str(
            r#"
Relationships:
  of_participant:
    Mul: many_to_one
    Ends:
      - Src: sample
        Dst: participant
      - Src: diagnosis
        Dst: participant
        Mul: one_to_one
"#,
        )
        .unwrap();

        assert_eq!(doc.edges.len(), 2);
        assert_eq!(doc.edges[0].source, "sample");
        assert_eq!(doc.edges[0].target, "participant");
        assert_eq!(doc.edges[0].multiplicity, Multiplicity::ManyToOne);
        assert_eq!(doc.edges[1].multiplicity, Multiplicity::OneToOne);
    }

    #[test]
    fn test_relationship_defaults_to_many_to_many() {
        let doc = parse_str(
            r#"
Relationships:
  related_to:
    Ends:
      - Src: a
        Dst: b
"#,
        )
        .unwrap();
        assert_eq!(doc.edges[0].multiplicity, Multiplicity::ManyToMany);
    }

    #[test]
    fn test_unknown_multiplicity() {
        let err = parse_str(
            r#"
Relationships:
  related_to:
    Mul: lots
    Ends:
      - Src: a
        Dst: b
"#,
        )
        .unwrap_err();
        assert!(matches!(err, SdlError::UnknownMultiplicity { ref value, .. } if value == "lots"));
    }

    #[test]
    fn test_relationship_without_ends() {
        let err = parse_str("Relationships:\n  related_to:\n    Mul: one_to_one\n").unwrap_err();
        assert!(matches!(err, SdlError::MissingSection { ref section, .. } if section == "Relationships.related_to.Ends"));
    }

    #[test]
    fn test_property_domains() {
        let doc = parse_str(
            r#"
PropDefinitions:
  name:
    Type: string
  age:
    Type: integer
  weight:
    Type:
      value_type: number
      units:
        - kg
  is_alive:
    Type: boolean
  sex:
    Enum:
      - Male
      - Female
  race:
    Type:
      - White
      - Asian
  dbgap_id:
    Type:
      pattern: "^phs[0-9]+$"
  aliases:
    Type:
      value_type: list
      item_type: string
  scores:
    Type:
      value_type: list
      item_type: integer
  tags:
    Type:
      value_type: list
      item_type:
        - a
        - b
  anatomic_sites:
    Type:
      value_type: list
    Enum:
      - Lung
  created:
    Type: datetime
  untyped:
    Desc: no type at all
"#,
        )
        .unwrap();

        assert_eq!(domain_of(&doc, "name"), ValueDomain::String);
        assert_eq!(domain_of(&doc, "age"), ValueDomain::Integer);
        assert_eq!(domain_of(&doc, "weight"), ValueDomain::Float);
        assert_eq!(domain_of(&doc, "is_alive"), ValueDomain::Boolean);
        assert_eq!(domain_of(&doc, "sex"), ValueDomain::ValueSet);
        assert_eq!(domain_of(&doc, "race"), ValueDomain::ValueSet);
        assert_eq!(domain_of(&doc, "dbgap_id"), ValueDomain::Regexp);
        assert_eq!(domain_of(&doc, "aliases"), ValueDomain::list_of(ValueDomain::String));
        assert_eq!(domain_of(&doc, "scores"), ValueDomain::list_of(ValueDomain::Integer));
        assert_eq!(domain_of(&doc, "tags"), ValueDomain::list_of(ValueDomain::ValueSet));
        assert_eq!(domain_of(&doc, "anatomic_sites"), ValueDomain::list_of(ValueDomain::ValueSet));
        assert_eq!(domain_of(&doc, "created"), ValueDomain::Unrecognized("datetime".to_string()));
        assert_eq!(domain_of(&doc, "untyped"), ValueDomain::default());
    }

    #[test]
    fn test_missing_sections() {
        let err = parse_str("Handle: CCDI\nVersion: 1\n").unwrap_err();
        assert!(matches!(err, SdlError::MissingSection { .. }));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = parse_str("Nodes:\n  study: [unclosed\n").unwrap_err();
        assert!(matches!(err, SdlError::Yaml { .. }));
    }
}
