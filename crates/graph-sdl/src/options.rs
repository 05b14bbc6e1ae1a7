//! Transpile options.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::input::InputFormat;

/// How relationship fields are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldNaming {
    /// `<singular other end>_<edge label>`, lowercased: `study_of_study`.
    #[default]
    Edge,
    /// Plural of the other end's label: `studies`. Self references keep the
    /// label as is.
    Target,
}

impl FromStr for FieldNaming {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "edge" => Ok(Self::Edge),
            "target" => Ok(Self::Target),
            other => Err(format!("unknown naming strategy `{}` (expected edge or target)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TranspileOptions {
    /// Format used for every input. `Auto` decides per file.
    pub format: InputFormat,
    pub naming: FieldNaming,
    /// Fail on node properties that have no type anywhere in the input,
    /// instead of typing them `String`.
    pub strict: bool,
    /// Emit the `FieldCount` helper type used by count-by-field queries.
    pub helper_type: bool,
    /// Emit the comment header.
    pub header: bool,
}

impl Default for TranspileOptions {
    fn default() -> Self {
        Self {
            format: InputFormat::Auto,
            naming: FieldNaming::Edge,
            strict: false,
            helper_type: true,
            header: true,
        }
    }
}
