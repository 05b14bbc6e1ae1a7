//! Value domains and their GraphQL type mapping.
//!
//! Both input formats declare property types by name (`string`, `Integer`,
//! `value_set`, ...). Those names are parsed into a [`ValueDomain`] and the
//! domain is mapped to GraphQL with one fixed table, [`ValueDomain::to_gql`].

use std::fmt;

/// A declared property value domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueDomain {
    String,
    Regexp,
    ValueSet,
    Integer,
    Float,
    Boolean,
    /// A list whose elements have the given domain.
    List(Box<ValueDomain>),
    /// Anything the table does not know. Keeps the declared name for logging.
    Unrecognized(String),
}

/// GraphQL built-in scalars used for properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    String,
    Int,
    Float,
    Boolean,
}

/// The GraphQL type of a property field. Always nullable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GqlType {
    Scalar(Scalar),
    List(Scalar),
}

impl ValueDomain {
    /// Parse a declared domain name. Matching is case-insensitive and never
    /// fails: unknown names become [`ValueDomain::Unrecognized`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "string" | "str" | "text" => Self::String,
            "regexp" | "regex" | "pattern" => Self::Regexp,
            "value_set" | "enum" => Self::ValueSet,
            "integer" | "int" => Self::Integer,
            "float" | "number" | "double" => Self::Float,
            "boolean" | "bool" => Self::Boolean,
            "list" => Self::List(Box::new(Self::Unrecognized(String::new()))),
            _ => Self::Unrecognized(name.to_string()),
        }
    }

    /// A list of `item`.
    pub fn list_of(item: ValueDomain) -> Self {
        Self::List(Box::new(item))
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }

    /// Map this domain to its GraphQL type.
    ///
    /// | domain                       | GraphQL      |
    /// |------------------------------|--------------|
    /// | string / regexp / value set  | `String`     |
    /// | integer                      | `Int`        |
    /// | float / number / double      | `Float`      |
    /// | boolean                      | `Boolean`    |
    /// | list of primitive            | `[<mapped>]` |
    /// | list of value set            | `[String]`   |
    /// | unrecognized                 | `String`     |
    ///
    /// Lists of lists have no GraphQL counterpart here and collapse to
    /// `[String]`.
    pub fn to_gql(&self) -> GqlType {
        match self {
            Self::List(item) => match item.as_ref() {
                Self::List(_) => GqlType::List(Scalar::String),
                other => GqlType::List(other.scalar()),
            },
            other => GqlType::Scalar(other.scalar()),
        }
    }

    fn scalar(&self) -> Scalar {
        match self {
            Self::Integer => Scalar::Int,
            Self::Float => Scalar::Float,
            Self::Boolean => Scalar::Boolean,
            Self::String
            | Self::Regexp
            | Self::ValueSet
            | Self::List(_)
            | Self::Unrecognized(_) => Scalar::String,
        }
    }
}

impl Default for ValueDomain {
    fn default() -> Self {
        Self::Unrecognized(String::new())
    }
}

impl fmt::Display for ValueDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Regexp => f.write_str("regexp"),
            Self::ValueSet => f.write_str("value_set"),
            Self::Integer => f.write_str("integer"),
            Self::Float => f.write_str("float"),
            Self::Boolean => f.write_str("boolean"),
            Self::List(item) => write!(f, "list<{}>", item),
            Self::Unrecognized(name) if name.is_empty() => f.write_str("<unknown>"),
            Self::Unrecognized(name) => write!(f, "<unknown:{}>", name),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::String => "String",
            Self::Int => "Int",
            Self::Float => "Float",
            Self::Boolean => "Boolean",
        })
    }
}

impl fmt::Display for GqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{}", s),
            Self::List(s) => write!(f, "[{}]", s),
        }
    }
}
