//! Core types: records, frontmatter values, and key rules.

use crate::error::CodecError;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// Frontmatter: string keys mapped to loosely-typed values.
pub type Frontmatter = BTreeMap<String, FieldValue>;

/// A single frontmatter value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Sequence(Vec<FieldValue>),
    Mapping(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Bool(_) => "bool",
            FieldValue::Integer(_) => "integer",
            FieldValue::Float(_) => "float",
            FieldValue::String(_) => "string",
            FieldValue::Sequence(_) => "sequence",
            FieldValue::Mapping(_) => "mapping",
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Float(x) => write!(f, "{}", x),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Null => write!(f, "null"),
            other => write!(f, "<{}>", other.kind()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Integer(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Integer(n.into())
    }
}

impl From<f64> for FieldValue {
    fn from(x: f64) -> Self {
        FieldValue::Float(x)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(items: Vec<T>) -> Self {
        FieldValue::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl From<FieldValue> for Value {
    fn from(field: FieldValue) -> Self {
        match field {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(b),
            FieldValue::Integer(n) => Value::Number(n.into()),
            FieldValue::Float(x) => Value::Number(x.into()),
            FieldValue::String(s) => Value::String(s),
            FieldValue::Sequence(items) => {
                Value::Sequence(items.into_iter().map(Value::from).collect())
            }
            FieldValue::Mapping(map) => Value::Mapping(mapping_from_fields(map)),
        }
    }
}

impl TryFrom<Value> for FieldValue {
    type Error = CodecError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(FieldValue::Null),
            Value::Bool(b) => Ok(FieldValue::Bool(b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(FieldValue::Integer(i))
                } else if let Some(x) = n.as_f64() {
                    // u64 beyond i64::MAX lands here as well
                    Ok(FieldValue::Float(x))
                } else {
                    Err(CodecError::UnsupportedValue(n.to_string()))
                }
            }
            Value::String(s) => Ok(FieldValue::String(s)),
            Value::Sequence(items) => items
                .into_iter()
                .map(FieldValue::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(FieldValue::Sequence),
            Value::Mapping(map) => fields_from_mapping(map).map(FieldValue::Mapping),
            Value::Tagged(tagged) => Err(CodecError::UnsupportedValue(format!(
                "tagged value {}",
                tagged.tag
            ))),
        }
    }
}

/// Convert a YAML mapping into frontmatter fields, rejecting non-string keys.
pub(crate) fn fields_from_mapping(
    map: Mapping,
) -> Result<BTreeMap<String, FieldValue>, CodecError> {
    let mut fields = BTreeMap::new();
    for (key, value) in map {
        let key = match key {
            Value::String(s) => s,
            other => {
                return Err(CodecError::NonStringKey(
                    serde_yaml::to_string(&other)
                        .map(|s| s.trim_end().to_string())
                        .unwrap_or_else(|_| "<unprintable>".to_string()),
                ))
            }
        };
        fields.insert(key, FieldValue::try_from(value)?);
    }
    Ok(fields)
}

pub(crate) fn mapping_from_fields(fields: BTreeMap<String, FieldValue>) -> Mapping {
    let mut map = Mapping::new();
    for (key, value) in fields {
        map.insert(Value::String(key), value.into());
    }
    map
}

/// Why a loosely-shaped value could not be turned into a [`Record`].
#[derive(Debug, Error, PartialEq)]
pub enum ShapeError {
    #[error("record is not a mapping")]
    NotAMapping,
    #[error("record has no 'frontmatter' entry")]
    MissingFrontmatter,
    #[error("'frontmatter' must be a mapping with string keys")]
    InvalidFrontmatter,
    #[error("record has no 'body' entry")]
    MissingBody,
    #[error("'body' must be a string")]
    InvalidBody,
}

/// A record: frontmatter metadata plus a free-text body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub frontmatter: Frontmatter,
    pub body: String,
}

impl Record {
    pub fn new(frontmatter: Frontmatter, body: impl Into<String>) -> Self {
        Self {
            frontmatter,
            body: body.into(),
        }
    }

    /// Build a record from a dynamic value shaped like
    /// `{frontmatter: <mapping>, body: <string>}`.
    pub fn from_value(value: Value) -> Result<Self, ShapeError> {
        let mut map = match value {
            Value::Mapping(map) => map,
            _ => return Err(ShapeError::NotAMapping),
        };

        let frontmatter = match map.remove("frontmatter") {
            Some(Value::Mapping(fm)) => {
                fields_from_mapping(fm).map_err(|_| ShapeError::InvalidFrontmatter)?
            }
            Some(_) => return Err(ShapeError::InvalidFrontmatter),
            None => return Err(ShapeError::MissingFrontmatter),
        };

        let body = match map.remove("body") {
            Some(Value::String(body)) => body,
            Some(_) => return Err(ShapeError::InvalidBody),
            None => return Err(ShapeError::MissingBody),
        };

        Ok(Self { frontmatter, body })
    }

    /// Convert back into the dynamic `{frontmatter, body}` shape.
    pub fn into_value(self) -> Value {
        let mut map = Mapping::new();
        map.insert(
            Value::from("frontmatter"),
            Value::Mapping(mapping_from_fields(self.frontmatter)),
        );
        map.insert(Value::from("body"), Value::String(self.body));
        Value::Mapping(map)
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.frontmatter.get(field)
    }

    pub fn with_field(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.frontmatter.insert(field.into(), value.into());
        self
    }
}

/// Check that a key can be used verbatim as a file stem.
///
/// Keys are never rewritten; anything that could escape the vault directory
/// or is not representable as a single path component is rejected.
pub fn validate_key(key: &str) -> Result<(), String> {
    if key.is_empty() {
        return Err("key must not be empty".to_string());
    }
    if key == "." || key == ".." {
        return Err(format!("key '{}' is reserved", key));
    }
    if let Some(c) = key.chars().find(|&c| matches!(c, '/' | '\\' | '\0')) {
        return Err(format!("key contains forbidden character {:?}", c));
    }
    Ok(())
}
