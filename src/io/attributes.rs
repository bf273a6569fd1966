//! Typed view over the attribute set embedded in a source granule.
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::error::Result;

/// A single attribute value as stored in the source file.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Text(String),
    Number(f64),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Text(s) => write!(f, "{}", s),
            AttributeValue::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Number(value)
    }
}

/// Read-only attribute mapping extracted from one source file.
///
/// Lookups never invent defaults: callers either handle `None` or name the
/// fallback they want explicitly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawAttributeSet {
    values: BTreeMap<String, AttributeValue>,
}

impl RawAttributeSet {
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Value rendered as text, if present.
    pub fn text(&self, name: &str) -> Option<String> {
        self.get(name).map(|v| v.to_string())
    }

    /// Value rendered as text, or `fallback` when the attribute is absent.
    pub fn text_or(&self, name: &str, fallback: &str) -> String {
        self.text(name).unwrap_or_else(|| fallback.to_string())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        self.values.insert(name.into(), value.into());
    }
}

impl<K, V> FromIterator<(K, V)> for RawAttributeSet
where
    K: Into<String>,
    V: Into<AttributeValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        RawAttributeSet {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Anything able to pull the attribute set out of a granule file.
pub trait AttributeSource {
    fn extract(&self, path: &Path) -> Result<RawAttributeSet>;
}

/// In-memory source returning a fixed attribute set regardless of path.
#[derive(Debug, Clone, Default)]
pub struct StaticAttributes(pub RawAttributeSet);

impl AttributeSource for StaticAttributes {
    fn extract(&self, _path: &Path) -> Result<RawAttributeSet> {
        Ok(self.0.clone())
    }
}
