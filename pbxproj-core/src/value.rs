//! Generic value tree produced by the parser and consumed by the encoder.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// A keyed container of values. Key order is canonicalized on output,
/// so sorted-map semantics are fine here.
pub type Dict = BTreeMap<String, Value>;

/// A node in the parsed project tree.
///
/// Scalars are either strings or integers; the parser only produces
/// integers for bare tokens outside the forced-string paths.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Array(Vec<Value>),
    Dict(Dict),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Value::Dict(map) => Some(map),
            _ => None,
        }
    }

    pub fn into_dict(self) -> Option<Dict> {
        match self {
            Value::Dict(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Value::String(_) | Value::Integer(_))
    }

    /// Scalar rendering used by the encoder; containers have no scalar text.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Integer(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Dict> for Value {
    fn from(map: Dict) -> Self {
        Value::Dict(map)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::String(s) => serializer.serialize_str(s),
            Value::Integer(n) => serializer.serialize_i64(*n),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Dict(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert_eq!(Value::from(46).as_i64(), Some(46));
        assert!(Value::from("x").as_i64().is_none());
        assert!(Value::Array(vec![]).is_scalar() == false);
        assert_eq!(Value::from(46).scalar_text().as_deref(), Some("46"));
    }

    #[test]
    fn test_serialize_to_json() {
        let mut map = Dict::new();
        map.insert("isa".to_string(), Value::from("PBXBuildFile"));
        map.insert("mask".to_string(), Value::from(8));
        map.insert(
            "files".to_string(),
            Value::Array(vec![Value::from("OBJ_1")]),
        );
        let json = serde_json::to_string(&Value::Dict(map)).unwrap();
        assert_eq!(
            json,
            r#"{"files":["OBJ_1"],"isa":"PBXBuildFile","mask":8}"#
        );
    }
}
