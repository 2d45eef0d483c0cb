//! Mapping from the parsed value tree onto typed records and the graph.

use tracing::{debug, warn};

use crate::error::SchemaError;
use crate::record::Record;
use crate::reference::Reference;
use crate::tag::TypeTag;
use crate::value::{Dict, Value};

/// Consumes a record body field by field while tracking the record's
/// identity for error reporting. Whatever is left after the shape has
/// taken its known fields becomes the `extra` bag.
pub struct FieldReader<'a> {
    id: &'a Reference,
    tag: &'a TypeTag,
    fields: Dict,
}

impl<'a> FieldReader<'a> {
    pub fn new(id: &'a Reference, tag: &'a TypeTag, fields: Dict) -> Self {
        FieldReader { id, tag, fields }
    }

    fn missing(&self, field: &'static str) -> SchemaError {
        SchemaError::MissingField {
            id: self.id.unquoted().to_string(),
            tag: self.tag.as_str().to_string(),
            field,
        }
    }

    fn wrong_type(&self, field: &str, expected: &'static str) -> SchemaError {
        SchemaError::WrongFieldType {
            id: self.id.unquoted().to_string(),
            tag: self.tag.as_str().to_string(),
            field: field.to_string(),
            expected,
        }
    }

    /// Remaining fields, preserved verbatim as the unknown bag.
    pub fn finish(self) -> Dict {
        self.fields
    }

    pub fn optional_string(&mut self, key: &'static str) -> Result<Option<String>, SchemaError> {
        match self.fields.remove(key) {
            None => Ok(None),
            Some(value) => value
                .scalar_text()
                .map(Some)
                .ok_or_else(|| self.wrong_type(key, "a scalar")),
        }
    }

    pub fn require_string(&mut self, key: &'static str) -> Result<String, SchemaError> {
        self.optional_string(key)?.ok_or_else(|| self.missing(key))
    }

    pub fn optional_integer(&mut self, key: &'static str) -> Result<Option<i64>, SchemaError> {
        match self.fields.remove(key) {
            None => Ok(None),
            Some(Value::Integer(n)) => Ok(Some(n)),
            Some(Value::String(s)) => s
                .parse()
                .map(Some)
                .map_err(|_| self.wrong_type(key, "an integer")),
            Some(_) => Err(self.wrong_type(key, "an integer")),
        }
    }

    pub fn require_integer(&mut self, key: &'static str) -> Result<i64, SchemaError> {
        self.optional_integer(key)?.ok_or_else(|| self.missing(key))
    }

    pub fn optional_reference(
        &mut self,
        key: &'static str,
    ) -> Result<Option<Reference>, SchemaError> {
        Ok(self.optional_string(key)?.map(Reference::new))
    }

    pub fn require_reference(&mut self, key: &'static str) -> Result<Reference, SchemaError> {
        self.optional_reference(key)?
            .ok_or_else(|| self.missing(key))
    }

    pub fn optional_reference_array(
        &mut self,
        key: &'static str,
    ) -> Result<Option<Vec<Reference>>, SchemaError> {
        match self.fields.remove(key) {
            None => Ok(None),
            Some(Value::Array(items)) => {
                let mut refs = Vec::with_capacity(items.len());
                for item in items {
                    let text = item
                        .scalar_text()
                        .ok_or_else(|| self.wrong_type(key, "an array of references"))?;
                    refs.push(Reference::new(text));
                }
                Ok(Some(refs))
            }
            Some(_) => Err(self.wrong_type(key, "an array of references")),
        }
    }

    pub fn require_reference_array(
        &mut self,
        key: &'static str,
    ) -> Result<Vec<Reference>, SchemaError> {
        self.optional_reference_array(key)?
            .ok_or_else(|| self.missing(key))
    }

    pub fn optional_string_array(
        &mut self,
        key: &'static str,
    ) -> Result<Option<Vec<String>>, SchemaError> {
        match self.fields.remove(key) {
            None => Ok(None),
            Some(Value::Array(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    let text = item
                        .scalar_text()
                        .ok_or_else(|| self.wrong_type(key, "an array of strings"))?;
                    out.push(text);
                }
                Ok(Some(out))
            }
            Some(_) => Err(self.wrong_type(key, "an array of strings")),
        }
    }

    pub fn optional_dict(&mut self, key: &'static str) -> Result<Option<Dict>, SchemaError> {
        match self.fields.remove(key) {
            None => Ok(None),
            Some(Value::Dict(map)) => Ok(Some(map)),
            Some(_) => Err(self.wrong_type(key, "a keyed container")),
        }
    }

    pub fn optional_array(&mut self, key: &'static str) -> Result<Option<Vec<Value>>, SchemaError> {
        match self.fields.remove(key) {
            None => Ok(None),
            Some(Value::Array(items)) => Ok(Some(items)),
            Some(_) => Err(self.wrong_type(key, "an array")),
        }
    }
}

/// Decode one entry of the `objects` container into a typed record.
pub fn decode_record(id: Reference, value: Value) -> Result<Record, SchemaError> {
    let mut fields = value.into_dict().ok_or_else(|| SchemaError::MalformedObject {
        id: id.unquoted().to_string(),
    })?;
    let tag = match fields.remove("isa") {
        Some(Value::String(s)) => TypeTag::new(s),
        Some(other) => match other.scalar_text() {
            Some(text) => TypeTag::new(text),
            None => {
                return Err(SchemaError::MissingTypeTag {
                    id: id.unquoted().to_string(),
                })
            }
        },
        None => {
            return Err(SchemaError::MissingTypeTag {
                id: id.unquoted().to_string(),
            })
        }
    };
    if tag.kind() == crate::tag::ObjectKind::Unknown {
        warn!(id = %id, tag = %tag, "unknown type tag, keeping fields verbatim");
    }
    Record::decode(id, tag, fields)
}

/// Split the parsed top level into header fields and decoded records.
#[derive(Debug)]
pub struct DecodedProject {
    pub archive_version: i64,
    pub object_version: i64,
    pub classes: Dict,
    pub root_object: Reference,
    pub records: Vec<Record>,
}

pub fn decode_project(root: Value) -> Result<DecodedProject, SchemaError> {
    let mut top = root.into_dict().ok_or(SchemaError::MalformedRoot)?;

    let archive_version = require_top_integer(&mut top, "archiveVersion")?;
    let object_version = require_top_integer(&mut top, "objectVersion")?;
    let root_object = match top.remove("rootObject") {
        Some(value) => value
            .scalar_text()
            .map(Reference::new)
            .ok_or(SchemaError::MalformedTopLevelField {
                field: "rootObject",
                expected: "a reference",
            })?,
        None => return Err(SchemaError::MissingTopLevelField("rootObject")),
    };
    let classes = match top.remove("classes") {
        None => Dict::new(),
        Some(Value::Dict(map)) => map,
        Some(_) => {
            return Err(SchemaError::MalformedTopLevelField {
                field: "classes",
                expected: "a keyed container",
            })
        }
    };
    let objects = match top.remove("objects") {
        Some(Value::Dict(map)) => map,
        Some(_) => {
            return Err(SchemaError::MalformedTopLevelField {
                field: "objects",
                expected: "a keyed container",
            })
        }
        None => return Err(SchemaError::MissingTopLevelField("objects")),
    };

    let mut records = Vec::with_capacity(objects.len());
    for (key, body) in objects {
        records.push(decode_record(Reference::new(key), body)?);
    }
    debug!(
        records = records.len(),
        object_version, "decoded project object graph"
    );

    Ok(DecodedProject {
        archive_version,
        object_version,
        classes,
        root_object,
        records,
    })
}

fn require_top_integer(top: &mut Dict, field: &'static str) -> Result<i64, SchemaError> {
    match top.remove(field) {
        Some(Value::Integer(n)) => Ok(n),
        Some(Value::String(s)) => s.parse().map_err(|_| SchemaError::MalformedTopLevelField {
            field,
            expected: "an integer",
        }),
        Some(_) => Err(SchemaError::MalformedTopLevelField {
            field,
            expected: "an integer",
        }),
        None => Err(SchemaError::MissingTopLevelField(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::ObjectKind;

    fn record_from(text: &str) -> Result<Record, SchemaError> {
        let value = crate::parser::parse(text).unwrap();
        decode_record(Reference::new("OBJ_1"), value)
    }

    #[test]
    fn test_missing_isa_is_fatal() {
        let err = record_from("{ fileRef = OBJ_5; }").unwrap_err();
        assert!(matches!(err, SchemaError::MissingTypeTag { id } if id == "OBJ_1"));
    }

    #[test]
    fn test_unknown_tag_decodes_as_catch_all() {
        let record = record_from("{ isa = PBXFancyNewThing; custom = 12; }").unwrap();
        assert_eq!(record.kind(), ObjectKind::Unknown);
        assert_eq!(record.extra["custom"], Value::Integer(12));
    }

    #[test]
    fn test_missing_required_field_is_fatal() {
        let err = record_from("{ isa = PBXBuildFile; }").unwrap_err();
        match err {
            SchemaError::MissingField { id, tag, field } => {
                assert_eq!(id, "OBJ_1");
                assert_eq!(tag, "PBXBuildFile");
                assert_eq!(field, "fileRef");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_wrong_field_type_is_fatal() {
        let err = record_from("{ isa = PBXBuildFile; fileRef = (a, b); }").unwrap_err();
        assert!(matches!(err, SchemaError::WrongFieldType { .. }));
    }

    #[test]
    fn test_top_level_decode() {
        let value = crate::parser::parse(
            "{ archiveVersion = 1; classes = { }; objectVersion = 46; objects = { }; rootObject = OBJ_1; }",
        )
        .unwrap();
        let project = decode_project(value).unwrap();
        assert_eq!(project.archive_version, 1);
        assert_eq!(project.object_version, 46);
        assert_eq!(project.root_object, Reference::new("OBJ_1"));
        assert!(project.records.is_empty());
        assert!(project.classes.is_empty());
    }

    #[test]
    fn test_top_level_missing_objects() {
        let value =
            crate::parser::parse("{ archiveVersion = 1; objectVersion = 46; rootObject = X; }")
                .unwrap();
        assert!(matches!(
            decode_project(value).unwrap_err(),
            SchemaError::MissingTopLevelField("objects")
        ));
    }
}
