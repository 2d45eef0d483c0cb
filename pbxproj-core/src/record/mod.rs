//! Typed record shapes and the closed sum over them.
//!
//! Every record keeps an `extra` bag of fields its shape does not
//! declare; those fields round-trip verbatim and are never an error.

mod build_file;
mod build_phase;
mod build_rule;
mod configuration;
mod file_element;
mod project;
mod proxy;
mod target;

pub use build_file::BuildFile;
pub use build_phase::{BuildPhase, PhaseDetails};
pub use build_rule::BuildRule;
pub use configuration::{BuildConfiguration, ConfigurationList};
pub use file_element::{FileElement, FileElementDetails};
pub use project::{Project, RemoteProjectReference};
pub use proxy::{ContainerItemProxy, TargetDependency};
pub use target::{Target, TargetDetails};

use crate::decoder::FieldReader;
use crate::error::SchemaError;
use crate::reference::Reference;
use crate::tag::{ObjectKind, TypeTag};
use crate::value::{Dict, Value};

/// One record of the object graph: identity, type tag, typed payload,
/// and the preserved unknown fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: Reference,
    pub tag: TypeTag,
    pub payload: Payload,
    pub extra: Dict,
}

/// The typed payloads, one per shape family. Shape families that cover
/// several tags (build phases, targets, file elements) carry the
/// distinguishing detail inside; the record's tag stays authoritative.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    BuildFile(BuildFile),
    BuildPhase(BuildPhase),
    BuildRule(BuildRule),
    FileElement(FileElement),
    Target(Target),
    TargetDependency(TargetDependency),
    ContainerItemProxy(ContainerItemProxy),
    BuildConfiguration(BuildConfiguration),
    ConfigurationList(ConfigurationList),
    Project(Project),
    Unknown,
}

impl Record {
    /// Decode a record body (with `isa` already removed) into the shape
    /// selected by the tag. Fields the shape does not take end up in
    /// the `extra` bag.
    pub fn decode(id: Reference, tag: TypeTag, fields: Dict) -> Result<Record, SchemaError> {
        let kind = tag.kind();
        let mut reader = FieldReader::new(&id, &tag, fields);
        let payload = match kind {
            ObjectKind::BuildFile => Payload::BuildFile(BuildFile::decode(&mut reader)?),
            _ if kind.is_build_phase() => {
                Payload::BuildPhase(BuildPhase::decode(kind, &mut reader)?)
            }
            ObjectKind::BuildRule => Payload::BuildRule(BuildRule::decode(&mut reader)?),
            _ if kind.is_file_element() => {
                Payload::FileElement(FileElement::decode(kind, &mut reader)?)
            }
            _ if kind.is_target() => Payload::Target(Target::decode(kind, &mut reader)?),
            ObjectKind::TargetDependency => {
                Payload::TargetDependency(TargetDependency::decode(&mut reader)?)
            }
            ObjectKind::ContainerItemProxy => {
                Payload::ContainerItemProxy(ContainerItemProxy::decode(&mut reader)?)
            }
            ObjectKind::BuildConfiguration => {
                Payload::BuildConfiguration(BuildConfiguration::decode(&mut reader)?)
            }
            ObjectKind::ConfigurationList => {
                Payload::ConfigurationList(ConfigurationList::decode(&mut reader)?)
            }
            ObjectKind::Project => Payload::Project(Project::decode(&mut reader)?),
            _ => Payload::Unknown,
        };
        let extra = reader.finish();
        Ok(Record {
            id,
            tag,
            payload,
            extra,
        })
    }

    pub fn kind(&self) -> ObjectKind {
        self.tag.kind()
    }

    /// Every reference this record holds, for reachability scans.
    pub fn references(&self) -> Vec<&Reference> {
        match &self.payload {
            Payload::BuildFile(p) => p.references(),
            Payload::BuildPhase(p) => p.references(),
            Payload::BuildRule(_) => Vec::new(),
            Payload::FileElement(p) => p.references(),
            Payload::Target(p) => p.references(),
            Payload::TargetDependency(p) => p.references(),
            Payload::ContainerItemProxy(p) => p.references(),
            Payload::BuildConfiguration(p) => p.references(),
            Payload::ConfigurationList(p) => p.references(),
            Payload::Project(p) => p.references(),
            Payload::Unknown => Vec::new(),
        }
    }

    /// Drop `id` from every reference list this record holds. Scalar
    /// reference fields are left in place; lookups through them simply
    /// stop resolving.
    pub fn detach(&mut self, id: &Reference) {
        match &mut self.payload {
            Payload::BuildPhase(p) => p.files.retain(|r| r != id),
            Payload::FileElement(p) => {
                if let Some(children) = p.children_mut() {
                    children.retain(|r| r != id);
                }
            }
            Payload::Target(p) => {
                p.build_phases.retain(|r| r != id);
                p.build_rules.retain(|r| r != id);
                p.dependencies.retain(|r| r != id);
            }
            Payload::ConfigurationList(p) => p.build_configurations.retain(|r| r != id),
            Payload::Project(p) => p.targets.retain(|r| r != id),
            _ => {}
        }
    }

    /// Records that must be removed together with this one.
    pub fn cascade_references(&self) -> Vec<Reference> {
        match &self.payload {
            Payload::BuildPhase(p) => p.files.clone(),
            Payload::Target(p) => p.dependencies.clone(),
            _ => Vec::new(),
        }
    }

    /// Encode back into the keyed-container form, `isa` included.
    /// Known fields come from the payload; the `extra` bag never
    /// overrides them, so no key is emitted twice.
    pub fn body_value(&self) -> Dict {
        let mut out = Dict::new();
        out.insert("isa".to_string(), Value::from(self.tag.as_str()));
        match &self.payload {
            Payload::BuildFile(p) => p.encode_into(&mut out),
            Payload::BuildPhase(p) => p.encode_into(&mut out),
            Payload::BuildRule(p) => p.encode_into(&mut out),
            Payload::FileElement(p) => p.encode_into(&mut out),
            Payload::Target(p) => p.encode_into(&mut out),
            Payload::TargetDependency(p) => p.encode_into(&mut out),
            Payload::ContainerItemProxy(p) => p.encode_into(&mut out),
            Payload::BuildConfiguration(p) => p.encode_into(&mut out),
            Payload::ConfigurationList(p) => p.encode_into(&mut out),
            Payload::Project(p) => p.encode_into(&mut out),
            Payload::Unknown => {}
        }
        for (key, value) in &self.extra {
            out.entry(key.clone()).or_insert_with(|| value.clone());
        }
        out
    }

    pub fn as_build_file(&self) -> Option<&BuildFile> {
        match &self.payload {
            Payload::BuildFile(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_build_phase(&self) -> Option<&BuildPhase> {
        match &self.payload {
            Payload::BuildPhase(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_file_element(&self) -> Option<&FileElement> {
        match &self.payload {
            Payload::FileElement(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_target(&self) -> Option<&Target> {
        match &self.payload {
            Payload::Target(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_project(&self) -> Option<&Project> {
        match &self.payload {
            Payload::Project(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_build_configuration(&self) -> Option<&BuildConfiguration> {
        match &self.payload {
            Payload::BuildConfiguration(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_configuration_list(&self) -> Option<&ConfigurationList> {
        match &self.payload {
            Payload::ConfigurationList(p) => Some(p),
            _ => None,
        }
    }
}

/// Insert a reference value under `key`.
pub(crate) fn put_reference(out: &mut Dict, key: &str, reference: &Reference) {
    out.insert(key.to_string(), Value::from(reference.unquoted()));
}

/// Insert a reference array under `key`.
pub(crate) fn put_reference_array(out: &mut Dict, key: &str, refs: &[Reference]) {
    out.insert(
        key.to_string(),
        Value::Array(refs.iter().map(|r| Value::from(r.unquoted())).collect()),
    );
}

/// Insert a string array under `key`.
pub(crate) fn put_string_array(out: &mut Dict, key: &str, items: &[String]) {
    out.insert(
        key.to_string(),
        Value::Array(items.iter().map(|s| Value::from(s.as_str())).collect()),
    );
}
