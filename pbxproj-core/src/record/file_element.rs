//! File-tree elements: file references, groups and their variants.

use crate::decoder::FieldReader;
use crate::error::SchemaError;
use crate::record::{put_reference, put_reference_array};
use crate::reference::Reference;
use crate::tag::ObjectKind;
use crate::value::{Dict, Value};

/// Common shape of the five file-element tags. `name`, `path` and
/// `sourceTree` behave identically across all of them.
#[derive(Debug, Clone, PartialEq)]
pub struct FileElement {
    pub name: Option<String>,
    pub path: Option<String>,
    pub source_tree: Option<String>,
    pub details: FileElementDetails,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FileElementDetails {
    /// `PBXFileReference`: a concrete file on disk.
    FileReference {
        file_encoding: Option<i64>,
        explicit_file_type: Option<String>,
        last_known_file_type: Option<String>,
        include_in_index: Option<i64>,
    },
    /// `PBXGroup` and `PBXVariantGroup`: a folder of other elements.
    Group { children: Vec<Reference> },
    /// `XCVersionGroup`: a versioned container (Core Data models).
    VersionGroup {
        children: Vec<Reference>,
        current_version: Option<Reference>,
        version_group_type: Option<String>,
    },
    /// `PBXReferenceProxy`: a product of a referenced project.
    ReferenceProxy {
        file_type: Option<String>,
        remote_reference: Option<Reference>,
    },
}

impl FileElement {
    pub fn decode(kind: ObjectKind, r: &mut FieldReader<'_>) -> Result<Self, SchemaError> {
        let details = match kind {
            ObjectKind::FileReference => FileElementDetails::FileReference {
                file_encoding: r.optional_integer("fileEncoding")?,
                explicit_file_type: r.optional_string("explicitFileType")?,
                last_known_file_type: r.optional_string("lastKnownFileType")?,
                include_in_index: r.optional_integer("includeInIndex")?,
            },
            ObjectKind::VersionGroup => FileElementDetails::VersionGroup {
                children: r.require_reference_array("children")?,
                current_version: r.optional_reference("currentVersion")?,
                version_group_type: r.optional_string("versionGroupType")?,
            },
            ObjectKind::ReferenceProxy => FileElementDetails::ReferenceProxy {
                file_type: r.optional_string("fileType")?,
                remote_reference: r.optional_reference("remoteRef")?,
            },
            // PBXGroup and PBXVariantGroup share a shape.
            _ => FileElementDetails::Group {
                children: r.require_reference_array("children")?,
            },
        };
        Ok(FileElement {
            name: r.optional_string("name")?,
            path: r.optional_string("path")?,
            source_tree: r.optional_string("sourceTree")?,
            details,
        })
    }

    pub fn encode_into(&self, out: &mut Dict) {
        if let Some(name) = &self.name {
            out.insert("name".to_string(), Value::from(name.as_str()));
        }
        if let Some(path) = &self.path {
            out.insert("path".to_string(), Value::from(path.as_str()));
        }
        if let Some(tree) = &self.source_tree {
            out.insert("sourceTree".to_string(), Value::from(tree.as_str()));
        }
        match &self.details {
            FileElementDetails::FileReference {
                file_encoding,
                explicit_file_type,
                last_known_file_type,
                include_in_index,
            } => {
                if let Some(v) = file_encoding {
                    out.insert("fileEncoding".to_string(), Value::from(*v));
                }
                if let Some(v) = explicit_file_type {
                    out.insert("explicitFileType".to_string(), Value::from(v.as_str()));
                }
                if let Some(v) = last_known_file_type {
                    out.insert("lastKnownFileType".to_string(), Value::from(v.as_str()));
                }
                if let Some(v) = include_in_index {
                    out.insert("includeInIndex".to_string(), Value::from(*v));
                }
            }
            FileElementDetails::Group { children } => {
                put_reference_array(out, "children", children);
            }
            FileElementDetails::VersionGroup {
                children,
                current_version,
                version_group_type,
            } => {
                put_reference_array(out, "children", children);
                if let Some(v) = current_version {
                    put_reference(out, "currentVersion", v);
                }
                if let Some(v) = version_group_type {
                    out.insert("versionGroupType".to_string(), Value::from(v.as_str()));
                }
            }
            FileElementDetails::ReferenceProxy {
                file_type,
                remote_reference,
            } => {
                if let Some(v) = file_type {
                    out.insert("fileType".to_string(), Value::from(v.as_str()));
                }
                if let Some(v) = remote_reference {
                    put_reference(out, "remoteRef", v);
                }
            }
        }
    }

    pub fn references(&self) -> Vec<&Reference> {
        match &self.details {
            FileElementDetails::FileReference { .. } => Vec::new(),
            FileElementDetails::Group { children } => children.iter().collect(),
            FileElementDetails::VersionGroup {
                children,
                current_version,
                ..
            } => {
                let mut refs: Vec<&Reference> = children.iter().collect();
                refs.extend(current_version.iter());
                refs
            }
            FileElementDetails::ReferenceProxy {
                remote_reference, ..
            } => remote_reference.iter().collect(),
        }
    }

    /// Display name: `name` when present, else the last path component.
    pub fn display_name(&self) -> Option<&str> {
        if let Some(name) = &self.name {
            return Some(name);
        }
        let path = self.path.as_deref()?;
        path.rsplit('/').next()
    }

    pub fn children(&self) -> Option<&[Reference]> {
        match &self.details {
            FileElementDetails::Group { children }
            | FileElementDetails::VersionGroup { children, .. } => Some(children),
            _ => None,
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<Reference>> {
        match &mut self.details {
            FileElementDetails::Group { children }
            | FileElementDetails::VersionGroup { children, .. } => Some(children),
            _ => None,
        }
    }
}
