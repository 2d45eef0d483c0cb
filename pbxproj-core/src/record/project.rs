//! The project record, root of the object graph.

use crate::decoder::FieldReader;
use crate::error::SchemaError;
use crate::record::{put_reference, put_reference_array, put_string_array};
use crate::reference::Reference;
use crate::value::{Dict, Value};

/// An entry of a project's `projectReferences` list, pointing at a
/// group of products and the referenced `.xcodeproj` file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteProjectReference {
    pub product_group: Option<Reference>,
    pub project_ref: Option<Reference>,
    pub extra: Dict,
}

impl RemoteProjectReference {
    fn decode(mut fields: Dict) -> Self {
        let product_group = fields
            .remove("ProductGroup")
            .and_then(|v| v.scalar_text())
            .map(Reference::new);
        let project_ref = fields
            .remove("ProjectRef")
            .and_then(|v| v.scalar_text())
            .map(Reference::new);
        RemoteProjectReference {
            product_group,
            project_ref,
            extra: fields,
        }
    }

    fn encode(&self) -> Dict {
        let mut out = Dict::new();
        if let Some(v) = &self.product_group {
            put_reference(&mut out, "ProductGroup", v);
        }
        if let Some(v) = &self.project_ref {
            put_reference(&mut out, "ProjectRef", v);
        }
        for (key, value) in &self.extra {
            out.entry(key.clone()).or_insert_with(|| value.clone());
        }
        out
    }
}

/// `PBXProject`. Attribute values are kept as the strings Xcode wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub attributes: Dict,
    pub build_configuration_list: Reference,
    pub compatibility_version: Option<String>,
    pub development_region: Option<String>,
    pub has_scanned_for_encodings: Option<i64>,
    pub known_regions: Vec<String>,
    pub main_group: Reference,
    pub product_ref_group: Option<Reference>,
    pub project_dir_path: Option<String>,
    pub project_references: Vec<RemoteProjectReference>,
    pub project_root: Option<String>,
    pub targets: Vec<Reference>,
}

impl Project {
    pub fn decode(r: &mut FieldReader<'_>) -> Result<Self, SchemaError> {
        let project_references = r
            .optional_array("projectReferences")?
            .unwrap_or_default()
            .into_iter()
            .map(|item| match item.into_dict() {
                Some(fields) => RemoteProjectReference::decode(fields),
                None => RemoteProjectReference::default(),
            })
            .collect();
        Ok(Project {
            attributes: r.optional_dict("attributes")?.unwrap_or_default(),
            build_configuration_list: r.require_reference("buildConfigurationList")?,
            compatibility_version: r.optional_string("compatibilityVersion")?,
            development_region: r.optional_string("developmentRegion")?,
            has_scanned_for_encodings: r.optional_integer("hasScannedForEncodings")?,
            known_regions: r.optional_string_array("knownRegions")?.unwrap_or_default(),
            main_group: r.require_reference("mainGroup")?,
            product_ref_group: r.optional_reference("productRefGroup")?,
            project_dir_path: r.optional_string("projectDirPath")?,
            project_references,
            project_root: r.optional_string("projectRoot")?,
            targets: r.optional_reference_array("targets")?.unwrap_or_default(),
        })
    }

    pub fn encode_into(&self, out: &mut Dict) {
        if !self.attributes.is_empty() {
            out.insert("attributes".to_string(), Value::Dict(self.attributes.clone()));
        }
        put_reference(out, "buildConfigurationList", &self.build_configuration_list);
        if let Some(v) = &self.compatibility_version {
            out.insert("compatibilityVersion".to_string(), Value::from(v.as_str()));
        }
        if let Some(v) = &self.development_region {
            out.insert("developmentRegion".to_string(), Value::from(v.as_str()));
        }
        if let Some(v) = self.has_scanned_for_encodings {
            out.insert("hasScannedForEncodings".to_string(), Value::from(v));
        }
        if !self.known_regions.is_empty() {
            put_string_array(out, "knownRegions", &self.known_regions);
        }
        put_reference(out, "mainGroup", &self.main_group);
        if let Some(v) = &self.product_ref_group {
            put_reference(out, "productRefGroup", v);
        }
        if let Some(v) = &self.project_dir_path {
            out.insert("projectDirPath".to_string(), Value::from(v.as_str()));
        }
        if !self.project_references.is_empty() {
            out.insert(
                "projectReferences".to_string(),
                Value::Array(
                    self.project_references
                        .iter()
                        .map(|r| Value::Dict(r.encode()))
                        .collect(),
                ),
            );
        }
        if let Some(v) = &self.project_root {
            out.insert("projectRoot".to_string(), Value::from(v.as_str()));
        }
        put_reference_array(out, "targets", &self.targets);
    }

    pub fn references(&self) -> Vec<&Reference> {
        let mut refs = vec![&self.build_configuration_list, &self.main_group];
        refs.extend(self.product_ref_group.iter());
        refs.extend(self.targets.iter());
        for remote in &self.project_references {
            refs.extend(remote.product_group.iter());
            refs.extend(remote.project_ref.iter());
        }
        refs
    }
}
