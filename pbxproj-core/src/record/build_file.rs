//! Membership of a file in a build phase.

use crate::decoder::FieldReader;
use crate::error::SchemaError;
use crate::record::put_reference;
use crate::reference::Reference;
use crate::value::{Dict, Value};

/// `PBXBuildFile`: ties a file element into a build phase, optionally
/// with per-file compiler settings.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildFile {
    pub file_ref: Reference,
    /// Per-file settings; omitted from output when empty.
    pub settings: Dict,
}

impl BuildFile {
    pub fn decode(r: &mut FieldReader<'_>) -> Result<Self, SchemaError> {
        Ok(BuildFile {
            file_ref: r.require_reference("fileRef")?,
            settings: r.optional_dict("settings")?.unwrap_or_default(),
        })
    }

    pub fn encode_into(&self, out: &mut Dict) {
        put_reference(out, "fileRef", &self.file_ref);
        if !self.settings.is_empty() {
            out.insert("settings".to_string(), Value::Dict(self.settings.clone()));
        }
    }

    pub fn references(&self) -> Vec<&Reference> {
        vec![&self.file_ref]
    }
}
