//! Custom build rules attached to native targets.

use crate::decoder::FieldReader;
use crate::error::SchemaError;
use crate::record::put_string_array;
use crate::value::{Dict, Value};

/// `PBXBuildRule`. Holds no references to other records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildRule {
    pub compiler_spec: Option<String>,
    pub file_patterns: Option<String>,
    pub file_type: Option<String>,
    pub is_editable: Option<i64>,
    pub name: Option<String>,
    pub input_files: Option<Vec<String>>,
    pub output_files: Option<Vec<String>>,
    pub output_files_compiler_flags: Option<Vec<String>>,
    pub script: Option<String>,
}

impl BuildRule {
    pub fn decode(r: &mut FieldReader<'_>) -> Result<Self, SchemaError> {
        Ok(BuildRule {
            compiler_spec: r.optional_string("compilerSpec")?,
            file_patterns: r.optional_string("filePatterns")?,
            file_type: r.optional_string("fileType")?,
            is_editable: r.optional_integer("isEditable")?,
            name: r.optional_string("name")?,
            input_files: r.optional_string_array("inputFiles")?,
            output_files: r.optional_string_array("outputFiles")?,
            output_files_compiler_flags: r.optional_string_array("outputFilesCompilerFlags")?,
            script: r.optional_string("script")?,
        })
    }

    pub fn encode_into(&self, out: &mut Dict) {
        if let Some(v) = &self.compiler_spec {
            out.insert("compilerSpec".to_string(), Value::from(v.as_str()));
        }
        if let Some(v) = &self.file_patterns {
            out.insert("filePatterns".to_string(), Value::from(v.as_str()));
        }
        if let Some(v) = &self.file_type {
            out.insert("fileType".to_string(), Value::from(v.as_str()));
        }
        if let Some(v) = self.is_editable {
            out.insert("isEditable".to_string(), Value::from(v));
        }
        if let Some(v) = &self.name {
            out.insert("name".to_string(), Value::from(v.as_str()));
        }
        if let Some(v) = &self.input_files {
            put_string_array(out, "inputFiles", v);
        }
        if let Some(v) = &self.output_files {
            put_string_array(out, "outputFiles", v);
        }
        if let Some(v) = &self.output_files_compiler_flags {
            put_string_array(out, "outputFilesCompilerFlags", v);
        }
        if let Some(v) = &self.script {
            out.insert("script".to_string(), Value::from(v.as_str()));
        }
    }
}
