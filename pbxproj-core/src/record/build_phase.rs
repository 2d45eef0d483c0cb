//! Build phases: the per-target steps that consume build files.

use crate::decoder::FieldReader;
use crate::error::SchemaError;
use crate::record::{put_reference_array, put_string_array};
use crate::reference::Reference;
use crate::tag::ObjectKind;
use crate::value::{Dict, Value};

/// Any of the eight build-phase shapes. The plain phases (sources,
/// frameworks, headers, resources, Rez, AppleScript) carry nothing
/// beyond the common fields; copy-files and shell-script phases add
/// their own.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildPhase {
    pub build_action_mask: Option<i64>,
    pub files: Vec<Reference>,
    pub run_only_for_deployment_postprocessing: Option<i64>,
    pub details: PhaseDetails,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PhaseDetails {
    Plain,
    CopyFiles {
        name: Option<String>,
        dst_path: String,
        dst_subfolder_spec: i64,
    },
    ShellScript {
        name: Option<String>,
        input_file_list_paths: Option<Vec<String>>,
        input_paths: Option<Vec<String>>,
        output_paths: Option<Vec<String>>,
        shell_path: String,
        shell_script: Option<String>,
        show_env_vars_in_log: Option<i64>,
    },
}

impl BuildPhase {
    pub fn decode(kind: ObjectKind, r: &mut FieldReader<'_>) -> Result<Self, SchemaError> {
        let build_action_mask = r.optional_integer("buildActionMask")?;
        let files = r.require_reference_array("files")?;
        let run_only = r.optional_integer("runOnlyForDeploymentPostprocessing")?;
        let details = match kind {
            ObjectKind::CopyFilesBuildPhase => PhaseDetails::CopyFiles {
                name: r.optional_string("name")?,
                dst_path: r.require_string("dstPath")?,
                dst_subfolder_spec: r.require_integer("dstSubfolderSpec")?,
            },
            ObjectKind::ShellScriptBuildPhase => PhaseDetails::ShellScript {
                name: r.optional_string("name")?,
                input_file_list_paths: r.optional_string_array("inputFileListPaths")?,
                input_paths: r.optional_string_array("inputPaths")?,
                output_paths: r.optional_string_array("outputPaths")?,
                shell_path: r.require_string("shellPath")?,
                shell_script: r.optional_string("shellScript")?,
                show_env_vars_in_log: r.optional_integer("showEnvVarsInLog")?,
            },
            _ => PhaseDetails::Plain,
        };
        Ok(BuildPhase {
            build_action_mask,
            files,
            run_only_for_deployment_postprocessing: run_only,
            details,
        })
    }

    pub fn encode_into(&self, out: &mut Dict) {
        if let Some(mask) = self.build_action_mask {
            out.insert("buildActionMask".to_string(), Value::from(mask));
        }
        put_reference_array(out, "files", &self.files);
        if let Some(flag) = self.run_only_for_deployment_postprocessing {
            out.insert(
                "runOnlyForDeploymentPostprocessing".to_string(),
                Value::from(flag),
            );
        }
        match &self.details {
            PhaseDetails::Plain => {}
            PhaseDetails::CopyFiles {
                name,
                dst_path,
                dst_subfolder_spec,
            } => {
                if let Some(name) = name {
                    out.insert("name".to_string(), Value::from(name.as_str()));
                }
                out.insert("dstPath".to_string(), Value::from(dst_path.as_str()));
                out.insert(
                    "dstSubfolderSpec".to_string(),
                    Value::from(*dst_subfolder_spec),
                );
            }
            PhaseDetails::ShellScript {
                name,
                input_file_list_paths,
                input_paths,
                output_paths,
                shell_path,
                shell_script,
                show_env_vars_in_log,
            } => {
                if let Some(name) = name {
                    out.insert("name".to_string(), Value::from(name.as_str()));
                }
                if let Some(paths) = input_file_list_paths {
                    put_string_array(out, "inputFileListPaths", paths);
                }
                if let Some(paths) = input_paths {
                    put_string_array(out, "inputPaths", paths);
                }
                if let Some(paths) = output_paths {
                    put_string_array(out, "outputPaths", paths);
                }
                out.insert("shellPath".to_string(), Value::from(shell_path.as_str()));
                if let Some(script) = shell_script {
                    out.insert("shellScript".to_string(), Value::from(script.as_str()));
                }
                if let Some(flag) = show_env_vars_in_log {
                    out.insert("showEnvVarsInLog".to_string(), Value::from(*flag));
                }
            }
        }
    }

    pub fn references(&self) -> Vec<&Reference> {
        self.files.iter().collect()
    }

    /// The phase's own name, when its shape carries one.
    pub fn name(&self) -> Option<&str> {
        match &self.details {
            PhaseDetails::Plain => None,
            PhaseDetails::CopyFiles { name, .. } => name.as_deref(),
            PhaseDetails::ShellScript { name, .. } => name.as_deref(),
        }
    }

    /// Display label of a phase kind, used when the phase has no name.
    pub fn kind_label(kind: ObjectKind) -> Option<&'static str> {
        match kind {
            ObjectKind::SourcesBuildPhase => Some("Sources"),
            ObjectKind::FrameworksBuildPhase => Some("Frameworks"),
            ObjectKind::HeadersBuildPhase => Some("Headers"),
            ObjectKind::ResourcesBuildPhase => Some("Resources"),
            ObjectKind::CopyFilesBuildPhase => Some("CopyFiles"),
            ObjectKind::ShellScriptBuildPhase => Some("Run Script"),
            ObjectKind::RezBuildPhase => Some("Rez"),
            ObjectKind::AppleScriptBuildPhase => Some("Apple Script"),
            _ => None,
        }
    }
}
