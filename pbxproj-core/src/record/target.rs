//! Native, aggregate and legacy targets.

use crate::decoder::FieldReader;
use crate::error::SchemaError;
use crate::record::{put_reference, put_reference_array};
use crate::reference::Reference;
use crate::tag::ObjectKind;
use crate::value::{Dict, Value};

/// Common shape of the three target tags.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub name: String,
    pub build_configuration_list: Reference,
    pub build_phases: Vec<Reference>,
    pub build_rules: Vec<Reference>,
    pub dependencies: Vec<Reference>,
    pub details: TargetDetails,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TargetDetails {
    Native {
        product_name: Option<String>,
        product_reference: Option<Reference>,
        product_type: Option<String>,
    },
    Aggregate {
        product_name: Option<String>,
    },
    Legacy {
        build_tool_path: Option<String>,
        build_arguments_string: Option<String>,
        pass_build_settings_in_environment: Option<i64>,
        build_working_directory: Option<String>,
    },
}

impl Target {
    pub fn decode(kind: ObjectKind, r: &mut FieldReader<'_>) -> Result<Self, SchemaError> {
        let details = match kind {
            ObjectKind::NativeTarget => TargetDetails::Native {
                product_name: r.optional_string("productName")?,
                product_reference: r.optional_reference("productReference")?,
                product_type: r.optional_string("productType")?,
            },
            ObjectKind::LegacyTarget => TargetDetails::Legacy {
                build_tool_path: r.optional_string("buildToolPath")?,
                build_arguments_string: r.optional_string("buildArgumentsString")?,
                pass_build_settings_in_environment: r
                    .optional_integer("passBuildSettingsInEnvironment")?,
                build_working_directory: r.optional_string("buildWorkingDirectory")?,
            },
            _ => TargetDetails::Aggregate {
                product_name: r.optional_string("productName")?,
            },
        };
        Ok(Target {
            name: r.require_string("name")?,
            build_configuration_list: r.require_reference("buildConfigurationList")?,
            build_phases: r.optional_reference_array("buildPhases")?.unwrap_or_default(),
            build_rules: r.optional_reference_array("buildRules")?.unwrap_or_default(),
            dependencies: r.optional_reference_array("dependencies")?.unwrap_or_default(),
            details,
        })
    }

    pub fn encode_into(&self, out: &mut Dict) {
        out.insert("name".to_string(), Value::from(self.name.as_str()));
        put_reference(out, "buildConfigurationList", &self.build_configuration_list);
        put_reference_array(out, "buildPhases", &self.build_phases);
        put_reference_array(out, "dependencies", &self.dependencies);
        match &self.details {
            TargetDetails::Native {
                product_name,
                product_reference,
                product_type,
            } => {
                // Native targets always list their rules.
                put_reference_array(out, "buildRules", &self.build_rules);
                if let Some(v) = product_name {
                    out.insert("productName".to_string(), Value::from(v.as_str()));
                }
                if let Some(v) = product_reference {
                    put_reference(out, "productReference", v);
                }
                if let Some(v) = product_type {
                    out.insert("productType".to_string(), Value::from(v.as_str()));
                }
            }
            TargetDetails::Aggregate { product_name } => {
                if !self.build_rules.is_empty() {
                    put_reference_array(out, "buildRules", &self.build_rules);
                }
                if let Some(v) = product_name {
                    out.insert("productName".to_string(), Value::from(v.as_str()));
                }
            }
            TargetDetails::Legacy {
                build_tool_path,
                build_arguments_string,
                pass_build_settings_in_environment,
                build_working_directory,
            } => {
                if !self.build_rules.is_empty() {
                    put_reference_array(out, "buildRules", &self.build_rules);
                }
                if let Some(v) = build_tool_path {
                    out.insert("buildToolPath".to_string(), Value::from(v.as_str()));
                }
                if let Some(v) = build_arguments_string {
                    out.insert("buildArgumentsString".to_string(), Value::from(v.as_str()));
                }
                if let Some(v) = pass_build_settings_in_environment {
                    out.insert(
                        "passBuildSettingsInEnvironment".to_string(),
                        Value::from(*v),
                    );
                }
                if let Some(v) = build_working_directory {
                    out.insert("buildWorkingDirectory".to_string(), Value::from(v.as_str()));
                }
            }
        }
    }

    pub fn references(&self) -> Vec<&Reference> {
        let mut refs = vec![&self.build_configuration_list];
        refs.extend(self.build_phases.iter());
        refs.extend(self.build_rules.iter());
        refs.extend(self.dependencies.iter());
        if let TargetDetails::Native {
            product_reference: Some(product),
            ..
        } = &self.details
        {
            refs.push(product);
        }
        refs
    }
}
