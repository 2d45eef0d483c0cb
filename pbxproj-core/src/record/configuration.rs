//! Build configurations and configuration lists.

use crate::decoder::FieldReader;
use crate::error::SchemaError;
use crate::record::{put_reference, put_reference_array};
use crate::reference::Reference;
use crate::value::{Dict, Value};

/// `XCBuildConfiguration`: a named bag of build settings. Setting
/// values are kept as the strings Xcode wrote, never coerced.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfiguration {
    pub name: String,
    pub base_configuration_reference: Option<Reference>,
    pub build_settings: Dict,
}

impl BuildConfiguration {
    pub fn decode(r: &mut FieldReader<'_>) -> Result<Self, SchemaError> {
        Ok(BuildConfiguration {
            name: r.require_string("name")?,
            base_configuration_reference: r.optional_reference("baseConfigurationReference")?,
            build_settings: r.optional_dict("buildSettings")?.unwrap_or_default(),
        })
    }

    pub fn encode_into(&self, out: &mut Dict) {
        out.insert("name".to_string(), Value::from(self.name.as_str()));
        if let Some(v) = &self.base_configuration_reference {
            put_reference(out, "baseConfigurationReference", v);
        }
        out.insert(
            "buildSettings".to_string(),
            Value::Dict(self.build_settings.clone()),
        );
    }

    pub fn references(&self) -> Vec<&Reference> {
        self.base_configuration_reference.iter().collect()
    }

    pub fn setting(&self, key: &str) -> Option<&Value> {
        self.build_settings.get(key)
    }
}

/// `XCConfigurationList`: the ordered configurations of a target or
/// project, with the default's name.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationList {
    pub build_configurations: Vec<Reference>,
    /// Kept as the string Xcode wrote (`0` or `1`).
    pub default_configuration_is_visible: Option<String>,
    pub default_configuration_name: Option<String>,
}

impl ConfigurationList {
    pub fn decode(r: &mut FieldReader<'_>) -> Result<Self, SchemaError> {
        Ok(ConfigurationList {
            build_configurations: r.require_reference_array("buildConfigurations")?,
            default_configuration_is_visible: r.optional_string("defaultConfigurationIsVisible")?,
            default_configuration_name: r.optional_string("defaultConfigurationName")?,
        })
    }

    pub fn encode_into(&self, out: &mut Dict) {
        put_reference_array(out, "buildConfigurations", &self.build_configurations);
        if let Some(v) = &self.default_configuration_is_visible {
            out.insert(
                "defaultConfigurationIsVisible".to_string(),
                Value::from(v.as_str()),
            );
        }
        if let Some(v) = &self.default_configuration_name {
            out.insert(
                "defaultConfigurationName".to_string(),
                Value::from(v.as_str()),
            );
        }
    }

    pub fn references(&self) -> Vec<&Reference> {
        self.build_configurations.iter().collect()
    }
}
