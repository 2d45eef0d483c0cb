//! Cross-project proxies and target dependencies.

use crate::decoder::FieldReader;
use crate::error::SchemaError;
use crate::record::put_reference;
use crate::reference::Reference;
use crate::value::{Dict, Value};

/// `PBXContainerItemProxy`: an item living in another container.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerItemProxy {
    pub container_portal: Reference,
    pub proxy_type: Option<i64>,
    pub remote_global_id: Option<Reference>,
    pub remote_info: Option<String>,
}

impl ContainerItemProxy {
    pub fn decode(r: &mut FieldReader<'_>) -> Result<Self, SchemaError> {
        Ok(ContainerItemProxy {
            container_portal: r.require_reference("containerPortal")?,
            proxy_type: r.optional_integer("proxyType")?,
            remote_global_id: r.optional_reference("remoteGlobalIDString")?,
            remote_info: r.optional_string("remoteInfo")?,
        })
    }

    pub fn encode_into(&self, out: &mut Dict) {
        put_reference(out, "containerPortal", &self.container_portal);
        if let Some(v) = self.proxy_type {
            out.insert("proxyType".to_string(), Value::from(v));
        }
        if let Some(v) = &self.remote_global_id {
            put_reference(out, "remoteGlobalIDString", v);
        }
        if let Some(v) = &self.remote_info {
            out.insert("remoteInfo".to_string(), Value::from(v.as_str()));
        }
    }

    pub fn references(&self) -> Vec<&Reference> {
        let mut refs = vec![&self.container_portal];
        refs.extend(self.remote_global_id.iter());
        refs
    }
}

/// `PBXTargetDependency`: a target's dependency edge, usually routed
/// through a container item proxy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetDependency {
    pub target: Option<Reference>,
    pub target_proxy: Option<Reference>,
}

impl TargetDependency {
    pub fn decode(r: &mut FieldReader<'_>) -> Result<Self, SchemaError> {
        Ok(TargetDependency {
            target: r.optional_reference("target")?,
            target_proxy: r.optional_reference("targetProxy")?,
        })
    }

    pub fn encode_into(&self, out: &mut Dict) {
        if let Some(v) = &self.target {
            put_reference(out, "target", v);
        }
        if let Some(v) = &self.target_proxy {
            put_reference(out, "targetProxy", v);
        }
    }

    pub fn references(&self) -> Vec<&Reference> {
        self.target.iter().chain(self.target_proxy.iter()).collect()
    }
}
