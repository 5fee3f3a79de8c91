use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use super::bean::DynamicMBean;
use super::name::ObjectName;
use crate::error::MBeanResult;

/// A named attribute value, as read or written through the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: Value,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Returned on successful registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectInstance {
    pub object_name: ObjectName,
    pub class_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MBeanAttributeInfo {
    pub name: String,
    pub description: String,
    pub readable: bool,
    pub writable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MBeanOperationInfo {
    pub name: String,
    pub description: String,
}

/// Management interface description of a bean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MBeanInfo {
    pub class_name: String,
    pub description: String,
    pub attributes: Vec<MBeanAttributeInfo>,
    pub operations: Vec<MBeanOperationInfo>,
}

/// The management operation interface.
///
/// Implemented by the terminal registry, by every link of a filter chain, and
/// by the pipeline itself, so callers never need to know whether they talk to
/// the real server or to the head of a chain of interceptors.
#[async_trait]
pub trait MBeanServer: Send + Sync {
    async fn register_mbean(
        &self,
        name: ObjectName,
        bean: Arc<dyn DynamicMBean>,
    ) -> MBeanResult<ObjectInstance>;

    async fn unregister_mbean(&self, name: &ObjectName) -> MBeanResult<()>;

    async fn is_registered(&self, name: &ObjectName) -> bool;

    async fn get_mbean_count(&self) -> usize;

    /// Names selected by `pattern`, or every name when `None`. Sorted.
    async fn query_names(&self, pattern: Option<&ObjectName>) -> Vec<ObjectName>;

    async fn get_attribute(&self, name: &ObjectName, attribute: &str) -> MBeanResult<Value>;

    /// Reads several attributes at once. Attributes that cannot be read are
    /// left out of the result rather than failing the whole call.
    async fn get_attributes(
        &self,
        name: &ObjectName,
        attributes: &[String],
    ) -> MBeanResult<Vec<Attribute>>;

    async fn set_attribute(&self, name: &ObjectName, attribute: Attribute) -> MBeanResult<()>;

    async fn invoke(
        &self,
        name: &ObjectName,
        operation: &str,
        params: &[Value],
    ) -> MBeanResult<Value>;

    async fn get_mbean_info(&self, name: &ObjectName) -> MBeanResult<MBeanInfo>;

    async fn get_default_domain(&self) -> String;

    async fn get_domains(&self) -> Vec<String>;
}
