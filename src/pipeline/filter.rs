//! The filter unit contract.
//!
//! A filter sees every management operation before the rest of the chain.
//! Each method receives the remainder of the chain as `next`; the default
//! bodies forward the call unchanged. Override only the operations you want to
//! intercept, and return without calling `next` to short-circuit.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::error::MBeanResult;
use crate::mbean::{Attribute, DynamicMBean, MBeanInfo, MBeanServer, ObjectInstance, ObjectName};

#[async_trait]
pub trait MBeanServerFilter: Send + Sync {
    /// Name used in logs and diagnostics. Not required to be unique.
    fn name(&self) -> &str;

    /// Higher runs earlier. Must not change once the filter is constructed.
    fn priority(&self) -> i32;

    async fn register_mbean(
        &self,
        next: &dyn MBeanServer,
        name: ObjectName,
        bean: Arc<dyn DynamicMBean>,
    ) -> MBeanResult<ObjectInstance> {
        next.register_mbean(name, bean).await
    }

    async fn unregister_mbean(&self, next: &dyn MBeanServer, name: &ObjectName) -> MBeanResult<()> {
        next.unregister_mbean(name).await
    }

    async fn is_registered(&self, next: &dyn MBeanServer, name: &ObjectName) -> bool {
        next.is_registered(name).await
    }

    async fn get_mbean_count(&self, next: &dyn MBeanServer) -> usize {
        next.get_mbean_count().await
    }

    async fn query_names(
        &self,
        next: &dyn MBeanServer,
        pattern: Option<&ObjectName>,
    ) -> Vec<ObjectName> {
        next.query_names(pattern).await
    }

    async fn get_attribute(
        &self,
        next: &dyn MBeanServer,
        name: &ObjectName,
        attribute: &str,
    ) -> MBeanResult<Value> {
        next.get_attribute(name, attribute).await
    }

    async fn get_attributes(
        &self,
        next: &dyn MBeanServer,
        name: &ObjectName,
        attributes: &[String],
    ) -> MBeanResult<Vec<Attribute>> {
        next.get_attributes(name, attributes).await
    }

    async fn set_attribute(
        &self,
        next: &dyn MBeanServer,
        name: &ObjectName,
        attribute: Attribute,
    ) -> MBeanResult<()> {
        next.set_attribute(name, attribute).await
    }

    async fn invoke(
        &self,
        next: &dyn MBeanServer,
        name: &ObjectName,
        operation: &str,
        params: &[Value],
    ) -> MBeanResult<Value> {
        next.invoke(name, operation, params).await
    }

    async fn get_mbean_info(
        &self,
        next: &dyn MBeanServer,
        name: &ObjectName,
    ) -> MBeanResult<MBeanInfo> {
        next.get_mbean_info(name).await
    }

    async fn get_default_domain(&self, next: &dyn MBeanServer) -> String {
        next.get_default_domain().await
    }

    async fn get_domains(&self, next: &dyn MBeanServer) -> Vec<String> {
        next.get_domains().await
    }
}

/// A filter that intercepts nothing.
#[derive(Debug, Clone)]
pub struct PassThroughFilter {
    name: String,
    priority: i32,
}

impl PassThroughFilter {
    pub fn new(name: impl Into<String>, priority: i32) -> Self {
        Self {
            name: name.into(),
            priority,
        }
    }
}

#[async_trait]
impl MBeanServerFilter for PassThroughFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}
