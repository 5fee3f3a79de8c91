use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

use crate::error::{MBeanError, MBeanResult};
use crate::mbean::{Attribute, DynamicMBean, MBeanServer, ObjectInstance, ObjectName};
use crate::pipeline::MBeanServerFilter;

/// Makes beans matching any of the protected patterns read-only.
///
/// Registration, unregistration, attribute writes and operation invocations
/// on a protected name fail with `AccessDenied` and never reach the rest of
/// the chain. Reads are forwarded. Names with an empty domain are checked as
/// the default domain of the server below.
pub struct AccessFilter {
    priority: i32,
    read_only: Vec<ObjectName>,
}

impl AccessFilter {
    pub fn new(priority: i32, read_only: Vec<ObjectName>) -> Self {
        Self {
            priority,
            read_only,
        }
    }

    pub fn is_protected(&self, name: &ObjectName) -> bool {
        self.read_only.iter().any(|pattern| pattern.matches(name))
    }

    async fn check(
        &self,
        next: &dyn MBeanServer,
        name: &ObjectName,
        operation: &str,
    ) -> MBeanResult<()> {
        let resolved = if name.domain().is_empty() {
            name.with_domain(&next.get_default_domain().await)
        } else {
            name.clone()
        };
        if self.is_protected(&resolved) {
            warn!("Denied {} on read-only MBean {}", operation, resolved);
            return Err(MBeanError::AccessDenied {
                name: resolved,
                operation: operation.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl MBeanServerFilter for AccessFilter {
    fn name(&self) -> &str {
        "access"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    async fn register_mbean(
        &self,
        next: &dyn MBeanServer,
        name: ObjectName,
        bean: Arc<dyn DynamicMBean>,
    ) -> MBeanResult<ObjectInstance> {
        self.check(next, &name, "register_mbean").await?;
        next.register_mbean(name, bean).await
    }

    async fn unregister_mbean(&self, next: &dyn MBeanServer, name: &ObjectName) -> MBeanResult<()> {
        self.check(next, name, "unregister_mbean").await?;
        next.unregister_mbean(name).await
    }

    async fn set_attribute(
        &self,
        next: &dyn MBeanServer,
        name: &ObjectName,
        attribute: Attribute,
    ) -> MBeanResult<()> {
        self.check(next, name, "set_attribute").await?;
        next.set_attribute(name, attribute).await
    }

    async fn invoke(
        &self,
        next: &dyn MBeanServer,
        name: &ObjectName,
        operation: &str,
        params: &[Value],
    ) -> MBeanResult<Value> {
        self.check(next, name, "invoke").await?;
        next.invoke(name, operation, params).await
    }
}
