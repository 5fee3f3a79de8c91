//! Builds the live forwarding chain from an ordered filter list.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use super::filter::MBeanServerFilter;
use crate::error::MBeanResult;
use crate::mbean::{Attribute, DynamicMBean, MBeanInfo, MBeanServer, ObjectInstance, ObjectName};

/// One node of a built chain: a filter bound to whatever follows it.
///
/// Links are immutable. Membership changes build a fresh set of links, so a
/// caller still holding an older head keeps the ordering it started with.
struct FilterLink {
    filter: Arc<dyn MBeanServerFilter>,
    next: Arc<dyn MBeanServer>,
}

/// Links `filters` (already sorted, first runs first) in front of `terminal`.
/// With no filters the terminal itself is the head.
pub fn build_chain(
    filters: &[Arc<dyn MBeanServerFilter>],
    terminal: Arc<dyn MBeanServer>,
) -> Arc<dyn MBeanServer> {
    filters
        .iter()
        .rev()
        .fold(terminal, |next, filter| -> Arc<dyn MBeanServer> {
            Arc::new(FilterLink {
                filter: filter.clone(),
                next,
            })
        })
}

#[async_trait]
impl MBeanServer for FilterLink {
    async fn register_mbean(
        &self,
        name: ObjectName,
        bean: Arc<dyn DynamicMBean>,
    ) -> MBeanResult<ObjectInstance> {
        self.filter
            .register_mbean(self.next.as_ref(), name, bean)
            .await
    }

    async fn unregister_mbean(&self, name: &ObjectName) -> MBeanResult<()> {
        self.filter.unregister_mbean(self.next.as_ref(), name).await
    }

    async fn is_registered(&self, name: &ObjectName) -> bool {
        self.filter.is_registered(self.next.as_ref(), name).await
    }

    async fn get_mbean_count(&self) -> usize {
        self.filter.get_mbean_count(self.next.as_ref()).await
    }

    async fn query_names(&self, pattern: Option<&ObjectName>) -> Vec<ObjectName> {
        self.filter.query_names(self.next.as_ref(), pattern).await
    }

    async fn get_attribute(&self, name: &ObjectName, attribute: &str) -> MBeanResult<Value> {
        self.filter
            .get_attribute(self.next.as_ref(), name, attribute)
            .await
    }

    async fn get_attributes(
        &self,
        name: &ObjectName,
        attributes: &[String],
    ) -> MBeanResult<Vec<Attribute>> {
        self.filter
            .get_attributes(self.next.as_ref(), name, attributes)
            .await
    }

    async fn set_attribute(&self, name: &ObjectName, attribute: Attribute) -> MBeanResult<()> {
        self.filter
            .set_attribute(self.next.as_ref(), name, attribute)
            .await
    }

    async fn invoke(
        &self,
        name: &ObjectName,
        operation: &str,
        params: &[Value],
    ) -> MBeanResult<Value> {
        self.filter
            .invoke(self.next.as_ref(), name, operation, params)
            .await
    }

    async fn get_mbean_info(&self, name: &ObjectName) -> MBeanResult<MBeanInfo> {
        self.filter.get_mbean_info(self.next.as_ref(), name).await
    }

    async fn get_default_domain(&self) -> String {
        self.filter.get_default_domain(self.next.as_ref()).await
    }

    async fn get_domains(&self) -> Vec<String> {
        self.filter.get_domains(self.next.as_ref()).await
    }
}
