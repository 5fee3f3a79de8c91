use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::MBeanResult;
use crate::mbean::{Attribute, DynamicMBean, MBeanServer, ObjectInstance, ObjectName};
use crate::pipeline::MBeanServerFilter;

/// Logs every call with its duration. Failures are logged at `warn`.
pub struct TracingFilter {
    priority: i32,
}

impl TracingFilter {
    pub fn new(priority: i32) -> Self {
        Self { priority }
    }
}

fn record<T, E: Display>(operation: &str, mbean: &str, started: Instant, result: &Result<T, E>) {
    let elapsed_us = started.elapsed().as_micros() as u64;
    match result {
        Ok(_) => debug!(operation, mbean, elapsed_us, "management call completed"),
        Err(e) => warn!(operation, mbean, elapsed_us, error = %e, "management call failed"),
    }
}

#[async_trait]
impl MBeanServerFilter for TracingFilter {
    fn name(&self) -> &str {
        "tracing"
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
        let mbean = name.to_string();
        let started = Instant::now();
        let result = next.register_mbean(name, bean).await;
        record("register_mbean", &mbean, started, &result);
        result
    }

    async fn unregister_mbean(&self, next: &dyn MBeanServer, name: &ObjectName) -> MBeanResult<()> {
        let started = Instant::now();
        let result = next.unregister_mbean(name).await;
        record("unregister_mbean", name.canonical_name(), started, &result);
        result
    }

    async fn get_attribute(
        &self,
        next: &dyn MBeanServer,
        name: &ObjectName,
        attribute: &str,
    ) -> MBeanResult<Value> {
        let started = Instant::now();
        let result = next.get_attribute(name, attribute).await;
        record("get_attribute", name.canonical_name(), started, &result);
        result
    }

    async fn get_attributes(
        &self,
        next: &dyn MBeanServer,
        name: &ObjectName,
        attributes: &[String],
    ) -> MBeanResult<Vec<Attribute>> {
        let started = Instant::now();
        let result = next.get_attributes(name, attributes).await;
        record("get_attributes", name.canonical_name(), started, &result);
        result
    }

    async fn set_attribute(
        &self,
        next: &dyn MBeanServer,
        name: &ObjectName,
        attribute: Attribute,
    ) -> MBeanResult<()> {
        let started = Instant::now();
        let result = next.set_attribute(name, attribute).await;
        record("set_attribute", name.canonical_name(), started, &result);
        result
    }

    async fn invoke(
        &self,
        next: &dyn MBeanServer,
        name: &ObjectName,
        operation: &str,
        params: &[Value],
    ) -> MBeanResult<Value> {
        let started = Instant::now();
        let result = next.invoke(name, operation, params).await;
        record("invoke", name.canonical_name(), started, &result);
        result
    }

    async fn query_names(
        &self,
        next: &dyn MBeanServer,
        pattern: Option<&ObjectName>,
    ) -> Vec<ObjectName> {
        let names = next.query_names(pattern).await;
        debug!(
            pattern = pattern.map(ObjectName::canonical_name).unwrap_or("*:*"),
            matched = names.len(),
            "query_names"
        );
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MBeanError;
    use crate::mbean::{InMemoryMBeanServer, SimpleMBean};
    use serde_json::json;

    #[tokio::test]
    async fn test_results_pass_through_unchanged() {
        let terminal = InMemoryMBeanServer::default();
        let filter = TracingFilter::new(1);
        let name = ObjectName::parse("app:type=Cache").unwrap();

        filter
            .register_mbean(
                &terminal,
                name.clone(),
                Arc::new(SimpleMBean::new("Cache").with_attribute("Size", json!(4))),
            )
            .await
            .unwrap();

        assert_eq!(filter.get_attribute(&terminal, &name, "Size").await, Ok(json!(4)));
        assert_eq!(
            filter.invoke(&terminal, &name, "flush", &[]).await,
            Err(MBeanError::OperationNotFound {
                name: name.clone(),
                operation: "flush".to_string(),
            })
        );
        assert_eq!(filter.query_names(&terminal, None).await, vec![name]);
    }
}
