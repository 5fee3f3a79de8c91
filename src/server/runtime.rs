//! Beans the server registers about itself.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::sync::{Arc, Weak};

use super::ManagementServer;
use crate::error::{BeanError, MBeanResult};
use crate::mbean::{
    Attribute, DynamicMBean, MBeanAttributeInfo, MBeanInfo, MBeanServer, ObjectName,
};
use crate::pipeline::MBeanServerPipeline;

pub const RUNTIME_NAME: &str = "mbean-pipeline:type=Runtime";
pub const PIPELINE_NAME: &str = "mbean-pipeline:type=Pipeline";

fn read_only(name: &str, description: &str) -> MBeanAttributeInfo {
    MBeanAttributeInfo {
        name: name.to_string(),
        description: description.to_string(),
        readable: true,
        writable: false,
    }
}

/// Process start time and uptime.
pub struct RuntimeMBean {
    started_at: DateTime<Utc>,
}

impl RuntimeMBean {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
        }
    }
}

impl Default for RuntimeMBean {
    fn default() -> Self {
        Self::new()
    }
}

impl DynamicMBean for RuntimeMBean {
    fn get_attribute(&self, attribute: &str) -> Result<Value, BeanError> {
        match attribute {
            "StartTime" => Ok(json!(self.started_at.to_rfc3339())),
            "UptimeSeconds" => Ok(json!((Utc::now() - self.started_at).num_seconds())),
            "Version" => Ok(json!(env!("CARGO_PKG_VERSION"))),
            other => Err(BeanError::UnknownAttribute(other.to_string())),
        }
    }

    fn set_attribute(&self, attribute: Attribute) -> Result<(), BeanError> {
        match attribute.name.as_str() {
            "StartTime" | "UptimeSeconds" | "Version" => Err(BeanError::ReadOnly(attribute.name)),
            _ => Err(BeanError::UnknownAttribute(attribute.name)),
        }
    }

    fn invoke(&self, operation: &str, _params: &[Value]) -> Result<Value, BeanError> {
        Err(BeanError::UnknownOperation(operation.to_string()))
    }

    fn info(&self) -> MBeanInfo {
        MBeanInfo {
            class_name: "Runtime".to_string(),
            description: "Management server runtime".to_string(),
            attributes: vec![
                read_only("StartTime", "RFC 3339 start timestamp"),
                read_only("UptimeSeconds", "Seconds since start"),
                read_only("Version", "Server version"),
            ],
            operations: Vec::new(),
        }
    }
}

/// Exposes the installed filters. Holds the pipeline weakly since the
/// pipeline (through its terminal) owns this bean.
pub struct PipelineMBean {
    pipeline: Weak<MBeanServerPipeline>,
}

impl PipelineMBean {
    pub fn new(pipeline: &Arc<MBeanServerPipeline>) -> Self {
        Self {
            pipeline: Arc::downgrade(pipeline),
        }
    }

    fn pipeline(&self) -> Result<Arc<MBeanServerPipeline>, BeanError> {
        self.pipeline
            .upgrade()
            .ok_or_else(|| BeanError::Failed("pipeline has been dropped".to_string()))
    }
}

impl DynamicMBean for PipelineMBean {
    fn get_attribute(&self, attribute: &str) -> Result<Value, BeanError> {
        let pipeline = self.pipeline()?;
        match attribute {
            "Filters" => serde_json::to_value(pipeline.filters())
                .map_err(|e| BeanError::Failed(e.to_string())),
            "FilterCount" => Ok(json!(pipeline.len())),
            "MinPriority" => Ok(json!(pipeline.min_priority())),
            other => Err(BeanError::UnknownAttribute(other.to_string())),
        }
    }

    fn set_attribute(&self, attribute: Attribute) -> Result<(), BeanError> {
        match attribute.name.as_str() {
            "Filters" | "FilterCount" | "MinPriority" => Err(BeanError::ReadOnly(attribute.name)),
            _ => Err(BeanError::UnknownAttribute(attribute.name)),
        }
    }

    fn invoke(&self, operation: &str, _params: &[Value]) -> Result<Value, BeanError> {
        Err(BeanError::UnknownOperation(operation.to_string()))
    }

    fn info(&self) -> MBeanInfo {
        MBeanInfo {
            class_name: "Pipeline".to_string(),
            description: "Installed management filters".to_string(),
            attributes: vec![
                read_only("Filters", "Filters in execution order"),
                read_only("FilterCount", "Number of installed filters"),
                read_only("MinPriority", "Priority floor for new filters"),
            ],
            operations: Vec::new(),
        }
    }
}

/// Registers the runtime and pipeline beans. They go directly into the
/// terminal so that read-only protection of their domain does not stop the
/// server from installing them.
pub async fn register_runtime_beans(server: &ManagementServer) -> MBeanResult<()> {
    let pipeline = server.pipeline();
    let terminal = pipeline.terminal();
    terminal
        .register_mbean(ObjectName::parse(RUNTIME_NAME)?, Arc::new(RuntimeMBean::new()))
        .await?;
    terminal
        .register_mbean(
            ObjectName::parse(PIPELINE_NAME)?,
            Arc::new(PipelineMBean::new(&pipeline)),
        )
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::MBeanError;

    #[tokio::test]
    async fn test_runtime_beans_are_queryable() {
        let server = ManagementServer::new(Config::default()).unwrap();
        register_runtime_beans(&server).await.unwrap();

        let pipeline_name = ObjectName::parse(PIPELINE_NAME).unwrap();
        assert_eq!(
            server.get_attribute(&pipeline_name, "FilterCount").await.unwrap(),
            json!(2)
        );
        assert_eq!(
            server.get_attribute(&pipeline_name, "Filters").await.unwrap(),
            json!([
                {"name": "tracing", "priority": 300},
                {"name": "metrics", "priority": 200}
            ])
        );

        let runtime_name = ObjectName::parse(RUNTIME_NAME).unwrap();
        assert!(server
            .get_attribute(&runtime_name, "UptimeSeconds")
            .await
            .unwrap()
            .is_i64());
        assert!(matches!(
            server
                .set_attribute(&runtime_name, Attribute::new("Version", json!("x")))
                .await,
            Err(MBeanError::AttributeNotWritable { .. })
        ));
    }

    #[tokio::test]
    async fn test_runtime_beans_install_under_protection() {
        let mut config = Config::default();
        config.filters.access.enabled = true;
        config.filters.access.read_only_domains = vec!["mbean-pipeline:*".to_string()];
        let server = ManagementServer::new(config).unwrap();

        register_runtime_beans(&server).await.unwrap();
        let runtime_name = ObjectName::parse(RUNTIME_NAME).unwrap();
        assert!(matches!(
            server.unregister_mbean(&runtime_name).await,
            Err(MBeanError::AccessDenied { .. })
        ));
        assert!(server.is_registered(&runtime_name).await);
    }
}
