//! The management server: a terminal registry wrapped in a filter pipeline,
//! assembled from configuration.

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{MBeanResult, PipelineError, Result};
use crate::filters::{AccessFilter, MetricsFilter, TracingFilter};
use crate::mbean::{
    Attribute, DynamicMBean, InMemoryMBeanServer, MBeanInfo, MBeanServer, ObjectInstance,
    ObjectName,
};
use crate::pipeline::{MBeanServerFilter, MBeanServerPipeline};

pub mod runtime;

pub use runtime::{register_runtime_beans, PipelineMBean, RuntimeMBean};

pub struct ManagementServer {
    config: Config,
    pipeline: Arc<MBeanServerPipeline>,
    metrics: Option<Arc<MetricsFilter>>,
}

impl ManagementServer {
    pub fn new(config: Config) -> Result<Self> {
        crate::config::validate(&config)?;

        let terminal = Arc::new(InMemoryMBeanServer::new(
            config.server.default_domain.clone(),
        ));
        let pipeline = Arc::new(MBeanServerPipeline::with_min_priority(
            terminal,
            config.pipeline.min_priority,
        ));

        let filters = &config.filters;
        let mut metrics = None;

        if filters.tracing.enabled {
            install(&pipeline, Arc::new(TracingFilter::new(filters.tracing.priority)))?;
        }

        if filters.metrics.enabled {
            let filter = Arc::new(MetricsFilter::new(filters.metrics.priority)?);
            install(&pipeline, filter.clone())?;
            metrics = Some(filter);
        }

        if filters.access.enabled {
            let patterns = filters
                .access
                .read_only_domains
                .iter()
                .map(|p| ObjectName::parse(p))
                .collect::<MBeanResult<Vec<_>>>()?;
            install(
                &pipeline,
                Arc::new(AccessFilter::new(filters.access.priority, patterns)),
            )?;
        }

        info!(
            "Management server ready with {} filters (default domain '{}')",
            pipeline.len(),
            config.server.default_domain
        );

        Ok(Self {
            config,
            pipeline,
            metrics,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The pipeline, for administrative callers adding their own filters.
    pub fn pipeline(&self) -> Arc<MBeanServerPipeline> {
        self.pipeline.clone()
    }

    /// Current chain head for callers issuing management operations.
    pub fn connection(&self) -> Arc<dyn MBeanServer> {
        self.pipeline.head()
    }

    pub fn metrics(&self) -> Option<Arc<MetricsFilter>> {
        self.metrics.clone()
    }

    /// Removes every filter and unregisters every bean. Unregistration goes
    /// straight to the terminal so protection filters cannot block teardown.
    pub async fn shutdown(&self) {
        info!("Shutting down management server");
        self.pipeline.clear();

        let terminal = self.pipeline.terminal();
        let names = terminal.query_names(None).await;
        let results = join_all(names.iter().map(|name| terminal.unregister_mbean(name))).await;

        for (name, result) in names.iter().zip(results) {
            if let Err(e) = result {
                warn!("Failed to unregister {} during shutdown: {}", name, e);
            }
        }

        info!("Management server stopped ({} beans released)", names.len());
    }
}

fn install(pipeline: &MBeanServerPipeline, filter: Arc<dyn MBeanServerFilter>) -> Result<()> {
    let name = filter.name().to_string();
    if pipeline.insert(Some(filter)) {
        Ok(())
    } else {
        Err(PipelineError::FilterRejected(name))
    }
}

#[async_trait]
impl MBeanServer for ManagementServer {
    async fn register_mbean(
        &self,
        name: ObjectName,
        bean: Arc<dyn DynamicMBean>,
    ) -> MBeanResult<ObjectInstance> {
        self.pipeline.register_mbean(name, bean).await
    }

    async fn unregister_mbean(&self, name: &ObjectName) -> MBeanResult<()> {
        self.pipeline.unregister_mbean(name).await
    }

    async fn is_registered(&self, name: &ObjectName) -> bool {
        self.pipeline.is_registered(name).await
    }

    async fn get_mbean_count(&self) -> usize {
        self.pipeline.get_mbean_count().await
    }

    async fn query_names(&self, pattern: Option<&ObjectName>) -> Vec<ObjectName> {
        self.pipeline.query_names(pattern).await
    }

    async fn get_attribute(&self, name: &ObjectName, attribute: &str) -> MBeanResult<Value> {
        self.pipeline.get_attribute(name, attribute).await
    }

    async fn get_attributes(
        &self,
        name: &ObjectName,
        attributes: &[String],
    ) -> MBeanResult<Vec<Attribute>> {
        self.pipeline.get_attributes(name, attributes).await
    }

    async fn set_attribute(&self, name: &ObjectName, attribute: Attribute) -> MBeanResult<()> {
        self.pipeline.set_attribute(name, attribute).await
    }

    async fn invoke(
        &self,
        name: &ObjectName,
        operation: &str,
        params: &[Value],
    ) -> MBeanResult<Value> {
        self.pipeline.invoke(name, operation, params).await
    }

    async fn get_mbean_info(&self, name: &ObjectName) -> MBeanResult<MBeanInfo> {
        self.pipeline.get_mbean_info(name).await
    }

    async fn get_default_domain(&self) -> String {
        self.pipeline.get_default_domain().await
    }

    async fn get_domains(&self) -> Vec<String> {
        self.pipeline.get_domains().await
    }
}
