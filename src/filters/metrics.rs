use async_trait::async_trait;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

use crate::error::{MBeanResult, Result};
use crate::mbean::{Attribute, DynamicMBean, MBeanInfo, MBeanServer, ObjectInstance, ObjectName};
use crate::pipeline::MBeanServerFilter;

/// Counts calls and failures per operation and records call latency.
pub struct MetricsFilter {
    priority: i32,
    registry: Registry,
    calls: IntCounterVec,
    failures: IntCounterVec,
    duration: HistogramVec,
}

impl MetricsFilter {
    pub fn new(priority: i32) -> Result<Self> {
        let registry = Registry::new();

        let calls = IntCounterVec::new(
            Opts::new("mbean_pipeline_calls_total", "Management calls seen by the pipeline"),
            &["operation"],
        )?;
        let failures = IntCounterVec::new(
            Opts::new(
                "mbean_pipeline_failures_total",
                "Management calls that returned an error",
            ),
            &["operation"],
        )?;
        let duration = HistogramVec::new(
            HistogramOpts::new(
                "mbean_pipeline_call_duration_seconds",
                "Time spent below this filter per call",
            ),
            &["operation"],
        )?;

        registry.register(Box::new(calls.clone()))?;
        registry.register(Box::new(failures.clone()))?;
        registry.register(Box::new(duration.clone()))?;

        Ok(Self {
            priority,
            registry,
            calls,
            failures,
            duration,
        })
    }

    pub fn calls(&self, operation: &str) -> u64 {
        self.calls.with_label_values(&[operation]).get()
    }

    pub fn failures(&self, operation: &str) -> u64 {
        self.failures.with_label_values(&[operation]).get()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Current values in the Prometheus text exposition format.
    pub fn gather_text(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))?)
    }

    fn observe(&self, operation: &str, started: Instant, failed: bool) {
        self.calls.with_label_values(&[operation]).inc();
        if failed {
            self.failures.with_label_values(&[operation]).inc();
        }
        self.duration
            .with_label_values(&[operation])
            .observe(started.elapsed().as_secs_f64());
    }
}

#[async_trait]
impl MBeanServerFilter for MetricsFilter {
    fn name(&self) -> &str {
        "metrics"
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
        let started = Instant::now();
        let result = next.register_mbean(name, bean).await;
        self.observe("register_mbean", started, result.is_err());
        result
    }

    async fn unregister_mbean(&self, next: &dyn MBeanServer, name: &ObjectName) -> MBeanResult<()> {
        let started = Instant::now();
        let result = next.unregister_mbean(name).await;
        self.observe("unregister_mbean", started, result.is_err());
        result
    }

    async fn is_registered(&self, next: &dyn MBeanServer, name: &ObjectName) -> bool {
        let started = Instant::now();
        let registered = next.is_registered(name).await;
        self.observe("is_registered", started, false);
        registered
    }

    async fn get_mbean_count(&self, next: &dyn MBeanServer) -> usize {
        let started = Instant::now();
        let count = next.get_mbean_count().await;
        self.observe("get_mbean_count", started, false);
        count
    }

    async fn query_names(
        &self,
        next: &dyn MBeanServer,
        pattern: Option<&ObjectName>,
    ) -> Vec<ObjectName> {
        let started = Instant::now();
        let names = next.query_names(pattern).await;
        self.observe("query_names", started, false);
        names
    }

    async fn get_attribute(
        &self,
        next: &dyn MBeanServer,
        name: &ObjectName,
        attribute: &str,
    ) -> MBeanResult<Value> {
        let started = Instant::now();
        let result = next.get_attribute(name, attribute).await;
        self.observe("get_attribute", started, result.is_err());
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
        self.observe("get_attributes", started, result.is_err());
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
        self.observe("set_attribute", started, result.is_err());
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
        self.observe("invoke", started, result.is_err());
        result
    }

    async fn get_mbean_info(
        &self,
        next: &dyn MBeanServer,
        name: &ObjectName,
    ) -> MBeanResult<MBeanInfo> {
        let started = Instant::now();
        let result = next.get_mbean_info(name).await;
        self.observe("get_mbean_info", started, result.is_err());
        result
    }
}
