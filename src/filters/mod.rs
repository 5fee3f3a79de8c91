//! Built-in filters.
//!
//! - `trace`: logs each management call and its duration
//! - `metrics`: Prometheus call, failure and latency metrics
//! - `access`: read-only protection for selected object name patterns

pub mod access;
pub mod metrics;
pub mod trace;

pub use access::AccessFilter;
pub use metrics::MetricsFilter;
pub use trace::TracingFilter;
