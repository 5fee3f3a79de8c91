use serde::{Deserialize, Serialize};

use crate::mbean::DEFAULT_DOMAIN;
use crate::pipeline::DEFAULT_MIN_PRIORITY;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub filters: FiltersConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    /// Filters need a priority strictly above this value
    #[serde(default = "default_min_priority", alias = "minpriority")]
    pub min_priority: i32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Domain given to names registered without one
    #[serde(default = "default_domain", alias = "defaultdomain")]
    pub default_domain: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FiltersConfig {
    #[serde(default = "default_tracing_filter")]
    pub tracing: FilterConfig,
    #[serde(default = "default_metrics_filter")]
    pub metrics: FilterConfig,
    #[serde(default)]
    pub access: AccessFilterConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub priority: i32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessFilterConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_access_priority")]
    pub priority: i32,
    /// Object name patterns whose beans cannot be modified, e.g. `system:*`
    #[serde(default, alias = "readonlydomains")]
    pub read_only_domains: Vec<String>,
}

// Default value functions
fn default_min_priority() -> i32 {
    DEFAULT_MIN_PRIORITY
}

fn default_domain() -> String {
    DEFAULT_DOMAIN.to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_tracing_filter() -> FilterConfig {
    FilterConfig {
        enabled: true,
        priority: 300,
    }
}

fn default_metrics_filter() -> FilterConfig {
    FilterConfig {
        enabled: true,
        priority: 200,
    }
}

fn default_access_priority() -> i32 {
    100
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_priority: default_min_priority(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            default_domain: default_domain(),
        }
    }
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            tracing: default_tracing_filter(),
            metrics: default_metrics_filter(),
            access: AccessFilterConfig::default(),
        }
    }
}

impl Default for AccessFilterConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            priority: default_access_priority(),
            read_only_domains: Vec::new(),
        }
    }
}
