pub mod commands;
pub mod config;
pub mod error;
pub mod filters;
pub mod logging;
pub mod mbean;
pub mod pipeline;
pub mod server;

pub use error::{MBeanError, MBeanResult, PipelineError, Result};
pub use mbean::{MBeanServer, ObjectName};
pub use pipeline::{MBeanServerFilter, MBeanServerPipeline};
pub use server::ManagementServer;
