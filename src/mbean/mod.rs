//! Management beans and the server that hosts them.
//!
//! - `name`: object names and query patterns
//! - `server`: the `MBeanServer` operation interface shared by every chain link
//! - `bean`: the `DynamicMBean` contract and a map-backed implementation
//! - `registry`: the in-memory server every filter chain ends at

pub mod bean;
pub mod name;
pub mod registry;
pub mod server;

pub use bean::{DynamicMBean, SimpleMBean};
pub use name::ObjectName;
pub use registry::{InMemoryMBeanServer, DEFAULT_DOMAIN};
pub use server::{
    Attribute, MBeanAttributeInfo, MBeanInfo, MBeanOperationInfo, MBeanServer, ObjectInstance,
};
