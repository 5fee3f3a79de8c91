//! Priority-ordered interceptor pipeline for an MBean server.
//!
//! # Architecture
//!
//! - **Filters**: implement `MBeanServerFilter`, overriding the operations they
//!   want to see and forwarding the rest
//! - **Chain**: immutable links built from the sorted filter list, ending at
//!   the terminal server
//! - **Registry**: `MBeanServerPipeline` owns membership, rebuilds the chain on
//!   every change and publishes the new head with an atomic swap
//!
//! # Modules
//!
//! - `filter`: the filter contract and a pass-through filter
//! - `chain`: chain construction
//! - `registry`: insertion, removal and head publication

pub mod chain;
pub mod filter;
pub mod registry;

pub use chain::build_chain;
pub use filter::{MBeanServerFilter, PassThroughFilter};
pub use registry::{FilterDescriptor, MBeanServerPipeline, DEFAULT_MIN_PRIORITY};
