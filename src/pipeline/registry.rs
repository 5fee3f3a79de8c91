use arc_swap::ArcSwap;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::cmp::Reverse;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

use super::chain::build_chain;
use super::filter::MBeanServerFilter;
use crate::error::MBeanResult;
use crate::mbean::{Attribute, DynamicMBean, MBeanInfo, MBeanServer, ObjectInstance, ObjectName};

/// Filters must have a priority strictly above this unless configured otherwise.
pub const DEFAULT_MIN_PRIORITY: i32 = 0;

/// Name and priority of an installed filter, in chain order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterDescriptor {
    pub name: String,
    pub priority: i32,
}

struct Member {
    filter: Arc<dyn MBeanServerFilter>,
    priority: i32,
    seq: u64,
}

#[derive(Default)]
struct Members {
    entries: Vec<Member>,
    next_seq: u64,
}

/// Published state read by callers without taking the membership lock.
/// Priorities are the values read at insertion time.
struct Chain {
    head: Arc<dyn MBeanServer>,
    filters: Vec<(Arc<dyn MBeanServerFilter>, i32)>,
}

/// Priority-ordered set of filters in front of a terminal management server.
///
/// Filters run from highest to lowest priority; equal priorities run in the
/// order they were inserted. Every insert or remove rebuilds the chain and
/// swaps the new head in atomically, while callers already inside an older
/// chain finish on it undisturbed.
pub struct MBeanServerPipeline {
    terminal: Arc<dyn MBeanServer>,
    min_priority: i32,
    members: Mutex<Members>,
    chain: ArcSwap<Chain>,
}

fn same_filter(a: &Arc<dyn MBeanServerFilter>, b: &Arc<dyn MBeanServerFilter>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

impl MBeanServerPipeline {
    pub fn new(terminal: Arc<dyn MBeanServer>) -> Self {
        Self::with_min_priority(terminal, DEFAULT_MIN_PRIORITY)
    }

    /// Filters with a priority at or below `min_priority` are refused.
    pub fn with_min_priority(terminal: Arc<dyn MBeanServer>, min_priority: i32) -> Self {
        let chain = Chain {
            head: terminal.clone(),
            filters: Vec::new(),
        };
        Self {
            terminal,
            min_priority,
            members: Mutex::new(Members::default()),
            chain: ArcSwap::from_pointee(chain),
        }
    }

    pub fn min_priority(&self) -> i32 {
        self.min_priority
    }

    pub fn terminal(&self) -> Arc<dyn MBeanServer> {
        self.terminal.clone()
    }

    /// Entry point for management calls: the first filter, or the terminal
    /// when no filters are installed.
    pub fn head(&self) -> Arc<dyn MBeanServer> {
        self.chain.load().head.clone()
    }

    /// Adds `filter` to the chain. Returns false, leaving the chain untouched,
    /// for `None`, for a priority at or below the floor, or for a filter that
    /// is already installed.
    pub fn insert(&self, filter: Option<Arc<dyn MBeanServerFilter>>) -> bool {
        let Some(filter) = filter else {
            warn!("Refusing to insert a missing filter");
            return false;
        };

        let priority = filter.priority();
        if priority <= self.min_priority {
            warn!(
                "Refusing filter '{}': priority {} is not above {}",
                filter.name(),
                priority,
                self.min_priority
            );
            return false;
        }

        let mut members = self.members.lock().unwrap_or_else(PoisonError::into_inner);
        if members.entries.iter().any(|m| same_filter(&m.filter, &filter)) {
            warn!("Refusing filter '{}': already installed", filter.name());
            return false;
        }

        let seq = members.next_seq;
        members.next_seq += 1;
        members.entries.push(Member {
            filter: filter.clone(),
            priority,
            seq,
        });
        members.entries.sort_by_key(|m| (Reverse(m.priority), m.seq));

        self.publish(&members);
        debug!(
            "Inserted filter '{}' with priority {} ({} installed)",
            filter.name(),
            priority,
            members.entries.len()
        );
        true
    }

    /// Takes `filter` out of the chain. Returns false if it was not installed.
    pub fn remove(&self, filter: Option<&Arc<dyn MBeanServerFilter>>) -> bool {
        let Some(filter) = filter else {
            return false;
        };

        let mut members = self.members.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(index) = members
            .entries
            .iter()
            .position(|m| same_filter(&m.filter, filter))
        else {
            debug!("Filter '{}' is not installed", filter.name());
            return false;
        };

        members.entries.remove(index);
        self.publish(&members);
        debug!(
            "Removed filter '{}' ({} installed)",
            filter.name(),
            members.entries.len()
        );
        true
    }

    pub fn contains(&self, filter: Option<&Arc<dyn MBeanServerFilter>>) -> bool {
        let Some(filter) = filter else {
            return false;
        };
        self.chain
            .load()
            .filters
            .iter()
            .any(|(f, _)| same_filter(f, filter))
    }

    /// Removes every filter; the terminal becomes the head again.
    pub fn clear(&self) {
        let mut members = self.members.lock().unwrap_or_else(PoisonError::into_inner);
        let removed = members.entries.len();
        members.entries.clear();
        self.publish(&members);
        debug!("Cleared {} filters from pipeline", removed);
    }

    /// Installed filters in the order they run.
    pub fn filters(&self) -> Vec<FilterDescriptor> {
        self.chain
            .load()
            .filters
            .iter()
            .map(|(f, priority)| FilterDescriptor {
                name: f.name().to_string(),
                priority: *priority,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.chain.load().filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Called with the membership lock held so publications stay in mutation order.
    fn publish(&self, members: &Members) {
        let ordered: Vec<Arc<dyn MBeanServerFilter>> =
            members.entries.iter().map(|m| m.filter.clone()).collect();
        let head = build_chain(&ordered, self.terminal.clone());
        let filters = members
            .entries
            .iter()
            .map(|m| (m.filter.clone(), m.priority))
            .collect();
        self.chain.store(Arc::new(Chain { head, filters }));
    }
}

#[async_trait]
impl MBeanServer for MBeanServerPipeline {
    async fn register_mbean(
        &self,
        name: ObjectName,
        bean: Arc<dyn DynamicMBean>,
    ) -> MBeanResult<ObjectInstance> {
        self.head().register_mbean(name, bean).await
    }

    async fn unregister_mbean(&self, name: &ObjectName) -> MBeanResult<()> {
        self.head().unregister_mbean(name).await
    }

    async fn is_registered(&self, name: &ObjectName) -> bool {
        self.head().is_registered(name).await
    }

    async fn get_mbean_count(&self) -> usize {
        self.head().get_mbean_count().await
    }

    async fn query_names(&self, pattern: Option<&ObjectName>) -> Vec<ObjectName> {
        self.head().query_names(pattern).await
    }

    async fn get_attribute(&self, name: &ObjectName, attribute: &str) -> MBeanResult<Value> {
        self.head().get_attribute(name, attribute).await
    }

    async fn get_attributes(
        &self,
        name: &ObjectName,
        attributes: &[String],
    ) -> MBeanResult<Vec<Attribute>> {
        self.head().get_attributes(name, attributes).await
    }

    async fn set_attribute(&self, name: &ObjectName, attribute: Attribute) -> MBeanResult<()> {
        self.head().set_attribute(name, attribute).await
    }

    async fn invoke(
        &self,
        name: &ObjectName,
        operation: &str,
        params: &[Value],
    ) -> MBeanResult<Value> {
        self.head().invoke(name, operation, params).await
    }

    async fn get_mbean_info(&self, name: &ObjectName) -> MBeanResult<MBeanInfo> {
        self.head().get_mbean_info(name).await
    }

    async fn get_default_domain(&self) -> String {
        self.head().get_default_domain().await
    }

    async fn get_domains(&self) -> Vec<String> {
        self.head().get_domains().await
    }
}
