use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

use super::bean::DynamicMBean;
use super::name::ObjectName;
use super::server::{Attribute, MBeanInfo, MBeanServer, ObjectInstance};
use crate::error::{MBeanError, MBeanResult};

pub const DEFAULT_DOMAIN: &str = "DefaultDomain";

struct RegisteredBean {
    bean: Arc<dyn DynamicMBean>,
    registered_at: DateTime<Utc>,
}

/// The real management server at the end of every filter chain.
///
/// Beans live in a concurrent map keyed by canonical object name. Names
/// registered with an empty domain are placed in the default domain.
pub struct InMemoryMBeanServer {
    default_domain: String,
    beans: DashMap<ObjectName, RegisteredBean>,
}

impl Default for InMemoryMBeanServer {
    fn default() -> Self {
        Self::new(DEFAULT_DOMAIN)
    }
}

impl InMemoryMBeanServer {
    pub fn new(default_domain: impl Into<String>) -> Self {
        Self {
            default_domain: default_domain.into(),
            beans: DashMap::new(),
        }
    }

    fn resolve(&self, name: &ObjectName) -> ObjectName {
        if name.domain().is_empty() {
            name.with_domain(&self.default_domain)
        } else {
            name.clone()
        }
    }

    fn lookup(&self, name: &ObjectName) -> MBeanResult<(ObjectName, Arc<dyn DynamicMBean>)> {
        let name = self.resolve(name);
        let bean = self
            .beans
            .get(&name)
            .map(|entry| entry.bean.clone())
            .ok_or_else(|| MBeanError::InstanceNotFound(name.clone()))?;
        Ok((name, bean))
    }

    /// When the bean under `name` was registered.
    pub fn registered_at(&self, name: &ObjectName) -> Option<DateTime<Utc>> {
        self.beans
            .get(&self.resolve(name))
            .map(|entry| entry.registered_at)
    }
}

#[async_trait]
impl MBeanServer for InMemoryMBeanServer {
    async fn register_mbean(
        &self,
        name: ObjectName,
        bean: Arc<dyn DynamicMBean>,
    ) -> MBeanResult<ObjectInstance> {
        if name.is_pattern() {
            return Err(MBeanError::InvalidObjectName {
                input: name.to_string(),
                reason: "cannot register a pattern".to_string(),
            });
        }

        let name = self.resolve(&name);
        let class_name = bean.info().class_name;

        match self.beans.entry(name.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(MBeanError::InstanceAlreadyExists(name));
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(RegisteredBean {
                    bean,
                    registered_at: Utc::now(),
                });
            }
        }

        debug!("Registered MBean {}", name);
        Ok(ObjectInstance {
            object_name: name,
            class_name,
        })
    }

    async fn unregister_mbean(&self, name: &ObjectName) -> MBeanResult<()> {
        let name = self.resolve(name);
        match self.beans.remove(&name) {
            Some(_) => {
                debug!("Unregistered MBean {}", name);
                Ok(())
            }
            None => Err(MBeanError::InstanceNotFound(name)),
        }
    }

    async fn is_registered(&self, name: &ObjectName) -> bool {
        self.beans.contains_key(&self.resolve(name))
    }

    async fn get_mbean_count(&self) -> usize {
        self.beans.len()
    }

    async fn query_names(&self, pattern: Option<&ObjectName>) -> Vec<ObjectName> {
        let pattern = pattern.map(|p| self.resolve(p));
        let mut names: Vec<ObjectName> = self
            .beans
            .iter()
            .map(|entry| entry.key().clone())
            .filter(|name| pattern.as_ref().map_or(true, |p| p.matches(name)))
            .collect();
        names.sort();
        names
    }

    async fn get_attribute(&self, name: &ObjectName, attribute: &str) -> MBeanResult<Value> {
        let (name, bean) = self.lookup(name)?;
        bean.get_attribute(attribute)
            .map_err(|e| e.into_mbean_error(&name))
    }

    async fn get_attributes(
        &self,
        name: &ObjectName,
        attributes: &[String],
    ) -> MBeanResult<Vec<Attribute>> {
        let (_, bean) = self.lookup(name)?;
        Ok(attributes
            .iter()
            .filter_map(|attribute| {
                bean.get_attribute(attribute)
                    .ok()
                    .map(|value| Attribute::new(attribute.clone(), value))
            })
            .collect())
    }

    async fn set_attribute(&self, name: &ObjectName, attribute: Attribute) -> MBeanResult<()> {
        let (name, bean) = self.lookup(name)?;
        bean.set_attribute(attribute)
            .map_err(|e| e.into_mbean_error(&name))
    }

    async fn invoke(
        &self,
        name: &ObjectName,
        operation: &str,
        params: &[Value],
    ) -> MBeanResult<Value> {
        let (name, bean) = self.lookup(name)?;
        bean.invoke(operation, params)
            .map_err(|e| e.into_mbean_error(&name))
    }

    async fn get_mbean_info(&self, name: &ObjectName) -> MBeanResult<MBeanInfo> {
        let (_, bean) = self.lookup(name)?;
        Ok(bean.info())
    }

    async fn get_default_domain(&self) -> String {
        self.default_domain.clone()
    }

    async fn get_domains(&self) -> Vec<String> {
        let domains: BTreeSet<String> = self
            .beans
            .iter()
            .map(|entry| entry.key().domain().to_string())
            .collect();
        domains.into_iter().collect()
    }
}
