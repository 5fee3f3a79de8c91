use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use super::server::{Attribute, MBeanAttributeInfo, MBeanInfo, MBeanOperationInfo};
use crate::error::BeanError;

/// A bean whose management interface is discovered at runtime.
pub trait DynamicMBean: Send + Sync {
    fn get_attribute(&self, attribute: &str) -> Result<Value, BeanError>;

    fn set_attribute(&self, attribute: Attribute) -> Result<(), BeanError>;

    fn invoke(&self, operation: &str, params: &[Value]) -> Result<Value, BeanError>;

    fn info(&self) -> MBeanInfo;
}

type OperationFn = Box<dyn Fn(&[Value]) -> Result<Value, BeanError> + Send + Sync>;

struct AttributeSlot {
    value: Value,
    writable: bool,
    description: String,
}

struct Operation {
    description: String,
    handler: OperationFn,
}

/// Map-backed bean assembled with a builder.
///
/// Writes must keep the JSON kind of the current value (a number stays a
/// number); attributes that currently hold `null` accept anything.
pub struct SimpleMBean {
    class_name: String,
    description: String,
    attributes: RwLock<BTreeMap<String, AttributeSlot>>,
    operations: BTreeMap<String, Operation>,
}

impl SimpleMBean {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            description: String::new(),
            attributes: RwLock::new(BTreeMap::new()),
            operations: BTreeMap::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Adds a read-only attribute.
    pub fn with_attribute(self, name: impl Into<String>, value: Value) -> Self {
        self.add_attribute(name.into(), value, false)
    }

    pub fn with_writable_attribute(self, name: impl Into<String>, value: Value) -> Self {
        self.add_attribute(name.into(), value, true)
    }

    pub fn with_operation<F>(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        handler: F,
    ) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, BeanError> + Send + Sync + 'static,
    {
        self.operations.insert(
            name.into(),
            Operation {
                description: description.into(),
                handler: Box::new(handler),
            },
        );
        self
    }

    fn add_attribute(mut self, name: String, value: Value, writable: bool) -> Self {
        self.attributes
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                name,
                AttributeSlot {
                    value,
                    writable,
                    description: String::new(),
                },
            );
        self
    }
}

fn same_kind(current: &Value, new: &Value) -> bool {
    matches!(
        (current, new),
        (Value::Null, _)
            | (Value::Bool(_), Value::Bool(_))
            | (Value::Number(_), Value::Number(_))
            | (Value::String(_), Value::String(_))
            | (Value::Array(_), Value::Array(_))
            | (Value::Object(_), Value::Object(_))
    )
}

impl DynamicMBean for SimpleMBean {
    fn get_attribute(&self, attribute: &str) -> Result<Value, BeanError> {
        let attributes = self.attributes.read().unwrap_or_else(PoisonError::into_inner);
        attributes
            .get(attribute)
            .map(|slot| slot.value.clone())
            .ok_or_else(|| BeanError::UnknownAttribute(attribute.to_string()))
    }

    fn set_attribute(&self, attribute: Attribute) -> Result<(), BeanError> {
        let mut attributes = self.attributes.write().unwrap_or_else(PoisonError::into_inner);
        let slot = attributes
            .get_mut(&attribute.name)
            .ok_or_else(|| BeanError::UnknownAttribute(attribute.name.clone()))?;

        if !slot.writable {
            return Err(BeanError::ReadOnly(attribute.name));
        }
        if !same_kind(&slot.value, &attribute.value) {
            return Err(BeanError::InvalidValue {
                reason: format!("expected a value like {}", slot.value),
                attribute: attribute.name,
            });
        }

        slot.value = attribute.value;
        Ok(())
    }

    fn invoke(&self, operation: &str, params: &[Value]) -> Result<Value, BeanError> {
        let op = self
            .operations
            .get(operation)
            .ok_or_else(|| BeanError::UnknownOperation(operation.to_string()))?;
        (op.handler)(params)
    }

    fn info(&self) -> MBeanInfo {
        let attributes = self.attributes.read().unwrap_or_else(PoisonError::into_inner);
        MBeanInfo {
            class_name: self.class_name.clone(),
            description: self.description.clone(),
            attributes: attributes
                .iter()
                .map(|(name, slot)| MBeanAttributeInfo {
                    name: name.clone(),
                    description: slot.description.clone(),
                    readable: true,
                    writable: slot.writable,
                })
                .collect(),
            operations: self
                .operations
                .iter()
                .map(|(name, op)| MBeanOperationInfo {
                    name: name.clone(),
                    description: op.description.clone(),
                })
                .collect(),
        }
    }
}
