use thiserror::Error;

use crate::mbean::ObjectName;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Management error: {0}")]
    MBean(#[from] MBeanError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("Filter rejected by pipeline: {0}")]
    FilterRejected(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Environment variable error: {0}")]
    EnvVar(String),
}

/// Errors raised while handling a management operation.
///
/// These flow back through the filter chain to the caller untouched; the
/// pipeline never wraps or swallows them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MBeanError {
    #[error("Instance not found: {0}")]
    InstanceNotFound(ObjectName),

    #[error("Instance already exists: {0}")]
    InstanceAlreadyExists(ObjectName),

    #[error("Attribute '{attribute}' not found on {name}")]
    AttributeNotFound { name: ObjectName, attribute: String },

    #[error("Attribute '{attribute}' is not writable on {name}")]
    AttributeNotWritable { name: ObjectName, attribute: String },

    #[error("Invalid value for attribute '{attribute}': {reason}")]
    InvalidAttributeValue { attribute: String, reason: String },

    #[error("Operation '{operation}' not found on {name}")]
    OperationNotFound { name: ObjectName, operation: String },

    #[error("Invalid object name '{input}': {reason}")]
    InvalidObjectName { input: String, reason: String },

    #[error("Access denied for {operation} on {name}")]
    AccessDenied { name: ObjectName, operation: String },

    #[error("MBean raised an exception: {0}")]
    MBeanException(String),
}

/// Failures reported by a bean implementation. The registry attaches the
/// bean's object name when turning these into [`MBeanError`]s.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BeanError {
    #[error("unknown attribute '{0}'")]
    UnknownAttribute(String),

    #[error("attribute '{0}' is read-only")]
    ReadOnly(String),

    #[error("invalid value for '{attribute}': {reason}")]
    InvalidValue { attribute: String, reason: String },

    #[error("unknown operation '{0}'")]
    UnknownOperation(String),

    #[error("{0}")]
    Failed(String),
}

impl BeanError {
    pub fn into_mbean_error(self, name: &ObjectName) -> MBeanError {
        match self {
            BeanError::UnknownAttribute(attribute) => MBeanError::AttributeNotFound {
                name: name.clone(),
                attribute,
            },
            BeanError::ReadOnly(attribute) => MBeanError::AttributeNotWritable {
                name: name.clone(),
                attribute,
            },
            BeanError::InvalidValue { attribute, reason } => {
                MBeanError::InvalidAttributeValue { attribute, reason }
            }
            BeanError::UnknownOperation(operation) => MBeanError::OperationNotFound {
                name: name.clone(),
                operation,
            },
            BeanError::Failed(message) => MBeanError::MBeanException(message),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

pub type MBeanResult<T> = std::result::Result<T, MBeanError>;
