//! Object names identifying registered management beans.
//!
//! An object name has the form `domain:key=value[,key=value...]`. Names whose
//! domain contains `*` or `?`, or whose key list contains a trailing `*`, are
//! patterns and can only be used for queries.

use crate::error::{MBeanError, MBeanResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

const RESERVED: &[char] = &[':', '=', ',', '*', '?'];

#[derive(Clone, Debug)]
pub struct ObjectName {
    domain: String,
    properties: BTreeMap<String, String>,
    property_pattern: bool,
    canonical: String,
}

impl ObjectName {
    pub fn parse(input: &str) -> MBeanResult<Self> {
        input.parse()
    }

    /// Pattern matching every name (`*:*`).
    pub fn wildcard() -> Self {
        Self::from_parts("*".to_string(), BTreeMap::new(), true)
    }

    fn from_parts(
        domain: String,
        properties: BTreeMap<String, String>,
        property_pattern: bool,
    ) -> Self {
        let mut canonical = format!("{domain}:");
        let props: Vec<String> = properties
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        canonical.push_str(&props.join(","));
        if property_pattern {
            if !props.is_empty() {
                canonical.push(',');
            }
            canonical.push('*');
        }

        Self {
            domain,
            properties,
            property_pattern,
            canonical,
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn key_property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn key_properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub fn canonical_name(&self) -> &str {
        &self.canonical
    }

    pub fn is_domain_pattern(&self) -> bool {
        self.domain.contains(['*', '?'])
    }

    pub fn is_property_pattern(&self) -> bool {
        self.property_pattern
    }

    pub fn is_pattern(&self) -> bool {
        self.is_domain_pattern() || self.property_pattern
    }

    /// Same key properties under another domain. Used to resolve names
    /// registered with an empty domain against the server's default domain.
    pub fn with_domain(&self, domain: &str) -> Self {
        Self::from_parts(
            domain.to_string(),
            self.properties.clone(),
            self.property_pattern,
        )
    }

    /// Whether `name` is selected by this name. A non-pattern only matches
    /// itself; a pattern never matches another pattern.
    pub fn matches(&self, name: &ObjectName) -> bool {
        if name.is_pattern() {
            return false;
        }

        if !wildcard_match(&self.domain, &name.domain) {
            return false;
        }

        if self.property_pattern {
            self.properties
                .iter()
                .all(|(k, v)| name.properties.get(k) == Some(v))
        } else {
            self.properties == name.properties
        }
    }
}

impl FromStr for ObjectName {
    type Err = MBeanError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| MBeanError::InvalidObjectName {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let (domain, props) = input
            .split_once(':')
            .ok_or_else(|| invalid("missing ':' after domain"))?;

        if props.is_empty() {
            return Err(invalid("empty key property list"));
        }

        let mut properties = BTreeMap::new();
        let mut property_pattern = false;

        for part in props.split(',') {
            if part == "*" {
                if property_pattern {
                    return Err(invalid("'*' given more than once"));
                }
                property_pattern = true;
                continue;
            }

            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| invalid("key property without '='"))?;

            if key.is_empty() {
                return Err(invalid("empty key"));
            }
            if value.is_empty() {
                return Err(invalid("empty value"));
            }
            if key.contains(RESERVED) || value.contains(RESERVED) {
                return Err(invalid("reserved character in key property"));
            }
            if properties
                .insert(key.to_string(), value.to_string())
                .is_some()
            {
                return Err(invalid("duplicate key"));
            }
        }

        Ok(Self::from_parts(
            domain.to_string(),
            properties,
            property_pattern,
        ))
    }
}

fn wildcard_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<usize> = None;
    let mut mark = 0;

    while ti < t.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some(pi);
            mark = ti;
            pi += 1;
        } else if let Some(s) = star {
            pi = s + 1;
            mark += 1;
            ti = mark;
        } else {
            return false;
        }
    }

    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl PartialEq for ObjectName {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for ObjectName {}

impl Hash for ObjectName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl PartialOrd for ObjectName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ObjectName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical.cmp(&other.canonical)
    }
}

impl Serialize for ObjectName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.canonical)
    }
}

impl<'de> Deserialize<'de> for ObjectName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
