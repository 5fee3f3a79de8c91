use figment::{
    providers::{Env, Format, Json, Toml, Yaml},
    Figment,
};
use std::path::Path;

use super::schema::Config;
use crate::error::{ConfigError, Result};
use crate::mbean::ObjectName;

const ENV_PREFIX: &str = "MBEAN_PIPELINE_";

pub async fn load_from_env_or_file() -> Result<Config> {
    let config: Config = Figment::new()
        .merge(Toml::file("mbean-pipeline.toml"))
        .merge(Json::file("mbean-pipeline.json"))
        .merge(Yaml::file("mbean-pipeline.yaml"))
        .merge(Yaml::file("mbean-pipeline.yml"))
        // MBEAN_PIPELINE_SERVER__DEFAULTDOMAIN=... overrides server.defaultDomain
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::Parse(e.to_string()))?;

    let config = apply_env_substitutions(config)?;
    validate(&config)?;

    Ok(config)
}

pub async fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::Parse(format!(
            "Config file not found: {}",
            path.display()
        ))
        .into());
    }

    let figment = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => Figment::new().merge(Toml::file(path)),
        Some("json") => Figment::new().merge(Json::file(path)),
        Some("yaml") | Some("yml") => Figment::new().merge(Yaml::file(path)),
        _ => {
            return Err(ConfigError::Parse(
                "Unsupported config file format. Use .toml, .json, .yaml, or .yml".into(),
            )
            .into());
        }
    };

    let config: Config = figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::Parse(e.to_string()))?;

    let config = apply_env_substitutions(config)?;
    validate(&config)?;

    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    let floor = config.pipeline.min_priority;
    let filters = &config.filters;

    let enabled = [
        ("tracing", filters.tracing.enabled, filters.tracing.priority),
        ("metrics", filters.metrics.enabled, filters.metrics.priority),
        ("access", filters.access.enabled, filters.access.priority),
    ];

    for (name, is_enabled, priority) in enabled {
        if is_enabled && priority <= floor {
            return Err(ConfigError::Validation(format!(
                "Filter '{name}' priority {priority} must be greater than minPriority {floor}"
            ))
            .into());
        }
    }

    // Equal priorities would fall back to construction order, which is not
    // something a config file should depend on.
    for (i, (a, a_on, a_pri)) in enabled.iter().enumerate() {
        for (b, b_on, b_pri) in enabled.iter().skip(i + 1) {
            if *a_on && *b_on && a_pri == b_pri {
                return Err(ConfigError::Validation(format!(
                    "Filters '{a}' and '{b}' share priority {a_pri}"
                ))
                .into());
            }
        }
    }

    for pattern in &filters.access.read_only_domains {
        ObjectName::parse(pattern).map_err(|e| {
            ConfigError::Validation(format!("Invalid read-only pattern: {e}"))
        })?;
    }

    let domain = &config.server.default_domain;
    if domain.is_empty() {
        return Err(ConfigError::Validation("defaultDomain must not be empty".into()).into());
    }
    if domain.contains(['*', '?', ':']) {
        return Err(ConfigError::Validation(format!(
            "defaultDomain '{domain}' must not contain wildcards or ':'"
        ))
        .into());
    }

    Ok(())
}

fn apply_env_substitutions(mut config: Config) -> Result<Config> {
    config.server.default_domain = substitute_env_vars(&config.server.default_domain)?;

    for pattern in &mut config.filters.access.read_only_domains {
        *pattern = substitute_env_vars(pattern)?;
    }

    Ok(config)
}

fn substitute_env_vars(input: &str) -> Result<String> {
    let mut result = input.to_string();
    let re = regex::Regex::new(r"\$\{([^}]+)\}")
        .map_err(|e| ConfigError::Parse(e.to_string()))?;

    for cap in re.captures_iter(input) {
        let var_name = &cap[1];
        // ${VAR:-default}
        let (name, default) = match var_name.split_once(":-") {
            Some((name, default)) => (name, Some(default)),
            None => (var_name, None),
        };

        match (std::env::var(name), default) {
            (Ok(value), _) => result = result.replace(&cap[0], &value),
            (Err(_), Some(default)) => result = result.replace(&cap[0], default),
            (Err(_), None) => {
                return Err(ConfigError::EnvVar(format!(
                    "Environment variable '{name}' not found"
                ))
                .into());
            }
        }
    }

    Ok(result)
}
