//! Configuration system
//!
//! Built-in defaults, an optional YAML file in the config directory, and
//! environment overrides, merged in that order.

mod defaults;
pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{Config, LoggerConfig};

/// Keys accepted by [`get_config_value`] and [`set_config_value`]
pub const CONFIG_KEYS: &[&str] = &[
    "localCluster",
    "defaultNamespace",
    "podLogTailLines",
    "eventNamespaces",
    "eventLimit",
    "requestTimeoutSecs",
    "insecureSkipTlsVerify",
    "logger.level",
];

/// Get a configuration value by key (dot notation)
pub fn get_config_value(config: &schema::Config, key: &str) -> anyhow::Result<String> {
    match key {
        "localCluster" => Ok(config.local_cluster.clone()),
        "defaultNamespace" => Ok(config.default_namespace.clone()),
        "podLogTailLines" => Ok(config.pod_log_tail_lines.to_string()),
        "eventNamespaces" => Ok(config.event_namespaces.join(",")),
        "eventLimit" => Ok(config.event_limit.to_string()),
        "requestTimeoutSecs" => Ok(config.request_timeout_secs.to_string()),
        "insecureSkipTlsVerify" => Ok(config.insecure_skip_tls_verify.to_string()),
        "logger.level" => Ok(config.logger.level.clone()),
        _ => Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }
}

/// Set a configuration value by key (dot notation)
pub fn set_config_value(config: &mut schema::Config, key: &str, value: &str) -> anyhow::Result<()> {
    use anyhow::Context;
    match key {
        "localCluster" => {
            config.local_cluster = value.to_string();
        }
        "defaultNamespace" => {
            config.default_namespace = value.to_string();
        }
        "podLogTailLines" => {
            config.pod_log_tail_lines = value
                .parse()
                .context("podLogTailLines must be a number")?;
        }
        "eventNamespaces" => {
            // YAML array or comma-separated list
            config.event_namespaces = if value.trim_start().starts_with('[') {
                serde_yaml::from_str(value).context(
                    "eventNamespaces must be a YAML array (e.g., ['kube-system', 'default'])",
                )?
            } else {
                value
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            };
        }
        "eventLimit" => {
            config.event_limit = value.parse().context("eventLimit must be a number")?;
        }
        "requestTimeoutSecs" => {
            config.request_timeout_secs = value
                .parse()
                .context("requestTimeoutSecs must be a number")?;
        }
        "insecureSkipTlsVerify" => {
            config.insecure_skip_tls_verify = value
                .parse()
                .context("insecureSkipTlsVerify must be 'true' or 'false'")?;
        }
        "logger.level" => {
            config.logger.level = value.to_string();
        }
        _ => return Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }

    Ok(())
}
