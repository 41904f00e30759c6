//! Configuration schema definitions
//!
//! Defines the structure of configuration files using serde for serialization.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Name of the management cluster as seen through the Rancher proxy
    #[serde(default = "default_local_cluster")]
    pub local_cluster: String,

    /// Namespace holding provisioning clusters
    #[serde(default = "default_namespace")]
    pub default_namespace: String,

    /// Log lines fetched per container when inspecting a pod
    #[serde(default = "default_pod_log_tail_lines")]
    pub pod_log_tail_lines: i64,

    /// Namespaces whose recent events are included in cluster inspections
    #[serde(default = "default_event_namespaces")]
    pub event_namespaces: Vec<String>,

    /// Events fetched per namespace
    #[serde(default = "default_event_limit")]
    pub event_limit: u32,

    /// Connect/read/write timeout for API calls
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub insecure_skip_tls_verify: bool,

    /// Logger configuration
    #[serde(default)]
    pub logger: LoggerConfig,
}

/// Logger configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoggerConfig {
    /// Level used when `--debug` is not given (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_local_cluster() -> String {
    "local".to_string()
}

fn default_namespace() -> String {
    "fleet-default".to_string()
}

fn default_pod_log_tail_lines() -> i64 {
    50
}

fn default_event_namespaces() -> Vec<String> {
    ["cattle-system", "kube-system", "default"]
        .iter()
        .map(|ns| ns.to_string())
        .collect()
}

fn default_event_limit() -> u32 {
    15
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            local_cluster: default_local_cluster(),
            default_namespace: default_namespace(),
            pod_log_tail_lines: default_pod_log_tail_lines(),
            event_namespaces: default_event_namespaces(),
            event_limit: default_event_limit(),
            request_timeout_secs: default_request_timeout_secs(),
            insecure_skip_tls_verify: false,
            logger: LoggerConfig::default(),
        }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Check values that serde alone cannot reject
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.local_cluster.is_empty() {
            anyhow::bail!("localCluster must not be empty");
        }
        if self.default_namespace.is_empty() {
            anyhow::bail!("defaultNamespace must not be empty");
        }
        if self.pod_log_tail_lines <= 0 {
            anyhow::bail!(
                "podLogTailLines must be positive, got {}",
                self.pod_log_tail_lines
            );
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("requestTimeoutSecs must be positive");
        }
        if !LOG_LEVELS.contains(&self.logger.level.to_lowercase().as_str()) {
            anyhow::bail!(
                "logger.level must be one of {}, got {}",
                LOG_LEVELS.join(", "),
                self.logger.level
            );
        }
        Ok(())
    }
}
