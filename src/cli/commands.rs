//! CLI command handlers

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::config::{ConfigLoader, paths};
use crate::gateway::ResourceGateway;
use crate::services::{Inspector, render_bundle, render_images};

/// Inspection tools
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ToolCommand {
    /// Fetch one resource
    Get {
        /// Resource kind (e.g. "pod", "machineset", "pod.metrics.k8s.io")
        kind: String,
        name: String,
        #[arg(long, short = 'c', default_value = "local")]
        cluster: String,
        /// Empty for cluster-scoped kinds
        #[arg(long, short = 'n', default_value = "")]
        namespace: String,
    },
    /// List resources of a kind
    List {
        kind: String,
        #[arg(long, short = 'c', default_value = "local")]
        cluster: String,
        /// Empty lists across all namespaces
        #[arg(long, short = 'n', default_value = "")]
        namespace: String,
        /// Label selector (e.g. "app=web,tier in (frontend)")
        #[arg(long, short = 'l')]
        selector: Option<String>,
    },
    /// Pod with its owning controller, logs and metrics
    InspectPod {
        name: String,
        #[arg(long, short = 'c', default_value = "local")]
        cluster: String,
        #[arg(long, short = 'n')]
        namespace: String,
    },
    /// Deployment and the pods it selects
    Deployment {
        name: String,
        #[arg(long, short = 'c', default_value = "local")]
        cluster: String,
        #[arg(long, short = 'n')]
        namespace: String,
    },
    /// Nodes with their metrics
    Nodes {
        #[arg(long, short = 'c', default_value = "local")]
        cluster: String,
    },
    /// Provisioning state of a downstream cluster
    InspectCluster {
        /// Provisioning cluster name
        cluster_name: String,
        /// Defaults to the configured defaultNamespace
        #[arg(long, short = 'n')]
        namespace: Option<String>,
    },
    /// Machines, machine sets and machine deployments of a cluster
    ClusterMachines {
        cluster_name: String,
        #[arg(long, short = 'n')]
        namespace: Option<String>,
        /// Only this machine and its owners
        #[arg(long, short = 'm')]
        machine: Option<String>,
    },
    /// Container images per cluster
    Images {
        /// Clusters to scan; all management clusters when empty
        clusters: Vec<String>,
    },
}

/// Run a tool and render its response
pub async fn run_tool<G: ResourceGateway>(
    inspector: &Inspector<G>,
    command: ToolCommand,
) -> crate::error::Result<String> {
    let local = inspector.config().local_cluster.clone();
    match command {
        ToolCommand::Get {
            kind,
            name,
            cluster,
            namespace,
        } => {
            let bundle = inspector
                .get_resource(&cluster, &kind, &namespace, &name)
                .await?;
            render_bundle(&bundle, &cluster)
        }
        ToolCommand::List {
            kind,
            cluster,
            namespace,
            selector,
        } => {
            let bundle = inspector
                .list_resources(&cluster, &kind, &namespace, selector.as_deref())
                .await?;
            render_bundle(&bundle, &cluster)
        }
        ToolCommand::InspectPod {
            name,
            cluster,
            namespace,
        } => {
            let bundle = inspector.inspect_pod(&cluster, &namespace, &name).await?;
            render_bundle(&bundle, &cluster)
        }
        ToolCommand::Deployment {
            name,
            cluster,
            namespace,
        } => {
            let bundle = inspector
                .get_deployment_details(&cluster, &namespace, &name)
                .await?;
            render_bundle(&bundle, &cluster)
        }
        ToolCommand::Nodes { cluster } => {
            let bundle = inspector.get_nodes(&cluster).await?;
            render_bundle(&bundle, &cluster)
        }
        ToolCommand::InspectCluster {
            cluster_name,
            namespace,
        } => {
            let bundle = inspector
                .inspect_cluster(&cluster_name, namespace.as_deref())
                .await?;
            render_bundle(&bundle, &local)
        }
        ToolCommand::ClusterMachines {
            cluster_name,
            namespace,
            machine,
        } => {
            let bundle = inspector
                .inspect_cluster_machines(&cluster_name, namespace.as_deref(), machine.as_deref())
                .await?;
            render_bundle(&bundle, &local)
        }
        ToolCommand::Images { clusters } => {
            let images = inspector.get_cluster_images(&clusters).await?;
            render_images(&images)
        }
    }
}

/// Configuration management subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigSubcommand {
    /// Get configuration value
    Get {
        /// Configuration key (e.g., "defaultNamespace", "logger.level")
        key: Option<String>,
    },
    /// Set configuration value
    Set {
        /// Configuration key (e.g., "defaultNamespace", "logger.level")
        key: String,
        /// Configuration value
        value: String,
    },
    /// List all configuration
    List,
    /// Show configuration file path
    Path,
    /// Validate configuration
    Validate,
}

/// Handle configuration subcommands
pub fn handle_config_command(cmd: ConfigSubcommand) -> Result<()> {
    match cmd {
        ConfigSubcommand::Get { key } => {
            let config = ConfigLoader::load().context("Failed to load configuration")?;

            if let Some(key) = key {
                let value = crate::config::get_config_value(&config, &key)?;
                println!("{}", value);
            } else {
                let yaml =
                    serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
                print!("{}", yaml);
            }
        }
        ConfigSubcommand::Set { key, value } => {
            let mut config = ConfigLoader::load().unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable configuration: {:#}", e);
                ConfigLoader::load_defaults()
            });

            crate::config::set_config_value(&mut config, &key, &value)
                .with_context(|| format!("Failed to set {} = {}", key, value))?;
            config
                .validate()
                .with_context(|| format!("Rejected {} = {}", key, value))?;

            ConfigLoader::save_root(&config).context("Failed to save configuration")?;
            println!("Configuration saved");
        }
        ConfigSubcommand::List => {
            let config = ConfigLoader::load().context("Failed to load configuration")?;
            let yaml =
                serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
            print!("{}", yaml);
        }
        ConfigSubcommand::Path => {
            println!("{}", paths::root_config_path().display());
        }
        ConfigSubcommand::Validate => {
            ConfigLoader::validate().context("Configuration validation failed")?;
            println!("Configuration is valid");
        }
    }

    Ok(())
}
