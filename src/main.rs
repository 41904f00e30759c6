//! rancher-inspect - inspection tools for Rancher-managed Kubernetes fleets
//!
//! Each subcommand runs one inspection against the Rancher server given by
//! `--url`/`--token` and prints the JSON response on stdout.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use rancher_inspect::cli::{self, ConfigSubcommand, ToolCommand};
use rancher_inspect::config::ConfigLoader;
use rancher_inspect::kube::{
    ClusterConnector, ConnectorOptions, Credentials, KubeGateway, rancher_url_from_auth_server_url,
};
use rancher_inspect::services::Inspector;

/// Inspect resources across a Rancher-managed fleet
#[derive(Parser, Debug)]
#[command(name = "rancher-inspect", version)]
#[command(
    about = "Inspect resources and ownership chains across a Rancher-managed fleet",
    long_about = None
)]
struct Args {
    /// Enable debug logging to a temp file
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    /// Rancher server URL; any path, query or fragment is dropped
    #[arg(long, env = "RANCHER_URL", global = true, default_value = "")]
    url: String,

    /// Rancher API bearer token
    #[arg(long, env = "RANCHER_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, global = true)]
    insecure: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    Tool(ToolCommand),

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = ConfigLoader::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration, using defaults: {:#}", e);
        ConfigLoader::load_defaults()
    });

    let log_file = cli::init_logging(args.debug, &config.logger.level);
    if let Some(ref log_path) = log_file {
        eprintln!(
            "Debug logging enabled. Logs written to: {}",
            log_path.display()
        );
    }

    let tool = match args.command {
        Command::Config { subcommand } => return cli::handle_config_command(subcommand),
        Command::Tool(tool) => tool,
    };

    let url = rancher_url_from_auth_server_url(&args.url).context("Invalid --url")?;
    if url.is_empty() {
        anyhow::bail!("No Rancher URL given; pass --url or set RANCHER_URL");
    }
    let token = args
        .token
        .filter(|t| !t.is_empty())
        .context("No token given; pass --token or set RANCHER_TOKEN")?;

    let options = ConnectorOptions {
        timeout: Duration::from_secs(config.request_timeout_secs),
        accept_invalid_certs: args.insecure || config.insecure_skip_tls_verify,
    };
    let connector = ClusterConnector::new(Credentials::new(&url, token)?, options);
    let inspector = Inspector::new(KubeGateway::new(connector), config);

    tracing::debug!(url = %url, ?tool, "Running tool");
    let response = cli::run_tool(&inspector, tool)
        .await
        .context("Inspection failed")?;
    println!("{}", response);

    Ok(())
}
