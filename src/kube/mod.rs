//! Kubernetes client module
//!
//! Builds kube-rs clients that reach clusters through the Rancher proxy
//! (`{base}/k8s/clusters/{cluster}`) using the caller's bearer token. The
//! token and base URL are supplied per request and only passed through.

mod fetch;

pub use fetch::KubeGateway;

use std::time::Duration;

use anyhow::{Context, Result};
use kube::{Client, Config};
use secrecy::SecretString;
use url::Url;

/// Per-request credentials for the Rancher API
#[derive(Clone)]
pub struct Credentials {
    pub base_url: Url,
    pub token: SecretString,
}

impl Credentials {
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("Invalid Rancher URL: {}", base_url))?;
        Ok(Self {
            base_url,
            token: SecretString::from(token.into()),
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Transport settings shared by every client a connector builds
#[derive(Debug, Clone)]
pub struct ConnectorOptions {
    pub timeout: Duration,
    pub accept_invalid_certs: bool,
}

impl Default for ConnectorOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            accept_invalid_certs: false,
        }
    }
}

/// Creates kube clients for named clusters behind one Rancher server
#[derive(Debug, Clone)]
pub struct ClusterConnector {
    credentials: Credentials,
    options: ConnectorOptions,
}

impl ClusterConnector {
    pub fn new(credentials: Credentials, options: ConnectorOptions) -> Self {
        Self {
            credentials,
            options,
        }
    }

    /// Proxy endpoint for a cluster
    pub fn cluster_url(&self, cluster: &str) -> Result<Url> {
        let base = &self.credentials.base_url;
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Rancher URL cannot be a base: {}", base))?
            .pop_if_empty()
            .extend(["k8s", "clusters", cluster]);
        Ok(url)
    }

    /// Initialize a client for one cluster
    pub fn create_client(&self, cluster: &str) -> Result<Client> {
        let endpoint = self.cluster_url(cluster)?;
        let cluster_url = endpoint
            .as_str()
            .parse()
            .with_context(|| format!("Invalid cluster endpoint: {}", endpoint))?;

        let mut config = Config::new(cluster_url);
        config.auth_info.token = Some(self.credentials.token.clone());
        config.accept_invalid_certs = self.options.accept_invalid_certs;
        config.connect_timeout = Some(self.options.timeout);
        config.read_timeout = Some(self.options.timeout);
        config.write_timeout = Some(self.options.timeout);

        let client = Client::try_from(config)
            .with_context(|| format!("Failed to create client for cluster {}", cluster))?;
        tracing::debug!(cluster, endpoint = %endpoint, "created cluster client");
        Ok(client)
    }
}

/// Reduce an auth server URL to the Rancher base URL (scheme, host and port)
///
/// Empty input stays empty so an unset URL can be reported by the caller.
pub fn rancher_url_from_auth_server_url(input: &str) -> Result<String> {
    if input.is_empty() {
        return Ok(String::new());
    }

    let url = Url::parse(input).with_context(|| format!("Invalid URL: {}", input))?;
    let host = url
        .host_str()
        .with_context(|| format!("URL has no host: {}", input))?;

    Ok(match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    })
}
