use crate::error::Error;
use crate::openprovider::DEFAULT_BASE_URL;
use crate::secrets::ClusterConfig;
use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use std::fs::File;
use std::io::BufReader;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Environment variable naming the API group the webhook is registered under.
pub const GROUP_NAME_ENV: &str = "GROUP_NAME";

pub type SharedConfig = Arc<Config>;

#[serde_as]
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    /// Always taken from [`GROUP_NAME_ENV`], never from the config file.
    #[serde(skip)]
    pub group_name: String,
    #[serde(default = "default_api_bind_addr")]
    pub api_bind_addr: SocketAddr,
    /// Bounds a whole webhook request, so it should exceed `provider_timeout` plus the secret
    /// read timeout. Otherwise a slow provider yields a bare 408 instead of a failed challenge.
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(default = "default_api_timeout")]
    pub api_timeout: Duration,
    #[serde(default = "default_provider_base_url")]
    pub provider_base_url: String,
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(default = "default_timeout")]
    pub provider_timeout: Duration,
    /// Explicit Kubernetes API access. The in-cluster service account is used when unset.
    #[serde(default)]
    pub kube: Option<KubeSettings>,
}

#[derive(Deserialize, Debug, Clone, Eq, PartialEq)]
pub struct KubeSettings {
    pub server: String,
    pub token_file: PathBuf,
    #[serde(default)]
    pub ca_cert_file: Option<PathBuf>,
    #[serde(default)]
    pub insecure_skip_tls_verify: bool,
}

fn default_api_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8443))
}

fn default_api_timeout() -> Duration {
    Duration::from_secs(45)
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_provider_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            group_name: String::new(),
            api_bind_addr: default_api_bind_addr(),
            api_timeout: default_api_timeout(),
            provider_base_url: default_provider_base_url(),
            provider_timeout: default_timeout(),
            kube: None,
        }
    }
}

impl Config {
    pub fn try_from_file(p: impl AsRef<Path>) -> Result<Self, Error> {
        let f = File::open(p)?;
        let reader = BufReader::new(f);
        let conf: Config = serde_json::from_reader(reader)?;
        Ok(conf)
    }

    /// Set the API group name. Startup can't continue without one.
    pub fn with_group_name(mut self, group_name: &str) -> Result<Self, Error> {
        if group_name.trim().is_empty() {
            return Err(Error::Config(format!("{GROUP_NAME_ENV} must be specified")));
        }
        self.group_name = group_name.trim().to_string();
        Ok(self)
    }

    /// Resolve how to reach the Kubernetes API: the explicit [`KubeSettings`] when configured,
    /// the in-cluster service account otherwise.
    pub fn cluster_config(&self) -> Result<ClusterConfig, Error> {
        match &self.kube {
            Some(kube) => ClusterConfig::from_files(
                kube.server.clone(),
                &kube.token_file,
                kube.ca_cert_file.as_ref(),
                kube.insecure_skip_tls_verify,
            ),
            None => ClusterConfig::in_cluster(),
        }
    }
}
