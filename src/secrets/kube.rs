//! A Kubernetes API backed implementation of the [`SecretStore`][super::SecretStore] trait.
//!
//! Reads `Secret` resources with a plain `GET /api/v1/namespaces/{namespace}/secrets/{name}`,
//! authenticated with a bearer token. The webhook's service account needs RBAC permission to
//! `get` secrets in every namespace issuers reference.
use crate::error::Error;
use crate::secrets::{SecretData, SecretStore, SecretStoreError};
use base64::engine::general_purpose::STANDARD as BASE64_ENGINE;
use base64::Engine;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";
pub(crate) const SECRET_API_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything needed to reach the Kubernetes API server.
#[derive(Debug)]
pub struct ClusterConfig {
    /// API server base URL, e.g. `https://10.96.0.1:443`.
    pub server: String,
    pub token: SecretString,
    /// PEM encoded CA bundle used to verify the API server.
    pub ca_cert: Option<Vec<u8>>,
    pub insecure_skip_tls_verify: bool,
}

impl ClusterConfig {
    /// Build the in-cluster configuration from the `KUBERNETES_SERVICE_HOST` /
    /// `KUBERNETES_SERVICE_PORT` environment and the mounted service account.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when not running inside a cluster, or when the service account
    /// token can't be read.
    pub fn in_cluster() -> Result<Self, Error> {
        let host = std::env::var("KUBERNETES_SERVICE_HOST").map_err(|_| {
            Error::Config("KUBERNETES_SERVICE_HOST not set, not running in Kubernetes?".into())
        })?;
        let port = std::env::var("KUBERNETES_SERVICE_PORT").unwrap_or_else(|_| "443".into());
        let dir = Path::new(SERVICE_ACCOUNT_DIR);
        let server = if host.contains(':') {
            format!("https://[{host}]:{port}")
        } else {
            format!("https://{host}:{port}")
        };
        Self::from_files(server, &dir.join("token"), Some(&dir.join("ca.crt")), false)
    }

    /// Build a configuration for an explicit API server, reading the bearer token (and
    /// optionally a CA bundle) from disk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the token or CA file can't be read, or the token is empty.
    pub fn from_files(
        server: String,
        token_file: &Path,
        ca_cert_file: Option<&PathBuf>,
        insecure_skip_tls_verify: bool,
    ) -> Result<Self, Error> {
        let token = std::fs::read_to_string(token_file).map_err(|err| {
            Error::Config(format!(
                "failed to read service account token {}: {err}",
                token_file.display()
            ))
        })?;
        let token = token.trim();
        if token.is_empty() {
            return Err(Error::Config(format!(
                "service account token {} is empty",
                token_file.display()
            )));
        }
        let ca_cert = match ca_cert_file {
            None => None,
            Some(p) => Some(std::fs::read(p).map_err(|err| {
                Error::Config(format!("failed to read CA bundle {}: {err}", p.display()))
            })?),
        };
        Ok(Self {
            server,
            token: SecretString::from(token.to_string()),
            ca_cert,
            insecure_skip_tls_verify,
        })
    }
}

/// Reads secrets from the Kubernetes API.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct KubeSecretStore {
    client: reqwest::Client,
    server: String,
    token: SecretString,
}

impl KubeSecretStore {
    /// Create a store talking to the API server described by `cluster`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the CA bundle isn't valid PEM or the HTTP client can't be
    /// built.
    pub fn new(cluster: &ClusterConfig) -> Result<Self, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(SECRET_API_TIMEOUT)
            .danger_accept_invalid_certs(cluster.insecure_skip_tls_verify);
        if let Some(ca) = &cluster.ca_cert {
            let cert = reqwest::Certificate::from_pem(ca)
                .map_err(|err| Error::Config(format!("failed to parse CA bundle: {err}")))?;
            builder = builder.add_root_certificate(cert);
        }
        let client = builder
            .build()
            .map_err(|err| Error::Config(format!("failed to create HTTP client: {err}")))?;
        Ok(Self {
            client,
            server: cluster.server.trim_end_matches('/').to_string(),
            token: SecretString::from(cluster.token.expose_secret().to_string()),
        })
    }
}

/// The subset of the core/v1 `Secret` resource we read.
#[derive(Deserialize, Debug, Default)]
struct Secret {
    #[serde(default)]
    data: Option<HashMap<String, String>>,
}

#[async_trait::async_trait]
impl SecretStore for KubeSecretStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<SecretData, SecretStoreError> {
        // Both end up as path segments; anything else could address another namespace.
        if !is_dns1123_label(namespace) || !is_dns1123_subdomain(name) {
            tracing::debug!(%namespace, %name, "refusing invalid secret reference");
            return Err(SecretStoreError::NotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            });
        }
        let url = format!(
            "{}/api/v1/namespaces/{namespace}/secrets/{name}",
            self.server
        );
        tracing::debug!(%namespace, %name, "fetching secret");

        let resp = self
            .client
            .get(&url)
            .bearer_auth(self.token.expose_secret())
            .send()
            .await?;

        match resp.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => {
                return Err(SecretStoreError::NotFound {
                    namespace: namespace.to_string(),
                    name: name.to_string(),
                })
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(SecretStoreError::AccessDenied {
                    namespace: namespace.to_string(),
                    name: name.to_string(),
                })
            }
            status => {
                return Err(SecretStoreError::UnexpectedStatus {
                    status: status.as_u16(),
                    namespace: namespace.to_string(),
                    name: name.to_string(),
                })
            }
        }

        let invalid = |reason: String| SecretStoreError::InvalidData {
            namespace: namespace.to_string(),
            name: name.to_string(),
            reason,
        };
        let body = resp.bytes().await?;
        let secret: Secret =
            serde_json::from_slice(&body).map_err(|err| invalid(err.to_string()))?;

        secret
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|(field, encoded)| match BASE64_ENGINE.decode(encoded) {
                Ok(raw) => Ok((field, raw)),
                Err(err) => Err(invalid(format!("field \"{field}\": {err}"))),
            })
            .collect()
    }
}

/// Namespace names: at most 63 lowercase alphanumerics or `-`, starting and ending alphanumeric.
fn is_dns1123_label(s: &str) -> bool {
    let alnum = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
    s.len() <= 63
        && s.starts_with(alnum)
        && s.ends_with(alnum)
        && s.chars().all(|c| alnum(c) || c == '-')
}

/// Secret names: at most 253 characters of dot separated labels.
fn is_dns1123_subdomain(s: &str) -> bool {
    s.len() <= 253 && s.split('.').all(is_dns1123_label)
}
