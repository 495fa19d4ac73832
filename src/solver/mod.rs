//! DNS-01 challenge solvers.
//!
//! A [`Solver`] is the capability set the webhook host drives: it is initialized once at
//! startup, then asked to [`present`][Solver::present] and [`cleanup`][Solver::cleanup] TXT
//! records for individual [`ChallengeRequest`]s. Calls for different challenges may run
//! concurrently, so solvers must not mutate shared state outside of
//! [`initialize`][Solver::initialize].

pub mod config;
pub mod openprovider;

use crate::error::Error;
use crate::secrets::ClusterConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

pub use config::{ProviderConfig, SecretKeySelector};
pub use openprovider::OpenproviderSolver;

/// Flips to `true` when the process is shutting down.
pub type Shutdown = watch::Receiver<bool>;

/// `DynSolver` is a type alias for an initialized [`Solver`] shared between request handlers.
pub type DynSolver = Arc<dyn Solver>;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum ChallengeAction {
    #[default]
    Present,
    CleanUp,
}

/// A single DNS-01 challenge, as handed over by cert-manager.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRequest {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub action: ChallengeAction,
    #[serde(default, rename = "type")]
    pub challenge_type: String,
    #[serde(default)]
    pub dns_name: String,
    /// The value to publish in the TXT record.
    pub key: String,
    /// Namespace of the issuer or certificate; secrets are looked up here.
    #[serde(default)]
    pub resource_namespace: String,
    /// The exact record name, fully qualified with a trailing dot.
    #[serde(rename = "resolvedFQDN")]
    pub resolved_fqdn: String,
    pub resolved_zone: String,
    #[serde(default)]
    pub allow_ambient_credentials: bool,
    /// Per-issuer solver config, decoded into a [`ProviderConfig`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
}

#[async_trait::async_trait]
pub trait Solver: Send + Sync {
    /// The name issuers use to select this solver within the webhook's group.
    fn name(&self) -> &'static str;

    /// Prepare the solver for use, building clients from the cluster access configuration.
    /// `shutdown` is owned by the host; solvers hold no connections that need draining.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `cluster` can't produce a working client.
    fn initialize(&mut self, cluster: &ClusterConfig, shutdown: Shutdown) -> Result<(), Error>;

    /// Publish the challenge's TXT record. Must tolerate repeated calls with the same request.
    async fn present(&self, ch: &ChallengeRequest) -> Result<(), Error>;

    /// Remove the challenge's TXT record, leaving records with other values under the same name
    /// in place.
    async fn cleanup(&self, ch: &ChallengeRequest) -> Result<(), Error>;
}
