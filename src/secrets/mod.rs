//! Credential lookup.
//!
//! The solver never holds on to the Openprovider API key: every
//! [`present`][crate::solver::Solver::present] and [`cleanup`][crate::solver::Solver::cleanup]
//! fetches it again from a [`SecretStore`], so rotated keys are picked up on the next challenge.
//!
//! Two implementations are provided, [`kube::KubeSecretStore`] and
//! [`memory::InMemorySecretStore`]. The former reads `Secret` resources from the Kubernetes API
//! the webhook is deployed in. The latter is a fixed map, useful for tests and local runs.

use std::collections::HashMap;
use std::sync::Arc;

pub mod kube;
pub mod memory;

#[allow(clippy::module_name_repetitions)]
pub use kube::{ClusterConfig, KubeSecretStore};
#[allow(clippy::module_name_repetitions)]
pub use memory::InMemorySecretStore;

/// The data fields of a secret, keyed by field name. Values are the decoded raw bytes.
pub type SecretData = HashMap<String, Vec<u8>>;

/// `DynSecretStore` is a type alias for a [`SecretStore`] shared read-only between concurrent
/// challenge invocations.
#[allow(clippy::module_name_repetitions)]
pub type DynSecretStore = Arc<dyn SecretStore + Send + Sync>;

/// An async trait describing read access to namespaced secrets.
#[async_trait::async_trait]
pub trait SecretStore {
    /// Fetch the data fields of the secret `name` in `namespace`.
    async fn get(&self, namespace: &str, name: &str) -> Result<SecretData, SecretStoreError>;
}

/// Errors surfaced by a [`SecretStore`].
#[derive(thiserror::Error, Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum SecretStoreError {
    #[error("secret \"{namespace}/{name}\" not found")]
    NotFound { namespace: String, name: String },

    /// The calling identity isn't allowed to read the secret. Reported by the secret API itself.
    #[error("access to secret \"{namespace}/{name}\" denied")]
    AccessDenied { namespace: String, name: String },

    #[error("unexpected status {status} reading secret \"{namespace}/{name}\"")]
    UnexpectedStatus {
        status: u16,
        namespace: String,
        name: String,
    },

    #[error("error reaching the secret API")]
    Transport(#[from] reqwest::Error),

    #[error("secret \"{namespace}/{name}\" holds invalid data: {reason}")]
    InvalidData {
        namespace: String,
        name: String,
        reason: String,
    },
}
