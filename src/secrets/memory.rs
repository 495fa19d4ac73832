use crate::secrets::{SecretData, SecretStore, SecretStoreError};
use std::collections::HashMap;

/// A fixed, map-backed secret store. Secrets are keyed by `(namespace, name)`.
#[derive(Default, Debug, Clone)]
pub struct InMemorySecretStore {
    secrets: HashMap<(String, String), SecretData>,
}

impl InMemorySecretStore {
    /// Add (or replace) a single field of the secret `name` in `namespace`.
    #[must_use]
    pub fn with_field(
        mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<Vec<u8>>,
    ) -> Self {
        self.secrets
            .entry((namespace.into(), name.into()))
            .or_default()
            .insert(field.into(), value.into());
        self
    }
}

#[async_trait::async_trait]
impl SecretStore for InMemorySecretStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<SecretData, SecretStoreError> {
        self.secrets
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| SecretStoreError::NotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            })
    }
}
